//! # Activation Functions
//!
//! Element-wise non-linearities used by the dense layers of the value
//! network. Hidden layers default to ReLU; the per-head output layers are
//! linear so Q-values stay unbounded.

pub mod functions;

pub use functions::Activation;
