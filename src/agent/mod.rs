//! # Move-to-Beacon Agent
//!
//! The agent wires the learning core (estimator, exploration, replay
//! buffer, TD update) to a screen environment.
//!
//! ## Pieces
//!
//! - **ScreenAgent**: episode state machine that records transitions,
//!   trains from replay and picks actions
//! - **Shaping**: beacon/marine localisation and the distance-based reward
//! - **Actions**: translators from head indices to `AgentAction`s
//!   (compass moves, screen points, grid targets)
//! - **Supervised**: scripted compass moves for warm-up episodes
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use beacon_dqn::agent::{Agent, ScreenAgentBuilder};
//! use beacon_dqn::config::AgentConfig;
//!
//! let config = AgentConfig { screen_width: 16, screen_height: 16, ..AgentConfig::default() };
//! let agent = ScreenAgentBuilder::new().config(config).seed(7).build().unwrap();
//! // let action = agent.decide(&observation)?;
//! assert_eq!(agent.episodes(), 0);
//! ```

pub mod actions;
pub mod screen_agent;
pub mod shaping;
pub mod supervised;
pub mod traits;

pub use actions::{ActionTranslator, Compass, CompassActions, GridActions, ScreenPointActions};
pub use screen_agent::{Phase, ScreenAgent, ScreenAgentBuilder};
pub use shaping::{shaped_reward, ScreenPoint, ScreenReading, GOAL_BONUS};
pub use supervised::CompassSupervisor;
pub use traits::Agent;
