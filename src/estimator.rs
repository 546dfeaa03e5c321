use log::info;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::error::{DqnError, Result};
use crate::network::{HeadValues, ParamSnapshot, QFunction};
use crate::types::HeadIndices;

/// Index of the largest value; ties resolve to the first index.
///
/// NaN entries never win against a number. Returns `None` for an empty view.
pub fn argmax(values: ArrayView1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &value) in values.iter().enumerate() {
        match best {
            None => best = Some((i, value)),
            Some((_, current)) if value > current || (current.is_nan() && !value.is_nan()) => {
                best = Some((i, value))
            }
            _ => {}
        }
    }
    best.map(|(i, _)| i)
}

/// Online network plus a target network that only changes through
/// `sync_target`.
pub struct ActionValueEstimator<Q: QFunction> {
    online: Q,
    target: Q,
    syncs: usize,
}

impl<Q: QFunction + Clone> ActionValueEstimator<Q> {
    /// The target starts as an exact copy of `online`.
    pub fn new(online: Q) -> Self {
        let target = online.clone();
        ActionValueEstimator { online, target, syncs: 0 }
    }
}

impl<Q: QFunction> ActionValueEstimator<Q> {
    /// Pair two independently initialised networks; the target is synced
    /// from the online network immediately.
    pub fn from_pair(online: Q, mut target: Q) -> Result<Self> {
        if online.input_size() != target.input_size() || online.head_sizes() != target.head_sizes() {
            return Err(DqnError::dimension_mismatch(
                format!("input {} heads {:?}", online.input_size(), online.head_sizes()),
                format!("input {} heads {:?}", target.input_size(), target.head_sizes()),
            ));
        }
        target.restore(&online.snapshot())?;
        Ok(ActionValueEstimator { online, target, syncs: 0 })
    }

    pub fn input_size(&self) -> usize {
        self.online.input_size()
    }

    pub fn head_sizes(&self) -> Vec<usize> {
        self.online.head_sizes()
    }

    pub fn num_heads(&self) -> usize {
        self.online.head_sizes().len()
    }

    /// Number of target synchronisations performed so far
    pub fn syncs(&self) -> usize {
        self.syncs
    }

    fn single(values: HeadValues) -> Vec<Array1<f32>> {
        values
            .into_iter()
            .map(|head| head.index_axis_move(Axis(0), 0))
            .collect()
    }

    /// One value vector per head for a single state (online network).
    pub fn predict(&self, state: ArrayView1<f32>) -> Result<Vec<Array1<f32>>> {
        let values = self.online.predict_batch(state.insert_axis(Axis(0)))?;
        Ok(Self::single(values))
    }

    /// Same as `predict`, evaluated by the target network.
    pub fn predict_target(&self, state: ArrayView1<f32>) -> Result<Vec<Array1<f32>>> {
        let values = self.target.predict_batch(state.insert_axis(Axis(0)))?;
        Ok(Self::single(values))
    }

    pub fn predict_batch(&self, states: ArrayView2<f32>) -> Result<HeadValues> {
        self.online.predict_batch(states)
    }

    pub fn predict_target_batch(&self, states: ArrayView2<f32>) -> Result<HeadValues> {
        self.target.predict_batch(states)
    }

    /// Greedy index per head.
    pub fn best_action(&self, state: ArrayView1<f32>) -> Result<HeadIndices> {
        self.predict(state)?
            .iter()
            .map(|values| {
                argmax(values.view()).ok_or_else(|| DqnError::NumericalError("action head produced no values".to_string()))
            })
            .collect::<Result<Vec<_>>>()
            .map(HeadIndices::new)
    }

    /// Copy the online parameters into the target network verbatim.
    pub fn sync_target(&mut self) -> Result<()> {
        self.target.restore(&self.online.snapshot())?;
        self.syncs += 1;
        info!("target network synchronised ({} syncs)", self.syncs);
        Ok(())
    }

    /// Snapshot of the online parameters, for persistence.
    pub fn snapshot(&self) -> ParamSnapshot {
        self.online.snapshot()
    }

    /// Load persisted parameters into both networks.
    pub fn restore(&mut self, snapshot: &ParamSnapshot) -> Result<()> {
        self.online.restore(snapshot)?;
        self.target.restore(snapshot)
    }

    /// Only the TD update trains the online network.
    pub(crate) fn online_mut(&mut self) -> &mut Q {
        &mut self.online
    }
}
