//! Temporal-difference update across all action heads.
//!
//! For every head independently: gather the online value of the chosen
//! index, bootstrap from the target network's best next value, then mask
//! terminal transitions down to their raw reward. The per-head terms are
//! only concatenated when the loss is formed.

use log::debug;
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{DqnError, Result};
use crate::estimator::ActionValueEstimator;
use crate::loss::MeanSquaredError;
use crate::network::{HeadValues, QFunction};
use crate::replay_buffer::Transition;

/// A minibatch of transitions stacked into dense arrays.
#[derive(Clone, Debug)]
pub struct TdBatch {
    pub states: Array2<f32>,
    pub next_states: Array2<f32>,
    /// `(batch, heads)` chosen index per head
    pub actions: Array2<usize>,
    pub rewards: Array1<f32>,
    pub terminal: Vec<bool>,
}

impl TdBatch {
    pub fn from_transitions(transitions: &[Transition], num_heads: usize) -> Result<Self> {
        let first = transitions.first().ok_or(DqnError::EmptyBatch)?;
        let batch_size = transitions.len();
        let state_size = first.state.len();

        let mut states = Array2::zeros((batch_size, state_size));
        let mut next_states = Array2::zeros((batch_size, state_size));
        let mut actions = Array2::zeros((batch_size, num_heads));
        let mut rewards = Array1::zeros(batch_size);
        let mut terminal = Vec::with_capacity(batch_size);

        for (i, transition) in transitions.iter().enumerate() {
            if transition.state.len() != state_size || transition.next_state.len() != state_size {
                return Err(DqnError::dimension_mismatch(
                    format!("state of length {}", state_size),
                    format!(
                        "state {} / next_state {} at batch row {}",
                        transition.state.len(),
                        transition.next_state.len(),
                        i
                    ),
                ));
            }
            if transition.action.len() != num_heads {
                return Err(DqnError::dimension_mismatch(
                    format!("{} action heads", num_heads),
                    format!("{} action heads at batch row {}", transition.action.len(), i),
                ));
            }
            states.row_mut(i).assign(&transition.state);
            next_states.row_mut(i).assign(&transition.next_state);
            for (head, &index) in transition.action.iter().enumerate() {
                actions[[i, head]] = index;
            }
            rewards[i] = transition.reward;
            terminal.push(transition.is_terminal());
        }

        Ok(TdBatch { states, next_states, actions, rewards, terminal })
    }

    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }
}

/// `target[i] = reward[i] + gamma * next_max[i]`, or `reward[i]` when the
/// transition is terminal.
pub fn td_targets(rewards: ArrayView1<f32>, next_max: ArrayView1<f32>, terminal: &[bool], gamma: f32) -> Result<Array1<f32>> {
    if rewards.len() != next_max.len() || rewards.len() != terminal.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} rewards", rewards.len()),
            format!("{} next values and {} terminal flags", next_max.len(), terminal.len()),
        ));
    }
    Ok(Array1::from_shape_fn(rewards.len(), |i| {
        if terminal[i] {
            rewards[i]
        } else {
            rewards[i] + gamma * next_max[i]
        }
    }))
}

/// Row-wise maximum of a `(batch, cardinality)` value matrix.
pub fn max_per_row(values: ArrayView2<f32>) -> Array1<f32> {
    values.map_axis(Axis(1), |row| row.fold(f32::NEG_INFINITY, |max, &v| max.max(v)))
}

/// Value of the chosen index in every row.
pub fn gather(values: ArrayView2<f32>, indices: ArrayView1<usize>) -> Result<Array1<f32>> {
    if values.nrows() != indices.len() {
        return Err(DqnError::dimension_mismatch(
            format!("{} rows", indices.len()),
            format!("{} rows", values.nrows()),
        ));
    }
    let cardinality = values.ncols();
    indices
        .iter()
        .enumerate()
        .map(|(row, &index)| {
            if index >= cardinality {
                Err(DqnError::InvalidParameter {
                    name: "action index".to_string(),
                    reason: format!("{} is outside a head of cardinality {}", index, cardinality),
                })
            } else {
                Ok(values[[row, index]])
            }
        })
        .collect::<Result<Vec<_>>>()
        .map(Array1::from)
}

/// Predicted values and TD targets of one action head.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadTerm {
    pub predicted: Array1<f32>,
    pub target: Array1<f32>,
}

/// All head terms of a minibatch and their combined MSE.
#[derive(Clone, Debug)]
pub struct TdLoss {
    pub heads: Vec<HeadTerm>,
    pub value: f32,
}

impl TdLoss {
    pub fn new(heads: Vec<HeadTerm>) -> Result<Self> {
        let (predicted, target) = Self::concatenate_terms(&heads)?;
        let value = MeanSquaredError::compute(predicted.view(), target.view())?;
        Ok(TdLoss { heads, value })
    }

    fn concatenate_terms(heads: &[HeadTerm]) -> Result<(Array1<f32>, Array1<f32>)> {
        if heads.is_empty() {
            return Err(DqnError::EmptyBatch);
        }
        let batch_size = heads[0].predicted.len();
        if heads
            .iter()
            .any(|head| head.predicted.len() != batch_size || head.target.len() != batch_size)
        {
            return Err(DqnError::dimension_mismatch(
                format!("{} values in every head", batch_size),
                "heads of differing lengths".to_string(),
            ));
        }
        let predicted: Vec<_> = heads.iter().map(|head| head.predicted.view()).collect();
        let target: Vec<_> = heads.iter().map(|head| head.target.view()).collect();
        let predicted = concatenate(Axis(0), &predicted).map_err(|e| DqnError::dimension_mismatch("concatenable heads".to_string(), e.to_string()))?;
        let target = concatenate(Axis(0), &target).map_err(|e| DqnError::dimension_mismatch("concatenable heads".to_string(), e.to_string()))?;
        Ok((predicted, target))
    }

    /// Combined `(predicted, target)` pair, heads in order.
    pub fn combined(&self) -> Result<(Array1<f32>, Array1<f32>)> {
        Self::concatenate_terms(&self.heads)
    }
}

/// Runs one TD gradient step on the online network of an estimator.
#[derive(Clone, Debug)]
pub struct TdOptimizer {
    pub gamma: f32,
    pub learning_rate: f32,
    steps: u64,
}

impl TdOptimizer {
    pub fn new(gamma: f32, learning_rate: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(DqnError::invalid_parameter("gamma", "must lie in [0, 1]"));
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(DqnError::invalid_parameter("learning_rate", "must be positive"));
        }
        Ok(TdOptimizer { gamma, learning_rate, steps: 0 })
    }

    /// Completed optimizer steps
    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn head_terms(&self, batch: &TdBatch, online: &HeadValues, next: &HeadValues) -> Result<Vec<HeadTerm>> {
        let num_heads = batch.actions.ncols();
        if online.len() != num_heads || next.len() != num_heads {
            return Err(DqnError::dimension_mismatch(
                format!("{} heads", num_heads),
                format!("{} online / {} target heads", online.len(), next.len()),
            ));
        }
        (0..num_heads)
            .map(|head| {
                if online[head].dim() != next[head].dim() {
                    return Err(DqnError::dimension_mismatch(
                        format!("{:?}", online[head].dim()),
                        format!("{:?}", next[head].dim()),
                    ));
                }
                let predicted = gather(online[head].view(), batch.actions.column(head))?;
                let next_max = max_per_row(next[head].view());
                let target = td_targets(batch.rewards.view(), next_max.view(), &batch.terminal, self.gamma)?;
                Ok(HeadTerm { predicted, target })
            })
            .collect()
    }

    fn check_input<Q: QFunction>(estimator: &ActionValueEstimator<Q>, batch: &TdBatch) -> Result<()> {
        if batch.states.ncols() != estimator.input_size() {
            return Err(DqnError::dimension_mismatch(
                format!("states of length {}", estimator.input_size()),
                format!("states of length {}", batch.states.ncols()),
            ));
        }
        Ok(())
    }

    /// Loss of a minibatch without touching any parameters.
    pub fn evaluate<Q: QFunction>(&self, estimator: &ActionValueEstimator<Q>, transitions: &[Transition]) -> Result<TdLoss> {
        let batch = TdBatch::from_transitions(transitions, estimator.num_heads())?;
        Self::check_input(estimator, &batch)?;
        let online = estimator.predict_batch(batch.states.view())?;
        let next = estimator.predict_target_batch(batch.next_states.view())?;
        TdLoss::new(self.head_terms(&batch, &online, &next)?)
    }

    /// One gradient step on the online network; returns the loss measured
    /// before the update.
    pub fn step<Q: QFunction>(&mut self, estimator: &mut ActionValueEstimator<Q>, transitions: &[Transition]) -> Result<f32> {
        let batch = TdBatch::from_transitions(transitions, estimator.num_heads())?;
        Self::check_input(estimator, &batch)?;

        let next = estimator.predict_target_batch(batch.next_states.view())?;
        let online = estimator.online_mut().forward_batch(batch.states.view())?;
        let loss = TdLoss::new(self.head_terms(&batch, &online, &next)?)?;
        if !loss.value.is_finite() {
            return Err(DqnError::NumericalError(format!("TD loss is {}", loss.value)));
        }

        // d(mean over B * H terms)/d(predicted) lands only on the chosen index.
        let (predicted, target) = loss.combined()?;
        let combined_gradient = MeanSquaredError::gradient(predicted.view(), target.view())?;
        let batch_size = batch.len();
        let mut head_gradients = Vec::with_capacity(online.len());
        for (head, values) in online.iter().enumerate() {
            let mut gradient = Array2::zeros(values.dim());
            for row in 0..batch_size {
                gradient[[row, batch.actions[[row, head]]]] = combined_gradient[head * batch_size + row];
            }
            head_gradients.push(gradient);
        }

        estimator.online_mut().backward_step(&head_gradients, self.learning_rate)?;
        self.steps += 1;
        debug!("TD step {}: loss {:.5} over {} transitions", self.steps, loss.value, batch_size);
        Ok(loss.value)
    }
}
