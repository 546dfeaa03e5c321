use serde::{Serialize, Deserialize};
use std::fmt;
use std::ops::Deref;

/// Position of a timestep within its episode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepType {
    First,
    Mid,
    Last,
}

impl StepType {
    /// Terminal transitions never bootstrap from their next state
    pub fn is_last(self) -> bool {
        self == StepType::Last
    }

    pub fn is_first(self) -> bool {
        self == StepType::First
    }
}

/// One chosen index per action head, e.g. `[action, x, y]`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeadIndices(Vec<usize>);

impl HeadIndices {
    pub fn new(indices: Vec<usize>) -> Self {
        HeadIndices(indices)
    }

    pub fn single(index: usize) -> Self {
        HeadIndices(vec![index])
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for HeadIndices {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for HeadIndices {
    fn from(indices: Vec<usize>) -> Self {
        HeadIndices(indices)
    }
}

/// Environment-level action families used for legality checks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    NoOp,
    Select,
    Move,
}

/// Action handed to the environment collaborator.
///
/// The set is closed so every translator and environment match is
/// checked exhaustively.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentAction {
    /// Move the selected unit by a screen offset
    Move { dx: i32, dy: i32 },
    NoOp,
    /// End of episode: the environment should be reset
    Reset,
    /// Select/acquire control of the unit
    Select,
}

impl AgentAction {
    /// The legality family of this action; `Reset` is always allowed.
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            AgentAction::Move { .. } => Some(ActionKind::Move),
            AgentAction::NoOp => Some(ActionKind::NoOp),
            AgentAction::Select => Some(ActionKind::Select),
            AgentAction::Reset => None,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, AgentAction::Reset)
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentAction::Move { dx, dy } => write!(f, "move({}, {})", dx, dy),
            AgentAction::NoOp => write!(f, "no_op"),
            AgentAction::Reset => write!(f, "reset"),
            AgentAction::Select => write!(f, "select"),
        }
    }
}
