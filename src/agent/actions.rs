//! Translation from head indices to environment actions.
//!
//! The learning core only ever produces head indices; a translator turns
//! them into an `AgentAction` using the current screen reading and the
//! environment's legality mask.

use super::shaping::{ScreenPoint, ScreenReading};
use crate::observation::Observation;
use crate::types::{ActionKind, AgentAction};

pub trait ActionTranslator: Send {
    /// Cardinality of every head this translator reads
    fn head_sizes(&self) -> Vec<usize>;

    fn translate(&self, indices: &[usize], reading: &ScreenReading, observation: &Observation) -> AgentAction;
}

fn move_toward(marine: ScreenPoint, x: f32, y: f32) -> AgentAction {
    AgentAction::Move {
        dx: (x - marine.x).round() as i32,
        dy: (y - marine.y).round() as i32,
    }
}

/// The four compass moves, in head-index order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compass {
    Left,
    Up,
    Right,
    Down,
}

impl Compass {
    pub const ALL: [Compass; 4] = [Compass::Left, Compass::Up, Compass::Right, Compass::Down];

    pub fn index(self) -> usize {
        match self {
            Compass::Left => 0,
            Compass::Up => 1,
            Compass::Right => 2,
            Compass::Down => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Compass> {
        Compass::ALL.get(index).copied()
    }

    fn offset(self, step: i32) -> (i32, i32) {
        match self {
            Compass::Left => (-step, 0),
            Compass::Up => (0, -step),
            Compass::Right => (step, 0),
            Compass::Down => (0, step),
        }
    }
}

/// One head of four moves, each `step` pixels from the marine.
#[derive(Clone, Debug)]
pub struct CompassActions {
    pub step: i32,
}

impl CompassActions {
    pub fn new(step: i32) -> Self {
        CompassActions { step }
    }
}

impl ActionTranslator for CompassActions {
    fn head_sizes(&self) -> Vec<usize> {
        vec![Compass::ALL.len()]
    }

    fn translate(&self, indices: &[usize], reading: &ScreenReading, observation: &Observation) -> AgentAction {
        let (direction, marine) = match (indices.first().copied().and_then(Compass::from_index), reading.marine) {
            (Some(direction), Some(marine)) => (direction, marine),
            _ => return AgentAction::NoOp,
        };
        if !observation.can_do(ActionKind::Move) {
            return AgentAction::NoOp;
        }
        let max_x = reading.width.saturating_sub(1) as f32;
        let max_y = reading.height.saturating_sub(1) as f32;
        let blocked = match direction {
            Compass::Left => marine.x <= 0.0,
            Compass::Up => marine.y <= 0.0,
            Compass::Right => marine.x >= max_x,
            Compass::Down => marine.y >= max_y,
        };
        if blocked {
            return AgentAction::NoOp;
        }
        let (dx, dy) = direction.offset(self.step);
        AgentAction::Move { dx, dy }
    }
}

/// Three heads: `[no_op, select, move]`, screen x, screen y.
#[derive(Clone, Debug)]
pub struct ScreenPointActions {
    pub width: usize,
    pub height: usize,
}

impl ScreenPointActions {
    pub const NO_OP: usize = 0;
    pub const SELECT: usize = 1;
    pub const MOVE: usize = 2;

    pub fn new(width: usize, height: usize) -> Self {
        ScreenPointActions { width, height }
    }
}

impl ActionTranslator for ScreenPointActions {
    fn head_sizes(&self) -> Vec<usize> {
        vec![3, self.width, self.height]
    }

    fn translate(&self, indices: &[usize], reading: &ScreenReading, observation: &Observation) -> AgentAction {
        let (action, x, y) = match indices {
            [action, x, y] => (*action, *x, *y),
            _ => return AgentAction::NoOp,
        };
        match action {
            Self::SELECT if observation.can_do(ActionKind::Select) => AgentAction::Select,
            Self::MOVE if observation.can_do(ActionKind::Move) => match reading.marine {
                Some(marine) => move_toward(marine, x as f32, y as f32),
                None => AgentAction::NoOp,
            },
            _ => AgentAction::NoOp,
        }
    }
}

/// Integer points evenly spaced over `0..=max`, truncated like a cast of a
/// float linspace.
pub fn linspace_int(max: usize, count: usize) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => vec![0],
        _ => (0..count)
            .map(|i| (i as f64 * max as f64 / (count - 1) as f64).floor() as usize)
            .collect(),
    }
}

/// One head over a `grid_x * grid_y` lattice of screen targets.
#[derive(Clone, Debug)]
pub struct GridActions {
    points: Vec<(usize, usize)>,
}

impl GridActions {
    pub fn new(grid_x: usize, grid_y: usize, width: usize, height: usize) -> Self {
        let xs = linspace_int(width.saturating_sub(1), grid_x);
        let ys = linspace_int(height.saturating_sub(1), grid_y);
        let points = ys
            .iter()
            .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
            .collect();
        GridActions { points }
    }

    /// Screen target of a cell index, if it exists
    pub fn point(&self, index: usize) -> Option<(usize, usize)> {
        self.points.get(index).copied()
    }
}

impl ActionTranslator for GridActions {
    fn head_sizes(&self) -> Vec<usize> {
        vec![self.points.len()]
    }

    fn translate(&self, indices: &[usize], reading: &ScreenReading, observation: &Observation) -> AgentAction {
        if !observation.can_do(ActionKind::Move) {
            return AgentAction::NoOp;
        }
        match (indices.first().and_then(|&i| self.point(i)), reading.marine) {
            (Some((x, y)), Some(marine)) => move_toward(marine, x as f32, y as f32),
            _ => AgentAction::NoOp,
        }
    }
}
