use rand::Rng;

use super::actions::Compass;
use super::shaping::ScreenReading;

/// Scripted compass policy used during the supervised episodes.
///
/// Picks the move that points at the beacon; on a diagonal it flips a fair
/// coin between the two helpful moves, and once aligned with the beacon it
/// repeats the previous move.
#[derive(Clone, Debug, Default)]
pub struct CompassSupervisor;

impl CompassSupervisor {
    pub fn new() -> Self {
        CompassSupervisor
    }

    /// `None` when either unit is missing from the screen.
    pub fn action<R: Rng + ?Sized>(&self, reading: &ScreenReading, last: Option<Compass>, rng: &mut R) -> Option<Compass> {
        let (marine, beacon) = (reading.marine?, reading.beacon?);
        let dx = marine.x - beacon.x;
        let dy = marine.y - beacon.y;

        let horizontal = if dx > 0.0 {
            Some(Compass::Left)
        } else if dx < 0.0 {
            Some(Compass::Right)
        } else {
            None
        };
        let vertical = if dy > 0.0 {
            Some(Compass::Up)
        } else if dy < 0.0 {
            Some(Compass::Down)
        } else {
            None
        };

        Some(match (horizontal, vertical) {
            (None, None) => last.unwrap_or(Compass::Left),
            (Some(h), None) => h,
            (None, Some(v)) => v,
            (Some(h), Some(v)) => {
                if rng.gen_bool(0.5) {
                    h
                } else {
                    v
                }
            }
        })
    }
}
