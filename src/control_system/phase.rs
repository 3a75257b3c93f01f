use crate::shared_data::{Approach, LightColor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Discrete signal phase of the intersection.
///
/// Light colours are derived from the phase, so two greens can never be
/// asserted at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "PRIORITY_GREEN")]
    PriorityGreen,
    #[serde(rename = "PRIORITY_YELLOW")]
    PriorityYellow,
    #[serde(rename = "NONPRIORITY_GREEN")]
    NonPriorityGreen,
    #[serde(rename = "NONPRIORITY_YELLOW")]
    NonPriorityYellow,
    #[serde(rename = "ALL_RED")]
    AllRed,
    #[serde(rename = "FLASHING_YELLOW")]
    FlashingYellow,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::PriorityGreen,
        Phase::PriorityYellow,
        Phase::NonPriorityGreen,
        Phase::NonPriorityYellow,
        Phase::AllRed,
        Phase::FlashingYellow,
    ];

    /// Green phase that gives right-of-way to `approach`.
    pub fn green_for(approach: Approach) -> Self {
        match approach {
            Approach::Priority => Phase::PriorityGreen,
            Approach::NonPriority => Phase::NonPriorityGreen,
        }
    }

    /// The approach holding a green in this phase.
    pub fn green_approach(self) -> Option<Approach> {
        match self {
            Phase::PriorityGreen => Some(Approach::Priority),
            Phase::NonPriorityGreen => Some(Approach::NonPriority),
            _ => None,
        }
    }

    /// Colour shown to vehicles on `approach` during this phase.
    pub fn vehicle_light(self, approach: Approach) -> LightColor {
        match (self, approach) {
            (Phase::PriorityGreen, Approach::Priority)
            | (Phase::NonPriorityGreen, Approach::NonPriority) => LightColor::Green,
            (Phase::PriorityYellow, Approach::Priority)
            | (Phase::NonPriorityYellow, Approach::NonPriority)
            | (Phase::FlashingYellow, _) => LightColor::Yellow,
            _ => LightColor::Red,
        }
    }

    /// Whether the phase belongs to the night-mode cycle.
    pub fn is_night_phase(self) -> bool {
        matches!(self, Phase::AllRed | Phase::FlashingYellow)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::PriorityGreen => "PRIORITY_GREEN",
            Phase::PriorityYellow => "PRIORITY_YELLOW",
            Phase::NonPriorityGreen => "NONPRIORITY_GREEN",
            Phase::NonPriorityYellow => "NONPRIORITY_YELLOW",
            Phase::AllRed => "ALL_RED",
            Phase::FlashingYellow => "FLASHING_YELLOW",
        };
        f.write_str(name)
    }
}

/// A single phase transition made by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub from: Phase,
    pub to: Phase,
    /// Clock reading at which the new phase started.
    pub at: Duration,
    pub night_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_phase_shows_two_greens() {
        for phase in Phase::ALL {
            let greens = Approach::ALL
                .into_iter()
                .filter(|&a| phase.vehicle_light(a) == LightColor::Green)
                .count();
            assert!(greens <= 1, "{phase} shows {greens} greens");
        }
    }

    #[test]
    fn green_approach_matches_lights() {
        for phase in Phase::ALL {
            if let Some(approach) = phase.green_approach() {
                assert_eq!(phase.vehicle_light(approach), LightColor::Green);
                assert_eq!(phase.vehicle_light(approach.opposite()), LightColor::Red);
                assert_eq!(Phase::green_for(approach), phase);
            }
        }
    }

    #[test]
    fn flashing_yellow_shows_yellow_everywhere() {
        assert_eq!(
            Phase::FlashingYellow.vehicle_light(Approach::Priority),
            LightColor::Yellow
        );
        assert_eq!(
            Phase::FlashingYellow.vehicle_light(Approach::NonPriority),
            LightColor::Yellow
        );
    }

    #[test]
    fn serializes_with_signal_plan_names() {
        let json = serde_json::to_string(&Phase::NonPriorityYellow).unwrap();
        assert_eq!(json, "\"NONPRIORITY_YELLOW\"");
        assert_eq!(Phase::NonPriorityYellow.to_string(), "NONPRIORITY_YELLOW");
    }
}
