// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::time::{SystemTime, UNIX_EPOCH};

/// One of the two conflicting vehicle approaches.
///
/// The priority road is the `NS` direction of the original wire format,
/// the non-priority road is `EW`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Approach {
    #[serde(alias = "NS", alias = "PRIORITY")]
    Priority,
    #[serde(alias = "EW", alias = "NONPRIORITY", alias = "NON_PRIORITY")]
    NonPriority,
}

impl Approach {
    pub const ALL: [Approach; 2] = [Approach::Priority, Approach::NonPriority];

    /// The conflicting approach.
    pub fn opposite(self) -> Self {
        match self {
            Approach::Priority => Approach::NonPriority,
            Approach::NonPriority => Approach::Priority,
        }
    }
}

impl fmt::Display for Approach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Approach::Priority => write!(f, "priority"),
            Approach::NonPriority => write!(f, "non-priority"),
        }
    }
}

/// A value held once per approach, serialized as `{ "priority": .., "nonPriority": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerApproach<T> {
    pub priority: T,
    pub non_priority: T,
}

impl<T> PerApproach<T> {
    pub fn new(priority: T, non_priority: T) -> Self {
        Self {
            priority,
            non_priority,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerApproach<U> {
        PerApproach {
            priority: f(&self.priority),
            non_priority: f(&self.non_priority),
        }
    }
}

impl<T> Index<Approach> for PerApproach<T> {
    type Output = T;

    fn index(&self, approach: Approach) -> &T {
        match approach {
            Approach::Priority => &self.priority,
            Approach::NonPriority => &self.non_priority,
        }
    }
}

impl<T> IndexMut<Approach> for PerApproach<T> {
    fn index_mut(&mut self, approach: Approach) -> &mut T {
        match approach {
            Approach::Priority => &mut self.priority,
            Approach::NonPriority => &mut self.non_priority,
        }
    }
}

/// Vehicle signal head colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColor {
    Green,
    Yellow,
    Red,
}

/// Pedestrian signal: WALK (green) or DON'T WALK (red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PedestrianLight {
    Green,
    Red,
}

/// Read-only projection of the controller, as published to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub phase: crate::control_system::phase::Phase,
    pub night_mode: bool,
    pub lights: PerApproach<LightColor>,
    pub pedestrian_lights: PerApproach<PedestrianLight>,
    pub queues: PerApproach<u32>,
    pub demands: PerApproach<bool>,
}

impl StateSnapshot {
    /// True when no conflicting signals are shown: at most one vehicle green, and
    /// each WALK crossing has its parallel vehicle approach on red.
    pub fn is_conflict_free(&self) -> bool {
        let both_green = self.lights.priority == LightColor::Green
            && self.lights.non_priority == LightColor::Green;
        let walk_conflict = Approach::ALL.into_iter().any(|approach| {
            self.pedestrian_lights[approach] == PedestrianLight::Green
                && self.lights[approach] != LightColor::Red
        });
        !both_green && !walk_conflict
    }
}

/// Seconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
