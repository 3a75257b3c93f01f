use crate::control_system::clock::Clock;
use crate::control_system::signal_controller::SignalController;
use crate::global_variables::{
    CAR_PROBABILITY_NON_PRIORITY, CAR_PROBABILITY_PRIORITY, PEDESTRIAN_PROBABILITY,
};
use crate::shared_data::{Approach, PerApproach};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Per-tick probabilities of random arrivals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusRates {
    pub car: PerApproach<f64>,
    pub pedestrian: PerApproach<f64>,
}

impl Default for StimulusRates {
    fn default() -> Self {
        Self {
            car: PerApproach::new(CAR_PROBABILITY_PRIORITY, CAR_PROBABILITY_NON_PRIORITY),
            pedestrian: PerApproach::new(PEDESTRIAN_PROBABILITY, PEDESTRIAN_PROBABILITY),
        }
    }
}

/// What one call to [`inject_random_events`] produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InjectedEvents {
    pub cars: PerApproach<u32>,
    pub pedestrians: PerApproach<u32>,
}

impl InjectedEvents {
    pub fn total(&self) -> u32 {
        self.cars.priority
            + self.cars.non_priority
            + self.pedestrians.priority
            + self.pedestrians.non_priority
    }
}

fn chance<R: Rng>(rng: &mut R, probability: f64) -> bool {
    rng.random_bool(probability.clamp(0.0, 1.0))
}

/// Rolls the dice once per approach: maybe a car arrives, maybe a pedestrian
/// presses the button (only when no request is already pending).
pub fn inject_random_events<C: Clock, R: Rng>(
    controller: &mut SignalController<C>,
    rng: &mut R,
    rates: &StimulusRates,
) -> InjectedEvents {
    let mut injected = InjectedEvents::default();

    for approach in Approach::ALL {
        if chance(rng, rates.car[approach]) {
            controller.add_vehicle(approach);
            injected.cars[approach] += 1;
        }
    }

    for approach in Approach::ALL {
        if controller.demand_pending(approach) || !chance(rng, rates.pedestrian[approach]) {
            continue;
        }
        if controller.request_pedestrian(approach) {
            injected.pedestrians[approach] += 1;
        }
    }

    injected
}
