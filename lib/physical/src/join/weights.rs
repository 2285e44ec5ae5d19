use sparql_bus_core::PickBest;
use sparql_bus_query::{JoinBus, JoinCoefficients, JoinMediator};
use std::sync::Arc;

/// Weights that turn [JoinCoefficients] into a single cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JoinCostWeights {
    pub iterations: f64,
    pub persisted_items: f64,
    pub blocking_items: f64,
    pub request_time: f64,
}

impl JoinCostWeights {
    /// Returns the weighted sum of `coefficients`.
    pub fn cost(&self, coefficients: &JoinCoefficients) -> f64 {
        self.iterations * coefficients.iterations
            + self.persisted_items * coefficients.persisted_items
            + self.blocking_items * coefficients.blocking_items
            + self.request_time * coefficients.request_time
    }
}

impl Default for JoinCostWeights {
    fn default() -> Self {
        Self {
            iterations: 1.0,
            persisted_items: 1.0,
            blocking_items: 1.0,
            request_time: 1.0,
        }
    }
}

/// Creates a mediator for `bus` that runs the join actor with the lowest weighted cost.
pub fn join_mediator(bus: Arc<JoinBus>, weights: JoinCostWeights) -> JoinMediator {
    Arc::new(PickBest::by_scalar(bus, move |coefficients| {
        weights.cost(coefficients)
    }))
}
