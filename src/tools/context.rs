use crate::browser::PageDriver;
use crate::checkout::{CardDetails, CheckoutRequest, DecisionPoint, ShippingAddress};
use crate::discovery::LearnedSelectors;
use crate::fill::FillEngine;

/// Customer data and everything the tools recorded during one checkout
#[derive(Debug, Clone)]
pub struct CheckoutState {
    pub email: String,
    pub shipping: ShippingAddress,
    pub card: CardDetails,

    /// Selectors tried before the universal candidates
    pub seeds: LearnedSelectors,

    /// Selectors the fill tools actually used
    pub fill_results: LearnedSelectors,

    pub decision_points: Vec<DecisionPoint>,
    pub engine: FillEngine,
}

impl CheckoutState {
    pub fn new(request: &CheckoutRequest, seeds: LearnedSelectors) -> Self {
        Self {
            email: request.email.clone(),
            shipping: request.shipping.clone(),
            card: request.card.clone(),
            seeds,
            fill_results: LearnedSelectors::default(),
            decision_points: Vec::new(),
            engine: FillEngine::new(),
        }
    }

    pub fn with_engine(mut self, engine: FillEngine) -> Self {
        self.engine = engine;
        self
    }
}

/// Context passed to each tool call
pub struct ToolContext<'a> {
    pub driver: &'a dyn PageDriver,
    pub state: CheckoutState,
}

impl<'a> ToolContext<'a> {
    pub fn new(driver: &'a dyn PageDriver, state: CheckoutState) -> Self {
        Self { driver, state }
    }
}
