pub mod reconciliation;
pub mod rules;

pub use reconciliation::InMemoryReconciliationMatcher;
pub use rules::{BasicRulesEngine, NoopRulesEngine};
