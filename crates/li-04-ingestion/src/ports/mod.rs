pub mod inbound;
pub mod outbound;

pub use inbound::IngestionApi;
pub use outbound::{ReconciliationMatcher, RulesEngine};
