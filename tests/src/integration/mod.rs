//! Cross-subsystem flows, driven either through the bus or the ingestion API.

mod conflicts;
mod extraction;
mod reconciliation;
mod reprocessing;
