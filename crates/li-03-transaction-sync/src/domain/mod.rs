pub mod classification;

pub use classification::{classify, version_conflict_violation, SyncOutcome};
