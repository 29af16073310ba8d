//! Pure batch lifecycle logic.

pub mod debounce;
pub mod statistics;
pub mod status;

pub use debounce::DebounceCoordinator;
pub use statistics::BatchStatisticsView;
pub use status::calculate_batch_status;
