//! Storage-side domain: the statistics projection query.

pub mod projection;

pub use projection::BatchStatisticsProjection;
