//! Runtime-level adapters.

pub mod metered_publisher;

pub use metered_publisher::MeteredPublisher;
