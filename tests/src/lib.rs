//! # Ledger Ingest Test Suite
//!
//! ```text
//! tests/
//! ├── benches/          # criterion benchmarks for the hot merge path
//! └── src/
//!     ├── fixtures.rs   # wired stack, transaction builders
//!     └── integration/  # cross-subsystem flows
//! ```
//!
//! ```bash
//! cargo test -p li-tests
//! cargo test -p li-tests integration::conflicts
//! cargo bench -p li-tests
//! ```

pub mod fixtures;
pub mod integration;
