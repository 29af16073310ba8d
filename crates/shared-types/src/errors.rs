//! Error descriptors shared across subsystems.
//!
//! `FatalError` is data, not a Rust error: it is carried on events and stored
//! on failed batches.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Broad classification of a fatal extraction problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FatalErrorCode {
    AdapterError,
    ClientError,
    ServerError,
}

/// Details of a fatal error, stored on a failed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatalError {
    pub code: FatalErrorCode,
    pub sub_code: String,
    pub bag: BTreeMap<String, String>,
}

impl FatalError {
    pub fn new(code: FatalErrorCode, sub_code: impl Into<String>) -> Self {
        Self {
            code,
            sub_code: sub_code.into(),
            bag: BTreeMap::new(),
        }
    }

    pub fn with_bag_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.bag.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.code, self.sub_code)
    }
}
