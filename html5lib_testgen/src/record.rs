//! The html5lib tokenizer fixture schema, as far as generation needs it.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One upstream test case.
///
/// Only presence matters for `errors` and `initial_states`; their contents are
/// the tokenizer's business, not ours. A JSON `null` counts as absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TestRecord {
    pub description: String,
    pub input: String,
    #[serde(default)]
    pub errors: Option<Value>,
    #[serde(default, rename = "initialStates")]
    pub initial_states: Option<Value>,
}

impl TestRecord {
    /// Record with neither `errors` nor `initialStates`.
    pub fn new(description: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            input: input.into(),
            errors: None,
            initial_states: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_initial_states(mut self, states: Value) -> Self {
        self.initial_states = Some(states);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.errors.is_some()
    }

    /// Multi-state cases are not generated.
    pub fn has_initial_states(&self) -> bool {
        self.initial_states.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct RawSuite {
    #[serde(default)]
    tests: Vec<Value>,
}

/// Errors raised while reading a fixture document.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("fixture is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// A single entry of `tests` did not have the expected shape.
    #[error("test #{index} is malformed")]
    Malformed {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a fixture document into its test records, in fixture order.
///
/// A document without a `tests` key yields no records. Any record missing
/// `description` or `input` fails the whole document.
///
/// # Errors
/// [`RecordError::Json`] for documents that are not a JSON object,
/// [`RecordError::Malformed`] for the first bad entry.
pub fn parse_suite(json: &str) -> Result<Vec<TestRecord>, RecordError> {
    let suite: RawSuite = serde_json::from_str(json)?;
    suite
        .tests
        .into_iter()
        .enumerate()
        .map(|(index, raw)| serde_json::from_value(raw).map_err(|source| RecordError::Malformed { index, source }))
        .collect()
}
