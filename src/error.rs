use std::path::PathBuf;

use thiserror::Error;

/// A payload entry the reconciler skipped or altered. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PayloadIssue {
    #[error("node #{index} has no identity and was skipped")]
    MissingIdentity { index: usize },
    #[error("node `{id}` appears more than once; the last entry wins")]
    DuplicateIdentity { id: String },
    #[error("node `{id}` is flagged as me but `{anchor}` already anchors the layout")]
    ExtraAnchor { id: String, anchor: String },
    #[error("link #{index} references unknown node `{id}` and was dropped")]
    DanglingLink { index: usize, id: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read layout config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse layout config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("layout config field `{field}` must be {expected}, got {value}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
        value: f32,
    },
}
