use sepguard_types::ContextParseError;
use thiserror::Error;

/// Line-scoped parse failures. `line` is 1-based and `text` is the trimmed input line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ContextsError {
    #[error("line {line}: expected `path [file-kind] label`, found {found} field(s): {text}")]
    FieldCount {
        line: usize,
        found: usize,
        text: String,
    },

    #[error("line {line}: unknown file kind `{kind}`: {text}")]
    UnknownFileKind {
        line: usize,
        kind: String,
        text: String,
    },

    #[error("line {line}: {source}")]
    Context {
        line: usize,
        text: String,
        #[source]
        source: ContextParseError,
    },

    #[error("line {line}: malformed property_contexts entry: {text}")]
    PropertyEntry { line: usize, text: String },
}

impl ContextsError {
    pub fn line(&self) -> usize {
        match self {
            ContextsError::FieldCount { line, .. }
            | ContextsError::UnknownFileKind { line, .. }
            | ContextsError::Context { line, .. }
            | ContextsError::PropertyEntry { line, .. } => *line,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ContextsError::FieldCount { text, .. }
            | ContextsError::UnknownFileKind { text, .. }
            | ContextsError::Context { text, .. }
            | ContextsError::PropertyEntry { text, .. } => text,
        }
    }
}
