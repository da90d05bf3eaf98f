use camino::Utf8PathBuf;
use thiserror::Error;

/// Load-time failures. Any of these means the database cannot answer queries.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("policy dump line {line}: {message}: {text}")]
    Dump {
        line: usize,
        message: String,
        text: String,
    },

    #[error("no type or attribute named `{0}` in policy")]
    UnknownSymbol(String),
}

impl PolicyError {
    pub(crate) fn dump(line: usize, message: impl Into<String>, text: &str) -> Self {
        PolicyError::Dump {
            line,
            message: message.into(),
            text: text.to_string(),
        }
    }
}
