use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompatError {
    #[error("failed to read {path}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: unexpected `)`")]
    UnexpectedClose { line: usize },

    #[error("line {line}: `(` is never closed")]
    Unclosed { line: usize },

    #[error("line {line}: {message}")]
    Statement { line: usize, message: String },
}
