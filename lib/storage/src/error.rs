use std::io;
use std::path::PathBuf;

/// An error raised while loading statements into the store.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A line that is not a single valid statement. Line numbers start at 1.
    #[error("Invalid statement on line {line} ({message}): {content}")]
    Syntax {
        line: usize,
        content: String,
        message: String,
    },
}
