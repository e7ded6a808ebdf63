use std::path::PathBuf;

use crate::collector::procfs::parser::ParseError;

/// Error type for sampler failures.
///
/// Every variant names the interface that failed so the collector can log
/// the cause next to the sampler name.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// The OS interface could not be read (missing file, permissions).
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The interface was readable but its content had an unexpected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// CPU counters did not advance between the two reads.
    #[error("cpu counters in {} did not advance between reads", path.display())]
    Stalled { path: PathBuf },
}

impl CollectError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CollectError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: ParseError) -> Self {
        CollectError::Parse {
            path: path.into(),
            source,
        }
    }
}
