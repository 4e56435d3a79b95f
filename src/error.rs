use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run. Per-item and per-image defects never reach this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(
        "dataset download failed: {source}\n\
         hint: open {endpoint} in a browser and save the response as {}",
        .cache.display()
    )]
    Fetch {
        endpoint: String,
        cache: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "dataset download interrupted: {source}\n\
         hint: open {endpoint} in a browser and save the response as {}",
        .cache.display()
    )]
    FetchBody {
        endpoint: String,
        cache: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data file not found: {}", .0.display())]
    MissingCache(PathBuf),

    #[error("failed to parse {} (file may be incomplete): {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
