use std::path::PathBuf;
use spdhg_core::solver::SolverError;
use thiserror::Error;

/// Harness errors.
///
/// All of them are fatal for the experiment.
#[derive(Debug, Error)]
pub enum BenchError
{
    /// A persisted artifact does not deserialize into the expected shape.
    ///
    /// Never recovered by recomputing, since that would draw different random numbers.
    #[error("cache corruption at {path}: {reason}")]
    CacheCorruption
    {
        path: PathBuf,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Drawing a chart failed.
    #[error("plot error: {0}")]
    Plot(String),
}
