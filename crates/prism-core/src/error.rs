//! Error types for the Prism batch pipeline.
//!
//! Errors are organized by concern so each failure carries the context needed
//! to decide how far it propagates: per image, per variant, or per session.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Prism operations.
#[derive(Error, Debug)]
pub enum PrismError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-image pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Coordinator/worker protocol errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Input image is absent; the image is skipped
    #[error("Worker {worker} cannot open {path} on {node}")]
    MissingInput {
        path: PathBuf,
        worker: usize,
        node: String,
    },

    /// Input exists but could not be decoded
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// A derived output could not be written
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// The per-image output directory could not be created
    #[error("Cannot create output directory {path}: {message}")]
    OutputDir { path: PathBuf, message: String },

    /// Appending to the metrics sink failed
    #[error("Metrics error for {path}: {message}")]
    Metrics { path: PathBuf, message: String },
}

/// Violations of the request/reply contract between coordinator and workers.
///
/// All of these are fatal to the session.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// A request arrived from a worker id outside the session
    #[error("Request from unknown worker {worker} (session has {workers} workers)")]
    UnknownWorker { worker: usize, workers: usize },

    /// A worker kept requesting after it had been told to stop
    #[error("Worker {0} requested work after receiving a stop signal")]
    StoppedWorkerRequested(usize),

    /// The coordinator is no longer accepting requests
    #[error("Coordinator closed while worker {0} was requesting")]
    SessionClosed(usize),

    /// The coordinator dropped a reply channel without answering
    #[error("Coordinator dropped the reply to worker {0}")]
    ReplyDropped(usize),

    /// A worker task terminated abnormally
    #[error("Worker {worker} terminated abnormally: {message}")]
    WorkerPanicked { worker: usize, message: String },
}

/// Convenience type alias for Prism results.
pub type Result<T> = std::result::Result<T, PrismError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
