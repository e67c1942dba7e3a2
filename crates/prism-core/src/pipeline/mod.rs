//! Per-image pipeline components.
//!
//! - **layout**: work items and the ordinal-to-path mapping
//! - **transform**: the six derived variants
//! - **worker**: decode, fan out, encode, record metrics
//! - **discovery**: pre-run inventory of the input directory

pub mod discovery;
pub mod layout;
pub mod transform;
pub mod worker;

// Re-exports for convenient access
pub use discovery::Inventory;
pub use layout::{BatchLayout, WorkItem, TRANSFORM_DIR};
pub use transform::Transform;
pub use worker::{ImageOutcome, WorkerPipeline};
