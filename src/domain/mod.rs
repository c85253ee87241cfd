// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums and traits describing a training run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain data, validation, and the seams other layers
//     implement
//
// Everything here is unit-testable without a backend.

/// Error taxonomy shared by every layer below the CLI
pub mod error;

/// Per-class training sample counts (long-tail profile)
pub mod frequency;

/// Epoch statistics, checkpoint records, run state
pub mod records;

/// The EpochRunner seam between orchestrator and ML layer
pub mod traits;

/// Backend-free classifier weight matrix
pub mod weights;

pub use error::TrainError;
