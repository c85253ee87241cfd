// ============================================================
// Layer 5 — Training Control
// ============================================================
// The backend-independent half of training. Nothing in here
// touches tensors; the epoch loop talks to the model only
// through the `EpochRunner` trait (Layer 3), so every piece
// here is testable with a scripted runner.
//
//   meter.rs        — running weighted averages of batch metrics
//   scheduler.rs    — step-decay learning rate, derived from the
//                     epoch index so resumes never double-decay
//   rescale.rs      — post-hoc classifier weight rescaling for
//                     long-tailed class distributions
//   orchestrator.rs — the epoch loop, best-accuracy tracking,
//                     checkpoint decisions and resume

/// Running weighted averages
pub mod meter;

/// Step-decay learning rate schedule
pub mod scheduler;

/// Frequency-aware classifier weight rescaling
pub mod rescale;

/// Epoch loop, checkpointing and resume
pub mod orchestrator;
