// ============================================================
// Layer 7 — Infrastructure Layer
// ============================================================
// Durable artifacts of a run:
//
//   checkpoint.rs — latest / best checkpoint directories with
//                   staged writes and integrity digests, plus
//                   the persisted run configuration
//
//   run_log.rs    — append-only, one line per epoch
//
// Nothing here knows about tensors; model and optimizer state
// arrive as opaque byte blobs from the ML layer.

/// Checkpoint persistence (latest + best)
pub mod checkpoint;

/// Human-readable per-epoch run log
pub mod run_log;
