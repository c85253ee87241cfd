// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// a specific goal (training, or evaluating with rescaling).
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Settings and setup shared by both workflows
pub mod experiment;

// The training workflow
pub mod train_use_case;

// The evaluate-only workflow (before / after rescaling)
pub mod evaluate_use_case;
