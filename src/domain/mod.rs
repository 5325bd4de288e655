// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the crowd counting problem:
// which dataset part we train on, which split of it, what a
// density map is, and what the best-metric record contains.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Dataset part (A or B) and split (train or test)
pub mod part;

// A 2-D per-pixel density map whose sum is a head count
pub mod density_map;

// The best held-out MAE recorded for each dataset part
pub mod best_vals;

// Core abstractions (traits) that other layers implement
pub mod traits;
