// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Each use case wires the data, ml, and infra layers together
// for one command. No tensor code and no printing here.

// `train`: fit a part and checkpoint on test MAE
pub mod train_use_case;

// `eval` and `count`: use the best checkpoint of a part
pub mod eval_use_case;

// `best`: inspect or clear the best-metric record
pub mod best_use_case;
