/// Flood status and alerting.
///
/// Submodules:
/// - `thresholds`: classifies current levels as Normal / Warning / Danger.

pub mod thresholds;
