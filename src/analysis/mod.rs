/// Water-level analysis for the flood map service.
///
/// This module turns raw station rows into a numeric series, estimates the
/// recent trend, projects a short forecast, and shapes the results for
/// display. Everything here is pure: no I/O, no shared state.
///
/// Submodules:
/// - `series`: column mapping and best-effort numeric extraction.
/// - `trend`: mean per-step change over a recent window.
/// - `forecast`: bounded 24-hour projection.
/// - `presentation`: chart model and paginated tables.

pub mod forecast;
pub mod presentation;
pub mod series;
pub mod trend;
