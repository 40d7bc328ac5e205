//! Ping River flood map service.
//!
//! Fetches hourly water levels for the RID gauge stations around Chiang Mai,
//! classifies each station's flood status, and projects a bounded 24-hour
//! water-level forecast for a selected station.
//!
//! Modules:
//! - `model`: shared types, constants and the error enum.
//! - `stations`: station registry.
//! - `analysis`: series extraction, trend, forecast, chart/table models.
//! - `alert`: flood status classification.
//! - `ingest`: RID web service and hydro-1 export clients.
//! - `cache`: on-disk cache of downloaded data.
//! - `config`: TOML + environment configuration.
//! - `logging`: structured console/file logging.

pub mod alert;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod stations;
