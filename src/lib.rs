//! Port coordinate enrichment for UNLOCODE data.

pub mod batch;
pub mod config;
pub mod coords;
pub mod geocode;
pub mod logging;
