//! Daily canopy photosynthesis and transpiration
//!
//! Re-exports the core and component crates and adds TOML scenario
//! configuration through [`config::DcapstConfig`].

pub mod config;

pub use config::DcapstConfig;
pub use dcapst_components;
pub use dcapst_core;
