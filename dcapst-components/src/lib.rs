//! Canopy photosynthesis and transpiration components
//!
//! This crate implements a daily two-leaf canopy model of CO2 assimilation and
//! transpiration for C3, C4 and CCM crops.
//!
//! # Module Organisation
//!
//! Components are organised from the leaf outwards:
//! - `photosynthesis`: temperature responses and the co-limited assimilation
//!   solver for each pathway
//! - `canopy`: radiation partitioning between sunlit and shaded leaves and the
//!   structural quantities scaled with them
//! - `water`: the leaf energy and water balance
//! - `leaf` and `coupler`: leaf fractions and the fixed point that couples
//!   assimilation with leaf temperature
//! - `daily`: the daily loop and water supply limitation
//!
//! # Parameters
//!
//! Parameter structs live in the `parameters` module, with defaults for wheat
//! (C3), sorghum (C4) and a CCM crop.

pub mod canopy;
pub mod coupler;
pub mod daily;
pub mod leaf;
pub mod parameters;
pub mod photosynthesis;
pub mod results;
pub mod water;

pub use daily::{limit_water_supply, DailyInputs, DcapstModel, DcapstModelBuilder};
pub use results::{DailyOutcome, DailyResult, IntervalRecord, IntervalValues};
