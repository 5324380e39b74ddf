//! Core types for daily canopy photosynthesis and transpiration modelling.
//!
//! This crate holds the pieces shared by every model component:
//! - [`errors`]: the error taxonomy and result alias
//! - [`constants`]: physical constants
//! - [`environment`]: the solar, radiation and temperature capabilities the
//!   canopy model consumes, along with reference implementations of each

pub mod constants;
pub mod environment;
pub mod errors;

/// Floating point type used throughout the model.
pub type FloatValue = f64;
