//! Leaf biochemistry
//!
//! - `temperature_response`: scaling of leaf rates to leaf temperature
//! - `pathway`: the pathway and limiting-process variants and their
//!   coefficient table
//! - `assimilation`: the generalised co-limitation quadratic

mod assimilation;
mod pathway;
mod temperature_response;

pub use assimilation::{smaller_root, solve_assimilation, Assimilation, AssimilationCoefficients};
pub use pathway::{build_coefficients, CoefficientInputs, LimitingProcess, Pathway};
pub use temperature_response::{
    arrhenius, electron_transport_rate, peaked, LeafRates, RatesAt25,
};
