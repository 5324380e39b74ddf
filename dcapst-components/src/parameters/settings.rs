//! Numerical settings of the daily simulation.

use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// How each hour's leaf temperature iteration is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafTemperatureSeed {
    /// Start from the leaf temperature the previous hour converged to, falling
    /// back to air temperature for the first hour and after a failure.
    #[default]
    PreviousHour,
    /// Start from air temperature every hour.
    AirTemperature,
}

/// Numerical controls for the daily loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// unit: hour
    /// default: 1.0
    pub time_step: FloatValue,

    /// Iterations of the leaf temperature fixed point after the initial pass
    /// default: 3
    pub max_iterations: usize,

    /// Initial assimilation below which no iteration is attempted
    /// unit: µmol CO2 / m^2 / s
    /// default: 0.5
    pub negligible_assimilation: FloatValue,

    /// Tolerance on the daily water supplied by the bisection
    /// unit: mm
    /// default: 1e-6
    pub bisection_tolerance: FloatValue,

    /// default: 1000
    pub max_bisection_iterations: usize,

    /// Soil water below which nothing is supplied
    /// unit: mm
    /// default: 1e-4
    pub min_soil_water: FloatValue,

    /// default: previous_hour
    pub leaf_temperature_seed: LeafTemperatureSeed,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            time_step: 1.0,
            max_iterations: 3,
            negligible_assimilation: 0.5,
            bisection_tolerance: 1e-6,
            max_bisection_iterations: 1000,
            min_soil_water: 1e-4,
            leaf_temperature_seed: LeafTemperatureSeed::PreviousHour,
        }
    }
}
