//! Water Parameters
//!
//! Constants of the leaf energy and water balance.

use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Physical constants of the leaf energy and water balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterParameters {
    /// Latent heat of vaporisation of water
    /// unit: J / kg
    /// default: 2447000.0
    pub latent_heat_of_vaporisation: FloatValue,

    /// Volumetric heat capacity of air
    /// unit: J / m^3 / K
    /// default: 1200.0
    pub volumetric_heat_capacity: FloatValue,

    /// unit: kPa / K
    /// default: 0.066
    pub psychrometric_constant: FloatValue,

    /// Ratio of boundary layer conductance of heat to that of water vapour
    /// unit: dimensionless
    /// default: 0.92
    pub boundary_heat_to_water: FloatValue,

    /// Ratio of boundary layer conductance of water vapour to that of CO2
    /// unit: dimensionless
    /// default: 1.37
    pub boundary_water_to_co2: FloatValue,

    /// Ratio of stomatal conductance of water vapour to that of CO2
    /// unit: dimensionless
    /// default: 1.6
    pub stomatal_water_to_co2: FloatValue,
}

impl Default for WaterParameters {
    fn default() -> Self {
        Self {
            latent_heat_of_vaporisation: 2447000.0,
            volumetric_heat_capacity: 1200.0,
            psychrometric_constant: 0.066,
            boundary_heat_to_water: 0.92,
            boundary_water_to_co2: 1.37,
            stomatal_water_to_co2: 1.6,
        }
    }
}
