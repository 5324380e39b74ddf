//! Canopy Parameters
//!
//! Structural, optical and atmospheric constants of a single-layer canopy.

use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Optical properties of the canopy for one waveband.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiationBand {
    /// Extinction coefficient for diffuse radiation
    /// unit: dimensionless
    pub diffuse_extinction: FloatValue,

    /// Leaf scattering coefficient
    /// unit: dimensionless
    pub leaf_scattering: FloatValue,

    /// Canopy reflection coefficient for diffuse radiation
    /// unit: dimensionless
    pub diffuse_reflection: FloatValue,
}

impl RadiationBand {
    /// Photosynthetically active band
    pub fn par() -> Self {
        Self {
            diffuse_extinction: 0.78,
            leaf_scattering: 0.15,
            diffuse_reflection: 0.036,
        }
    }

    /// Near infrared band
    pub fn nir() -> Self {
        Self {
            diffuse_extinction: 0.8,
            leaf_scattering: 0.8,
            diffuse_reflection: 0.389,
        }
    }
}

/// Parameters describing the canopy and the air around it.
///
/// These are fixed for a whole simulation and shared by every pathway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanopyParameters {
    /// Partial pressure of CO2 in air
    /// unit: µbar
    /// default: 380.0
    pub air_co2: FloatValue,

    /// Partial pressure of O2 in air
    /// unit: µbar
    /// default: 210000.0
    pub air_o2: FloatValue,

    /// Mean leaf inclination from horizontal
    /// unit: degrees
    /// default: 60.0
    pub leaf_angle: FloatValue,

    /// unit: m
    /// default: 0.15
    pub leaf_width: FloatValue,

    /// Wind speed at the top of the canopy
    /// unit: m / s
    /// default: 1.5
    pub wind_speed: FloatValue,

    /// Extinction coefficient of wind speed through the canopy
    /// unit: dimensionless
    /// default: 1.5
    pub wind_speed_extinction: FloatValue,

    /// Convexity of the light response of electron transport
    /// unit: dimensionless
    /// default: 0.7
    pub curvature_factor: FloatValue,

    /// Ratio of diffusivity to solubility of CO2 relative to O2
    /// unit: dimensionless
    /// default: 0.047
    pub diffusivity_solubility_ratio: FloatValue,

    /// Leaf nitrogen that does not take part in photosynthesis
    /// unit: mmol N / m^2
    /// default: 14.0
    pub structural_nitrogen: FloatValue,

    /// Ratio of SLN at the top of the canopy to the canopy average
    /// unit: dimensionless
    /// default: 1.3
    pub sln_ratio_top: FloatValue,

    /// Biomass produced per unit of CO2 fixed
    /// unit: g biomass / g CO2
    /// default: 0.409
    pub biomass_conversion: FloatValue,

    /// default: kd=0.78, σ=0.15, ρcd=0.036
    pub par: RadiationBand,

    /// default: kd=0.8, σ=0.8, ρcd=0.389
    pub nir: RadiationBand,
}

impl Default for CanopyParameters {
    fn default() -> Self {
        Self {
            air_co2: 380.0,
            air_o2: 210000.0,
            leaf_angle: 60.0,
            leaf_width: 0.15,
            wind_speed: 1.5,
            wind_speed_extinction: 1.5,
            par: RadiationBand::par(),
            nir: RadiationBand::nir(),
            curvature_factor: 0.7,
            diffusivity_solubility_ratio: 0.047,
            structural_nitrogen: 14.0,
            sln_ratio_top: 1.3,
            biomass_conversion: 0.409,
        }
    }
}

impl CanopyParameters {
    /// Leaf angle in radians
    pub fn leaf_angle_radians(&self) -> FloatValue {
        self.leaf_angle.to_radians()
    }
}
