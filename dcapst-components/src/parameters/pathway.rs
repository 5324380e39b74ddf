//! Pathway Parameters
//!
//! Biochemical constants for the C3, C4 and CCM photosynthetic pathways.
//!
//! # Reference
//!
//! Wheat (C3) and sorghum (C4) values follow von Caemmerer (2000) and
//! Wu et al. (2019). The CCM set is a C3 leaf carrying a bundle-sheath-like
//! CO2 concentrating compartment.

use crate::photosynthesis::Pathway;
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// An Arrhenius-type temperature response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrheniusResponse {
    /// Value at 25 °C
    pub at_25: FloatValue,

    /// Activation energy
    /// unit: J / mol
    pub factor: FloatValue,
}

/// A peaked temperature response with a temperature optimum.
///
/// The response is zero at or beyond `t_min` and `t_max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakedResponse {
    /// unit: °C
    pub t_min: FloatValue,

    /// unit: °C
    pub t_opt: FloatValue,

    /// unit: °C
    pub t_max: FloatValue,

    /// Normalising factor, the value of the unscaled curve at 25 °C
    pub c: FloatValue,

    /// Shape exponent
    pub beta: FloatValue,
}

impl PeakedResponse {
    /// True if `temperature` lies strictly inside the valid range of the curve
    pub fn is_within_range(&self, temperature: FloatValue) -> bool {
        temperature > self.t_min && temperature < self.t_max
    }
}

/// Parameters for one photosynthetic pathway.
///
/// Leaf-level rates at 25 °C are not given directly. They are derived from the
/// photosynthetic nitrogen of each leaf fraction through the `*_sln_ratio`
/// fields, then scaled to leaf temperature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayParameters {
    pub pathway: Pathway,

    /// Ratio of intercellular to air CO2 under unlimited water supply
    /// unit: dimensionless
    /// default: 0.7 (C3), 0.45 (C4)
    pub intercellular_to_air_co2_ratio: FloatValue,

    /// Rd at 25 °C per unit photosynthetic nitrogen
    /// unit: µmol / mmol N / s
    /// default: 0.011 (C3), 0.0069 (C4)
    pub rd_sln_ratio: FloatValue,

    /// Vcmax at 25 °C per unit photosynthetic nitrogen
    /// unit: µmol / mmol N / s
    /// default: 1.1 (C3), 0.465 (C4)
    pub vcmax_sln_ratio: FloatValue,

    /// Jmax at 25 °C per unit photosynthetic nitrogen
    /// unit: µmol / mmol N / s
    /// default: 1.9484 (C3), 2.7 (C4)
    pub jmax_sln_ratio: FloatValue,

    /// Vpmax at 25 °C per unit photosynthetic nitrogen
    /// unit: µmol / mmol N / s
    /// default: 0.0 (C3), 1.55 (C4), 0.6 (CCM)
    pub vpmax_sln_ratio: FloatValue,

    /// Mesophyll conductance at 25 °C per unit photosynthetic nitrogen
    /// unit: mol / mmol N / s / bar
    /// default: 0.0047 (C3), 0.0135 (C4)
    pub gm_sln_ratio: FloatValue,

    /// Fraction of electron transport partitioned to the mesophyll
    /// unit: dimensionless
    /// default: 0.4 (C4), 0.1 (CCM)
    pub mesophyll_electron_fraction: FloatValue,

    /// ATP produced per electron transported
    /// unit: dimensionless
    /// default: 1.0
    pub atp_production_factor: FloatValue,

    /// Additional ATP cost of the concentrating mechanism
    /// unit: dimensionless
    /// default: 0.0
    pub extra_atp_cost: FloatValue,

    /// Fraction of absorbed light not used by photosystem II
    /// unit: dimensionless
    /// default: 0.15
    pub spectral_correction_factor: FloatValue,

    /// Fraction of PSII activity in the bundle sheath
    /// unit: dimensionless
    /// default: 0.1 (C4), 1.0 (CCM)
    pub ps2_activity_in_bundle_sheath: FloatValue,

    /// Bundle sheath conductance per unit leaf area
    /// unit: mol / m^2 / s / bar
    /// default: 0.003 (C4), 0.03 (CCM)
    pub bundle_sheath_conductance: FloatValue,

    /// PEP regeneration rate per unit leaf area
    /// unit: µmol / m^2 / s
    /// default: 80.0 (C4), 40.0 (CCM)
    pub pep_regeneration: FloatValue,

    /// unit: J / mol
    pub vcmax_activation: FloatValue,

    /// unit: J / mol
    pub rd_activation: FloatValue,

    /// unit: J / mol
    pub vpmax_activation: FloatValue,

    /// Michaelis-Menten constant of Rubisco for CO2
    /// unit: µbar
    pub kc: ArrheniusResponse,

    /// Michaelis-Menten constant of Rubisco for O2
    /// unit: µbar
    pub ko: ArrheniusResponse,

    /// Ratio of maximum carboxylation to oxygenation rates
    pub vc_vo: ArrheniusResponse,

    /// Michaelis-Menten constant of PEP carboxylase for CO2
    /// unit: µbar
    pub kp: ArrheniusResponse,

    pub jmax_response: PeakedResponse,

    pub gm_response: PeakedResponse,
}

impl PathwayParameters {
    /// Wheat
    pub fn c3() -> Self {
        Self {
            pathway: Pathway::C3,
            intercellular_to_air_co2_ratio: 0.7,
            rd_sln_ratio: 0.011,
            vcmax_sln_ratio: 1.1,
            jmax_sln_ratio: 1.9484,
            vpmax_sln_ratio: 0.0,
            gm_sln_ratio: 0.0047,
            mesophyll_electron_fraction: 0.0,
            atp_production_factor: 1.0,
            extra_atp_cost: 0.0,
            spectral_correction_factor: 0.15,
            ps2_activity_in_bundle_sheath: 0.0,
            bundle_sheath_conductance: 0.0,
            pep_regeneration: 0.0,
            kc: ArrheniusResponse {
                at_25: 273.422964,
                factor: 93720.0,
            },
            ko: ArrheniusResponse {
                at_25: 165824.064,
                factor: 33600.0,
            },
            vc_vo: ArrheniusResponse {
                at_25: 4.59217066,
                factor: 35713.19871,
            },
            kp: ArrheniusResponse {
                at_25: 0.0,
                factor: 0.0,
            },
            vcmax_activation: 65330.0,
            rd_activation: 46390.0,
            vpmax_activation: 0.0,
            jmax_response: PeakedResponse {
                t_min: 0.0,
                t_opt: 30.0,
                t_max: 45.0,
                c: 0.928291,
                beta: 1.0,
            },
            gm_response: PeakedResponse {
                t_min: 0.0,
                t_opt: 29.2338417788683,
                t_max: 45.0,
                c: 0.950583,
                beta: 1.0,
            },
        }
    }

    /// Sorghum
    pub fn c4() -> Self {
        Self {
            pathway: Pathway::C4,
            intercellular_to_air_co2_ratio: 0.45,
            rd_sln_ratio: 0.0069,
            vcmax_sln_ratio: 0.465,
            jmax_sln_ratio: 2.7,
            vpmax_sln_ratio: 1.55,
            gm_sln_ratio: 0.0135,
            mesophyll_electron_fraction: 0.4,
            atp_production_factor: 1.0,
            extra_atp_cost: 0.0,
            spectral_correction_factor: 0.15,
            ps2_activity_in_bundle_sheath: 0.1,
            bundle_sheath_conductance: 0.003,
            pep_regeneration: 80.0,
            kc: ArrheniusResponse {
                at_25: 1210.0,
                factor: 64200.0,
            },
            ko: ArrheniusResponse {
                at_25: 292000.0,
                factor: 10500.0,
            },
            vc_vo: ArrheniusResponse {
                at_25: 5.51328906454566,
                factor: 21265.4029552906,
            },
            kp: ArrheniusResponse {
                at_25: 75.0,
                factor: 36300.0,
            },
            vcmax_activation: 78000.0,
            rd_activation: 46390.0,
            vpmax_activation: 57043.2677,
            jmax_response: PeakedResponse {
                t_min: 0.0,
                t_opt: 37.869,
                t_max: 55.0,
                c: 0.711019,
                beta: 1.0,
            },
            gm_response: PeakedResponse {
                t_min: 0.0,
                t_opt: 42.0,
                t_max: 55.0,
                c: 0.457640,
                beta: 1.0,
            },
        }
    }

    /// A C3 leaf with a carbon concentrating mechanism
    pub fn ccm() -> Self {
        Self {
            pathway: Pathway::Ccm,
            vpmax_sln_ratio: 0.6,
            mesophyll_electron_fraction: 0.1,
            ps2_activity_in_bundle_sheath: 1.0,
            bundle_sheath_conductance: 0.03,
            pep_regeneration: 40.0,
            kp: ArrheniusResponse {
                at_25: 75.0,
                factor: 36300.0,
            },
            vpmax_activation: 57043.2677,
            ..Self::c3()
        }
    }

    /// Default parameter set for a pathway
    pub fn for_pathway(pathway: Pathway) -> Self {
        match pathway {
            Pathway::C3 => Self::c3(),
            Pathway::C4 => Self::c4(),
            Pathway::Ccm => Self::ccm(),
        }
    }

    /// True if leaf temperature lies inside the valid range of both the
    /// electron transport and mesophyll conductance responses
    pub fn is_sensible_temperature(&self, temperature: FloatValue) -> bool {
        self.jmax_response.is_within_range(temperature)
            && self.gm_response.is_within_range(temperature)
    }
}

impl Default for PathwayParameters {
    fn default() -> Self {
        Self::c3()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ccm_extends_c3() {
        let c3 = PathwayParameters::c3();
        let ccm = PathwayParameters::ccm();

        assert_eq!(ccm.pathway, Pathway::Ccm);
        assert_eq!(ccm.vcmax_sln_ratio, c3.vcmax_sln_ratio);
        assert_eq!(ccm.kc, c3.kc);
        assert_eq!(ccm.jmax_response, c3.jmax_response);
        assert!(ccm.vpmax_sln_ratio > 0.0);
        assert!(ccm.bundle_sheath_conductance > 0.0);
    }

    #[test]
    fn test_sensible_temperature() {
        let c3 = PathwayParameters::c3();
        assert!(c3.is_sensible_temperature(25.0));
        assert!(!c3.is_sensible_temperature(0.0));
        assert!(!c3.is_sensible_temperature(45.0));
        assert!(!c3.is_sensible_temperature(-3.0));

        // C4 tolerates hotter leaves
        assert!(PathwayParameters::c4().is_sensible_temperature(50.0));
    }

    #[test]
    fn test_serde_round_trip() {
        let params = PathwayParameters::c4();
        let json = serde_json::to_string(&params).unwrap();
        let parsed: PathwayParameters = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.pathway, Pathway::C4);
        assert_eq!(parsed.kp, params.kp);
        assert_eq!(parsed.gm_response.t_opt, 42.0);
        assert!((parsed.gm_response.c - params.gm_response.c).abs() < 1e-12);
    }
}
