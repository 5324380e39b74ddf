//! Pathway and limiting-process variants
//!
//! The assimilation quadratic is parameterised per `{pathway, process}` pair.
//! Each supported pair has an entry in a small table of coefficient builders;
//! a pair without an entry (C3 has no CO2-supply limitation) is a usage error.

use super::assimilation::AssimilationCoefficients;
use super::temperature_response::LeafRates;
use crate::parameters::{CanopyParameters, PathwayParameters};
use dcapst_core::errors::{DcapstError, DcapstResult};
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biochemical CO2 fixation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pathway {
    C3,
    C4,
    /// C3 with a carbon concentrating mechanism
    Ccm,
}

impl Pathway {
    /// The processes that co-limit assimilation for this pathway
    pub fn limiting_processes(&self) -> &'static [LimitingProcess] {
        match self {
            Pathway::C3 => &[LimitingProcess::Ac1, LimitingProcess::Aj],
            Pathway::C4 | Pathway::Ccm => &[
                LimitingProcess::Ac1,
                LimitingProcess::Ac2,
                LimitingProcess::Aj,
            ],
        }
    }
}

impl fmt::Display for Pathway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pathway::C3 => write!(f, "C3"),
            Pathway::C4 => write!(f, "C4"),
            Pathway::Ccm => write!(f, "CCM"),
        }
    }
}

/// Process limiting the rate of CO2 assimilation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LimitingProcess {
    /// Rubisco carboxylation
    Ac1,
    /// CO2 supply through PEP regeneration
    Ac2,
    /// Electron transport
    Aj,
}

impl fmt::Display for LimitingProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitingProcess::Ac1 => write!(f, "Rubisco-limited (Ac1)"),
            LimitingProcess::Ac2 => write!(f, "CO2-limited (Ac2)"),
            LimitingProcess::Aj => write!(f, "electron-transport-limited (Aj)"),
        }
    }
}

/// Everything a coefficient builder needs for one leaf fraction and one pass.
#[derive(Debug, Clone, Copy)]
pub struct CoefficientInputs<'a> {
    pub pathway: &'a PathwayParameters,
    pub canopy: &'a CanopyParameters,
    pub rates: &'a LeafRates,
    /// Leaf area of the fraction
    pub lai: FloatValue,
    /// Mesophyll CO2 from the previous pass
    /// unit: µbar
    pub mesophyll_co2: FloatValue,
    /// Chloroplastic CO2 from the previous pass
    /// unit: µbar
    pub chloroplastic_co2: FloatValue,
    /// Chloroplastic O2 from the previous pass
    /// unit: µbar
    pub chloroplastic_o2: FloatValue,
}

type CoefficientBuilder = fn(&CoefficientInputs) -> AssimilationCoefficients;

fn builder(pathway: Pathway, process: LimitingProcess) -> Option<CoefficientBuilder> {
    let build: CoefficientBuilder = match (pathway, process) {
        (Pathway::C3, LimitingProcess::Ac1) => c3_rubisco,
        (Pathway::C3, LimitingProcess::Ac2) => return None,
        (Pathway::C3, LimitingProcess::Aj) => c3_electron,
        (Pathway::C4, LimitingProcess::Ac1) => c4_rubisco,
        (Pathway::C4, LimitingProcess::Ac2) => c4_co2_supply,
        (Pathway::C4, LimitingProcess::Aj) => c4_electron,
        (Pathway::Ccm, LimitingProcess::Ac1) => ccm_rubisco,
        (Pathway::Ccm, LimitingProcess::Ac2) => ccm_co2_supply,
        (Pathway::Ccm, LimitingProcess::Aj) => ccm_electron,
    };
    Some(build)
}

/// Build the quadratic coefficients for a `{pathway, process}` pair.
pub fn build_coefficients(
    process: LimitingProcess,
    inputs: &CoefficientInputs,
) -> DcapstResult<AssimilationCoefficients> {
    let pathway = inputs.pathway.pathway;
    let build = builder(pathway, process).ok_or_else(|| DcapstError::UnsupportedLimitation {
        pathway: pathway.to_string(),
        process: process.to_string(),
    })?;

    Ok(build(inputs))
}

fn c3_rubisco(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    AssimilationCoefficients {
        x: [
            rates.vcmax,
            rates.kc / rates.ko,
            rates.kc,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
            1.0,
        ],
        m: 0.0,
        t: rates.gamma_factor,
        sb: 0.0,
        j: 0.0,
        e: inputs.canopy.air_o2,
        r: rates.rd,
    }
}

fn c3_electron(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    AssimilationCoefficients {
        x: [
            rates.electron_transport,
            8.0 * rates.gamma_factor,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            4.0,
            1.0,
        ],
        m: 0.0,
        t: rates.gamma_factor,
        sb: 0.0,
        j: 0.0,
        e: inputs.canopy.air_o2,
        r: rates.rd,
    }
}

/// Shared scalars of the bundle sheath pathways
fn c4_scalars(inputs: &CoefficientInputs, x: [FloatValue; 9]) -> AssimilationCoefficients {
    let rates = inputs.rates;
    AssimilationCoefficients {
        x,
        m: 0.5 * rates.rd,
        t: rates.gamma_factor,
        sb: inputs.pathway.ps2_activity_in_bundle_sheath
            / inputs.canopy.diffusivity_solubility_ratio,
        j: bundle_sheath_conductance(inputs),
        e: inputs.canopy.air_o2,
        r: rates.rd,
    }
}

fn bundle_sheath_conductance(inputs: &CoefficientInputs) -> FloatValue {
    inputs.pathway.bundle_sheath_conductance * inputs.lai
}

fn c4_rubisco(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let x = [
        rates.vcmax,
        rates.kc / rates.ko,
        rates.kc,
        rates.vpmax / (inputs.mesophyll_co2 + rates.kp),
        0.0,
        1.0,
        1.0 / bundle_sheath_conductance(inputs),
        1.0,
        1.0,
    ];
    c4_scalars(inputs, x)
}

fn c4_co2_supply(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let x = [
        rates.vcmax,
        rates.kc / rates.ko,
        rates.kc,
        0.0,
        inputs.pathway.pep_regeneration * inputs.lai,
        1.0,
        1.0 / bundle_sheath_conductance(inputs),
        1.0,
        1.0,
    ];
    c4_scalars(inputs, x)
}

fn c4_electron(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let pathway = inputs.pathway;
    let z_j = pathway.atp_production_factor * rates.electron_transport;
    let x = [
        (1.0 - pathway.mesophyll_electron_fraction) * z_j,
        7.0 * rates.gamma_factor,
        0.0,
        0.0,
        pathway.mesophyll_electron_fraction * z_j / (2.0 + pathway.extra_atp_cost),
        1.0,
        1.0 / bundle_sheath_conductance(inputs),
        3.0,
        1.0,
    ];
    c4_scalars(inputs, x)
}

/// Shared scalars of the CCM pathway.
///
/// Assimilation is supplied through the mesophyll like C3, so the pump only
/// raises chloroplastic CO2 above the mesophyll and nothing is drawn through
/// the bundle sheath (`x[5] = 0`). O2 enters through the chloroplastic state
/// of the previous pass rather than the implicit O2 balance.
fn ccm_scalars(inputs: &CoefficientInputs, x: [FloatValue; 9]) -> AssimilationCoefficients {
    AssimilationCoefficients {
        x,
        m: 0.0,
        t: inputs.rates.gamma_factor,
        sb: 0.0,
        j: bundle_sheath_conductance(inputs),
        e: inputs.chloroplastic_o2,
        r: inputs.rates.rd,
    }
}

/// Pump rate per unit mesophyll CO2, saturating in the CO2 already
/// accumulated in the chloroplast
fn ccm_pump(inputs: &CoefficientInputs) -> FloatValue {
    let rates = inputs.rates;
    rates.vpmax / (inputs.chloroplastic_co2 + rates.kp)
}

fn ccm_rubisco(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let x = [
        rates.vcmax,
        rates.kc / rates.ko,
        rates.kc,
        ccm_pump(inputs),
        0.0,
        0.0,
        1.0 / bundle_sheath_conductance(inputs),
        1.0,
        1.0,
    ];
    ccm_scalars(inputs, x)
}

fn ccm_co2_supply(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let x = [
        rates.vcmax,
        rates.kc / rates.ko,
        rates.kc,
        0.0,
        inputs.pathway.pep_regeneration * inputs.lai,
        0.0,
        1.0 / bundle_sheath_conductance(inputs),
        1.0,
        1.0,
    ];
    ccm_scalars(inputs, x)
}

/// Electron transport splits between the C3 cycle and the ATP cost of the pump
fn ccm_electron(inputs: &CoefficientInputs) -> AssimilationCoefficients {
    let rates = inputs.rates;
    let pathway = inputs.pathway;
    let z_j = pathway.atp_production_factor * rates.electron_transport;
    let x = [
        (1.0 - pathway.mesophyll_electron_fraction) * z_j,
        8.0 * rates.gamma_factor,
        0.0,
        0.0,
        pathway.mesophyll_electron_fraction * z_j / (2.0 + pathway.extra_atp_cost),
        0.0,
        1.0 / bundle_sheath_conductance(inputs),
        4.0,
        1.0,
    ];
    ccm_scalars(inputs, x)
}
