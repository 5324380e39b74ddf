//! Sunlit and shaded leaf fractions
//!
//! A [`LeafAreaFraction`] carries the hourly conditions of one fraction of the
//! canopy together with the state the coupled solver iterates on: leaf
//! temperature and the CO2/O2 partial pressures of the leaf compartments.

use crate::canopy::{FractionConditions, HourlyWeather};
use crate::parameters::{CanopyParameters, PathwayParameters, WaterParameters};
use crate::photosynthesis::{solve_assimilation, CoefficientInputs, LeafRates};
use crate::water::LeafEnergyWaterBalance;
use dcapst_core::errors::DcapstResult;
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractionKind {
    Sunlit,
    Shaded,
}

impl fmt::Display for FractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FractionKind::Sunlit => write!(f, "sunlit"),
            FractionKind::Shaded => write!(f, "shaded"),
        }
    }
}

/// Water regime of a solver pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaterMode {
    /// Stomata hold intercellular CO2 at a fixed ratio of air CO2
    Unlimited,
    /// Transpiration is fixed at the supplied rate (mm / hr)
    Limited { supply: FloatValue },
}

/// Read-only inputs shared by every pass within one interval.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    pub canopy: &'a CanopyParameters,
    pub pathway: &'a PathwayParameters,
    pub water: &'a WaterParameters,
    pub weather: &'a HourlyWeather,
}

/// Assimilation and transpiration of a leaf fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FractionResult {
    /// unit: µmol CO2 / m^2 / s
    pub assimilation: FloatValue,
    /// unit: mm / hr
    pub water_use: FloatValue,
}

impl FractionResult {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Result of one coupled assimilation and energy balance pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassResult {
    pub result: FractionResult,
    /// Damped leaf temperature for the next pass
    /// unit: °C
    pub leaf_temperature: FloatValue,
}

#[derive(Debug, Clone)]
pub struct LeafAreaFraction {
    kind: FractionKind,
    conditions: FractionConditions,
    /// unit: µbar
    intercellular_co2: FloatValue,
    /// unit: µbar
    mesophyll_co2: FloatValue,
    /// unit: µbar
    chloroplastic_co2: FloatValue,
    /// unit: µbar
    chloroplastic_o2: FloatValue,
    leaf_temperature: Option<FloatValue>,
}

impl LeafAreaFraction {
    pub fn new(kind: FractionKind, canopy: &CanopyParameters, pathway: &PathwayParameters) -> Self {
        let intercellular_co2 = pathway.intercellular_to_air_co2_ratio * canopy.air_co2;
        Self {
            kind,
            conditions: FractionConditions::default(),
            intercellular_co2,
            mesophyll_co2: intercellular_co2,
            chloroplastic_co2: intercellular_co2,
            chloroplastic_o2: canopy.air_o2,
            leaf_temperature: None,
        }
    }

    pub fn kind(&self) -> FractionKind {
        self.kind
    }

    /// Replace the hourly conditions, keeping the iteration state
    pub fn set_conditions(&mut self, conditions: FractionConditions) {
        self.conditions = conditions;
    }

    pub fn conditions(&self) -> &FractionConditions {
        &self.conditions
    }

    pub fn lai(&self) -> FloatValue {
        self.conditions.lai
    }

    pub fn intercellular_co2(&self) -> FloatValue {
        self.intercellular_co2
    }

    pub fn mesophyll_co2(&self) -> FloatValue {
        self.mesophyll_co2
    }

    pub fn chloroplastic_co2(&self) -> FloatValue {
        self.chloroplastic_co2
    }

    pub fn chloroplastic_o2(&self) -> FloatValue {
        self.chloroplastic_o2
    }

    /// Leaf temperature of the last successful pass, if any
    pub fn leaf_temperature(&self) -> Option<FloatValue> {
        self.leaf_temperature
    }

    pub fn set_leaf_temperature(&mut self, temperature: FloatValue) {
        self.leaf_temperature = Some(temperature);
    }

    pub fn clear_leaf_temperature(&mut self) {
        self.leaf_temperature = None;
    }

    /// Run one assimilation and energy balance pass at the current leaf
    /// temperature.
    ///
    /// Returns `Ok(None)` if the pass is numerically infeasible, in which case
    /// the compartment state is left untouched. On success the compartments
    /// and leaf temperature are advanced.
    pub fn pass(
        &mut self,
        context: &PassContext,
        mode: WaterMode,
    ) -> DcapstResult<Option<PassResult>> {
        let weather = context.weather;
        let canopy = context.canopy;
        let temperature = self.leaf_temperature.unwrap_or(weather.air_temperature);

        let rates = LeafRates::at_temperature(
            context.pathway,
            canopy,
            &self.conditions.rates_at_25,
            self.conditions.photons,
            temperature,
        );
        let balance = LeafEnergyWaterBalance::new(
            context.water,
            weather,
            temperature,
            self.conditions.boundary_heat_conductance,
        )?;
        let net_radiation = self.conditions.net_radiation;
        let air_co2 = canopy.air_co2;

        // CO2 supply constraint: p is the partial pressure at the supply
        // boundary and q the resistance between it and the mesophyll
        let (p, q, limited_rtw) = match mode {
            WaterMode::Unlimited => {
                let ci = context.pathway.intercellular_to_air_co2_ratio * air_co2;
                (ci, 1.0 / rates.gm, None)
            }
            WaterMode::Limited { supply } => {
                let rtw = balance.limited_rtw(supply, net_radiation);
                let gt = balance.total_co2_conductance(rtw);
                (air_co2, 1.0 / gt + 1.0 / rates.gm, Some((rtw, gt)))
            }
        };

        let inputs = CoefficientInputs {
            pathway: context.pathway,
            canopy,
            rates: &rates,
            lai: self.conditions.lai,
            mesophyll_co2: self.mesophyll_co2,
            chloroplastic_co2: self.chloroplastic_co2,
            chloroplastic_o2: self.chloroplastic_o2,
        };
        let Some(assimilation) = solve_assimilation(&inputs, p, q)? else {
            return Ok(None);
        };
        let rate = assimilation.rate;

        let (intercellular_co2, rtw, water_use) = match (mode, limited_rtw) {
            (WaterMode::Limited { supply }, Some((rtw, gt))) => (air_co2 - rate / gt, rtw, supply),
            _ => {
                let rtw = balance.unlimited_rtw(rate, air_co2, p);
                (p, rtw, balance.hourly_water_use(rtw, net_radiation))
            }
        };
        if water_use.is_nan() || water_use < 0.0 {
            return Ok(None);
        }

        let coefficients = &assimilation.coefficients;
        self.intercellular_co2 = intercellular_co2;
        self.mesophyll_co2 = coefficients.mesophyll_co2(p, q, rate);
        self.chloroplastic_co2 = coefficients.chloroplastic_co2(p, q, rate);
        self.chloroplastic_o2 = canopy.air_o2
            + context.pathway.ps2_activity_in_bundle_sheath / canopy.diffusivity_solubility_ratio
                * coefficients.x[6]
                * rate;

        let leaf_temperature = balance.next_leaf_temperature(rtw, net_radiation);
        self.leaf_temperature = Some(leaf_temperature);

        Ok(Some(PassResult {
            result: FractionResult {
                assimilation: rate,
                water_use,
            },
            leaf_temperature,
        }))
    }
}
