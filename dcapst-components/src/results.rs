//! Results of a daily run
//!
//! [`DailyOutcome`] pairs the daily totals with an explicit per-interval log.

use crate::leaf::FractionResult;
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Sunlit and shaded results for one interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalValues {
    pub sunlit: FractionResult,
    pub shaded: FractionResult,
}

impl IntervalValues {
    /// unit: µmol CO2 / m^2 / s
    pub fn assimilation(&self) -> FloatValue {
        self.sunlit.assimilation + self.shaded.assimilation
    }

    /// unit: mm / hr
    pub fn water_use(&self) -> FloatValue {
        self.sunlit.water_use + self.shaded.water_use
    }
}

/// Diagnostic record of one interval of the daily loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub hour: FloatValue,
    /// unit: °C
    pub air_temperature: FloatValue,
    /// unit: W / m^2
    pub total_radiation: FloatValue,
    /// unit: radians
    pub sun_angle: FloatValue,
    /// False if the interval was skipped by the temperature and radiation checks
    pub sensible: bool,
    /// Water-unlimited results
    pub potential: IntervalValues,
    /// Water-limited results
    pub actual: IntervalValues,
    /// Water allocated to the interval
    /// unit: mm
    pub water_supplied: FloatValue,
}

/// Daily totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    /// Biomass growth without water limitation
    /// unit: g / m^2
    pub potential_biomass: FloatValue,

    /// Biomass growth with the available soil water
    /// unit: g / m^2
    pub actual_biomass: FloatValue,

    /// Transpiration demand, after the hourly cap
    /// unit: mm
    pub water_demanded: FloatValue,

    /// unit: mm
    pub water_supplied: FloatValue,

    /// Shortwave radiation intercepted by the canopy
    /// unit: MJ / m^2
    pub intercepted_radiation: FloatValue,
}

/// Daily totals and the interval log they were accumulated from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyOutcome {
    pub result: DailyResult,
    pub intervals: Vec<IntervalRecord>,
}
