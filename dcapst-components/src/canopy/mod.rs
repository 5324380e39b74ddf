//! Canopy radiation and structure
//!
//! Each hour the canopy is split into a sunlit and a shaded leaf fraction.
//! [`CanopyConditions::calculate`] derives, for both fractions, everything the
//! leaf-level solvers need: leaf area, nitrogen-scaled rates at 25 °C, absorbed
//! shortwave radiation, absorbed photons, boundary layer conductance and net
//! radiation.

mod radiation;
mod structure;

pub use radiation::CanopyRadiationPartitioner;
pub use structure::{
    beam_extinction, boundary_heat_conductance, longwave_shares, net_longwave, NitrogenProfile,
};

use crate::parameters::{CanopyParameters, PathwayParameters};
use crate::photosynthesis::RatesAt25;
use dcapst_core::constants::PAR_ENERGY_RATIO;
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Weather seen by the canopy during one interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub hour: FloatValue,
    /// unit: °C
    pub air_temperature: FloatValue,
    /// unit: °C
    pub min_temperature: FloatValue,
    /// unit: bar
    pub atmospheric_pressure: FloatValue,
    /// unit: mol / m^3
    pub air_molar_density: FloatValue,
    /// unit: W / m^2
    pub total_radiation: FloatValue,
    /// unit: W / m^2
    pub direct: FloatValue,
    /// unit: W / m^2
    pub diffuse: FloatValue,
    /// unit: µmol / m^2 / s
    pub direct_par: FloatValue,
    /// unit: µmol / m^2 / s
    pub diffuse_par: FloatValue,
    /// unit: radians
    pub sun_angle: FloatValue,
    /// unit: W / m^2
    pub solar_constant: FloatValue,
}

/// Conditions of one leaf fraction for one interval.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FractionConditions {
    pub lai: FloatValue,
    pub rates_at_25: RatesAt25,
    /// Absorbed shortwave radiation
    /// unit: W / m^2
    pub absorbed_radiation: FloatValue,
    /// Absorbed photosynthetically active photons
    /// unit: µmol / m^2 / s
    pub photons: FloatValue,
    /// unit: m / s
    pub boundary_heat_conductance: FloatValue,
    /// Absorbed shortwave less the longwave loss
    /// unit: W / m^2
    pub net_radiation: FloatValue,
}

/// Sunlit and shaded conditions of the canopy for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanopyConditions {
    pub beam_extinction: FloatValue,
    pub intercepted_fraction: FloatValue,
    pub total: FractionConditions,
    pub sunlit: FractionConditions,
    pub shaded: FractionConditions,
}

impl CanopyConditions {
    pub fn calculate(
        canopy: &CanopyParameters,
        pathway: &PathwayParameters,
        nitrogen: &NitrogenProfile,
        lai: FloatValue,
        weather: &HourlyWeather,
    ) -> Self {
        let kb = beam_extinction(canopy.leaf_angle_radians(), weather.sun_angle);
        let par = CanopyRadiationPartitioner::new(canopy.par, kb, lai);
        let nir = CanopyRadiationPartitioner::new(canopy.nir, kb, lai);

        // PAR in energy units, with the remainder of the shortwave as NIR
        let direct_par = weather.direct_par / PAR_ENERGY_RATIO;
        let diffuse_par = weather.diffuse_par / PAR_ENERGY_RATIO;
        let direct_nir = weather.direct - direct_par;
        let diffuse_nir = weather.diffuse - diffuse_par;

        let total_absorbed = par.total_radiation(direct_par, diffuse_par)
            + nir.total_radiation(direct_nir, diffuse_nir);
        let sunlit_absorbed = par.sunlit_radiation(direct_par, diffuse_par)
            + nir.sunlit_radiation(direct_nir, diffuse_nir);

        let total_photons = par.total_radiation(weather.direct_par, weather.diffuse_par);
        let sunlit_photons = par.sunlit_radiation(weather.direct_par, weather.diffuse_par);

        let (total_gbh, sunlit_gbh) = boundary_heat_conductance(canopy, lai, kb);

        let extraterrestrial = weather.solar_constant * weather.sun_angle.sin().max(0.0);
        let longwave = net_longwave(
            weather.air_temperature,
            weather.min_temperature,
            weather.total_radiation,
            extraterrestrial,
        );
        let (total_longwave, sunlit_longwave) =
            longwave_shares(longwave, canopy.par.diffuse_extinction, kb, lai);

        let total_rates = nitrogen.canopy_rates(pathway);
        let sunlit_rates = nitrogen.sunlit_rates(pathway, kb);

        let total = FractionConditions {
            lai,
            rates_at_25: total_rates,
            absorbed_radiation: total_absorbed,
            photons: total_photons,
            boundary_heat_conductance: total_gbh,
            net_radiation: total_absorbed - total_longwave,
        };
        let sunlit = FractionConditions {
            lai: par.sunlit_lai(),
            rates_at_25: sunlit_rates,
            absorbed_radiation: sunlit_absorbed,
            photons: sunlit_photons,
            boundary_heat_conductance: sunlit_gbh,
            net_radiation: sunlit_absorbed - sunlit_longwave,
        };
        let shaded = FractionConditions {
            lai: par.shaded_lai(),
            rates_at_25: total_rates.minus(&sunlit_rates),
            absorbed_radiation: total_absorbed - sunlit_absorbed,
            photons: total_photons - sunlit_photons,
            boundary_heat_conductance: total_gbh - sunlit_gbh,
            net_radiation: (total_absorbed - sunlit_absorbed) - (total_longwave - sunlit_longwave),
        };

        Self {
            beam_extinction: kb,
            intercepted_fraction: par.intercepted_fraction(),
            total,
            sunlit,
            shaded,
        }
    }
}
