//! Leaf energy and water balance
//!
//! Couples stomatal conductance, transpiration and leaf temperature through a
//! Penman-Monteith energy balance:
//!
//! $$ \lambda E = \frac{s R_n + \rho c_p D / r_{bh}}{s + \gamma r_{tw} / r_{bh}} $$
//!
//! where $s$ is the slope of the saturated vapour pressure curve, $D$ the
//! vapour pressure deficit of the air, $r_{bh}$ the boundary layer resistance
//! to heat and $r_{tw}$ the total leaf resistance to water vapour.
//!
//! When water is unlimited $r_{tw}$ follows from the stomatal conductance
//! needed to sustain the assimilation rate at a fixed intercellular CO2. When
//! water is limited the equation is inverted: the supply fixes $\lambda E$ and
//! $r_{tw}$ follows, which in turn limits the CO2 conductance.

use crate::canopy::HourlyWeather;
use crate::parameters::WaterParameters;
use dcapst_core::constants::{
    saturated_vapour_pressure, saturated_vapour_pressure_slope, SECONDS_PER_HOUR,
};
use dcapst_core::errors::{DcapstError, DcapstResult};
use dcapst_core::FloatValue;

/// Energy and water balance of one leaf fraction at one leaf temperature.
#[derive(Debug, Clone)]
pub struct LeafEnergyWaterBalance<'a> {
    water: &'a WaterParameters,
    air_temperature: FloatValue,
    atmospheric_pressure: FloatValue,
    air_molar_density: FloatValue,
    leaf_temperature: FloatValue,
    /// unit: m / s
    boundary_heat_conductance: FloatValue,
    /// unit: s / m
    boundary_heat_resistance: FloatValue,
    /// unit: kPa
    vapour_pressure_deficit: FloatValue,
    /// unit: kPa
    air_vapour_pressure: FloatValue,
    /// unit: kPa / K
    svp_slope: FloatValue,
}

impl<'a> LeafEnergyWaterBalance<'a> {
    /// Fails if the boundary layer conductance is zero or not finite, as the
    /// boundary resistance is then undefined.
    pub fn new(
        water: &'a WaterParameters,
        weather: &HourlyWeather,
        leaf_temperature: FloatValue,
        boundary_heat_conductance: FloatValue,
    ) -> DcapstResult<Self> {
        if boundary_heat_conductance == 0.0 || !boundary_heat_conductance.is_finite() {
            return Err(DcapstError::ZeroBoundaryConductance(boundary_heat_conductance));
        }

        let air_vapour_pressure = saturated_vapour_pressure(weather.min_temperature);
        Ok(Self {
            water,
            air_temperature: weather.air_temperature,
            atmospheric_pressure: weather.atmospheric_pressure,
            air_molar_density: weather.air_molar_density,
            leaf_temperature,
            boundary_heat_conductance,
            boundary_heat_resistance: 1.0 / boundary_heat_conductance,
            vapour_pressure_deficit: saturated_vapour_pressure(weather.air_temperature)
                - air_vapour_pressure,
            air_vapour_pressure,
            svp_slope: saturated_vapour_pressure_slope(weather.air_temperature),
        })
    }

    pub fn vapour_pressure_deficit(&self) -> FloatValue {
        self.vapour_pressure_deficit
    }

    /// Boundary layer conductance to water vapour
    /// unit: mol / m^2 / s
    fn boundary_water_conductance(&self) -> FloatValue {
        self.boundary_heat_conductance / self.water.boundary_heat_to_water * self.air_molar_density
    }

    /// Total leaf resistance to water vapour when water is unlimited.
    ///
    /// Solves for the stomatal CO2 conductance that supports `assimilation`
    /// given air CO2 `air_co2` and intercellular CO2 `intercellular_co2`
    /// (both µbar), accounting for the ternary effect of the transpiration
    /// stream on CO2 diffusion. Returns NaN when no positive conductance exists.
    ///
    /// unit: s / m
    pub fn unlimited_rtw(
        &self,
        assimilation: FloatValue,
        air_co2: FloatValue,
        intercellular_co2: FloatValue,
    ) -> FloatValue {
        let stomatal_ratio = self.water.stomatal_water_to_co2;
        let gbw = self.boundary_water_conductance();
        let gbc = gbw / self.water.boundary_water_to_co2;

        let pressure = self.atmospheric_pressure;
        let leaf_vapour = saturated_vapour_pressure(self.leaf_temperature) / (pressure * 100.0);
        let air_vapour = self.air_vapour_pressure / (pressure * 100.0);

        let ca = air_co2 / pressure;
        let ci = intercellular_co2 / pressure;
        let gradient = ca - ci;
        let ternary = (leaf_vapour - air_vapour) / (1.0 - (leaf_vapour + air_vapour) / 2.0)
            * (ca + ci)
            / 2.0;

        let a = stomatal_ratio * assimilation - stomatal_ratio * gbc * gradient
            + stomatal_ratio * gbw * ternary;
        let b = assimilation * (stomatal_ratio * gbc + gbw) - gbc * gbw * gradient
            + stomatal_ratio * gbw * gbc * ternary;
        let c = assimilation * gbc * gbw;

        let (a, b, c) = if a < 0.0 { (-a, -b, -c) } else { (a, b, c) };
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 || a == 0.0 {
            return FloatValue::NAN;
        }
        let stomatal_conductance = (-b + discriminant.sqrt()) / (2.0 * a);

        let total_water_conductance = 1.0 / (1.0 / gbw + 1.0 / (stomatal_ratio * stomatal_conductance));
        self.air_molar_density / total_water_conductance
    }

    /// Total leaf resistance to water vapour that makes transpiration equal
    /// `water_supply` (mm / hr) under net radiation `net_radiation` (W / m^2).
    ///
    /// unit: s / m
    pub fn limited_rtw(&self, water_supply: FloatValue, net_radiation: FloatValue) -> FloatValue {
        let latent = self.water.latent_heat_of_vaporisation * water_supply / SECONDS_PER_HOUR;
        (self.svp_slope * self.boundary_heat_resistance * (net_radiation - latent)
            + self.vapour_pressure_deficit * self.water.volumetric_heat_capacity)
            / (latent * self.water.psychrometric_constant)
    }

    /// Latent heat flux for a total water resistance `rtw`
    ///
    /// unit: W / m^2
    fn latent_heat_flux(&self, rtw: FloatValue, net_radiation: FloatValue) -> FloatValue {
        let rbh = self.boundary_heat_resistance;
        (self.svp_slope * net_radiation
            + self.water.volumetric_heat_capacity * self.vapour_pressure_deficit / rbh)
            / (self.svp_slope + self.water.psychrometric_constant * rtw / rbh)
    }

    /// Hourly transpiration
    ///
    /// unit: mm / hr
    pub fn hourly_water_use(&self, rtw: FloatValue, net_radiation: FloatValue) -> FloatValue {
        self.latent_heat_flux(rtw, net_radiation) / self.water.latent_heat_of_vaporisation
            * SECONDS_PER_HOUR
    }

    /// Total leaf conductance to CO2 implied by a total water resistance
    ///
    /// unit: mol / m^2 / s / bar
    pub fn total_co2_conductance(&self, rtw: FloatValue) -> FloatValue {
        let gtw = self.air_molar_density / rtw;
        let gbw = self.boundary_water_conductance();
        let stomatal_resistance = 1.0 / gtw - 1.0 / gbw;
        1.0 / (self.water.stomatal_water_to_co2 * stomatal_resistance
            + self.water.boundary_water_to_co2 / gbw)
            / self.atmospheric_pressure
    }

    /// Leaf temperature that closes the energy balance
    ///
    /// unit: °C
    pub fn leaf_temperature(&self, rtw: FloatValue, net_radiation: FloatValue) -> FloatValue {
        let latent = self.latent_heat_flux(rtw, net_radiation);
        self.air_temperature
            + self.boundary_heat_resistance * (net_radiation - latent)
                / self.water.volumetric_heat_capacity
    }

    /// Damped update of leaf temperature: the mean of the energy balance
    /// solution and the temperature this balance was evaluated at
    pub fn next_leaf_temperature(&self, rtw: FloatValue, net_radiation: FloatValue) -> FloatValue {
        (self.leaf_temperature(rtw, net_radiation) + self.leaf_temperature) / 2.0
    }
}
