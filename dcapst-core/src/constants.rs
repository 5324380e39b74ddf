//! Physical constants shared by the model components.

use crate::FloatValue;

/// Universal gas constant
/// unit: J / mol / K
pub const GAS_CONSTANT: FloatValue = 8.314;

/// Reference temperature of the Arrhenius response
/// unit: K
pub const REFERENCE_TEMPERATURE_K: FloatValue = 298.15;

/// Offset between Celsius and Kelvin
pub const ABSOLUTE_ZERO_C: FloatValue = 273.15;

/// Stefan-Boltzmann constant
/// unit: W / m^2 / K^4
pub const STEFAN_BOLTZMANN: FloatValue = 5.670374419e-8;

/// Photosynthetically active photons per joule of PAR
/// unit: µmol / J
pub const PAR_ENERGY_RATIO: FloatValue = 4.56;

/// Molar mass of CO2
/// unit: g / mol
pub const CO2_MOLAR_MASS: FloatValue = 44.0;

/// Molar mass of nitrogen
/// unit: g / mol
pub const NITROGEN_MOLAR_MASS: FloatValue = 14.0;

/// Solar constant
/// unit: W / m^2
pub const SOLAR_CONSTANT: FloatValue = 1360.0;

/// Standard atmospheric pressure
/// unit: bar
pub const ATMOSPHERIC_PRESSURE: FloatValue = 1.01325;

/// Seconds in an hour
pub const SECONDS_PER_HOUR: FloatValue = 3600.0;

/// Saturated vapour pressure (Buck) at the given temperature.
///
/// unit: kPa
pub fn saturated_vapour_pressure(temperature: FloatValue) -> FloatValue {
    0.61365 * (17.502 * temperature / (240.97 + temperature)).exp()
}

/// Slope of the saturated vapour pressure curve at the given temperature.
///
/// unit: kPa / K
pub fn saturated_vapour_pressure_slope(temperature: FloatValue) -> FloatValue {
    saturated_vapour_pressure(temperature) * 17.502 * 240.97 / (240.97 + temperature).powi(2)
}
