//! Environmental capabilities consumed by the canopy model.
//!
//! The canopy model never computes astronomy or weather itself. It asks three
//! narrow capabilities for the values it needs each hour:
//!
//! - [`SolarGeometry`]: sunrise, sunset, day length and the solar elevation
//! - [`Radiation`]: incident shortwave radiation and its direct/diffuse split
//! - [`Temperature`]: air temperature and the properties of the air
//!
//! Reference implementations are provided ([`SolarGeometryModel`],
//! [`RadiationModel`] and [`TemperatureModel`]) but any host may supply its
//! own, for example one backed by observed hourly weather.

mod radiation;
mod solar;
mod temperature;

pub use radiation::RadiationModel;
pub use solar::SolarGeometryModel;
pub use temperature::TemperatureModel;

use crate::errors::DcapstResult;
use crate::FloatValue;
use std::fmt::Debug;

/// Solar geometry for a single day at a single location.
pub trait SolarGeometry: Debug {
    /// Time of sunrise
    /// unit: hour
    fn sunrise(&self) -> FloatValue;

    /// Time of sunset
    /// unit: hour
    fn sunset(&self) -> FloatValue;

    /// unit: hour
    fn day_length(&self) -> FloatValue;

    /// Solar radiation at the top of the atmosphere
    /// unit: W / m^2
    fn solar_constant(&self) -> FloatValue;

    /// Solar elevation at the given hour
    /// unit: radians
    fn sun_angle(&self, hour: FloatValue) -> FloatValue;
}

/// Incident shortwave radiation, updated one hour at a time.
pub trait Radiation: Debug {
    /// Move the model to the given hour of the day.
    fn update_for_hour(&mut self, hour: FloatValue) -> DcapstResult<()>;

    /// unit: W / m^2
    fn total_incident(&self) -> FloatValue;

    /// unit: W / m^2
    fn direct(&self) -> FloatValue;

    /// unit: W / m^2
    fn diffuse(&self) -> FloatValue;

    /// Direct photosynthetically active radiation
    /// unit: µmol / m^2 / s
    fn direct_par(&self) -> FloatValue;

    /// Diffuse photosynthetically active radiation
    /// unit: µmol / m^2 / s
    fn diffuse_par(&self) -> FloatValue;
}

/// Air temperature and air properties, updated one hour at a time.
pub trait Temperature: Debug {
    /// Move the model to the given hour of the day.
    fn update_for_hour(&mut self, hour: FloatValue) -> DcapstResult<()>;

    /// unit: °C
    fn air_temperature(&self) -> FloatValue;

    /// Minimum daily temperature, used as the dew point
    /// unit: °C
    fn min_temperature(&self) -> FloatValue;

    /// unit: bar
    fn atmospheric_pressure(&self) -> FloatValue;

    /// unit: mol / m^3
    fn air_molar_density(&self) -> FloatValue;
}
