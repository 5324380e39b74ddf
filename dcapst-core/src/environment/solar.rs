use super::SolarGeometry;
use crate::constants::SOLAR_CONSTANT;
use crate::errors::{DcapstError, DcapstResult};
use crate::FloatValue;
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Daily solar geometry from day of year and latitude.
///
/// The solar declination uses Cooper's approximation:
/// $$ \delta = 23.45 \sin\left(\frac{2\pi(284 + n)}{365}\right) $$
///
/// and the sunset hour angle
/// $$ \omega_s = \arccos(-\tan\phi \tan\delta) $$
///
/// which gives a day length of $2\omega_s / 15$ hours centred on solar noon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolarGeometryModel {
    day_of_year: u32,
    /// unit: radians
    latitude: FloatValue,
    /// unit: radians
    declination: FloatValue,
    /// unit: radians
    sunset_angle: FloatValue,
    /// unit: hour
    day_length: FloatValue,
}

impl SolarGeometryModel {
    pub fn new(day_of_year: u32, latitude: FloatValue) -> DcapstResult<Self> {
        if !(1..=366).contains(&day_of_year) {
            return Err(DcapstError::InvalidDayOfYear(day_of_year));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(DcapstError::InvalidLatitude(latitude));
        }

        let latitude = latitude.to_radians();
        let declination =
            (23.45 * (2.0 * PI * (284.0 + day_of_year as FloatValue) / 365.0).sin()).to_radians();
        // Clamped so that polar day and polar night resolve to 24 and 0 hours
        let cos_sunset = (-latitude.tan() * declination.tan()).clamp(-1.0, 1.0);
        let sunset_angle = cos_sunset.acos();
        let day_length = sunset_angle.to_degrees() / 15.0 * 2.0;
        if day_length <= 0.0 || day_length >= 24.0 {
            debug!(
                "No sunrise or sunset on day {} at latitude {:.2}: day length {} h",
                day_of_year,
                latitude.to_degrees(),
                day_length
            );
        }

        Ok(Self {
            day_of_year,
            latitude,
            declination,
            sunset_angle,
            day_length,
        })
    }

    pub fn day_of_year(&self) -> u32 {
        self.day_of_year
    }

    /// unit: degrees
    pub fn latitude(&self) -> FloatValue {
        self.latitude.to_degrees()
    }

    /// unit: degrees
    pub fn solar_declination(&self) -> FloatValue {
        self.declination.to_degrees()
    }

    /// unit: degrees
    pub fn sunset_angle(&self) -> FloatValue {
        self.sunset_angle.to_degrees()
    }
}

impl SolarGeometry for SolarGeometryModel {
    fn sunrise(&self) -> FloatValue {
        12.0 - self.day_length / 2.0
    }

    fn sunset(&self) -> FloatValue {
        12.0 + self.day_length / 2.0
    }

    fn day_length(&self) -> FloatValue {
        self.day_length
    }

    fn solar_constant(&self) -> FloatValue {
        SOLAR_CONSTANT
    }

    fn sun_angle(&self, hour: FloatValue) -> FloatValue {
        let hour_angle = PI / 12.0 * (hour - 12.0);
        (self.latitude.sin() * self.declination.sin()
            + self.latitude.cos() * self.declination.cos() * hour_angle.cos())
        .asin()
    }
}
