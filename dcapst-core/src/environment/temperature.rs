use super::{SolarGeometry, Temperature};
use crate::constants::{ABSOLUTE_ZERO_C, ATMOSPHERIC_PRESSURE};
use crate::errors::{DcapstError, DcapstResult};
use crate::FloatValue;
use std::f64::consts::PI;
use std::sync::Arc;

/// Lag of the daily maximum temperature after solar noon
/// unit: hour
const MAX_TEMPERATURE_LAG: FloatValue = 1.8;

/// Nocturnal exponential decay coefficient
const NIGHT_DECAY: FloatValue = 2.2;

/// Lag of the minimum temperature after sunrise
/// unit: hour
const MIN_TEMPERATURE_LAG: FloatValue = 1.0;

/// Specific gas constant for dry air
/// unit: J / kg / K
const DRY_AIR_GAS_CONSTANT: FloatValue = 287.0;

/// unit: g / mol
const AIR_MOLAR_MASS: FloatValue = 28.966;

/// Diurnal air temperature from daily extremes.
///
/// Uses the Parton and Logan (1981) curve: a truncated sine between
/// `sunrise + c` and sunset, followed by an exponential decay through the night
/// towards the daily minimum.
#[derive(Debug, Clone)]
pub struct TemperatureModel {
    solar: Arc<dyn SolarGeometry>,
    max_temperature: FloatValue,
    min_temperature: FloatValue,
    atmospheric_pressure: FloatValue,
    air_temperature: FloatValue,
}

impl TemperatureModel {
    pub fn new(
        solar: Arc<dyn SolarGeometry>,
        max_temperature: FloatValue,
        min_temperature: FloatValue,
    ) -> DcapstResult<Self> {
        if max_temperature < min_temperature {
            return Err(DcapstError::InvalidTemperatureRange {
                max: max_temperature,
                min: min_temperature,
            });
        }

        Ok(Self {
            solar,
            max_temperature,
            min_temperature,
            atmospheric_pressure: ATMOSPHERIC_PRESSURE,
            air_temperature: min_temperature,
        })
    }

    pub fn max_temperature(&self) -> FloatValue {
        self.max_temperature
    }

    fn daytime_temperature(&self, hour: FloatValue) -> FloatValue {
        let angle = PI * (hour - self.solar.sunrise() - MIN_TEMPERATURE_LAG)
            / (self.solar.day_length() + 2.0 * MAX_TEMPERATURE_LAG);
        self.min_temperature + (self.max_temperature - self.min_temperature) * angle.sin()
    }

    /// Air temperature at the given hour without updating the model
    ///
    /// unit: °C
    pub fn calculate_air_temperature(&self, hour: FloatValue) -> FloatValue {
        let sunrise = self.solar.sunrise();
        let sunset = self.solar.sunset();
        let night_length = 24.0 - self.solar.day_length();

        let is_day = hour >= sunrise + MIN_TEMPERATURE_LAG && hour <= sunset;
        if is_day || night_length <= 0.0 {
            return self.daytime_temperature(hour);
        }

        let sunset_temperature = self.daytime_temperature(sunset);
        let hours_since_sunset = if hour > sunset {
            hour - sunset
        } else {
            hour + 24.0 - sunset
        };

        self.min_temperature
            + (sunset_temperature - self.min_temperature)
                * (-NIGHT_DECAY * hours_since_sunset / night_length).exp()
    }
}

impl Temperature for TemperatureModel {
    fn update_for_hour(&mut self, hour: FloatValue) -> DcapstResult<()> {
        if !(0.0..=24.0).contains(&hour) {
            return Err(DcapstError::HourOutOfRange(hour));
        }
        self.air_temperature = self.calculate_air_temperature(hour);
        Ok(())
    }

    fn air_temperature(&self) -> FloatValue {
        self.air_temperature
    }

    fn min_temperature(&self) -> FloatValue {
        self.min_temperature
    }

    fn atmospheric_pressure(&self) -> FloatValue {
        self.atmospheric_pressure
    }

    fn air_molar_density(&self) -> FloatValue {
        self.atmospheric_pressure * 1e5
            / (DRY_AIR_GAS_CONSTANT * (self.air_temperature + ABSOLUTE_ZERO_C))
            * 1000.0
            / AIR_MOLAR_MASS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SolarGeometryModel;
    use approx::assert_relative_eq;

    fn reference_model() -> TemperatureModel {
        let solar = Arc::new(SolarGeometryModel::new(144, 18.3).unwrap());
        TemperatureModel::new(solar, 28.0, 16.0).unwrap()
    }

    #[test]
    fn test_morning_temperature() {
        let mut model = reference_model();
        model.update_for_hour(9.5).unwrap();
        assert_relative_eq!(
            model.air_temperature(),
            22.427634641305584,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_midnight_wraps_to_previous_sunset() {
        let mut model = reference_model();
        model.update_for_hour(0.0).unwrap();
        assert_relative_eq!(
            model.air_temperature(),
            19.060093267303721,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_temperature_stays_within_extremes() {
        let model = reference_model();
        assert_eq!(model.max_temperature(), 28.0);
        for step in 0..=48 {
            let t = model.calculate_air_temperature(step as FloatValue * 0.5);
            assert!(
                (16.0..=model.max_temperature()).contains(&t),
                "Temperature {} at hour {} outside daily range",
                t,
                step as FloatValue * 0.5
            );
        }
    }

    #[test]
    fn test_air_molar_density() {
        let mut model = reference_model();
        model.update_for_hour(12.0).unwrap();
        let t = model.air_temperature();
        let expected = 1.01325e5 / (287.0 * (t + 273.15)) * 1000.0 / 28.966;
        assert_relative_eq!(model.air_molar_density(), expected, max_relative = 1e-12);
        // Around 40 mol/m3 at typical daytime temperatures
        assert!(model.air_molar_density() > 38.0 && model.air_molar_density() < 43.0);
    }

    #[test]
    fn test_hour_out_of_range() {
        let mut model = reference_model();
        assert!(matches!(
            model.update_for_hour(24.5),
            Err(DcapstError::HourOutOfRange(_))
        ));
        assert!(model.update_for_hour(-0.1).is_err());
    }

    #[test]
    fn test_inverted_temperature_range() {
        let solar = Arc::new(SolarGeometryModel::new(144, 18.3).unwrap());
        assert!(matches!(
            TemperatureModel::new(solar, 10.0, 20.0),
            Err(DcapstError::InvalidTemperatureRange { .. })
        ));
    }
}
