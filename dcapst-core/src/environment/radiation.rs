use super::{Radiation, SolarGeometry};
use crate::constants::PAR_ENERGY_RATIO;
use crate::errors::{DcapstError, DcapstResult};
use crate::FloatValue;
use std::f64::consts::PI;
use std::sync::Arc;

/// Fraction of shortwave radiation that is photosynthetically active
const PAR_FRACTION: FloatValue = 0.5;

/// Hourly radiation from a daily total.
///
/// The daily total is spread over the daylight period as a half sine wave
/// $$ R(h) = \frac{R_d \pi}{2 L} \sin\left(\frac{\pi (h - h_{rise})}{L}\right) $$
///
/// and split into direct and diffuse components using the Erbs et al. (1982)
/// clearness-index correlation.
#[derive(Debug, Clone)]
pub struct RadiationModel {
    solar: Arc<dyn SolarGeometry>,
    /// unit: MJ / m^2 / day
    daily_radiation: FloatValue,
    total: FloatValue,
    direct: FloatValue,
    diffuse: FloatValue,
}

impl RadiationModel {
    pub fn new(solar: Arc<dyn SolarGeometry>, daily_radiation: FloatValue) -> Self {
        Self {
            solar,
            daily_radiation: daily_radiation.max(0.0),
            total: 0.0,
            direct: 0.0,
            diffuse: 0.0,
        }
    }

    pub fn daily_radiation(&self) -> FloatValue {
        self.daily_radiation
    }

    /// Incident shortwave radiation at the given hour
    ///
    /// unit: W / m^2
    pub fn calculate_total(&self, hour: FloatValue) -> FloatValue {
        let sunrise = self.solar.sunrise();
        let day_length = self.solar.day_length();
        if hour <= sunrise || hour >= self.solar.sunset() || day_length <= 0.0 {
            return 0.0;
        }

        self.daily_radiation * 1e6 * PI / (2.0 * day_length * 3600.0)
            * (PI * (hour - sunrise) / day_length).sin()
    }

    /// Diffuse fraction of the total for a given clearness index
    pub fn diffuse_fraction(clearness: FloatValue) -> FloatValue {
        if clearness <= 0.22 {
            1.0 - 0.09 * clearness
        } else if clearness <= 0.8 {
            0.9511 - 0.1604 * clearness + 4.388 * clearness.powi(2)
                - 16.638 * clearness.powi(3)
                + 12.336 * clearness.powi(4)
        } else {
            0.165
        }
    }
}

impl Radiation for RadiationModel {
    fn update_for_hour(&mut self, hour: FloatValue) -> DcapstResult<()> {
        if !(0.0..=24.0).contains(&hour) {
            return Err(DcapstError::HourOutOfRange(hour));
        }

        let total = self.calculate_total(hour);
        let extraterrestrial = self.solar.solar_constant() * self.solar.sun_angle(hour).sin().max(0.0);
        let clearness = if extraterrestrial > 0.0 {
            (total / extraterrestrial).clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.total = total;
        self.diffuse = total * Self::diffuse_fraction(clearness);
        self.direct = total - self.diffuse;
        Ok(())
    }

    fn total_incident(&self) -> FloatValue {
        self.total
    }

    fn direct(&self) -> FloatValue {
        self.direct
    }

    fn diffuse(&self) -> FloatValue {
        self.diffuse
    }

    fn direct_par(&self) -> FloatValue {
        self.direct * PAR_FRACTION * PAR_ENERGY_RATIO
    }

    fn diffuse_par(&self) -> FloatValue {
        self.diffuse * PAR_FRACTION * PAR_ENERGY_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::SolarGeometryModel;
    use approx::assert_relative_eq;

    fn reference_model() -> RadiationModel {
        let solar = Arc::new(SolarGeometryModel::new(144, 18.3).unwrap());
        RadiationModel::new(solar, 20.0)
    }

    #[test]
    fn test_hourly_radiation_integrates_to_daily_total() {
        let model = reference_model();
        let steps = 10_000;
        let dt = 24.0 / steps as FloatValue;
        let total: FloatValue = (0..steps)
            .map(|i| model.calculate_total((i as FloatValue + 0.5) * dt) * dt * 3600.0)
            .sum();
        assert_relative_eq!(total / 1e6, 20.0, max_relative = 1e-4);
    }

    #[test]
    fn test_direct_and_diffuse_sum_to_total() {
        let mut model = reference_model();
        for hour in [7.0, 10.0, 12.0, 16.5] {
            model.update_for_hour(hour).unwrap();
            assert_relative_eq!(
                model.direct() + model.diffuse(),
                model.total_incident(),
                max_relative = 1e-12
            );
            assert!(model.diffuse() > 0.0);
            assert!(model.direct() >= 0.0);
        }
    }

    #[test]
    fn test_no_radiation_at_night() {
        let mut model = reference_model();
        model.update_for_hour(2.0).unwrap();
        assert_eq!(model.total_incident(), 0.0);
        assert_eq!(model.direct_par(), 0.0);
        assert_eq!(model.diffuse_par(), 0.0);
    }

    #[test]
    fn test_par_conversion() {
        let mut model = reference_model();
        model.update_for_hour(12.0).unwrap();
        assert_relative_eq!(
            model.direct_par(),
            model.direct() * 0.5 * 4.56,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_negative_daily_total_is_clamped() {
        let solar = Arc::new(SolarGeometryModel::new(144, 18.3).unwrap());
        let model = RadiationModel::new(solar, -5.0);
        assert_eq!(model.daily_radiation(), 0.0);
        assert_eq!(model.calculate_total(12.0), 0.0);
        assert_eq!(reference_model().daily_radiation(), 20.0);
    }

    #[test]
    fn test_diffuse_fraction_limits() {
        assert_relative_eq!(RadiationModel::diffuse_fraction(0.0), 1.0);
        assert_relative_eq!(RadiationModel::diffuse_fraction(0.9), 0.165);
    }
}
