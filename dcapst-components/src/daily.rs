//! Daily integration
//!
//! [`DcapstModel::daily_run`] walks the daylight hours in order, couples
//! assimilation and transpiration for the sunlit and shaded fractions, and
//! then, if the soil cannot meet the day's demand, spreads the available water
//! over the hours and solves the day again under that supply.

use crate::canopy::{CanopyConditions, HourlyWeather, NitrogenProfile};
use crate::coupler::TimestepCoupler;
use crate::leaf::{FractionKind, LeafAreaFraction, PassContext, WaterMode};
use crate::parameters::{CanopyParameters, ModelSettings, PathwayParameters, WaterParameters};
use crate::results::{DailyOutcome, DailyResult, IntervalRecord, IntervalValues};
use dcapst_core::constants::{CO2_MOLAR_MASS, SECONDS_PER_HOUR};
use dcapst_core::environment::{Radiation, SolarGeometry, Temperature};
use dcapst_core::errors::{DcapstError, DcapstResult};
use dcapst_core::FloatValue;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Crop state and soil water for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyInputs {
    /// Leaf area index
    /// unit: m^2 / m^2
    pub lai: FloatValue,

    /// Specific leaf nitrogen
    /// unit: g N / m^2
    pub sln: FloatValue,

    /// Soil water available for transpiration
    /// unit: mm
    pub soil_water: FloatValue,

    /// unit: dimensionless
    pub root_shoot_ratio: FloatValue,

    /// Upper bound on canopy transpiration in any hour
    /// unit: mm / hr
    pub max_hourly_transpiration: FloatValue,
}

impl Default for DailyInputs {
    fn default() -> Self {
        Self {
            lai: 3.0,
            sln: 1.5,
            soil_water: 100.0,
            root_shoot_ratio: 0.2,
            max_hourly_transpiration: 100.0,
        }
    }
}

/// An interval that passed the sensibility checks
#[derive(Debug, Clone, Copy)]
struct ActiveInterval {
    weather: HourlyWeather,
    conditions: CanopyConditions,
}

/// Daily canopy photosynthesis and transpiration model.
///
/// Parameters are read-only for the duration of a run; the environment
/// collaborators are advanced hour by hour.
#[derive(Debug)]
pub struct DcapstModel {
    canopy: CanopyParameters,
    pathway: PathwayParameters,
    water: WaterParameters,
    settings: ModelSettings,
    solar: Arc<dyn SolarGeometry>,
    radiation: Box<dyn Radiation>,
    temperature: Box<dyn Temperature>,
}

impl DcapstModel {
    pub fn builder() -> DcapstModelBuilder {
        DcapstModelBuilder::new()
    }

    pub fn canopy(&self) -> &CanopyParameters {
        &self.canopy
    }

    pub fn pathway(&self) -> &PathwayParameters {
        &self.pathway
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Interval start times from the first whole step after sunrise to the
    /// last before sunset
    fn interval_hours(&self) -> Vec<FloatValue> {
        let step = self.settings.time_step;
        let first = self.solar.sunrise().ceil();
        let last = self.solar.sunset().floor();

        let mut hours = Vec::new();
        let mut hour = first;
        while hour <= last + 1e-9 && step > 0.0 {
            hours.push(hour);
            hour += step;
        }
        hours
    }

    fn weather_for_hour(&mut self, hour: FloatValue) -> DcapstResult<HourlyWeather> {
        self.temperature.update_for_hour(hour)?;
        self.radiation.update_for_hour(hour)?;

        Ok(HourlyWeather {
            hour,
            air_temperature: self.temperature.air_temperature(),
            min_temperature: self.temperature.min_temperature(),
            atmospheric_pressure: self.temperature.atmospheric_pressure(),
            air_molar_density: self.temperature.air_molar_density(),
            total_radiation: self.radiation.total_incident(),
            direct: self.radiation.direct(),
            diffuse: self.radiation.diffuse(),
            direct_par: self.radiation.direct_par(),
            diffuse_par: self.radiation.diffuse_par(),
            sun_angle: self.solar.sun_angle(hour),
            solar_constant: self.solar.solar_constant(),
        })
    }

    /// Air temperature within both temperature response ranges and some
    /// radiation to work with
    fn is_sensible(&self, weather: &HourlyWeather) -> bool {
        self.pathway.is_sensible_temperature(weather.air_temperature)
            && weather.total_radiation >= 1e-6
    }

    /// Solve every active interval in chronological order.
    ///
    /// Fresh leaf fractions are used so that each pass over the day starts
    /// from the same state.
    fn solve_day<F>(
        &self,
        intervals: &[Option<ActiveInterval>],
        mode_for: F,
    ) -> DcapstResult<Vec<IntervalValues>>
    where
        F: Fn(usize, FractionKind) -> WaterMode,
    {
        let coupler = TimestepCoupler::new(&self.settings);
        let mut sunlit = LeafAreaFraction::new(FractionKind::Sunlit, &self.canopy, &self.pathway);
        let mut shaded = LeafAreaFraction::new(FractionKind::Shaded, &self.canopy, &self.pathway);

        let mut values = Vec::with_capacity(intervals.len());
        for (index, interval) in intervals.iter().enumerate() {
            let Some(interval) = interval else {
                values.push(IntervalValues::default());
                continue;
            };

            let context = PassContext {
                canopy: &self.canopy,
                pathway: &self.pathway,
                water: &self.water,
                weather: &interval.weather,
            };
            sunlit.set_conditions(interval.conditions.sunlit);
            shaded.set_conditions(interval.conditions.shaded);

            let sunlit_outcome =
                coupler.couple(&mut sunlit, &context, mode_for(index, FractionKind::Sunlit))?;
            let shaded_outcome =
                coupler.couple(&mut shaded, &context, mode_for(index, FractionKind::Shaded))?;

            debug!(
                "hour={} air={:.2} sunlit_a={:.3} sunlit_w={:.4} shaded_a={:.3} shaded_w={:.4}",
                interval.weather.hour,
                interval.weather.air_temperature,
                sunlit_outcome.result.assimilation,
                sunlit_outcome.result.water_use,
                shaded_outcome.result.assimilation,
                shaded_outcome.result.water_use
            );

            values.push(IntervalValues {
                sunlit: sunlit_outcome.result,
                shaded: shaded_outcome.result,
            });
        }
        Ok(values)
    }

    /// Biomass from a sequence of interval assimilation rates
    ///
    /// unit: g / m^2
    fn biomass(&self, values: &[IntervalValues], root_shoot_ratio: FloatValue) -> FloatValue {
        let assimilation: FloatValue = values.iter().map(IntervalValues::assimilation).sum();
        assimilation * SECONDS_PER_HOUR * self.settings.time_step / 1e6
            * CO2_MOLAR_MASS
            * self.canopy.biomass_conversion
            / (1.0 + root_shoot_ratio)
    }

    /// Run the model for one day.
    pub fn daily_run(&mut self, inputs: &DailyInputs) -> DcapstResult<DailyOutcome> {
        let lai = inputs.lai.max(0.0);
        let step = self.settings.time_step;
        let nitrogen = NitrogenProfile::new(&self.canopy, lai, inputs.sln);

        let hours = self.interval_hours();
        let mut weather = Vec::with_capacity(hours.len());
        let mut intervals = Vec::with_capacity(hours.len());
        let mut intercepted_radiation = 0.0;

        for hour in &hours {
            let hourly = self.weather_for_hour(*hour)?;
            let active = if self.is_sensible(&hourly) {
                let conditions =
                    CanopyConditions::calculate(&self.canopy, &self.pathway, &nitrogen, lai, &hourly);
                intercepted_radiation += hourly.total_radiation
                    * conditions.intercepted_fraction
                    * SECONDS_PER_HOUR
                    * step
                    / 1e6;
                Some(ActiveInterval {
                    weather: hourly,
                    conditions,
                })
            } else {
                debug!(
                    "hour={} skipped: air={:.2} radiation={:.3}",
                    hour, hourly.air_temperature, hourly.total_radiation
                );
                None
            };
            weather.push(hourly);
            intervals.push(active);
        }

        let potential = self.solve_day(&intervals, |_, _| WaterMode::Unlimited)?;

        let capped = potential
            .iter()
            .any(|values| values.water_use() > inputs.max_hourly_transpiration);
        let demands: Vec<FloatValue> = potential
            .iter()
            .map(|values| values.water_use().min(inputs.max_hourly_transpiration) * step)
            .collect();
        let water_demanded: FloatValue = demands.iter().sum();

        let (actual, supplies) = if water_demanded <= inputs.soil_water && !capped {
            (potential.clone(), demands.clone())
        } else {
            let supplies = limit_water_supply(&demands, inputs.soil_water, &self.settings)?;
            let actual = self.solve_day(&intervals, |index, kind| {
                let total = potential[index].water_use();
                if total <= 0.0 {
                    return WaterMode::Limited { supply: 0.0 };
                }
                let share = match kind {
                    FractionKind::Sunlit => potential[index].sunlit.water_use,
                    FractionKind::Shaded => potential[index].shaded.water_use,
                };
                WaterMode::Limited {
                    supply: supplies[index] / step * share / total,
                }
            })?;
            (actual, supplies)
        };

        let result = DailyResult {
            potential_biomass: self.biomass(&potential, inputs.root_shoot_ratio),
            actual_biomass: self.biomass(&actual, inputs.root_shoot_ratio),
            water_demanded,
            water_supplied: supplies.iter().sum(),
            intercepted_radiation,
        };

        info!(
            "{} day: potential={:.3} g/m2 actual={:.3} g/m2 demand={:.3} mm supply={:.3} mm intercepted={:.3} MJ/m2",
            self.pathway.pathway,
            result.potential_biomass,
            result.actual_biomass,
            result.water_demanded,
            result.water_supplied,
            result.intercepted_radiation
        );

        let intervals = hours
            .iter()
            .enumerate()
            .map(|(index, hour)| IntervalRecord {
                hour: *hour,
                air_temperature: weather[index].air_temperature,
                total_radiation: weather[index].total_radiation,
                sun_angle: weather[index].sun_angle,
                sensible: intervals[index].is_some(),
                potential: potential[index],
                actual: actual[index],
                water_supplied: supplies[index],
            })
            .collect();

        Ok(DailyOutcome { result, intervals })
    }
}

/// Spread `available` water over intervals with the given `demands`.
///
/// Finds by bisection a cap `r` such that `Σ min(demand, r)` falls short of
/// the available water by less than the configured tolerance. Each interval
/// is supplied `min(demand, r)`.
pub fn limit_water_supply(
    demands: &[FloatValue],
    available: FloatValue,
    settings: &ModelSettings,
) -> DcapstResult<Vec<FloatValue>> {
    if available < settings.min_soil_water {
        return Ok(vec![0.0; demands.len()]);
    }

    let total: FloatValue = demands.iter().sum();
    if total <= available {
        return Ok(demands.to_vec());
    }

    let supplied_at = |cap: FloatValue| -> FloatValue { demands.iter().map(|d| d.min(cap)).sum() };

    let mut low = 0.0;
    let mut high = demands.iter().copied().fold(0.0, FloatValue::max);
    let mut residual = FloatValue::INFINITY;

    for _ in 0..settings.max_bisection_iterations {
        let cap = (low + high) / 2.0;
        let supplied = supplied_at(cap);
        residual = supplied - available;

        // Only accept a cap from below so the budget is never exceeded
        if residual <= 0.0 && residual > -settings.bisection_tolerance {
            return Ok(demands.iter().map(|d| d.min(cap)).collect());
        }
        if residual < 0.0 {
            low = cap;
        } else {
            high = cap;
        }
    }

    Err(DcapstError::BisectionNotConverged {
        iterations: settings.max_bisection_iterations,
        residual,
    })
}

/// Assembles a [`DcapstModel`] from parameters and environment collaborators.
#[derive(Debug, Default)]
pub struct DcapstModelBuilder {
    canopy: CanopyParameters,
    pathway: PathwayParameters,
    water: WaterParameters,
    settings: ModelSettings,
    solar: Option<Arc<dyn SolarGeometry>>,
    radiation: Option<Box<dyn Radiation>>,
    temperature: Option<Box<dyn Temperature>>,
}

impl DcapstModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canopy(&mut self, canopy: CanopyParameters) -> &mut Self {
        self.canopy = canopy;
        self
    }

    pub fn with_pathway(&mut self, pathway: PathwayParameters) -> &mut Self {
        self.pathway = pathway;
        self
    }

    pub fn with_water(&mut self, water: WaterParameters) -> &mut Self {
        self.water = water;
        self
    }

    pub fn with_settings(&mut self, settings: ModelSettings) -> &mut Self {
        self.settings = settings;
        self
    }

    pub fn with_solar_geometry(&mut self, solar: Arc<dyn SolarGeometry>) -> &mut Self {
        self.solar = Some(solar);
        self
    }

    pub fn with_radiation(&mut self, radiation: Box<dyn Radiation>) -> &mut Self {
        self.radiation = Some(radiation);
        self
    }

    pub fn with_temperature(&mut self, temperature: Box<dyn Temperature>) -> &mut Self {
        self.temperature = Some(temperature);
        self
    }

    /// Build the model, taking the environment collaborators out of the
    /// builder.
    pub fn build(&mut self) -> DcapstResult<DcapstModel> {
        let solar = self
            .solar
            .take()
            .ok_or_else(|| DcapstError::MissingCollaborator("solar geometry".to_string()))?;
        let radiation = self
            .radiation
            .take()
            .ok_or_else(|| DcapstError::MissingCollaborator("radiation".to_string()))?;
        let temperature = self
            .temperature
            .take()
            .ok_or_else(|| DcapstError::MissingCollaborator("temperature".to_string()))?;

        Ok(DcapstModel {
            canopy: self.canopy.clone(),
            pathway: self.pathway.clone(),
            water: self.water.clone(),
            settings: self.settings.clone(),
            solar,
            radiation,
            temperature,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bisection_meets_budget() {
        let settings = ModelSettings::default();
        let demands = [0.05, 0.2, 0.4, 0.55, 0.6, 0.52, 0.35, 0.12];
        let total: FloatValue = demands.iter().sum();

        for budget in [0.1, 0.9, 1.5, total - 0.01] {
            let supplies = limit_water_supply(&demands, budget, &settings).unwrap();
            let supplied: FloatValue = supplies.iter().sum();

            assert!((supplied - budget).abs() < 1e-6, "supplied {} for budget {}", supplied, budget);
            assert!(supplied <= budget, "supplied {} over budget {}", supplied, budget);
            for (supply, demand) in supplies.iter().zip(demands.iter()) {
                assert!(supply <= demand);
                assert!(*supply >= 0.0);
            }
        }
    }

    #[test]
    fn test_bisection_never_exceeds_budget() {
        let settings = ModelSettings::default();
        let demands = [
            0.009, 0.076, 0.209, 0.348, 0.474, 0.578, 0.644, 0.666, 0.641, 0.578, 0.469, 0.302, 0.079,
        ];
        let total: FloatValue = demands.iter().sum();

        for step in 1..2000 {
            let budget = total * step as FloatValue / 2000.0;
            let supplies = limit_water_supply(&demands, budget, &settings).unwrap();
            let supplied: FloatValue = supplies.iter().sum();
            assert!(supplied <= budget, "supplied {} over budget {}", supplied, budget);
            assert!(budget - supplied < 1e-6);
        }
    }

    #[test]
    fn test_bisection_caps_largest_demands_first() {
        let settings = ModelSettings::default();
        let supplies = limit_water_supply(&[0.1, 1.0, 1.0], 1.1, &settings).unwrap();
        assert_relative_eq!(supplies[0], 0.1, max_relative = 1e-9);
        assert_relative_eq!(supplies[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(supplies[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_plentiful_water_meets_demand() {
        let settings = ModelSettings::default();
        let demands = [0.1, 0.3];
        assert_eq!(limit_water_supply(&demands, 5.0, &settings).unwrap(), demands.to_vec());
    }

    #[test]
    fn test_dry_soil_supplies_nothing() {
        let settings = ModelSettings::default();
        let supplies = limit_water_supply(&[0.1, 0.3], 5e-5, &settings).unwrap();
        assert_eq!(supplies, vec![0.0, 0.0]);
    }

    #[test]
    fn test_bisection_iteration_cap() {
        let settings = ModelSettings {
            max_bisection_iterations: 2,
            ..ModelSettings::default()
        };
        let result = limit_water_supply(&[0.3, 0.7, 0.9], 1.0, &settings);
        assert!(matches!(result, Err(DcapstError::BisectionNotConverged { iterations: 2, .. })));
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = DcapstModel::builder().build();
        assert!(matches!(result, Err(DcapstError::MissingCollaborator(_))));
    }
}
