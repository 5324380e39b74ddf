//! Fixed-point coupling of assimilation and the leaf energy balance
//!
//! Leaf temperature sets the biochemical rates, the rates set stomatal
//! conductance and transpiration, and transpiration sets leaf temperature. The
//! coupler alternates the two solvers through an explicit state machine:
//!
//! ```text
//! Initial --(infeasible)--------------------------------> Failed
//!    |  \--(A below threshold or no water use)----------> Converged
//!    v
//! Iterating(0) -> Iterating(1) -> ... -> Iterating(max) -> Converged
//!    \--------------(infeasible or no water use)--------> Failed
//! ```
//!
//! A low but valid initial rate is kept as-is, whereas a failure once
//! iterating zeroes the whole fraction.

use crate::leaf::{FractionResult, LeafAreaFraction, PassContext, WaterMode};
use crate::parameters::{LeafTemperatureSeed, ModelSettings};
use dcapst_core::errors::DcapstResult;
use dcapst_core::FloatValue;
use log::warn;

/// State of the fixed-point iteration for one leaf fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouplerState {
    Initial,
    /// Number of completed iterations after the initial pass
    Iterating(usize),
    Converged,
    Failed,
}

/// Outcome of coupling one leaf fraction for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplerOutcome {
    pub result: FractionResult,
    /// Terminal state, either `Converged` or `Failed`
    pub state: CouplerState,
    /// Iterations completed after the initial pass
    pub iterations: usize,
}

impl CouplerOutcome {
    fn zero() -> Self {
        Self {
            result: FractionResult::zero(),
            state: CouplerState::Converged,
            iterations: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimestepCoupler<'a> {
    settings: &'a ModelSettings,
}

impl<'a> TimestepCoupler<'a> {
    pub fn new(settings: &'a ModelSettings) -> Self {
        Self { settings }
    }

    /// Leaf temperature the iteration starts from
    fn seed(&self, fraction: &LeafAreaFraction, context: &PassContext) -> FloatValue {
        let air = context.weather.air_temperature;
        match self.settings.leaf_temperature_seed {
            LeafTemperatureSeed::PreviousHour => fraction.leaf_temperature().unwrap_or(air),
            LeafTemperatureSeed::AirTemperature => air,
        }
    }

    /// Couple assimilation and the energy balance of `fraction` for the
    /// current interval.
    pub fn couple(
        &self,
        fraction: &mut LeafAreaFraction,
        context: &PassContext,
        mode: WaterMode,
    ) -> DcapstResult<CouplerOutcome> {
        if fraction.lai() <= 0.0 {
            return Ok(CouplerOutcome::zero());
        }
        if let WaterMode::Limited { supply } = mode {
            if supply <= 0.0 {
                return Ok(CouplerOutcome::zero());
            }
        }

        let seed = self.seed(fraction, context);
        fraction.set_leaf_temperature(seed);

        let mut state = CouplerState::Initial;
        let mut result = FractionResult::zero();
        let mut iterations = 0;

        loop {
            state = match state {
                CouplerState::Initial => match fraction.pass(context, mode)? {
                    None => CouplerState::Failed,
                    Some(pass) => {
                        result = pass.result;
                        if result.assimilation < self.settings.negligible_assimilation
                            || result.water_use == 0.0
                        {
                            CouplerState::Converged
                        } else {
                            CouplerState::Iterating(0)
                        }
                    }
                },
                CouplerState::Iterating(n) if n >= self.settings.max_iterations => {
                    CouplerState::Converged
                }
                CouplerState::Iterating(n) => match fraction.pass(context, mode)? {
                    Some(pass) if pass.result.water_use > 0.0 => {
                        result = pass.result;
                        iterations = n + 1;
                        CouplerState::Iterating(n + 1)
                    }
                    _ => {
                        warn!(
                            "{} {} fraction failed after {} iterations at hour {}; results zeroed",
                            context.pathway.pathway,
                            fraction.kind(),
                            n,
                            context.weather.hour
                        );
                        CouplerState::Failed
                    }
                },
                CouplerState::Converged => {
                    return Ok(CouplerOutcome {
                        result,
                        state,
                        iterations,
                    })
                }
                CouplerState::Failed => {
                    fraction.clear_leaf_temperature();
                    return Ok(CouplerOutcome {
                        result: FractionResult::zero(),
                        state,
                        iterations,
                    });
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canopy::{FractionConditions, HourlyWeather};
    use crate::leaf::FractionKind;
    use crate::parameters::{CanopyParameters, PathwayParameters, WaterParameters};
    use crate::photosynthesis::RatesAt25;

    fn weather() -> HourlyWeather {
        let air = 27.0;
        HourlyWeather {
            hour: 10.0,
            air_temperature: air,
            min_temperature: 16.0,
            atmospheric_pressure: 1.01325,
            air_molar_density: 1.01325e5 / (287.0 * (air + 273.15)) * 1000.0 / 28.966,
            total_radiation: 600.0,
            direct: 400.0,
            diffuse: 200.0,
            direct_par: 912.0,
            diffuse_par: 456.0,
            sun_angle: 1.0,
            solar_constant: 1360.0,
        }
    }

    fn conditions(rates_at_25: RatesAt25, photons: f64) -> FractionConditions {
        FractionConditions {
            lai: 1.5,
            rates_at_25,
            absorbed_radiation: 400.0,
            photons,
            boundary_heat_conductance: 0.05,
            net_radiation: 350.0,
        }
    }

    fn typical_rates() -> RatesAt25 {
        RatesAt25 {
            vcmax: 150.0,
            rd: 1.5,
            jmax: 280.0,
            vpmax: 0.0,
            gm: 0.7,
        }
    }

    struct Fixture {
        canopy: CanopyParameters,
        pathway: PathwayParameters,
        water: WaterParameters,
        settings: ModelSettings,
        weather: HourlyWeather,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                canopy: CanopyParameters::default(),
                pathway: PathwayParameters::c3(),
                water: WaterParameters::default(),
                settings: ModelSettings::default(),
                weather: weather(),
            }
        }

        fn context(&self) -> PassContext<'_> {
            PassContext {
                canopy: &self.canopy,
                pathway: &self.pathway,
                water: &self.water,
                weather: &self.weather,
            }
        }

        fn fraction(&self, conditions: FractionConditions) -> LeafAreaFraction {
            let mut fraction = LeafAreaFraction::new(FractionKind::Sunlit, &self.canopy, &self.pathway);
            fraction.set_conditions(conditions);
            fraction
        }
    }

    #[test]
    fn test_converges_after_full_iteration() {
        let fixture = Fixture::new();
        let mut fraction = fixture.fraction(conditions(typical_rates(), 1500.0));
        let coupler = TimestepCoupler::new(&fixture.settings);

        let outcome = coupler
            .couple(&mut fraction, &fixture.context(), WaterMode::Unlimited)
            .unwrap();

        assert_eq!(outcome.state, CouplerState::Converged);
        assert_eq!(outcome.iterations, 3);
        assert!(outcome.result.assimilation > 0.5);
        assert!(outcome.result.water_use > 0.0 && outcome.result.water_use.is_finite());

        let leaf = fraction.leaf_temperature().unwrap();
        assert!((leaf - 27.0).abs() < 10.0, "Leaf temperature {} implausible", leaf);
    }

    #[test]
    fn test_limited_mode_uses_supply() {
        let fixture = Fixture::new();
        let mut unlimited = fixture.fraction(conditions(typical_rates(), 1500.0));
        let mut limited = fixture.fraction(conditions(typical_rates(), 1500.0));
        let coupler = TimestepCoupler::new(&fixture.settings);

        let potential = coupler
            .couple(&mut unlimited, &fixture.context(), WaterMode::Unlimited)
            .unwrap();
        let supply = potential.result.water_use * 0.5;
        let actual = coupler
            .couple(&mut limited, &fixture.context(), WaterMode::Limited { supply })
            .unwrap();

        assert_eq!(actual.state, CouplerState::Converged);
        assert_eq!(actual.result.water_use, supply);
        assert!(actual.result.assimilation > 0.0);
        assert!(actual.result.assimilation < potential.result.assimilation);
    }

    #[test]
    fn test_negligible_assimilation_keeps_initial_pass() {
        let fixture = Fixture::new();
        let rates = RatesAt25 {
            vcmax: 0.5,
            rd: 0.0,
            jmax: 100.0,
            vpmax: 0.0,
            gm: 0.5,
        };
        let mut fraction = fixture.fraction(conditions(rates, 1500.0));
        let coupler = TimestepCoupler::new(&fixture.settings);

        let outcome = coupler
            .couple(&mut fraction, &fixture.context(), WaterMode::Unlimited)
            .unwrap();

        assert_eq!(outcome.state, CouplerState::Converged);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.result.assimilation > 0.0 && outcome.result.assimilation < 0.5);
        assert!(outcome.result.water_use > 0.0);
    }

    #[test]
    fn test_infeasible_initial_pass_fails_to_zero() {
        let fixture = Fixture::new();
        let mut fraction = fixture.fraction(conditions(typical_rates(), 0.0));
        fraction.set_leaf_temperature(30.0);
        let coupler = TimestepCoupler::new(&fixture.settings);

        let outcome = coupler
            .couple(&mut fraction, &fixture.context(), WaterMode::Unlimited)
            .unwrap();

        assert_eq!(outcome.state, CouplerState::Failed);
        assert_eq!(outcome.result, FractionResult::zero());
        assert_eq!(fraction.leaf_temperature(), None);
    }

    #[test]
    fn test_empty_fraction_and_dry_supply_are_zero() {
        let fixture = Fixture::new();
        let coupler = TimestepCoupler::new(&fixture.settings);

        let mut empty = fixture.fraction(FractionConditions {
            lai: 0.0,
            ..conditions(typical_rates(), 1500.0)
        });
        let outcome = coupler
            .couple(&mut empty, &fixture.context(), WaterMode::Unlimited)
            .unwrap();
        assert_eq!(outcome.result, FractionResult::zero());

        let mut dry = fixture.fraction(conditions(typical_rates(), 1500.0));
        let outcome = coupler
            .couple(&mut dry, &fixture.context(), WaterMode::Limited { supply: 0.0 })
            .unwrap();
        assert_eq!(outcome.result, FractionResult::zero());
    }

    #[test]
    fn test_seed_mode() {
        let mut fixture = Fixture::new();
        let mut fraction = fixture.fraction(conditions(typical_rates(), 1500.0));
        fraction.set_leaf_temperature(35.0);

        let coupler = TimestepCoupler::new(&fixture.settings);
        assert_eq!(coupler.seed(&fraction, &fixture.context()), 35.0);

        fixture.settings.leaf_temperature_seed = LeafTemperatureSeed::AirTemperature;
        let coupler = TimestepCoupler::new(&fixture.settings);
        assert_eq!(coupler.seed(&fraction, &fixture.context()), 27.0);
    }
}
