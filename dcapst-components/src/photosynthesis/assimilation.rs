//! Co-limited CO2 assimilation
//!
//! Every `{pathway, process}` pair is expressed through one generalised system
//! in the assimilation rate $A$:
//!
//! $$ C_m = p - qA $$
//! $$ C_c = x_9 C_m + x_7 (x_4 C_m + x_5 - x_6 A - m) $$
//! $$ O_c = s_b x_7 A + e $$
//! $$ (A + R)(x_8 C_c + x_2 O_c + x_3) = x_1 (C_c - t O_c) $$
//!
//! where $p$ and $q$ describe the CO2 supply (an intercellular partial pressure
//! and mesophyll resistance when water is unlimited, or the air partial pressure
//! and the total resistance when it is limited). Substituting the linear
//! compartment equations gives a quadratic in $A$ whose smaller root is the
//! physically meaningful rate.

use super::pathway::{build_coefficients, CoefficientInputs, LimitingProcess};
use dcapst_core::errors::DcapstResult;
use dcapst_core::FloatValue;

/// Coefficients of the assimilation system for one `{pathway, process}` pair.
///
/// The nine terms of `x` are, in order: the maximum rate of the limiting
/// process, the O2 term of the denominator, the constant term of the
/// denominator, PEP carboxylation per unit mesophyll CO2, PEP regeneration,
/// the share of assimilation drawn through the bundle sheath, bundle sheath
/// resistance, the CO2 term of the denominator and the direct
/// mesophyll-to-chloroplast transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssimilationCoefficients {
    pub x: [FloatValue; 9],
    /// Mesophyll respiration
    pub m: FloatValue,
    /// Half the reciprocal of Rubisco specificity
    pub t: FloatValue,
    /// Bundle sheath O2 release per unit assimilation
    pub sb: FloatValue,
    /// Bundle sheath conductance
    pub j: FloatValue,
    /// O2 partial pressure
    pub e: FloatValue,
    /// Respiration
    pub r: FloatValue,
}

impl AssimilationCoefficients {
    /// Chloroplastic CO2 as `c0 + c1 A`
    fn chloroplastic_co2_terms(&self, p: FloatValue, q: FloatValue) -> (FloatValue, FloatValue) {
        let x = &self.x;
        let c0 = x[8] * p + x[6] * (x[3] * p + x[4] - self.m);
        let c1 = -x[8] * q - x[6] * (x[3] * q + x[5]);
        (c0, c1)
    }

    /// Quadratic coefficients `(a, b, c)` of `a A² + b A + c = 0`
    pub fn quadratic(&self, p: FloatValue, q: FloatValue) -> (FloatValue, FloatValue, FloatValue) {
        let x = &self.x;
        let (c0, c1) = self.chloroplastic_co2_terms(p, q);
        let o1 = self.sb * x[6];

        let denominator0 = x[7] * c0 + x[1] * self.e + x[2];
        let denominator1 = x[7] * c1 + x[1] * o1;
        let numerator0 = c0 - self.t * self.e;
        let numerator1 = c1 - self.t * o1;

        let a = denominator1;
        let b = denominator0 + self.r * denominator1 - x[0] * numerator1;
        let c = self.r * denominator0 - x[0] * numerator0;
        (a, b, c)
    }

    /// Assimilation rate for the given CO2 supply.
    ///
    /// Returns NaN when the system has no real solution.
    pub fn solve(&self, p: FloatValue, q: FloatValue) -> FloatValue {
        let (a, b, c) = self.quadratic(p, q);
        smaller_root(a, b, c)
    }

    /// unit: µbar
    pub fn mesophyll_co2(&self, p: FloatValue, q: FloatValue, rate: FloatValue) -> FloatValue {
        p - q * rate
    }

    /// unit: µbar
    pub fn chloroplastic_co2(&self, p: FloatValue, q: FloatValue, rate: FloatValue) -> FloatValue {
        let (c0, c1) = self.chloroplastic_co2_terms(p, q);
        c0 + c1 * rate
    }

    /// unit: µbar
    pub fn chloroplastic_o2(&self, rate: FloatValue) -> FloatValue {
        self.sb * self.x[6] * rate + self.e
    }
}

/// Smaller root of `a x² + b x + c = 0` after normalising to `a ≥ 0`.
///
/// Degenerates to the linear root when `a` vanishes. Returns NaN for a
/// negative discriminant.
pub fn smaller_root(a: FloatValue, b: FloatValue, c: FloatValue) -> FloatValue {
    let (a, b, c) = if a < 0.0 { (-a, -b, -c) } else { (a, b, c) };

    if a.abs() < 1e-12 {
        return if b != 0.0 { -c / b } else { FloatValue::NAN };
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return FloatValue::NAN;
    }
    (-b - discriminant.sqrt()) / (2.0 * a)
}

/// The limiting assimilation rate of a leaf fraction.
#[derive(Debug, Clone, Copy)]
pub struct Assimilation {
    /// unit: µmol CO2 / m^2 / s
    pub rate: FloatValue,
    pub process: LimitingProcess,
    pub coefficients: AssimilationCoefficients,
}

/// Solve every limiting process of the pathway and keep the slowest.
///
/// `Ok(None)` signals numeric infeasibility: at least one process produced a
/// NaN or non-positive rate.
pub fn solve_assimilation(
    inputs: &CoefficientInputs,
    p: FloatValue,
    q: FloatValue,
) -> DcapstResult<Option<Assimilation>> {
    let mut limiting: Option<Assimilation> = None;

    for process in inputs.pathway.pathway.limiting_processes() {
        let coefficients = build_coefficients(*process, inputs)?;
        let rate = coefficients.solve(p, q);
        if rate.is_nan() || rate <= 0.0 {
            return Ok(None);
        }

        if limiting.map_or(true, |current| rate < current.rate) {
            limiting = Some(Assimilation {
                rate,
                process: *process,
                coefficients,
            });
        }
    }

    Ok(limiting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{CanopyParameters, PathwayParameters};
    use crate::photosynthesis::{LeafRates, Pathway, RatesAt25};
    use approx::assert_relative_eq;

    fn leaf_rates(pathway: &PathwayParameters, canopy: &CanopyParameters) -> LeafRates {
        let rates = RatesAt25 {
            vcmax: 110.0,
            rd: 1.1,
            jmax: 195.0,
            vpmax: 60.0,
            gm: 0.47,
        };
        LeafRates::at_temperature(pathway, canopy, &rates, 1500.0, 27.0)
    }

    /// Residual of the rate equation for a candidate assimilation rate
    fn residual(c: &AssimilationCoefficients, p: FloatValue, q: FloatValue, a: FloatValue) -> FloatValue {
        let cc = c.chloroplastic_co2(p, q, a);
        let o = c.chloroplastic_o2(a);
        let x = &c.x;
        (a + c.r) * (x[7] * cc + x[1] * o + x[2]) - x[0] * (cc - c.t * o)
    }

    #[test]
    fn test_smaller_root() {
        // (A - 1)(A - 3)
        assert_relative_eq!(smaller_root(1.0, -4.0, 3.0), 1.0);
        // Sign of the leading coefficient does not change the selected root
        assert_relative_eq!(smaller_root(-1.0, 4.0, -3.0), 1.0);
    }

    #[test]
    fn test_negative_discriminant_is_nan() {
        assert!(smaller_root(1.0, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_linear_root() {
        assert_relative_eq!(smaller_root(0.0, 2.0, -4.0), 2.0);
        assert!(smaller_root(0.0, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_c3_rubisco_matches_farquhar_without_mesophyll_resistance() {
        let pathway = PathwayParameters::c3();
        let canopy = CanopyParameters::default();
        let rates = leaf_rates(&pathway, &canopy);
        let inputs = CoefficientInputs {
            pathway: &pathway,
            canopy: &canopy,
            rates: &rates,
            lai: 1.0,
            mesophyll_co2: 266.0,
            chloroplastic_co2: 266.0,
            chloroplastic_o2: canopy.air_o2,
        };

        let c = build_coefficients(LimitingProcess::Ac1, &inputs).unwrap();
        let cc = 266.0;
        let o = canopy.air_o2;
        let expected = rates.vcmax * (cc - rates.gamma_factor * o)
            / (cc + rates.kc * (1.0 + o / rates.ko))
            - rates.rd;

        assert_relative_eq!(c.solve(cc, 0.0), expected, max_relative = 1e-10);
    }

    #[test]
    fn test_roots_satisfy_rate_equation() {
        let canopy = CanopyParameters::default();
        for pathway in [
            PathwayParameters::c3(),
            PathwayParameters::c4(),
            PathwayParameters::ccm(),
        ] {
            let rates = leaf_rates(&pathway, &canopy);
            let ci = pathway.intercellular_to_air_co2_ratio * canopy.air_co2;
            let inputs = CoefficientInputs {
                pathway: &pathway,
                canopy: &canopy,
                rates: &rates,
                lai: 1.5,
                mesophyll_co2: ci,
                chloroplastic_co2: ci,
                chloroplastic_o2: canopy.air_o2,
            };
            let q = 1.0 / rates.gm;

            for process in pathway.pathway.limiting_processes() {
                let c = build_coefficients(*process, &inputs).unwrap();
                let a = c.solve(ci, q);
                assert!(a > 0.0, "{} {} gave {}", pathway.pathway, process, a);

                let scale = (a + c.r) * c.x[7] * ci;
                assert!(
                    residual(&c, ci, q, a).abs() / scale < 1e-9,
                    "{} {} residual {}",
                    pathway.pathway,
                    process,
                    residual(&c, ci, q, a)
                );

                // The other root is the larger one
                let (qa, qb, qc) = c.quadratic(ci, q);
                let other = if qa.abs() > 1e-12 { -qb / qa - a } else { a };
                assert!(other >= a);
            }
        }
    }

    #[test]
    fn test_limiting_rate_is_minimum() {
        let pathway = PathwayParameters::c4();
        let canopy = CanopyParameters::default();
        let rates = leaf_rates(&pathway, &canopy);
        let ci = pathway.intercellular_to_air_co2_ratio * canopy.air_co2;
        let inputs = CoefficientInputs {
            pathway: &pathway,
            canopy: &canopy,
            rates: &rates,
            lai: 1.5,
            mesophyll_co2: ci,
            chloroplastic_co2: ci,
            chloroplastic_o2: canopy.air_o2,
        };
        let q = 1.0 / rates.gm;

        let limiting = solve_assimilation(&inputs, ci, q).unwrap().unwrap();
        for process in Pathway::C4.limiting_processes() {
            let rate = build_coefficients(*process, &inputs).unwrap().solve(ci, q);
            assert!(limiting.rate <= rate);
        }
    }

    #[test]
    fn test_no_light_is_infeasible() {
        let pathway = PathwayParameters::c3();
        let canopy = CanopyParameters::default();
        let rates = RatesAt25 {
            vcmax: 110.0,
            rd: 1.1,
            jmax: 195.0,
            vpmax: 0.0,
            gm: 0.47,
        };
        let rates = LeafRates::at_temperature(&pathway, &canopy, &rates, 0.0, 27.0);
        let inputs = CoefficientInputs {
            pathway: &pathway,
            canopy: &canopy,
            rates: &rates,
            lai: 1.0,
            mesophyll_co2: 266.0,
            chloroplastic_co2: 266.0,
            chloroplastic_o2: canopy.air_o2,
        };

        // Electron transport is zero so net assimilation is negative
        let result = solve_assimilation(&inputs, 266.0, 1.0 / rates.gm).unwrap();
        assert!(result.is_none());
    }
}
