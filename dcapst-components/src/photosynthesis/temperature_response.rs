//! Temperature response of leaf biochemistry
//!
//! Two families of response are used:
//!
//! - Arrhenius: Rubisco kinetics, Vcmax, Vpmax and Rd
//!   $$ k(T) = k_{25} \exp\left(\frac{E_a (T_K - 298.15)}{298.15 R T_K}\right) $$
//! - Peaked: Jmax and mesophyll conductance, which decline above an optimum
//!   $$ f(T) = \frac{1}{c}\left(\frac{2(T-T_{min})^\alpha (T_{opt}-T_{min})^\alpha - (T-T_{min})^{2\alpha}}{(T_{opt}-T_{min})^{2\alpha}}\right)^\beta $$
//!   with $\alpha = \ln 2 / \ln\left(\frac{T_{max}-T_{min}}{T_{opt}-T_{min}}\right)$.

use crate::parameters::{ArrheniusResponse, CanopyParameters, PathwayParameters, PeakedResponse};
use dcapst_core::constants::{GAS_CONSTANT, REFERENCE_TEMPERATURE_K};
use dcapst_core::FloatValue;
use serde::{Deserialize, Serialize};

/// Arrhenius response of a rate with value `at_25` at 25 °C.
pub fn arrhenius(at_25: FloatValue, factor: FloatValue, temperature: FloatValue) -> FloatValue {
    // The 273 offset (rather than 273.15) is part of the calibration of the
    // activation energies.
    let kelvin = temperature + 273.0;
    at_25
        * (factor * (kelvin - REFERENCE_TEMPERATURE_K)
            / (REFERENCE_TEMPERATURE_K * GAS_CONSTANT * kelvin))
            .exp()
}

/// Peaked response of a rate with value `at_25` at 25 °C.
///
/// Returns zero outside the open interval `(t_min, t_max)`.
pub fn peaked(at_25: FloatValue, response: &PeakedResponse, temperature: FloatValue) -> FloatValue {
    if !response.is_within_range(temperature) {
        return 0.0;
    }

    let span = response.t_opt - response.t_min;
    let alpha = 2.0_f64.ln() / ((response.t_max - response.t_min) / span).ln();
    let rise = temperature - response.t_min;
    let numerator = 2.0 * rise.powf(alpha) * span.powf(alpha) - rise.powf(2.0 * alpha);
    let shape = (numerator / span.powf(2.0 * alpha)).powf(response.beta);

    at_25 * shape / response.c
}

impl ArrheniusResponse {
    pub fn at(&self, temperature: FloatValue) -> FloatValue {
        arrhenius(self.at_25, self.factor, temperature)
    }
}

/// Nitrogen-scaled leaf rates at 25 °C for one leaf fraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatesAt25 {
    /// unit: µmol / m^2 / s
    pub vcmax: FloatValue,
    /// unit: µmol / m^2 / s
    pub rd: FloatValue,
    /// unit: µmol / m^2 / s
    pub jmax: FloatValue,
    /// unit: µmol / m^2 / s
    pub vpmax: FloatValue,
    /// unit: mol / m^2 / s / bar
    pub gm: FloatValue,
}

impl RatesAt25 {
    /// Element-wise difference, used to derive the shaded fraction
    pub fn minus(&self, other: &RatesAt25) -> RatesAt25 {
        RatesAt25 {
            vcmax: self.vcmax - other.vcmax,
            rd: self.rd - other.rd,
            jmax: self.jmax - other.jmax,
            vpmax: self.vpmax - other.vpmax,
            gm: self.gm - other.gm,
        }
    }
}

/// Leaf biochemistry evaluated at leaf temperature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafRates {
    pub vcmax: FloatValue,
    pub rd: FloatValue,
    pub jmax: FloatValue,
    pub vpmax: FloatValue,
    pub gm: FloatValue,
    pub kc: FloatValue,
    pub ko: FloatValue,
    pub vc_vo: FloatValue,
    pub kp: FloatValue,
    /// Potential electron transport rate
    /// unit: µmol / m^2 / s
    pub electron_transport: FloatValue,
    /// Half the reciprocal of Rubisco specificity
    pub gamma_factor: FloatValue,
}

impl LeafRates {
    /// Scale the rates at 25 °C to `temperature` and derive electron transport
    /// from the absorbed photon flux.
    pub fn at_temperature(
        pathway: &PathwayParameters,
        canopy: &CanopyParameters,
        rates: &RatesAt25,
        photons: FloatValue,
        temperature: FloatValue,
    ) -> Self {
        let vcmax = arrhenius(rates.vcmax, pathway.vcmax_activation, temperature);
        let rd = arrhenius(rates.rd, pathway.rd_activation, temperature);
        let vpmax = arrhenius(rates.vpmax, pathway.vpmax_activation, temperature);
        let jmax = peaked(rates.jmax, &pathway.jmax_response, temperature);
        let gm = peaked(rates.gm, &pathway.gm_response, temperature);

        let kc = pathway.kc.at(temperature);
        let ko = pathway.ko.at(temperature);
        let vc_vo = pathway.vc_vo.at(temperature);
        let kp = pathway.kp.at(temperature);

        let electron_transport = electron_transport_rate(
            photons * (1.0 - pathway.spectral_correction_factor) / 2.0,
            jmax,
            canopy.curvature_factor,
        );
        let specificity = ko / kc * vc_vo;

        Self {
            vcmax,
            rd,
            jmax,
            vpmax,
            gm,
            kc,
            ko,
            vc_vo,
            kp,
            electron_transport,
            gamma_factor: 0.5 / specificity,
        }
    }
}

/// Non-rectangular hyperbola of electron transport against absorbed light.
pub fn electron_transport_rate(
    absorbed: FloatValue,
    jmax: FloatValue,
    curvature: FloatValue,
) -> FloatValue {
    let sum = absorbed + jmax;
    (sum - (sum * sum - 4.0 * curvature * jmax * absorbed).sqrt()) / (2.0 * curvature)
}
