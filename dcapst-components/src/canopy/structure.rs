//! Canopy structure: beam extinction, nitrogen profile, boundary layer
//! conductance and longwave exchange.

use crate::parameters::{CanopyParameters, PathwayParameters};
use crate::photosynthesis::RatesAt25;
use dcapst_core::constants::{
    saturated_vapour_pressure, ABSOLUTE_ZERO_C, NITROGEN_MOLAR_MASS, STEFAN_BOLTZMANN,
};
use dcapst_core::FloatValue;
use std::f64::consts::PI;

/// $(1 - e^{-k})/k$, continuous through $k = 0$
fn exponential_integral(k: FloatValue) -> FloatValue {
    if k.abs() < 1e-12 {
        1.0
    } else {
        (1.0 - (-k).exp()) / k
    }
}

/// Beam extinction coefficient of leaves at `leaf_angle` with the sun at
/// elevation `sun_angle` (both radians).
///
/// Uses the Goudriaan shadow projection for leaves of a single inclination.
/// Zero when the sun is at or below the horizon.
pub fn beam_extinction(leaf_angle: FloatValue, sun_angle: FloatValue) -> FloatValue {
    if sun_angle <= 0.0 {
        return 0.0;
    }

    let projection = if leaf_angle <= sun_angle {
        leaf_angle.cos() * sun_angle.sin()
    } else {
        let theta = (leaf_angle.tan().recip() * sun_angle.tan()).acos();
        2.0 / PI * leaf_angle.sin() * sun_angle.cos() * theta.sin()
            + (1.0 - 2.0 * theta / PI) * leaf_angle.cos() * sun_angle.sin()
    };
    projection / sun_angle.sin()
}

/// Exponential profile of photosynthetic leaf nitrogen through the canopy.
#[derive(Debug, Clone, Copy)]
pub struct NitrogenProfile {
    lai: FloatValue,
    /// Photosynthetic nitrogen at the top of the canopy
    /// unit: mmol N / m^2
    top_photosynthetic: FloatValue,
    /// Nitrogen allocation coefficient
    allocation: FloatValue,
}

impl NitrogenProfile {
    /// `sln` is the canopy average specific leaf nitrogen in g N / m^2
    pub fn new(canopy: &CanopyParameters, lai: FloatValue, sln: FloatValue) -> Self {
        let average = sln * 1000.0 / NITROGEN_MOLAR_MASS;
        let top = average * canopy.sln_ratio_top;
        let structural = canopy.structural_nitrogen;
        let top_photosynthetic = (top - structural).max(0.0);

        let allocation = if top_photosynthetic > 0.0 {
            (top_photosynthetic / (2.0 * average - top - structural).max(1e-6)).ln()
        } else {
            0.0
        };

        Self {
            lai,
            top_photosynthetic,
            allocation,
        }
    }

    pub fn allocation_coefficient(&self) -> FloatValue {
        self.allocation
    }

    /// Canopy total of a rate proportional to photosynthetic nitrogen
    pub fn canopy_rate(&self, ratio: FloatValue) -> FloatValue {
        self.lai * self.top_photosynthetic * ratio * exponential_integral(self.allocation)
    }

    /// Sunlit share of a rate proportional to photosynthetic nitrogen
    pub fn sunlit_rate(&self, ratio: FloatValue, beam_extinction: FloatValue) -> FloatValue {
        if beam_extinction <= 0.0 {
            return 0.0;
        }
        let k = self.allocation + beam_extinction * self.lai;
        self.lai * self.top_photosynthetic * ratio * exponential_integral(k)
    }

    pub fn canopy_rates(&self, pathway: &PathwayParameters) -> RatesAt25 {
        RatesAt25 {
            vcmax: self.canopy_rate(pathway.vcmax_sln_ratio),
            rd: self.canopy_rate(pathway.rd_sln_ratio),
            jmax: self.canopy_rate(pathway.jmax_sln_ratio),
            vpmax: self.canopy_rate(pathway.vpmax_sln_ratio),
            gm: self.canopy_rate(pathway.gm_sln_ratio),
        }
    }

    pub fn sunlit_rates(&self, pathway: &PathwayParameters, beam_extinction: FloatValue) -> RatesAt25 {
        RatesAt25 {
            vcmax: self.sunlit_rate(pathway.vcmax_sln_ratio, beam_extinction),
            rd: self.sunlit_rate(pathway.rd_sln_ratio, beam_extinction),
            jmax: self.sunlit_rate(pathway.jmax_sln_ratio, beam_extinction),
            vpmax: self.sunlit_rate(pathway.vpmax_sln_ratio, beam_extinction),
            gm: self.sunlit_rate(pathway.gm_sln_ratio, beam_extinction),
        }
    }
}

/// Boundary layer heat conductance of the canopy and of its sunlit leaves.
///
/// Returns `(total, sunlit)` in m / s; the shaded share is the difference.
pub fn boundary_heat_conductance(
    canopy: &CanopyParameters,
    lai: FloatValue,
    beam_extinction: FloatValue,
) -> (FloatValue, FloatValue) {
    let leaf = 0.01 * (canopy.wind_speed / canopy.leaf_width).sqrt();
    let wind_decay = 0.5 * canopy.wind_speed_extinction;

    let total = leaf * lai * exponential_integral(wind_decay * lai);
    let sunlit = if beam_extinction > 0.0 {
        leaf * lai * exponential_integral((wind_decay + beam_extinction) * lai)
    } else {
        0.0
    };
    (total, sunlit)
}

/// Net longwave loss from an exposed surface at air temperature.
///
/// unit: W / m^2
pub fn net_longwave(
    air_temperature: FloatValue,
    min_temperature: FloatValue,
    total_radiation: FloatValue,
    extraterrestrial: FloatValue,
) -> FloatValue {
    let vapour_pressure = saturated_vapour_pressure(min_temperature);
    let clear_sky = 0.75 * extraterrestrial;
    let cloudiness = if clear_sky > 0.0 {
        (total_radiation / clear_sky).clamp(0.3, 1.0)
    } else {
        0.3
    };

    STEFAN_BOLTZMANN
        * (air_temperature + ABSOLUTE_ZERO_C).powi(4)
        * (0.34 - 0.14 * vapour_pressure.sqrt())
        * (1.35 * cloudiness - 0.35)
}

/// Shares of the net longwave loss attributed to the canopy and its sunlit
/// leaves, returned as `(total, sunlit)`.
pub fn longwave_shares(
    net_longwave: FloatValue,
    diffuse_extinction: FloatValue,
    beam_extinction: FloatValue,
    lai: FloatValue,
) -> (FloatValue, FloatValue) {
    let kd = diffuse_extinction;
    let total = net_longwave * (1.0 - (-kd * lai).exp());
    let sunlit = if beam_extinction > 0.0 {
        net_longwave * kd * (1.0 - (-(kd + beam_extinction) * lai).exp()) / (kd + beam_extinction)
    } else {
        0.0
    };
    (total, sunlit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_beam_extinction_of_horizontal_leaves() {
        // Horizontal leaves project their full area whatever the sun angle
        for sun in [0.2, 0.7, 1.3] {
            assert_relative_eq!(beam_extinction(0.0, sun), 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_beam_extinction_is_continuous_at_leaf_angle() {
        let leaf = 60.0_f64.to_radians();
        let below = beam_extinction(leaf, leaf - 1e-9);
        let above = beam_extinction(leaf, leaf + 1e-9);
        assert_relative_eq!(below, above, max_relative = 1e-6);
    }

    #[test]
    fn test_beam_extinction_at_night() {
        assert_eq!(beam_extinction(1.0, 0.0), 0.0);
        assert_eq!(beam_extinction(1.0, -0.3), 0.0);
    }

    #[test]
    fn test_nitrogen_shares() {
        let canopy = CanopyParameters::default();
        let pathway = PathwayParameters::c3();
        let profile = NitrogenProfile::new(&canopy, 3.0, 1.5);

        let total = profile.canopy_rates(&pathway);
        let sunlit = profile.sunlit_rates(&pathway, 0.8);
        let shaded = total.minus(&sunlit);

        assert!(profile.allocation_coefficient() > 0.0);
        assert!(sunlit.vcmax > 0.0 && shaded.vcmax > 0.0);
        assert_relative_eq!(sunlit.vcmax + shaded.vcmax, total.vcmax, max_relative = 1e-12);

        // Average nitrogen is conserved: with a uniform profile the canopy
        // total is L * (N - Nb) * ratio
        let uniform = CanopyParameters {
            sln_ratio_top: 1.0,
            ..CanopyParameters::default()
        };
        let profile = NitrogenProfile::new(&uniform, 2.0, 1.4);
        assert_relative_eq!(
            profile.canopy_rate(1.0),
            2.0 * (100.0 - 14.0),
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_no_photosynthetic_nitrogen() {
        let canopy = CanopyParameters::default();
        let profile = NitrogenProfile::new(&canopy, 3.0, 0.1);
        assert_eq!(profile.canopy_rate(1.1), 0.0);
        assert_eq!(profile.sunlit_rate(1.1, 0.8), 0.0);
    }

    #[test]
    fn test_boundary_conductance_shares() {
        let canopy = CanopyParameters::default();
        let (total, sunlit) = boundary_heat_conductance(&canopy, 3.0, 0.9);
        assert!(total > sunlit && sunlit > 0.0);

        let (_, night) = boundary_heat_conductance(&canopy, 3.0, 0.0);
        assert_eq!(night, 0.0);
    }

    #[test]
    fn test_longwave_loss() {
        // Overcast conditions floor the cloud factor
        let loss = net_longwave(25.0, 15.0, 10.0, 1000.0);
        let overcast = net_longwave(25.0, 15.0, 0.0, 1000.0);
        assert_relative_eq!(loss, overcast);
        let clear = net_longwave(25.0, 15.0, 800.0, 1000.0);
        assert!(clear > loss && loss > 0.0);

        let (total, sunlit) = longwave_shares(clear, 0.78, 0.9, 3.0);
        assert!(total > sunlit && sunlit > 0.0);
    }
}
