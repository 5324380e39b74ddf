//! Sunlit and shaded partitioning of absorbed radiation
//!
//! Follows de Pury and Farquhar (1997). For one waveband, with beam extinction
//! $k_b$, diffuse extinction $k_d$, leaf scattering $\sigma$ and canopy diffuse
//! reflection $\rho_{cd}$, radiation absorbed by a canopy slab between
//! cumulative leaf area $L_b$ (bottom) and $L_t$ (top) is built from the layer
//! kernel
//!
//! $$ E(x) = e^{-x L_b} - e^{-x L_t} $$

use crate::parameters::RadiationBand;
use dcapst_core::FloatValue;

/// Partitions incident radiation of one waveband between sunlit and shaded leaves.
#[derive(Debug, Clone, Copy)]
pub struct CanopyRadiationPartitioner {
    band: RadiationBand,
    /// Beam extinction coefficient
    beam_extinction: FloatValue,
    lai_top: FloatValue,
    lai_bottom: FloatValue,
}

impl CanopyRadiationPartitioner {
    /// A single-layer canopy of total leaf area `lai`
    pub fn new(band: RadiationBand, beam_extinction: FloatValue, lai: FloatValue) -> Self {
        Self::for_layer(band, beam_extinction, lai, 0.0)
    }

    /// A slab between cumulative leaf areas `lai_bottom` and `lai_top`,
    /// measured from the top of the canopy
    pub fn for_layer(
        band: RadiationBand,
        beam_extinction: FloatValue,
        lai_top: FloatValue,
        lai_bottom: FloatValue,
    ) -> Self {
        Self {
            band,
            beam_extinction,
            lai_top,
            lai_bottom,
        }
    }

    fn layer_integral(&self, extinction: FloatValue) -> FloatValue {
        (-extinction * self.lai_bottom).exp() - (-extinction * self.lai_top).exp()
    }

    fn scattering_root(&self) -> FloatValue {
        (1.0 - self.band.leaf_scattering).sqrt()
    }

    /// Extinction of beam and scattered beam radiation
    pub fn beam_scattered_extinction(&self) -> FloatValue {
        self.beam_extinction * self.scattering_root()
    }

    /// Extinction of diffuse and scattered diffuse radiation
    pub fn diffuse_scattered_extinction(&self) -> FloatValue {
        self.band.diffuse_extinction * self.scattering_root()
    }

    /// Reflection coefficient of a canopy of horizontal leaves
    pub fn horizontal_reflection(&self) -> FloatValue {
        let root = self.scattering_root();
        (1.0 - root) / (1.0 + root)
    }

    /// Canopy reflection coefficient for beam radiation
    pub fn beam_reflection(&self) -> FloatValue {
        let kb = self.beam_extinction;
        1.0 - (-2.0 * self.horizontal_reflection() * kb / (1.0 + kb)).exp()
    }

    /// Radiation absorbed by the whole slab
    pub fn total_radiation(&self, direct: FloatValue, diffuse: FloatValue) -> FloatValue {
        let beam = (1.0 - self.beam_reflection())
            * direct
            * self.layer_integral(self.beam_scattered_extinction());
        let diffuse = (1.0 - self.band.diffuse_reflection)
            * diffuse
            * self.layer_integral(self.diffuse_scattered_extinction());
        beam + diffuse
    }

    /// Direct beam absorbed by sunlit leaves
    pub fn sunlit_direct(&self, direct: FloatValue) -> FloatValue {
        (1.0 - self.band.leaf_scattering) * direct * self.layer_integral(self.beam_extinction)
    }

    /// Diffuse radiation absorbed by sunlit leaves
    pub fn sunlit_diffuse(&self, diffuse: FloatValue) -> FloatValue {
        let kd = self.diffuse_scattered_extinction();
        let kb = self.beam_extinction;
        (1.0 - self.band.diffuse_reflection) * diffuse * self.layer_integral(kd + kb) * (kd / (kd + kb))
    }

    /// Scattered beam absorbed by sunlit leaves
    pub fn sunlit_scattered(&self, direct: FloatValue) -> FloatValue {
        let kb_scattered = self.beam_scattered_extinction();
        let kb = self.beam_extinction;
        if kb_scattered + kb == 0.0 {
            return 0.0;
        }

        let scattered = (1.0 - self.beam_reflection()) * kb_scattered
            * self.layer_integral(kb_scattered + kb)
            / (kb_scattered + kb);
        let unscattered = (1.0 - self.band.leaf_scattering) * self.layer_integral(2.0 * kb) / 2.0;
        direct * (scattered - unscattered)
    }

    /// Radiation absorbed by sunlit leaves
    pub fn sunlit_radiation(&self, direct: FloatValue, diffuse: FloatValue) -> FloatValue {
        self.sunlit_direct(direct) + self.sunlit_diffuse(diffuse) + self.sunlit_scattered(direct)
    }

    /// Radiation absorbed by shaded leaves
    pub fn shaded_radiation(&self, direct: FloatValue, diffuse: FloatValue) -> FloatValue {
        self.total_radiation(direct, diffuse) - self.sunlit_radiation(direct, diffuse)
    }

    /// Leaf area illuminated by the direct beam
    pub fn sunlit_lai(&self) -> FloatValue {
        if self.beam_extinction <= 0.0 {
            return 0.0;
        }
        self.layer_integral(self.beam_extinction) / self.beam_extinction
    }

    pub fn shaded_lai(&self) -> FloatValue {
        self.lai_top - self.lai_bottom - self.sunlit_lai()
    }

    /// Fraction of the direct beam intercepted by the canopy
    pub fn intercepted_fraction(&self) -> FloatValue {
        if self.beam_extinction <= 0.0 {
            return 0.0;
        }
        1.0 - (-self.beam_extinction * self.lai_top).exp()
    }
}
