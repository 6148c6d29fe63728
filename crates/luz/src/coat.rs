use crate::{Float, Spectrum};

/// The reflectance floor used when deriving opaqueness, so that nearly
/// black coats do not divide by zero.
const ON_WHITE_FLOOR: Float = 1e-5;

/// One colorant layer in the simulated stack.
///
/// A coat is characterized by two measured spectra: its reflectance over an
/// ideal white substrate and over an ideal black one. Their band-wise ratio,
/// the *opaqueness*, captures how much the coat behaves like opaque paint
/// rather than a subtractive ink filter. A coat with a zero `on_black`
/// spectrum is a pure ink; one whose `on_black` equals `on_white` hides the
/// substrate entirely.
#[derive(Clone, Debug)]
pub struct Coat {
    pub(crate) on_white: Spectrum,
    pub(crate) on_black: Spectrum,
    pub(crate) opaqueness: Spectrum,
    pub(crate) scale: Float,
    pub(crate) trc_gamma: Float,
    pub(crate) levels: u32,
}

impl Default for Coat {
    fn default() -> Self {
        Self {
            on_white: Spectrum::flat(0.0),
            on_black: Spectrum::flat(0.0),
            opaqueness: Spectrum::flat(0.0),
            scale: 1.0,
            trc_gamma: 1.0,
            levels: 0,
        }
    }
}

impl Coat {
    /// Access this coat's reflectance over an ideal white substrate.
    #[inline]
    pub const fn on_white(&self) -> &Spectrum {
        &self.on_white
    }

    /// Access this coat's reflectance over an ideal black substrate.
    #[inline]
    pub const fn on_black(&self) -> &Spectrum {
        &self.on_black
    }

    /// Access this coat's derived band-wise opaqueness.
    ///
    /// Every band is within `0..=1`, no matter how the two reflectance
    /// spectra were configured.
    #[inline]
    pub const fn opaqueness(&self) -> &Spectrum {
        &self.opaqueness
    }

    /// Get the factor applied to requested coverage.
    #[inline]
    pub const fn scale(&self) -> Float {
        self.scale
    }

    /// Get the exponent applied to requested coverage.
    #[inline]
    pub const fn trc_gamma(&self) -> Float {
        self.trc_gamma
    }

    /// Get the number of discrete coverage levels.
    ///
    /// Zero and one both mean continuous coverage; two or more quantize
    /// separated coverage to that many steps.
    #[inline]
    pub const fn levels(&self) -> u32 {
        self.levels
    }

    /// Rederive the opaqueness from the two reflectance spectra.
    ///
    /// Must run after every mutation of `on_white` or `on_black`.
    pub(crate) fn recompute_opaqueness(&mut self) {
        for index in 0..crate::SPECTRUM_BANDS {
            let white = self.on_white[index].max(ON_WHITE_FLOOR);
            self.opaqueness[index] = (self.on_black[index] / white).clamp(0.0, 1.0);
        }
    }

    /// Lay this coat over the given spectrum at the requested coverage.
    ///
    /// Coverage first passes through the coat's transfer curve and scale
    /// factor. Per band, the result blends between acting as a subtractive
    /// ink filter and an opaque paint layer, weighted by the band's
    /// opaqueness.
    pub(crate) fn apply(&self, spectrum: &mut Spectrum, coverage: Float) {
        let mut coverage = coverage;
        if self.trc_gamma != 1.0 {
            coverage = coverage.powf(self.trc_gamma);
        }
        coverage *= self.scale;

        for index in 0..crate::SPECTRUM_BANDS {
            let band = spectrum[index];
            let inky = lerp(band, self.on_white[index] * band, coverage);
            let painty = lerp(band, self.on_white[index], coverage);
            spectrum[index] = lerp(inky, painty, self.opaqueness[index]);
        }
    }
}

#[inline]
fn lerp(a: Float, b: Float, t: Float) -> Float {
    (b - a).mul_add(t, a)
}
