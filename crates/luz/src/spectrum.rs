use crate::{Float, SPECTRUM_BANDS, SPECTRUM_GAP, SPECTRUM_START};

/// A spectral distribution over thirty-one 10 nm bands from 390 nm.
///
/// Depending on context, band values are reflectance or radiance; either
/// way, they are unitless per band. The in-memory resolution is fixed:
/// spectra defined at other resolutions in the text configuration are
/// resampled onto these bands when parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spectrum {
    bands: [Float; SPECTRUM_BANDS],
}

impl Spectrum {
    /// Create a new spectrum from its band values.
    pub const fn new(bands: [Float; SPECTRUM_BANDS]) -> Self {
        Self { bands }
    }

    /// Create a new spectrum with the same value in every band.
    pub const fn flat(value: Float) -> Self {
        Self {
            bands: [value; SPECTRUM_BANDS],
        }
    }

    /// Get the wavelength of the band with the given index, in nanometers.
    #[inline]
    pub const fn wavelength(index: usize) -> usize {
        SPECTRUM_START + SPECTRUM_GAP * index
    }

    /// Access the band values.
    #[inline]
    pub const fn bands(&self) -> &[Float; SPECTRUM_BANDS] {
        &self.bands
    }

    /// Mutably access the band values.
    #[inline]
    pub fn bands_mut(&mut self) -> &mut [Float; SPECTRUM_BANDS] {
        &mut self.bands
    }

    /// Multiply this spectrum band-wise with another one.
    pub fn scaled(&self, other: &Spectrum) -> Spectrum {
        let mut bands = [0.0; SPECTRUM_BANDS];
        for (band, (a, b)) in bands.iter_mut().zip(self.bands.iter().zip(&other.bands)) {
            *band = a * b;
        }
        Spectrum { bands }
    }

    /// Add another spectrum, scaled by the given factor, band-wise.
    pub fn add_scaled(&self, other: &Spectrum, factor: Float) -> Spectrum {
        let mut bands = [0.0; SPECTRUM_BANDS];
        for (band, (a, b)) in bands.iter_mut().zip(self.bands.iter().zip(&other.bands)) {
            *band = b.mul_add(factor, *a);
        }
        Spectrum { bands }
    }

    /// Integrate this spectrum against the given weighting spectrum.
    ///
    /// The result is the band-wise product summed over all bands and divided
    /// by the band count.
    pub fn integrate(&self, weight: &Spectrum) -> Float {
        let mut sum = 0.0;
        for (a, b) in self.bands.iter().zip(&weight.bands) {
            sum += a * b;
        }
        sum / SPECTRUM_BANDS as Float
    }

    /// Determine whether every band holds a finite value.
    pub fn is_finite(&self) -> bool {
        self.bands.iter().all(|band| band.is_finite())
    }
}

impl std::ops::Index<usize> for Spectrum {
    type Output = Float;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.bands[index]
    }
}

impl std::ops::IndexMut<usize> for Spectrum {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.bands[index]
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Multiply the 3 by 3 matrix and 3-element vector with each other,
/// producing a new 3-element vector.
#[inline]
fn multiply(matrix: &[[Float; 3]; 3], vector: &[Float; 3]) -> [Float; 3] {
    let [row1, row2, row3] = matrix;

    [
        row1[0].mul_add(vector[0], row1[1].mul_add(vector[1], row1[2] * vector[2])),
        row2[0].mul_add(vector[0], row2[1].mul_add(vector[1], row2[2] * vector[2])),
        row3[0].mul_add(vector[0], row3[1].mul_add(vector[1], row3[2] * vector[2])),
    ]
}

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
const XYZ_TO_LINEAR_RGB: [[Float; 3]; 3] = [
    [  3.134274799724, -1.617275708956, -0.490724283042 ],
    [ -0.978795575994,  1.916161689117,  0.033453331711 ],
    [  0.071976988401, -0.228984974402,  1.405718224383 ],
];

#[rustfmt::skip]
#[allow(clippy::excessive_precision)]
const LINEAR_RGB_TO_XYZ: [[Float; 3]; 3] = [
    [ 0.436035160, 0.385116580, 0.143051150 ],
    [ 0.222488400, 0.716903690, 0.060607910 ],
    [ 0.013916020, 0.097061160, 0.713928220 ],
];

/// Convert tristimulus coordinates to linear RGB.
///
/// The fixed matrix expects XYZ normalized to a D50 white point, matching
/// the engine's builtin daylight illuminant. Coordinates are not clamped;
/// out-of-gamut colors come through with channels outside `0..=1`.
pub fn xyz_to_rgb(xyz: &[Float; 3]) -> [Float; 3] {
    multiply(&XYZ_TO_LINEAR_RGB, xyz)
}

/// Convert linear RGB coordinates to tristimulus coordinates.
///
/// This is the inverse of [`xyz_to_rgb`].
pub fn rgb_to_xyz(rgb: &[Float; 3]) -> [Float; 3] {
    multiply(&LINEAR_RGB_TO_XYZ, rgb)
}
