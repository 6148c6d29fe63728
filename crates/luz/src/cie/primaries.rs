use crate::Spectrum;

// The three builtin primary reflectances partition a flat unit spectrum:
// logistic transitions at 490 nm and 585 nm split the bands into blue, green,
// and red thirds, with an 8% baseline in every band so that saturated
// mixtures stay inside the RGB gamut. `rgb R G B` spectrum literals are
// weighted sums of these tables.

/// The builtin `red` primary reflectance.
#[rustfmt::skip]
pub(crate) const PRIMARY_RED: Spectrum = Spectrum::new([
    0.080000, 0.080000, 0.080000, 0.080000,
    0.080000, 0.080000, 0.080000, 0.080002,
    0.080008, 0.080036, 0.080139, 0.080444,
    0.081232, 0.083106, 0.087424, 0.097196,
    0.118754, 0.163907, 0.249037, 0.381792,
    0.537931, 0.670686, 0.755817, 0.800971,
    0.822531, 0.832308, 0.836638, 0.838535,
    0.839363, 0.839723, 0.839880,
]);

/// The builtin `green` primary reflectance.
#[rustfmt::skip]
pub(crate) const PRIMARY_GREEN: Spectrum = Spectrum::new([
    0.080183, 0.080420, 0.080966, 0.082219,
    0.085087, 0.091603, 0.106178, 0.137650,
    0.200732, 0.310198, 0.459861, 0.609321,
    0.718028, 0.779242, 0.806397, 0.811201,
    0.796159, 0.753874, 0.669997, 0.537788,
    0.381887, 0.249234, 0.164149, 0.119014,
    0.097463, 0.087689, 0.083361, 0.081464,
    0.080637, 0.080277, 0.080120,
]);

/// The builtin `blue` primary reflectance.
#[rustfmt::skip]
pub(crate) const PRIMARY_BLUE: Spectrum = Spectrum::new([
    0.839817, 0.839580, 0.839034, 0.837781,
    0.834913, 0.828397, 0.813822, 0.782348,
    0.719259, 0.609765, 0.460000, 0.310235,
    0.200741, 0.137652, 0.106178, 0.091603,
    0.085087, 0.082219, 0.080966, 0.080420,
    0.080183, 0.080079, 0.080035, 0.080015,
    0.080007, 0.080003, 0.080001, 0.080001,
    0.080000, 0.080000, 0.080000,
]);
