//! The inverse solver: from a target color back to coat levels.
//!
//! The mapping from coat levels to color is non-convex and, with more than
//! three coats, underdetermined, so the separator searches instead of
//! solving. A coarse pass enumerates the full coverage grid at increments of
//! 0.1 and keeps the closest candidate; a stochastic pass then perturbs that
//! candidate with an annealed radius, accepting only improvements. Both
//! passes honor the engine's coverage limit and stop early once a candidate
//! is close enough to the target.

use rand::rngs::SmallRng;
use rand::Rng;

use crate::{Float, Luz, Spectrum, MAX_COATS};

/// The grid step of the coarse search pass.
pub(crate) const INCREMENT: Float = 0.1;

/// The squared distance below which a candidate counts as a match.
const CLOSE_ENOUGH: Float = 1e-4;

/// How often one stochastic iteration may redraw an over-limit candidate.
const MAX_COVERAGE_ATTEMPTS: u32 = 10_000;

/// The weight of the green channel in RGB distances. Green dominates
/// perceived luminance, so errors there count extra.
const GREEN_WEIGHT: Float = 1.3;

/// What a separation searches for.
///
/// The two search phases are generic over the target; only the distance
/// function differs between matching a device color and matching a full
/// spectral distribution.
pub(crate) enum Target<'a> {
    Rgb([Float; 3]),
    Spectrum(&'a Spectrum),
}

impl Target<'_> {
    /// Compute the squared distance between this target and the color that
    /// the given coat levels produce.
    fn distance(&self, luz: &Luz, levels: &[Float; MAX_COATS]) -> Float {
        match *self {
            Target::Rgb(rgb) => {
                let [r, g, b] = luz.coats_to_rgb(levels);
                (rgb[0] - r) * (rgb[0] - r)
                    + (rgb[1] - g) * (rgb[1] - g) * GREEN_WEIGHT
                    + (rgb[2] - b) * (rgb[2] - b)
            }
            Target::Spectrum(spectrum) => {
                let actual = luz.coats_to_spectrum(levels);
                let mut sum = 0.0;
                for (a, b) in spectrum.bands().iter().zip(actual.bands()) {
                    sum += (a - b) * (a - b);
                }
                sum
            }
        }
    }
}

/// Separate the target into coat levels.
///
/// `levels` doubles as the starting guess and the result. The search runs
/// the coarse grid pass first and refines its best candidate stochastically
/// with the engine's iteration count and diffusion radii.
pub(crate) fn separate(
    luz: &Luz,
    target: &Target,
    levels: &mut [Float; MAX_COATS],
    rng: &mut SmallRng,
) {
    if luz.coat_count == 0 {
        return;
    }
    luz.note_separation();
    griddy(luz, target, levels);
    stochastic(luz, target, levels, rng);
}

/// Enumerate the coverage grid and keep the closest candidate.
///
/// The grid is walked like a counter: the rightmost coat advances first and
/// carries into its left neighbor past full coverage. Candidates over the
/// coverage limit are skipped without being evaluated.
fn griddy(luz: &Luz, target: &Target, levels: &mut [Float; MAX_COATS]) {
    let coats = luz.coat_count;
    let mut best = *levels;
    let mut best_distance = 1000.0;
    let mut attempt = [0.0; MAX_COATS];

    loop {
        let coatsum: Float = attempt[..coats].iter().sum();
        if coatsum <= luz.coverage_limit {
            let distance = target.distance(luz, &attempt);
            if distance < best_distance {
                best_distance = distance;
                best = attempt;
                if distance < CLOSE_ENOUGH {
                    break;
                }
            }
        }

        attempt[coats - 1] += INCREMENT;
        for index in (1..coats).rev() {
            if attempt[index] > 1.0 {
                attempt[index] = 0.0;
                attempt[index - 1] += INCREMENT;
            }
        }
        if attempt[0] > 1.0 {
            break;
        }
    }

    *levels = best;
}

/// Refine the starting candidate by annealed random perturbation.
///
/// Each iteration evaluates the current candidate, promotes it on strict
/// improvement, and then draws the next candidate around the best one. The
/// perturbation radius anneals linearly from the engine's first diffusion
/// radius to its second, and each coat is nudged against the direction of
/// the previous improvement. Candidates over the coverage limit are redrawn
/// up to [`MAX_COVERAGE_ATTEMPTS`] times; after that the iteration is
/// skipped and the search continues from the current best.
fn stochastic(
    luz: &Luz,
    target: &Target,
    levels: &mut [Float; MAX_COATS],
    rng: &mut SmallRng,
) {
    let coats = luz.coat_count;
    let iterations = luz.iterations;
    let mut prev_best = *levels;
    let mut best = *levels;
    let mut best_distance = 1000.0;
    let mut attempt = *levels;

    for iteration in 0..iterations {
        let distance = target.distance(luz, &attempt);
        if distance < best_distance {
            best_distance = distance;
            for index in 0..coats {
                prev_best[index] = best[index];
                best[index] = attempt[index];
            }
            if distance < CLOSE_ENOUGH {
                break;
            }
        }

        let radius = iteration as Float * luz.diffusion1 / iterations as Float
            + (iterations - iteration) as Float * (luz.diffusion0 / iterations as Float);
        let mut attempts_left = MAX_COVERAGE_ATTEMPTS;
        loop {
            let mut coatsum = 0.0;
            for index in 0..coats {
                let drift = prev_best[index] - best[index];
                let direction = if drift > 0.001 {
                    0.75
                } else if drift < -0.001 {
                    1.25
                } else {
                    1.0
                };
                attempt[index] = (best[index]
                    + (rng.random::<Float>() * 2.0 - direction) * radius)
                    .clamp(0.0, 1.0);
                coatsum += attempt[index];
            }
            if coatsum <= luz.coverage_limit {
                break;
            }
            attempts_left -= 1;
            if attempts_left == 0 {
                attempt = best;
                break;
            }
        }
    }

    levels[..coats].copy_from_slice(&best[..coats]);
}
