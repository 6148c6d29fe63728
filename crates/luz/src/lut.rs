//! The lazily filled separation cache.
//!
//! Separating one color takes tens of milliseconds at realistic iteration
//! counts, far too slow for per-pixel work. The engine therefore caches
//! separator results in a 16³ grid over RGB and answers lookups by
//! trilinear interpolation between the eight surrounding cells, filling
//! missing cells on demand.
//!
//! Each cell carries a one-byte state that moves from unfilled through
//! filling to filled, never backwards. The first thread to claim a cell via
//! compare-and-swap runs the separator and publishes the result with a
//! release store; threads that lose the race poll the state with acquire
//! loads and a short sleep until the result is visible. Filled cells are
//! immutable for the life of the engine, so later reads need no
//! synchronization beyond the state load.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU8, Ordering};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::separate::{separate, Target};
use crate::{Float, Luz, MAX_COATS};

/// The cache resolution per RGB channel.
pub(crate) const LUT_DIM: usize = 16;

const CELL_COUNT: usize = LUT_DIM * LUT_DIM * LUT_DIM;

const UNFILLED: u8 = 0;
const FILLING: u8 = 1;
const FILLED: u8 = 2;

/// How long to wait between polls of a cell another thread is filling.
const FILL_POLL: std::time::Duration = std::time::Duration::from_millis(3);

struct Cell {
    state: AtomicU8,
    levels: UnsafeCell<[Float; MAX_COATS]>,
}

// SAFETY: the state protocol makes `levels` single-writer: only the thread
// that wins the unfilled→filling compare-and-swap writes, and every read
// happens after observing the filled state with acquire ordering, which the
// writer published with release ordering.
unsafe impl Sync for Cell {}

/// The 16³ cache of separated coat levels, indexed by RGB.
pub(crate) struct Lut {
    cells: Box<[Cell]>,
}

impl Lut {
    pub fn new() -> Self {
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for _ in 0..CELL_COUNT {
            cells.push(Cell {
                state: AtomicU8::new(UNFILLED),
                levels: UnsafeCell::new([0.0; MAX_COATS]),
            });
        }
        Self {
            cells: cells.into_boxed_slice(),
        }
    }

    /// Look up the coat levels for the given RGB color.
    ///
    /// Ensures the eight surrounding cells are filled, then interpolates
    /// trilinearly along R, then G, then B.
    pub fn lookup(&self, luz: &Luz, rgb: &[Float; 3], levels: &mut [Float; MAX_COATS]) {
        let (ri, rdelta) = indice(rgb[0]);
        let (gi, gdelta) = indice(rgb[1]);
        let (bi, bdelta) = indice(rgb[2]);

        let c000 = self.ensure(luz, ri, gi, bi);
        let c100 = self.ensure(luz, ri + 1, gi, bi);
        let c101 = self.ensure(luz, ri + 1, gi, bi + 1);
        let c001 = self.ensure(luz, ri, gi, bi + 1);
        let c010 = self.ensure(luz, ri, gi + 1, bi);
        let c110 = self.ensure(luz, ri + 1, gi + 1, bi);
        let c111 = self.ensure(luz, ri + 1, gi + 1, bi + 1);
        let c011 = self.ensure(luz, ri, gi + 1, bi + 1);

        let front_low = lerp_levels(c000, c100, rdelta);
        let back_low = lerp_levels(c001, c101, rdelta);
        let front_high = lerp_levels(c010, c110, rdelta);
        let back_high = lerp_levels(c011, c111, rdelta);
        let front = lerp_levels(&front_low, &front_high, gdelta);
        let back = lerp_levels(&back_low, &back_high, gdelta);
        *levels = lerp_levels(&front, &back, bdelta);
    }

    /// Get the cell at the given coordinates, filling it if necessary.
    ///
    /// Exactly one separator run ever happens per cell: the thread whose
    /// compare-and-swap claims the cell computes the separation for the
    /// cell's RGB color from a zeroed starting guess, while any other
    /// requester waits for the result.
    fn ensure(&self, luz: &Luz, ri: usize, gi: usize, bi: usize) -> &[Float; MAX_COATS] {
        let index = (ri * LUT_DIM + gi) * LUT_DIM + bi;
        let cell = &self.cells[index];

        match cell
            .state
            .compare_exchange(UNFILLED, FILLING, Ordering::Acquire, Ordering::Acquire)
        {
            Ok(_) => {
                let rgb = [
                    ri as Float / LUT_DIM as Float,
                    gi as Float / LUT_DIM as Float,
                    bi as Float / LUT_DIM as Float,
                ];
                let mut levels = [0.0; MAX_COATS];
                let mut rng = cell_rng(luz.seed, index);
                separate(luz, &Target::Rgb(rgb), &mut levels, &mut rng);

                // SAFETY: this thread won the claim on the cell, making it
                // the only writer; no reader dereferences before observing
                // the filled state stored below.
                unsafe { *cell.levels.get() = levels };
                cell.state.store(FILLED, Ordering::Release);
            }
            Err(_) => {
                while cell.state.load(Ordering::Acquire) != FILLED {
                    std::thread::sleep(FILL_POLL);
                }
            }
        }

        // SAFETY: the cell is filled and will never be written again.
        unsafe { &*cell.levels.get() }
    }
}

/// Derive the per-cell PRNG.
///
/// Seeding by cell index makes each cell's separation deterministic no
/// matter which thread fills it first or in what order cells fill.
fn cell_rng(seed: u64, index: usize) -> SmallRng {
    SmallRng::seed_from_u64(seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)))
}

/// Split a channel value into a cell index and interpolation weight.
///
/// The index spans `LUT_DIM - 1` so that both channel extremes have cells
/// to interpolate between; it is clamped to leave room for the upper
/// neighbor.
fn indice(value: Float) -> (usize, Float) {
    let scaled = value * (LUT_DIM - 1) as Float;
    let index = (scaled.floor() as isize).clamp(0, LUT_DIM as isize - 2) as usize;
    (index, scaled - index as Float)
}

fn lerp_levels(
    a: &[Float; MAX_COATS],
    b: &[Float; MAX_COATS],
    delta: Float,
) -> [Float; MAX_COATS] {
    let mut result = [0.0; MAX_COATS];
    for (slot, (a, b)) in result.iter_mut().zip(a.iter().zip(b)) {
        *slot = a * (1.0 - delta) + b * delta;
    }
    result
}
