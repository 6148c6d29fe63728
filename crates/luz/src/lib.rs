//! # Luz
//!
//! Luz simulates the color of semi-transparent coats (inks, paints,
//! toners) stacked on a substrate and viewed under a configurable illuminant. It
//! converts both ways between device RGB and the per-coat amounts that
//! produce it:
//!
//!   * **Forward**, [`Luz::coats_to_rgb`] composes up to sixteen coats over
//!     the substrate band by band across thirty-one spectral bands, weighs
//!     the result by the illuminant and the standard observer, and lands in
//!     linear RGB. This direction is closed form and cheap.
//!   * **Inverse**, [`Luz::rgb_to_coats`] separates an RGB color into coat
//!     amounts. The mapping is underdetermined, so Luz searches: a coarse
//!     grid pass followed by stochastic refinement, with results cached in a
//!     lazily filled 16³ lookup table and blended by trilinear
//!     interpolation.
//!
//! An engine is configured from a small line-oriented text format naming
//! spectra for the illuminant, the substrate, and each coat:
//!
//! ```
//! use luz::Luz;
//!
//! let luz = Luz::new("coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\ncoat3=rgb 1 1 0\n");
//! assert_eq!(luz.coat_count(), 3);
//!
//! // A full layer of the first (cyan) coat reflects little red light.
//! let [r, g, b] = luz.coats_to_rgb(&[1.0, 0.0, 0.0]);
//! assert!(r < g && r < b);
//! ```
//!
//! ## Configuration
//!
//! Every line of a configuration is a `key = value` assignment; lines
//! without `=` are ignored and double as comments. Keys are either the
//! tuning knobs `coatlimit`, `iterations`, `diffusion`, and `debugwidth`,
//! or spectrum names. The names `illuminant` and `substrate` (and the three
//! `observer_*` curves) address the engine directly, `coat1` through
//! `coat16` declare coats, with `coatN.black`, `coatN.opaqueness`,
//! `coatN.scale`, `coatN.gamma`, and `coatN.levels` refining them, and any
//! other name defines a reusable spectrum. A spectrum value is one of:
//!
//!   * `rgb R G B`: a weighted sum of the builtin `red`, `green`, and
//!     `blue` primary reflectances;
//!   * a bare name: a previously defined or builtin spectrum;
//!   * `nm_start nm_gap nm_scale v0 v1 …`: samples resampled onto the
//!     engine's bands as a step function.
//!
//! Builtin data (the CIE 1931 2º standard observer, D50 daylight, an
//! ideal white substrate, and the three primaries) is installed before
//! the user configuration applies, so a minimal config only declares
//! coats. Malformed lines are skipped silently; the engine always comes up
//! in a usable state.
//!
//! The [`filter`] module adapts the engine to per-pixel sample streams for
//! image-processing hosts: proofing coat planes into RGB, separating RGB
//! into coat planes, or both back to back.
//!
//! Spectra, coat definitions, and tuning knobs are read-only once an engine
//! is constructed, so one engine may be shared freely across threads; the
//! lookup table fills itself on first use with one separator run per cell.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// The number of spectral bands.
pub const SPECTRUM_BANDS: usize = 31;

/// The wavelength of the first spectral band, in nanometers.
pub const SPECTRUM_START: usize = 390;

/// The wavelength gap between adjacent bands, in nanometers.
///
/// Together with [`SPECTRUM_START`] and [`SPECTRUM_BANDS`], the bands cover
/// 390–700 nm, which is most of the visual range.
pub const SPECTRUM_GAP: usize = 10;

/// The maximum number of coats an engine can stack.
pub const MAX_COATS: usize = 16;

mod cie;
mod coat;
mod config;
mod db;
mod engine;
pub mod filter;
mod lut;
mod separate;
mod spectrum;

pub use coat::Coat;
pub use engine::Luz;
pub use spectrum::{rgb_to_xyz, xyz_to_rgb, Spectrum};
