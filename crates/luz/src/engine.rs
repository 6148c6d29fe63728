use std::sync::atomic::{AtomicUsize, Ordering};

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::cie::{
    CIE_ILLUMINANT_D50, OBSERVER_X_1931, OBSERVER_Y_1931, OBSERVER_Z_1931, PRIMARY_BLUE,
    PRIMARY_GREEN, PRIMARY_RED,
};
use crate::config::{self, COVERAGE_LIMIT_FLOOR};
use crate::db::SpectrumDb;
use crate::lut::Lut;
use crate::separate::{separate, Target};
use crate::spectrum::xyz_to_rgb;
use crate::{Coat, Float, Spectrum, MAX_COATS};

/// The seed used by [`Luz::new`]. Construct with [`Luz::with_seed`] to pick
/// another one.
const DEFAULT_SEED: u64 = 0x6c757a;

/// The stochastic iteration count before any `iterations` directive.
const DEFAULT_ITERATIONS: u32 = 100;

/// The bounds that both diffusion radii are clamped into.
const DIFFUSION_MIN: Float = 0.03;
const DIFFUSION_MAX: Float = 100.0;

/// The spectral coat-mixing engine.
///
/// An engine owns the illuminant, the substrate, the standard observer, up
/// to sixteen coat definitions, a registry of named spectra, and the
/// separation cache. All of that is configured once, from a textual
/// configuration, and read-only afterward: conversions take `&self` and may run
/// from many threads at once, while reconfiguration and the proofing
/// setters require `&mut self`.
///
/// The inverse direction, [`Luz::rgb_to_coats`], lazily fills the 16³
/// lookup table; the first queries in a fresh engine pay for the separator
/// runs of the cells they touch, later queries interpolate for free.
pub struct Luz {
    pub(crate) db: SpectrumDb,
    pub(crate) illuminant: Spectrum,
    pub(crate) rev_y_scale: Float,
    pub(crate) substrate: Spectrum,
    pub(crate) observer_x: Spectrum,
    pub(crate) observer_y: Spectrum,
    pub(crate) observer_z: Spectrum,
    pub(crate) coats: [Coat; MAX_COATS],
    pub(crate) coat_count: usize,
    pub(crate) coverage_limit: Float,
    pub(crate) coverage_set: bool,
    pub(crate) iterations: u32,
    pub(crate) diffusion0: Float,
    pub(crate) diffusion1: Float,
    pub(crate) debug_width: i32,
    pub(crate) seed: u64,
    lut: Lut,
    separations: AtomicUsize,
    source: Option<String>,
}

impl Luz {
    /// Create a new engine from the given configuration text.
    pub fn new(config: &str) -> Self {
        Self::with_seed(config, DEFAULT_SEED)
    }

    /// Create a new engine with an explicit seed for the stochastic
    /// separation phase.
    ///
    /// Two engines built from the same configuration and seed separate
    /// identically, which keeps tests and render farms reproducible.
    pub fn with_seed(config: &str, seed: u64) -> Self {
        let mut luz = Self {
            db: SpectrumDb::default(),
            illuminant: Spectrum::flat(0.0),
            rev_y_scale: 0.0,
            substrate: Spectrum::flat(0.0),
            observer_x: Spectrum::flat(0.0),
            observer_y: Spectrum::flat(0.0),
            observer_z: Spectrum::flat(0.0),
            coats: std::array::from_fn(|_| Coat::default()),
            coat_count: 0,
            coverage_limit: 0.0,
            coverage_set: false,
            iterations: DEFAULT_ITERATIONS,
            diffusion0: 0.0,
            diffusion1: 0.0,
            debug_width: 0,
            seed,
            lut: Lut::new(),
            separations: AtomicUsize::new(0),
            source: None,
        };
        luz.reconfigure(config);
        luz
    }

    /// Apply a configuration.
    ///
    /// Reapplying the text the engine was last configured with is a cheap
    /// no-op that preserves all state, including the separation cache. Any
    /// other text resets the engine (builtin spectra, default tuning,
    /// empty cache) before parsing.
    pub fn reconfigure(&mut self, config: &str) {
        if self.source.as_deref() == Some(config) {
            return;
        }

        self.reset();
        self.source = Some(config.to_string());
        config::parse_config(self, config);

        if !self.coverage_set {
            self.coverage_limit = (self.coat_count as Float).max(COVERAGE_LIMIT_FLOOR);
        }
        self.diffusion0 = self.diffusion0.clamp(DIFFUSION_MIN, DIFFUSION_MAX);
        self.diffusion1 = self.diffusion1.clamp(DIFFUSION_MIN, DIFFUSION_MAX);
    }

    /// Restore the builtin configuration: the 1931 standard observer, D50
    /// daylight, an ideal white substrate, the `red`, `green`, and `blue`
    /// primaries, and default tuning.
    fn reset(&mut self) {
        self.db = SpectrumDb::default();
        self.db.set("red", PRIMARY_RED);
        self.db.set("green", PRIMARY_GREEN);
        self.db.set("blue", PRIMARY_BLUE);
        self.db.set("white", Spectrum::flat(1.0));

        self.observer_x = OBSERVER_X_1931;
        self.observer_y = OBSERVER_Y_1931;
        self.observer_z = OBSERVER_Z_1931;
        self.substrate = Spectrum::flat(1.0);
        self.set_spectrum("illuminant", CIE_ILLUMINANT_D50);

        self.coats = std::array::from_fn(|_| Coat::default());
        self.coat_count = 0;
        self.coverage_limit = 0.0;
        self.coverage_set = false;
        self.iterations = DEFAULT_ITERATIONS;
        self.diffusion0 = 0.0;
        self.diffusion1 = 0.0;
        self.debug_width = 0;
        self.lut = Lut::new();
        self.separations = AtomicUsize::new(0);
        self.source = None;
    }

    // ----------------------------------------------------------------------------------------------------------------
    // Named spectra

    /// Look up a spectrum by name.
    ///
    /// The names `illuminant`, `substrate`, `observer_x`, `observer_y`, and
    /// `observer_z` resolve to the engine's dedicated slots; any other name
    /// is looked up in the registry of named spectra.
    pub fn spectrum(&self, name: &str) -> Option<&Spectrum> {
        match name {
            "illuminant" => Some(&self.illuminant),
            "substrate" => Some(&self.substrate),
            "observer_x" => Some(&self.observer_x),
            "observer_y" => Some(&self.observer_y),
            "observer_z" => Some(&self.observer_z),
            _ => self.db.get(name),
        }
    }

    /// Store a spectrum under the given name.
    ///
    /// The dedicated names update the engine's slots, with `illuminant`
    /// also rescaling the luminance normalization; any other name
    /// lands in the registry. A full registry silently drops new names.
    pub fn set_spectrum(&mut self, name: &str, spectrum: Spectrum) {
        match name {
            "illuminant" => {
                self.illuminant = spectrum;
                self.rev_y_scale = 1.0 / spectrum.integrate(&self.observer_y);
            }
            "substrate" => self.substrate = spectrum,
            "observer_x" => self.observer_x = spectrum,
            "observer_y" => self.observer_y = spectrum,
            "observer_z" => self.observer_z = spectrum,
            _ => self.db.set(name, spectrum),
        }
    }

    /// Parse a spectrum literal: `rgb R G B`, a known name, or a numeric
    /// list `nm_start nm_gap nm_scale v0 v1 …`. Malformed literals yield
    /// the zero spectrum.
    pub fn parse_spectrum(&self, text: &str) -> Spectrum {
        config::parse_spectrum(self, text)
    }

    /// Synthesize a spectrum for the given RGB color as a weighted sum of
    /// the `red`, `green`, and `blue` primaries.
    ///
    /// Channel weights pass through a 2.2 power curve; negative channels
    /// are treated as zero.
    pub fn rgb_to_spectrum(&self, r: Float, g: Float, b: Float) -> Spectrum {
        let red = self.db.get("red").copied().unwrap_or_default();
        let green = self.db.get("green").copied().unwrap_or_default();
        let blue = self.db.get("blue").copied().unwrap_or_default();

        Spectrum::flat(0.0)
            .add_scaled(&red, r.max(0.0).powf(2.2))
            .add_scaled(&green, g.max(0.0).powf(2.2))
            .add_scaled(&blue, b.max(0.0).powf(2.2))
    }

    // ----------------------------------------------------------------------------------------------------------------
    // Forward evaluation

    /// Compose the coat stack at the given levels into the perceived
    /// spectrum: substrate, coats in declared order, then the illuminant.
    ///
    /// Levels beyond the declared coat count are ignored; missing levels
    /// read as zero.
    pub fn coats_to_spectrum(&self, levels: &[Float]) -> Spectrum {
        let mut spectrum = self.substrate;
        for (index, coat) in self.coats[..self.coat_count].iter().enumerate() {
            coat.apply(&mut spectrum, levels.get(index).copied().unwrap_or(0.0));
        }
        spectrum.scaled(&self.illuminant)
    }

    /// Evaluate the coat stack into tristimulus coordinates.
    pub fn coats_to_xyz(&self, levels: &[Float]) -> [Float; 3] {
        self.spectrum_to_xyz(&self.coats_to_spectrum(levels))
    }

    /// Evaluate the coat stack into linear RGB.
    pub fn coats_to_rgb(&self, levels: &[Float]) -> [Float; 3] {
        self.spectrum_to_rgb(&self.coats_to_spectrum(levels))
    }

    /// Integrate a radiance spectrum against the standard observer,
    /// normalized so that the illuminant itself has unit luminance.
    pub fn spectrum_to_xyz(&self, spectrum: &Spectrum) -> [Float; 3] {
        [
            spectrum.integrate(&self.observer_x) * self.rev_y_scale,
            spectrum.integrate(&self.observer_y) * self.rev_y_scale,
            spectrum.integrate(&self.observer_z) * self.rev_y_scale,
        ]
    }

    /// Convert a radiance spectrum to linear RGB.
    pub fn spectrum_to_rgb(&self, spectrum: &Spectrum) -> [Float; 3] {
        xyz_to_rgb(&self.spectrum_to_xyz(spectrum))
    }

    // ----------------------------------------------------------------------------------------------------------------
    // Inverse evaluation

    /// Separate an RGB color into coat levels, one per declared coat.
    ///
    /// Returns an empty vector when no coats are declared. See
    /// [`Luz::rgb_to_coats_into`] for the allocation-free variant.
    pub fn rgb_to_coats(&self, rgb: &[Float; 3]) -> Vec<Float> {
        let mut levels = [0.0; MAX_COATS];
        self.rgb_to_coats_into(rgb, &mut levels);
        levels[..self.coat_count].to_vec()
    }

    /// Separate an RGB color into the given coat level buffer.
    ///
    /// Levels come from the separation cache by trilinear interpolation,
    /// filling missing cells on demand; coats configured with two or more
    /// levels are quantized afterwards. Slots beyond the declared coat
    /// count are zeroed.
    pub fn rgb_to_coats_into(&self, rgb: &[Float; 3], levels: &mut [Float; MAX_COATS]) {
        levels.fill(0.0);
        if self.coat_count == 0 {
            return;
        }

        self.lut.lookup(self, rgb, levels);

        for (coat, level) in self.coats[..self.coat_count].iter().zip(levels.iter_mut()) {
            let steps = coat.levels;
            if steps > 1 {
                let quantized = ((*level * steps as Float) as i64).rem_euclid(steps as i64);
                *level = quantized as Float / (steps as Float - 1.0);
            }
        }
    }

    /// Separate a target spectrum into the given coat level buffer.
    ///
    /// Unlike [`Luz::rgb_to_coats`], this runs the separator directly,
    /// without cache or quantization, with the buffer as the starting guess.
    pub fn spectrum_to_coats(&self, target: &Spectrum, levels: &mut [Float; MAX_COATS]) {
        if self.coat_count == 0 {
            levels.fill(0.0);
            return;
        }
        let mut rng = SmallRng::seed_from_u64(self.seed);
        separate(self, &Target::Spectrum(target), levels, &mut rng);
    }

    // ----------------------------------------------------------------------------------------------------------------
    // Proofing accessors

    /// Get the number of declared coats.
    pub fn coat_count(&self) -> usize {
        self.coat_count
    }

    /// Override the number of coats in use.
    ///
    /// This allows proofing with a reduced stack without writing a new
    /// configuration; only the first `count` declared coats participate in
    /// conversions afterward.
    pub fn set_coat_count(&mut self, count: usize) {
        self.coat_count = count.min(MAX_COATS);
    }

    /// Access the coat definition at the given index.
    pub fn coat(&self, index: usize) -> Option<&Coat> {
        self.coats[..self.coat_count].get(index)
    }

    /// Get the coverage limit, the cap on the sum of all coat levels.
    pub fn coverage_limit(&self) -> Float {
        self.coverage_limit
    }

    /// Override the coverage limit. Values below 0.2 are raised to 0.2.
    pub fn set_coverage_limit(&mut self, limit: Float) {
        self.coverage_limit = limit.max(COVERAGE_LIMIT_FLOOR);
    }

    /// Get the seed for the stochastic separation phase.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the number of separator runs since the engine was configured.
    ///
    /// Diagnostic only: each cache cell is separated at most once, so the
    /// count exposes cache effectiveness and, in tests, the single-fill
    /// guarantee.
    pub fn separation_count(&self) -> usize {
        self.separations.load(Ordering::Relaxed)
    }

    pub(crate) fn note_separation(&self) {
        self.separations.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod test {
    use super::Luz;
    use crate::{Float, MAX_COATS};

    const CMY: &str = "coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\ncoat3=rgb 1 1 0\niterations=100\n";

    #[test]
    fn test_zero_levels_reproduce_substrate() {
        let luz = Luz::new(CMY);
        let spectrum = luz.coats_to_spectrum(&[0.0, 0.0, 0.0]);
        let expected = luz
            .spectrum("substrate")
            .expect("substrate is builtin")
            .scaled(luz.spectrum("illuminant").expect("illuminant is builtin"));
        assert_eq!(spectrum, expected);
    }

    #[test]
    fn test_white_substrate_is_white() {
        let luz = Luz::new(CMY);
        let [x, y, z] = luz.coats_to_xyz(&[0.0, 0.0, 0.0]);
        assert!((y - 1.0).abs() < 1e-6, "luminance {y}");
        assert!((x - 0.9642).abs() < 0.02, "x {x}");
        assert!((z - 0.8249).abs() < 0.04, "z {z}");

        let rgb = luz.coats_to_rgb(&[0.0, 0.0, 0.0]);
        for channel in rgb {
            assert!((channel - 1.0).abs() < 0.02, "channel {channel}");
        }
    }

    #[test]
    fn test_full_cyan_coat() {
        let luz = Luz::new(CMY);
        let [r, g, b] = luz.coats_to_rgb(&[1.0, 0.0, 0.0]);
        assert!(r > 0.0 && g > 0.0 && b > 0.0, "({r}, {g}, {b})");
        assert!(r < g, "({r}, {g}, {b})");
        assert!(r < b, "({r}, {g}, {b})");
    }

    #[test]
    fn test_white_separates_to_nearly_nothing() {
        let luz = Luz::new(CMY);
        let levels = luz.rgb_to_coats(&[1.0, 1.0, 1.0]);
        assert_eq!(levels.len(), 3);
        let coatsum: Float = levels.iter().sum();
        assert!(coatsum < 0.3, "coverage {coatsum}");
    }

    #[test]
    fn test_quantized_coat_snaps_to_steps() {
        let luz = Luz::new(&format!("{CMY}coat1.levels=2\n"));
        let levels = luz.rgb_to_coats(&[0.3, 0.3, 0.3]);
        assert!(
            levels[0] == 0.0 || levels[0] == 1.0,
            "level {} is not a step",
            levels[0]
        );
    }

    #[test]
    fn test_separation_is_reproducible_across_engines() {
        let first = Luz::with_seed(CMY, 99);
        let second = Luz::with_seed(CMY, 99);
        assert_eq!(
            first.rgb_to_coats(&[0.5, 0.2, 0.7]),
            second.rgb_to_coats(&[0.5, 0.2, 0.7]),
        );
    }

    #[test]
    fn test_reduced_stack_ignores_higher_coats() {
        let mut luz = Luz::new(CMY);
        luz.set_coat_count(2);
        assert_eq!(luz.coat_count(), 2);
        assert_eq!(
            luz.coats_to_rgb(&[0.3, 0.6, 0.0, 0.0]),
            luz.coats_to_rgb(&[0.3, 0.6]),
        );
        assert_eq!(
            luz.coats_to_rgb(&[0.3, 0.6, 0.9]),
            luz.coats_to_rgb(&[0.3, 0.6]),
        );
    }

    #[test]
    fn test_no_coats_no_separation() {
        let luz = Luz::new("");
        assert_eq!(luz.coat_count(), 0);
        assert!(luz.rgb_to_coats(&[0.5, 0.5, 0.5]).is_empty());
        assert_eq!(luz.separation_count(), 0);
    }

    #[test]
    fn test_spectrum_separation() {
        let luz = Luz::new(CMY);
        let target = luz.coats_to_spectrum(&[0.4, 0.1, 0.0]);

        let mut levels = [0.0; MAX_COATS];
        luz.spectrum_to_coats(&target, &mut levels);

        let actual = luz.coats_to_spectrum(&levels);
        let mut distance = 0.0;
        for (a, b) in target.bands().iter().zip(actual.bands()) {
            distance += (a - b) * (a - b);
        }
        assert!(distance < 1e-3, "distance {distance}");
    }

    #[test]
    fn test_reconfigure_same_source_is_noop() {
        let mut luz = Luz::new(CMY);
        luz.rgb_to_coats(&[0.5, 0.5, 0.5]);
        let fills = luz.separation_count();
        assert!(fills > 0);

        luz.reconfigure(CMY);
        assert_eq!(luz.separation_count(), fills);
        assert_eq!(luz.coat_count(), 3);
    }

    #[test]
    fn test_reconfigure_new_source_resets() {
        let mut luz = Luz::new(CMY);
        luz.rgb_to_coats(&[0.5, 0.5, 0.5]);
        assert!(luz.separation_count() > 0);

        luz.reconfigure("coat1=rgb 1 0 0\n");
        assert_eq!(luz.separation_count(), 0);
        assert_eq!(luz.coat_count(), 1);
        assert_eq!(luz.coverage_limit(), 1.0);
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let config = format!("{CMY}coat2.scale=0.8\ncoatlimit=2\nsubstrate=rgb 0.9 0.9 0.8\n");
        let first = Luz::new(&config);
        let second = Luz::new(&config);

        assert_eq!(first.coat_count(), second.coat_count());
        assert_eq!(first.coverage_limit(), second.coverage_limit());
        assert_eq!(first.spectrum("substrate"), second.spectrum("substrate"));
        assert_eq!(first.spectrum("coat1"), second.spectrum("coat1"));
        for levels in [[0.0, 0.0, 0.0], [0.5, 0.1, 0.9], [1.0, 1.0, 1.0]] {
            assert_eq!(first.coats_to_rgb(&levels), second.coats_to_rgb(&levels));
        }
    }

    #[test]
    fn test_coverage_limit_defaults_to_coat_count() {
        assert_eq!(Luz::new(CMY).coverage_limit(), 3.0);
        assert_eq!(Luz::new("").coverage_limit(), 0.2);
        assert_eq!(Luz::new("coat1=rgb 0 1 1\ncoatlimit=0.7\n").coverage_limit(), 0.7);
    }

    #[test]
    fn test_coverage_limit_setter_floors() {
        let mut luz = Luz::new(CMY);
        luz.set_coverage_limit(0.05);
        assert_eq!(luz.coverage_limit(), 0.2);
        luz.set_coverage_limit(1.4);
        assert_eq!(luz.coverage_limit(), 1.4);
    }

    #[test]
    fn test_opaqueness_stays_normalized() {
        let luz = Luz::new("coat1=rgb 1 0 1\ncoat1.black=rgb 1 1 1\n");
        let coat = luz.coat(0).expect("one coat is declared");
        for band in coat.opaqueness().bands() {
            assert!((0.0..=1.0).contains(band));
        }
    }

    #[test]
    fn test_paint_like_coat_via_opaqueness() {
        let luz = Luz::new("coat1=rgb 1 0 0\ncoat1.opaqueness=1\n");
        let coat = luz.coat(0).expect("one coat is declared");
        // on_black = on_white makes every band fully paint-like.
        for band in coat.opaqueness().bands() {
            assert!((band - 1.0).abs() < 1e-9);
        }
    }
}
