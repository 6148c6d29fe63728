//! The textual configuration format.
//!
//! Configurations are newline-separated `key = value` assignments. Lines
//! without `=` are ignored, which doubles as the comment syntax; so are
//! malformed values, since configurations are author-edited and the engine
//! prefers forward progress over diagnostics. Keys name tuning knobs
//! (`coatlimit`, `iterations`, `diffusion`, `debugwidth`), coats
//! (`coat1`…`coat16` with `.black`, `.opaqueness`, `.scale`, `.gamma`,
//! `.levels` suffixes), or spectra, including the dedicated `illuminant` and
//! `substrate` slots. Values for spectrum keys use one of three literal
//! forms: `rgb R G B`, the name of a previously defined spectrum, or a
//! numeric list `nm_start nm_gap nm_scale v0 v1 …` that is resampled onto
//! the engine's bands as a step function.

use crate::{Float, Luz, Spectrum, MAX_COATS, SPECTRUM_BANDS, SPECTRUM_GAP, SPECTRUM_START};

/// The smallest permitted coverage limit.
pub(crate) const COVERAGE_LIMIT_FLOOR: Float = 0.2;

/// The number of values a numeric spectrum literal may hold.
const LITERAL_CAPACITY: usize = 100;

/// Apply the configuration text to the engine.
pub(crate) fn parse_config(luz: &mut Luz, text: &str) {
    for line in text.lines() {
        parse_line(luz, line);
    }
}

fn parse_line(luz: &mut Luz, line: &str) {
    let Some(separator) = line.find('=') else {
        return;
    };
    let key = line[..separator].trim();
    let value = line[separator + 1..]
        .trim_start_matches(['=', ' '])
        .trim();

    match key {
        "coatlimit" => {
            luz.coverage_limit = parse_scalar(value).max(COVERAGE_LIMIT_FLOOR);
            luz.coverage_set = true;
            return;
        }
        "debugwidth" => {
            luz.debug_width = parse_scalar(value) as i32;
            return;
        }
        "iterations" => {
            luz.iterations = parse_scalar(value).max(0.0) as u32;
            return;
        }
        "diffusion" => {
            let radius = parse_scalar(value);
            luz.diffusion0 = radius;
            luz.diffusion1 = radius;
            return;
        }
        _ => {}
    }

    let spectrum = parse_spectrum(luz, value);
    luz.set_spectrum(key, spectrum);

    let Some((index, suffix)) = coat_key(key) else {
        return;
    };
    let coat = &mut luz.coats[index];
    match suffix {
        "" => {
            coat.on_white = spectrum;
            coat.on_black = Spectrum::flat(0.0);
            coat.recompute_opaqueness();
            luz.coat_count = luz.coat_count.max(index + 1);
        }
        ".black" => {
            coat.on_black = spectrum;
            coat.recompute_opaqueness();
            luz.coat_count = luz.coat_count.max(index + 1);
        }
        ".opaqueness" => {
            let opaqueness = parse_scalar(value);
            for band in 0..SPECTRUM_BANDS {
                coat.on_black[band] = coat.on_white[band] * opaqueness;
            }
            coat.recompute_opaqueness();
        }
        ".levels" => coat.levels = parse_scalar(value).max(0.0) as u32,
        ".gamma" => coat.trc_gamma = parse_scalar(value),
        ".scale" => coat.scale = parse_scalar(value),
        _ => {}
    }
}

/// Split a `coatN` or `coatN.field` key into a coat index and field suffix.
fn coat_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("coat")?;
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || rest.starts_with('0') {
        return None;
    }
    let number: usize = rest[..digits].parse().ok()?;
    if !(1..=MAX_COATS).contains(&number) {
        return None;
    }
    Some((number - 1, &rest[digits..]))
}

/// Parse a spectrum literal.
///
/// The three forms are tried in order: an `rgb R G B` weighted sum of the
/// builtin primaries, the name of a known spectrum, and a numeric list
/// `nm_start nm_gap nm_scale v0 v1 …`. Anything else yields the zero
/// spectrum.
pub(crate) fn parse_spectrum(luz: &Luz, text: &str) -> Spectrum {
    let spectrum = parse_spectrum_literal(luz, text);
    // Parsed spectra must never carry NaN or infinities into the engine.
    if spectrum.is_finite() {
        spectrum
    } else {
        Spectrum::flat(0.0)
    }
}

fn parse_spectrum_literal(luz: &Luz, text: &str) -> Spectrum {
    let text = text.trim();
    let Some(key) = text.split_whitespace().next() else {
        return Spectrum::flat(0.0);
    };

    if key == "rgb" {
        let mut channels = [0.0; 3];
        for (channel, token) in channels.iter_mut().zip(text.split_whitespace().skip(1)) {
            *channel = token.parse().unwrap_or(0.0);
        }
        return luz.rgb_to_spectrum(channels[0], channels[1], channels[2]);
    }

    if let Some(named) = luz.spectrum(key) {
        return *named;
    }

    resample_literal(text)
}

/// Resample a numeric list literal onto the engine bands.
///
/// Each sample overwrites every band from its own index to the last one, so
/// that the final spectrum is a step function over the listed wavelengths;
/// the wavelength one gap past the last sample zeroes the tail. Samples
/// whose wavelength falls outside the band range are skipped.
fn resample_literal(text: &str) -> Spectrum {
    let mut spectrum = Spectrum::flat(0.0);
    let numbers: Vec<Float> = text
        .split_whitespace()
        .map_while(|token| token.parse().ok())
        .take(LITERAL_CAPACITY)
        .collect();
    if numbers.len() <= 3 {
        return spectrum;
    }

    let nm_gap = numbers[1];
    let nm_scale = numbers[2];
    let mut nm = numbers[0];
    for value in &numbers[3..] {
        if let Some(band) = band_index(nm) {
            for index in band..SPECTRUM_BANDS {
                spectrum[index] = value * nm_scale;
            }
        }
        nm += nm_gap;
    }
    if let Some(band) = band_index(nm) {
        for index in band..SPECTRUM_BANDS {
            spectrum[index] = 0.0;
        }
    }
    spectrum
}

/// Map a wavelength to its band index, truncating toward zero.
#[inline]
fn band_index(nm: Float) -> Option<usize> {
    let band = ((nm - SPECTRUM_START as Float) / SPECTRUM_GAP as Float) as isize;
    (0..SPECTRUM_BANDS as isize)
        .contains(&band)
        .then_some(band as usize)
}

/// Parse the leading number of a scalar value, defaulting to zero.
fn parse_scalar(text: &str) -> Float {
    text.split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod test {
    use super::{coat_key, parse_scalar};
    use crate::{Luz, Spectrum};

    #[test]
    fn test_coat_keys() {
        assert_eq!(coat_key("coat1"), Some((0, "")));
        assert_eq!(coat_key("coat16.black"), Some((15, ".black")));
        assert_eq!(coat_key("coat7.levels"), Some((6, ".levels")));
        assert_eq!(coat_key("coat0"), None);
        assert_eq!(coat_key("coat17"), None);
        assert_eq!(coat_key("coat01"), None);
        assert_eq!(coat_key("coat"), None);
        assert_eq!(coat_key("coating"), None);
        assert_eq!(coat_key("substrate"), None);
    }

    #[test]
    fn test_scalars() {
        assert_eq!(parse_scalar("2.5"), 2.5);
        assert_eq!(parse_scalar("  3 trailing words"), 3.0);
        assert_eq!(parse_scalar("nonsense"), 0.0);
        assert_eq!(parse_scalar(""), 0.0);
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let luz = Luz::new("a comment, since it has no equals sign\ncoat1=rgb 1 0 0\n");
        assert_eq!(luz.coat_count(), 1);
    }

    #[test]
    fn test_whitespace_trimming() {
        let luz = Luz::new("  coat2   =   rgb 0 1 0  \n");
        assert_eq!(luz.coat_count(), 2);
        assert!(luz.spectrum("coat2").is_some());
    }

    #[test]
    fn test_rgb_literal_matches_builtin_primary() {
        let luz = Luz::new("");
        let red = luz.parse_spectrum("rgb 1 0 0");
        assert_eq!(Some(&red), luz.spectrum("red"));
    }

    #[test]
    fn test_named_literal() {
        let luz = Luz::new("pond = rgb 0.1 0.4 0.4\nsubstrate = pond\n");
        assert!(luz.spectrum("pond").is_some());
        assert_eq!(luz.spectrum("pond"), luz.spectrum("substrate"));
    }

    #[test]
    fn test_numeric_literal_step_resampling() {
        let luz = Luz::new("");
        let spectrum = luz.parse_spectrum("390 20 1.0 0.5 0.25");
        // 390 nm lands on band 0, 410 nm on band 2; the trailing wavelength
        // 430 nm (band 4) zeroes the rest.
        assert_eq!(spectrum[0], 0.5);
        assert_eq!(spectrum[1], 0.5);
        assert_eq!(spectrum[2], 0.25);
        assert_eq!(spectrum[3], 0.25);
        assert_eq!(spectrum[4], 0.0);
        assert_eq!(spectrum[30], 0.0);
    }

    #[test]
    fn test_numeric_literal_scaling() {
        let luz = Luz::new("");
        let spectrum = luz.parse_spectrum("390 10 0.01 50 25");
        assert!((spectrum[0] - 0.5).abs() < 1e-9);
        assert!((spectrum[1] - 0.25).abs() < 1e-9);
        assert_eq!(spectrum[2], 0.0);
    }

    #[test]
    fn test_numeric_literal_below_range() {
        let luz = Luz::new("");
        // All samples sit below 390 nm, so nothing lands in any band.
        let spectrum = luz.parse_spectrum("200 10 1 0 0.5 1.0");
        assert_eq!(spectrum, Spectrum::flat(0.0));
    }

    #[test]
    fn test_numeric_literal_needs_four_numbers() {
        let luz = Luz::new("");
        assert_eq!(luz.parse_spectrum("390 10 1"), Spectrum::flat(0.0));
        assert_eq!(luz.parse_spectrum("gibberish"), Spectrum::flat(0.0));
    }

    #[test]
    fn test_coat_lines_also_name_spectra() {
        // Spectrum assignments register their key in the registry even when
        // the key also configures a coat.
        let luz = Luz::new("coat1=rgb 0 1 1\n");
        assert!(luz.spectrum("coat1").is_some());
    }

    #[test]
    fn test_knobs() {
        let luz = Luz::new("coatlimit=1.5\niterations=250\ndiffusion=0.5\ndebugwidth=25\n");
        assert_eq!(luz.coverage_limit(), 1.5);
        assert_eq!(luz.iterations, 250);
        assert_eq!(luz.diffusion0, 0.5);
        assert_eq!(luz.diffusion1, 0.5);
        assert_eq!(luz.debug_width, 25);
    }

    #[test]
    fn test_coverage_limit_floor() {
        let luz = Luz::new("coatlimit=0.05\n");
        assert_eq!(luz.coverage_limit(), 0.2);
    }

    #[test]
    fn test_diffusion_clamping() {
        let luz = Luz::new("diffusion=0.0001\n");
        assert_eq!(luz.diffusion0, 0.03);
        let luz = Luz::new("diffusion=1000\n");
        assert_eq!(luz.diffusion1, 100.0);
    }
}
