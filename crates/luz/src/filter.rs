//! Per-pixel adapters for image-processing hosts.
//!
//! A host drives the engine over streams of float samples in one of three
//! modes: [`Mode::Proof`] renders coat-level planes into RGBA,
//! [`Mode::Separate`] turns RGBA into up to four coat planes, and
//! [`Mode::SeparateProof`] chains both for softproofing. The engine itself
//! is shared read-only, so hosts may process tiles from several threads
//! with a single engine.
//!
//! Inputs and outputs are flat slices of interleaved samples. The number of
//! processed pixels is the smaller of what the two slices hold; trailing
//! partial samples are ignored.

use crate::{Float, Luz, MAX_COATS};

/// How the engine processes a pixel stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Interpret input samples as coat levels and render them to RGBA.
    Proof,
    /// Separate RGBA input into up to four coat levels per pixel.
    Separate,
    /// Separate RGBA input and immediately render the coats back to RGB.
    #[default]
    SeparateProof,
}

impl Mode {
    /// Get the number of output components per pixel.
    pub const fn output_components(&self) -> usize {
        match *self {
            Mode::Proof | Mode::Separate => 4,
            Mode::SeparateProof => 3,
        }
    }
}

/// Process a stream of pixels.
///
/// `input_components` is the stride of `input`; the output stride follows
/// from the mode via [`Mode::output_components`]. `coat_no` selects a
/// single coat when positive (a grayscale plane in separate mode, a solo
/// proof in separate-proof mode) and is clamped to the declared coat
/// count; zero processes all coats.
pub fn process(
    luz: &Luz,
    mode: Mode,
    coat_no: usize,
    input: &[Float],
    input_components: usize,
    output: &mut [Float],
) {
    let coat_no = coat_no.min(luz.coat_count());
    match mode {
        Mode::Proof => proof(luz, input, input_components, output),
        Mode::Separate => separate(luz, coat_no, input, input_components, output),
        Mode::SeparateProof => separate_proof(luz, coat_no, input, input_components, output),
    }
}

fn proof(luz: &Luz, input: &[Float], input_components: usize, output: &mut [Float]) {
    if input_components == 0 {
        return;
    }
    // Hosts commonly deliver at most four planes; a wider stack proofs its
    // first four coats, a narrower one exactly the declared count.
    let sampled = if luz.coat_count() > 3 { 4 } else { luz.coat_count() };
    let sampled = sampled.min(input_components);

    for (pixel, out) in input
        .chunks_exact(input_components)
        .zip(output.chunks_exact_mut(4))
    {
        let rgb = luz.coats_to_rgb(&pixel[..sampled]);
        out[..3].copy_from_slice(&rgb);
        out[3] = 1.0;
    }
}

fn separate(
    luz: &Luz,
    coat_no: usize,
    input: &[Float],
    input_components: usize,
    output: &mut [Float],
) {
    let coat_count = luz.coat_count();
    if coat_count == 0 || input_components < 3 {
        output.fill(0.0);
        return;
    }

    let mut levels = [0.0; MAX_COATS];
    for (pixel, out) in input
        .chunks_exact(input_components)
        .zip(output.chunks_exact_mut(4))
    {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        luz.rgb_to_coats_into(&rgb, &mut levels);

        if coat_no == 0 {
            out.fill(0.0);
            out[..coat_count.min(4)].copy_from_slice(&levels[..coat_count.min(4)]);
            if coat_count < 4 {
                out[3] = 1.0;
            }
        } else {
            let level = levels[coat_no - 1];
            out[0] = level;
            out[1] = level;
            out[2] = level;
            out[3] = 1.0;
        }
    }
}

fn separate_proof(
    luz: &Luz,
    coat_no: usize,
    input: &[Float],
    input_components: usize,
    output: &mut [Float],
) {
    if input_components < 3 {
        output.fill(0.0);
        return;
    }

    let mut levels = [0.0; MAX_COATS];
    for (pixel, out) in input
        .chunks_exact(input_components)
        .zip(output.chunks_exact_mut(3))
    {
        let rgb = [pixel[0], pixel[1], pixel[2]];
        luz.rgb_to_coats_into(&rgb, &mut levels);

        if coat_no != 0 {
            for (index, level) in levels.iter_mut().enumerate() {
                if index != coat_no - 1 {
                    *level = 0.0;
                }
            }
        }

        let proofed = luz.coats_to_rgb(&levels);
        out.copy_from_slice(&proofed);
    }
}
