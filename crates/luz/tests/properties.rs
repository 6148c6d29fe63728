//! Property-based tests for the engine invariants.

use luz::{Float, Luz, MAX_COATS, SPECTRUM_BANDS};
use proptest::prelude::*;

/// Format band values as a numeric spectrum literal covering all bands.
fn literal(bands: &[Float]) -> String {
    let mut text = String::from("390 10 1");
    for band in bands {
        text.push_str(&format!(" {band}"));
    }
    text
}

proptest! {
    #[test]
    fn prop_opaqueness_always_normalized(
        on_white in prop::collection::vec(0.0 as Float..2.0, SPECTRUM_BANDS),
        on_black in prop::collection::vec(0.0 as Float..2.0, SPECTRUM_BANDS),
    ) {
        let config = format!(
            "coat1={}\ncoat1.black={}\n",
            literal(&on_white),
            literal(&on_black),
        );
        let luz = Luz::new(&config);
        let coat = luz.coat(0).expect("coat1 is declared");

        for band in coat.opaqueness().bands() {
            prop_assert!((0.0..=1.0).contains(band), "opaqueness {band}");
        }
    }

    #[test]
    fn prop_zero_levels_reproduce_substrate(
        substrate in prop::collection::vec(0.0 as Float..1.0, SPECTRUM_BANDS),
    ) {
        let config = format!("substrate={}\ncoat1=rgb 0 1 1\n", literal(&substrate));
        let luz = Luz::new(&config);

        let spectrum = luz.coats_to_spectrum(&[0.0]);
        let substrate = luz.spectrum("substrate").expect("substrate is builtin");
        let illuminant = luz.spectrum("illuminant").expect("illuminant is builtin");
        prop_assert_eq!(spectrum, substrate.scaled(illuminant));
    }

    #[test]
    fn prop_padded_levels_do_not_change_proofs(
        levels in prop::collection::vec(0.0 as Float..1.0, 3),
    ) {
        let luz = Luz::new("coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\ncoat3=rgb 1 1 0\n");

        let mut padded = [0.0; MAX_COATS];
        padded[..3].copy_from_slice(&levels);
        prop_assert_eq!(luz.coats_to_rgb(&levels), luz.coats_to_rgb(&padded));
    }

    #[test]
    fn prop_parsing_never_panics(config in "[ -~\n]{0,160}") {
        let luz = Luz::new(&config);
        let _ = luz.coats_to_rgb(&[0.5, 0.5, 0.5]);
    }
}

proptest! {
    // Inverse lookups fill cache cells with full separator runs, so fewer
    // cases keep the suite quick.
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_quantized_levels_land_on_steps(
        steps in 2u32..6,
        rgb in prop::collection::vec(0.0 as Float..1.0, 3),
    ) {
        let config = format!("coat1=rgb 0 1 1\niterations=50\ncoat1.levels={steps}\n");
        let luz = Luz::new(&config);

        let levels = luz.rgb_to_coats(&[rgb[0], rgb[1], rgb[2]]);
        let on_step = (0..steps).any(|q| levels[0] == q as Float / (steps as Float - 1.0));
        prop_assert!(on_step, "level {} off the {steps}-step grid", levels[0]);
    }

    #[test]
    fn prop_corner_lookups_are_stable(
        ri in 0usize..15,
        gi in 0usize..15,
        bi in 0usize..15,
    ) {
        let luz = Luz::new("coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\niterations=50\n");
        let rgb = [ri as Float / 15.0, gi as Float / 15.0, bi as Float / 15.0];

        let first = luz.rgb_to_coats(&rgb);
        let fills = luz.separation_count();
        let second = luz.rgb_to_coats(&rgb);

        prop_assert_eq!(first, second);
        prop_assert_eq!(fills, luz.separation_count());
    }

    #[test]
    fn prop_separation_round_trips_perceptually(
        levels in prop::collection::vec(0.0 as Float..0.5, 3),
    ) {
        let luz = Luz::new("coat1=rgb 0 1 1\ncoat2=rgb 1 0 1\ncoat3=rgb 1 1 0\niterations=100\n");
        let target = luz.coats_to_rgb(&levels);

        let separated = luz.rgb_to_coats(&target);
        let actual = luz.coats_to_rgb(&separated);

        let distance = (target[0] - actual[0]) * (target[0] - actual[0])
            + (target[1] - actual[1]) * (target[1] - actual[1]) * 1.3
            + (target[2] - actual[2]) * (target[2] - actual[2]);
        prop_assert!(distance < 0.03, "round trip drifted by {distance}");
    }
}
