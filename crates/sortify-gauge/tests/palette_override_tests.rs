//! Integration tests for palette loading.

use sortify_gauge::{ColorToken, GaugeError, Palette};

#[test]
fn partial_override_keeps_other_defaults() {
    let raw = r##"{
        "critical": {"solid": "#ff0000", "gradient": ["#ff4444", "#ff0000", "#aa0000"]}
    }"##;

    let palette = Palette::from_json_str(raw).expect("palette should load");
    assert_eq!(palette.swatch(ColorToken::Critical).solid, "#ff0000");
    assert_eq!(
        palette.swatch(ColorToken::Safe),
        Palette::default().swatch(ColorToken::Safe)
    );
}

#[test]
fn rejects_non_hex_colors() {
    let raw = r##"{
        "safe": {"solid": "green", "gradient": ["#28a745", "#4bd07e", "#7be0a3"]}
    }"##;

    let error = Palette::from_json_str(raw).expect_err("named colors should be rejected");
    assert!(matches!(
        error,
        GaugeError::InvalidColor {
            token: ColorToken::Safe,
            ..
        }
    ));
}

#[test]
fn rejects_unknown_tokens() {
    let raw = r##"{"danger": {"solid": "#ff0000", "gradient": ["#f00", "#f00", "#f00"]}}"##;
    assert!(matches!(
        Palette::from_json_str(raw),
        Err(GaugeError::PaletteDecode(_))
    ));
}
