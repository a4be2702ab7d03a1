use imageprep::crop::*;
use imageprep::display::{DisplayPreset, DisplaySpec, DisplayTransform};
use imageprep::zoom::{effective_sample_size, ZoomFactor};
use imageprep::PrepError;
use proptest::prelude::*;

fn unscaled(size: (u32, u32)) -> DisplayTransform {
    DisplayTransform::compute(size, DisplaySpec::Original)
}

fn rect(x: u32, y: u32, width: u32, height: u32) -> CropRectangle {
    CropRectangle {
        x,
        y,
        width,
        height,
    }
}

#[test]
fn click_in_corner_is_clamped_to_origin() {
    let original = (1000, 800);
    let target: CropTarget = CropPreset::Square512.into();
    let sample = effective_sample_size(target, ZoomFactor::DEFAULT);
    assert_eq!(sample, (512, 512));
    let resolved = resolve((0.0, 0.0), &unscaled(original), original, sample).unwrap();
    assert_eq!(resolved, rect(0, 0, 512, 512));
}

#[test]
fn oversized_sample_shrinks_to_image() {
    let original = (300, 300);
    let resolved = resolve((150.0, 150.0), &unscaled(original), original, (512, 512)).unwrap();
    assert_eq!(resolved, rect(0, 0, 300, 300));
}

#[test]
fn oversized_on_one_axis_only() {
    let original = (1000, 300);
    let resolved = resolve((500.0, 100.0), &unscaled(original), original, (512, 512)).unwrap();
    assert_eq!(resolved, rect(244, 0, 512, 300));
}

#[test]
fn sample_is_centred_on_click() {
    let original = (1000, 800);
    let resolved = resolve((500.0, 400.0), &unscaled(original), original, (512, 512)).unwrap();
    assert_eq!(resolved, rect(244, 144, 512, 512));
}

#[test]
fn click_near_far_edge_is_pushed_inside() {
    let original = (1000, 800);
    let resolved = resolve((999.0, 799.0), &unscaled(original), original, (512, 512)).unwrap();
    assert_eq!(resolved, rect(488, 288, 512, 512));
}

#[test]
fn click_is_mapped_through_display_scale() {
    let original = (4000, 3000);
    let transform = DisplayTransform::compute(original, DisplayPreset::Medium.spec());
    assert_eq!(transform.display_size, (800, 600));
    let resolved = resolve((100.0, 50.0), &transform, original, (256, 256)).unwrap();
    assert_eq!(resolved, rect(372, 122, 256, 256));
}

#[test]
fn display_centre_maps_to_image_centre() {
    let original = (4000, 3000);
    let transform = DisplayTransform::compute(original, DisplayPreset::Small.spec());
    let (dw, dh) = transform.display_size;
    let resolved = resolve(
        (dw as f64 / 2.0, dh as f64 / 2.0),
        &transform,
        original,
        (512, 512),
    )
    .unwrap();
    let centre_x = resolved.x as i64 + resolved.width as i64 / 2;
    let centre_y = resolved.y as i64 + resolved.height as i64 / 2;
    assert!((centre_x - 2000).abs() <= 1, "centre x was {centre_x}");
    assert!((centre_y - 1500).abs() <= 1, "centre y was {centre_y}");
}

#[test]
fn click_outside_preview_is_treated_as_origin() {
    let original = (1000, 800);
    let transform = unscaled(original);
    let outside = resolve((5000.0, -3.0), &transform, original, (100, 100)).unwrap();
    assert_eq!(outside, rect(0, 0, 100, 100));
    let on_edge = resolve((1000.0, 10.0), &transform, original, (100, 100)).unwrap();
    assert_eq!(on_edge, rect(0, 0, 100, 100));
}

#[test]
fn zero_sample_is_raised_to_one_pixel() {
    let original = (100, 100);
    let resolved = resolve((10.0, 20.0), &unscaled(original), original, (0, 0)).unwrap();
    assert_eq!(resolved, rect(10, 20, 1, 1));
}

#[test]
fn zero_area_image_is_invalid() {
    let transform = unscaled((1, 1));
    assert!(matches!(
        resolve((0.0, 0.0), &transform, (0, 800), (10, 10)),
        Err(PrepError::InvalidImage)
    ));
    assert!(matches!(
        resolve((0.0, 0.0), &transform, (800, 0), (10, 10)),
        Err(PrepError::InvalidImage)
    ));
}

#[test]
fn custom_target_requires_positive_dimensions() {
    assert!(matches!(
        CropTarget::custom(0, 512),
        Err(PrepError::InvalidDimensions { width: 0, height: 512 })
    ));
    assert!(CropTarget::custom(512, -4).is_err());
    let target = CropTarget::custom(640, 480).unwrap();
    assert_eq!(target.dimensions(), (640, 480));
    assert_eq!(target.to_string(), "640x480");
}

#[test]
fn custom_target_is_bounded_above() {
    let largest = MAX_TARGET_SIDE as i64;
    assert_eq!(
        CropTarget::custom(largest, largest).unwrap().dimensions(),
        (MAX_TARGET_SIDE, MAX_TARGET_SIDE)
    );
    assert!(matches!(
        CropTarget::custom(largest + 1, 1),
        Err(PrepError::InvalidDimensions { .. })
    ));
    assert!(CropTarget::custom(1, largest + 1).is_err());
    assert!(CropTarget::custom(u32::MAX as i64, 1).is_err());
    assert!(CropTarget::custom(100_000, 100_000).is_err());
}

#[test]
fn choice_resolves_presets_and_custom() {
    let preset = CropTarget::from_choice(CropChoice::Preset(CropPreset::Landscape768x512)).unwrap();
    assert_eq!(preset.dimensions(), (768, 512));
    let custom = CropTarget::from_choice(CropChoice::Custom { width: 33, height: 44 }).unwrap();
    assert_eq!(custom.dimensions(), (33, 44));
    assert!(CropTarget::from_choice(CropChoice::Custom { width: 33, height: 0 }).is_err());
    assert_eq!(CropTarget::default().dimensions(), (512, 512));
}

#[test]
fn preset_labels_are_dimensions() {
    let labels: Vec<String> = CropPreset::ALL.iter().map(|p| p.label()).collect();
    assert_eq!(
        labels,
        ["512x512", "768x768", "1024x1024", "2048x2048", "512x768", "768x512"]
    );
}

#[test]
fn fits_within_checks_every_edge() {
    assert!(rect(0, 0, 10, 10).fits_within((10, 10)));
    assert!(!rect(1, 0, 10, 10).fits_within((10, 10)));
    assert!(!rect(0, 0, 0, 10).fits_within((10, 10)));
}

fn display_strategy() -> impl Strategy<Value = DisplayPreset> {
    prop::sample::select(DisplayPreset::ALL.to_vec())
}

proptest! {
    /// The resolved rectangle always lies inside the original image.
    #[test]
    fn prop_crop_is_contained(
        width in 1u32..5000,
        height in 1u32..5000,
        target_w in 1i64..3000,
        target_h in 1i64..3000,
        zoom in 0.1f64..3.0,
        click_x in -100.0f64..6000.0,
        click_y in -100.0f64..6000.0,
        display in display_strategy(),
    ) {
        let original = (width, height);
        let transform = DisplayTransform::compute(original, display.spec());
        let target = CropTarget::custom(target_w, target_h).unwrap();
        let sample = effective_sample_size(target, ZoomFactor::new(zoom).unwrap());
        let resolved = resolve((click_x, click_y), &transform, original, sample).unwrap();

        prop_assert!(resolved.width > 0 && resolved.height > 0);
        prop_assert!(resolved.x + resolved.width <= width);
        prop_assert!(resolved.y + resolved.height <= height);
    }

    /// Same inputs, same rectangle.
    #[test]
    fn prop_resolve_is_idempotent(
        width in 1u32..3000,
        height in 1u32..3000,
        click_x in 0.0f64..3000.0,
        click_y in 0.0f64..3000.0,
        sample_w in 0u32..4000,
        sample_h in 0u32..4000,
    ) {
        let original = (width, height);
        let transform = DisplayTransform::compute(original, DisplayPreset::Medium.spec());
        let first = resolve((click_x, click_y), &transform, original, (sample_w, sample_h)).unwrap();
        let second = resolve((click_x, click_y), &transform, original, (sample_w, sample_h)).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Zooming in never enlarges the sampled region.
    #[test]
    fn prop_zoom_inversion(
        target_w in 1i64..4096,
        target_h in 1i64..4096,
        z1 in 0.1f64..3.0,
        z2 in 0.1f64..3.0,
    ) {
        let (low, high) = if z1 <= z2 { (z1, z2) } else { (z2, z1) };
        let target = CropTarget::custom(target_w, target_h).unwrap();
        let (lw, lh) = effective_sample_size(target, ZoomFactor::new(low).unwrap());
        let (hw, hh) = effective_sample_size(target, ZoomFactor::new(high).unwrap());
        prop_assert!(hw as u64 * hh as u64 <= lw as u64 * lh as u64);
    }
}
