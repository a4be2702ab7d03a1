use std::fs;

use image::{ColorType, DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use imageprep::batch::*;
use imageprep::fs_utils::QUARANTINE_DIR;
use tempfile::tempdir;

mod common;
use common::{solid_image, write_image};

fn truncated_png(path: &std::path::Path) {
    write_image(path, &solid_image(32, 32, [5, 6, 7, 255]));
    let bytes = fs::read(path).unwrap();
    fs::write(path, &bytes[..bytes.len() / 2]).unwrap();
}

#[test]
fn scan_moves_corrupt_images_and_captions() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("sub")).unwrap();
    write_image(root.join("good.png"), &solid_image(8, 8, [1, 2, 3, 255]));
    fs::write(root.join("good.txt"), b"fine").unwrap();
    truncated_png(&root.join("bad.png"));
    fs::write(root.join("bad.txt"), b"caption").unwrap();
    fs::write(root.join("sub/also_bad.jpg"), b"garbage").unwrap();

    let quarantine = root.join(QUARANTINE_DIR);
    let report = scan_corrupt(root, &quarantine).unwrap();

    assert_eq!(report.processed, 3);
    assert_eq!(report.changed.len(), 2);
    assert!(report.failures.is_empty());
    assert!(root.join("good.png").exists());
    assert!(root.join("good.txt").exists());
    assert!(!root.join("bad.png").exists());
    assert!(!root.join("bad.txt").exists());
    assert!(!root.join("sub/also_bad.jpg").exists());
    assert!(quarantine.join("bad.png").exists());
    assert!(quarantine.join("bad.txt").exists());
    assert!(quarantine.join("also_bad.jpg").exists());
}

#[test]
fn rescan_ignores_quarantined_files() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("bad.png"), b"garbage").unwrap();
    let quarantine = root.join(QUARANTINE_DIR);

    scan_corrupt(root, &quarantine).unwrap();
    let again = scan_corrupt(root, &quarantine).unwrap();

    assert_eq!(again.processed, 0);
    assert!(again.changed.is_empty());
    assert_eq!(fs::read_dir(&quarantine).unwrap().count(), 1);
}

#[test]
fn rescan_matches_quarantine_spelled_differently() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("bad.png"), b"garbage").unwrap();
    let quarantine = root.join("sub").join("..").join(QUARANTINE_DIR);

    let first = scan_corrupt(root, &quarantine).unwrap();
    assert_eq!(first.changed.len(), 1);
    assert!(root.join(QUARANTINE_DIR).join("bad.png").exists());

    let again = scan_corrupt(root, &quarantine).unwrap();
    assert_eq!(again.processed, 0);
    assert!(again.changed.is_empty());
    assert!(root.join(QUARANTINE_DIR).join("bad.png").exists());
}

#[test]
fn quarantine_name_clash_gets_suffix() {
    let tmp = tempdir().unwrap();
    let root = tmp.path();
    let quarantine = root.join(QUARANTINE_DIR);
    fs::create_dir(&quarantine).unwrap();
    fs::write(quarantine.join("bad.png"), b"older").unwrap();
    fs::write(root.join("bad.png"), b"newer").unwrap();

    let report = scan_corrupt(root, &quarantine).unwrap();

    assert_eq!(report.changed, vec![quarantine.join("bad-1.png")]);
    assert_eq!(fs::read(quarantine.join("bad.png")).unwrap(), b"older");
}

#[test]
fn scan_of_clean_directory_changes_nothing() {
    let tmp = tempdir().unwrap();
    write_image(tmp.path().join("a.png"), &solid_image(2, 2, [0, 0, 0, 255]));
    let quarantine = tmp.path().join(QUARANTINE_DIR);
    let report = scan_corrupt(tmp.path(), &quarantine).unwrap();
    assert_eq!(report.summary(), "1 processed, 0 changed, 0 failed");
    assert!(!quarantine.exists());
}

#[test]
fn normalize_converts_non_rgb_images() {
    let tmp = tempdir().unwrap();
    let dir = tmp.path();
    let gray = dir.join("gray.png");
    let rgba = dir.join("rgba.png");
    let rgb = dir.join("rgb.png");
    DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 4, Luma([77])))
        .save(&gray)
        .unwrap();
    let mut transparent = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
    transparent.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(transparent).save(&rgba).unwrap();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])))
        .save(&rgb)
        .unwrap();
    let rgb_before = fs::read(&rgb).unwrap();

    let mut report = normalize_rgb(dir).unwrap();
    report.changed.sort();

    assert_eq!(report.processed, 3);
    assert_eq!(report.changed, vec![gray.clone(), rgba.clone()]);
    assert!(report.failures.is_empty());

    let gray_after = image::open(&gray).unwrap();
    assert_eq!(gray_after.color(), ColorType::Rgb8);
    assert_eq!(gray_after.to_rgb8().get_pixel(1, 1).0, [77, 77, 77]);

    let rgba_after = image::open(&rgba).unwrap();
    assert_eq!(rgba_after.color(), ColorType::Rgb8);
    let pixels = rgba_after.to_rgb8();
    assert_eq!(pixels.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(pixels.get_pixel(1, 0).0, [255, 0, 0]);

    assert_eq!(fs::read(&rgb).unwrap(), rgb_before);
}

#[test]
fn normalize_records_unreadable_files() {
    let tmp = tempdir().unwrap();
    fs::write(tmp.path().join("broken.png"), b"garbage").unwrap();
    write_image(tmp.path().join("ok.png"), &solid_image(2, 2, [9, 9, 9, 255]));

    let report = normalize_rgb(tmp.path()).unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(report.changed, vec![tmp.path().join("ok.png")]);
    assert_eq!(report.failures.len(), 1);
    assert!(tmp.path().join("broken.png").exists());
}

#[test]
fn normalize_does_not_recurse() {
    let tmp = tempdir().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    let nested = tmp.path().join("nested/gray.png");
    DynamicImage::ImageLuma8(GrayImage::new(2, 2)).save(&nested).unwrap();

    let report = normalize_rgb(tmp.path()).unwrap();

    assert_eq!(report.processed, 0);
    assert_eq!(image::open(&nested).unwrap().color(), ColorType::L8);
}

#[test]
fn composite_blends_towards_white() {
    let mut rgba = RgbaImage::new(3, 1);
    rgba.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    rgba.put_pixel(1, 0, Rgba([0, 0, 0, 255]));
    rgba.put_pixel(2, 0, Rgba([0, 100, 200, 128]));
    let rgb = composite_on_white(&rgba);
    assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    assert_eq!(rgb.get_pixel(1, 0).0, [0, 0, 0]);
    assert_eq!(rgb.get_pixel(2, 0).0, [127, 177, 227]);
}

#[test]
fn flatten_leaves_rgb_alone() {
    let rgb = DynamicImage::ImageRgb8(RgbImage::new(1, 1));
    assert!(flatten_to_rgb(&rgb).is_none());
    let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(1, 1, Luma([12])));
    assert_eq!(flatten_to_rgb(&gray).unwrap().get_pixel(0, 0).0, [12, 12, 12]);
}
