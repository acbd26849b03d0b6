//! Integration tests for raster image loading.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use photo_id_adapters::{load_sidecar, save_pixels, sidecar_path, FsImageSource};
use photo_id_core::detection::DetectorKind;
use photo_id_core::domain::{standard_by_id, CheckId, CheckStatus};
use photo_id_core::{
    CropAdjustment, GenerationCounter, ImageInfo, ImageSource, Pipeline, RunRequest,
};
use photo_id_test_support::SyntheticImageBuilder;
use tempfile::TempDir;

fn write_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(8, 8, Rgb([120, 130, 140]))
        .save(&path)
        .expect("fixture written");
    path
}

fn load_one(path: PathBuf) -> ImageInfo {
    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);
    images.into_iter().next().unwrap().expect("should load")
}

#[test]
fn test_load_png() {
    let dir = TempDir::new().unwrap();
    let info = load_one(write_fixture(dir.path(), "test.png"));
    assert_eq!((info.width(), info.height()), (8, 8));
    assert_eq!(info.pixels.pixel(3, 3), [120, 130, 140, 255]);
    assert!(info.path.ends_with("test.png"));
}

#[test]
fn test_load_jpeg() {
    let dir = TempDir::new().unwrap();
    let info = load_one(write_fixture(dir.path(), "test.jpg"));
    assert_eq!((info.width(), info.height()), (8, 8));
    assert!(info.path.ends_with("test.jpg"));
}

#[test]
fn test_load_bmp() {
    let dir = TempDir::new().unwrap();
    let info = load_one(write_fixture(dir.path(), "test.bmp"));
    assert_eq!(info.pixels.pixel(0, 0), [120, 130, 140, 255]);
}

#[test]
fn test_load_tiff() {
    let dir = TempDir::new().unwrap();
    let info = load_one(write_fixture(dir.path(), "test.tiff"));
    assert_eq!((info.width(), info.height()), (8, 8));
}

#[test]
fn test_corrupt_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"not a png").unwrap();

    let source = FsImageSource::new(vec![path], false);
    let images: Vec<_> = source.images().collect();
    assert_eq!(images.len(), 1);
    assert!(images[0].is_err());
}

#[test]
fn test_load_directory_skips_other_files() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "a.png");
    write_fixture(dir.path(), "b.jpg");
    std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("a.faces.json"), "{}").unwrap();

    let source = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    assert_eq!(source.count_hint(), Some(2));
    let paths: Vec<String> = source.images().map(|r| r.unwrap().path).collect();
    assert!(paths[0].ends_with("a.png"));
    assert!(paths[1].ends_with("b.jpg"));
}

#[test]
fn test_recursive_flag() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path(), "top.png");
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    write_fixture(&nested, "inner.png");

    let flat = FsImageSource::new(vec![dir.path().to_path_buf()], false);
    let deep = FsImageSource::new(vec![dir.path().to_path_buf()], true);
    assert_eq!(flat.count_hint(), Some(1));
    assert_eq!(deep.count_hint(), Some(2));
}

#[test]
fn test_missing_path_yields_nothing() {
    let source = FsImageSource::new(vec![PathBuf::from("/definitely/not/here.png")], false);
    assert_eq!(source.images().count(), 0);
}

#[test]
fn test_portrait_with_sidecar_detects_one_face() {
    let dir = TempDir::new().unwrap();
    let portrait = SyntheticImageBuilder::portrait(600, 600, [255, 255, 255]);
    let path = dir.path().join("portrait.png");
    save_pixels(&portrait.image.pixels, &path).unwrap();
    std::fs::write(sidecar_path(&path), portrait.detection_json()).unwrap();

    let info = load_one(path.clone());
    let detection = load_sidecar(&path, DetectorKind::Landmark, info.width(), info.height())
        .unwrap()
        .expect("sidecar present");

    let request = RunRequest {
        standard: standard_by_id("us-passport").unwrap(),
        adjustment: CropAdjustment::default(),
        bg_removed: false,
        detection: Some(&detection),
        generation: GenerationCounter::new().next(),
        timestamp: "2024-01-01T00:00:00Z".into(),
    };
    let report = Pipeline::default().run(&info, &request);
    let compliance = report.compliance.expect("not blocked");
    assert_eq!(compliance.status(CheckId::Face), Some(CheckStatus::Pass));
    assert_eq!(compliance.status(CheckId::Background), Some(CheckStatus::Pass));
    assert!(report.crop.expect("crop present").is_within(600, 600));
}
