use std::cell::RefCell;

use approx::assert_relative_eq;
use image::{Rgba, Rgba32FImage};
use vr_aquarium::resources::{
    file_count,
    hdri::{decode_hdr, fit_to_limit},
    loader::{Progress, settle},
    parse_document,
};

#[test]
fn draco_compressed_documents_are_rejected() {
    let document = br#"{
        "asset": {"version": "2.0"},
        "extensionsUsed": ["KHR_draco_mesh_compression"],
        "extensionsRequired": ["KHR_draco_mesh_compression"]
    }"#;
    let err = parse_document(document).expect_err("Draco must be rejected");
    assert!(format!("{err:#}").contains("KHR_draco_mesh_compression"), "{err:#}");
}

#[test]
fn garbage_is_not_a_document() {
    assert!(parse_document(b"definitely not json").is_err());
}

#[test]
fn external_buffers_and_base_colour_images_count_as_files() {
    let document = br#"{
        "asset": {"version": "2.0"},
        "buffers": [{"uri": "shark.bin", "byteLength": 4}],
        "images": [{"uri": "skin.png"}, {"uri": "eyes.png"}],
        "textures": [{"source": 0}, {"source": 1}],
        "materials": [
            {"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}},
            {"pbrMetallicRoughness": {"baseColorTexture": {"index": 1}}}
        ]
    }"#;
    let gltf = parse_document(document).expect("valid document");
    assert_eq!(file_count(&gltf), 4);
}

#[test]
fn only_base_colour_images_count_as_files() {
    let document = br#"{
        "asset": {"version": "2.0"},
        "images": [{"uri": "skin.png"}, {"uri": "skin_normal.png"}],
        "textures": [{"source": 0}, {"source": 1}],
        "materials": [{
            "pbrMetallicRoughness": {"baseColorTexture": {"index": 0}},
            "normalTexture": {"index": 1}
        }]
    }"#;
    let gltf = parse_document(document).expect("valid document");
    assert_eq!(file_count(&gltf), 2);

    let normal_only = br#"{
        "asset": {"version": "2.0"},
        "images": [{"uri": "n.png"}],
        "textures": [{"source": 0}],
        "materials": [{"normalTexture": {"index": 0}}]
    }"#;
    let gltf = parse_document(normal_only).expect("valid document");
    assert_eq!(file_count(&gltf), 1);
}

#[test]
fn shared_base_colour_images_count_once() {
    let document = br#"{
        "asset": {"version": "2.0"},
        "images": [{"uri": "skin.png"}],
        "textures": [{"source": 0}, {"source": 0}],
        "materials": [
            {"pbrMetallicRoughness": {"baseColorTexture": {"index": 0}}},
            {"pbrMetallicRoughness": {"baseColorTexture": {"index": 1}}}
        ]
    }"#;
    let gltf = parse_document(document).expect("valid document");
    assert_eq!(file_count(&gltf), 2);
}

#[test]
fn progress_reports_percentage() {
    assert_relative_eq!(Progress { loaded: 1, total: 4 }.percent(), 25.0);
    assert_relative_eq!(Progress { loaded: 3, total: 3 }.percent(), 100.0);
    assert_relative_eq!(Progress { loaded: 0, total: 0 }.percent(), 100.0);
}

#[test]
fn settle_calls_exactly_one_callback() {
    let errors = RefCell::new(Vec::new());

    let loaded = settle(Ok(21), |v| v * 2, |e| errors.borrow_mut().push(e.to_string()));
    assert_eq!(loaded, Some(42));
    assert!(errors.borrow().is_empty());

    let failed: Option<i32> = settle(
        Err(anyhow::anyhow!("404 for models/shark.gltf")),
        |v: i32| v,
        |e| errors.borrow_mut().push(e.to_string()),
    );
    assert_eq!(failed, None);
    assert_eq!(*errors.borrow(), vec!["404 for models/shark.gltf".to_string()]);
}

#[test]
fn panoramas_shrink_to_the_texture_limit() {
    let img = Rgba32FImage::from_pixel(64, 32, Rgba([0.5, 1.0, 2.0, 1.0]));
    let fitted = fit_to_limit(img, 16);
    assert_eq!(fitted.dimensions(), (16, 8));
    let pixel = fitted.get_pixel(4, 4);
    assert_relative_eq!(pixel[2], 2.0, epsilon = 1e-3);
}

#[test]
fn panoramas_within_the_limit_are_kept() {
    let img = Rgba32FImage::from_pixel(8, 4, Rgba([1.0; 4]));
    assert_eq!(fit_to_limit(img.clone(), 8), img);
    assert_eq!(fit_to_limit(img.clone(), 0), img);
}

#[test]
fn flat_radiance_files_decode() {
    // Uncompressed scanlines of RGBE texels, each (128, 128, 128, 129) ~ 1.0.
    let mut bytes = b"#?RADIANCE\nFORMAT=32-bit_rle_rgbe\n\n-Y 2 +X 2\n".to_vec();
    for _ in 0..4 {
        bytes.extend_from_slice(&[128, 128, 128, 129]);
    }
    let img = decode_hdr(&bytes).expect("valid HDR");
    assert_eq!(img.dimensions(), (2, 2));
    for pixel in img.pixels() {
        assert_relative_eq!(pixel[0], 1.0, epsilon = 0.01);
        assert_relative_eq!(pixel[3], 1.0);
    }
}

#[test]
fn truncated_radiance_files_fail() {
    assert!(decode_hdr(b"#?RADIANCE\n").is_err());
}
