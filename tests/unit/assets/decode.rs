use std::{io::Cursor, path::PathBuf};

use super::*;

fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_decode").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn decode_bytes_keeps_straight_alpha() {
    let src = RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let decoded = decode_frame_bytes(&png_bytes(&src), Path::new("mem.png")).unwrap();
    assert_eq!(decoded.dimensions(), (1, 1));
    assert_eq!(decoded.as_raw().as_slice(), &[100, 50, 200, 128]);
}

#[test]
fn decode_file_and_probe_agree_on_size() {
    let dir = scratch_dir("probe");
    let path = dir.join("f.png");
    RgbaImage::from_pixel(7, 3, image::Rgba([1, 2, 3, 255]))
        .save(&path)
        .unwrap();

    let img = decode_frame(&path).unwrap();
    assert_eq!(frame_size(&img), FrameSize::new(7, 3));
    assert_eq!(probe_frame_size(&path).unwrap(), FrameSize::new(7, 3));
}

#[test]
fn garbage_bytes_report_the_frame_path() {
    let dir = scratch_dir("garbage");
    let path = dir.join("broken.png");
    std::fs::write(&path, b"not an image at all").unwrap();

    let err = decode_frame(&path).unwrap_err();
    match err {
        SpriteError::Decode { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_file_is_a_decode_error() {
    let err = decode_frame(Path::new("target/unit_decode/nope.png")).unwrap_err();
    assert!(matches!(err, SpriteError::Decode { .. }), "{err}");
}
