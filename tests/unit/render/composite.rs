use super::*;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_composite").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn frame_pixel(index: u32, x: u32, y: u32) -> image::Rgba<u8> {
    image::Rgba([(index * 20 + 10) as u8, (x * 7) as u8, (y * 5) as u8, 255])
}

fn write_frame(dir: &Path, index: u32, w: u32, h: u32) -> PathBuf {
    let path = dir.join(format!("frame_{index:03}.png"));
    RgbaImage::from_fn(w, h, |x, y| frame_pixel(index, x, y))
        .save(&path)
        .unwrap();
    path
}

fn write_frames(dir: &Path, count: u32, w: u32, h: u32) -> Vec<PathBuf> {
    (0..count).map(|i| write_frame(dir, i, w, h)).collect()
}

#[test]
fn copy_extent_shrinks_to_the_source() {
    let cell = FrameSize::new(10, 10);
    let crop = CropRect::new(4, 2, 10, 10);
    assert_eq!(copy_extent(cell, FrameSize::new(20, 20), crop), (10, 10));
    assert_eq!(copy_extent(cell, FrameSize::new(8, 20), crop), (4, 10));
    assert_eq!(copy_extent(cell, FrameSize::new(3, 3), crop), (0, 1));
}

#[test]
fn blit_copies_region_and_clips() {
    let src = RgbaImage::from_fn(4, 4, |x, y| frame_pixel(1, x, y));
    let mut dst = RgbaImage::new(3, 3);
    blit_region(&mut dst, &src, (1, 1), (5, 5), (1, 1));

    assert_eq!(dst.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(*dst.get_pixel(1, 1), frame_pixel(1, 1, 1));
    assert_eq!(*dst.get_pixel(2, 2), frame_pixel(1, 2, 2));

    let before = dst.clone();
    blit_region(&mut dst, &src, (0, 0), (0, 3), (0, 0));
    assert_eq!(dst, before);
}

#[test]
fn empty_input_is_rejected() {
    let frames: Vec<PathBuf> = Vec::new();
    let err = build_sheet(&frames, &SheetConfig::default()).unwrap_err();
    assert!(matches!(err, SpriteError::InvalidInput(_)), "{err}");
}

#[test]
fn non_positive_columns_are_rejected() {
    let dir = scratch_dir("bad_columns");
    let frames = write_frames(&dir, 2, 4, 4);
    let config = SheetConfig {
        columns: 0,
        ..SheetConfig::default()
    };
    let err = build_sheet(&frames, &config).unwrap_err();
    assert!(matches!(err, SpriteError::InvalidInput(_)), "{err}");
}

#[test]
fn cells_hold_the_cropped_region_of_each_frame_in_order() {
    let dir = scratch_dir("cropped");
    let frames = write_frames(&dir, 5, 16, 12);
    let config = SheetConfig {
        columns: 2,
        rows: 0,
        crop: CropRect::new(3, 2, 8, 6),
        padding: 4,
        spacing: 2,
        ..SheetConfig::default()
    };

    let sheet = build_sheet(&frames, &config).unwrap();
    assert_eq!(sheet.crop, CropRect::new(3, 2, 8, 6));
    assert_eq!(sheet.image.dimensions(), (4 * 2 + 2 * 8 + 2, 4 * 2 + 3 * 6 + 2 * 2));

    for p in &sheet.plan.placements {
        for y in 0..6 {
            for x in 0..8 {
                assert_eq!(
                    *sheet.image.get_pixel(p.dest_x + x, p.dest_y + y),
                    frame_pixel(p.index as u32, 3 + x, 2 + y),
                    "frame {} at ({x},{y})",
                    p.index
                );
            }
        }
    }
    // Padding and the unused sixth cell stay transparent.
    assert_eq!(sheet.image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(sheet.image.get_pixel(4 + 8 + 2 + 1, 4 + 2 * 8 + 1).0, [0, 0, 0, 0]);
}

#[test]
fn sentinel_crop_uses_first_frame_size_for_every_cell() {
    let dir = scratch_dir("sentinel");
    let first = write_frame(&dir, 0, 10, 8);
    let big = write_frame(&dir, 1, 20, 20);
    let small = write_frame(&dir, 2, 4, 3);

    let config = SheetConfig {
        columns: 3,
        rows: 0,
        ..SheetConfig::default()
    };
    let sheet = build_sheet(&[first, big, small], &config).unwrap();
    assert_eq!(sheet.plan.cell_width, 10);
    assert_eq!(sheet.plan.cell_height, 8);
    assert_eq!(sheet.image.dimensions(), (30, 8));

    // Larger frame is cut down to the canonical cell.
    assert_eq!(*sheet.image.get_pixel(10 + 9, 7), frame_pixel(1, 9, 7));
    // Smaller frame fills only its own extent.
    assert_eq!(*sheet.image.get_pixel(20 + 3, 2), frame_pixel(2, 3, 2));
    assert_eq!(sheet.image.get_pixel(20 + 4, 2).0, [0, 0, 0, 0]);
    assert_eq!(sheet.image.get_pixel(20, 3).0, [0, 0, 0, 0]);
}

#[test]
fn frame_entirely_outside_the_crop_leaves_its_cell_empty() {
    let dir = scratch_dir("outside");
    let first = write_frame(&dir, 0, 16, 16);
    let tiny = write_frame(&dir, 1, 4, 4);
    let config = SheetConfig {
        columns: 2,
        crop: CropRect::new(8, 8, 8, 8),
        ..SheetConfig::default()
    };
    let sheet = build_sheet(&[first, tiny], &config).unwrap();
    assert!(
        sheet
            .image
            .enumerate_pixels()
            .filter(|(x, _, _)| *x >= 8)
            .all(|(_, _, p)| p.0 == [0, 0, 0, 0])
    );
}

#[test]
fn zero_area_crop_draws_nothing_inside_the_padded_grid() {
    let dir = scratch_dir("zero_area_crop");
    let frames = write_frames(&dir, 2, 16, 16);
    let config = SheetConfig {
        columns: 2,
        crop: CropRect::new(16, 0, 8, 8),
        padding: 2,
        spacing: 1,
        ..SheetConfig::default()
    };
    let sheet = build_sheet(&frames, &config).unwrap();
    assert_eq!(sheet.crop, CropRect::new(16, 0, 0, 8));
    assert_eq!(sheet.image.dimensions(), (2 * 2 + 1, 2 * 2 + 8));
    assert!(sheet.image.pixels().all(|p| p.0 == [0, 0, 0, 0]));

    let bytes = composite(&frames, &config).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (5, 12));
}

#[test]
fn zero_area_crop_without_padding_is_rejected() {
    let dir = scratch_dir("zero_area_bare");
    let frames = write_frames(&dir, 2, 16, 16);
    let config = SheetConfig {
        crop: CropRect::new(16, 0, 8, 8),
        ..SheetConfig::default()
    };
    let err = build_sheet(&frames, &config).unwrap_err();
    assert!(matches!(err, SpriteError::InvalidInput(_)), "{err}");
    assert!(err.to_string().contains("zero-area layout"), "{err}");
}

#[test]
fn frames_past_capacity_do_not_change_the_sheet() {
    let dir = scratch_dir("capacity");
    let frames = write_frames(&dir, 7, 6, 6);
    let config = SheetConfig {
        columns: 2,
        rows: 3,
        ..SheetConfig::default()
    };

    let seven = build_sheet(&frames, &config).unwrap();
    let six = build_sheet(&frames[..6], &config).unwrap();
    assert_eq!(seven.plan.dropped, 1);
    assert_eq!(seven.image.dimensions(), (12, 18));
    assert_eq!(seven.image, six.image);
}

#[test]
fn dropped_frames_are_not_decoded() {
    let dir = scratch_dir("dropped_broken");
    let mut frames = write_frames(&dir, 2, 4, 4);
    let broken = dir.join("zz_broken.png");
    std::fs::write(&broken, b"junk").unwrap();
    frames.push(broken);

    let config = SheetConfig {
        columns: 2,
        rows: 1,
        ..SheetConfig::default()
    };
    build_sheet(&frames, &config).unwrap();
}

#[test]
fn decode_failure_aborts_and_keeps_previous_output() {
    let dir = scratch_dir("fatal");
    let mut frames = write_frames(&dir, 3, 4, 4);
    let out = dir.join("out").join("sheet.png");

    export_sheet(&frames, &SheetConfig::default(), &out).unwrap();
    let previous = std::fs::read(&out).unwrap();

    let broken = dir.join("frame_001.png");
    std::fs::write(&broken, b"definitely not a png").unwrap();
    frames[1] = broken.clone();

    let err = export_sheet(&frames, &SheetConfig::default(), &out).unwrap_err();
    match err {
        SpriteError::Decode { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(std::fs::read(&out).unwrap(), previous);
}

#[test]
fn empty_export_writes_nothing() {
    let dir = scratch_dir("empty_export");
    let out = dir.join("sheet.png");
    let frames: Vec<PathBuf> = Vec::new();
    assert!(export_sheet(&frames, &SheetConfig::default(), &out).is_err());
    assert!(!out.exists());
}

#[test]
fn lossless_exports_round_trip_cell_pixels() {
    let dir = scratch_dir("round_trip");
    let frames = write_frames(&dir, 3, 9, 7);

    for format in [OutputFormat::Png, OutputFormat::Bmp] {
        let config = SheetConfig {
            columns: 2,
            rows: 0,
            crop: CropRect::new(1, 1, 6, 5),
            padding: 1,
            spacing: 3,
            output_format: format,
            ..SheetConfig::default()
        };
        let out = dir.join(format!("sheet.{}", format.extension()));
        let written = export_sheet(&frames, &config, &out).unwrap();
        assert_eq!(written, out);

        let decoded = image::open(&out).unwrap().to_rgba8();
        let sheet = build_sheet(&frames, &config).unwrap();
        assert_eq!(decoded.dimensions(), sheet.image.dimensions());
        for p in &sheet.plan.placements {
            for y in 0..5 {
                for x in 0..6 {
                    let got = decoded.get_pixel(p.dest_x + x, p.dest_y + y).0;
                    let want = frame_pixel(p.index as u32, 1 + x, 1 + y).0;
                    assert_eq!(got[..3], want[..3], "{format:?} frame {}", p.index);
                    if format == OutputFormat::Png {
                        assert_eq!(got[3], want[3]);
                    }
                }
            }
        }
    }
}

#[test]
fn jpeg_export_preserves_dimensions() {
    let dir = scratch_dir("jpeg");
    let frames = write_frames(&dir, 4, 8, 8);
    let config = SheetConfig {
        columns: 3,
        rows: 0,
        spacing: 1,
        output_format: OutputFormat::Jpg,
        ..SheetConfig::default()
    };
    let bytes = composite(&frames, &config).unwrap();
    assert_eq!(
        image::guess_format(&bytes).unwrap(),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (3 * 8 + 2, 2 * 8 + 1));
}

#[test]
fn parallel_decode_matches_sequential() {
    let dir = scratch_dir("parallel");
    let frames = write_frames(&dir, 11, 5, 5);
    let config = SheetConfig {
        columns: 4,
        rows: 0,
        spacing: 1,
        ..SheetConfig::default()
    };
    let threading = CompositeThreading {
        parallel: true,
        chunk_size: 3,
        threads: Some(2),
    };

    let seq = build_sheet(&frames, &config).unwrap();
    let par = build_sheet_with(&frames, &config, &threading).unwrap();
    assert_eq!(seq.image, par.image);
}

#[test]
fn parallel_reports_first_failing_frame_in_order() {
    let dir = scratch_dir("parallel_fail");
    let mut frames = write_frames(&dir, 6, 4, 4);
    for idx in [2usize, 4] {
        let bad = dir.join(format!("bad_{idx}.png"));
        std::fs::write(&bad, b"nope").unwrap();
        frames[idx] = bad;
    }
    let threading = CompositeThreading {
        parallel: true,
        chunk_size: 8,
        threads: Some(2),
    };
    let err = build_sheet_with(&frames, &SheetConfig::default(), &threading).unwrap_err();
    match err {
        SpriteError::Decode { path, .. } => assert_eq!(path, frames[2]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn zero_thread_pool_is_rejected() {
    let dir = scratch_dir("zero_threads");
    let frames = write_frames(&dir, 2, 4, 4);
    let threading = CompositeThreading {
        parallel: true,
        chunk_size: 4,
        threads: Some(0),
    };
    assert!(build_sheet_with(&frames, &SheetConfig::default(), &threading).is_err());
}
