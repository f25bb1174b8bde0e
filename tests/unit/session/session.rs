use std::sync::{Arc, Mutex};

use image::RgbaImage;

use super::*;

fn frames_dir(name: &str, count: u32, w: u32, h: u32) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_session").join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    for i in 0..count {
        RgbaImage::from_pixel(w, h, image::Rgba([i as u8, 0, 0, 255]))
            .save(dir.join(format!("f{i:02}.png")))
            .unwrap();
    }
    dir
}

fn recorder(session: &mut Session) -> Arc<Mutex<Vec<SessionEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    session.subscribe(move |e| sink.lock().unwrap().push(e.clone()));
    log
}

#[test]
fn playback_wraps_or_holds_at_the_end() {
    let mut p = Playback::new(12, true);
    assert_eq!(p.advance(3), Some(1));
    assert_eq!(p.advance(3), Some(2));
    assert_eq!(p.advance(3), Some(0));

    p.set_looping(false);
    p.advance(3);
    p.advance(3);
    assert_eq!(p.advance(3), Some(2));
    assert_eq!(p.advance(3), Some(2));
    assert_eq!(p.advance(0), None);
}

#[test]
fn playback_rate_clamps_and_sets_interval() {
    let p = Playback::new(0, true);
    assert_eq!(p.frame_rate(), 1);
    assert_eq!(p.interval(), std::time::Duration::from_secs(1));
    assert_eq!(
        Playback::new(4, true).interval(),
        std::time::Duration::from_millis(250)
    );
}

#[test]
fn stale_cursor_restarts_from_zero() {
    let mut p = Playback::default();
    for _ in 0..5 {
        p.advance(10);
    }
    assert_eq!(p.current(3), Some(0));
}

#[test]
fn sequencer_discards_out_of_order_results() {
    let mut seq = PreviewSequencer::new();
    let a = seq.begin();
    let b = seq.begin();
    assert!(a < b);
    assert!(seq.is_latest(b));
    assert!(!seq.is_latest(a));

    assert!(seq.accept(b));
    assert!(!seq.accept(a));
    assert!(!seq.accept(b));

    let c = seq.begin();
    assert!(seq.accept(c));
}

#[test]
fn loading_a_folder_resets_crop_and_suggests_layout() {
    let dir = frames_dir("load", 10, 20, 16);
    let mut session = Session::new();
    let events = recorder(&mut session);

    assert_eq!(session.load_folder(&dir).unwrap(), 10);
    assert_eq!(session.original_size(), FrameSize::new(20, 16));
    assert_eq!(session.config().crop, CropRect::new(0, 0, 20, 16));
    assert_eq!(session.config().columns, 4);
    assert_eq!(session.config().rows, 3);

    let events = events.lock().unwrap();
    assert_eq!(events[0], SessionEvent::FramesLoaded(10));
    assert!(events.contains(&SessionEvent::CropChanged(CropRect::new(0, 0, 20, 16))));
    assert!(events.contains(&SessionEvent::ConfigChanged));
}

#[test]
fn margins_drive_the_crop() {
    let dir = frames_dir("margins", 2, 100, 80);
    let mut session = Session::new();
    session.load_folder(&dir).unwrap();

    session.set_margins(Margins::new(5, 5, 10, 10));
    assert_eq!(session.config().crop, CropRect::new(10, 5, 80, 70));
    assert_eq!(session.cropped_size(), FrameSize::new(80, 70));

    session.reset_crop();
    assert_eq!(session.config().crop, CropRect::new(0, 0, 100, 80));
}

#[test]
fn margins_before_any_load_leave_crop_alone() {
    let mut session = Session::new();
    session.set_margins(Margins::new(1, 2, 3, 4));
    assert_eq!(session.config().crop, CropRect::full());
}

#[test]
fn setters_only_notify_on_change() {
    let mut session = Session::new();
    let events = recorder(&mut session);

    session.set_columns(8);
    session.set_padding(0);
    assert!(events.lock().unwrap().is_empty());

    session.set_columns(3);
    session.set_frame_rate(-2);
    session.set_looping(false);
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            SessionEvent::ConfigChanged,
            SessionEvent::FrameRateChanged(1),
            SessionEvent::LoopingChanged(false),
        ]
    );
    assert!(!session.playback().is_looping());
}

#[test]
fn unsubscribed_listeners_stop_receiving() {
    let mut session = Session::new();
    let log = Arc::new(Mutex::new(0usize));
    let sink = Arc::clone(&log);
    let id = session.subscribe(move |_| *sink.lock().unwrap() += 1);

    session.set_spacing(2);
    assert!(session.unsubscribe(id));
    assert!(!session.unsubscribe(id));
    session.set_spacing(4);
    assert_eq!(*log.lock().unwrap(), 1);
}

#[test]
fn set_config_rederives_margins() {
    let dir = frames_dir("set_config", 1, 50, 40);
    let mut session = Session::new();
    session.load_folder(&dir).unwrap();

    session.set_config(SheetConfig {
        crop: CropRect::new(5, 4, 30, 20),
        frame_rate: 24,
        ..SheetConfig::default()
    });
    assert_eq!(session.margins(), Margins::new(4, 16, 5, 15));
    assert_eq!(session.playback().frame_rate(), 24);
}

#[test]
fn reset_defaults_restores_full_crop() {
    let dir = frames_dir("reset", 3, 12, 12);
    let mut session = Session::new();
    session.load_folder(&dir).unwrap();
    session.set_margins(Margins::new(1, 1, 1, 1));
    session.set_spacing(3);

    session.reset_defaults();
    assert_eq!(session.config().spacing, 0);
    assert_eq!(session.config().columns, 8);
    assert_eq!(session.config().crop, CropRect::new(0, 0, 12, 12));
    assert_eq!(session.margins(), Margins::default());
}

#[test]
fn export_without_frames_is_invalid_input() {
    let session = Session::new();
    let out = PathBuf::from("target/unit_session/never.png");
    let err = session.export(&out).unwrap_err();
    assert!(matches!(err, SpriteError::InvalidInput(_)), "{err}");
    assert!(!out.exists());
}

#[test]
fn export_writes_the_configured_sheet() {
    let dir = frames_dir("export", 4, 8, 8);
    let mut session = Session::new();
    session.load_folder(&dir).unwrap();
    session.set_spacing(2);

    let out = dir.join("out").join("sheet.png");
    assert_eq!(session.export(&out).unwrap(), out);
    let sheet = image::open(&out).unwrap();
    assert_eq!((sheet.width(), sheet.height()), (18, 18));
}

#[test]
fn ticks_walk_the_frames_and_produce_previews() {
    let dir = frames_dir("ticks", 3, 6, 6);
    let mut session = Session::new();
    session.load_folder(&dir).unwrap();

    let first = session.preview_request().unwrap();
    assert!(first.frame.ends_with("f00.png"));
    let second = session.tick().unwrap();
    assert!(second.frame.ends_with("f01.png"));
    assert!(second.ticket > first.ticket);

    let png = second.render().unwrap();
    assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);

    assert!(session.accept_preview(second.ticket));
    assert!(!session.accept_preview(first.ticket));
}

#[test]
fn empty_session_has_no_preview() {
    let mut session = Session::new();
    assert!(session.preview_request().is_none());
    assert!(session.tick().is_none());
}
