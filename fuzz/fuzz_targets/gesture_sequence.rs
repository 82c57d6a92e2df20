#![no_main]

use arbitrary::Arbitrary;
use image::{DynamicImage, ImageFormat, RgbaImage};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;
use votecard_crop::engine::{
    CropFrameSpec, GestureEvent, ImageSource, Point, SessionKey, SessionSpec, TransformEditor,
    MAX_SCALE, MIN_SCALE,
};
use votecard_crop::OutputPolicy;

#[derive(Arbitrary, Debug)]
enum EventSeed {
    Down(i16, i16),
    Move(i16, i16),
    Up,
    Touch(u8, i16, i16, i16, i16),
    TouchMove(u8, i16, i16, i16, i16),
    TouchEnd(bool, i16, i16),
    ZoomIn,
    ZoomOut,
    ZoomTo(f64),
    RotateLeft,
    RotateRight,
    Reset,
    Frame,
}

#[derive(Arbitrary, Debug)]
struct Input {
    width: u8,
    height: u8,
    target_width: u8,
    target_height: u8,
    events: Vec<EventSeed>,
}

fn touches(count: u8, ax: i16, ay: i16, bx: i16, by: i16) -> Vec<Point> {
    let points = [
        Point::new(ax as f64, ay as f64),
        Point::new(bx as f64, by as f64),
    ];
    points[..(count % 3) as usize].to_vec()
}

fn to_event(seed: &EventSeed) -> Option<GestureEvent> {
    let event = match *seed {
        EventSeed::Down(x, y) => GestureEvent::PointerDown(Point::new(x as f64, y as f64)),
        EventSeed::Move(x, y) => GestureEvent::PointerMove(Point::new(x as f64, y as f64)),
        EventSeed::Up => GestureEvent::PointerUp,
        EventSeed::Touch(n, ax, ay, bx, by) => GestureEvent::TouchStart(touches(n, ax, ay, bx, by)),
        EventSeed::TouchMove(n, ax, ay, bx, by) => {
            GestureEvent::TouchMove(touches(n, ax, ay, bx, by))
        }
        EventSeed::TouchEnd(one, x, y) => {
            GestureEvent::TouchEnd(touches(one as u8, x, y, 0, 0))
        }
        EventSeed::ZoomIn => GestureEvent::ZoomIn,
        EventSeed::ZoomOut => GestureEvent::ZoomOut,
        EventSeed::ZoomTo(scale) => GestureEvent::ZoomTo(scale),
        EventSeed::RotateLeft => GestureEvent::RotateLeft,
        EventSeed::RotateRight => GestureEvent::RotateRight,
        EventSeed::Reset => GestureEvent::Reset,
        EventSeed::Frame => return None,
    };
    Some(event)
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([x as u8, y as u8, (x ^ y) as u8, 255])
    });
    let mut buf = Vec::new();
    let _ = DynamicImage::ImageRgba8(img).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png);
    buf
}

fuzz_target!(|input: Input| {
    let width = input.width as u32 % 32 + 1;
    let height = input.height as u32 % 32 + 1;
    let target = (
        input.target_width as u32 % 48 + 1,
        input.target_height as u32 % 48 + 1,
    );

    let mut editor = TransformEditor::default();
    let spec = SessionSpec::new(
        SessionKey::Avatar,
        CropFrameSpec::new(40.0, 40.0),
        OutputPolicy::png(target.0, target.1),
    );
    if editor
        .open_blocking(ImageSource::from_bytes(png(width, height)), spec)
        .is_err()
    {
        return;
    }

    for seed in input.events.iter().take(256) {
        match to_event(seed) {
            Some(event) if event.is_move() => {
                let _ = editor.queue(event);
            }
            Some(event) => {
                let _ = editor.handle(&event);
            }
            None => {
                let _ = editor.flush_frame();
            }
        }
        if let Some(state) = editor.transform() {
            assert!(state.scale >= MIN_SCALE && state.scale <= MAX_SCALE);
        }
    }

    let out = editor.apply().expect("apply on a ready session");
    assert_eq!((out.width, out.height), target);
});
