//! Visual regression tests for the render context.
//!
//! These render into an offscreen target with readback enabled, then check
//! specific pixel locations against expected colors.

use futures::executor::block_on;
use rive_render_core::{
    Color, FlushDescriptor, FrameDescriptor, LoadAction, RenderContext, RenderContextOptions, RenderPaint, RenderPath, RiveRenderer,
};

const CANVAS_WIDTH: u32 = 200;
const CANVAS_HEIGHT: u32 = 200;

fn pixel_at(buffer: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let offset = ((y * width + x) * 4) as usize;
    [buffer[offset], buffer[offset + 1], buffer[offset + 2], buffer[offset + 3]]
}

fn assert_pixel(buffer: &[u8], width: u32, x: u32, y: u32, expected: [u8; 4], label: &str) {
    let got = pixel_at(buffer, width, x, y);
    assert_eq!(got, expected, "pixel mismatch at {label} ({x}, {y}): expected {expected:?}, got {got:?}");
}

fn new_headless_context() -> RenderContext<'static> {
    block_on(RenderContext::new_headless((CANVAS_WIDTH, CANVAS_HEIGHT), 1.0, RenderContextOptions::default()))
}

fn frame_descriptor(clear_color: Option<Color>) -> FrameDescriptor {
    FrameDescriptor {
        clear_color,
        load_action: LoadAction::Clear,
        logical_size: (CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32),
        scale_factor: 1.0,
    }
}

#[test]
fn empty_draw_queue_renders_without_crashing() {
    let mut context = new_headless_context();
    let target = context.create_offscreen_target(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();

    context.begin_frame(&frame_descriptor(Some(Color::TRANSPARENT))).unwrap();
    let pixels = context.flush(&target, FlushDescriptor { readback: true }).unwrap();
    context.clear_draw_queue();

    let pixels = pixels.expect("readback requested, pixels should be returned");
    assert_eq!(pixels.len(), (CANVAS_WIDTH * CANVAS_HEIGHT * 4) as usize);
}

#[test]
fn single_filled_rect_renders_expected_color() {
    let mut context = new_headless_context();
    let target = context.create_offscreen_target(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();

    let mut path = RenderPath::new();
    path.move_to((10.0, 10.0)).line_to((110.0, 10.0)).line_to((110.0, 110.0)).line_to((10.0, 110.0)).close();
    let paint = RenderPaint::fill(Color::rgb(200, 50, 50));

    context.begin_frame(&frame_descriptor(Some(Color::TRANSPARENT))).unwrap();
    {
        let mut renderer = RiveRenderer::new(&mut context);
        renderer.draw_path(&path, &paint);
    }
    let pixels = context.flush(&target, FlushDescriptor { readback: true }).unwrap().unwrap();
    context.clear_draw_queue();

    assert_pixel(&pixels, CANVAS_WIDTH, 55, 55, [200, 50, 50, 255], "center_of_rect");
    assert_pixel(&pixels, CANVAS_WIDTH, 5, 5, [0, 0, 0, 0], "outside_rect");
}

#[test]
fn nested_clip_path_limits_fill_to_intersection() {
    let mut context = new_headless_context();
    let target = context.create_offscreen_target(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();

    let mut clip = RenderPath::new();
    clip.move_to((0.0, 0.0)).line_to((60.0, 0.0)).line_to((60.0, 200.0)).line_to((0.0, 200.0)).close();

    let mut fill = RenderPath::new();
    fill.move_to((0.0, 0.0)).line_to((200.0, 0.0)).line_to((200.0, 200.0)).line_to((0.0, 200.0)).close();
    let paint = RenderPaint::fill(Color::rgb(20, 120, 220));

    context.begin_frame(&frame_descriptor(Some(Color::TRANSPARENT))).unwrap();
    {
        let mut renderer = RiveRenderer::new(&mut context);
        renderer.save();
        renderer.clip_path(&clip);
        renderer.draw_path(&fill, &paint);
        renderer.restore();
    }
    let pixels = context.flush(&target, FlushDescriptor { readback: true }).unwrap().unwrap();
    context.clear_draw_queue();

    assert_pixel(&pixels, CANVAS_WIDTH, 30, 100, [20, 120, 220, 255], "inside_clip");
    assert_pixel(&pixels, CANVAS_WIDTH, 150, 100, [0, 0, 0, 0], "clipped_out");
}

#[test]
fn preserve_render_target_keeps_previous_frame_contents() {
    let mut context = new_headless_context();
    let target = context.create_offscreen_target(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();

    let mut path = RenderPath::new();
    path.move_to((0.0, 0.0)).line_to((200.0, 0.0)).line_to((200.0, 200.0)).line_to((0.0, 200.0)).close();
    let yellow = RenderPaint::fill(Color::rgb(220, 220, 20));

    context.begin_frame(&frame_descriptor(Some(Color::TRANSPARENT))).unwrap();
    {
        let mut renderer = RiveRenderer::new(&mut context);
        renderer.draw_path(&path, &yellow);
    }
    context.flush(&target, FlushDescriptor { readback: false }).unwrap();
    context.clear_draw_queue();

    let preserved = FrameDescriptor {
        clear_color: None,
        load_action: LoadAction::PreserveRenderTarget,
        logical_size: (CANVAS_WIDTH as f32, CANVAS_HEIGHT as f32),
        scale_factor: 1.0,
    };
    context.begin_frame(&preserved).unwrap();
    let pixels = context.flush(&target, FlushDescriptor { readback: true }).unwrap().unwrap();
    context.clear_draw_queue();

    assert_pixel(&pixels, CANVAS_WIDTH, 100, 100, [220, 220, 20, 255], "frame_a_contents_survive_into_frame_b");
}

#[test]
fn consecutive_frames_reuse_context_resources() {
    let mut context = new_headless_context();
    let target = context.create_offscreen_target(CANVAS_WIDTH, CANVAS_HEIGHT).unwrap();

    let mut path = RenderPath::new();
    path.move_to((20.0, 20.0)).line_to((80.0, 20.0)).line_to((80.0, 80.0)).line_to((20.0, 80.0)).close();
    let paint = RenderPaint::fill(Color::rgb(10, 200, 10));

    for _ in 0..3 {
        context.begin_frame(&frame_descriptor(Some(Color::TRANSPARENT))).unwrap();
        {
            let mut renderer = RiveRenderer::new(&mut context);
            renderer.draw_path(&path, &paint);
        }
        let pixels = context.flush(&target, FlushDescriptor { readback: true }).unwrap().unwrap();
        context.clear_draw_queue();
        assert_pixel(&pixels, CANVAS_WIDTH, 50, 50, [10, 200, 10, 255], "center_each_frame");
    }
}
