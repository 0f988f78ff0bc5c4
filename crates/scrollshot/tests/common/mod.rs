//! Shared fixtures for capture integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use scrollshot::ScrollContainer;
use scrollshot_render::{Color, DrawContext, Point, Rect, Size};

/// Color the recording container paints into every destination rect.
pub const CONTENT: Color = Color::GREEN;

/// A container that paints solid content and records every call.
#[derive(Debug)]
pub struct RecordingContainer {
    pub frame: Rect,
    pub offset: Point,
    pub content: Size,
    pub background: Option<Color>,
    /// Offset and destination of each render call, in order.
    pub renders: Vec<(Point, Rect)>,
    /// Every offset set through the trait.
    pub offsets: Vec<Point>,
    /// Every frame set through the trait.
    pub frames: Vec<Rect>,
    /// Answers for `is_layout_settled`; no signal when unset.
    pub settle_answers: Option<VecDeque<bool>>,
    pub layout_calls: usize,
}

impl RecordingContainer {
    pub fn new(viewport: Size, content: Size) -> Self {
        Self {
            frame: Rect::from_origin_size(Point::new(8.0, 16.0), viewport),
            offset: Point::ZERO,
            content,
            background: None,
            renders: Vec::new(),
            offsets: Vec::new(),
            frames: Vec::new(),
            settle_answers: None,
            layout_calls: 0,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Answer settle queries from `answers`, then report settled.
    pub fn with_settle_answers(mut self, answers: impl IntoIterator<Item = bool>) -> Self {
        self.settle_answers = Some(answers.into_iter().collect());
        self
    }

    pub fn render_offsets(&self) -> Vec<f32> {
        self.renders.iter().map(|(offset, _)| offset.y).collect()
    }

    pub fn render_frames_y(&self) -> Vec<f32> {
        self.renders.iter().map(|(_, dest)| dest.top()).collect()
    }
}

impl ScrollContainer for RecordingContainer {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frames.push(frame);
        self.frame = frame;
    }

    fn content_offset(&self) -> Point {
        self.offset
    }

    fn set_content_offset(&mut self, offset: Point) {
        self.offsets.push(offset);
        self.offset = offset;
    }

    fn content_size(&self) -> Size {
        self.content
    }

    fn background_color(&self) -> Option<Color> {
        self.background
    }

    fn render(&mut self, ctx: &mut DrawContext<'_>, dest: Rect) {
        self.renders.push((self.offset, dest));
        ctx.fill_rect_with(dest, CONTENT);
    }

    fn layout_if_needed(&mut self) {
        self.layout_calls += 1;
    }

    fn is_layout_settled(&mut self) -> Option<bool> {
        let answers = self.settle_answers.as_mut()?;
        Some(answers.pop_front().unwrap_or(true))
    }
}

/// Install a test log subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
