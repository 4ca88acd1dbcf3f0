//! Renderer adapter: the only surface that draws frames.

use crate::frame::Frame;

/// A drawing backend for point-light frames.
pub trait Renderer {
    fn clear(&mut self);
    /// Draw one point in screen coordinates (pixels, y down).
    fn draw_point(&mut self, x: f64, y: f64);
    fn present(&mut self);
}

/// What the viewport keeps at the center of the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    /// Follow the projected root, so locomotion stays on screen.
    Root,
    /// A fixed frame-space point.
    Fixed { x: f64, y: f64 },
}

/// Maps frame coordinates (meters, y up) to screen pixels (y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixels_per_unit: f64,
    pub anchor: Anchor,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixels_per_unit: f64) -> Self {
        Self {
            width,
            height,
            pixels_per_unit,
            anchor: Anchor::Root,
        }
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn to_screen(&self, frame: &Frame, point: [f64; 2]) -> (f64, f64) {
        let (ax, ay) = match self.anchor {
            Anchor::Root => (frame.root[0], frame.root[1]),
            Anchor::Fixed { x, y } => (x, y),
        };
        (
            f64::from(self.width) * 0.5 + (point[0] - ax) * self.pixels_per_unit,
            f64::from(self.height) * 0.5 - (point[1] - ay) * self.pixels_per_unit,
        )
    }
}

/// Clear, draw all 15 points in marker order, present.
pub fn draw_frame<R: Renderer + ?Sized>(renderer: &mut R, viewport: &Viewport, frame: &Frame) {
    renderer.clear();
    for point in &frame.points {
        let (x, y) = viewport.to_screen(frame, *point);
        renderer.draw_point(x, y);
    }
    renderer.present();
}

/// Captures presented point lists; useful for tests and offline export.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderer {
    current: Vec<(f64, f64)>,
    presented: Vec<Vec<(f64, f64)>>,
    clears: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn presented(&self) -> &[Vec<(f64, f64)>] {
        &self.presented
    }

    pub fn clears(&self) -> usize {
        self.clears
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.clears += 1;
        self.current.clear();
    }

    fn draw_point(&mut self, x: f64, y: f64) {
        self.current.push((x, y));
    }

    fn present(&mut self) {
        self.presented.push(std::mem::take(&mut self.current));
    }
}

/// Text-mode canvas: one character cell per pixel.
#[derive(Clone, Debug)]
pub struct AsciiCanvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
    output: String,
}

impl AsciiCanvas {
    pub const DOT: char = 'o';
    pub const BLANK: char = ' ';

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Self::BLANK; width * height],
            output: String::new(),
        }
    }

    /// Last presented picture, rows separated by newlines.
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Matching viewport for this canvas.
    pub fn viewport(&self, pixels_per_unit: f64) -> Viewport {
        Viewport::new(self.width as u32, self.height as u32, pixels_per_unit)
    }
}

impl Renderer for AsciiCanvas {
    fn clear(&mut self) {
        self.cells.fill(Self::BLANK);
    }

    fn draw_point(&mut self, x: f64, y: f64) {
        let (col, row) = (x.round(), y.round());
        // Points off the canvas are dropped.
        if col < 0.0 || row < 0.0 || col >= self.width as f64 || row >= self.height as f64 {
            return;
        }
        self.cells[row as usize * self.width + col as usize] = Self::DOT;
    }

    fn present(&mut self) {
        self.output = self
            .cells
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
    }
}
