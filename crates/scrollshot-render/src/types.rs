//! Basic geometry and color types for capture.
//!
//! Geometry is expressed in container points (`f32`); one point maps to one
//! pixel of the output surface.

/// A point in 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// `(0, 0)`.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// A width and height, in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Zero size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Whether either side is zero or negative.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(f32, f32)> for Size {
    fn from((width, height): (f32, f32)) -> Self {
        Self { width, height }
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

/// An axis-aligned rectangle: a viewport, a page frame or a capture region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// Rectangle at `(x, y)`.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    /// Create a rectangle from an origin point and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    /// `left + width`.
    #[inline]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    /// `top + height`.
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.height
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Overlap of two rectangles, or `None` when they share no area.
    ///
    /// Used to clip a viewport window against the document or a page frame
    /// against the output surface.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// An RGBA color, stored premultiplied.
///
/// Image buffers hold straight alpha; [`to_rgba8`](Color::to_rgba8) converts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Color from premultiplied components in `0.0..=1.0`.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Color from straight (non-premultiplied) components.
    #[inline]
    pub fn from_rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            r: r * a,
            g: g * a,
            b: b * a,
            a,
        }
    }

    /// Color from straight 8-bit components.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Opaque color.
    #[inline]
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Opaque color from 8-bit components.
    #[inline]
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        let len = hex.len();

        if len != 6 && len != 8 {
            return None;
        }

        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        let a = if len == 8 {
            u8::from_str_radix(hex.get(6..8)?, 16).ok()?
        } else {
            255
        };

        Some(Self::from_rgba8(r, g, b, a))
    }

    /// Convert to non-premultiplied 8-bit RGBA, as stored in image buffers.
    pub fn to_rgba8(self) -> [u8; 4] {
        if self.a <= 0.0 {
            return [0, 0, 0, 0];
        }
        let channel = |v: f32| ((v / self.a).clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            channel(self.r),
            channel(self.g),
            channel(self.b),
            (self.a.clamp(0.0, 1.0) * 255.0).round() as u8,
        ]
    }

    // Common colors
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::from_rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);
    pub const RED: Self = Self::from_rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::from_rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::from_rgb(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::from_rgb(1.0, 1.0, 0.0);
    pub const GRAY: Self = Self::from_rgb(0.5, 0.5, 0.5);
    pub const LIGHT_GRAY: Self = Self::from_rgb(0.75, 0.75, 0.75);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_frame_edges() {
        let frame = Rect::new(0.0, 825.0, 320.0, 400.0);
        assert_eq!(frame.left(), 0.0);
        assert_eq!(frame.top(), 825.0);
        assert_eq!(frame.right(), 320.0);
        assert_eq!(frame.bottom(), 1225.0);
        assert!(!frame.is_empty());
        assert!(Rect::new(0.0, 0.0, 320.0, 0.0).is_empty());
    }

    #[test]
    fn test_window_clipped_to_document() {
        let document = Rect::from_origin_size(Point::ZERO, Size::from((320u32, 1000u32)));

        let tail = Rect::new(0.0, 800.0, 320.0, 400.0);
        assert_eq!(
            tail.intersect(&document),
            Some(Rect::new(0.0, 800.0, 320.0, 200.0))
        );

        let past_end = Rect::new(0.0, 1200.0, 320.0, 400.0);
        assert_eq!(past_end.intersect(&document), None);

        // Touching edges share no area.
        let touching = Rect::new(0.0, 1000.0, 320.0, 400.0);
        assert_eq!(touching.intersect(&document), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#0000ff"), Some(Color::BLUE));
        assert_eq!(Color::from_hex("ffffff"), Some(Color::WHITE));

        let half_green = Color::from_hex("#00FF0080").unwrap();
        assert!((half_green.g - 0.5).abs() < 0.01);
        assert!((half_green.a - 0.5).abs() < 0.01);

        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#zz0000"), None);
    }

    #[test]
    fn test_straight_alpha_bytes() {
        assert_eq!(Color::LIGHT_GRAY.to_rgba8(), [191, 191, 191, 255]);
        assert_eq!(Color::from_rgb8(12, 34, 56).to_rgba8(), [12, 34, 56, 255]);
        assert_eq!(Color::TRANSPARENT.to_rgba8(), [0, 0, 0, 0]);
        assert_eq!(
            Color::from_rgba8(255, 0, 0, 128).to_rgba8(),
            [255, 0, 0, 128]
        );
    }
}
