//! Board-space geometry used for placing notes and hit-testing drops.

/// A point in board space (pixels, origin at the top left).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle in board space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Rect { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive on all four edges, so a release exactly on the border counts.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right() && p.y >= self.top && p.y <= self.bottom()
    }

    /// Clamp a top-left position so a box of `size` stays inside this rectangle.
    pub fn clamp_origin(&self, origin: Point, size: (f64, f64)) -> Point {
        let max_x = (self.right() - size.0).max(self.left);
        let max_y = (self.bottom() - size.1).max(self.top);
        Point {
            x: origin.x.clamp(self.left, max_x),
            y: origin.y.clamp(self.top, max_y),
        }
    }
}
