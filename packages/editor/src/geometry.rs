use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use trellis_schema::NodeId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Screen-space bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left + self.right()) / 2.0,
            (self.top + self.bottom()) / 2.0,
        )
    }

    pub(crate) fn distance_squared_to(&self, point: Point) -> f64 {
        self.center().distance_squared(point)
    }
}

/// Where rendered nodes sit on the canvas.
///
/// Implemented by the rendering side. A node that is not rendered (hidden,
/// or scrolled out of the DOM) has no rect.
pub trait LayoutProbe {
    fn rect_of(&self, node_id: &str) -> Option<Rect>;
}

/// Fixed rect table, for headless drivers and tests
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    rects: HashMap<NodeId, Rect>,
}

impl StaticLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, node_id: impl Into<NodeId>, rect: Rect) -> Self {
        self.rects.insert(node_id.into(), rect);
        self
    }

    pub fn insert(&mut self, node_id: impl Into<NodeId>, rect: Rect) {
        self.rects.insert(node_id.into(), rect);
    }

    /// Stack `ids` top to bottom, each `height` tall, starting at `origin`
    pub fn column(ids: &[&str], origin: Point, width: f64, height: f64) -> Self {
        let mut layout = Self::new();
        for (i, id) in ids.iter().enumerate() {
            let top = origin.y + height * i as f64;
            layout.insert(*id, Rect::new(origin.x, top, width, height));
        }
        layout
    }

    /// Lay `ids` left to right, each `width` wide, starting at `origin`
    pub fn row(ids: &[&str], origin: Point, width: f64, height: f64) -> Self {
        let mut layout = Self::new();
        for (i, id) in ids.iter().enumerate() {
            let left = origin.x + width * i as f64;
            layout.insert(*id, Rect::new(left, origin.y, width, height));
        }
        layout
    }

    /// Row-major grid with `columns` cells per row
    pub fn grid(ids: &[&str], origin: Point, columns: usize, cell: f64) -> Self {
        let columns = columns.max(1);
        let mut layout = Self::new();
        for (i, id) in ids.iter().enumerate() {
            let left = origin.x + cell * (i % columns) as f64;
            let top = origin.y + cell * (i / columns) as f64;
            layout.insert(*id, Rect::new(left, top, cell, cell));
        }
        layout
    }
}

impl LayoutProbe for StaticLayout {
    fn rect_of(&self, node_id: &str) -> Option<Rect> {
        self.rects.get(node_id).copied()
    }
}
