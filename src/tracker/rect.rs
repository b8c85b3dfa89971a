//! Bounding boxes and overlap measures.
//!
//! Boxes are stored as TLWH (top-left x, top-left y, width, height) in pixel
//! space. Two other layouts appear at the edges of the tracker:
//! - TLBR: (x_min, y_min, x_max, y_max), used for reporting.
//! - XYAH: (center x, center y, width / height, height), the Kalman measurement space.

/// Axis-aligned bounding box in TLWH form.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build from (x_min, y_min, x_max, y_max).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Build from (center x, center y, aspect ratio, height).
    #[inline]
    pub fn from_xyah(cx: f32, cy: f32, aspect_ratio: f32, height: f32) -> Self {
        let width = aspect_ratio * height;
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    #[inline]
    pub fn to_tlwh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Measurement-space form. A zero height yields a zero aspect ratio.
    #[inline]
    pub fn to_xyah(&self) -> [f32; 4] {
        let (cx, cy) = self.center();
        let aspect_ratio = if self.height > 0.0 {
            self.width / self.height
        } else {
            0.0
        };
        [cx, cy, aspect_ratio, self.height]
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// True when the box has no positive extent along some axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// True when the box lies entirely outside the frame `[0, width] x [0, height]`.
    pub fn is_outside_frame(&self, frame_width: f32, frame_height: f32) -> bool {
        let [x1, y1, x2, y2] = self.to_tlbr();
        x2 <= 0.0 || y2 <= 0.0 || x1 >= frame_width || y1 >= frame_height
    }

    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let [ax1, ay1, ax2, ay2] = self.to_tlbr();
        let [bx1, by1, bx2, by2] = other.to_tlbr();

        let inter_width = (ax2.min(bx2) - ax1.max(bx1)).max(0.0);
        let inter_height = (ay2.min(by2) - ay1.max(by1)).max(0.0);
        inter_width * inter_height
    }

    /// Intersection over union. Disjoint or degenerate boxes give 0.
    pub fn iou(&self, other: &Rect) -> f32 {
        if self.is_degenerate() || other.is_degenerate() {
            return 0.0;
        }

        let intersection = self.intersection_area(other);
        if intersection <= 0.0 {
            return 0.0;
        }

        intersection / (self.area() + other.area() - intersection)
    }
}
