//! Axis-aligned bounding boxes in hOCR pixel coordinates.
//!
//! hOCR gives bounding boxes in XYXY order: the first two values are the
//! upper-left corner, the last two the lower-right corner, in pixels of the
//! source image.

use serde::{Deserialize, Serialize};

use crate::error::{HocrError, Result};

/// An immutable axis-aligned rectangle in source-image pixel coordinates.
///
/// Coordinates are XYXY: `(x0, y0)` is the upper-left corner, `(x1, y1)` the
/// lower-right corner. No ordering between the corners is enforced; a
/// malformed box with `x1 < x0` passes through and yields a negative
/// [`width`](BBox::width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    /// x-value of the upper-left corner
    pub x0: i64,
    /// y-value of the upper-left corner
    pub y0: i64,
    /// x-value of the lower-right corner
    pub x1: i64,
    /// y-value of the lower-right corner
    pub y1: i64,
}

impl BBox {
    /// Creates a new `BBox` from four corner coordinates in XYXY order.
    #[inline]
    #[must_use = "creates a new BBox with coordinates"]
    pub const fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Creates a `BBox` from a slice of numeric values.
    ///
    /// Accepts floating literals that are integral (`75.0`), matching hOCR
    /// producers that emit float-formatted pixel coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`HocrError::Validation`] if the slice does not hold exactly
    /// four values, or if any value does not round-trip through integer
    /// conversion without loss.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.len() != 4 {
            return Err(HocrError::Validation(format!(
                "length of argument is not 4 (got {})",
                values.len()
            )));
        }

        let mut coords = [0i64; 4];
        for (slot, &value) in coords.iter_mut().zip(values) {
            if !value.is_finite() || value.fract() != 0.0 {
                return Err(HocrError::Validation(format!(
                    "values are not integers (got {value})"
                )));
            }
            *slot = value as i64;
        }

        Ok(Self::new(coords[0], coords[1], coords[2], coords[3]))
    }

    /// Returns the width of the box in pixels (`x1 - x0`).
    ///
    /// Not clamped: a box with `x1 < x0` yields a negative width.
    #[inline]
    #[must_use = "returns the width of the bounding box"]
    pub const fn width(&self) -> i64 {
        self.x1 - self.x0
    }

    /// Returns the height of the box in pixels (`y1 - y0`).
    ///
    /// Not clamped: a box with `y1 < y0` yields a negative height.
    #[inline]
    #[must_use = "returns the height of the bounding box"]
    pub const fn height(&self) -> i64 {
        self.y1 - self.y0
    }

    /// Returns the smallest rectangle enclosing every box in `boxes`, or
    /// `None` when `boxes` is empty.
    ///
    /// Looks for the smallest `x0`/`y0` and the largest `x1`/`y1` over the
    /// input.
    #[must_use = "returns the enclosing bounding box"]
    pub fn max_bbox(boxes: &[BBox]) -> Option<BBox> {
        let first = boxes.first()?;

        let mut outer = *first;
        for b in &boxes[1..] {
            outer.x0 = outer.x0.min(b.x0);
            outer.y0 = outer.y0.min(b.y0);
            outer.x1 = outer.x1.max(b.x1);
            outer.y1 = outer.y1.max(b.y1);
        }

        Some(outer)
    }
}

impl std::fmt::Display for BBox {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BBox(({}, {}, {}, {}))", self.x0, self.y0, self.x1, self.y1)
    }
}
