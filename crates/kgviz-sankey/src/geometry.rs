//! Axis-aligned rectangles and the bounding-rect reduction

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Axis-aligned box in layout coordinates
///
/// A rect with `x0 > x1` or `y0 > y1` is empty; [`Rect::EMPTY`] is the
/// canonical empty rect and the identity of [`Rect::merge`].
///
/// Serializes as `{"x0": .., "x1": .., "y0": .., "y1": ..}`. Any empty rect
/// serializes as `null`, which reads back as [`Rect::EMPTY`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x0: f64,
    /// Right edge
    pub x1: f64,
    /// Top edge
    pub y0: f64,
    /// Bottom edge
    pub y1: f64,
}

impl Rect {
    /// Inverted sentinel: `(+inf, -inf, +inf, -inf)`
    pub const EMPTY: Self = Self {
        x0: f64::INFINITY,
        x1: f64::NEG_INFINITY,
        y0: f64::INFINITY,
        y1: f64::NEG_INFINITY,
    };

    /// Create a rect from its edges
    #[inline]
    #[must_use]
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    /// Smallest rect containing both points
    #[must_use]
    pub fn from_points(a: (f64, f64), b: (f64, f64)) -> Self {
        Self {
            x0: a.0.min(b.0),
            x1: a.0.max(b.0),
            y0: a.1.min(b.1),
            y1: a.1.max(b.1),
        }
    }

    /// Check if this rect encloses nothing
    #[inline]
    #[must_use]
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn is_empty(&self) -> bool {
        // Negated comparisons so NaN edges also count as empty.
        !(self.x0 <= self.x1) || !(self.y0 <= self.y1)
    }

    /// Width, or 0 for an empty rect
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x1 - self.x0
        }
    }

    /// Height, or 0 for an empty rect
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y1 - self.y0
        }
    }

    /// Center point, `None` for an empty rect
    #[must_use]
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        Some(((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0))
    }

    /// Smallest rect containing both rects
    #[inline]
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            x1: self.x1.max(other.x1),
            y0: self.y0.min(other.y0),
            y1: self.y1.max(other.y1),
        }
    }

    /// Check if the point lies inside (edges included)
    #[inline]
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x0 <= x && x <= self.x1 && self.y0 <= y && y <= self.y1
    }

    /// Check if the two rects overlap (touching edges count)
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    /// Grow the rect by `margin` on every side
    ///
    /// An empty rect stays empty.
    #[must_use]
    pub fn padded(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            x0: self.x0 - margin,
            x1: self.x1 + margin,
            y0: self.y0 - margin,
            y1: self.y1 + margin,
        }
    }

    /// Grow the rect vertically by `margin` on top and bottom
    #[must_use]
    pub fn padded_y(&self, margin: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self {
            y0: self.y0 - margin,
            y1: self.y1 + margin,
            ..*self
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Anything that occupies an axis-aligned region
pub trait HasExtent {
    /// Bounding rect of this item
    fn extent(&self) -> Rect;
}

impl HasExtent for Rect {
    fn extent(&self) -> Rect {
        *self
    }
}

impl<T: HasExtent + ?Sized> HasExtent for &T {
    fn extent(&self) -> Rect {
        (**self).extent()
    }
}

/// Minimal rect enclosing every item
///
/// Folds from [`Rect::EMPTY`], so an empty input returns the inverted
/// sentinel. Callers must check [`Rect::is_empty`] before using the result.
pub fn bounding_rect<I>(items: I) -> Rect
where
    I: IntoIterator,
    I::Item: HasExtent,
{
    items
        .into_iter()
        .fold(Rect::EMPTY, |acc, item| acc.merge(&item.extent()))
}

#[derive(Serialize, Deserialize)]
struct Edges {
    x0: f64,
    x1: f64,
    y0: f64,
    y1: f64,
}

impl Serialize for Rect {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_empty() {
            return serializer.serialize_none();
        }
        let Self { x0, x1, y0, y1 } = *self;
        if ![x0, x1, y0, y1].into_iter().all(f64::is_finite) {
            return Err(serde::ser::Error::custom(format!(
                "rect edge is not finite: ({x0}, {x1}, {y0}, {y1})"
            )));
        }
        serializer.serialize_some(&Edges { x0, x1, y0, y1 })
    }
}

impl<'de> Deserialize<'de> for Rect {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<Edges>::deserialize(deserializer)?
            .map_or(Self::EMPTY, |e| Self::new(e.x0, e.x1, e.y0, e.y1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_returns_sentinel() {
        let rect = bounding_rect(Vec::<Rect>::new());
        assert_eq!(rect.x0, f64::INFINITY);
        assert_eq!(rect.x1, f64::NEG_INFINITY);
        assert_eq!(rect.y0, f64::INFINITY);
        assert_eq!(rect.y1, f64::NEG_INFINITY);
        assert!(rect.is_empty());
    }

    #[test]
    fn two_rects() {
        let rect = bounding_rect([Rect::new(0.0, 2.0, 0.0, 3.0), Rect::new(-1.0, 1.0, 5.0, 6.0)]);
        assert_eq!(rect, Rect::new(-1.0, 2.0, 0.0, 6.0));
    }

    #[test]
    fn bounding_rect_over_references() {
        let rects = vec![Rect::new(1.0, 2.0, 1.0, 2.0), Rect::new(3.0, 4.0, -1.0, 0.0)];
        let rect = bounding_rect(&rects);
        assert_eq!(rect, Rect::new(1.0, 4.0, -1.0, 2.0));
    }

    #[test]
    fn empty_is_merge_identity() {
        let r = Rect::new(1.0, 5.0, 2.0, 4.0);
        assert_eq!(Rect::EMPTY.merge(&r), r);
        assert_eq!(r.merge(&Rect::EMPTY), r);
    }

    #[test]
    fn dimensions() {
        let r = Rect::new(1.0, 5.0, 2.0, 4.0);
        assert_eq!(r.width(), 4.0);
        assert_eq!(r.height(), 2.0);
        assert_eq!(r.center(), Some((3.0, 3.0)));
        assert_eq!(Rect::EMPTY.width(), 0.0);
        assert_eq!(Rect::EMPTY.center(), None);
    }

    #[test]
    fn degenerate_rect_is_not_empty() {
        let point = Rect::from_points((2.0, 2.0), (2.0, 2.0));
        assert!(!point.is_empty());
        assert!(point.contains(2.0, 2.0));
    }

    #[test]
    fn nan_rect_is_empty() {
        assert!(Rect::new(f64::NAN, 1.0, 0.0, 1.0).is_empty());
    }

    #[test]
    fn contains_and_intersects() {
        let r = Rect::new(0.0, 10.0, 0.0, 10.0);
        assert!(r.contains(0.0, 10.0));
        assert!(!r.contains(10.5, 5.0));

        assert!(r.intersects(&Rect::new(10.0, 12.0, 5.0, 6.0)));
        assert!(!r.intersects(&Rect::new(11.0, 12.0, 5.0, 6.0)));
        assert!(!r.intersects(&Rect::EMPTY));
    }

    #[test]
    fn padded_keeps_empty() {
        assert!(Rect::EMPTY.padded(5.0).is_empty());
        assert_eq!(
            Rect::new(0.0, 1.0, 0.0, 1.0).padded(1.0),
            Rect::new(-1.0, 2.0, -1.0, 2.0)
        );
    }

    #[test]
    fn empty_rect_survives_json() {
        let json = serde_json::to_string(&Rect::EMPTY).unwrap();
        assert_eq!(json, "null");
        let back: Rect = serde_json::from_str(&json).unwrap();
        assert!(back.is_empty());
        assert_eq!(back, Rect::EMPTY);

        let inverted: Rect = serde_json::from_str(&serde_json::to_string(&Rect::new(5.0, 1.0, 0.0, 1.0)).unwrap()).unwrap();
        assert_eq!(inverted, Rect::EMPTY);
    }

    #[test]
    fn finite_rect_json_shape() {
        let rect = Rect::new(0.0, 420.0, 0.0, 120.0);
        let json = serde_json::to_string(&rect).unwrap();
        assert_eq!(json, r#"{"x0":0.0,"x1":420.0,"y0":0.0,"y1":120.0}"#);
        assert_eq!(serde_json::from_str::<Rect>(&json).unwrap(), rect);
    }

    #[test]
    fn unbounded_rect_refuses_to_serialize() {
        let half_plane = Rect::new(f64::NEG_INFINITY, 0.0, 0.0, 1.0);
        assert!(serde_json::to_string(&half_plane).is_err());
    }
}
