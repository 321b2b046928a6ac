use serde::{Deserialize, Serialize};

/// Axis-aligned box in image coordinates, serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box holding every point; `None` for an empty slice.
    pub fn enclosing(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let init = BBox::new(first.0, first.1, first.0, first.1);
        Some(rest.iter().fold(init, |acc, &(x, y)| BBox {
            x0: acc.x0.min(x),
            y0: acc.y0.min(y),
            x1: acc.x1.max(x),
            y1: acc.y1.max(y),
        }))
    }

    pub fn center_x(&self) -> f32 {
        (self.x0 + self.x1) * 0.5
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) * 0.5
    }

    pub fn horizontal_distance(&self, other: &Self) -> f32 {
        (self.center_x() - other.center_x()).abs()
    }

    pub fn vertical_distance(&self, other: &Self) -> f32 {
        (self.center_y() - other.center_y()).abs()
    }
}

impl From<[f32; 4]> for BBox {
    fn from(raw: [f32; 4]) -> Self {
        BBox::new(raw[0], raw[1], raw[2], raw[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.x0, bbox.y0, bbox.x1, bbox.y1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn computes_center_distances() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(1.0, 21.0, 9.0, 29.0);
        assert_eq!((a.center_x(), a.center_y()), (5.0, 5.0));
        assert_eq!(a.horizontal_distance(&b), 0.0);
        assert_eq!(a.vertical_distance(&b), 20.0);
    }

    #[test]
    fn encloses_polygon_vertices() {
        let bbox = BBox::enclosing(&[(4.0, 2.0), (10.0, 2.0), (10.0, 8.0), (4.0, 8.0)]);
        assert_eq!(bbox, Some(BBox::new(4.0, 2.0, 10.0, 8.0)));
        assert_eq!(BBox::enclosing(&[]), None);
    }

    #[test]
    fn serializes_as_corner_array() {
        let bbox: BBox = serde_json::from_str("[0, 20, 10, 30]").unwrap();
        assert_eq!(bbox, BBox::new(0.0, 20.0, 10.0, 30.0));
        assert_eq!(serde_json::to_string(&bbox).unwrap(), "[0.0,20.0,10.0,30.0]");
    }
}
