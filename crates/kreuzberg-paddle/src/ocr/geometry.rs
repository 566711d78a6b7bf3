use serde::{Deserialize, Serialize};

use crate::Result;

/// A 2-D point in the engine's pixel coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Engine-native encoding of one detection: `[[[x, y] x4], [text, confidence]]`.
#[derive(Deserialize, Serialize)]
struct RawDetection([[f64; 2]; 4], (String, f64));

/// One recognised text box.
///
/// The quadrilateral is not assumed to be axis-aligned. The engine usually emits
/// points clockwise from the top-left corner, but nothing enforces that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawDetection", into = "RawDetection")]
pub struct Detection {
    pub points: [Point; 4],
    pub text: String,
    pub confidence: f64,
}

impl From<RawDetection> for Detection {
    fn from(RawDetection(points, (text, confidence)): RawDetection) -> Self {
        Self {
            points: points.map(Point::from),
            text,
            confidence,
        }
    }
}

impl From<Detection> for RawDetection {
    fn from(detection: Detection) -> Self {
        RawDetection(
            detection.points.map(<[f64; 2]>::from),
            (detection.text, detection.confidence),
        )
    }
}

impl Detection {
    pub fn new(points: [Point; 4], text: impl Into<String>, confidence: f64) -> Self {
        Self {
            points,
            text: text.into(),
            confidence,
        }
    }

    /// Axis-aligned box from its top-left corner and size, points clockwise.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64, text: impl Into<String>, confidence: f64) -> Self {
        Self::new(
            [
                Point::new(x, y),
                Point::new(x + width, y),
                Point::new(x + width, y + height),
                Point::new(x, y + height),
            ],
            text,
            confidence,
        )
    }

    /// The first point of the polygon, used as the ordering key.
    pub fn anchor(&self) -> Point {
        self.points[0]
    }

    /// Mean of the four y-coordinates.
    pub fn center_y(&self) -> f64 {
        self.points.iter().map(|p| p.y).sum::<f64>() / 4.0
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Detections for one image. `None` stands for a page the engine returned empty.
pub type Page = Option<Vec<Detection>>;

/// Decode raw engine output (a JSON list of pages) into pages.
pub fn pages_from_json(json: &str) -> Result<Vec<Page>> {
    Ok(serde_json::from_str(json)?)
}
