//! Groups OCR boxes into text lines by vertical proximity.

use serde_derive::{Deserialize, Serialize};
use tracing::debug;

use super::{OcrBox, OcrError};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Fraction of the median box height that a box's vertical center may
    /// differ from a line's running center and still join that line.
    pub line_tolerance: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            line_tolerance: 0.5,
        }
    }
}

/// Boxes sharing a vertical band, ordered left to right.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub boxes: Vec<OcrBox>,
    pub y_center: f64,
    pub text: String,
    pub confidence: f64,
}

impl TextLine {
    fn from_boxes(mut boxes: Vec<OcrBox>, y_center: f64) -> Self {
        // Stable, so equal starts keep their vertical/input order.
        boxes.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
        let text = boxes
            .iter()
            .map(|b| b.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let confidence = boxes
            .iter()
            .map(|b| b.confidence)
            .fold(f64::INFINITY, f64::min);
        Self {
            boxes,
            y_center,
            text,
            confidence: if confidence.is_finite() { confidence } else { 0.0 },
        }
    }

    /// Builds a line directly from text, for callers that already have lines.
    #[cfg(test)]
    pub fn from_text(text: &str, y_center: f64, confidence: f64) -> Self {
        use super::BBox;
        Self::from_boxes(
            vec![OcrBox::new(
                text,
                BBox::new(0.0, y_center - 5.0, 100.0, y_center + 5.0),
                confidence,
            )],
            y_center,
        )
    }
}

/// Running line being filled during the scan.
struct OpenLine {
    boxes: Vec<OcrBox>,
    center_sum: f64,
}

impl OpenLine {
    fn new(b: OcrBox) -> Self {
        Self {
            center_sum: b.bbox.y_center(),
            boxes: vec![b],
        }
    }

    fn center(&self) -> f64 {
        self.center_sum / self.boxes.len() as f64
    }

    fn push(&mut self, b: OcrBox) {
        self.center_sum += b.bbox.y_center();
        self.boxes.push(b);
    }

    fn close(self) -> TextLine {
        let center = self.center();
        TextLine::from_boxes(self.boxes, center)
    }
}

/// Clusters boxes into lines, top to bottom. Every box is validated first and
/// a single malformed box fails the whole input.
pub fn cluster_lines(boxes: &[OcrBox], config: &ClusterConfig) -> Result<Vec<TextLine>, OcrError> {
    for (i, b) in boxes.iter().enumerate() {
        b.validate(i)?;
    }

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        let (ba, bb) = (&boxes[a].bbox, &boxes[b].bbox);
        ba.y_center()
            .total_cmp(&bb.y_center())
            .then(ba.x0.total_cmp(&bb.x0))
            .then(a.cmp(&b))
    });

    let mut lines = Vec::new();
    let mut heights = MedianTracker::default();
    let mut current: Option<OpenLine> = None;

    for idx in order {
        let b = boxes[idx].clone();
        heights.insert(b.bbox.height());
        let tolerance = config.line_tolerance * heights.median();

        current = Some(match current.take() {
            Some(mut line) if (b.bbox.y_center() - line.center()).abs() <= tolerance => {
                line.push(b);
                line
            }
            Some(line) => {
                lines.push(line.close());
                OpenLine::new(b)
            }
            None => OpenLine::new(b),
        });
    }
    if let Some(line) = current {
        lines.push(line.close());
    }

    debug!(boxes = boxes.len(), lines = lines.len(), "clustered OCR boxes");
    Ok(lines)
}

/// Median of the values inserted so far, kept in a sorted vector.
#[derive(Default)]
struct MedianTracker {
    sorted: Vec<f64>,
}

impl MedianTracker {
    fn insert(&mut self, v: f64) {
        let pos = self.sorted.partition_point(|x| *x < v);
        self.sorted.insert(pos, v);
    }

    fn median(&self) -> f64 {
        let n = self.sorted.len();
        match n {
            0 => 0.0,
            _ if n % 2 == 1 => self.sorted[n / 2],
            _ => (self.sorted[n / 2 - 1] + self.sorted[n / 2]) / 2.0,
        }
    }
}
