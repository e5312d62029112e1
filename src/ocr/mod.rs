//! OCR boxes as supplied by an external OCR service, and readers for the
//! supported OCR output formats.

use std::fmt;

use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

pub mod cluster;
pub mod tesseract;

#[derive(Debug, Error, PartialEq)]
pub enum OcrError {
    #[error("OCR box #{index} ({text:?}) is malformed: {reason}")]
    MalformedBox {
        index: usize,
        text: String,
        reason: &'static str,
    },
}

/// Axis-aligned bounding box, `y` growing downwards.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn y_center(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    fn check(&self) -> Result<(), &'static str> {
        if ![self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err("non-finite coordinate");
        }
        if self.x1 < self.x0 {
            return Err("right edge is left of the left edge");
        }
        if self.y1 < self.y0 {
            return Err("bottom edge is above the top edge");
        }
        Ok(())
    }
}

impl<'de> serde::Deserialize<'de> for BBox {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        // Flat `[x0, y0, x1, y1]`, or corner pairs `[[x0, y0], [x1, y1]]` as
        // produced by some OCR services.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flat([f64; 4]),
            Corners([[f64; 2]; 2]),
        }
        Ok(match Raw::deserialize(d)? {
            Raw::Flat([x0, y0, x1, y1]) => BBox::new(x0, y0, x1, y1),
            Raw::Corners([[x0, y0], [x1, y1]]) => BBox::new(x0, y0, x1, y1),
        })
    }
}

/// A single recognized text fragment.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OcrBox {
    pub text: String,
    pub bbox: BBox,
    pub confidence: f64,
}

impl OcrBox {
    pub fn new<S: Into<String>>(text: S, bbox: BBox, confidence: f64) -> Self {
        Self {
            text: text.into(),
            bbox,
            confidence,
        }
    }

    /// Checks that the box geometry and confidence are usable. `index` is the
    /// position of the box in its input, for error reporting.
    pub fn validate(&self, index: usize) -> Result<(), OcrError> {
        let malformed = |reason| OcrError::MalformedBox {
            index,
            text: self.text.clone(),
            reason,
        };
        self.bbox.check().map_err(malformed)?;
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(malformed("confidence outside 0.0..=1.0"));
        }
        Ok(())
    }
}

impl fmt::Display for OcrBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?}@({:.1},{:.1})-({:.1},{:.1})",
            self.text, self.bbox.x0, self.bbox.y0, self.bbox.x1, self.bbox.y1
        )
    }
}

/// Input formats understood by [`read_boxes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// A JSON array of `{text, bbox, confidence}` records.
    Json,
    /// Tesseract TSV output.
    Tsv,
}

impl InputFormat {
    /// Guesses the format from a file name, defaulting to JSON.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".tsv") {
            InputFormat::Tsv
        } else {
            InputFormat::Json
        }
    }
}

/// Reads OCR boxes in the given format.
pub fn read_boxes<R: std::io::Read>(reader: R, format: InputFormat) -> anyhow::Result<Vec<OcrBox>> {
    match format {
        InputFormat::Json => Ok(serde_json::from_reader(reader)?),
        InputFormat::Tsv => tesseract::boxes_from_tsv_reader(reader),
    }
}
