//! Reads Tesseract OCR TSV output (`tesseract image out tsv`) into OCR boxes.

use anyhow::{bail, Context, Result};
use serde_derive::Deserialize;

use super::{BBox, OcrBox};

const WORD_LEVEL: i32 = 5;

/// A Tesseract TSV file record.
#[derive(Debug, Deserialize)]
struct Record {
    level: i32,
    page_num: i32,
    block_num: i32,
    par_num: i32,
    line_num: i32,
    word_num: i32,
    left: i32,
    top: i32,
    width: i32,
    height: i32,
    conf: f64,
    #[serde(default)]
    text: String,
}

impl Record {
    /// Word records with a usable confidence become boxes. Structural records
    /// (page, block, paragraph, line) and empty words carry no text.
    fn into_box(self) -> Result<Option<OcrBox>> {
        match self.level {
            1..=4 => Ok(None),
            WORD_LEVEL => {
                if self.conf < 0.0 || self.text.trim().is_empty() {
                    return Ok(None);
                }
                if self.width < 0 || self.height < 0 {
                    bail!(
                        "TSV word {}.{}.{}.{}.{} has negative size",
                        self.page_num,
                        self.block_num,
                        self.par_num,
                        self.line_num,
                        self.word_num
                    );
                }
                let (left, top) = (f64::from(self.left), f64::from(self.top));
                Ok(Some(OcrBox::new(
                    self.text.trim(),
                    BBox::new(
                        left,
                        top,
                        left + f64::from(self.width),
                        top + f64::from(self.height),
                    ),
                    (self.conf / 100.0).clamp(0.0, 1.0),
                )))
            }
            other => bail!("TSV field level has bad TSV value {:?}", other),
        }
    }
}

/// Reads the word boxes from a reader of a Tesseract TSV file.
pub fn boxes_from_tsv_reader<R: std::io::Read>(reader: R) -> Result<Vec<OcrBox>> {
    let r = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut boxes = Vec::new();
    for (i, record_res) in r.into_deserialize().enumerate() {
        let record: Record = record_res.with_context(|| format!("reading TSV record #{}", i + 1))?;
        if let Some(b) = record.into_box()? {
            boxes.push(b);
        }
    }
    Ok(boxes)
}
