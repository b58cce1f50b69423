use serde::Deserialize;

use crate::error::{IngestError, Result};

/// Raw contour entry exactly as it appears in a defect-map record:
/// a parent reference into the detection hierarchy and pixel-space points.
#[derive(Debug, Clone, Deserialize)]
pub struct ContourRecord {
    #[serde(default)]
    pub parent: Option<i64>,
    pub points: Vec<[f64; 2]>,
}

/// One face's defect-map record, straight off disk.
///
/// The four per-group collections and `severities` must have equal length;
/// that invariant is checked during ingestion, not deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceRecord {
    /// Pixel size in centimetres; converted to millimetres on ingestion.
    #[serde(default)]
    pub pixel_size_cm: Option<f64>,
    /// Defect-map width in pixels (dynamic cube sizing).
    #[serde(default)]
    pub width_px: Option<f64>,
    /// Defect-map height in pixels (dynamic cube sizing).
    #[serde(default)]
    pub height_px: Option<f64>,
    /// Contour groups: each group is a crack contour plus its enclosed
    /// sub-regions.
    #[serde(default)]
    pub contours: Option<Vec<Vec<ContourRecord>>>,
    /// One undisturbed boundary per group.
    #[serde(default)]
    pub base_contours: Vec<ContourRecord>,
    /// One inward-shrunk boundary per group (cutter and crack mouth).
    #[serde(rename = "expanded_contours", default)]
    pub erode_contours: Vec<ContourRecord>,
    /// Per-group difference contours (regions excluded from the mouth).
    #[serde(rename = "difference_contours", default)]
    pub diff_contours: Vec<Vec<ContourRecord>>,
    /// One severity tag per group.
    #[serde(default)]
    pub severities: Vec<String>,
}

impl FaceRecord {
    /// Parses a record from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Json`] when the document is not valid JSON or
    /// does not match the record schema.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(IngestError::from)
            .map_err(Into::into)
    }

    /// Parses a record from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Json`] when the document is not valid JSON or
    /// does not match the record schema.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(IngestError::from)
            .map_err(Into::into)
    }
}
