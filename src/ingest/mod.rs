//! Defect-record parsing: raw JSON records in, typed contour families in
//! millimetres out.

pub mod contour;
pub mod record;

pub use contour::{
    Contour, ContourIngestor, ContourSet, CubeSizing, Severity, DEFAULT_HALF_EXTENT,
};
pub use record::{ContourRecord, FaceRecord};
