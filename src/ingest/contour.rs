use std::fmt;
use std::str::FromStr;

use crate::error::{IngestError, Result};
use crate::math::Point2;

use super::record::{ContourRecord, FaceRecord};

/// Parent sentinel in the detection hierarchy meaning "no parent".
const NO_PARENT: i64 = -1;

/// Cube half-extent used when sizing is fixed, in millimetres.
pub const DEFAULT_HALF_EXTENT: f64 = 250.0;

/// Ordinal severity classes of a crack instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Cs1,
    Cs2,
    Cs3,
}

impl Severity {
    /// All severity classes, mildest first.
    pub const ALL: [Severity; 3] = [Severity::Cs1, Severity::Cs2, Severity::Cs3];

    /// The record tag, e.g. `"CS1"`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Cs1 => "CS1",
            Severity::Cs2 => "CS2",
            Severity::Cs3 => "CS3",
        }
    }

    /// The scene layer that receives this severity's crack geometry.
    #[must_use]
    pub fn layer_name(self) -> &'static str {
        match self {
            Severity::Cs1 => "crack_CS1",
            Severity::Cs2 => "crack_CS2",
            Severity::Cs3 => "crack_CS3",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Severity {
    type Err = IngestError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CS1" => Ok(Severity::Cs1),
            "CS2" => Ok(Severity::Cs2),
            "CS3" => Ok(Severity::Cs3),
            _ => Err(IngestError::UnknownSeverity { tag: s.into() }),
        }
    }
}

/// A closed 2D polygon boundary in millimetres, possibly nested under a
/// parent contour in the detection hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    /// Index of the enclosing contour, or `None` for a crack/primary region.
    pub parent: Option<i64>,
    /// Boundary vertices in millimetres (implicitly closed).
    pub points: Vec<Point2>,
}

impl Contour {
    /// Whether this contour is a crack/primary region (no parent).
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.parent.is_none()
    }
}

/// How the cube half-extent is chosen for a record.
#[derive(Debug, Clone, Copy)]
pub enum CubeSizing {
    /// A fixed half-extent in millimetres.
    Fixed(f64),
    /// Derive the half-extent from the record's pixel dimensions:
    /// `max(width_px, height_px) * pixel_size / 2`.
    FromRecord,
}

impl Default for CubeSizing {
    fn default() -> Self {
        CubeSizing::Fixed(DEFAULT_HALF_EXTENT)
    }
}

/// The five parallel contour families of one face record, scaled to
/// millimetres, together with the half-extent derived for the record.
///
/// Index `i` across all five collections refers to the same logical defect
/// instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourSet {
    /// Per group: the crack contour plus its enclosed sub-regions.
    pub contours: Vec<Vec<Contour>>,
    /// Per group: the undisturbed boundary.
    pub base_contours: Vec<Contour>,
    /// Per group: the inward-shrunk boundary (cutter and crack mouth).
    pub erode_contours: Vec<Contour>,
    /// Per group: regions excluded from the crack mouth.
    pub diff_contours: Vec<Vec<Contour>>,
    /// Per group: the severity class.
    pub severities: Vec<Severity>,
    half_extent: f64,
}

impl ContourSet {
    /// The cube half-extent this record was ingested against.
    #[must_use]
    pub fn half_extent(&self) -> f64 {
        self.half_extent
    }

    /// The number of defect groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.severities.len()
    }

    /// Checks the equal-length invariant across the five families.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ContourCountMismatch`] when any family
    /// disagrees in length.
    pub fn validate(&self) -> Result<()> {
        let n = self.contours.len();
        if self.base_contours.len() != n
            || self.erode_contours.len() != n
            || self.diff_contours.len() != n
            || self.severities.len() != n
        {
            return Err(IngestError::ContourCountMismatch {
                contours: self.contours.len(),
                base: self.base_contours.len(),
                erode: self.erode_contours.len(),
                diff: self.diff_contours.len(),
                severities: self.severities.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// Parses a face's defect record into typed contour families in
/// real-world length units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContourIngestor {
    sizing: CubeSizing,
}

impl ContourIngestor {
    /// Creates an ingestor with the given cube sizing mode.
    #[must_use]
    pub fn new(sizing: CubeSizing) -> Self {
        Self { sizing }
    }

    /// Ingests one record: converts every coordinate from pixels to
    /// millimetres and checks the parallel-family invariant.
    ///
    /// Pure transform: the record is not mutated and repeated calls yield
    /// identical output.
    ///
    /// # Errors
    ///
    /// * [`IngestError::MissingField`] when `pixel_size_cm` or `contours`
    ///   is absent.
    /// * [`IngestError::InvalidDimensions`] when dynamic sizing is requested
    ///   but neither pixel dimension is present and non-zero.
    /// * [`IngestError::UnknownSeverity`] for an unrecognized severity tag.
    /// * [`IngestError::ContourCountMismatch`] when the families disagree
    ///   in length.
    pub fn ingest(&self, record: &FaceRecord) -> Result<ContourSet> {
        let pixel_size_cm = record.pixel_size_cm.ok_or(IngestError::MissingField {
            field: "pixel_size_cm",
        })?;
        let pixel_size_mm = pixel_size_cm * 10.0;

        let half_extent = match self.sizing {
            CubeSizing::Fixed(half) => half,
            CubeSizing::FromRecord => {
                let extent_px = record
                    .width_px
                    .unwrap_or(0.0)
                    .max(record.height_px.unwrap_or(0.0));
                if extent_px <= 0.0 {
                    return Err(IngestError::InvalidDimensions.into());
                }
                extent_px * pixel_size_mm / 2.0
            }
        };

        let groups = record
            .contours
            .as_ref()
            .ok_or(IngestError::MissingField { field: "contours" })?;

        let contours = groups
            .iter()
            .map(|group| group.iter().map(|c| convert(c, pixel_size_mm)).collect())
            .collect();
        let base_contours = record
            .base_contours
            .iter()
            .map(|c| convert(c, pixel_size_mm))
            .collect();
        let erode_contours = record
            .erode_contours
            .iter()
            .map(|c| convert(c, pixel_size_mm))
            .collect();
        let diff_contours = record
            .diff_contours
            .iter()
            .map(|group| group.iter().map(|c| convert(c, pixel_size_mm)).collect())
            .collect();
        let severities = record
            .severities
            .iter()
            .map(|tag| tag.parse())
            .collect::<std::result::Result<Vec<Severity>, IngestError>>()?;

        let set = ContourSet {
            contours,
            base_contours,
            erode_contours,
            diff_contours,
            severities,
            half_extent,
        };
        set.validate()?;
        Ok(set)
    }
}

/// Scales one raw contour from pixels to millimetres and normalizes the
/// parent sentinel.
fn convert(record: &ContourRecord, pixel_size_mm: f64) -> Contour {
    let parent = match record.parent {
        None | Some(NO_PARENT) => None,
        other => other,
    };
    let points = record
        .points
        .iter()
        .map(|p| Point2::new(p[0] * pixel_size_mm, p[1] * pixel_size_mm))
        .collect();
    Contour { parent, points }
}
