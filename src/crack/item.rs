use crate::frame::FaceDirection;
use crate::ingest::Severity;
use crate::scene::ObjectId;

/// The unit of extrusion work: one defect group's embedded boundaries,
/// ready to be turned into a layered crack volume.
///
/// Produced by per-face ingestion + embedding, consumed exactly once by
/// [`CrackExtruder`](super::CrackExtruder); every referenced curve is
/// deleted when the item is consumed.
#[derive(Debug, Clone)]
pub struct CrackItem {
    /// Face this group lives on.
    pub face: FaceDirection,
    /// Group index within the face record.
    pub group: usize,
    /// Severity class driving layer assignment.
    pub severity: Severity,
    /// Inward-shrunk boundary: the crack-mouth seam.
    pub offset_poly: ObjectId,
    /// Planar surface of the offset boundary, used as the boolean cutter.
    /// Usually already consumed by the face split by the time the item is
    /// extruded.
    pub cutter: ObjectId,
    /// Undisturbed boundary.
    pub base_poly: ObjectId,
    /// Crack contour polygons (primary regions); at least one is required.
    pub crack_polys: Vec<ObjectId>,
    /// Nested non-crack islands inside the crack contours.
    pub inside_polys: Vec<ObjectId>,
    /// Regions excluded from the crack mouth.
    pub diff_polys: Vec<ObjectId>,
}

impl CrackItem {
    /// Every input curve the extruder consumes (the cutter included: it is
    /// deleted here only if the split has not already discarded it).
    #[must_use]
    pub fn consumed_ids(&self) -> Vec<ObjectId> {
        let mut ids = vec![self.offset_poly, self.cutter, self.base_poly];
        ids.extend_from_slice(&self.crack_polys);
        ids.extend_from_slice(&self.inside_polys);
        ids.extend_from_slice(&self.diff_polys);
        ids
    }
}
