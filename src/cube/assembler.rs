use rand::Rng;
use tracing::{debug, warn};

use crate::crack::{CrackExtruder, CrackGeometry, CrackItem, DepthParams};
use crate::error::{FissuraError, OperationError, Result};
use crate::frame::{FaceDirection, FaceFrame};
use crate::ingest::{Contour, ContourIngestor, ContourSet, CubeSizing, FaceRecord, Severity};
use crate::operations::{MakePlanarRegion, SplitRegion};
use crate::scene::{Geometry, ObjectId, SceneStore};

/// Configuration of a cube build.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildConfig {
    /// How the cube half-extent is chosen per record.
    pub sizing: CubeSizing,
    /// Depth-sampling ranges for crack extrusion.
    pub depth: DepthParams,
}

/// Per-face progress through the assembly state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceStage {
    Ingesting,
    Embedding,
    Splitting,
    Extruding,
    Done,
}

/// A group skipped during face processing, with where and why.
#[derive(Debug)]
pub struct SkippedGroup {
    pub group: usize,
    pub stage: FaceStage,
    pub error: FissuraError,
}

/// The built geometry of one face.
#[derive(Debug)]
pub struct FaceResult {
    pub direction: FaceDirection,
    /// The retained outer face, with crack-mouth cutouts when split.
    pub outer_face: ObjectId,
    /// Whether the boolean split replaced the original face.
    pub split: bool,
    /// Extrusion results, one per retained group.
    pub cracks: Vec<CrackGeometry>,
    /// Groups that were skipped, with their failure context.
    pub skipped: Vec<SkippedGroup>,
}

/// A face whose record could not be processed at all.
#[derive(Debug)]
pub struct FaceFailure {
    pub direction: FaceDirection,
    pub stage: FaceStage,
    pub error: FissuraError,
}

/// The assembled cube: per-face results in canonical order plus the faces
/// that failed fatally. Failed faces never corrupt completed ones.
#[derive(Debug, Default)]
pub struct CubeBuild {
    pub faces: Vec<FaceResult>,
    pub failures: Vec<FaceFailure>,
}

impl CubeBuild {
    /// Looks up a face result by direction.
    #[must_use]
    pub fn face(&self, direction: FaceDirection) -> Option<&FaceResult> {
        self.faces.iter().find(|f| f.direction == direction)
    }

    /// Iterates over every crack produced, across all faces.
    pub fn all_cracks(&self) -> impl Iterator<Item = &CrackGeometry> {
        self.faces.iter().flat_map(|f| f.cracks.iter())
    }

    /// Collects the cracks of one severity class, across all faces.
    #[must_use]
    pub fn cracks_by_severity(&self, severity: Severity) -> Vec<&CrackGeometry> {
        self.all_cracks()
            .filter(|c| c.severity == severity)
            .collect()
    }
}

/// Orchestrates per-face ingestion, embedding, splitting and extrusion,
/// producing the cube's defect-bearing shell plus a catalog of crack
/// geometry grouped by face and severity.
///
/// Faces are processed strictly sequentially: each face's splitting step
/// mutates shared scene state (visibility, object creation and deletion)
/// that must not interleave.
pub struct CubeAssembler {
    config: BuildConfig,
}

impl CubeAssembler {
    /// Creates an assembler with the given configuration.
    #[must_use]
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Processes up to six records, one per face in canonical order.
    ///
    /// Malformed records are fatal for their face only: the failure is
    /// recorded and the remaining faces are still processed. Expects the
    /// severity layers to exist already (see
    /// [`prepare_defect_layers`](crate::scene::prepare_defect_layers)).
    pub fn execute<R: Rng + ?Sized>(
        &self,
        records: &[FaceRecord],
        scene: &mut SceneStore,
        rng: &mut R,
    ) -> CubeBuild {
        let mut build = CubeBuild::default();
        for (&direction, record) in FaceDirection::ALL.iter().zip(records) {
            match self.build_face(direction, record, scene, rng) {
                Ok(result) => {
                    debug!(%direction, cracks = result.cracks.len(), "face completed");
                    build.faces.push(result);
                }
                Err((stage, error)) => {
                    warn!(%direction, ?stage, %error, "face abandoned");
                    build.failures.push(FaceFailure {
                        direction,
                        stage,
                        error,
                    });
                }
            }
        }
        build
    }

    fn build_face<R: Rng + ?Sized>(
        &self,
        direction: FaceDirection,
        record: &FaceRecord,
        scene: &mut SceneStore,
        rng: &mut R,
    ) -> std::result::Result<FaceResult, (FaceStage, FissuraError)> {
        let mut stage = FaceStage::Ingesting;

        // Ingestion also asserts the parallel-family invariant; a violation
        // abandons this face.
        let set = ContourIngestor::new(self.config.sizing)
            .ingest(record)
            .map_err(|e| (stage, e))?;

        stage = FaceStage::Embedding;
        let frame = FaceFrame::new(set.half_extent());
        let plane = frame.plane(direction).map_err(|e| (stage, e))?;
        let face_id = MakePlanarRegion::new(frame.corners(direction).to_vec())
            .with_plane(plane)
            .execute(scene)
            .map_err(|e| (stage, e))?;

        let mut cutters = Vec::new();
        let mut items = Vec::new();
        let mut skipped = Vec::new();
        for group in 0..set.group_count() {
            match self.embed_group(scene, &frame, direction, &set, group) {
                Ok((cutter, item)) => {
                    cutters.push(cutter);
                    items.push(item);
                }
                Err(error) => {
                    warn!(%direction, group, %error, "group skipped");
                    skipped.push(SkippedGroup {
                        group,
                        stage,
                        error,
                    });
                }
            }
        }

        // The face stays hidden while the split creates and deletes scene
        // objects around it.
        stage = FaceStage::Splitting;
        scene.hide(face_id).map_err(|e| (stage, e.into()))?;
        let outcome = SplitRegion::new(face_id, cutters)
            .execute(scene)
            .map_err(|e| (stage, e))?;
        scene.show(outcome.face).map_err(|e| (stage, e.into()))?;

        stage = FaceStage::Extruding;
        let mut cracks = Vec::new();
        for item in items {
            let group = item.group;
            let result = CrackExtruder::new(item)
                .with_inward(direction.inward_normal())
                .with_depth(self.config.depth)
                .execute(scene, rng);
            match result {
                Ok(geometry) => cracks.push(geometry),
                Err(error) => {
                    warn!(%direction, group, %error, "crack item skipped");
                    skipped.push(SkippedGroup {
                        group,
                        stage,
                        error,
                    });
                }
            }
        }

        stage = FaceStage::Done;
        debug!(%direction, ?stage, "face state machine finished");
        Ok(FaceResult {
            direction,
            outer_face: outcome.face,
            split: outcome.split,
            cracks,
            skipped,
        })
    }

    /// Embeds one group's families onto the face plane and assembles its
    /// crack item plus cutter surface.
    ///
    /// Validates before creating any scene object, so a skipped group
    /// leaves nothing behind.
    fn embed_group(
        &self,
        scene: &mut SceneStore,
        frame: &FaceFrame,
        direction: FaceDirection,
        set: &ContourSet,
        group: usize,
    ) -> Result<(ObjectId, CrackItem)> {
        let erode_pts = embed_contour(frame, direction, &set.erode_contours[group]);
        if erode_pts.len() < 3 {
            return Err(OperationError::DegenerateGroup {
                face: direction,
                group,
            }
            .into());
        }
        let base_pts = embed_contour(frame, direction, &set.base_contours[group]);
        if base_pts.len() < 3 {
            return Err(OperationError::DegenerateGroup {
                face: direction,
                group,
            }
            .into());
        }
        if !set.contours[group]
            .iter()
            .any(|c| c.is_primary() && c.points.len() >= 3)
        {
            return Err(OperationError::EmptyCrackGroup {
                face: direction,
                group,
            }
            .into());
        }

        // The cutter shares the face plane so every region in the split
        // projects into one UV space.
        let cutter = MakePlanarRegion::new(erode_pts.clone())
            .with_plane(frame.plane(direction)?)
            .execute(scene)?;

        let offset_poly = scene.add(Geometry::Polyline(erode_pts));
        let base_poly = scene.add(Geometry::Polyline(base_pts));

        let mut crack_polys = Vec::new();
        let mut inside_polys = Vec::new();
        for contour in &set.contours[group] {
            let pts = embed_contour(frame, direction, contour);
            if pts.len() < 3 {
                continue;
            }
            let id = scene.add(Geometry::Polyline(pts));
            if contour.is_primary() {
                crack_polys.push(id);
            } else {
                inside_polys.push(id);
            }
        }

        let mut diff_polys = Vec::new();
        for contour in &set.diff_contours[group] {
            let pts = embed_contour(frame, direction, contour);
            if pts.len() < 3 {
                continue;
            }
            diff_polys.push(scene.add(Geometry::Polyline(pts)));
        }

        Ok((
            cutter,
            CrackItem {
                face: direction,
                group,
                severity: set.severities[group],
                offset_poly,
                cutter,
                base_poly,
                crack_polys,
                inside_polys,
                diff_polys,
            },
        ))
    }
}

/// Centers a contour on the face and embeds it onto the face plane.
fn embed_contour(frame: &FaceFrame, direction: FaceDirection, contour: &Contour) -> Vec<crate::math::Point3> {
    contour
        .points
        .iter()
        .map(|p| frame.embed(direction, &frame.center(p)))
        .collect()
}
