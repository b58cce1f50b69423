use rand::Rng;
use tracing::warn;

use crate::error::{OperationError, Result};
use crate::frame::FaceDirection;
use crate::ingest::Severity;
use crate::math::polygon_3d::{
    align_seam_to, newell_normal, translate_polygon, vertex_centroid, windings_match,
};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::{ExtrudeCurve, LoftCurves, MakePlanarRegion};
use crate::scene::{ObjectId, SceneStore, STRUCTURAL_LAYER};

use super::item::CrackItem;

/// Depth-sampling ranges for crack extrusion, in millimetres.
///
/// `standoff` is the near-surface gap between the face and the crack body
/// (d1); `travel` is the additional depth of the body itself (d2 − d1).
#[derive(Debug, Clone, Copy)]
pub struct DepthParams {
    pub standoff_min: f64,
    pub standoff_max: f64,
    pub travel_min: f64,
    pub travel_max: f64,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            standoff_min: 0.5,
            standoff_max: 2.5,
            travel_min: 10.0,
            travel_max: 30.0,
        }
    }
}

impl DepthParams {
    /// Samples the two depths for one crack item.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DepthSample {
        let standoff = sample_range(rng, self.standoff_min, self.standoff_max);
        let depth = standoff + sample_range(rng, self.travel_min, self.travel_max);
        DepthSample { standoff, depth }
    }
}

/// Samples a uniform value, accepting collapsed ranges so tests can pin
/// exact depths.
fn sample_range<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi - lo <= f64::EPSILON {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}

/// The sampled depths of one crack item: the near-surface `standoff` (d1)
/// and the total `depth` (d2), both along the inward direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthSample {
    pub standoff: f64,
    pub depth: f64,
}

impl DepthSample {
    /// The extrusion length of the crack body (d2 − d1).
    #[must_use]
    pub fn travel(&self) -> f64 {
        self.depth - self.standoff
    }
}

/// The persisted geometry of one extruded crack item.
#[derive(Debug, Clone)]
pub struct CrackGeometry {
    pub face: FaceDirection,
    pub group: usize,
    pub severity: Severity,
    pub depths: DepthSample,
    /// Transition surface between the offset boundary and the bottom curve:
    /// the visible crack-mouth wall.
    pub loft: ObjectId,
    /// Wall extrusions of the crack contours.
    pub walls: Vec<ObjectId>,
    /// Far-end caps of the crack contours.
    pub caps: Vec<ObjectId>,
    /// Wall extrusions of nested and difference regions (structural layer).
    pub inner_walls: Vec<ObjectId>,
    /// Far-end caps of nested and difference regions (structural layer).
    pub inner_caps: Vec<ObjectId>,
    /// Co-located reference surfaces of the difference regions at d1,
    /// retained for later subtraction against the component surface.
    pub diff_refs: Vec<ObjectId>,
}

/// Converts one [`CrackItem`] into a layered 3D crack volume.
///
/// Consumes the item: all input curves are deleted from the scene on every
/// exit path. On failure, partially produced geometry is deleted as well,
/// so a skipped item leaves no trace.
pub struct CrackExtruder {
    item: CrackItem,
    inward: Option<Vector3>,
    depth: DepthParams,
}

impl CrackExtruder {
    /// Creates a new `CrackExtruder` operation.
    #[must_use]
    pub fn new(item: CrackItem) -> Self {
        Self {
            item,
            inward: None,
            depth: DepthParams::default(),
        }
    }

    /// Supplies the inward direction explicitly (the assembler passes the
    /// face frame's inward normal).
    ///
    /// Without it, the extruder falls back to the base boundary's planar
    /// normal flipped toward the origin, which assumes an origin-symmetric
    /// solid.
    #[must_use]
    pub fn with_inward(mut self, inward: Vector3) -> Self {
        self.inward = Some(inward);
        self
    }

    /// Overrides the depth-sampling ranges.
    #[must_use]
    pub fn with_depth(mut self, depth: DepthParams) -> Self {
        self.depth = depth;
        self
    }

    /// Executes the extrusion.
    ///
    /// # Errors
    ///
    /// * [`OperationError::EmptyCrackGroup`] when no crack contour survives.
    /// * [`OperationError::OffsetFailure`] when the bottom curve cannot be
    ///   built from the base boundary.
    /// * [`OperationError::MissingLayer`] when the severity layer does not
    ///   exist (layer creation is a preparation-step responsibility).
    pub fn execute<R: Rng + ?Sized>(
        self,
        scene: &mut SceneStore,
        rng: &mut R,
    ) -> Result<CrackGeometry> {
        let consumed = self.item.consumed_ids();
        let mut created: Vec<ObjectId> = Vec::new();

        let result = build(scene, rng, &self.item, self.inward, self.depth, &mut created);

        if result.is_err() {
            // A skipped item must leave no partial pieces behind.
            for id in created {
                scene.delete(id);
            }
        }
        // Input curves are transient regardless of the outcome.
        for id in consumed {
            scene.delete(id);
        }

        result
    }
}

#[allow(clippy::too_many_lines)]
fn build<R: Rng + ?Sized>(
    scene: &mut SceneStore,
    rng: &mut R,
    item: &CrackItem,
    inward: Option<Vector3>,
    depth: DepthParams,
    created: &mut Vec<ObjectId>,
) -> Result<CrackGeometry> {
    let crack_profiles: Vec<Vec<Point3>> = item
        .crack_polys
        .iter()
        .filter_map(|&id| scene.polyline(id).ok().map(<[Point3]>::to_vec))
        .collect();
    if crack_profiles.is_empty() {
        return Err(OperationError::EmptyCrackGroup {
            face: item.face,
            group: item.group,
        }
        .into());
    }

    let offset_pts = scene.polyline(item.offset_poly)?.to_vec();
    let base_pts = scene.polyline(item.base_poly)?.to_vec();
    if offset_pts.len() < 3 || base_pts.len() < 3 {
        return Err(offset_failure(item));
    }

    let layer = item.severity.layer_name();
    if !scene.has_layer(layer) {
        return Err(OperationError::MissingLayer {
            layer: layer.into(),
        }
        .into());
    }

    let direction = match inward {
        Some(v) => {
            let len = v.norm();
            if len < TOLERANCE {
                return Err(
                    OperationError::InvalidInput("inward direction must be non-zero".into()).into(),
                );
            }
            v / len
        }
        None => inward_toward_origin(&base_pts).ok_or_else(|| offset_failure(item))?,
    };

    let depths = depth.sample(rng);
    let vec_d1 = direction * depths.standoff;
    let vec_d2 = direction * depths.depth;

    // Bottom curve: the base boundary pushed to the standoff depth, with
    // its winding and seam matched to the offset boundary so the loft does
    // not twist.
    let mut bottom = translate_polygon(&base_pts, vec_d1);
    if !windings_match(&offset_pts, &bottom) {
        bottom.reverse();
    }
    let bottom = align_seam_to(&bottom, &offset_pts[0]);

    let loft = LoftCurves::new(offset_pts, bottom).execute(scene)?;
    created.push(loft);
    scene.set_object_layer(loft, layer)?;

    // Crack contours: wall extrusion from d1 to d2, far cap at d2.
    let mut walls = Vec::new();
    let mut caps = Vec::new();
    for profile in &crack_profiles {
        let start = translate_polygon(profile, vec_d1);
        match ExtrudeCurve::new(start, direction, depths.travel()).execute(scene) {
            Ok(wall) => {
                created.push(wall);
                scene.set_object_layer(wall, layer)?;
                walls.push(wall);
            }
            Err(err) => warn!(face = %item.face, group = item.group, %err, "crack wall skipped"),
        }
        match MakePlanarRegion::new(translate_polygon(profile, vec_d2)).execute(scene) {
            Ok(cap) => {
                created.push(cap);
                scene.set_object_layer(cap, layer)?;
                caps.push(cap);
            }
            Err(err) => warn!(face = %item.face, group = item.group, %err, "crack cap skipped"),
        }
    }

    // Nested islands and difference regions: same sweep, tagged to the
    // structural layer for the downstream boolean removal.
    let mut inner_walls = Vec::new();
    let mut inner_caps = Vec::new();
    let inner_profiles: Vec<Vec<Point3>> = item
        .inside_polys
        .iter()
        .chain(&item.diff_polys)
        .filter_map(|&id| scene.polyline(id).ok().map(<[Point3]>::to_vec))
        .collect();
    for profile in &inner_profiles {
        let start = translate_polygon(profile, vec_d1);
        match ExtrudeCurve::new(start, direction, depths.travel()).execute(scene) {
            Ok(wall) => {
                created.push(wall);
                tag_structural(scene, wall);
                inner_walls.push(wall);
            }
            Err(err) => warn!(face = %item.face, group = item.group, %err, "inner wall skipped"),
        }
        match MakePlanarRegion::new(translate_polygon(profile, vec_d2)).execute(scene) {
            Ok(cap) => {
                created.push(cap);
                tag_structural(scene, cap);
                inner_caps.push(cap);
            }
            Err(err) => warn!(face = %item.face, group = item.group, %err, "inner cap skipped"),
        }
    }

    // Difference regions additionally leave a co-located reference surface
    // at the standoff depth.
    let mut diff_refs = Vec::new();
    for &id in &item.diff_polys {
        let Ok(points) = scene.polyline(id) else {
            continue;
        };
        let shifted = translate_polygon(points, vec_d1);
        match MakePlanarRegion::new(shifted).execute(scene) {
            Ok(reference) => {
                created.push(reference);
                tag_structural(scene, reference);
                diff_refs.push(reference);
            }
            Err(err) => {
                warn!(face = %item.face, group = item.group, %err, "diff reference skipped");
            }
        }
    }

    Ok(CrackGeometry {
        face: item.face,
        group: item.group,
        severity: item.severity,
        depths,
        loft,
        walls,
        caps,
        inner_walls,
        inner_caps,
        diff_refs,
    })
}

fn offset_failure(item: &CrackItem) -> crate::error::FissuraError {
    OperationError::OffsetFailure {
        face: item.face,
        group: item.group,
    }
    .into()
}

/// Tags structural geometry if the structural layer exists; unlike the
/// severity layer this one is optional.
fn tag_structural(scene: &mut SceneStore, id: ObjectId) {
    if scene.has_layer(STRUCTURAL_LAYER) {
        let _ = scene.set_object_layer(id, STRUCTURAL_LAYER);
    }
}

/// Fallback inward direction: the base boundary's planar normal oriented
/// toward the origin. Valid only for solids symmetric about the origin.
fn inward_toward_origin(points: &[Point3]) -> Option<Vector3> {
    let normal = newell_normal(points).ok()?;
    let centroid = vertex_centroid(points);
    let to_origin = Point3::origin() - centroid;
    if normal.dot(&to_origin) < 0.0 {
        Some(-normal)
    } else {
        Some(normal)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::scene::{prepare_defect_layers, Geometry};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Depth parameters collapsed to exact values for assertions.
    fn pinned_depth() -> DepthParams {
        DepthParams {
            standoff_min: 1.0,
            standoff_max: 1.0,
            travel_min: 20.0,
            travel_max: 20.0,
        }
    }

    fn square(min: f64, max: f64, z: f64) -> Vec<Point3> {
        vec![
            p(min, min, z),
            p(max, min, z),
            p(max, max, z),
            p(min, max, z),
        ]
    }

    /// Builds a crack item on the z = 0 plane with inward direction −z.
    fn square_item(scene: &mut SceneStore) -> CrackItem {
        let offset_poly = scene.add(Geometry::Polyline(square(1.0, 9.0, 0.0)));
        let cutter = MakePlanarRegion::new(square(1.0, 9.0, 0.0))
            .execute(scene)
            .unwrap();
        let base_poly = scene.add(Geometry::Polyline(square(0.0, 10.0, 0.0)));
        let crack = scene.add(Geometry::Polyline(square(2.0, 8.0, 0.0)));
        CrackItem {
            face: FaceDirection::PosZ,
            group: 0,
            severity: Severity::Cs1,
            offset_poly,
            cutter,
            base_poly,
            crack_polys: vec![crack],
            inside_polys: vec![],
            diff_polys: vec![],
        }
    }

    // ── depth law ──

    #[test]
    fn pinned_depths_place_bottom_curve_and_extrusion_exactly() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let item = square_item(&mut scene);
        let mut rng = StdRng::seed_from_u64(7);

        let geometry = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .with_depth(pinned_depth())
            .execute(&mut scene, &mut rng)
            .unwrap();

        assert_eq!(geometry.depths, DepthSample { standoff: 1.0, depth: 21.0 });
        assert!((geometry.depths.travel() - 20.0).abs() < TOLERANCE);

        // The loft's bottom rail sits exactly 1.0 below the face plane.
        match &scene.object(geometry.loft).unwrap().geometry {
            Geometry::Ruled(ruled) => {
                assert!(ruled.end.iter().all(|pt| (pt.z + 1.0).abs() < TOLERANCE));
                assert!(ruled.start.iter().all(|pt| pt.z.abs() < TOLERANCE));
            }
            other => panic!("expected ruled surface, got {other:?}"),
        }

        // The crack wall extrudes exactly 20.0 along −z from the standoff.
        match &scene.object(geometry.walls[0]).unwrap().geometry {
            Geometry::Extrusion(ext) => {
                assert!((ext.length - 20.0).abs() < TOLERANCE);
                assert!((ext.direction - Vector3::new(0.0, 0.0, -1.0)).norm() < TOLERANCE);
                assert!(ext.profile.iter().all(|pt| (pt.z + 1.0).abs() < TOLERANCE));
            }
            other => panic!("expected extrusion, got {other:?}"),
        }

        // The far cap sits at the full depth.
        match &scene.object(geometry.caps[0]).unwrap().geometry {
            Geometry::Region(region) => {
                assert!(region.outer.iter().all(|pt| (pt.z + 21.0).abs() < TOLERANCE));
            }
            other => panic!("expected region, got {other:?}"),
        }
    }

    #[test]
    fn sampled_depths_stay_in_range() {
        let params = DepthParams::default();
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let sample = params.sample(&mut rng);
            assert!(sample.standoff >= 0.5 && sample.standoff < 2.5);
            assert!(sample.travel() >= 10.0 && sample.travel() < 30.0);
        }
    }

    #[test]
    fn same_seed_yields_identical_depths() {
        let params = DepthParams::default();
        let a = params.sample(&mut StdRng::seed_from_u64(42));
        let b = params.sample(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    // ── seam and winding ──

    #[test]
    fn reversed_base_winding_is_corrected() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let mut item = square_item(&mut scene);
        // Replace the base with a clockwise square.
        let cw: Vec<Point3> = square(0.0, 10.0, 0.0).into_iter().rev().collect();
        item.base_poly = scene.add(Geometry::Polyline(cw));
        let mut rng = StdRng::seed_from_u64(7);

        let geometry = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .with_depth(pinned_depth())
            .execute(&mut scene, &mut rng)
            .unwrap();

        match &scene.object(geometry.loft).unwrap().geometry {
            Geometry::Ruled(ruled) => {
                assert!(windings_match(&ruled.start, &ruled.end));
                // Seam aligned: the bottom rail starts at the vertex closest
                // to the offset boundary's start (1, 1, 0).
                let seam = ruled.end[0];
                assert!((seam - p(0.0, 0.0, -1.0)).norm() < TOLERANCE);
            }
            other => panic!("expected ruled surface, got {other:?}"),
        }
    }

    // ── cleanup ──

    #[test]
    fn consumed_curves_are_deleted_and_outputs_persist() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let item = square_item(&mut scene);
        let inputs = item.consumed_ids();
        let mut rng = StdRng::seed_from_u64(7);

        let geometry = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut scene, &mut rng)
            .unwrap();

        for id in inputs {
            assert!(!scene.exists(id), "input curve leaked");
        }
        // Persisted: loft + one wall + one cap.
        assert_eq!(scene.object_count(), 3);
        assert!(scene.exists(geometry.loft));
        assert!(scene.exists(geometry.walls[0]));
        assert!(scene.exists(geometry.caps[0]));
    }

    #[test]
    fn failed_item_leaves_no_trace() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let mut item = square_item(&mut scene);
        for id in item.crack_polys.drain(..) {
            scene.delete(id);
        }
        let inputs = item.consumed_ids();
        let mut rng = StdRng::seed_from_u64(7);

        let err = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut scene, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::FissuraError::Operation(OperationError::EmptyCrackGroup { .. })
        ));
        for id in inputs {
            assert!(!scene.exists(id), "input curve leaked after failure");
        }
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn missing_severity_layer_is_fatal_for_the_item() {
        let mut scene = SceneStore::new();
        let item = square_item(&mut scene);
        let mut rng = StdRng::seed_from_u64(7);

        let err = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut scene, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::FissuraError::Operation(OperationError::MissingLayer { .. })
        ));
        assert_eq!(scene.object_count(), 0);
    }

    // ── layers ──

    #[test]
    fn crack_geometry_lands_on_the_severity_layer() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let item = square_item(&mut scene);
        let mut rng = StdRng::seed_from_u64(7);

        CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut scene, &mut rng)
            .unwrap();

        assert_eq!(scene.objects_on_layer("crack_CS1").len(), 3);
    }

    #[test]
    fn inner_and_diff_geometry_lands_on_the_structural_layer() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let mut item = square_item(&mut scene);
        item.inside_polys = vec![scene.add(Geometry::Polyline(square(3.0, 4.0, 0.0)))];
        item.diff_polys = vec![scene.add(Geometry::Polyline(square(6.0, 7.0, 0.0)))];
        let mut rng = StdRng::seed_from_u64(7);

        let geometry = CrackExtruder::new(item)
            .with_inward(Vector3::new(0.0, 0.0, -1.0))
            .execute(&mut scene, &mut rng)
            .unwrap();

        assert_eq!(geometry.inner_walls.len(), 2);
        assert_eq!(geometry.inner_caps.len(), 2);
        assert_eq!(geometry.diff_refs.len(), 1);
        // 2 walls + 2 caps + 1 reference surface on the structural layer.
        assert_eq!(scene.objects_on_layer(STRUCTURAL_LAYER).len(), 5);
    }

    // ── inward fallback ──

    #[test]
    fn origin_fallback_points_into_the_solid() {
        // Base boundary on the z = +5 plane of an origin-centred solid:
        // the inward direction must be −z.
        let dir = inward_toward_origin(&square(-1.0, 1.0, 5.0)).unwrap();
        assert!((dir - Vector3::new(0.0, 0.0, -1.0)).norm() < TOLERANCE);

        // And +z from the opposite face.
        let dir = inward_toward_origin(&square(-1.0, 1.0, -5.0)).unwrap();
        assert!((dir - Vector3::new(0.0, 0.0, 1.0)).norm() < TOLERANCE);
    }
}
