use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use tracing::warn;

use crate::error::Result;
use crate::math::polygon_2d::{ensure_ccw_2d, ensure_cw_2d, is_degenerate_2d};
use crate::math::{Plane, Point2, Point3};
use crate::scene::{Geometry, ObjectId, PlanarRegion, SceneStore};

/// Outcome of a region split.
#[derive(Debug, Clone, Copy)]
pub struct SplitOutcome {
    /// The retained outer face; the original id when no split happened.
    pub face: ObjectId,
    /// Whether the boolean split actually replaced the face.
    pub split: bool,
}

/// Removes a set of cutter regions from a base planar face and retains
/// only the dominant remaining fragment.
///
/// All cutters are applied in one batched boolean pass: cutters may be
/// mutually adjacent, and splitting one-by-one can produce inconsistent
/// topology. The split materializes both the remainder fragments (base
/// minus cutters) and the interior fragments (base intersect cutters), then
/// keeps the fragment of maximum area and discards the base, the cutters,
/// and every other fragment.
///
/// A split that yields no fragments is reported with a warning and the
/// original face is returned untouched.
pub struct SplitRegion {
    base: ObjectId,
    cutters: Vec<ObjectId>,
}

impl SplitRegion {
    /// Creates a new `SplitRegion` operation.
    #[must_use]
    pub fn new(base: ObjectId, cutters: Vec<ObjectId>) -> Self {
        Self { base, cutters }
    }

    /// Executes the split.
    ///
    /// # Errors
    ///
    /// Returns an error if the base face is missing or is not a planar
    /// region. Invalid cutters are skipped with a warning, not fatal.
    pub fn execute(self, scene: &mut SceneStore) -> Result<SplitOutcome> {
        if self.cutters.is_empty() {
            return Ok(SplitOutcome {
                face: self.base,
                split: false,
            });
        }

        let base_region = scene.region(self.base)?.clone();
        let plane = base_region.plane.clone();

        // Project every valid cutter into the base plane's UV space.
        let mut clip: Vec<Vec<[f64; 2]>> = Vec::new();
        for &cutter_id in &self.cutters {
            let outer_uv: Vec<Point2> = match scene.region(cutter_id) {
                Ok(region) => region.outer.iter().map(|p| plane.project(p)).collect(),
                Err(err) => {
                    warn!(%err, "skipping invalid cutter");
                    continue;
                }
            };
            if is_degenerate_2d(&outer_uv) {
                warn!("skipping degenerate cutter");
                continue;
            }
            clip.push(path(&ensure_ccw_2d(&outer_uv)));
        }

        if clip.is_empty() {
            warn!("no valid cutters; face left unsplit");
            return Ok(SplitOutcome {
                face: self.base,
                split: false,
            });
        }

        // One batched pass produces every fragment the host split would:
        // the remainder pieces and the cutter-interior pieces.
        let subject = region_paths(&base_region);
        let mut fragments = subject
            .clone()
            .overlay(&clip, OverlayRule::Difference, FillRule::EvenOdd);
        fragments.extend(subject.overlay(&clip, OverlayRule::Intersect, FillRule::EvenOdd));
        fragments.retain(|shape| !shape.is_empty() && shape[0].len() >= 3);

        if fragments.is_empty() {
            warn!("boolean split produced no fragments; face left unsplit");
            return Ok(SplitOutcome {
                face: self.base,
                split: false,
            });
        }

        let mut best = 0;
        let mut best_area = f64::NEG_INFINITY;
        for (i, shape) in fragments.iter().enumerate() {
            let area = shape_area(shape);
            if area > best_area {
                best = i;
                best_area = area;
            }
        }

        let winner = &fragments[best];
        let outer = lift(&plane, &winner[0]);
        let holes = winner[1..].iter().map(|c| lift(&plane, c)).collect();
        let face = scene.add(Geometry::Region(PlanarRegion {
            plane,
            outer,
            holes,
        }));

        scene.delete(self.base);
        for cutter in self.cutters {
            scene.delete(cutter);
        }

        Ok(SplitOutcome { face, split: true })
    }
}

/// Converts a UV polygon to the boolean backend's path format.
fn path(points: &[Point2]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

/// A region as backend paths: CCW outer boundary, CW holes.
fn region_paths(region: &PlanarRegion) -> Vec<Vec<[f64; 2]>> {
    let mut paths = Vec::with_capacity(1 + region.holes.len());
    paths.push(path(&ensure_ccw_2d(&region.project_boundary(&region.outer))));
    for hole in &region.holes {
        paths.push(path(&ensure_cw_2d(&region.project_boundary(hole))));
    }
    paths
}

/// Shoelace area of one backend path.
fn path_area(points: &[[f64; 2]]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i][0] * points[j][1] - points[j][0] * points[i][1];
    }
    (sum * 0.5).abs()
}

/// Enclosed area of one fragment shape: outer area minus hole areas.
fn shape_area(shape: &[Vec<[f64; 2]>]) -> f64 {
    let outer = path_area(&shape[0]);
    let holes: f64 = shape[1..].iter().map(|c| path_area(c)).sum();
    outer - holes
}

/// Lifts a backend path back onto the face plane.
fn lift(plane: &Plane, points: &[[f64; 2]]) -> Vec<Point3> {
    points
        .iter()
        .map(|p| plane.lift(&Point2::new(p[0], p[1])))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::MakePlanarRegion;

    /// The boolean backend quantizes coordinates onto an integer grid, so
    /// area assertions get a loose tolerance.
    const AREA_EPS: f64 = 1e-5;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(scene: &mut SceneStore, min: f64, max: f64) -> ObjectId {
        MakePlanarRegion::new(vec![
            p(min, min, 0.0),
            p(max, min, 0.0),
            p(max, max, 0.0),
            p(min, max, 0.0),
        ])
        .execute(scene)
        .unwrap()
    }

    #[test]
    fn zero_cutters_is_identity() {
        let mut scene = SceneStore::new();
        let face = square(&mut scene, 0.0, 10.0);
        let outcome = SplitRegion::new(face, vec![]).execute(&mut scene).unwrap();
        assert_eq!(outcome.face, face);
        assert!(!outcome.split);
        assert!(scene.exists(face));
    }

    #[test]
    fn interior_cutter_carves_a_hole() {
        let mut scene = SceneStore::new();
        let face = square(&mut scene, 0.0, 10.0);
        let cutter = square(&mut scene, 4.0, 6.0);

        let outcome = SplitRegion::new(face, vec![cutter])
            .execute(&mut scene)
            .unwrap();
        assert!(outcome.split);
        assert_ne!(outcome.face, face);

        let region = scene.region(outcome.face).unwrap();
        assert_eq!(region.holes.len(), 1);
        assert!((region.area() - 96.0).abs() < AREA_EPS);

        // The base and the cutter are discarded.
        assert!(!scene.exists(face));
        assert!(!scene.exists(cutter));
        assert_eq!(scene.object_count(), 1);
    }

    #[test]
    fn dominant_cutter_interior_wins_retention() {
        let mut scene = SceneStore::new();
        let face = square(&mut scene, 0.0, 10.0);
        // The cutter occupies 81% of the face; the interior fragment is the
        // largest piece and must be the one retained.
        let cutter = square(&mut scene, 0.5, 9.5);

        let outcome = SplitRegion::new(face, vec![cutter])
            .execute(&mut scene)
            .unwrap();
        let region = scene.region(outcome.face).unwrap();
        assert!((region.area() - 81.0).abs() < AREA_EPS);
    }

    #[test]
    fn two_cutters_carve_two_holes() {
        let mut scene = SceneStore::new();
        let face = square(&mut scene, 0.0, 10.0);
        let a = square(&mut scene, 1.0, 2.0);
        let b = square(&mut scene, 7.0, 8.0);

        let outcome = SplitRegion::new(face, vec![a, b])
            .execute(&mut scene)
            .unwrap();
        let region = scene.region(outcome.face).unwrap();
        assert_eq!(region.holes.len(), 2);
        assert!((region.area() - 98.0).abs() < AREA_EPS);
    }

    #[test]
    fn only_invalid_cutters_leaves_face_unsplit() {
        let mut scene = SceneStore::new();
        let face = square(&mut scene, 0.0, 10.0);
        let bogus = scene.add(Geometry::Polyline(vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
        ]));

        let outcome = SplitRegion::new(face, vec![bogus])
            .execute(&mut scene)
            .unwrap();
        assert_eq!(outcome.face, face);
        assert!(!outcome.split);
        assert!(scene.exists(face));
    }
}
