use crate::error::{GeometryError, OperationError, Result};
use crate::math::polygon_2d::signed_area_2d;
use crate::math::polygon_3d::{newell_normal, vertex_centroid};
use crate::math::{Plane, Point3, MIN_REGION_AREA};
use crate::scene::{Geometry, ObjectId, PlanarRegion, SceneStore};

/// Creates a planar surface bounded by a closed polygon.
///
/// The host analogue is building a planar surface from a closed polyline;
/// the result is the cutter / cap / reference-surface primitive the rest of
/// the pipeline works with.
pub struct MakePlanarRegion {
    boundary: Vec<Point3>,
    plane: Option<Plane>,
}

impl MakePlanarRegion {
    /// Creates a new `MakePlanarRegion` operation.
    #[must_use]
    pub fn new(boundary: Vec<Point3>) -> Self {
        Self {
            boundary,
            plane: None,
        }
    }

    /// Uses the given plane instead of deriving one from the boundary.
    ///
    /// Supplying the owning face's plane keeps UV projections consistent
    /// across every region taking part in one split.
    #[must_use]
    pub fn with_plane(mut self, plane: Plane) -> Self {
        self.plane = Some(plane);
        self
    }

    /// Executes the operation, adding the region to the scene.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a boundary with fewer
    /// than 3 vertices and [`GeometryError::Degenerate`] for a boundary
    /// enclosing no area.
    pub fn execute(self, scene: &mut SceneStore) -> Result<ObjectId> {
        if self.boundary.len() < 3 {
            return Err(OperationError::InvalidInput(format!(
                "planar region needs at least 3 boundary vertices, got {}",
                self.boundary.len()
            ))
            .into());
        }

        let plane = match self.plane {
            Some(plane) => plane,
            None => {
                let normal = newell_normal(&self.boundary)?;
                Plane::from_normal(vertex_centroid(&self.boundary), normal)?
            }
        };

        let region = PlanarRegion::new(plane, self.boundary);
        let area = signed_area_2d(&region.project_boundary(&region.outer)).abs();
        if area < MIN_REGION_AREA {
            return Err(GeometryError::Degenerate("region boundary encloses no area".into()).into());
        }

        Ok(scene.add(Geometry::Region(region)))
    }
}
