use crate::error::{OperationError, Result};
use crate::math::Point3;
use crate::scene::{Geometry, ObjectId, RuledSurface, SceneStore};

/// Builds a ruled transition surface between two closed boundary curves.
///
/// The caller is responsible for winding and seam alignment of the rails;
/// the crack pipeline matches the bottom curve to the offset boundary
/// before lofting so the surface does not twist.
pub struct LoftCurves {
    start: Vec<Point3>,
    end: Vec<Point3>,
}

impl LoftCurves {
    /// Creates a new `LoftCurves` operation.
    #[must_use]
    pub fn new(start: Vec<Point3>, end: Vec<Point3>) -> Self {
        Self { start, end }
    }

    /// Executes the loft, adding the ruled surface to the scene.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if either rail has fewer
    /// than 3 vertices.
    pub fn execute(self, scene: &mut SceneStore) -> Result<ObjectId> {
        if self.start.len() < 3 || self.end.len() < 3 {
            return Err(OperationError::InvalidInput(format!(
                "loft rails need at least 3 vertices each, got {} and {}",
                self.start.len(),
                self.end.len()
            ))
            .into());
        }

        Ok(scene.add(Geometry::Ruled(RuledSurface {
            start: self.start,
            end: self.end,
        })))
    }
}
