use crate::error::{OperationError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::scene::{Extrusion, Geometry, ObjectId, SceneStore};

/// Extrudes a closed profile straight along a direction, producing the
/// side wall of the swept volume.
///
/// Caps are intentionally separate: the crack pipeline closes the far end
/// with its own planar regions.
pub struct ExtrudeCurve {
    profile: Vec<Point3>,
    direction: Vector3,
    length: f64,
}

impl ExtrudeCurve {
    /// Creates a new `ExtrudeCurve` operation.
    #[must_use]
    pub fn new(profile: Vec<Point3>, direction: Vector3, length: f64) -> Self {
        Self {
            profile,
            direction,
            length,
        }
    }

    /// Executes the extrusion, adding the wall to the scene.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the profile has fewer
    /// than 3 vertices, the direction is zero-length, or the length is not
    /// positive.
    pub fn execute(self, scene: &mut SceneStore) -> Result<ObjectId> {
        if self.profile.len() < 3 {
            return Err(OperationError::InvalidInput(format!(
                "extrusion profile needs at least 3 vertices, got {}",
                self.profile.len()
            ))
            .into());
        }
        let dir_len = self.direction.norm();
        if dir_len < TOLERANCE {
            return Err(
                OperationError::InvalidInput("extrude direction must be non-zero".into()).into(),
            );
        }
        if self.length <= TOLERANCE {
            return Err(OperationError::InvalidInput(format!(
                "extrude length must be positive, got {}",
                self.length
            ))
            .into());
        }

        Ok(scene.add(Geometry::Extrusion(Extrusion {
            profile: self.profile,
            direction: self.direction / dir_len,
            length: self.length,
        })))
    }
}
