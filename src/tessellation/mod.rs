//! Triangle meshing of the persisted geometry, for handoff to the
//! downstream rendering stage.

mod region;
mod sweep;

pub use region::TessellateRegion;
pub use sweep::{TessellateExtrusion, TessellateRuled};

use crate::error::{Result, TessellationError};
use crate::math::{Point3, Vector3};
use crate::scene::{Geometry, ObjectId, SceneStore};

/// A triangle mesh approximation of a surface.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Total area of all triangles.
    #[must_use]
    pub fn area(&self) -> f64 {
        let mut total = 0.0;
        for tri in &self.indices {
            let v0 = self.vertices[tri[0] as usize];
            let v1 = self.vertices[tri[1] as usize];
            let v2 = self.vertices[tri[2] as usize];
            total += (v1 - v0).cross(&(v2 - v0)).norm() * 0.5;
        }
        total
    }
}

/// Meshes any meshable scene object.
///
/// # Errors
///
/// Returns an error if the object is missing, is a bare polyline (nothing
/// to mesh), or its triangulation fails.
pub fn tessellate_object(scene: &SceneStore, id: ObjectId) -> Result<TriangleMesh> {
    match &scene.object(id)?.geometry {
        Geometry::Region(region) => TessellateRegion::new(region).execute(),
        Geometry::Ruled(ruled) => TessellateRuled::new(ruled).execute(),
        Geometry::Extrusion(extrusion) => TessellateExtrusion::new(extrusion).execute(),
        Geometry::Polyline(_) => Err(TessellationError::Unsupported("polyline").into()),
    }
}
