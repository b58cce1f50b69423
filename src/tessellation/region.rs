use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::FixedFaceHandle;
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::scene::PlanarRegion;

use super::TriangleMesh;

/// Tessellates a planar region (outer boundary plus holes) into a triangle
/// mesh using constrained Delaunay triangulation.
pub struct TessellateRegion<'a> {
    region: &'a PlanarRegion,
}

impl<'a> TessellateRegion<'a> {
    /// Creates a new `TessellateRegion` operation.
    #[must_use]
    pub fn new(region: &'a PlanarRegion) -> Self {
        Self { region }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary loop has fewer than 3 points or the
    /// triangulation rejects an insertion.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<TriangleMesh> {
        let plane = &self.region.plane;
        let normal = *plane.normal();

        let outer_2d: Vec<SpadePoint2<f64>> = self
            .region
            .outer
            .iter()
            .map(|p| {
                let uv = plane.project(p);
                SpadePoint2::new(uv.x, uv.y)
            })
            .collect();
        let hole_2d: Vec<Vec<SpadePoint2<f64>>> = self
            .region
            .holes
            .iter()
            .map(|hole| {
                hole.iter()
                    .map(|p| {
                        let uv = plane.project(p);
                        SpadePoint2::new(uv.x, uv.y)
                    })
                    .collect()
            })
            .collect();

        let mut cdt = ConstrainedDelaunayTriangulation::<SpadePoint2<f64>>::new();
        insert_constraint_loop(&mut cdt, &outer_2d)?;
        for hole in &hole_2d {
            insert_constraint_loop(&mut cdt, hole)?;
        }

        let interior_faces = classify_interior_faces(&cdt);

        let mut mesh = TriangleMesh::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();

        for face_handle in cdt.inner_faces() {
            let fix = face_handle.fix();
            if !interior_faces.contains(&fix.index()) {
                continue;
            }

            let verts = face_handle.vertices();
            let mut tri_indices = [0u32; 3];

            for (i, vh) in verts.iter().enumerate() {
                let idx = vh.fix().index();
                let mesh_idx = if let Some(&existing) = vertex_map.get(&idx) {
                    existing
                } else {
                    let pos = vh.position();
                    let p3 = plane.lift(&crate::math::Point2::new(pos.x, pos.y));
                    let new_idx = mesh.vertices.len() as u32;
                    mesh.vertices.push(p3);
                    mesh.normals.push(normal);
                    vertex_map.insert(idx, new_idx);
                    new_idx
                };
                tri_indices[i] = mesh_idx;
            }

            mesh.indices.push(tri_indices);
        }

        Ok(mesh)
    }
}

/// Inserts a closed boundary as constraint edges.
fn insert_constraint_loop(
    cdt: &mut ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
    points: &[SpadePoint2<f64>],
) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for &pt in points {
        let h = cdt
            .insert(pt)
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from != to {
            cdt.add_constraint(from, to);
        }
    }

    Ok(())
}

/// Flood-fills constraint-edge crossing parity to find the faces inside the
/// outer boundary but outside the holes.
fn classify_interior_faces(
    cdt: &ConstrainedDelaunayTriangulation<SpadePoint2<f64>>,
) -> HashSet<usize> {
    let mut interior = HashSet::new();
    let mut depth_map: HashMap<usize, u32> = HashMap::new();
    let mut queue: VecDeque<(FixedFaceHandle<spade::handles::InnerTag>, u32)> = VecDeque::new();

    let outer_fix = cdt.outer_face().fix();

    // Seed: inner faces adjacent to the outer face via directed edges
    for edge in cdt.directed_edges() {
        if edge.face().fix() == outer_fix {
            let rev_face = edge.rev().face();
            if let Some(inner) = rev_face.as_inner() {
                let idx = inner.fix().index();
                if depth_map.contains_key(&idx) {
                    continue;
                }
                let depth = u32::from(cdt.is_constraint_edge(edge.as_undirected().fix()));
                depth_map.insert(idx, depth);
                if depth % 2 == 1 {
                    interior.insert(idx);
                }
                queue.push_back((inner.fix(), depth));
            }
        }
    }

    // BFS flood-fill
    while let Some((face_fix, depth)) = queue.pop_front() {
        let face = cdt.face(face_fix);
        for edge in face.adjacent_edges() {
            let neighbor = edge.rev().face();
            if let Some(inner_neighbor) = neighbor.as_inner() {
                let n_idx = inner_neighbor.fix().index();
                if depth_map.contains_key(&n_idx) {
                    continue;
                }
                let new_depth = if cdt.is_constraint_edge(edge.as_undirected().fix()) {
                    depth + 1
                } else {
                    depth
                };
                depth_map.insert(n_idx, new_depth);
                if new_depth % 2 == 1 {
                    interior.insert(n_idx);
                }
                queue.push_back((inner_neighbor.fix(), new_depth));
            }
        }
    }

    interior
}
