use crate::error::{Result, TessellationError};
use crate::math::{Point3, TOLERANCE};
use crate::scene::{Extrusion, RuledSurface};

use super::TriangleMesh;

/// Tessellates a ruled surface into a quad strip between its two rails.
///
/// Rails with differing vertex counts are resampled by normalized arc
/// length before being bridged.
pub struct TessellateRuled<'a> {
    surface: &'a RuledSurface,
}

impl<'a> TessellateRuled<'a> {
    /// Creates a new `TessellateRuled` operation.
    #[must_use]
    pub fn new(surface: &'a RuledSurface) -> Self {
        Self { surface }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if either rail has fewer than 3 vertices.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let samples = self.surface.start.len().max(self.surface.end.len());
        if self.surface.start.len() < 3 || self.surface.end.len() < 3 {
            return Err(
                TessellationError::Failed("ruled surface rails need at least 3 points".into())
                    .into(),
            );
        }

        let a = resample_closed(&self.surface.start, samples);
        let b = resample_closed(&self.surface.end, samples);

        let mut mesh = TriangleMesh::default();
        for i in 0..samples {
            let j = (i + 1) % samples;
            push_triangle(&mut mesh, a[i], a[j], b[j]);
            push_triangle(&mut mesh, a[i], b[j], b[i]);
        }
        Ok(mesh)
    }
}

/// Tessellates an extrusion's side wall: one quad per profile edge.
pub struct TessellateExtrusion<'a> {
    extrusion: &'a Extrusion,
}

impl<'a> TessellateExtrusion<'a> {
    /// Creates a new `TessellateExtrusion` operation.
    #[must_use]
    pub fn new(extrusion: &'a Extrusion) -> Self {
        Self { extrusion }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile has fewer than 3 vertices.
    pub fn execute(&self) -> Result<TriangleMesh> {
        let profile = &self.extrusion.profile;
        if profile.len() < 3 {
            return Err(
                TessellationError::Failed("extrusion profile needs at least 3 points".into())
                    .into(),
            );
        }

        let sweep = self.extrusion.direction * self.extrusion.length;
        let far: Vec<Point3> = profile.iter().map(|p| p + sweep).collect();

        let mut mesh = TriangleMesh::default();
        let n = profile.len();
        for i in 0..n {
            let j = (i + 1) % n;
            push_triangle(&mut mesh, profile[i], profile[j], far[j]);
            push_triangle(&mut mesh, profile[i], far[j], far[i]);
        }
        Ok(mesh)
    }
}

/// Appends a flat-shaded triangle, skipping degenerate ones.
#[allow(clippy::cast_possible_truncation)]
fn push_triangle(mesh: &mut TriangleMesh, a: Point3, b: Point3, c: Point3) {
    let normal = (b - a).cross(&(c - a));
    let len = normal.norm();
    if len < TOLERANCE {
        return;
    }
    let normal = normal / len;
    let base = mesh.vertices.len() as u32;
    mesh.vertices.extend([a, b, c]);
    mesh.normals.extend([normal, normal, normal]);
    mesh.indices.push([base, base + 1, base + 2]);
}

/// Resamples a closed polyline to `samples` points spaced evenly by arc
/// length. A polyline whose vertex spacing already matches is returned
/// with its original vertices.
fn resample_closed(points: &[Point3], samples: usize) -> Vec<Point3> {
    let n = points.len();
    let mut cum = Vec::with_capacity(n + 1);
    cum.push(0.0);
    let mut total = 0.0;
    for i in 0..n {
        total += (points[(i + 1) % n] - points[i]).norm();
        cum.push(total);
    }
    if total < TOLERANCE {
        return vec![points[0]; samples];
    }

    #[allow(clippy::cast_precision_loss)]
    let step = total / samples as f64;
    let mut out = Vec::with_capacity(samples);
    for j in 0..samples {
        #[allow(clippy::cast_precision_loss)]
        let target = step * j as f64;
        let seg = cum
            .partition_point(|&c| c <= target)
            .saturating_sub(1)
            .min(n - 1);
        let seg_len = cum[seg + 1] - cum[seg];
        let t = if seg_len < TOLERANCE {
            0.0
        } else {
            (target - cum[seg]) / seg_len
        };
        let p0 = points[seg];
        let p1 = points[(seg + 1) % n];
        out.push(p0 + (p1 - p0) * t);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::Vector3;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn square(z: f64) -> Vec<Point3> {
        vec![
            p(0.0, 0.0, z),
            p(1.0, 0.0, z),
            p(1.0, 1.0, z),
            p(0.0, 1.0, z),
        ]
    }

    #[test]
    fn ruled_wall_between_offset_squares_has_perimeter_area() {
        let surface = RuledSurface {
            start: square(0.0),
            end: square(-1.0),
        };
        let mesh = TessellateRuled::new(&surface).execute().unwrap();
        // Perimeter 4 swept over distance 1.
        assert_relative_eq!(mesh.area(), 4.0, epsilon = 1e-9);
    }

    #[test]
    fn ruled_rails_with_different_counts_are_bridged() {
        let mut dense = square(0.0);
        // Add a midpoint on the first edge; counts now differ (5 vs 4).
        dense.insert(1, p(0.5, 0.0, 0.0));
        let surface = RuledSurface {
            start: dense,
            end: square(-2.0),
        };
        let mesh = TessellateRuled::new(&surface).execute().unwrap();
        assert!(mesh.area() > 7.9);
    }

    #[test]
    fn extrusion_wall_area_is_perimeter_times_length() {
        let extrusion = Extrusion {
            profile: square(0.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
            length: 2.0,
        };
        let mesh = TessellateExtrusion::new(&extrusion).execute().unwrap();
        assert_relative_eq!(mesh.area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn resample_preserves_evenly_spaced_vertices() {
        let resampled = resample_closed(&square(0.0), 4);
        assert_eq!(resampled.len(), 4);
        for (original, sampled) in square(0.0).iter().zip(&resampled) {
            assert!((original - sampled).norm() < 1e-9);
        }
    }
}
