use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, TOLERANCE};

/// Computes the unit normal of a closed polygon using Newell's method.
///
/// # Errors
///
/// Returns [`GeometryError::Degenerate`] if the polygon has no usable normal
/// (fewer than three vertices or collinear points).
pub fn newell_normal(points: &[Point3]) -> Result<Vector3> {
    let n = points.len();
    let mut normal = Vector3::new(0.0, 0.0, 0.0);
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    let len = normal.norm();
    if len < TOLERANCE {
        return Err(GeometryError::Degenerate("polygon has no usable normal".into()).into());
    }
    Ok(normal / len)
}

/// Computes the area of a closed 3D polygon (coplanar points).
///
/// Uses the cross-product summation method projected along the polygon normal.
#[must_use]
pub fn polygon_area_3d(points: &[Point3], normal: &Vector3) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let n = points.len();
    let mut cross_sum = Vector3::new(0.0, 0.0, 0.0);
    let o = &points[0];
    for i in 1..n {
        let a = points[i] - o;
        let b = points[(i + 1) % n] - o;
        cross_sum += a.cross(&b);
    }
    0.5 * cross_sum.dot(normal).abs()
}

/// Returns the mean of the polygon's vertices.
#[must_use]
pub fn vertex_centroid(points: &[Point3]) -> Point3 {
    let mut sum = Vector3::new(0.0, 0.0, 0.0);
    for p in points {
        sum += p.coords;
    }
    #[allow(clippy::cast_precision_loss)]
    let count = points.len().max(1) as f64;
    Point3::from(sum / count)
}

/// Returns a copy of the polygon translated by `offset`.
#[must_use]
pub fn translate_polygon(points: &[Point3], offset: Vector3) -> Vec<Point3> {
    points.iter().map(|p| p + offset).collect()
}

/// Whether two closed coplanar polygons travel in the same winding direction.
///
/// Compares their Newell normals; degenerate inputs count as matching so the
/// caller's orientation fixup becomes a no-op.
#[must_use]
pub fn windings_match(a: &[Point3], b: &[Point3]) -> bool {
    match (newell_normal(a), newell_normal(b)) {
        (Ok(na), Ok(nb)) => na.dot(&nb) >= 0.0,
        _ => true,
    }
}

/// Rotates a closed polygon so it starts at the vertex closest to `target`.
///
/// Used for seam alignment: lofting two closed boundaries without twisting
/// requires their parameterizations to start at matching points.
#[must_use]
pub fn align_seam_to(points: &[Point3], target: &Point3) -> Vec<Point3> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let mut best = 0;
    let mut best_dist = (points[0] - target).norm_squared();
    for (i, pt) in points.iter().enumerate().skip(1) {
        let dist = (pt - target).norm_squared();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    if best == 0 {
        return points.to_vec();
    }
    let mut rotated = Vec::with_capacity(points.len());
    rotated.extend_from_slice(&points[best..]);
    rotated.extend_from_slice(&points[..best]);
    rotated
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    // ── newell_normal ──

    #[test]
    fn ccw_square_normal_is_plus_z() {
        let n = newell_normal(&unit_square()).unwrap();
        assert!((n - v(0.0, 0.0, 1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn cw_square_normal_is_minus_z() {
        let reversed: Vec<Point3> = unit_square().into_iter().rev().collect();
        let n = newell_normal(&reversed).unwrap();
        assert!((n - v(0.0, 0.0, -1.0)).norm() < TOLERANCE);
    }

    #[test]
    fn collinear_points_have_no_normal() {
        let pts = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)];
        assert!(newell_normal(&pts).is_err());
    }

    // ── polygon_area_3d ──

    #[test]
    fn unit_square_area() {
        let area = polygon_area_3d(&unit_square(), &v(0.0, 0.0, 1.0));
        assert!((area - 1.0).abs() < TOLERANCE);
    }

    #[test]
    fn triangle_area() {
        let tri = vec![p(0.0, 0.0, 0.0), p(4.0, 0.0, 0.0), p(0.0, 3.0, 0.0)];
        let area = polygon_area_3d(&tri, &v(0.0, 0.0, 1.0));
        assert!((area - 6.0).abs() < TOLERANCE);
    }

    // ── windings_match ──

    #[test]
    fn same_winding_matches() {
        let a = unit_square();
        let b = translate_polygon(&a, v(0.0, 0.0, -2.0));
        assert!(windings_match(&a, &b));
    }

    #[test]
    fn opposite_winding_does_not_match() {
        let a = unit_square();
        let b: Vec<Point3> = a.iter().rev().copied().collect();
        assert!(!windings_match(&a, &b));
    }

    // ── align_seam_to ──

    #[test]
    fn seam_rotates_to_closest_vertex() {
        let square = unit_square();
        let aligned = align_seam_to(&square, &p(1.1, 1.1, 0.0));
        assert!((aligned[0] - p(1.0, 1.0, 0.0)).norm() < TOLERANCE);
        assert_eq!(aligned.len(), square.len());
    }

    #[test]
    fn seam_already_aligned_is_unchanged() {
        let square = unit_square();
        let aligned = align_seam_to(&square, &p(-0.5, -0.5, 0.0));
        assert_eq!(aligned, square);
    }

    // ── translate / centroid ──

    #[test]
    fn translate_shifts_every_vertex() {
        let moved = translate_polygon(&unit_square(), v(0.0, 0.0, 5.0));
        assert!(moved.iter().all(|pt| (pt.z - 5.0).abs() < TOLERANCE));
    }

    #[test]
    fn centroid_of_unit_square() {
        let c = vertex_centroid(&unit_square());
        assert!((c - p(0.5, 0.5, 0.0)).norm() < TOLERANCE);
    }
}
