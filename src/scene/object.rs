use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Plane, Point2, Point3, Vector3};

use super::layer::LayerId;

slotmap::new_key_type! {
    /// Unique identifier for an object in the scene store.
    pub struct ObjectId;
}

/// The geometric payload of a scene object.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// A closed polyline boundary (closure is implicit).
    Polyline(Vec<Point3>),
    /// A bounded planar region.
    Region(PlanarRegion),
    /// A ruled transition surface between two closed rails.
    Ruled(RuledSurface),
    /// A straight wall extrusion of a closed profile.
    Extrusion(Extrusion),
}

/// A planar region bounded by an outer polygon and optional hole polygons,
/// all coplanar with `plane`.
#[derive(Debug, Clone)]
pub struct PlanarRegion {
    pub plane: Plane,
    pub outer: Vec<Point3>,
    pub holes: Vec<Vec<Point3>>,
}

impl PlanarRegion {
    /// Creates a region without holes.
    #[must_use]
    pub fn new(plane: Plane, outer: Vec<Point3>) -> Self {
        Self {
            plane,
            outer,
            holes: Vec::new(),
        }
    }

    /// Projects a boundary into the region's UV space.
    #[must_use]
    pub fn project_boundary(&self, boundary: &[Point3]) -> Vec<Point2> {
        boundary.iter().map(|p| self.plane.project(p)).collect()
    }

    /// The enclosed area: outer boundary area minus hole areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        let outer = signed_area_2d(&self.project_boundary(&self.outer)).abs();
        let holes: f64 = self
            .holes
            .iter()
            .map(|h| signed_area_2d(&self.project_boundary(h)).abs())
            .sum();
        (outer - holes).max(0.0)
    }
}

/// A ruled surface between two closed boundary curves.
///
/// The rails must share winding direction and seam alignment; the surface
/// linearly interpolates between them by normalized arc length.
#[derive(Debug, Clone)]
pub struct RuledSurface {
    pub start: Vec<Point3>,
    pub end: Vec<Point3>,
}

/// A closed profile swept along a straight direction, producing the side
/// wall only (caps are separate planar regions).
#[derive(Debug, Clone)]
pub struct Extrusion {
    pub profile: Vec<Point3>,
    /// Unit sweep direction.
    pub direction: Vector3,
    pub length: f64,
}

/// A scene object: geometry plus document state (layer, visibility).
#[derive(Debug, Clone)]
pub struct Object {
    pub geometry: Geometry,
    pub layer: Option<LayerId>,
    pub visible: bool,
}

impl Object {
    /// Wraps a geometry payload as a visible, unlayered object.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            layer: None,
            visible: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Vector3, TOLERANCE};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn xy_plane() -> Plane {
        Plane::from_normal(p(0.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0)).unwrap()
    }

    #[test]
    fn region_area_subtracts_holes() {
        let outer = vec![
            p(0.0, 0.0, 0.0),
            p(10.0, 0.0, 0.0),
            p(10.0, 10.0, 0.0),
            p(0.0, 10.0, 0.0),
        ];
        let hole = vec![
            p(2.0, 2.0, 0.0),
            p(4.0, 2.0, 0.0),
            p(4.0, 4.0, 0.0),
            p(2.0, 4.0, 0.0),
        ];
        let mut region = PlanarRegion::new(xy_plane(), outer);
        region.holes.push(hole);
        assert!((region.area() - 96.0).abs() < TOLERANCE);
    }

    #[test]
    fn region_area_without_holes() {
        let outer = vec![
            p(0.0, 0.0, 0.0),
            p(4.0, 0.0, 0.0),
            p(4.0, 4.0, 0.0),
            p(0.0, 4.0, 0.0),
        ];
        let region = PlanarRegion::new(xy_plane(), outer);
        assert!((region.area() - 16.0).abs() < TOLERANCE);
    }
}
