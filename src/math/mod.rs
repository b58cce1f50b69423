pub mod plane;
pub mod polygon_2d;
pub mod polygon_3d;

pub use plane::Plane;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global model-scale tolerance for floating-point comparisons.
///
/// All coordinates are in millimetres; every boolean and geometric
/// comparison in the crate goes through this value.
pub const TOLERANCE: f64 = 1e-9;

/// Polygons with an absolute area below this are treated as degenerate.
pub const MIN_REGION_AREA: f64 = 1e-10;
