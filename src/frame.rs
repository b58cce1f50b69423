//! Cube face planes and the 2D→3D embedding of defect-map coordinates.

use std::fmt;
use std::str::FromStr;

use crate::error::{FissuraError, GeometryError};
use crate::math::{Plane, Point2, Point3, Vector3};

/// One of the six cube face directions.
///
/// Each variant maps to a constant coordinate value `±half` on one world
/// axis; the remaining two axes receive the local (u, v) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceDirection {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl FaceDirection {
    /// The six directions in canonical processing order.
    pub const ALL: [FaceDirection; 6] = [
        FaceDirection::PosX,
        FaceDirection::NegX,
        FaceDirection::PosY,
        FaceDirection::NegY,
        FaceDirection::PosZ,
        FaceDirection::NegZ,
    ];

    /// The conventional short label, e.g. `"+x"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FaceDirection::PosX => "+x",
            FaceDirection::NegX => "-x",
            FaceDirection::PosY => "+y",
            FaceDirection::NegY => "-y",
            FaceDirection::PosZ => "+z",
            FaceDirection::NegZ => "-z",
        }
    }

    /// Unit normal pointing out of the cube through this face.
    #[must_use]
    pub fn outward_normal(self) -> Vector3 {
        match self {
            FaceDirection::PosX => Vector3::new(1.0, 0.0, 0.0),
            FaceDirection::NegX => Vector3::new(-1.0, 0.0, 0.0),
            FaceDirection::PosY => Vector3::new(0.0, 1.0, 0.0),
            FaceDirection::NegY => Vector3::new(0.0, -1.0, 0.0),
            FaceDirection::PosZ => Vector3::new(0.0, 0.0, 1.0),
            FaceDirection::NegZ => Vector3::new(0.0, 0.0, -1.0),
        }
    }

    /// Unit normal pointing from this face into the cube's interior.
    #[must_use]
    pub fn inward_normal(self) -> Vector3 {
        -self.outward_normal()
    }
}

impl fmt::Display for FaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FaceDirection {
    type Err = FissuraError;

    /// Parses an external face label such as `"+x"` or `"-z"`.
    ///
    /// Internal dispatch never goes through strings; this exists only for
    /// labels arriving from records or file names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+x" => Ok(FaceDirection::PosX),
            "-x" => Ok(FaceDirection::NegX),
            "+y" => Ok(FaceDirection::PosY),
            "-y" => Ok(FaceDirection::NegY),
            "+z" => Ok(FaceDirection::PosZ),
            "-z" => Ok(FaceDirection::NegZ),
            _ => Err(GeometryError::UnknownFace { label: s.into() }.into()),
        }
    }
}

/// The geometric frame of a cube with faces at distance `half` from the
/// origin (edge length `2 * half`).
///
/// A defect map's local coordinates have their origin at a face corner;
/// [`FaceFrame::center`] shifts them so `(0, 0)` lands on the face center
/// before embedding.
#[derive(Debug, Clone, Copy)]
pub struct FaceFrame {
    half: f64,
}

impl FaceFrame {
    /// Creates a frame for a cube with the given half-extent.
    #[must_use]
    pub fn new(half: f64) -> Self {
        Self { half }
    }

    /// Returns the half-extent (distance from origin to each face).
    #[must_use]
    pub fn half(&self) -> f64 {
        self.half
    }

    /// Shifts a corner-origin local coordinate so the face center is `(0, 0)`.
    #[must_use]
    pub fn center(&self, point: &Point2) -> Point2 {
        Point2::new(point.x - self.half, point.y - self.half)
    }

    /// Places a centered 2D point onto the named face plane.
    #[must_use]
    pub fn embed(&self, direction: FaceDirection, point: &Point2) -> Point3 {
        let half = self.half;
        let (u, v) = (point.x, point.y);
        match direction {
            FaceDirection::PosX => Point3::new(half, u, v),
            FaceDirection::NegX => Point3::new(-half, u, v),
            FaceDirection::PosY => Point3::new(u, half, v),
            FaceDirection::NegY => Point3::new(u, -half, v),
            FaceDirection::PosZ => Point3::new(u, v, half),
            FaceDirection::NegZ => Point3::new(u, v, -half),
        }
    }

    /// Projects the fixed axis out of an embedded point, recovering the
    /// centered 2D coordinate.
    #[must_use]
    pub fn project(&self, direction: FaceDirection, point: &Point3) -> Point2 {
        match direction {
            FaceDirection::PosX | FaceDirection::NegX => Point2::new(point.y, point.z),
            FaceDirection::PosY | FaceDirection::NegY => Point2::new(point.x, point.z),
            FaceDirection::PosZ | FaceDirection::NegZ => Point2::new(point.x, point.y),
        }
    }

    /// Returns the face plane with UV axes consistent with [`FaceFrame::embed`].
    ///
    /// # Errors
    ///
    /// Never fails for a finite half-extent; the `Result` comes from the
    /// shared [`Plane`] constructor.
    pub fn plane(&self, direction: FaceDirection) -> crate::error::Result<Plane> {
        let origin = self.embed(direction, &Point2::new(0.0, 0.0));
        let (u_dir, v_dir) = match direction {
            FaceDirection::PosX | FaceDirection::NegX => {
                (Vector3::new(0.0, 1.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
            }
            FaceDirection::PosY | FaceDirection::NegY => {
                (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 0.0, 1.0))
            }
            FaceDirection::PosZ | FaceDirection::NegZ => {
                (Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0))
            }
        };
        Plane::new(origin, u_dir, v_dir)
    }

    /// Returns the four corners of the full face quad.
    #[must_use]
    pub fn corners(&self, direction: FaceDirection) -> [Point3; 4] {
        let h = self.half;
        [
            self.embed(direction, &Point2::new(-h, -h)),
            self.embed(direction, &Point2::new(h, -h)),
            self.embed(direction, &Point2::new(h, h)),
            self.embed(direction, &Point2::new(-h, h)),
        ]
    }
}
