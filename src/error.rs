use thiserror::Error;

use crate::frame::FaceDirection;

/// Top-level error type for the Fissura defect-geometry kernel.
#[derive(Debug, Error)]
pub enum FissuraError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Errors raised while ingesting a per-face defect record.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("defect record is missing required field \"{field}\"")]
    MissingField { field: &'static str },

    #[error("defect record must carry a non-zero width_px or height_px")]
    InvalidDimensions,

    #[error("unknown severity tag \"{tag}\"")]
    UnknownSeverity { tag: String },

    #[error(
        "mismatch in contour family lengths: contours {contours}, base {base}, \
         erode {erode}, diff {diff}, severities {severities}"
    )]
    ContourCountMismatch {
        contours: usize,
        base: usize,
        erode: usize,
        diff: usize,
        severities: usize,
    },

    #[error("malformed record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("unknown face \"{label}\": use +x, -x, +y, -y, +z, -z")]
    UnknownFace { label: String },

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the scene object store.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene object not found: {0}")]
    ObjectNotFound(&'static str),

    #[error("scene object is not a {expected}")]
    KindMismatch { expected: &'static str },

    #[error("layer not found: {0}")]
    LayerNotFound(String),
}

/// Errors related to geometry operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("crack group {group} on face {face} has no crack contours")]
    EmptyCrackGroup { face: FaceDirection, group: usize },

    #[error("failed to offset the base boundary of group {group} on face {face}")]
    OffsetFailure { face: FaceDirection, group: usize },

    #[error("group {group} on face {face} has a degenerate boundary")]
    DegenerateGroup { face: FaceDirection, group: usize },

    #[error("layer \"{layer}\" does not exist; run the preparation step first")]
    MissingLayer { layer: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation failed: {0}")]
    Failed(String),
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("tessellation failed: {0}")]
    Failed(String),

    #[error("{0} geometry cannot be tessellated")]
    Unsupported(&'static str),
}

/// Convenience type alias for results using [`FissuraError`].
pub type Result<T> = std::result::Result<T, FissuraError>;
