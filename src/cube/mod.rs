//! Cube assembly: sequences per-face ingestion, embedding, splitting and
//! extrusion, and aggregates the results.

mod assembler;

pub use assembler::{
    BuildConfig, CubeAssembler, CubeBuild, FaceFailure, FaceResult, FaceStage, SkippedGroup,
};
