use crate::ingest::Severity;

use super::SceneStore;

slotmap::new_key_type! {
    /// Unique identifier for a layer in the scene store.
    pub struct LayerId;
}

/// Name of the structural layer that receives cube-side geometry
/// (nested non-crack islands and difference surfaces).
pub const STRUCTURAL_LAYER: &str = "cube";

/// A named layer, optionally carrying a render-material name consumed by
/// the downstream rendering stage.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    pub material: Option<String>,
}

impl Layer {
    /// Creates a layer with no render material.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            material: None,
        }
    }

    /// Attaches a render-material name.
    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }
}

/// Creates the layers the crack pipeline expects: one per severity class
/// plus the structural [`STRUCTURAL_LAYER`].
///
/// This is the external preparation step; the pipeline itself only looks
/// layers up and fails with `MissingLayer` when one is absent.
pub fn prepare_defect_layers(scene: &mut SceneStore) {
    for severity in Severity::ALL {
        scene.add_layer(Layer::new(severity.layer_name()));
    }
    scene.add_layer(Layer::new(STRUCTURAL_LAYER));
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn prepare_creates_all_severity_layers() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        assert!(scene.has_layer("crack_CS1"));
        assert!(scene.has_layer("crack_CS2"));
        assert!(scene.has_layer("crack_CS3"));
        assert!(scene.has_layer(STRUCTURAL_LAYER));
    }

    #[test]
    fn prepare_is_idempotent() {
        let mut scene = SceneStore::new();
        prepare_defect_layers(&mut scene);
        let count = scene.layer_count();
        prepare_defect_layers(&mut scene);
        assert_eq!(scene.layer_count(), count);
    }
}
