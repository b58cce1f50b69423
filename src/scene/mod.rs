//! Object arena standing in for the host geometry document.
//!
//! Objects are created, layered, hidden and deleted through generational
//! ids, so stale handles surface as errors instead of dangling references.

pub mod layer;
pub mod object;

pub use layer::{prepare_defect_layers, Layer, LayerId, STRUCTURAL_LAYER};
pub use object::{Extrusion, Geometry, Object, ObjectId, PlanarRegion, RuledSurface};

use slotmap::SlotMap;

use crate::error::SceneError;
use crate::math::Point3;

/// Central arena that owns all scene objects and layers.
#[derive(Debug, Default)]
pub struct SceneStore {
    objects: SlotMap<ObjectId, Object>,
    layers: SlotMap<LayerId, Layer>,
}

impl SceneStore {
    /// Creates a new, empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Object operations ---

    /// Inserts a geometry payload as a new visible object and returns its ID.
    pub fn add(&mut self, geometry: Geometry) -> ObjectId {
        self.objects.insert(Object::new(geometry))
    }

    /// Returns a reference to the object, or an error if it was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found in the store.
    pub fn object(&self, id: ObjectId) -> Result<&Object, SceneError> {
        self.objects
            .get(id)
            .ok_or(SceneError::ObjectNotFound("object"))
    }

    /// Returns a mutable reference to the object, or an error if it was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found in the store.
    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut Object, SceneError> {
        self.objects
            .get_mut(id)
            .ok_or(SceneError::ObjectNotFound("object"))
    }

    /// Whether the id still refers to a live object.
    #[must_use]
    pub fn exists(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Deletes an object if it is still alive; returns whether it existed.
    pub fn delete(&mut self, id: ObjectId) -> bool {
        self.objects.remove(id).is_some()
    }

    /// Hides an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found in the store.
    pub fn hide(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.object_mut(id)?.visible = false;
        Ok(())
    }

    /// Makes an object visible again.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found in the store.
    pub fn show(&mut self, id: ObjectId) -> Result<(), SceneError> {
        self.object_mut(id)?.visible = true;
        Ok(())
    }

    /// The number of live objects (used by leak assertions in tests).
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Iterates over all live objects.
    pub fn iter_objects(&self) -> impl Iterator<Item = (ObjectId, &Object)> {
        self.objects.iter()
    }

    // --- Typed geometry accessors ---

    /// Returns the vertex list of a polyline object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or is not a polyline.
    pub fn polyline(&self, id: ObjectId) -> Result<&[Point3], SceneError> {
        match &self.object(id)?.geometry {
            Geometry::Polyline(points) => Ok(points),
            _ => Err(SceneError::KindMismatch {
                expected: "polyline",
            }),
        }
    }

    /// Returns the planar region payload of a region object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or is not a region.
    pub fn region(&self, id: ObjectId) -> Result<&PlanarRegion, SceneError> {
        match &self.object(id)?.geometry {
            Geometry::Region(region) => Ok(region),
            _ => Err(SceneError::KindMismatch { expected: "region" }),
        }
    }

    // --- Layer operations ---

    /// Creates a layer, or returns the existing one with the same name.
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        if let Some(id) = self.find_layer(&layer.name) {
            return id;
        }
        self.layers.insert(layer)
    }

    /// Looks a layer up by name.
    #[must_use]
    pub fn find_layer(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, layer)| layer.name == name)
            .map(|(id, _)| id)
    }

    /// Whether a layer with this name exists.
    #[must_use]
    pub fn has_layer(&self, name: &str) -> bool {
        self.find_layer(name).is_some()
    }

    /// Returns a reference to the layer data.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer is not found in the store.
    pub fn layer(&self, id: LayerId) -> Result<&Layer, SceneError> {
        self.layers
            .get(id)
            .ok_or(SceneError::ObjectNotFound("layer"))
    }

    /// The number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Moves an object onto the named layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or the layer does not exist.
    pub fn set_object_layer(&mut self, id: ObjectId, layer_name: &str) -> Result<(), SceneError> {
        let layer = self
            .find_layer(layer_name)
            .ok_or_else(|| SceneError::LayerNotFound(layer_name.into()))?;
        self.object_mut(id)?.layer = Some(layer);
        Ok(())
    }

    /// Collects the ids of all live objects on the named layer.
    #[must_use]
    pub fn objects_on_layer(&self, layer_name: &str) -> Vec<ObjectId> {
        let Some(layer) = self.find_layer(layer_name) else {
            return Vec::new();
        };
        self.objects
            .iter()
            .filter(|(_, obj)| obj.layer == Some(layer))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn triangle() -> Geometry {
        Geometry::Polyline(vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
        ])
    }

    #[test]
    fn deleted_objects_report_stale_ids() {
        let mut scene = SceneStore::new();
        let id = scene.add(triangle());
        assert!(scene.exists(id));
        assert!(scene.delete(id));
        assert!(!scene.exists(id));
        assert!(scene.object(id).is_err());
        // Deleting twice is a no-op, mirroring the host's IsObject guard.
        assert!(!scene.delete(id));
    }

    #[test]
    fn visibility_toggles() {
        let mut scene = SceneStore::new();
        let id = scene.add(triangle());
        scene.hide(id).unwrap();
        assert!(!scene.object(id).unwrap().visible);
        scene.show(id).unwrap();
        assert!(scene.object(id).unwrap().visible);
    }

    #[test]
    fn polyline_accessor_rejects_other_kinds() {
        let mut scene = SceneStore::new();
        let id = scene.add(Geometry::Extrusion(Extrusion {
            profile: vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            direction: crate::math::Vector3::new(0.0, 0.0, 1.0),
            length: 2.0,
        }));
        assert!(scene.polyline(id).is_err());
    }

    #[test]
    fn layer_assignment_requires_existing_layer() {
        let mut scene = SceneStore::new();
        let id = scene.add(triangle());
        assert!(scene.set_object_layer(id, "crack_CS1").is_err());

        scene.add_layer(Layer::new("crack_CS1"));
        scene.set_object_layer(id, "crack_CS1").unwrap();
        assert_eq!(scene.objects_on_layer("crack_CS1"), vec![id]);
    }

    #[test]
    fn add_layer_deduplicates_by_name() {
        let mut scene = SceneStore::new();
        let a = scene.add_layer(Layer::new("cube"));
        let b = scene.add_layer(Layer::new("cube"));
        assert_eq!(a, b);
        assert_eq!(scene.layer_count(), 1);
    }
}
