use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};

use crate::error::RenderError;
use crate::render::{ShaderProgram, Texture2d};
use crate::transform::{Transform, TransformLookup};

use super::object::SceneObject;

new_key_type! {
    /// Handle of an object in a scene. Stays valid until that object is
    /// removed or replaced.
    pub struct ObjectKey;
}

/// Name-addressed objects with stable handles.
///
/// Inserting under a name that is already taken replaces the old entry and
/// invalidates its handle.
#[derive(Debug, Clone)]
pub struct ObjectTable<T = SceneObject> {
    items: SlotMap<ObjectKey, T>,
    names: HashMap<String, ObjectKey>,
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self {
            items: SlotMap::with_key(),
            names: HashMap::new(),
        }
    }
}

impl<T> ObjectTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, item: T) -> ObjectKey {
        let name = name.into();
        if let Some(old) = self.names.remove(&name) {
            self.items.remove(old);
        }
        let key = self.items.insert(item);
        self.names.insert(name, key);
        key
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let key = self.names.remove(name)?;
        self.items.remove(key)
    }

    pub fn key(&self, name: &str) -> Option<ObjectKey> {
        self.names.get(name).copied()
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.items.get(self.key(name)?)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let key = self.key(name)?;
        self.items.get_mut(key)
    }

    pub fn by_key(&self, key: ObjectKey) -> Option<&T> {
        self.items.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &T)> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectKey, &mut T)> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: AsRef<Transform>> TransformLookup for ObjectTable<T> {
    fn transform(&self, key: ObjectKey) -> Option<&Transform> {
        self.items.get(key).map(AsRef::as_ref)
    }
}

/// Everything a scene owns, looked up by semantic name ("Box",
/// "ConeTracing", "Cornell").
#[derive(Default)]
pub struct Registry {
    pub objects: ObjectTable,
    programs: HashMap<String, ShaderProgram>,
    textures: HashMap<String, Texture2d>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_program(&mut self, name: impl Into<String>, program: ShaderProgram) {
        self.programs.insert(name.into(), program);
    }

    pub fn program(&self, name: &str) -> Result<&ShaderProgram, RenderError> {
        self.programs
            .get(name)
            .ok_or_else(|| RenderError::MissingProgram(name.to_owned()))
    }

    pub fn insert_texture(&mut self, name: impl Into<String>, texture: Texture2d) {
        self.textures.insert(name.into(), texture);
    }

    pub fn texture(&self, name: &str) -> Result<&Texture2d, RenderError> {
        self.textures
            .get(name)
            .ok_or_else(|| RenderError::MissingTexture(name.to_owned()))
    }

    pub fn has_texture(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;

    fn moved(x: f32) -> Transform {
        let mut t = Transform::new();
        t.translate(Vec3::new(x, 0.0, 0.0));
        t
    }

    // ── names ─────────────────────────────────────────────────────────────

    #[test]
    fn lookup_by_name_and_key_agree() {
        let mut table = ObjectTable::new();
        let key = table.insert("Box", moved(1.0));
        assert_eq!(table.key("Box"), Some(key));
        assert_eq!(table.get("Box"), table.by_key(key));
        assert!(table.get("Bunny").is_none());
    }

    #[test]
    fn reinserting_a_name_replaces_and_invalidates() {
        let mut table = ObjectTable::new();
        let old = table.insert("Ball", moved(1.0));
        let new = table.insert("Ball", moved(2.0));

        assert_ne!(old, new);
        assert_eq!(table.len(), 1);
        assert!(table.by_key(old).is_none());
        assert_eq!(
            table.get("Ball").map(Transform::local_model_transform),
            Some(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)))
        );
    }

    #[test]
    fn remove_frees_the_name() {
        let mut table = ObjectTable::new();
        let key = table.insert("Teapot", moved(0.0));
        assert!(table.remove("Teapot").is_some());
        assert!(table.is_empty());
        assert!(table.key("Teapot").is_none());
        assert!(table.by_key(key).is_none());
    }

    // ── transform lookup ──────────────────────────────────────────────────

    #[test]
    fn children_resolve_parents_through_the_table() {
        let mut table = ObjectTable::new();
        let parent = table.insert("Box", moved(1.0));
        let mut child = moved(2.0);
        child.set_parent(Some(parent));
        table.insert("Bunny", child);

        let model = table.get("Bunny").map(|c| c.model_transform(&table));
        assert_eq!(model, Some(Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0))));
    }

    #[test]
    fn replaced_parent_is_no_longer_followed() {
        let mut table = ObjectTable::new();
        let parent = table.insert("Box", moved(1.0));
        let mut child = moved(2.0);
        child.set_parent(Some(parent));
        table.insert("Bunny", child);
        table.insert("Box", moved(5.0));

        let model = table.get("Bunny").map(|c| c.model_transform(&table));
        assert_eq!(model, Some(Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0))));
    }

    // ── resources ─────────────────────────────────────────────────────────

    #[test]
    fn missing_resources_are_named_in_the_error() {
        let registry = Registry::new();
        match registry.program("ConeTracing") {
            Err(RenderError::MissingProgram(name)) => assert_eq!(name, "ConeTracing"),
            _ => panic!("expected MissingProgram"),
        }
        match registry.texture("Cornell") {
            Err(RenderError::MissingTexture(name)) => assert_eq!(name, "Cornell"),
            _ => panic!("expected MissingTexture"),
        }
        assert!(!registry.has_texture("Cornell"));
    }
}
