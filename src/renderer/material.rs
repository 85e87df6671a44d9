// renderer/material.rs
use super::surface::BindGroupId;
use std::collections::HashMap;

/// Named per-item GPU state applied under an effect.
///
/// The property buffer behind `bind_group` is uploaded by the content side;
/// a material only says which group to bind and where its constants live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    name: String,
    bind_group: BindGroupId,
    constants_offset: Option<u32>,
}

impl Material {
    pub fn new(name: impl Into<String>, bind_group: BindGroupId) -> Self {
        Self {
            name: name.into(),
            bind_group,
            constants_offset: None,
        }
    }

    /// Dynamic offset of this material's constants inside a shared uniform buffer.
    pub fn with_constants_offset(mut self, offset: u32) -> Self {
        self.constants_offset = Some(offset);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bind_group(&self) -> BindGroupId {
        self.bind_group
    }

    pub fn dynamic_offsets(&self) -> &[u32] {
        self.constants_offset.as_slice()
    }
}

/// An effect's materials, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct MaterialTable {
    materials: HashMap<String, Material>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a material, replacing one with the same name.
    pub fn insert(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.name.clone(), material)
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.materials.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Material names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Handle;

    #[test]
    fn insert_replaces_by_name() {
        let mut table = MaterialTable::new();
        assert!(table.insert(Material::new("steel", Handle::new(1))).is_none());
        let previous = table.insert(Material::new("steel", Handle::new(2)));

        assert_eq!(previous.map(|m| m.bind_group()), Some(Handle::new(1)));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("steel").map(Material::bind_group), Some(Handle::new(2)));
    }

    #[test]
    fn constants_offset_becomes_dynamic_offset() {
        let plain = Material::new("plain", Handle::new(0));
        let offset = Material::new("offset", Handle::new(0)).with_constants_offset(512);

        assert!(plain.dynamic_offsets().is_empty());
        assert_eq!(offset.dynamic_offsets(), &[512]);
    }

    #[test]
    fn names_are_sorted() {
        let mut table = MaterialTable::new();
        table.insert(Material::new("wood", Handle::new(0)));
        table.insert(Material::new("brick", Handle::new(1)));
        assert_eq!(table.names(), ["brick", "wood"]);
    }
}
