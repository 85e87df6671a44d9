// renderer/batch.rs
use super::camera::BoundingSphere;
use super::effect::Effect;
use super::surface::BufferId;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Everything one indexed draw call needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub vertex_buffer: BufferId,
    pub index_buffer: BufferId,
    pub index_format: wgpu::IndexFormat,
    pub indices: Range<u32>,
    pub base_vertex: i32,
    pub instances: Range<u32>,
}

impl Geometry {
    /// Single-instance draw over the first `index_count` indices.
    pub fn indexed(
        vertex_buffer: BufferId,
        index_buffer: BufferId,
        index_format: wgpu::IndexFormat,
        index_count: u32,
    ) -> Self {
        Self {
            vertex_buffer,
            index_buffer,
            index_format,
            indices: 0..index_count,
            base_vertex: 0,
            instances: 0..1,
        }
    }
}

/// A mesh to draw this frame. Owned by the scene; dispatch only reads it.
#[derive(Debug, Clone)]
pub struct DrawableItem {
    pub name: String,
    pub effect: Arc<Effect>,
    /// Material override. `None` draws with the default material.
    pub material: Option<String>,
    pub geometry: Geometry,
    pub bounds: Option<BoundingSphere>,
}

impl DrawableItem {
    pub fn new(name: impl Into<String>, effect: Arc<Effect>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            effect,
            material: None,
            geometry,
            bounds: None,
        }
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = Some(material.into());
        self
    }

    pub fn with_bounds(mut self, bounds: BoundingSphere) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

/// Ordered items sharing one effect.
#[derive(Debug, Clone)]
pub struct RenderBatch {
    pub effect: Arc<Effect>,
    pub items: Vec<DrawableItem>,
}

impl RenderBatch {
    pub fn new(effect: Arc<Effect>) -> Self {
        Self {
            effect,
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: DrawableItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The frame's effect → batch mapping.
///
/// Batches are keyed by effect instance, not by name: two variants of one
/// shader share a name but never a batch. Batches keep the order their
/// effect was first seen in; iteration is by index, never by hash order.
#[derive(Debug, Default)]
pub struct FrameBatches {
    batches: Vec<RenderBatch>,
    /// Effect address → batch index. Each address stays valid through the
    /// `Arc` its batch holds.
    lookup: HashMap<usize, usize>,
}

fn effect_key(effect: &Arc<Effect>) -> usize {
    Arc::as_ptr(effect) as usize
}

impl FrameBatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item to its effect's batch, opening the batch if needed.
    pub fn add(&mut self, item: DrawableItem) {
        let index = self.batch_index(&item.effect);
        self.batches[index].push(item);
    }

    /// Appends a pre-built batch. Items of an effect already present are
    /// appended to the existing batch.
    pub fn push_batch(&mut self, batch: RenderBatch) {
        let index = self.batch_index(&batch.effect);
        self.batches[index].items.extend(batch.items);
    }

    fn batch_index(&mut self, effect: &Arc<Effect>) -> usize {
        let key = effect_key(effect);
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }
        let index = self.batches.len();
        self.batches.push(RenderBatch::new(Arc::clone(effect)));
        self.lookup.insert(key, index);
        index
    }

    /// Forgets this frame's batches, keeping allocations for the next one.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.lookup.clear();
    }

    /// The batch opened for this exact effect instance.
    pub fn get(&self, effect: &Arc<Effect>) -> Option<&RenderBatch> {
        self.lookup
            .get(&effect_key(effect))
            .map(|&index| &self.batches[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderBatch> {
        self.batches.iter()
    }

    pub fn batches(&self) -> &[RenderBatch] {
        &self.batches
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn item_count(&self) -> usize {
        self.batches.iter().map(RenderBatch::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}
