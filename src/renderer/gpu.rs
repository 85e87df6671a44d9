// renderer/gpu.rs
use crate::asset::AssetCache;
use crate::renderer::surface::{
    BindGroupId, BufferId, CommandList, PipelineId, RecordingSurface, SubmissionQueue,
};
use std::ops::Range;

/// wgpu objects referenced by recorded commands.
///
/// Commands carry handles; only the thread that owns the pass resolves them.
#[derive(Default)]
pub struct GpuResources {
    pipelines: AssetCache<wgpu::RenderPipeline>,
    bind_groups: AssetCache<wgpu::BindGroup>,
    buffers: AssetCache<wgpu::Buffer>,
}

impl GpuResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pipeline(&mut self, pipeline: wgpu::RenderPipeline) -> PipelineId {
        self.pipelines.insert(pipeline)
    }

    pub fn add_bind_group(&mut self, group: wgpu::BindGroup) -> BindGroupId {
        self.bind_groups.insert(group)
    }

    pub fn add_buffer(&mut self, buffer: wgpu::Buffer) -> BufferId {
        self.buffers.insert(buffer)
    }

    pub fn pipeline(&self, id: PipelineId) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(id)
    }

    pub fn bind_group(&self, id: BindGroupId) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(id)
    }

    pub fn buffer(&self, id: BufferId) -> Option<&wgpu::Buffer> {
        self.buffers.get(id)
    }
}

/// Tracks which parts of the bound draw state came from unknown handles.
///
/// A draw is only issued while every slot it depends on holds a resolved
/// resource. Rebinding a slot with a valid handle clears that slot.
/// Slots are assumed to be below 32, which covers wgpu's bind-group and
/// vertex-buffer limits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct DrawValidity {
    pipeline_invalid: bool,
    index_invalid: bool,
    invalid_groups: u32,
    invalid_vertex_slots: u32,
}

impl DrawValidity {
    fn pipeline(&mut self, valid: bool) {
        self.pipeline_invalid = !valid;
    }

    fn index_buffer(&mut self, valid: bool) {
        self.index_invalid = !valid;
    }

    fn bind_group(&mut self, index: u32, valid: bool) {
        set_bit(&mut self.invalid_groups, index, !valid);
    }

    fn vertex_buffer(&mut self, slot: u32, valid: bool) {
        set_bit(&mut self.invalid_vertex_slots, slot, !valid);
    }

    fn can_draw(&self) -> bool {
        !self.pipeline_invalid
            && !self.index_invalid
            && self.invalid_groups == 0
            && self.invalid_vertex_slots == 0
    }
}

fn set_bit(mask: &mut u32, index: u32, on: bool) {
    let bit = 1u32 << (index % 32);
    if on {
        *mask |= bit;
    } else {
        *mask &= !bit;
    }
}

/// [`SubmissionQueue`] over an open render pass.
///
/// Direct recording goes straight into the pass; command lists are replayed
/// into it in the order they are executed. A command naming an unknown handle
/// is skipped with a warning, and so is every draw that would depend on it
/// until the slot is rebound.
pub struct PassQueue<'a, 'pass> {
    pass: &'a mut wgpu::RenderPass<'pass>,
    resources: &'a GpuResources,
    validity: DrawValidity,
    executed_lists: usize,
    skipped_draws: usize,
}

impl<'a, 'pass> PassQueue<'a, 'pass> {
    pub fn new(pass: &'a mut wgpu::RenderPass<'pass>, resources: &'a GpuResources) -> Self {
        Self {
            pass,
            resources,
            validity: DrawValidity::default(),
            executed_lists: 0,
            skipped_draws: 0,
        }
    }

    /// Command lists replayed into the pass so far.
    pub fn executed_lists(&self) -> usize {
        self.executed_lists
    }

    /// Draws dropped because their state referenced an unknown handle.
    pub fn skipped_draws(&self) -> usize {
        self.skipped_draws
    }
}

impl RecordingSurface for PassQueue<'_, '_> {
    fn set_pipeline(&mut self, pipeline: PipelineId) {
        let resolved = self.resources.pipeline(pipeline);
        self.validity.pipeline(resolved.is_some());
        match resolved {
            Some(pipeline) => self.pass.set_pipeline(pipeline),
            None => log::warn!("Skipping invalid pipeline handle {:?}", pipeline),
        }
    }

    fn set_bind_group(&mut self, index: u32, group: BindGroupId, offsets: &[u32]) {
        let resolved = self.resources.bind_group(group);
        self.validity.bind_group(index, resolved.is_some());
        match resolved {
            Some(bind_group) => self.pass.set_bind_group(index, bind_group, offsets),
            None => log::warn!("Skipping invalid bind group handle {:?}", group),
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        let resolved = self.resources.buffer(buffer);
        self.validity.vertex_buffer(slot, resolved.is_some());
        match resolved {
            Some(vertex_buffer) => self.pass.set_vertex_buffer(slot, vertex_buffer.slice(..)),
            None => log::warn!("Skipping invalid vertex buffer handle {:?}", buffer),
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferId, format: wgpu::IndexFormat) {
        let resolved = self.resources.buffer(buffer);
        self.validity.index_buffer(resolved.is_some());
        match resolved {
            Some(index_buffer) => self.pass.set_index_buffer(index_buffer.slice(..), format),
            None => log::warn!("Skipping invalid index buffer handle {:?}", buffer),
        }
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        if !self.validity.can_draw() {
            self.skipped_draws += 1;
            log::warn!("Skipping draw with invalid bound state");
            return;
        }
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}

impl SubmissionQueue for PassQueue<'_, '_> {
    fn direct(&mut self) -> &mut dyn RecordingSurface {
        self
    }

    fn execute(&mut self, list: CommandList) {
        list.replay(self);
        self.executed_lists += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Handle;

    #[test]
    fn unknown_handles_resolve_to_none() {
        let resources = GpuResources::new();
        assert!(resources.pipeline(Handle::new(0)).is_none());
        assert!(resources.bind_group(Handle::new(3)).is_none());
        assert!(resources.buffer(Handle::new(1)).is_none());
    }

    #[test]
    fn fresh_state_allows_drawing() {
        assert!(DrawValidity::default().can_draw());
    }

    #[test]
    fn invalid_pipeline_blocks_draws_until_rebound() {
        let mut validity = DrawValidity::default();
        validity.pipeline(false);
        assert!(!validity.can_draw());

        validity.pipeline(true);
        assert!(validity.can_draw());
    }

    #[test]
    fn each_slot_is_tracked_separately() {
        let mut validity = DrawValidity::default();
        validity.bind_group(0, false);
        validity.bind_group(2, false);
        validity.bind_group(0, true);
        assert!(!validity.can_draw());

        validity.bind_group(2, true);
        assert!(validity.can_draw());

        validity.vertex_buffer(1, false);
        validity.vertex_buffer(0, true);
        assert!(!validity.can_draw());
        validity.vertex_buffer(1, true);
        assert!(validity.can_draw());
    }

    #[test]
    fn invalid_index_buffer_blocks_draws() {
        let mut validity = DrawValidity::default();
        validity.index_buffer(false);
        assert!(!validity.can_draw());
        validity.index_buffer(true);
        assert!(validity.can_draw());
    }

    #[test]
    fn bad_geometry_handle_skips_only_that_draw() {
        let resources = GpuResources::new();
        let mut validity = DrawValidity::default();
        let geometry_ok = |id: BufferId| resources.buffer(id).is_some();

        // Nothing is registered, so every buffer handle is unknown.
        validity.vertex_buffer(0, geometry_ok(Handle::new(0)));
        validity.index_buffer(geometry_ok(Handle::new(1)));
        assert!(!validity.can_draw());

        validity.vertex_buffer(0, true);
        validity.index_buffer(true);
        assert!(validity.can_draw());
    }
}
