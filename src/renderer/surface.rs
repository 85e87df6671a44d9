// renderer/surface.rs
use crate::asset::Handle;
use crate::renderer::batch::Geometry;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub type PipelineId = Handle<wgpu::RenderPipeline>;
pub type BindGroupId = Handle<wgpu::BindGroup>;
pub type BufferId = Handle<wgpu::Buffer>;

/// A target GPU commands can be recorded into.
///
/// Implementations are used by one thread at a time. The direct surface of a
/// [`SubmissionQueue`] writes straight into the device's pass; a
/// [`CommandRecorder`] captures commands for later replay.
pub trait RecordingSurface {
    fn set_pipeline(&mut self, pipeline: PipelineId);

    fn set_bind_group(&mut self, index: u32, group: BindGroupId, offsets: &[u32]);

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId);

    fn set_index_buffer(&mut self, buffer: BufferId, format: wgpu::IndexFormat);

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);

    /// Binds the geometry buffers and issues its one indexed draw.
    fn draw_geometry(&mut self, geometry: &Geometry) {
        self.set_vertex_buffer(0, geometry.vertex_buffer);
        self.set_index_buffer(geometry.index_buffer, geometry.index_format);
        self.draw_indexed(
            geometry.indices.clone(),
            geometry.base_vertex,
            geometry.instances.clone(),
        );
    }
}

/// One recorded call on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    SetPipeline(PipelineId),
    SetBindGroup {
        index: u32,
        group: BindGroupId,
        offsets: Vec<u32>,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: BufferId,
    },
    SetIndexBuffer {
        buffer: BufferId,
        format: wgpu::IndexFormat,
    },
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
}

impl RenderCommand {
    pub fn replay(&self, surface: &mut dyn RecordingSurface) {
        match self {
            Self::SetPipeline(pipeline) => surface.set_pipeline(*pipeline),
            Self::SetBindGroup {
                index,
                group,
                offsets,
            } => surface.set_bind_group(*index, *group, offsets),
            Self::SetVertexBuffer { slot, buffer } => surface.set_vertex_buffer(*slot, *buffer),
            Self::SetIndexBuffer { buffer, format } => surface.set_index_buffer(*buffer, *format),
            Self::DrawIndexed {
                indices,
                base_vertex,
                instances,
            } => surface.draw_indexed(indices.clone(), *base_vertex, instances.clone()),
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawIndexed { .. })
    }
}

/// Counts of live recording resources, shared by everything one
/// [`FrameRenderer`](super::FrameRenderer) creates.
#[derive(Debug, Clone, Default)]
pub struct LiveResources {
    recorders: Arc<AtomicUsize>,
    command_lists: Arc<AtomicUsize>,
}

impl LiveResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorders(&self) -> usize {
        self.recorders.load(Ordering::Acquire)
    }

    pub fn command_lists(&self) -> usize {
        self.command_lists.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct LiveToken(Arc<AtomicUsize>);

impl LiveToken {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(counter))
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Deferred recording surface bound to one worker slot.
#[derive(Debug)]
pub struct CommandRecorder {
    slot: usize,
    commands: Vec<RenderCommand>,
    draw_count: usize,
    live: LiveResources,
    _token: LiveToken,
}

impl CommandRecorder {
    pub fn new(slot: usize, live: &LiveResources) -> Self {
        Self {
            slot,
            commands: Vec::new(),
            draw_count: 0,
            live: live.clone(),
            _token: LiveToken::acquire(&live.recorders),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn recorded(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Finalizes everything recorded so far into a [`CommandList`]. The
    /// recorder is left empty and can record the next slice.
    pub fn finish(&mut self) -> CommandList {
        let commands = std::mem::take(&mut self.commands).into_boxed_slice();
        let draw_count = std::mem::replace(&mut self.draw_count, 0);
        CommandList {
            slot: self.slot,
            commands,
            draw_count,
            _token: LiveToken::acquire(&self.live.command_lists),
        }
    }

    /// Drops a partial recording.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.draw_count = 0;
    }

    fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }
}

impl RecordingSurface for CommandRecorder {
    fn set_pipeline(&mut self, pipeline: PipelineId) {
        self.push(RenderCommand::SetPipeline(pipeline));
    }

    fn set_bind_group(&mut self, index: u32, group: BindGroupId, offsets: &[u32]) {
        self.push(RenderCommand::SetBindGroup {
            index,
            group,
            offsets: offsets.to_vec(),
        });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        self.push(RenderCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferId, format: wgpu::IndexFormat) {
        self.push(RenderCommand::SetIndexBuffer { buffer, format });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.draw_count += 1;
        self.push(RenderCommand::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
    }
}

/// Immutable capture of one recorder's commands.
///
/// Submitting takes the list by value; once executed it is gone.
#[derive(Debug)]
pub struct CommandList {
    slot: usize,
    commands: Box<[RenderCommand]>,
    draw_count: usize,
    _token: LiveToken,
}

impl CommandList {
    /// Worker slot whose recorder produced this list.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn replay(&self, surface: &mut dyn RecordingSurface) {
        for command in self.commands.iter() {
            command.replay(surface);
        }
    }
}

/// The device's primary execution queue for the frame being built.
///
/// Only the thread running the collector touches it.
pub trait SubmissionQueue {
    /// The queue's own surface. Immediate mode records straight into it.
    fn direct(&mut self) -> &mut dyn RecordingSurface;

    /// Executes a finalized list and disposes of it.
    fn execute(&mut self, list: CommandList);
}
