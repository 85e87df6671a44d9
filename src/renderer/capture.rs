// renderer/capture.rs
use super::surface::{
    BindGroupId, BufferId, CommandList, PipelineId, RecordingSurface, RenderCommand,
    SubmissionQueue,
};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSource {
    /// Commands recorded straight into the queue's own surface.
    Direct,
    /// A finalized command list from the given worker slot.
    CommandList { slot: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub sequence: u64,
    pub source: SubmissionSource,
    pub commands: Vec<RenderCommand>,
}

/// Headless [`SubmissionQueue`] that keeps everything it is given.
///
/// Consecutive direct commands share one `Direct` submission; every executed
/// command list gets its own. Sequence numbers increase strictly.
#[derive(Debug, Default)]
pub struct CaptureQueue {
    submissions: Vec<Submission>,
    next_sequence: u64,
}

impl CaptureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// All commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &RenderCommand> {
        self.submissions.iter().flat_map(|s| s.commands.iter())
    }

    pub fn draw_count(&self) -> usize {
        self.commands().filter(|c| c.is_draw()).count()
    }

    /// Slots of executed command lists, in submission order.
    pub fn submitted_slots(&self) -> Vec<usize> {
        self.submissions
            .iter()
            .filter_map(|s| match s.source {
                SubmissionSource::CommandList { slot } => Some(slot),
                SubmissionSource::Direct => None,
            })
            .collect()
    }

    /// Hands back everything captured so far and starts over. Sequence
    /// numbers keep increasing across calls.
    pub fn take(&mut self) -> Vec<Submission> {
        std::mem::take(&mut self.submissions)
    }

    fn open(&mut self, source: SubmissionSource) -> &mut Submission {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.submissions.push(Submission {
            sequence,
            source,
            commands: Vec::new(),
        });
        let last = self.submissions.len() - 1;
        &mut self.submissions[last]
    }

    fn push_direct(&mut self, command: RenderCommand) {
        let continues_direct = matches!(
            self.submissions.last(),
            Some(Submission {
                source: SubmissionSource::Direct,
                ..
            })
        );
        if continues_direct {
            let last = self.submissions.len() - 1;
            self.submissions[last].commands.push(command);
        } else {
            self.open(SubmissionSource::Direct).commands.push(command);
        }
    }
}

impl RecordingSurface for CaptureQueue {
    fn set_pipeline(&mut self, pipeline: PipelineId) {
        self.push_direct(RenderCommand::SetPipeline(pipeline));
    }

    fn set_bind_group(&mut self, index: u32, group: BindGroupId, offsets: &[u32]) {
        self.push_direct(RenderCommand::SetBindGroup {
            index,
            group,
            offsets: offsets.to_vec(),
        });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId) {
        self.push_direct(RenderCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferId, format: wgpu::IndexFormat) {
        self.push_direct(RenderCommand::SetIndexBuffer { buffer, format });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.push_direct(RenderCommand::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
    }
}

impl SubmissionQueue for CaptureQueue {
    fn direct(&mut self) -> &mut dyn RecordingSurface {
        self
    }

    fn execute(&mut self, list: CommandList) {
        let source = SubmissionSource::CommandList { slot: list.slot() };
        self.open(source).commands.extend_from_slice(list.commands());
    }
}
