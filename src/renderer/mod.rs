pub mod batch;
pub mod camera;
pub mod capture;
pub mod effect;
pub mod error;
pub mod gpu;
pub mod material;
pub mod mode;
pub mod partition;
pub mod renderer;
pub mod surface;

mod internal;

pub use batch::{DrawableItem, FrameBatches, Geometry, RenderBatch};
pub use camera::{BoundingSphere, Frustum};
pub use capture::{CaptureQueue, Submission, SubmissionSource};
pub use effect::{Effect, EffectBuilder, EffectKind, EffectState};
pub use error::{ErrorKind, RenderError, Result};
pub use gpu::{GpuResources, PassQueue};
pub use material::{Material, MaterialTable};
pub use mode::RenderMode;
pub use partition::{partition, Slice};
pub use renderer::{FrameRenderer, FrameStats};
pub use surface::{
    BindGroupId, BufferId, CommandList, CommandRecorder, LiveResources, PipelineId,
    RecordingSurface, RenderCommand, SubmissionQueue,
};
