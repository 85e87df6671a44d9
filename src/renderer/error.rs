//! Errors surfaced by frame dispatch.
//!
//! Every variant aborts the frame. Nothing here is retried: the caller of
//! [`FrameRenderer::render_screen`](super::FrameRenderer::render_screen)
//! decides whether to skip the frame or stop.
//!
//! Tearing down a recording surface while recorder tasks are outstanding is a
//! programming error and panics instead of producing a `RenderError`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Broad class of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Broken asset configuration (effect without materials, missing default).
    Configuration,
    /// A per-item lookup that cannot be satisfied.
    Resolution,
    /// Environment failures such as thread pool creation.
    Runtime,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("effect '{effect}' ({path}) has no materials")]
    EffectWithoutMaterials { effect: String, path: String },

    #[error("effect '{effect}' ({path}) has no default material '{material}'")]
    MissingDefaultMaterial {
        effect: String,
        path: String,
        material: String,
    },

    #[error("item '{item}' requests material '{material}', which effect '{effect}' does not define")]
    MaterialNotFound {
        item: String,
        material: String,
        effect: String,
    },

    #[error("effect '{effect}' ({path}) expects {expected} per-batch bind groups, got {actual}")]
    BatchLayoutMismatch {
        effect: String,
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("item '{item}' is drawn with effect '{item_effect}' but was batched under '{batch_effect}'")]
    EffectMismatch {
        item: String,
        item_effect: String,
        batch_effect: String,
    },

    #[error("failed to build recorder thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl RenderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EffectWithoutMaterials { .. }
            | Self::MissingDefaultMaterial { .. }
            | Self::BatchLayoutMismatch { .. } => ErrorKind::Configuration,
            Self::MaterialNotFound { .. } | Self::EffectMismatch { .. } => ErrorKind::Resolution,
            Self::ThreadPool(_) => ErrorKind::Runtime,
        }
    }
}
