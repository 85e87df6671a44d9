#![allow(dead_code)]

use frame_dispatch::asset::{ContentCache, Handle};
use frame_dispatch::renderer::{
    DrawableItem, Effect, EffectKind, FrameBatches, FrameRenderer, Geometry, Material,
    RenderCommand, RenderMode, RenderBatch,
};
use frame_dispatch::DispatchSettings;
use std::sync::Arc;

pub fn effect(name: &str, kind: EffectKind, pipeline: usize, materials: &[&str]) -> Arc<Effect> {
    let groups = (0..kind.batch_layout().len()).map(|i| Handle::new(pipeline * 10 + i));
    let effect = Effect::builder(name, kind, Handle::new(pipeline))
        .source_path(format!("shaders/{name}.wgsl"))
        .batch_bind_groups(groups)
        .materials(
            materials
                .iter()
                .enumerate()
                .map(|(i, material)| Material::new(*material, Handle::new(100 + i))),
        )
        .build()
        .unwrap();
    Arc::new(effect)
}

/// Item whose draw can be told apart from every other by its index count.
pub fn item(effect: &Arc<Effect>, id: u32) -> DrawableItem {
    let geometry = Geometry::indexed(Handle::new(0), Handle::new(1), wgpu::IndexFormat::Uint32, id + 1);
    DrawableItem::new(format!("{}-{id}", effect.name()), Arc::clone(effect), geometry)
}

pub fn batch(effect: &Arc<Effect>, ids: std::ops::Range<u32>) -> RenderBatch {
    let mut batch = RenderBatch::new(Arc::clone(effect));
    for id in ids {
        batch.push(item(effect, id));
    }
    batch
}

pub fn frame(batches: impl IntoIterator<Item = RenderBatch>) -> FrameBatches {
    let mut frame = FrameBatches::new();
    for batch in batches {
        frame.push_batch(batch);
    }
    frame
}

pub fn renderer(mode: RenderMode, max_workers: usize) -> FrameRenderer {
    let settings = DispatchSettings {
        max_workers,
        initial_mode: mode,
        thread_name_prefix: "it-recorder".into(),
        ..DispatchSettings::default()
    };
    FrameRenderer::new(settings, Arc::new(ContentCache::new()))
}

/// Ids of drawn items, in execution order.
pub fn drawn_ids<'a>(commands: impl Iterator<Item = &'a RenderCommand>) -> Vec<u32> {
    commands
        .filter_map(|command| match command {
            RenderCommand::DrawIndexed { indices, .. } => Some(indices.end - 1),
            _ => None,
        })
        .collect()
}

/// Pipelines bound, in execution order, with repeats collapsed.
pub fn pipeline_runs<'a>(commands: impl Iterator<Item = &'a RenderCommand>) -> Vec<usize> {
    let mut runs: Vec<usize> = Vec::new();
    for command in commands {
        if let RenderCommand::SetPipeline(pipeline) = command {
            if runs.last() != Some(&pipeline.index()) {
                runs.push(pipeline.index());
            }
        }
    }
    runs
}
