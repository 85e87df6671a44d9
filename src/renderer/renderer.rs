// renderer/renderer.rs
use crate::asset::ContentCache;
use crate::renderer::batch::{DrawableItem, FrameBatches, RenderBatch};
use crate::renderer::camera::Frustum;
use crate::renderer::effect::Effect;
use crate::renderer::error::Result;
use crate::renderer::internal::collector::collect;
use crate::renderer::internal::recorder::record_items;
use crate::renderer::mode::{ModeController, RenderMode};
use crate::renderer::partition::partition;
use crate::renderer::surface::{LiveResources, SubmissionQueue};
use crate::settings::DispatchSettings;
use std::sync::Arc;

/// What one call to [`FrameRenderer::render_screen`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Batches that had at least one visible item.
    pub batches: usize,
    pub items_drawn: usize,
    pub items_culled: usize,
    /// Slices recorded, counting an Immediate-mode batch as one slice.
    pub slices: usize,
    pub command_lists: usize,
    pub draw_calls: usize,
}

/// Turns a frame's batches into GPU commands.
pub struct FrameRenderer {
    settings: DispatchSettings,
    effects: Arc<ContentCache<Effect>>,
    modes: ModeController,
    frustum: Option<Frustum>,
    live: LiveResources,
    frame_index: u64,
}

impl FrameRenderer {
    pub fn new(settings: DispatchSettings, effects: Arc<ContentCache<Effect>>) -> Self {
        let settings = settings.validate();
        let live = LiveResources::new();
        let modes = ModeController::new(
            settings.initial_mode,
            settings.max_workers,
            &settings.thread_name_prefix,
            live.clone(),
        );

        Self {
            settings,
            effects,
            modes,
            frustum: None,
            live,
            frame_index: 0,
        }
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    pub fn effects(&self) -> &Arc<ContentCache<Effect>> {
        &self.effects
    }

    pub fn live_resources(&self) -> &LiveResources {
        &self.live
    }

    /// Requests a mode. It takes effect at the next [`Self::update_state`],
    /// which `render_screen` runs before recording anything.
    pub fn set_mode(&mut self, mode: RenderMode) {
        self.modes.request(mode);
    }

    /// Mode the last state update applied.
    pub fn mode(&self) -> RenderMode {
        self.modes.applied()
    }

    pub fn requested_mode(&self) -> RenderMode {
        self.modes.requested()
    }

    /// Recording surfaces currently allocated; zero outside Parallel mode.
    pub fn worker_count(&self) -> usize {
        self.modes.worker_count()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn set_frustum(&mut self, frustum: Option<Frustum>) {
        self.frustum = frustum;
    }

    /// Applies a pending mode change.
    pub fn update_state(&mut self) -> Result<()> {
        self.modes.update().map(|_| ())
    }

    /// Validates every effect in the content cache, reporting the first
    /// broken one.
    pub fn preflight(&self) -> Result<()> {
        for (key, effect) in self.effects.entries() {
            if let Err(err) = effect.validate(None) {
                log::error!("Effect {} failed validation: {}", key, err);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Records every batch, in order, into `queue`.
    ///
    /// Configuration errors are detected for all batches before anything is
    /// recorded. On error, the queue may hold the output of earlier batches;
    /// the frame must not be presented.
    pub fn render_screen<Q>(&mut self, batches: &FrameBatches, queue: &mut Q) -> Result<FrameStats>
    where
        Q: SubmissionQueue + ?Sized,
    {
        self.update_state()?;
        self.validate_batches(batches)?;

        let mut stats = FrameStats::default();
        for batch in batches.iter() {
            let items = self.visible_items(batch, &mut stats);
            if items.is_empty() {
                continue;
            }
            stats.batches += 1;
            stats.items_drawn += items.len();

            if let Err(err) = self.record_batch(batch, &items, queue, &mut stats) {
                log::error!(
                    "Frame {} aborted in batch '{}': {}",
                    self.frame_index,
                    batch.effect.name(),
                    err
                );
                return Err(err);
            }
        }

        log::debug!("Frame {} ({:?}): {:?}", self.frame_index, self.mode(), stats);
        self.frame_index += 1;
        Ok(stats)
    }

    fn validate_batches(&self, batches: &FrameBatches) -> Result<()> {
        let default_material = self.settings.default_material.as_str();
        for batch in batches.iter().filter(|batch| !batch.is_empty()) {
            let needs_default = batch.items.iter().any(|item| item.material.is_none());
            batch
                .effect
                .validate(needs_default.then_some(default_material))?;
        }
        Ok(())
    }

    fn visible_items<'b>(&self, batch: &'b RenderBatch, stats: &mut FrameStats) -> Vec<&'b DrawableItem> {
        let frustum = match self.frustum {
            Some(frustum) if self.settings.frustum_culling => frustum,
            _ => return batch.items.iter().collect(),
        };

        let visible: Vec<&DrawableItem> = batch
            .items
            .iter()
            .filter(|item| {
                item.bounds
                    .map_or(true, |bounds| frustum.intersects_sphere(&bounds))
            })
            .collect();
        stats.items_culled += batch.items.len() - visible.len();
        visible
    }

    fn record_batch<Q>(
        &mut self,
        batch: &RenderBatch,
        items: &[&DrawableItem],
        queue: &mut Q,
        stats: &mut FrameStats,
    ) -> Result<()>
    where
        Q: SubmissionQueue + ?Sized,
    {
        let default_material = self.settings.default_material.as_str();
        let effect = batch.effect.as_ref();

        let Some(pool) = self.modes.pool_mut() else {
            stats.slices += 1;
            stats.draw_calls += record_items(effect, items, default_material, queue.direct())?;
            return Ok(());
        };

        let slices = partition(items.len(), pool.worker_count());
        let results = pool.fork(&slices, |slice, surface| {
            record_items(effect, &items[slice.range()], default_material, surface)
        });
        let collected = collect(results, pool.surfaces_mut(), queue)?;

        stats.slices += slices.len();
        stats.command_lists += collected.command_lists;
        stats.draw_calls += collected.draw_calls;
        Ok(())
    }
}

impl Drop for FrameRenderer {
    fn drop(&mut self) {
        log::debug!("Frame renderer dropped after {} frames", self.frame_index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{ContentKey, Handle};
    use crate::renderer::batch::Geometry;
    use crate::renderer::capture::CaptureQueue;
    use crate::renderer::effect::EffectKind;
    use crate::renderer::error::RenderError;
    use crate::renderer::material::Material;

    fn forward_effect(materials: &[&str]) -> Effect {
        Effect::builder("forward", EffectKind::ForwardShaded, Handle::new(0))
            .source_path("shaders/forward.wgsl")
            .batch_bind_groups([Handle::new(0), Handle::new(1)])
            .materials(
                materials
                    .iter()
                    .enumerate()
                    .map(|(i, name)| Material::new(*name, Handle::new(10 + i))),
            )
            .build()
            .unwrap()
    }

    fn forward(materials: &[&str]) -> Arc<Effect> {
        Arc::new(forward_effect(materials))
    }

    fn frame(effect: &Arc<Effect>, count: u32) -> FrameBatches {
        let mut batches = FrameBatches::new();
        for i in 0..count {
            let geometry =
                Geometry::indexed(Handle::new(0), Handle::new(1), wgpu::IndexFormat::Uint16, 3);
            batches.add(DrawableItem::new(format!("item{i}"), Arc::clone(effect), geometry));
        }
        batches
    }

    fn renderer(max_workers: usize) -> FrameRenderer {
        let settings = DispatchSettings {
            max_workers,
            thread_name_prefix: "renderer-test".into(),
            ..DispatchSettings::default()
        };
        FrameRenderer::new(settings, Arc::new(ContentCache::new()))
    }

    #[test]
    fn immediate_frame_records_one_slice_per_batch() {
        let mut renderer = renderer(4);
        let mut queue = CaptureQueue::new();
        let stats = renderer.render_screen(&frame(&forward(&["default"]), 6), &mut queue).unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.slices, 1);
        assert_eq!(stats.command_lists, 0);
        assert_eq!(stats.draw_calls, 6);
        assert_eq!(queue.draw_count(), 6);
        assert_eq!(renderer.frame_index(), 1);
    }

    #[test]
    fn parallel_frame_uses_at_most_one_list_per_surface() {
        let mut renderer = renderer(4);
        renderer.set_mode(RenderMode::Parallel);
        let mut queue = CaptureQueue::new();
        let stats = renderer.render_screen(&frame(&forward(&["default"]), 10), &mut queue).unwrap();

        assert_eq!(renderer.mode(), RenderMode::Parallel);
        assert_eq!(stats.slices, 4);
        assert_eq!(stats.command_lists, 4);
        assert_eq!(queue.submitted_slots(), [0, 1, 2, 3]);
        assert_eq!(queue.draw_count(), 10);
    }

    #[test]
    fn small_batches_use_fewer_slices_than_workers() {
        let mut renderer = renderer(8);
        renderer.set_mode(RenderMode::Parallel);
        let mut queue = CaptureQueue::new();
        let stats = renderer.render_screen(&frame(&forward(&["default"]), 3), &mut queue).unwrap();

        assert_eq!(stats.slices, 3);
        assert_eq!(queue.submitted_slots(), [0, 1, 2]);
    }

    #[test]
    fn mode_request_waits_for_the_next_frame() {
        let mut renderer = renderer(2);
        renderer.set_mode(RenderMode::Parallel);
        assert_eq!(renderer.mode(), RenderMode::Immediate);
        assert_eq!(renderer.requested_mode(), RenderMode::Parallel);
        assert_eq!(renderer.worker_count(), 0);

        renderer.update_state().unwrap();
        assert_eq!(renderer.worker_count(), 2);
        assert_eq!(renderer.live_resources().recorders(), 2);
    }

    #[test]
    fn missing_default_is_reported_before_recording() {
        let mut renderer = renderer(2);
        let mut queue = CaptureQueue::new();
        let err = renderer
            .render_screen(&frame(&forward(&["glass"]), 2), &mut queue)
            .unwrap_err();

        assert!(matches!(err, RenderError::MissingDefaultMaterial { .. }));
        assert!(queue.submissions().is_empty());
        assert_eq!(renderer.frame_index(), 0);
    }

    #[test]
    fn preflight_finds_effects_without_materials() {
        let renderer = renderer(1);
        renderer
            .effects()
            .insert(ContentKey::new("shaders/ok.wgsl", 0), forward_effect(&["default"]));
        renderer
            .effects()
            .insert(ContentKey::new("shaders/bare.wgsl", 0), forward_effect(&[]));

        let err = renderer.preflight().unwrap_err();
        assert!(matches!(err, RenderError::EffectWithoutMaterials { .. }));
    }
}
