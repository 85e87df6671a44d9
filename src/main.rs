use frame_dispatch::asset::{ContentCache, ContentKey, Handle};
use frame_dispatch::renderer::{
    BoundingSphere, CaptureQueue, DrawableItem, Effect, EffectKind, FrameBatches, FrameRenderer,
    Frustum, Geometry, Material, RenderError, RenderMode,
};
use frame_dispatch::DispatchSettings;
use glam::{Mat4, Vec3};
use std::sync::Arc;

const FRAMES_PER_MODE: usize = 3;

fn load_effects(cache: &ContentCache<Effect>) -> Result<Vec<Arc<Effect>>, RenderError> {
    let specs = [
        ("shaders/forward.wgsl", "forward", EffectKind::ForwardShaded),
        ("shaders/clustered.wgsl", "clustered", EffectKind::ClusteredForwardShaded),
        ("shaders/toon.wgsl", "toon", EffectKind::Toon),
    ];

    specs
        .iter()
        .enumerate()
        .map(|(index, (path, name, kind))| {
            cache.get_or_create(&ContentKey::new(path, 0), || {
                let groups = (0..kind.batch_layout().len()).map(Handle::new);
                Effect::builder(*name, *kind, Handle::new(index))
                    .source_path(*path)
                    .batch_bind_groups(groups)
                    .material(Material::new("default", Handle::new(100 + index)))
                    .material(Material::new("gloss", Handle::new(200 + index)).with_constants_offset(256))
                    .build()
            })
        })
        .collect()
}

fn build_scene(effects: &[Arc<Effect>]) -> FrameBatches {
    let mut batches = FrameBatches::new();
    for i in 0..48u32 {
        let effect = &effects[i as usize % effects.len()];
        let geometry =
            Geometry::indexed(Handle::new(0), Handle::new(1), wgpu::IndexFormat::Uint32, 36);
        let x = (i % 8) as f32 * 3.0 - 10.5;
        let z = -((i / 8) as f32 * 4.0 + 5.0);

        let mut item = DrawableItem::new(format!("mesh{i}"), Arc::clone(effect), geometry)
            .with_bounds(BoundingSphere::new(Vec3::new(x, 0.0, z), 1.0));
        if i % 5 == 0 {
            item = item.with_material("gloss");
        }
        batches.add(item);
    }
    batches
}

fn camera_frustum() -> Frustum {
    let proj = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 20.0);
    let view = Mat4::look_at_rh(Vec3::new(0.0, 2.0, 4.0), Vec3::new(0.0, 0.0, -10.0), Vec3::Y);
    Frustum::from_view_proj(proj * view)
}

fn run() -> Result<(), RenderError> {
    let settings = DispatchSettings::load();
    let effects = Arc::new(ContentCache::new());
    let scene = build_scene(&load_effects(&effects)?);

    let mut renderer = FrameRenderer::new(settings, effects);
    renderer.preflight()?;
    renderer.set_frustum(Some(camera_frustum()));

    for mode in [RenderMode::Immediate, RenderMode::Parallel, RenderMode::Immediate] {
        renderer.set_mode(mode);
        for _ in 0..FRAMES_PER_MODE {
            let mut queue = CaptureQueue::new();
            let stats = renderer.render_screen(&scene, &mut queue)?;
            log::info!(
                "Frame {} [{:?}] batches={} drawn={} culled={} slices={} lists={} submissions={}",
                renderer.frame_index(),
                renderer.mode(),
                stats.batches,
                stats.items_drawn,
                stats.items_culled,
                stats.slices,
                stats.command_lists,
                queue.submissions().len()
            );
        }
    }

    let live = renderer.live_resources();
    log::info!(
        "Live recorders: {}, live command lists: {}",
        live.recorders(),
        live.command_lists()
    );
    Ok(())
}

fn main() {
    frame_dispatch::init_logging();
    if let Err(err) = run() {
        log::error!("Demo failed: {err}");
        std::process::exit(1);
    }
}
