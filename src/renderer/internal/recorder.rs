use super::resolve::resolve_material;
use crate::renderer::batch::DrawableItem;
use crate::renderer::effect::{Effect, EffectState};
use crate::renderer::error::Result;
use crate::renderer::surface::RecordingSurface;

/// Records one slice of a batch onto `surface` and returns the number of
/// draws issued.
///
/// Every item is resolved before the first command is written, so a slice
/// either records completely or leaves `surface` untouched. Per-batch state
/// goes down once, then each item gets its material and its draw.
pub(crate) fn record_items(
    effect: &Effect,
    items: &[&DrawableItem],
    default_material: &str,
    surface: &mut dyn RecordingSurface,
) -> Result<usize> {
    let materials = items
        .iter()
        .map(|item| resolve_material(effect, item, default_material))
        .collect::<Result<Vec<_>>>()?;

    effect.apply_per_batch_state(surface);
    for (item, material) in items.iter().zip(materials) {
        effect.apply_per_item_state(material, surface);
        surface.draw_geometry(&item.geometry);
    }

    Ok(items.len())
}
