use crate::renderer::batch::DrawableItem;
use crate::renderer::effect::Effect;
use crate::renderer::error::{RenderError, Result};
use crate::renderer::material::Material;
use std::sync::Arc;

/// Picks the material `item` is drawn with under `effect`.
///
/// The item must belong to this very effect instance, not merely one with the
/// same name. Items without an override use `default_material`. A missing override is
/// an error, never a silent skip.
pub(crate) fn resolve_material<'e>(
    effect: &'e Effect,
    item: &DrawableItem,
    default_material: &str,
) -> Result<&'e Material> {
    if !std::ptr::eq(Arc::as_ptr(&item.effect), effect) {
        return Err(RenderError::EffectMismatch {
            item: item.name.clone(),
            item_effect: item.effect.name().to_owned(),
            batch_effect: effect.name().to_owned(),
        });
    }

    match item.material.as_deref() {
        None => effect
            .material(default_material)
            .ok_or_else(|| RenderError::MissingDefaultMaterial {
                effect: effect.name().to_owned(),
                path: effect.source_path().to_owned(),
                material: default_material.to_owned(),
            }),
        Some(name) => effect
            .material(name)
            .ok_or_else(|| RenderError::MaterialNotFound {
                item: item.name.clone(),
                material: name.to_owned(),
                effect: effect.name().to_owned(),
            }),
    }
}
