// renderer/effect.rs
use super::error::{RenderError, Result};
use super::material::{Material, MaterialTable};
use super::surface::{BindGroupId, PipelineId, RecordingSurface};

/// Shading model of an effect. Each kind fixes which bind groups are bound
/// once per batch and where per-item material state goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    ForwardShaded,
    ClusteredForwardShaded,
    Toon,
}

impl EffectKind {
    /// Names of the per-batch bind groups, in bind-group index order.
    pub fn batch_layout(self) -> &'static [&'static str] {
        match self {
            Self::ForwardShaded => &["camera", "lights"],
            Self::ClusteredForwardShaded => &["camera", "lights", "light_clusters"],
            Self::Toon => &["camera", "lights", "toon_ramp"],
        }
    }

    /// Bind-group index materials are bound at; directly after the batch groups.
    pub fn material_group(self) -> u32 {
        self.batch_layout().len() as u32
    }
}

/// State application interface shared by every effect kind.
pub trait EffectState {
    /// Shaders and per-batch constants. Applied once per recording surface
    /// per batch, before any item is drawn.
    fn apply_per_batch_state(&self, surface: &mut dyn RecordingSurface);

    /// Material bindings for the next draw.
    fn apply_per_item_state(&self, material: &Material, surface: &mut dyn RecordingSurface);
}

/// A compiled shader program plus the fixed state it needs.
#[derive(Debug, Clone)]
pub struct Effect {
    name: String,
    source_path: String,
    kind: EffectKind,
    pipeline: PipelineId,
    batch_bind_groups: Vec<BindGroupId>,
    materials: MaterialTable,
}

impl Effect {
    pub fn builder(name: impl Into<String>, kind: EffectKind, pipeline: PipelineId) -> EffectBuilder {
        EffectBuilder {
            name: name.into(),
            source_path: String::new(),
            kind,
            pipeline,
            batch_bind_groups: Vec::new(),
            materials: MaterialTable::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Asset path this effect was loaded from, for error reports.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    pub fn pipeline(&self) -> PipelineId {
        self.pipeline
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Checks that this effect can render a batch at all. `default_material`
    /// is only required when some item relies on it.
    pub fn validate(&self, default_material: Option<&str>) -> Result<()> {
        if self.materials.is_empty() {
            return Err(RenderError::EffectWithoutMaterials {
                effect: self.name.clone(),
                path: self.source_path.clone(),
            });
        }

        if let Some(default) = default_material {
            if !self.materials.contains(default) {
                return Err(RenderError::MissingDefaultMaterial {
                    effect: self.name.clone(),
                    path: self.source_path.clone(),
                    material: default.to_owned(),
                });
            }
        }

        Ok(())
    }
}

impl EffectState for Effect {
    fn apply_per_batch_state(&self, surface: &mut dyn RecordingSurface) {
        surface.set_pipeline(self.pipeline);
        for (index, group) in self.batch_bind_groups.iter().enumerate() {
            surface.set_bind_group(index as u32, *group, &[]);
        }
    }

    fn apply_per_item_state(&self, material: &Material, surface: &mut dyn RecordingSurface) {
        surface.set_bind_group(
            self.kind.material_group(),
            material.bind_group(),
            material.dynamic_offsets(),
        );
    }
}

pub struct EffectBuilder {
    name: String,
    source_path: String,
    kind: EffectKind,
    pipeline: PipelineId,
    batch_bind_groups: Vec<BindGroupId>,
    materials: MaterialTable,
}

impl EffectBuilder {
    pub fn source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Per-batch bind groups in the order of [`EffectKind::batch_layout`].
    pub fn batch_bind_groups(mut self, groups: impl IntoIterator<Item = BindGroupId>) -> Self {
        self.batch_bind_groups = groups.into_iter().collect();
        self
    }

    pub fn material(mut self, material: Material) -> Self {
        self.materials.insert(material);
        self
    }

    pub fn materials(mut self, materials: impl IntoIterator<Item = Material>) -> Self {
        for material in materials {
            self.materials.insert(material);
        }
        self
    }

    pub fn build(self) -> Result<Effect> {
        let expected = self.kind.batch_layout().len();
        if self.batch_bind_groups.len() != expected {
            return Err(RenderError::BatchLayoutMismatch {
                effect: self.name,
                path: self.source_path,
                expected,
                actual: self.batch_bind_groups.len(),
            });
        }

        Ok(Effect {
            name: self.name,
            source_path: self.source_path,
            kind: self.kind,
            pipeline: self.pipeline,
            batch_bind_groups: self.batch_bind_groups,
            materials: self.materials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::Handle;
    use crate::renderer::error::ErrorKind;
    use crate::renderer::surface::{CommandRecorder, LiveResources, RenderCommand};

    fn toon() -> Effect {
        Effect::builder("toon", EffectKind::Toon, Handle::new(7))
            .source_path("shaders/toon.wgsl")
            .batch_bind_groups([Handle::new(0), Handle::new(1), Handle::new(2)])
            .material(Material::new("default", Handle::new(10)).with_constants_offset(256))
            .build()
            .unwrap()
    }

    #[test]
    fn material_group_follows_batch_layout() {
        assert_eq!(EffectKind::ForwardShaded.material_group(), 2);
        assert_eq!(EffectKind::ClusteredForwardShaded.material_group(), 3);
        assert_eq!(EffectKind::Toon.material_group(), 3);
    }

    #[test]
    fn build_rejects_wrong_batch_group_count() {
        let err = Effect::builder("clustered", EffectKind::ClusteredForwardShaded, Handle::new(0))
            .source_path("shaders/clustered.wgsl")
            .batch_bind_groups([Handle::new(0), Handle::new(1)])
            .build()
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(matches!(
            err,
            RenderError::BatchLayoutMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn per_batch_state_binds_pipeline_then_groups() {
        let live = LiveResources::new();
        let mut recorder = CommandRecorder::new(0, &live);
        toon().apply_per_batch_state(&mut recorder);

        assert_eq!(recorder.recorded()[0], RenderCommand::SetPipeline(Handle::new(7)));
        assert_eq!(recorder.recorded().len(), 4);
        assert_eq!(
            recorder.recorded()[3],
            RenderCommand::SetBindGroup {
                index: 2,
                group: Handle::new(2),
                offsets: vec![]
            }
        );
    }

    #[test]
    fn per_item_state_binds_material_with_offset() {
        let effect = toon();
        let live = LiveResources::new();
        let mut recorder = CommandRecorder::new(0, &live);
        let material = effect.material("default").unwrap();
        effect.apply_per_item_state(material, &mut recorder);

        assert_eq!(
            recorder.recorded(),
            &[RenderCommand::SetBindGroup {
                index: 3,
                group: Handle::new(10),
                offsets: vec![256]
            }]
        );
    }

    #[test]
    fn validate_reports_missing_materials_with_path() {
        let effect = Effect::builder("bare", EffectKind::ForwardShaded, Handle::new(0))
            .source_path("shaders/bare.wgsl")
            .batch_bind_groups([Handle::new(0), Handle::new(1)])
            .build()
            .unwrap();

        let err = effect.validate(None).unwrap_err();
        assert!(err.to_string().contains("shaders/bare.wgsl"));
    }

    #[test]
    fn validate_requires_default_only_when_asked() {
        let effect = toon();
        assert!(effect.validate(Some("default")).is_ok());
        assert!(effect.validate(None).is_ok());
        assert!(matches!(
            effect.validate(Some("fallback")),
            Err(RenderError::MissingDefaultMaterial { .. })
        ));
    }
}
