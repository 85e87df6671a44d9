use crate::renderer::RenderMode;
use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Upper bound on recording threads, whatever the machine reports.
pub const MAX_WORKER_LIMIT: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSettings {
    /// Recording surfaces (and threads) allocated in Parallel mode.
    #[serde(default = "DispatchSettings::default_max_workers")]
    pub max_workers: usize,
    #[serde(default)]
    pub initial_mode: RenderMode,
    /// Material used by items without an override.
    #[serde(default = "DispatchSettings::default_material_name")]
    pub default_material: String,
    #[serde(default = "DispatchSettings::default_frustum_culling")]
    pub frustum_culling: bool,
    #[serde(default = "DispatchSettings::default_thread_name_prefix")]
    pub thread_name_prefix: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_workers: Self::default_max_workers(),
            initial_mode: RenderMode::default(),
            default_material: Self::default_material_name(),
            frustum_culling: Self::default_frustum_culling(),
            thread_name_prefix: Self::default_thread_name_prefix(),
        }
    }
}

impl DispatchSettings {
    pub fn load() -> Self {
        Self::load_from_path("dispatch.json")
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Self {
        use std::fs;

        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<DispatchSettings>(&contents) {
                Ok(settings) => {
                    info!("Loaded dispatch settings from {:?}", path);
                    settings.validate()
                }
                Err(err) => {
                    warn!(
                        "Failed to parse {:?} ({}). Falling back to default dispatch settings.",
                        path, err
                    );
                    DispatchSettings::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "Dispatch settings file {:?} not found. Using default settings.",
                    path
                );
                DispatchSettings::default()
            }
            Err(err) => {
                warn!(
                    "Failed to read {:?} ({}). Falling back to default dispatch settings.",
                    path, err
                );
                DispatchSettings::default()
            }
        }
    }

    pub(crate) fn validate(mut self) -> Self {
        if self.max_workers == 0 {
            warn!("Worker count must be greater than zero. Using 1 instead.");
            self.max_workers = 1;
        }

        if self.max_workers > MAX_WORKER_LIMIT {
            warn!(
                "Worker count {} exceeds the limit of {}. Clamping.",
                self.max_workers, MAX_WORKER_LIMIT
            );
            self.max_workers = MAX_WORKER_LIMIT;
        }

        if self.default_material.is_empty() {
            warn!("Default material name must not be empty. Using default value.");
            self.default_material = Self::default_material_name();
        }

        if self.thread_name_prefix.is_empty() {
            self.thread_name_prefix = Self::default_thread_name_prefix();
        }

        self
    }

    fn default_max_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
            .clamp(1, MAX_WORKER_LIMIT)
    }

    fn default_material_name() -> String {
        "default".to_owned()
    }

    const fn default_frustum_culling() -> bool {
        true
    }

    fn default_thread_name_prefix() -> String {
        "frame-recorder".to_owned()
    }
}
