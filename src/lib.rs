pub mod asset;
pub mod renderer;
pub mod settings;

pub use renderer::{FrameRenderer, FrameStats, RenderError, RenderMode};
pub use settings::DispatchSettings;

use env_logger::{Builder, Env};

/// Logs at Info unless `RUST_LOG` asks for something else.
pub fn init_logging() {
    let _ = logger_builder(Env::default()).try_init();
}

fn logger_builder(env: Env<'_>) -> Builder {
    Builder::from_env(env.default_filter_or("info"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::LevelFilter;

    #[test]
    fn defaults_to_info() {
        let env = Env::new().filter("FRAME_DISPATCH_TEST_LOG_UNSET");
        assert_eq!(logger_builder(env).build().filter(), LevelFilter::Info);
    }

    #[test]
    fn environment_filter_wins_over_default() {
        std::env::set_var("FRAME_DISPATCH_TEST_LOG_DEBUG", "debug");
        let env = Env::new().filter("FRAME_DISPATCH_TEST_LOG_DEBUG");
        assert_eq!(logger_builder(env).build().filter(), LevelFilter::Debug);
    }
}
