pub mod cache;
pub mod content;
pub mod handle;

pub use cache::AssetCache;
pub use content::{ContentCache, ContentKey};
pub use handle::Handle;
