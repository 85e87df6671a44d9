pub(crate) mod collector;
pub(crate) mod pool;
pub(crate) mod recorder;
pub(crate) mod resolve;
