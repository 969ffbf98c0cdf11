pub(crate) mod config;
pub(crate) mod hints;
pub(crate) mod renderer;
