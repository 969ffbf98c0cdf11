use crate::{
    graph::cache::DEFAULT_TILE_CACHE_CAPACITY,
    render::hints::{Interpolation, RenderHints},
};

/// Renderer configuration, loadable from JSON or the environment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub hints: RenderHints,
    /// Advisory; see [`crate::GraphRenderer::set_progressive_paint_allowed`].
    pub progressive_paint: bool,
    /// Tiles kept by tile-cache nodes that do not set their own capacity.
    pub tile_cache_capacity: usize,
    /// If set, `repaint` clears the painted device region to this straight RGBA8 color first.
    pub clear_rgba: Option<[u8; 4]>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            hints: RenderHints::QUALITY,
            progressive_paint: false,
            tile_cache_capacity: DEFAULT_TILE_CACHE_CAPACITY,
            clear_rgba: None,
        }
    }
}

impl RendererConfig {
    /// Defaults overridden by `RASTERGRAPH_*` environment variables.
    ///
    /// Unparsable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub(crate) fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(n) = lookup("RASTERGRAPH_TILE_CACHE_CAPACITY")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.tile_cache_capacity = n;
        }
        if let Some(on) = lookup("RASTERGRAPH_PROGRESSIVE_PAINT").and_then(|v| parse_flag(&v)) {
            self.progressive_paint = on;
        }
        if let Some(interp) =
            lookup("RASTERGRAPH_INTERPOLATION").and_then(|v| Interpolation::parse(&v))
        {
            self.hints.interpolation = interp;
        }
        self
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/config.rs"]
mod tests;
