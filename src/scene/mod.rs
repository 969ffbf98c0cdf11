use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    composite::rule::CompositeOperator,
    foundation::{
        core::{RasterRegion, Rgba8Premul},
        error::{GraphError, GraphResult},
    },
    graph::{
        cache::DEFAULT_TILE_CACHE_CAPACITY,
        node::{FilterGraph, NodeId},
        pad::PadMode,
        source::RasterSource,
    },
};

/// JSON description of a filter graph.
///
/// Nodes are listed in dependency order: a node may only name sources that appear before
/// it. `root` is the index of the node to render.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphDesc {
    pub nodes: Vec<NodeDesc>,
    pub root: usize,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeDesc {
    /// Solid straight-alpha color over `bounds`.
    Flood { bounds: RasterRegion, rgba: [u8; 4] },
    /// Decoded image file; relative paths resolve against the assets root.
    Image {
        path: PathBuf,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
    },
    PadCrop {
        source: usize,
        bounds: RasterRegion,
        #[serde(default)]
        mode: PadMode,
    },
    Composite {
        sources: Vec<usize>,
        op: CompositeOperator,
    },
    TileCache {
        source: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        capacity: Option<usize>,
    },
}

impl NodeDesc {
    fn sources(&self) -> Vec<usize> {
        match self {
            Self::Flood { .. } | Self::Image { .. } => Vec::new(),
            Self::PadCrop { source, .. } | Self::TileCache { source, .. } => vec![*source],
            Self::Composite { sources, .. } => sources.clone(),
        }
    }
}

impl GraphDesc {
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::serde(e.to_string()))
    }

    pub fn load(path: &Path) -> GraphResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read graph description '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> GraphResult<()> {
        if self.nodes.is_empty() {
            return Err(GraphError::invalid_argument("graph must have at least one node"));
        }
        if self.root >= self.nodes.len() {
            return Err(GraphError::invalid_argument(format!(
                "root {} is out of range ({} nodes)",
                self.root,
                self.nodes.len()
            )));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(src) = node.sources().into_iter().find(|&s| s >= i) {
                return Err(GraphError::invalid_argument(format!(
                    "node {i} references node {src}, which is not defined before it"
                )));
            }
            if let NodeDesc::Composite { sources, .. } = node
                && sources.is_empty()
            {
                return Err(GraphError::invalid_argument(format!(
                    "composite node {i} has no sources"
                )));
            }
        }
        Ok(())
    }

    /// Build the graph with the default tile-cache capacity.
    pub fn build(&self, assets_root: &Path) -> GraphResult<(FilterGraph, NodeId)> {
        self.build_with_capacity(assets_root, DEFAULT_TILE_CACHE_CAPACITY)
    }

    /// Build the graph; tile caches without an explicit capacity get `cache_capacity`.
    pub fn build_with_capacity(
        &self,
        assets_root: &Path,
        cache_capacity: usize,
    ) -> GraphResult<(FilterGraph, NodeId)> {
        self.validate()?;

        let mut graph = FilterGraph::new();
        let mut ids = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let id = match node {
                NodeDesc::Flood { bounds, rgba } => {
                    let [r, g, b, a] = *rgba;
                    graph.add_flood(*bounds, Rgba8Premul::from_straight_rgba(r, g, b, a))?
                }
                NodeDesc::Image { path, x, y } => {
                    graph.add(RasterSource::open(&assets_root.join(path), *x, *y)?)?
                }
                NodeDesc::PadCrop {
                    source,
                    bounds,
                    mode,
                } => graph.add_pad_crop(ids[*source], *bounds, *mode)?,
                NodeDesc::Composite { sources, op } => {
                    let sources = sources.iter().map(|&s| ids[s]).collect();
                    graph.add_composite(sources, *op)?
                }
                NodeDesc::TileCache { source, capacity } => {
                    graph.add_tile_cache(ids[*source], capacity.unwrap_or(cache_capacity))?
                }
            };
            ids.push(id);
        }
        let root = ids[self.root];
        tracing::debug!(nodes = ids.len(), root = root.0, "built filter graph");
        Ok((graph, root))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mod.rs"]
mod tests;
