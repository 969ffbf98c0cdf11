use std::fmt;

use crate::{
    foundation::{
        core::{PixelFormat, RasterRegion, TileGrid},
        error::{GraphError, GraphResult},
    },
    raster::buffer::RasterMut,
};

/// Handle of a node inside a [`FilterGraph`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

/// A raster-producing node of the filter graph.
///
/// Nodes are pull-based: nothing is computed until a consumer asks a node to [`fill`] a
/// window. A node declares the extent of everything it can produce through [`bounds`]; the
/// graph never asks it for pixels outside that extent.
///
/// [`fill`]: FilterNode::fill
/// [`bounds`]: FilterNode::bounds
pub trait FilterNode: fmt::Debug + Send + Sync {
    /// Short, stable name used in diagnostics.
    fn kind(&self) -> &'static str;

    /// Declared output extent. Must not change for the lifetime of the node.
    fn bounds(&self) -> RasterRegion;

    /// Direct inputs, in order. Empty for leaves.
    fn sources(&self) -> &[NodeId];

    fn format(&self) -> PixelFormat {
        PixelFormat::RGBA8_PREMUL
    }

    /// Tile geometry consumers should request pixels in.
    fn tile_grid(&self) -> TileGrid {
        TileGrid::covering(self.bounds())
    }

    /// Write this node's pixels into `dst`.
    ///
    /// When called through [`FilterGraph::fill`], `dst` is already clipped to [`bounds`]
    /// and non-empty. Every pixel of `dst` should be written; pixels outside `dst` are
    /// unreachable.
    ///
    /// [`bounds`]: FilterNode::bounds
    fn fill(&self, graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()>;
}

/// Arena of filter nodes indexed by [`NodeId`].
///
/// A node may only reference sources that are already in the arena, so the graph is
/// acyclic by construction. Shared sub-inputs are referenced by id from any number of
/// consumers.
#[derive(Debug, Default)]
pub struct FilterGraph {
    nodes: Vec<Box<dyn FilterNode>>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `node` and return its handle.
    ///
    /// Fails with [`GraphError::UnknownNode`] when one of its sources is not in the graph.
    pub fn add<N: FilterNode + 'static>(&mut self, node: N) -> GraphResult<NodeId> {
        let next = u32::try_from(self.nodes.len())
            .map_err(|_| GraphError::invalid_argument("graph node count exceeds u32"))?;
        if let Some(missing) = node.sources().iter().find(|src| src.0 >= next) {
            return Err(GraphError::UnknownNode(missing.0));
        }
        tracing::trace!(node = next, kind = node.kind(), bounds = ?node.bounds(), "add node");
        self.nodes.push(Box::new(node));
        Ok(NodeId(next))
    }

    pub fn node(&self, id: NodeId) -> GraphResult<&dyn FilterNode> {
        self.nodes
            .get(id.0 as usize)
            .map(|n| n.as_ref())
            .ok_or(GraphError::UnknownNode(id.0))
    }

    pub fn bounds(&self, id: NodeId) -> GraphResult<RasterRegion> {
        Ok(self.node(id)?.bounds())
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Ask node `id` to write its contribution into `dst`.
    ///
    /// Only `dst ∩ bounds(id)` is handed to the node; a disjoint request is a no-op.
    /// Returns `dst` for chaining.
    pub fn fill<'d, 'a>(
        &self,
        id: NodeId,
        dst: &'d mut RasterMut<'a>,
    ) -> GraphResult<&'d mut RasterMut<'a>> {
        let node = self.node(id)?;
        let overlap = dst.region().intersect(node.bounds());
        if overlap.is_empty() {
            return Ok(dst);
        }
        let _span = tracing::trace_span!("fill", node = id.0, kind = node.kind()).entered();
        node.fill(self, &mut dst.child(overlap))?;
        Ok(dst)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/node.rs"]
mod tests;
