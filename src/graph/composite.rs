use crate::{
    composite::{math::composite_in_place, rule::CompositeOperator},
    foundation::{
        core::RasterRegion,
        error::{GraphError, GraphResult},
    },
    graph::node::{FilterGraph, FilterNode, NodeId},
    raster::buffer::{Raster, RasterMut},
};

/// Stacks its sources bottom to top with one [`CompositeOperator`].
///
/// Source 0 is the initial backdrop. Every later source is combined onto the running
/// result, with areas outside a source's bounds treated as transparent.
#[derive(Clone, Debug)]
pub struct CompositeNode {
    sources: Vec<NodeId>,
    bounds: RasterRegion,
    op: CompositeOperator,
}

impl CompositeNode {
    /// Bounds are the union of the source bounds.
    pub fn new(graph: &FilterGraph, sources: Vec<NodeId>, op: CompositeOperator) -> GraphResult<Self> {
        let mut bounds = RasterRegion::EMPTY;
        for &src in &sources {
            bounds = bounds.union(graph.bounds(src)?);
        }
        Self::with_bounds(graph, sources, op, bounds)
    }

    pub fn with_bounds(
        graph: &FilterGraph,
        sources: Vec<NodeId>,
        op: CompositeOperator,
        bounds: RasterRegion,
    ) -> GraphResult<Self> {
        if sources.is_empty() {
            return Err(GraphError::invalid_argument(
                "composite node needs at least one source",
            ));
        }
        for &src in &sources {
            graph.node(src)?;
        }
        Ok(Self {
            sources,
            bounds,
            op,
        })
    }

    pub fn operator(&self) -> &CompositeOperator {
        &self.op
    }
}

impl FilterNode for CompositeNode {
    fn kind(&self) -> &'static str {
        "composite"
    }

    fn bounds(&self) -> RasterRegion {
        self.bounds
    }

    fn sources(&self) -> &[NodeId] {
        &self.sources
    }

    fn fill(&self, graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()> {
        let region = dst.region();
        let Some((&first, rest)) = self.sources.split_first() else {
            return Ok(());
        };

        let mut acc = Raster::new(region)?;
        graph.fill(first, &mut acc.as_mut())?;

        let mut layer = Raster::new(region)?;
        for &src in rest {
            layer.as_mut().clear();
            graph.fill(src, &mut layer.as_mut())?;
            composite_in_place(&self.op, acc.data_mut(), layer.data())?;
        }

        dst.copy_from(&acc);
        Ok(())
    }
}

impl FilterGraph {
    pub fn add_composite(
        &mut self,
        sources: Vec<NodeId>,
        op: CompositeOperator,
    ) -> GraphResult<NodeId> {
        let node = CompositeNode::new(self, sources, op)?;
        self.add(node)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/composite.rs"]
mod tests;
