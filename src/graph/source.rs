use std::path::Path;

use anyhow::Context as _;

use crate::{
    foundation::{
        core::{PixelFormat, RasterRegion, Rgba8Premul, TileGrid},
        error::GraphResult,
    },
    graph::node::{FilterGraph, FilterNode, NodeId},
    raster::buffer::{Raster, RasterMut},
};

/// Leaf node serving pixels held in memory.
#[derive(Clone, Debug)]
pub struct RasterSource {
    raster: Raster,
    grid: TileGrid,
}

impl RasterSource {
    pub fn new(raster: Raster) -> Self {
        let grid = TileGrid::covering(raster.region());
        Self { raster, grid }
    }

    /// Decode an image file and place its top-left pixel at `(x, y)`.
    pub fn open(path: &Path, x: i32, y: i32) -> GraphResult<Self> {
        let img = image::open(path)
            .with_context(|| format!("decode image '{}'", path.display()))?
            .to_rgba8();
        Self::from_image(&img, x, y)
    }

    pub fn from_image(img: &image::RgbaImage, x: i32, y: i32) -> GraphResult<Self> {
        let region = RasterRegion::new(x, y, img.width(), img.height());
        let raster = Raster::from_rgba8(region, PixelFormat::RGBA8_STRAIGHT, img.as_raw().clone())?;
        Ok(Self::new(raster))
    }

    /// Advertise a tile size to consumers; the grid stays anchored at the raster origin.
    pub fn with_tile_size(mut self, tile_width: u32, tile_height: u32) -> GraphResult<Self> {
        self.grid = self.grid.with_tile_size(tile_width, tile_height)?;
        Ok(self)
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }
}

impl FilterNode for RasterSource {
    fn kind(&self) -> &'static str {
        "raster"
    }

    fn bounds(&self) -> RasterRegion {
        self.raster.region()
    }

    fn sources(&self) -> &[NodeId] {
        &[]
    }

    fn tile_grid(&self) -> TileGrid {
        self.grid
    }

    fn fill(&self, _graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()> {
        dst.copy_from(&self.raster);
        Ok(())
    }
}

/// Leaf node painting one premultiplied color over its bounds.
#[derive(Clone, Copy, Debug)]
pub struct FloodNode {
    bounds: RasterRegion,
    color: Rgba8Premul,
}

impl FloodNode {
    pub fn new(bounds: RasterRegion, color: Rgba8Premul) -> Self {
        Self { bounds, color }
    }

    pub fn color(&self) -> Rgba8Premul {
        self.color
    }
}

impl FilterNode for FloodNode {
    fn kind(&self) -> &'static str {
        "flood"
    }

    fn bounds(&self) -> RasterRegion {
        self.bounds
    }

    fn sources(&self) -> &[NodeId] {
        &[]
    }

    fn fill(&self, _graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()> {
        let region = dst.region();
        dst.fill_region(region, self.color);
        Ok(())
    }
}

impl FilterGraph {
    pub fn add_raster(&mut self, raster: Raster) -> GraphResult<NodeId> {
        self.add(RasterSource::new(raster))
    }

    pub fn add_flood(&mut self, bounds: RasterRegion, color: Rgba8Premul) -> GraphResult<NodeId> {
        self.add(FloodNode::new(bounds, color))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/source.rs"]
mod tests;
