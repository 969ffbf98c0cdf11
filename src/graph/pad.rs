use std::ops::Range;

use crate::{
    foundation::{
        core::{PixelFormat, RasterRegion, Rgba8Premul, TileGrid},
        error::GraphResult,
    },
    graph::node::{FilterGraph, FilterNode, NodeId},
    raster::buffer::{Raster, RasterMut},
    render::hints::RenderHints,
};

/// Smallest tile edge a pad/crop node advertises, unless its bounds are smaller.
pub const MIN_PAD_TILE: u32 = 256;

/// How a [`PadCropNode`] fills target pixels its source does not cover.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PadMode {
    /// Transparent black.
    #[default]
    ZeroFill,
    /// Nearest source edge pixel.
    Replicate,
    /// Currently painted exactly like [`PadMode::ZeroFill`].
    Wrap,
}

/// Re-frames one source to new bounds: crops where the bounds are smaller, pads where
/// they are larger, per axis.
#[derive(Clone, Debug)]
pub struct PadCropNode {
    source: [NodeId; 1],
    bounds: RasterRegion,
    mode: PadMode,
    hints: Option<RenderHints>,
    format: PixelFormat,
    grid: TileGrid,
}

impl PadCropNode {
    pub fn new(
        graph: &FilterGraph,
        source: NodeId,
        bounds: RasterRegion,
        mode: PadMode,
        hints: Option<RenderHints>,
    ) -> GraphResult<Self> {
        let src = graph.node(source)?;
        let grid = fitted_tile_grid(src.tile_grid(), bounds)?;
        Ok(Self {
            source: [source],
            bounds,
            mode,
            hints,
            format: src.format(),
            grid,
        })
    }

    pub fn source(&self) -> NodeId {
        self.source[0]
    }

    pub fn mode(&self) -> PadMode {
        self.mode
    }

    /// Hints for drawing the padded area. They never change which color is written.
    pub fn hints(&self) -> Option<&RenderHints> {
        self.hints.as_ref()
    }

    fn zero_fill(&self, dst: &mut RasterMut<'_>, src: RasterRegion) {
        let bands = pad_bands(dst.region(), src);
        tracing::trace!(bands = bands.len(), hints = ?self.hints, "zero fill");
        for band in bands {
            dst.fill_region(band, Rgba8Premul::transparent());
        }
    }

    fn replicate(
        &self,
        graph: &FilterGraph,
        dst: &mut RasterMut<'_>,
        s: RasterRegion,
    ) -> GraphResult<()> {
        let r = dst.region();
        let left_of = r.right() <= s.x();
        let right_of = r.x() >= s.right();

        // Source columns feeding the top/bottom strips and the first dst column they land on.
        let (sx0, sx1, wx0) = if left_of {
            (s.x(), s.x() + 1, r.right() - 1)
        } else if right_of {
            (s.right() - 1, s.right(), r.x())
        } else {
            let x0 = r.x().max(s.x());
            (x0, r.right().min(s.right()), x0)
        };
        let strip_width = (sx1 - sx0) as u32;

        if r.y() < s.y() {
            let strip = RasterRegion::new(sx0, s.y(), strip_width, 1);
            self.repeat_row(graph, dst, strip, wx0, r.y()..s.y().min(r.bottom()))?;
        }
        if r.bottom() > s.bottom() {
            let strip = RasterRegion::new(sx0, s.bottom() - 1, strip_width, 1);
            self.repeat_row(graph, dst, strip, wx0, s.bottom().max(r.y())..r.bottom())?;
        }

        // Horizontally disjoint: nothing was covered, so the edge column beside the source
        // still needs the source rows it faces.
        if left_of || right_of {
            let y0 = r.y().max(s.y());
            let y1 = r.bottom().min(s.bottom());
            if y0 < y1 {
                let mut column = Raster::new(RasterRegion::from_edges(sx0, y0, sx1, y1))?;
                graph.fill(self.source(), &mut column.as_mut())?;
                for y in y0..y1 {
                    dst.span_mut(y, wx0, wx0 + 1)
                        .copy_from_slice(column.span(y, sx0, sx1));
                }
            }
        }

        if r.x() < s.x() {
            let edge = if left_of { r.right() - 1 } else { s.x() };
            spread_column(dst, edge, r.x()..edge);
        }
        if r.right() > s.right() {
            let edge = if right_of { r.x() } else { s.right() - 1 };
            spread_column(dst, edge, edge + 1..r.right());
        }
        Ok(())
    }

    fn repeat_row(
        &self,
        graph: &FilterGraph,
        dst: &mut RasterMut<'_>,
        strip_region: RasterRegion,
        dst_x: i32,
        rows: Range<i32>,
    ) -> GraphResult<()> {
        let mut strip = Raster::new(strip_region)?;
        graph.fill(self.source(), &mut strip.as_mut())?;
        let end = dst_x + strip_region.width() as i32;
        for y in rows {
            dst.span_mut(y, dst_x, end).copy_from_slice(strip.data());
        }
        Ok(())
    }
}

impl FilterNode for PadCropNode {
    fn kind(&self) -> &'static str {
        "pad_crop"
    }

    fn bounds(&self) -> RasterRegion {
        self.bounds
    }

    fn sources(&self) -> &[NodeId] {
        &self.source
    }

    fn format(&self) -> PixelFormat {
        self.format
    }

    fn tile_grid(&self) -> TileGrid {
        self.grid
    }

    fn fill(&self, graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()> {
        if dst.region().is_empty() {
            return Ok(());
        }
        let src = graph.bounds(self.source())?;
        let covered = dst.region().intersect(src);
        if !covered.is_empty() {
            graph.fill(self.source(), &mut dst.child(covered))?;
        }
        if src.contains(dst.region()) {
            return Ok(());
        }

        match self.mode {
            PadMode::ZeroFill => self.zero_fill(dst, src),
            PadMode::Replicate if src.is_empty() => {
                tracing::debug!("replicate pad over an empty source, zero filling");
                self.zero_fill(dst, src);
            }
            PadMode::Replicate => self.replicate(graph, dst, src)?,
            PadMode::Wrap => {
                tracing::trace!("wrap pad painted as zero fill");
                self.zero_fill(dst, src);
            }
        }
        Ok(())
    }
}

impl FilterGraph {
    pub fn add_pad_crop(
        &mut self,
        source: NodeId,
        bounds: RasterRegion,
        mode: PadMode,
    ) -> GraphResult<NodeId> {
        let node = PadCropNode::new(self, source, bounds, mode, None)?;
        self.add(node)
    }
}

/// Parts of `dst` outside `src`, as non-overlapping bands in left, top, bottom, right order.
///
/// The left band spans the full height of `dst`; top and bottom only span what the left
/// band left over; the right band only spans the rows between top and bottom.
pub fn pad_bands(dst: RasterRegion, src: RasterRegion) -> Vec<RasterRegion> {
    let mut bands = Vec::with_capacity(4);
    if dst.is_empty() {
        return bands;
    }
    let (mut x0, mut y0, mut x1, mut y1) = (dst.x(), dst.y(), dst.right(), dst.bottom());

    if x0 < src.x() {
        let end = src.x().min(x1);
        bands.push(RasterRegion::from_edges(x0, y0, end, y1));
        x0 = end;
    }
    if y0 < src.y() {
        let end = src.y().min(y1);
        bands.push(RasterRegion::from_edges(x0, y0, x1, end));
        y0 = end;
    }
    if y1 > src.bottom() {
        let start = src.bottom().max(y0);
        bands.push(RasterRegion::from_edges(x0, start, x1, y1));
        y1 = start;
    }
    if x1 > src.right() {
        let start = src.right().max(x0);
        bands.push(RasterRegion::from_edges(start, y0, x1, y1));
        x1 = start;
    }
    debug_assert!(x0 <= x1 && y0 <= y1);

    bands.retain(|b| !b.is_empty());
    bands
}

/// Tile size derived from the source's, clamped per axis into `[MIN_PAD_TILE, bounds]`.
pub(crate) fn fitted_tile_grid(src: TileGrid, bounds: RasterRegion) -> GraphResult<TileGrid> {
    let w = src
        .tile_width()
        .max(MIN_PAD_TILE)
        .min(bounds.width())
        .max(1);
    let h = src
        .tile_height()
        .max(MIN_PAD_TILE)
        .min(bounds.height())
        .max(1);
    src.with_offset(bounds.x(), bounds.y()).with_tile_size(w, h)
}

fn spread_column(dst: &mut RasterMut<'_>, edge_x: i32, cols: Range<i32>) {
    if cols.is_empty() {
        return;
    }
    let r = dst.region();
    for y in r.y()..r.bottom() {
        if let Some(px) = dst.pixel(edge_x, y) {
            dst.fill_region(RasterRegion::from_edges(cols.start, y, cols.end, y + 1), px);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/pad.rs"]
mod tests;
