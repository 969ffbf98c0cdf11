use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use super::*;
use crate::foundation::core::Rgba8Premul;

/// Flood-like leaf that counts how often it is asked for pixels.
#[derive(Debug)]
struct CountingNode {
    bounds: RasterRegion,
    grid: TileGrid,
    fills: Arc<AtomicUsize>,
}

impl FilterNode for CountingNode {
    fn kind(&self) -> &'static str {
        "counting"
    }

    fn bounds(&self) -> RasterRegion {
        self.bounds
    }

    fn sources(&self) -> &[NodeId] {
        &[]
    }

    fn tile_grid(&self) -> TileGrid {
        self.grid
    }

    fn fill(&self, _graph: &FilterGraph, dst: &mut RasterMut<'_>) -> GraphResult<()> {
        self.fills.fetch_add(1, Ordering::SeqCst);
        let region = dst.region();
        for y in region.y()..region.bottom() {
            for x in region.x()..region.right() {
                dst.set_pixel(x, y, Rgba8Premul::from_array([x as u8, y as u8, 0, 255]));
            }
        }
        Ok(())
    }
}

fn counting_graph(capacity: usize) -> (FilterGraph, NodeId, NodeId, Arc<AtomicUsize>) {
    let fills = Arc::new(AtomicUsize::new(0));
    let bounds = RasterRegion::new(0, 0, 16, 16);
    let mut g = FilterGraph::new();
    let src = g
        .add(CountingNode {
            bounds,
            grid: TileGrid::new(0, 0, 8, 8).unwrap(),
            fills: Arc::clone(&fills),
        })
        .unwrap();
    let cache = g.add_tile_cache(src, capacity).unwrap();
    (g, src, cache, fills)
}

#[test]
fn cached_output_matches_source() {
    let (g, src, cache, _) = counting_graph(8);
    let region = RasterRegion::new(3, 5, 10, 9);
    let mut direct = Raster::new(region).unwrap();
    g.fill(src, &mut direct.as_mut()).unwrap();
    let mut cached = Raster::new(region).unwrap();
    g.fill(cache, &mut cached.as_mut()).unwrap();
    assert_eq!(direct, cached);
}

#[test]
fn second_fill_hits_the_cache() {
    let (g, src, _, fills) = counting_graph(8);
    let node = TileCacheNode::new(&g, src, 8).unwrap();

    let region = RasterRegion::new(0, 0, 16, 16);
    let mut out = Raster::new(region).unwrap();
    node.fill(&g, &mut out.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 4);

    let mut again = Raster::new(region).unwrap();
    node.fill(&g, &mut again.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 4);
    assert_eq!(out, again);

    let s = node.stats().unwrap();
    assert_eq!((s.hits, s.misses, s.retained_tiles), (4, 4, 4));

    node.invalidate().unwrap();
    assert_eq!(node.stats().unwrap().retained_tiles, 0);
    node.fill(&g, &mut again.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 8);
}

#[test]
fn capacity_bounds_retained_tiles() {
    let (g, src, _, fills) = counting_graph(8);
    let node = TileCacheNode::new(&g, src, 2).unwrap();

    let mut out = Raster::new(RasterRegion::new(0, 0, 16, 16)).unwrap();
    node.fill(&g, &mut out.as_mut()).unwrap();
    assert_eq!(node.stats().unwrap().retained_tiles, 2);

    // The last two tiles in row-major order survive.
    let mut tile = Raster::new(RasterRegion::new(8, 8, 8, 8)).unwrap();
    node.fill(&g, &mut tile.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 4);

    let mut first = Raster::new(RasterRegion::new(0, 0, 8, 8)).unwrap();
    node.fill(&g, &mut first.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 5);
}

#[test]
fn zero_capacity_keeps_one_tile() {
    let (g, src, _, _) = counting_graph(1);
    let node = TileCacheNode::new(&g, src, 0).unwrap();
    let mut out = Raster::new(RasterRegion::new(0, 0, 16, 8)).unwrap();
    node.fill(&g, &mut out.as_mut()).unwrap();
    assert_eq!(node.stats().unwrap().retained_tiles, 1);
}

#[test]
fn partial_requests_fill_whole_tiles() {
    let (g, src, _, fills) = counting_graph(8);
    let node = TileCacheNode::new(&g, src, 8).unwrap();
    assert_eq!(node.kind(), "tile_cache");
    assert_eq!(node.bounds(), RasterRegion::new(0, 0, 16, 16));
    assert_eq!(node.tile_grid().tile_width(), 8);

    let mut px = Raster::new(RasterRegion::new(2, 2, 1, 1)).unwrap();
    node.fill(&g, &mut px.as_mut()).unwrap();
    assert_eq!(px.pixel(2, 2), Some(Rgba8Premul::from_array([2, 2, 0, 255])));

    let mut rest = Raster::new(RasterRegion::new(0, 0, 8, 8)).unwrap();
    node.fill(&g, &mut rest.as_mut()).unwrap();
    assert_eq!(fills.load(Ordering::SeqCst), 1);
    assert_eq!(rest.pixel(7, 7), Some(Rgba8Premul::from_array([7, 7, 0, 255])));
}

#[test]
fn concurrent_overlapping_fills_share_tiles() {
    let (g, src, _, fills) = counting_graph(8);
    let node = TileCacheNode::new(&g, src, 8).unwrap();
    let windows = [RasterRegion::new(0, 0, 16, 12), RasterRegion::new(0, 4, 16, 12)];

    let outputs: Vec<Raster> = std::thread::scope(|s| {
        let handles: Vec<_> = windows
            .iter()
            .map(|&region| {
                let (g, node) = (&g, &node);
                s.spawn(move || {
                    let mut out = Raster::new(region).unwrap();
                    node.fill(g, &mut out.as_mut()).unwrap();
                    out
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let overlap = windows[0].intersect(windows[1]);
    for y in overlap.y()..overlap.bottom() {
        assert_eq!(
            outputs[0].span(y, overlap.x(), overlap.right()),
            outputs[1].span(y, overlap.x(), overlap.right()),
            "row {y}"
        );
    }
    for (out, region) in outputs.iter().zip(windows) {
        let mut direct = Raster::new(region).unwrap();
        g.fill(src, &mut direct.as_mut()).unwrap();
        assert_eq!(out, &direct);
    }

    // Four 8x8 tiles, each rendered exactly once across both threads.
    let stats = node.stats().unwrap();
    assert_eq!(stats.misses, 4);
    assert_eq!(stats.hits, 4);
    assert_eq!(fills.load(Ordering::SeqCst), 4 + 2);
}
