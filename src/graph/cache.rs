use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use crate::{
    foundation::{
        core::{PixelFormat, RasterRegion, TileGrid},
        error::{GraphError, GraphResult},
    },
    graph::node::{FilterGraph, FilterNode, NodeId},
    raster::buffer::{Raster, RasterMut},
};

pub const DEFAULT_TILE_CACHE_CAPACITY: usize = 64;

type TileKey = (i64, i64);

/// Counters reported by [`TileCacheNode::stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub retained_tiles: usize,
}

/// Opt-in pixel cache around one source, keyed by the source's tile grid.
///
/// Tiles are rendered on first request and kept in a bounded LRU. Fills hold the store
/// lock for their whole duration, so concurrent fills through the same node never see a
/// half-written tile.
#[derive(Debug)]
pub struct TileCacheNode {
    source: [NodeId; 1],
    bounds: RasterRegion,
    format: PixelFormat,
    grid: TileGrid,
    capacity: usize,
    store: Mutex<TileStore>,
}

#[derive(Debug, Default)]
struct TileStore {
    tiles: HashMap<TileKey, Raster>,
    lru: VecDeque<TileKey>,
    stats: TileCacheStats,
}

impl TileStore {
    fn insert(&mut self, key: TileKey, tile: Raster, capacity: usize) {
        self.tiles.insert(key, tile);
        self.touch(key);
        while self.lru.len() > capacity {
            if let Some(old) = self.lru.pop_front() {
                self.tiles.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: TileKey) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

impl TileCacheNode {
    /// A zero `capacity` is treated as 1.
    pub fn new(graph: &FilterGraph, source: NodeId, capacity: usize) -> GraphResult<Self> {
        let src = graph.node(source)?;
        Ok(Self {
            source: [source],
            bounds: src.bounds(),
            format: src.format(),
            grid: src.tile_grid(),
            capacity: capacity.max(1),
            store: Mutex::new(TileStore::default()),
        })
    }

    pub fn stats(&self) -> GraphResult<TileCacheStats> {
        let store = self.lock()?;
        Ok(TileCacheStats {
            retained_tiles: store.tiles.len(),
            ..store.stats
        })
    }

    /// Drop every cached tile. Counters are kept.
    pub fn invalidate(&self) -> GraphResult<()> {
        let mut store = self.lock()?;
        store.tiles.clear();
        store.lru.clear();
        Ok(())
    }

    fn lock(&self) -> GraphResult<std::sync::MutexGuard<'_, TileStore>> {
        self.store
            .lock()
            .map_err(|_| GraphError::evaluation("tile cache lock poisoned"))
    }
}

impl FilterNode for TileCacheNode {
    fn kind(&self) -> &'static str {
        "tile_cache"
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
        let mut store = self.lock()?;
        for key in self.grid.tiles_overlapping(dst.region()) {
            if let Some(tile) = store.tiles.get(&key) {
                dst.copy_from(tile);
                store.stats.hits += 1;
                store.touch(key);
                continue;
            }

            let region = self.grid.tile_region(key.0, key.1).intersect(self.bounds);
            let mut tile = Raster::new(region)?;
            graph.fill(self.source[0], &mut tile.as_mut())?;
            tracing::debug!(tile = ?key, ?region, "tile cache miss");
            dst.copy_from(&tile);
            store.stats.misses += 1;
            store.insert(key, tile, self.capacity);
        }
        Ok(())
    }
}

impl FilterGraph {
    pub fn add_tile_cache(&mut self, source: NodeId, capacity: usize) -> GraphResult<NodeId> {
        let node = TileCacheNode::new(self, source, capacity)?;
        self.add(node)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/cache.rs"]
mod tests;
