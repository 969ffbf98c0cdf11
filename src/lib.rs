//! rastergraph is a pull-based raster filter graph.
//!
//! Nodes form an acyclic graph held in a [`FilterGraph`] arena. A consumer asks a node to
//! fill a window of premultiplied RGBA8 pixels, and the node pulls what it needs from its
//! sources:
//!
//! - Leaves: [`RasterSource`] and [`FloodNode`]
//! - [`PadCropNode`] re-frames a source to new bounds with a [`PadMode`] edge policy
//! - [`CompositeNode`] stacks sources with a [`CompositeOperator`]
//! - [`TileCacheNode`] keeps rendered tiles of any node
//!
//! [`GraphRenderer`] paints a graph root into an output buffer under a view transform.
#![forbid(unsafe_code)]

mod composite;
mod foundation;
mod graph;
mod raster;
mod render;
mod scene;

pub use crate::foundation::core::{
    Affine, PixelFormat, Point, RasterRegion, Rect, Rgba8Premul, SampleLayout, TileGrid, Vec2,
};
pub use crate::foundation::error::{GraphError, GraphResult};

pub use crate::composite::math::{PremulRgba8, composite, composite_in_place};
pub use crate::composite::rule::{ArithmeticCoefficients, CompositeOperator, CompositeRecord};
pub use crate::graph::cache::{DEFAULT_TILE_CACHE_CAPACITY, TileCacheNode, TileCacheStats};
pub use crate::graph::composite::CompositeNode;
pub use crate::graph::node::{FilterGraph, FilterNode, NodeId};
pub use crate::graph::pad::{MIN_PAD_TILE, PadCropNode, PadMode, pad_bands};
pub use crate::graph::source::{FloodNode, RasterSource};
pub use crate::raster::buffer::{Raster, RasterMut};
pub use crate::render::config::RendererConfig;
pub use crate::render::hints::{Interpolation, RenderHints};
pub use crate::render::renderer::{GraphRenderer, GraphRoot};
pub use crate::scene::{GraphDesc, NodeDesc};
