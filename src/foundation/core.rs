use crate::foundation::error::{GraphError, GraphResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Integer pixel rectangle.
///
/// Width and height are unsigned, so a region is never inverted. A region with a zero
/// dimension is empty and carries no pixels; its origin is kept but carries no meaning.
/// Edges are clamped so that `x + width` and `y + height` stay representable as `i32`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "RegionRecord", into = "RegionRecord")]
pub struct RasterRegion {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

/// Serialized form of [`RasterRegion`]; reading it back goes through [`RasterRegion::new`].
#[derive(Clone, Copy, serde::Serialize, serde::Deserialize)]
struct RegionRecord {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl From<RegionRecord> for RasterRegion {
    fn from(r: RegionRecord) -> Self {
        Self::new(r.x, r.y, r.width, r.height)
    }
}

impl From<RasterRegion> for RegionRecord {
    fn from(r: RasterRegion) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl RasterRegion {
    /// Canonical empty region at the origin.
    pub const EMPTY: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width: width.min(room_after(x)),
            height: height.min(room_after(y)),
        }
    }

    /// Region spanning `[x0, x1) x [y0, y1)`; inverted edges produce an empty region.
    pub fn from_edges(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let width = (i64::from(x1) - i64::from(x0)).max(0) as u32;
        let height = (i64::from(y1) - i64::from(y0)).max(0) as u32;
        Self {
            x: x0,
            y: y0,
            width,
            height,
        }
    }

    /// Smallest integer region covering `rect`. Non-finite rects produce [`Self::EMPTY`].
    pub fn enclosing(rect: Rect) -> Self {
        if !rect.is_finite() {
            return Self::EMPTY;
        }
        let r = rect.abs();
        Self::from_edges(
            clamp_to_i32(r.x0.floor()),
            clamp_to_i32(r.y0.floor()),
            clamp_to_i32(r.x1.ceil()),
            clamp_to_i32(r.y1.ceil()),
        )
    }

    pub fn x(self) -> i32 {
        self.x
    }

    pub fn y(self) -> i32 {
        self.y
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        (i64::from(self.x) + i64::from(self.width)) as i32
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        (i64::from(self.y) + i64::from(self.height)) as i32
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn contains_point(self, x: i32, y: i32) -> bool {
        self.x <= x && x < self.right() && self.y <= y && y < self.bottom()
    }

    /// Whether every pixel of `other` lies in `self`. Empty regions are contained everywhere.
    pub fn contains(self, other: RasterRegion) -> bool {
        other.is_empty()
            || (self.x <= other.x
                && self.y <= other.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    pub fn intersect(self, other: RasterRegion) -> RasterRegion {
        Self::from_edges(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        )
    }

    pub fn intersects(self, other: RasterRegion) -> bool {
        !self.intersect(other).is_empty()
    }

    /// Bounding region of both operands; empty operands do not contribute.
    pub fn union(self, other: RasterRegion) -> RasterRegion {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Self::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    pub fn translate(self, dx: i32, dy: i32) -> RasterRegion {
        Self::new(
            self.x.saturating_add(dx),
            self.y.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Exact translation, or `None` when an edge would leave the `i32` range.
    pub fn checked_translate(self, dx: i32, dy: i32) -> Option<RasterRegion> {
        let x = self.x.checked_add(dx)?;
        let y = self.y.checked_add(dy)?;
        if self.width > room_after(x) || self.height > room_after(y) {
            return None;
        }
        Some(Self { x, y, ..self })
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.right()),
            f64::from(self.bottom()),
        )
    }
}

fn room_after(origin: i32) -> u32 {
    (i64::from(i32::MAX) - i64::from(origin)) as u32
}

fn clamp_to_i32(v: f64) -> i32 {
    v.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
}

/// Tile-grid alignment for a raster: tile `(tx, ty)` starts at
/// `(offset_x + tx * tile_width, offset_y + ty * tile_height)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TileGrid {
    offset_x: i32,
    offset_y: i32,
    tile_width: u32,
    tile_height: u32,
}

impl TileGrid {
    pub fn new(offset_x: i32, offset_y: i32, tile_width: u32, tile_height: u32) -> GraphResult<Self> {
        if tile_width == 0 || tile_height == 0 {
            return Err(GraphError::invalid_argument(format!(
                "tile size must be positive, got {tile_width}x{tile_height}"
            )));
        }
        Ok(Self {
            offset_x,
            offset_y,
            tile_width,
            tile_height,
        })
    }

    /// One tile spanning `region` (at least 1x1).
    pub fn covering(region: RasterRegion) -> Self {
        Self {
            offset_x: region.x(),
            offset_y: region.y(),
            tile_width: region.width().max(1),
            tile_height: region.height().max(1),
        }
    }

    pub fn offset_x(self) -> i32 {
        self.offset_x
    }

    pub fn offset_y(self) -> i32 {
        self.offset_y
    }

    pub fn tile_width(self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(self) -> u32 {
        self.tile_height
    }

    /// Same alignment, different tile size.
    pub fn with_tile_size(self, tile_width: u32, tile_height: u32) -> GraphResult<Self> {
        Self::new(self.offset_x, self.offset_y, tile_width, tile_height)
    }

    /// Same tile size, anchored at a new origin.
    pub fn with_offset(self, offset_x: i32, offset_y: i32) -> Self {
        Self {
            offset_x,
            offset_y,
            ..self
        }
    }

    pub fn tile_region(self, tx: i64, ty: i64) -> RasterRegion {
        let x0 = i64::from(self.offset_x) + tx * i64::from(self.tile_width);
        let y0 = i64::from(self.offset_y) + ty * i64::from(self.tile_height);
        let x1 = x0 + i64::from(self.tile_width);
        let y1 = y0 + i64::from(self.tile_height);
        RasterRegion::from_edges(
            clamp_i64(x0),
            clamp_i64(y0),
            clamp_i64(x1),
            clamp_i64(y1),
        )
    }

    /// Tile indices touching `region`, row-major.
    pub fn tiles_overlapping(self, region: RasterRegion) -> impl Iterator<Item = (i64, i64)> {
        let (xs, ys) = if region.is_empty() {
            (0..0, 0..0)
        } else {
            let tx0 = tile_index(region.x(), self.offset_x, self.tile_width);
            let tx1 = tile_index(region.right() - 1, self.offset_x, self.tile_width);
            let ty0 = tile_index(region.y(), self.offset_y, self.tile_height);
            let ty1 = tile_index(region.bottom() - 1, self.offset_y, self.tile_height);
            (tx0..tx1 + 1, ty0..ty1 + 1)
        };
        ys.flat_map(move |ty| xs.clone().map(move |tx| (tx, ty)))
    }
}

fn tile_index(v: i32, offset: i32, size: u32) -> i64 {
    (i64::from(v) - i64::from(offset)).div_euclid(i64::from(size))
}

fn clamp_i64(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Sample arrangement of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleLayout {
    /// Four interleaved 8-bit samples: red, green, blue, alpha.
    Rgba8,
}

impl SampleLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
        }
    }
}

/// Pixel format descriptor carried by every node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PixelFormat {
    pub layout: SampleLayout,
    pub alpha_premultiplied: bool,
}

impl PixelFormat {
    /// The format rasters are exchanged in between nodes.
    pub const RGBA8_PREMUL: Self = Self {
        layout: SampleLayout::Rgba8,
        alpha_premultiplied: true,
    };

    /// Straight (non-premultiplied) RGBA8, as decoded from image files.
    pub const RGBA8_STRAIGHT: Self = Self {
        layout: SampleLayout::Rgba8,
        alpha_premultiplied: false,
    };

    pub fn bytes_per_pixel(self) -> usize {
        self.layout.bytes_per_pixel()
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Premul {
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Undo premultiplication; fully transparent pixels become transparent black.
    pub fn to_straight_rgba(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let unpremul = |c: u8| -> u8 {
            let v = (u32::from(c) * 255 + u32::from(self.a) / 2) / u32::from(self.a);
            v.min(255) as u8
        };
        [unpremul(self.r), unpremul(self.g), unpremul(self.b), self.a]
    }

    pub fn from_array(px: [u8; 4]) -> Self {
        Self {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
