use std::ops::Range;

use crate::foundation::{
    core::{PixelFormat, RasterRegion, Rgba8Premul},
    error::{GraphError, GraphResult},
    math::buffer_len,
};

const BPP: usize = 4;

/// Owned premultiplied RGBA8 pixels positioned at `region`.
///
/// Pixel `(x, y)` of the region lives at byte `((y - region.y) * width + (x - region.x)) * 4`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    region: RasterRegion,
    data: Vec<u8>,
}

impl Raster {
    /// Fully transparent raster covering `region`.
    pub fn new(region: RasterRegion) -> GraphResult<Self> {
        let len = byte_len(region)?;
        Ok(Self {
            region,
            data: vec![0u8; len],
        })
    }

    pub fn filled(region: RasterRegion, px: Rgba8Premul) -> GraphResult<Self> {
        let mut raster = Self::new(region)?;
        for chunk in raster.data.chunks_exact_mut(BPP) {
            chunk.copy_from_slice(&px.to_array());
        }
        Ok(raster)
    }

    /// Wrap tightly packed RGBA8 bytes, premultiplying them when `format` is straight alpha.
    pub fn from_rgba8(
        region: RasterRegion,
        format: PixelFormat,
        mut data: Vec<u8>,
    ) -> GraphResult<Self> {
        let len = byte_len(region)?;
        if data.len() != len {
            return Err(GraphError::invalid_argument(format!(
                "raster {}x{} expects {len} bytes, got {}",
                region.width(),
                region.height(),
                data.len()
            )));
        }
        if !format.alpha_premultiplied {
            for px in data.chunks_exact_mut(BPP) {
                let p = Rgba8Premul::from_straight_rgba(px[0], px[1], px[2], px[3]);
                px.copy_from_slice(&p.to_array());
            }
        }
        Ok(Self { region, data })
    }

    pub fn region(&self) -> RasterRegion {
        self.region
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::RGBA8_PREMUL
    }

    pub fn width(&self) -> u32 {
        self.region.width()
    }

    pub fn height(&self) -> u32 {
        self.region.height()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8Premul> {
        if !self.region.contains_point(x, y) {
            return None;
        }
        let i = pixel_offset(self.region, x, y);
        Some(Rgba8Premul::from_array([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]))
    }

    /// Bytes of row `y` between columns `[x0, x1)`, clipped to the raster.
    pub fn span(&self, y: i32, x0: i32, x1: i32) -> &[u8] {
        match span_range(self.region, self.region, y, x0, x1) {
            Some(r) => &self.data[r],
            None => &[],
        }
    }

    /// Window over the whole raster.
    pub fn as_mut(&mut self) -> RasterMut<'_> {
        RasterMut {
            data: &mut self.data,
            parent: self.region,
            region: self.region,
        }
    }

    /// Window over `region ∩ self.region()`.
    pub fn window_mut(&mut self, region: RasterRegion) -> RasterMut<'_> {
        let clipped = self.region.intersect(region);
        RasterMut {
            data: &mut self.data,
            parent: self.region,
            region: clipped,
        }
    }

    /// Copy of the pixels with premultiplication undone, tightly packed.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len());
        for px in self.data.chunks_exact(BPP) {
            out.extend_from_slice(
                &Rgba8Premul::from_array([px[0], px[1], px[2], px[3]]).to_straight_rgba(),
            );
        }
        out
    }
}

/// Mutable window over part of a [`Raster`].
///
/// The window keeps the parent's coordinate space: a child created for `(5, 5, 2, 2)`
/// addresses its first pixel as `(5, 5)`. Writes never escape [`RasterMut::region`].
#[derive(Debug)]
pub struct RasterMut<'a> {
    data: &'a mut [u8],
    parent: RasterRegion,
    region: RasterRegion,
}

impl<'a> RasterMut<'a> {
    pub fn region(&self) -> RasterRegion {
        self.region
    }

    pub fn format(&self) -> PixelFormat {
        PixelFormat::RGBA8_PREMUL
    }

    /// Narrower window over `region ∩ self.region()`.
    pub fn child(&mut self, region: RasterRegion) -> RasterMut<'_> {
        RasterMut {
            data: &mut *self.data,
            parent: self.parent,
            region: self.region.intersect(region),
        }
    }

    /// Re-address the window so that every coordinate moves by `(dx, dy)`.
    ///
    /// Fails when the shifted parent would leave the `i32` coordinate range; the row length
    /// used for addressing never changes.
    pub fn translated(self, dx: i32, dy: i32) -> GraphResult<RasterMut<'a>> {
        let (Some(parent), Some(region)) = (
            self.parent.checked_translate(dx, dy),
            self.region.checked_translate(dx, dy),
        ) else {
            return Err(GraphError::invalid_argument(format!(
                "translating raster {:?} by ({dx}, {dy}) leaves the i32 range",
                self.parent
            )));
        };
        Ok(RasterMut {
            data: self.data,
            parent,
            region,
        })
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8Premul> {
        if !self.region.contains_point(x, y) {
            return None;
        }
        let i = pixel_offset(self.parent, x, y);
        Some(Rgba8Premul::from_array([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]))
    }

    /// Returns whether the pixel was inside the window.
    pub fn set_pixel(&mut self, x: i32, y: i32, px: Rgba8Premul) -> bool {
        if !self.region.contains_point(x, y) {
            return false;
        }
        let i = pixel_offset(self.parent, x, y);
        self.data[i..i + BPP].copy_from_slice(&px.to_array());
        true
    }

    /// Bytes of row `y` between columns `[x0, x1)`, clipped to the window.
    pub fn span(&self, y: i32, x0: i32, x1: i32) -> &[u8] {
        match span_range(self.parent, self.region, y, x0, x1) {
            Some(r) => &self.data[r],
            None => &[],
        }
    }

    pub fn span_mut(&mut self, y: i32, x0: i32, x1: i32) -> &mut [u8] {
        match span_range(self.parent, self.region, y, x0, x1) {
            Some(r) => &mut self.data[r],
            None => &mut [],
        }
    }

    /// Overwrite `region ∩ self.region()` with `px`.
    pub fn fill_region(&mut self, region: RasterRegion, px: Rgba8Premul) {
        let r = self.region.intersect(region);
        if r.is_empty() {
            return;
        }
        let bytes = px.to_array();
        for y in r.y()..r.bottom() {
            for chunk in self.span_mut(y, r.x(), r.right()).chunks_exact_mut(BPP) {
                chunk.copy_from_slice(&bytes);
            }
        }
    }

    /// Overwrite the whole window with transparent black.
    pub fn clear(&mut self) {
        let region = self.region;
        self.fill_region(region, Rgba8Premul::transparent());
    }

    /// Overwrite the overlap of the window and `src` with `src`'s pixels.
    pub fn copy_from(&mut self, src: &Raster) {
        let r = self.region.intersect(src.region());
        if r.is_empty() {
            return;
        }
        for y in r.y()..r.bottom() {
            let row = src.span(y, r.x(), r.right());
            self.span_mut(y, r.x(), r.right()).copy_from_slice(row);
        }
    }
}

fn byte_len(region: RasterRegion) -> GraphResult<usize> {
    buffer_len(region.width(), region.height(), BPP).ok_or_else(|| {
        GraphError::invalid_argument(format!(
            "raster {}x{} overflows addressable memory",
            region.width(),
            region.height()
        ))
    })
}

fn pixel_offset(parent: RasterRegion, x: i32, y: i32) -> usize {
    let dy = (i64::from(y) - i64::from(parent.y())) as usize;
    let dx = (i64::from(x) - i64::from(parent.x())) as usize;
    (dy * parent.width() as usize + dx) * BPP
}

fn span_range(
    parent: RasterRegion,
    window: RasterRegion,
    y: i32,
    x0: i32,
    x1: i32,
) -> Option<Range<usize>> {
    if y < window.y() || y >= window.bottom() {
        return None;
    }
    let x0 = x0.max(window.x());
    let x1 = x1.min(window.right());
    if x0 >= x1 {
        return None;
    }
    let start = pixel_offset(parent, x0, y);
    let len = (i64::from(x1) - i64::from(x0)) as usize * BPP;
    Some(start..start + len)
}

#[cfg(test)]
#[path = "../../tests/unit/raster/buffer.rs"]
mod tests;
