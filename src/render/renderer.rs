use std::sync::Arc;

use crate::{
    foundation::{
        core::{Affine, Point, RasterRegion, Rect, Rgba8Premul},
        error::{GraphError, GraphResult},
    },
    graph::node::{FilterGraph, NodeId},
    raster::buffer::Raster,
    render::{
        config::RendererConfig,
        hints::{Interpolation, RenderHints},
    },
};

/// Graph root a renderer paints: a shared graph plus the node to pull from.
#[derive(Clone, Debug)]
pub struct GraphRoot {
    pub graph: Arc<FilterGraph>,
    pub node: NodeId,
}

/// Paints a filter graph into an owned output buffer.
///
/// The buffer's region is device space: a buffer created for `(-5, 0, 20, 10)` receives
/// device pixels `x in [-5, 15)`. The view transform maps user space (the space node bounds
/// live in) to device space.
#[derive(Debug)]
pub struct GraphRenderer {
    buffer: Raster,
    transform: Affine,
    area_of_interest: Option<Rect>,
    root: Option<GraphRoot>,
    hints: RenderHints,
    clear: Option<Rgba8Premul>,
    progressive_paint_allowed: bool,
}

impl GraphRenderer {
    pub fn new(buffer: Raster) -> GraphResult<Self> {
        Self::with_config(buffer, &RendererConfig::default())
    }

    pub fn with_config(buffer: Raster, config: &RendererConfig) -> GraphResult<Self> {
        check_buffer(&buffer)?;
        Ok(Self {
            buffer,
            transform: Affine::IDENTITY,
            area_of_interest: None,
            root: None,
            hints: config.hints,
            clear: config
                .clear_rgba
                .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a)),
            progressive_paint_allowed: config.progressive_paint,
        })
    }

    /// Replace the painted graph. Nothing is painted until the next [`repaint`].
    ///
    /// [`repaint`]: GraphRenderer::repaint
    pub fn attach_graph(&mut self, graph: Arc<FilterGraph>, root: NodeId) {
        self.root = Some(GraphRoot { graph, node: root });
    }

    pub fn detach_graph(&mut self) -> Option<GraphRoot> {
        self.root.take()
    }

    pub fn root(&self) -> Option<&GraphRoot> {
        self.root.as_ref()
    }

    /// User to device transform; `None` resets to identity.
    pub fn set_transform(&mut self, transform: Option<Affine>) {
        self.transform = transform.unwrap_or(Affine::IDENTITY);
    }

    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Swap the paint target. A buffer with a zero dimension is rejected and the current
    /// buffer stays in place.
    pub fn set_output_buffer(&mut self, buffer: Raster) -> GraphResult<()> {
        check_buffer(&buffer)?;
        self.buffer = buffer;
        Ok(())
    }

    pub fn output_buffer(&self) -> &Raster {
        &self.buffer
    }

    pub fn into_output_buffer(self) -> Raster {
        self.buffer
    }

    /// Area passed to the last [`repaint`](GraphRenderer::repaint), in user space.
    pub fn area_of_interest(&self) -> Option<Rect> {
        self.area_of_interest
    }

    pub fn hints(&self) -> RenderHints {
        self.hints
    }

    pub fn set_hints(&mut self, hints: RenderHints) {
        self.hints = hints;
    }

    pub fn progressive_paint_allowed(&self) -> bool {
        self.progressive_paint_allowed
    }

    /// Advisory only. Turning it off after progressive content was drawn means the caller
    /// should issue a full [`repaint`](GraphRenderer::repaint).
    pub fn set_progressive_paint_allowed(&mut self, allowed: bool) {
        self.progressive_paint_allowed = allowed;
    }

    /// Paint `area` (user space) of the attached graph into the output buffer.
    ///
    /// Device pixels outside the transformed area, outside the buffer, or outside the root's
    /// bounds are left as they are. Without an attached graph this is a no-op.
    #[tracing::instrument(skip(self), fields(transform = ?self.transform))]
    pub fn repaint(&mut self, area: Rect) -> GraphResult<()> {
        self.area_of_interest = Some(area);
        let Some(root) = self.root.clone() else {
            tracing::debug!("no graph attached");
            return Ok(());
        };

        // Coverage never depends on hints: every device pixel the area touches.
        let device = RasterRegion::enclosing(self.transform.transform_rect_bbox(area.abs()))
            .intersect(self.buffer.region());
        if device.is_empty() {
            return Ok(());
        }
        if let Some(px) = self.clear {
            self.buffer.window_mut(device).fill_region(device, px);
        }

        match integer_translation(self.transform) {
            Some((dx, dy)) => {
                let mut view = self.buffer.window_mut(device).translated(-dx, -dy)?;
                root.graph.fill(root.node, &mut view)?;
            }
            None => self.resample(&root, area, device)?,
        }
        Ok(())
    }

    fn resample(&mut self, root: &GraphRoot, area: Rect, device: RasterRegion) -> GraphResult<()> {
        if !self.transform.determinant().is_normal() {
            tracing::debug!("singular view transform, nothing painted");
            return Ok(());
        }
        let inverse = self.transform.inverse();
        let root_bounds = root.graph.bounds(root.node)?;
        let mapped = RasterRegion::enclosing(inverse.transform_rect_bbox(device.to_rect()));
        let user = RasterRegion::from_edges(
            mapped.x().saturating_sub(1),
            mapped.y().saturating_sub(1),
            mapped.right().saturating_add(1),
            mapped.bottom().saturating_add(1),
        )
        .intersect(root_bounds);
        if user.is_empty() {
            return Ok(());
        }

        let interpolation = self.hints.interpolation;
        let scratch = if user.pixel_count() <= MAX_SCRATCH_PIXELS {
            let mut scratch = Raster::new(user)?;
            root.graph.fill(root.node, &mut scratch.as_mut())?;
            Some(scratch)
        } else {
            tracing::debug!(?user, "scratch raster too large, sampling per pixel");
            None
        };

        let area = area.abs();
        let mut out = self.buffer.window_mut(device);
        for y in device.y()..device.bottom() {
            for x in device.x()..device.right() {
                let p = inverse * Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                if !area.contains(p)
                    || !root_bounds.contains_point(p.x.floor() as i32, p.y.floor() as i32)
                {
                    continue;
                }
                let sampled = match &scratch {
                    Some(scratch) => sample(scratch, p, interpolation),
                    None => {
                        let mut window =
                            Raster::new(sample_footprint(p, interpolation).intersect(root_bounds))?;
                        root.graph.fill(root.node, &mut window.as_mut())?;
                        sample(&window, p, interpolation)
                    }
                };
                if let Some(px) = sampled {
                    out.set_pixel(x, y, px);
                }
            }
        }
        Ok(())
    }
}

fn check_buffer(buffer: &Raster) -> GraphResult<()> {
    if buffer.width() == 0 || buffer.height() == 0 {
        return Err(GraphError::invalid_argument(format!(
            "output buffer should have positive width/height, got {}x{}",
            buffer.width(),
            buffer.height()
        )));
    }
    Ok(())
}

fn integer_translation(t: Affine) -> Option<(i32, i32)> {
    let [a, b, c, d, e, f] = t.as_coeffs();
    let in_range = |v: f64| v.fract() == 0.0 && v.abs() <= f64::from(i32::MAX);
    if a == 1.0 && b == 0.0 && c == 0.0 && d == 1.0 && in_range(e) && in_range(f) {
        Some((e as i32, f as i32))
    } else {
        None
    }
}

/// Largest user-space raster `resample` fills in one pass (64 MiB of RGBA8).
pub(crate) const MAX_SCRATCH_PIXELS: u64 = 1 << 24;

fn sample(src: &Raster, p: Point, interpolation: Interpolation) -> Option<Rgba8Premul> {
    match interpolation {
        Interpolation::NearestNeighbor => sample_nearest(src, p),
        Interpolation::Bilinear => sample_bilinear(src, p),
    }
}

/// User pixels a single sample at `p` reads.
fn sample_footprint(p: Point, interpolation: Interpolation) -> RasterRegion {
    match interpolation {
        Interpolation::NearestNeighbor => {
            RasterRegion::new(p.x.floor() as i32, p.y.floor() as i32, 1, 1)
        }
        Interpolation::Bilinear => RasterRegion::new(
            (p.x - 0.5).floor() as i32,
            (p.y - 0.5).floor() as i32,
            2,
            2,
        ),
    }
}

fn sample_nearest(src: &Raster, p: Point) -> Option<Rgba8Premul> {
    src.pixel(p.x.floor() as i32, p.y.floor() as i32)
}

/// Bilinear sample between pixel centers. Taps past the edge of `src` reuse the edge pixel.
fn sample_bilinear(src: &Raster, p: Point) -> Option<Rgba8Premul> {
    let r = src.region();
    if r.is_empty() {
        return None;
    }
    let fx = p.x - 0.5;
    let fy = p.y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let clamp_x = |x: i32| x.clamp(r.x(), r.right() - 1);
    let clamp_y = |y: i32| y.clamp(r.y(), r.bottom() - 1);
    let (xa, xb) = (clamp_x(x0 as i32), clamp_x((x0 as i32).saturating_add(1)));
    let (ya, yb) = (clamp_y(y0 as i32), clamp_y((y0 as i32).saturating_add(1)));

    let taps = [
        (xa, ya, (1.0 - tx) * (1.0 - ty)),
        (xb, ya, tx * (1.0 - ty)),
        (xa, yb, (1.0 - tx) * ty),
        (xb, yb, tx * ty),
    ];
    let mut acc = [0.0f64; 4];
    for (x, y, w) in taps {
        let px = src.pixel(x, y)?;
        for (a, c) in acc.iter_mut().zip(px.to_array()) {
            *a += w * f64::from(c);
        }
    }
    Some(Rgba8Premul::from_array(
        acc.map(|v| v.round().clamp(0.0, 255.0) as u8),
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
