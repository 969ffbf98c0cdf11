use super::*;
use crate::{composite::math::composite, foundation::core::Rgba8Premul};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const HALF_GREEN: [u8; 4] = [0, 128, 0, 128];

fn flood(g: &mut FilterGraph, region: RasterRegion, px: [u8; 4]) -> NodeId {
    g.add_flood(region, Rgba8Premul::from_array(px)).unwrap()
}

fn render(g: &FilterGraph, id: NodeId, region: RasterRegion) -> Raster {
    let mut out = Raster::new(region).unwrap();
    g.fill(id, &mut out.as_mut()).unwrap();
    out
}

fn at(r: &Raster, x: i32, y: i32) -> [u8; 4] {
    r.pixel(x, y).unwrap().to_array()
}

#[test]
fn bounds_default_to_union_of_sources() {
    let mut g = FilterGraph::new();
    let a = flood(&mut g, RasterRegion::new(0, 0, 4, 4), RED);
    let b = flood(&mut g, RasterRegion::new(6, 2, 4, 4), BLUE);
    let c = g.add_composite(vec![a, b], CompositeOperator::Over).unwrap();
    assert_eq!(g.bounds(c).unwrap(), RasterRegion::new(0, 0, 10, 6));
    assert_eq!(g.node(c).unwrap().sources(), &[a, b]);
}

#[test]
fn over_stacks_later_sources_on_top() {
    let mut g = FilterGraph::new();
    let back = flood(&mut g, RasterRegion::new(0, 0, 4, 4), BLUE);
    let front = flood(&mut g, RasterRegion::new(2, 0, 4, 4), RED);
    let c = g.add_composite(vec![back, front], CompositeOperator::Over).unwrap();

    let out = render(&g, c, RasterRegion::new(0, 0, 6, 4));
    assert_eq!(at(&out, 0, 0), BLUE);
    assert_eq!(at(&out, 2, 0), RED);
    assert_eq!(at(&out, 5, 3), RED);
}

#[test]
fn outside_a_source_counts_as_transparent() {
    let mut g = FilterGraph::new();
    let back = flood(&mut g, RasterRegion::new(0, 0, 2, 1), BLUE);
    let front = flood(&mut g, RasterRegion::new(1, 0, 2, 1), RED);
    let c = g.add_composite(vec![back, front], CompositeOperator::In).unwrap();

    let out = render(&g, c, RasterRegion::new(0, 0, 3, 1));
    // `In` keeps the incoming layer only where the backdrop has coverage.
    assert_eq!(at(&out, 0, 0), [0, 0, 0, 0]);
    assert_eq!(at(&out, 1, 0), RED);
    assert_eq!(at(&out, 2, 0), [0, 0, 0, 0]);
}

#[test]
fn half_transparent_over_opaque() {
    let mut g = FilterGraph::new();
    let back = flood(&mut g, RasterRegion::new(0, 0, 1, 1), BLUE);
    let front = flood(&mut g, RasterRegion::new(0, 0, 1, 1), HALF_GREEN);
    let c = g.add_composite(vec![back, front], CompositeOperator::Over).unwrap();

    let out = render(&g, c, RasterRegion::new(0, 0, 1, 1));
    assert_eq!(at(&out, 0, 0), composite(&CompositeOperator::Over, BLUE, HALF_GREEN));
}

#[test]
fn single_source_passes_through() {
    let mut g = FilterGraph::new();
    let only = flood(&mut g, RasterRegion::new(1, 1, 2, 2), HALF_GREEN);
    let c = g.add_composite(vec![only], CompositeOperator::Xor).unwrap();
    let region = RasterRegion::new(0, 0, 4, 4);
    assert_eq!(render(&g, c, region), render(&g, only, region));
}

#[test]
fn arithmetic_combines_every_source_pair() {
    let mut g = FilterGraph::new();
    let region = RasterRegion::new(0, 0, 2, 2);
    let a = flood(&mut g, region, RED);
    let b = flood(&mut g, region, BLUE);
    let op = CompositeOperator::arithmetic(0.0, 1.0, 1.0, 0.0);
    let c = g.add_composite(vec![a, b], op).unwrap();

    let out = render(&g, c, region);
    assert_eq!(at(&out, 1, 1), composite(&op, RED, BLUE));
}

#[test]
fn empty_source_list_is_rejected() {
    let g = FilterGraph::new();
    let err = CompositeNode::new(&g, Vec::new(), CompositeOperator::Over).unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn explicit_bounds_clip_the_result() {
    let mut g = FilterGraph::new();
    let a = flood(&mut g, RasterRegion::new(0, 0, 8, 8), RED);
    let node = CompositeNode::with_bounds(
        &g,
        vec![a],
        CompositeOperator::Over,
        RasterRegion::new(2, 2, 2, 2),
    )
    .unwrap();
    assert_eq!(node.operator(), &CompositeOperator::Over);
    let c = g.add(node).unwrap();

    let out = render(&g, c, RasterRegion::new(0, 0, 8, 8));
    assert_eq!(at(&out, 2, 2), RED);
    assert_eq!(at(&out, 1, 2), [0, 0, 0, 0]);
    assert_eq!(at(&out, 4, 4), [0, 0, 0, 0]);
}
