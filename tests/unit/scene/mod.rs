use super::*;

const GRAPH: &str = r#"{
  "nodes": [
    { "kind": "flood", "bounds": { "x": 0, "y": 0, "width": 4, "height": 4 }, "rgba": [255, 0, 0, 255] },
    { "kind": "flood", "bounds": { "x": 2, "y": 2, "width": 4, "height": 4 }, "rgba": [0, 0, 255, 128] },
    { "kind": "composite", "sources": [0, 1], "op": { "rule": "over" } },
    { "kind": "pad_crop", "source": 2, "bounds": { "x": -2, "y": -2, "width": 10, "height": 10 }, "mode": "replicate" },
    { "kind": "tile_cache", "source": 3 }
  ],
  "root": 4
}"#;

#[test]
fn parses_and_builds_every_node_kind() {
    let desc = GraphDesc::from_json(GRAPH).unwrap();
    assert_eq!(desc.nodes.len(), 5);
    assert_eq!(
        desc.nodes[3],
        NodeDesc::PadCrop {
            source: 2,
            bounds: RasterRegion::new(-2, -2, 10, 10),
            mode: PadMode::Replicate,
        }
    );

    let (graph, root) = desc.build(Path::new(".")).unwrap();
    assert_eq!(graph.len(), 5);
    assert_eq!(root, NodeId(4));
    let kinds: Vec<_> = graph
        .ids()
        .map(|id| graph.node(id).unwrap().kind())
        .collect();
    assert_eq!(kinds, ["flood", "flood", "composite", "pad_crop", "tile_cache"]);
    assert_eq!(graph.bounds(root).unwrap(), RasterRegion::new(-2, -2, 10, 10));
}

#[test]
fn flood_colors_are_premultiplied() {
    let desc = GraphDesc::from_json(GRAPH).unwrap();
    let (graph, _) = desc.build(Path::new(".")).unwrap();
    let mut out = crate::raster::buffer::Raster::new(RasterRegion::new(5, 5, 1, 1)).unwrap();
    graph.fill(NodeId(1), &mut out.as_mut()).unwrap();
    assert_eq!(
        out.pixel(5, 5),
        Some(Rgba8Premul::from_straight_rgba(0, 0, 255, 128))
    );
}

#[test]
fn rejects_forward_references_and_bad_roots() {
    let mut desc = GraphDesc::from_json(GRAPH).unwrap();
    desc.root = 9;
    assert!(matches!(desc.validate(), Err(GraphError::InvalidArgument(_))));

    let mut desc = GraphDesc::from_json(GRAPH).unwrap();
    desc.nodes.swap(2, 3);
    assert!(matches!(
        desc.build(Path::new(".")),
        Err(GraphError::InvalidArgument(_))
    ));

    let empty = GraphDesc {
        nodes: Vec::new(),
        root: 0,
    };
    assert!(empty.validate().is_err());
}

#[test]
fn rejects_empty_composites() {
    let desc = GraphDesc {
        nodes: vec![NodeDesc::Composite {
            sources: Vec::new(),
            op: CompositeOperator::Over,
        }],
        root: 0,
    };
    assert!(matches!(desc.validate(), Err(GraphError::InvalidArgument(_))));
}

#[test]
fn unknown_rule_is_a_serde_error() {
    let json = GRAPH.replace(r#""rule": "over""#, r#""rule": "multiply""#);
    let err = GraphDesc::from_json(&json).unwrap_err();
    assert!(matches!(err, GraphError::Serde(_)));
    assert!(err.to_string().contains("multiply"));
}

#[test]
fn tile_cache_capacity_defaults_from_caller() {
    let desc = GraphDesc {
        nodes: vec![
            NodeDesc::Flood {
                bounds: RasterRegion::new(0, 0, 2, 2),
                rgba: [1, 2, 3, 255],
            },
            NodeDesc::TileCache {
                source: 0,
                capacity: None,
            },
        ],
        root: 1,
    };
    let json = serde_json::to_string(&desc).unwrap();
    assert!(!json.contains("capacity"));
    assert_eq!(GraphDesc::from_json(&json).unwrap(), desc);

    let (graph, root) = desc.build_with_capacity(Path::new("."), 3).unwrap();
    assert_eq!(graph.node(root).unwrap().kind(), "tile_cache");
}

#[test]
fn missing_image_is_reported_with_its_path() {
    let desc = GraphDesc {
        nodes: vec![NodeDesc::Image {
            path: PathBuf::from("missing.png"),
            x: 0,
            y: 0,
        }],
        root: 0,
    };
    let err = desc.build(Path::new("no-such-dir")).unwrap_err();
    assert!(err.to_string().contains("missing.png"));
}

#[test]
fn flood_near_i32_edge_paints_its_declared_bounds() {
    let json = r#"{"nodes":[{"kind":"flood","bounds":{"x":2147483640,"y":0,"width":20,"height":1},"rgba":[0,255,0,255]}],"root":0}"#;
    let (graph, root) = GraphDesc::from_json(json)
        .unwrap()
        .build(Path::new("."))
        .unwrap();
    let bounds = graph.bounds(root).unwrap();
    assert_eq!(bounds.right(), i32::MAX);

    let mut out = crate::raster::buffer::Raster::new(bounds).unwrap();
    graph.fill(root, &mut out.as_mut()).unwrap();
    assert_eq!(out.pixel(2147483641, 0).map(|p| p.a), Some(255));
}
