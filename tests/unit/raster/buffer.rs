use super::*;

fn px(v: u8) -> Rgba8Premul {
    Rgba8Premul::from_array([v, v, v, 255])
}

#[test]
fn new_raster_is_transparent() {
    let r = Raster::new(RasterRegion::new(-2, 3, 4, 2)).unwrap();
    assert_eq!(r.data().len(), 4 * 2 * 4);
    assert!(r.data().iter().all(|&b| b == 0));
    assert_eq!(r.pixel(-2, 3), Some(Rgba8Premul::transparent()));
    assert_eq!(r.pixel(2, 3), None);
}

#[test]
fn from_rgba8_rejects_wrong_length() {
    let err = Raster::from_rgba8(
        RasterRegion::new(0, 0, 2, 2),
        PixelFormat::RGBA8_PREMUL,
        vec![0; 15],
    )
    .unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));
}

#[test]
fn from_rgba8_premultiplies_straight_input() {
    let r = Raster::from_rgba8(
        RasterRegion::new(0, 0, 1, 1),
        PixelFormat::RGBA8_STRAIGHT,
        vec![200, 100, 0, 128],
    )
    .unwrap();
    assert_eq!(r.data(), &[100, 50, 0, 128]);
}

#[test]
fn child_window_writes_stay_inside() {
    let mut r = Raster::new(RasterRegion::new(0, 0, 4, 4)).unwrap();
    {
        let mut whole = r.as_mut();
        let mut child = whole.child(RasterRegion::new(1, 1, 2, 2));
        assert_eq!(child.region(), RasterRegion::new(1, 1, 2, 2));
        child.fill_region(RasterRegion::new(0, 0, 10, 10), px(9));
        assert!(!child.set_pixel(0, 0, px(1)));
    }
    for y in 0..4 {
        for x in 0..4 {
            let inside = (1..3).contains(&x) && (1..3).contains(&y);
            let expected = if inside { px(9) } else { Rgba8Premul::transparent() };
            assert_eq!(r.pixel(x, y), Some(expected), "pixel ({x},{y})");
        }
    }
}

#[test]
fn child_of_child_is_intersected() {
    let mut r = Raster::new(RasterRegion::new(0, 0, 8, 8)).unwrap();
    let mut whole = r.as_mut();
    let mut a = whole.child(RasterRegion::new(2, 2, 4, 4));
    let b = a.child(RasterRegion::new(5, 0, 10, 3));
    assert_eq!(b.region(), RasterRegion::new(5, 2, 1, 1));
}

#[test]
fn window_mut_clips_to_raster() {
    let mut r = Raster::new(RasterRegion::new(0, 0, 4, 4)).unwrap();
    let w = r.window_mut(RasterRegion::new(-3, 2, 5, 9));
    assert_eq!(w.region(), RasterRegion::new(0, 2, 2, 2));
}

#[test]
fn translated_window_addresses_shifted_coordinates() {
    let mut r = Raster::new(RasterRegion::new(0, 0, 4, 1)).unwrap();
    {
        let mut w = r.as_mut().translated(-5, 0).unwrap();
        assert_eq!(w.region(), RasterRegion::new(-5, 0, 4, 1));
        assert!(w.set_pixel(-5, 0, px(7)));
    }
    assert_eq!(r.pixel(0, 0), Some(px(7)));
}

#[test]
fn span_is_clipped() {
    let mut r = Raster::filled(RasterRegion::new(0, 0, 3, 2), px(4)).unwrap();
    assert_eq!(r.span(0, -10, 10).len(), 12);
    assert_eq!(r.span(5, 0, 3).len(), 0);
    let mut w = r.window_mut(RasterRegion::new(1, 0, 1, 2));
    assert_eq!(w.span_mut(1, 0, 3).len(), 4);
    assert_eq!(w.span(1, 2, 3).len(), 0);
}

#[test]
fn copy_from_overwrites_overlap_only() {
    let src = Raster::filled(RasterRegion::new(1, 0, 2, 1), px(200)).unwrap();
    let mut dst = Raster::filled(RasterRegion::new(0, 0, 4, 1), px(10)).unwrap();
    dst.as_mut().copy_from(&src);
    assert_eq!(dst.pixel(0, 0), Some(px(10)));
    assert_eq!(dst.pixel(1, 0), Some(px(200)));
    assert_eq!(dst.pixel(2, 0), Some(px(200)));
    assert_eq!(dst.pixel(3, 0), Some(px(10)));
}

#[test]
fn to_straight_rgba8_unpremultiplies() {
    let r = Raster::filled(
        RasterRegion::new(0, 0, 1, 1),
        Rgba8Premul::from_array([100, 50, 0, 128]),
    )
    .unwrap();
    assert_eq!(r.to_straight_rgba8(), vec![199, 100, 0, 128]);
}

#[test]
fn translated_refuses_to_shrink_the_parent() {
    let mut r = Raster::new(RasterRegion::new(0, 0, 4, 1)).unwrap();
    let err = r.as_mut().translated(i32::MAX - 2, 0).unwrap_err();
    assert!(matches!(err, GraphError::InvalidArgument(_)));

    let mut w = r.as_mut().translated(i32::MAX - 4, 0).unwrap();
    assert_eq!(w.region().width(), 4);
    assert!(w.set_pixel(i32::MAX - 1, 0, px(9)));
    assert_eq!(r.pixel(3, 0), Some(px(9)));
}
