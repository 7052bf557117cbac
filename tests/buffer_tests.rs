//! End-to-end buffer pipeline tests.

use bufrs::{buffer, buffer_with_params, BufferBuilder, BufferParams, EndCapStyle};
use bufrs::{BufferError, PrecisionModel};
use geo::Area;
use geo_types::{coord, Geometry, LineString, MultiPoint, Point, Polygon};

const PI: f64 = std::f64::consts::PI;

fn line_10() -> Geometry<f64> {
    Geometry::LineString(LineString::from(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 0.0 },
    ]))
}

fn square_10() -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 0.0, y: 10.0 },
            coord! { x: 0.0, y: 0.0 },
        ]),
        Vec::new(),
    ))
}

fn as_polygon(g: Geometry<f64>) -> Polygon<f64> {
    match g {
        Geometry::Polygon(p) => p,
        other => panic!("expected a Polygon result, got {other:?}"),
    }
}

fn area(g: &Geometry<f64>) -> f64 {
    match g {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        other => panic!("expected an areal result, got {other:?}"),
    }
}

#[test]
fn point_buffer_is_a_circle() {
    let g = Geometry::Point(Point::new(0.0, 0.0));
    let result = as_polygon(buffer(&g, 1.0).unwrap());

    // 4 * quadrant_segments distinct vertices plus the closing point
    assert_eq!(result.exterior().0.len(), 33);
    for pt in &result.exterior().0 {
        let r = (pt.x * pt.x + pt.y * pt.y).sqrt();
        assert!((r - 1.0).abs() < 1e-9, "vertex radius {r}");
    }
    // area of the inscribed 32-gon
    let a = result.unsigned_area();
    assert!(a > 3.0 && a < PI, "circle area {a}");
}

#[test]
fn line_buffer_round_cap_is_a_stadium() {
    let result = buffer(&line_10(), 1.0).unwrap();
    let a = area(&result);
    // 20 for the rectangle plus just under pi for the inscribed cap arcs
    assert!(a > 23.0 && a < 20.0 + PI + 1e-9, "stadium area {a}");
}

#[test]
fn line_buffer_flat_cap_is_a_rectangle() {
    let params = BufferParams::default().with_end_cap_style(EndCapStyle::Flat);
    let result = as_polygon(buffer_with_params(&line_10(), 1.0, params).unwrap());
    let a = result.unsigned_area();
    assert!((a - 20.0).abs() < 1e-9, "rectangle area {a}");
}

#[test]
fn line_buffer_square_cap_adds_full_corners() {
    let params = BufferParams::default().with_end_cap_style(EndCapStyle::Square);
    let result = as_polygon(buffer_with_params(&line_10(), 1.0, params).unwrap());
    let a = result.unsigned_area();
    // rectangle of length 12
    assert!((a - 24.0).abs() < 1e-9, "square-cap area {a}");
}

#[test]
fn zero_distance_line_buffer_is_empty() {
    let result = as_polygon(buffer(&line_10(), 0.0).unwrap());
    assert!(result.exterior().0.is_empty());
}

#[test]
fn zero_distance_polygon_buffer_is_the_polygon() {
    let result = as_polygon(buffer(&square_10(), 0.0).unwrap());
    assert!((result.unsigned_area() - 100.0).abs() < 1e-9);
}

#[test]
fn empty_input_buffers_to_empty() {
    let g = Geometry::LineString(LineString::new(Vec::new()));
    let result = as_polygon(buffer(&g, 1.0).unwrap());
    assert!(result.exterior().0.is_empty());
}

#[test]
fn positive_polygon_buffer_expands() {
    let result = as_polygon(buffer(&square_10(), 1.0).unwrap());
    let a = result.unsigned_area();
    // 100 + 4 sides * 10 * 1 + rounded corners just under pi
    assert!(a > 143.0 && a < 100.0 + 40.0 + PI + 1e-9, "area {a}");
}

#[test]
fn negative_polygon_buffer_erodes() {
    let result = as_polygon(buffer(&square_10(), -1.0).unwrap());
    let a = result.unsigned_area();
    assert!((a - 64.0).abs() < 1e-9, "eroded area {a}");
    for pt in &result.exterior().0 {
        assert!(pt.x > 1.0 - 1e-9 && pt.x < 9.0 + 1e-9);
        assert!(pt.y > 1.0 - 1e-9 && pt.y < 9.0 + 1e-9);
    }
}

#[test]
fn negative_buffer_can_empty_the_polygon() {
    let g = Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 4.0, y: 0.0 },
            coord! { x: 4.0, y: 4.0 },
            coord! { x: 0.0, y: 4.0 },
            coord! { x: 0.0, y: 0.0 },
        ]),
        Vec::new(),
    ));
    let result = as_polygon(buffer(&g, -3.0).unwrap());
    assert!(result.exterior().0.is_empty());
}

#[test]
fn polygon_with_hole_negative_buffer_grows_the_hole() {
    let g = Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 10.0, y: 0.0 },
            coord! { x: 10.0, y: 10.0 },
            coord! { x: 0.0, y: 10.0 },
            coord! { x: 0.0, y: 0.0 },
        ]),
        vec![LineString::from(vec![
            coord! { x: 4.0, y: 4.0 },
            coord! { x: 4.0, y: 6.0 },
            coord! { x: 6.0, y: 6.0 },
            coord! { x: 6.0, y: 4.0 },
            coord! { x: 4.0, y: 4.0 },
        ])],
    ));
    let result = as_polygon(buffer(&g, -0.5).unwrap());
    assert_eq!(result.interiors().len(), 1, "hole survives the erosion");

    // outer shrunk by 0.5, hole grown by 0.5 (with rounded corners)
    let a = result.unsigned_area();
    let outer = 81.0;
    let hole_grown = 9.0 - (4.0 - PI) * 0.25;
    assert!(
        (a - (outer - hole_grown)).abs() < 0.05,
        "area {a}, expected about {}",
        outer - hole_grown
    );

    for pt in &result.exterior().0 {
        assert!(pt.x > 0.5 - 1e-9 && pt.x < 9.5 + 1e-9);
    }
}

#[test]
fn every_input_vertex_is_inside_the_positive_buffer() {
    use bufrs::algorithm::point_location::locate_point_in_ring;
    use bufrs::geomgraph::Location;

    let input = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 4.0, y: 3.0 },
        coord! { x: 9.0, y: 1.0 },
        coord! { x: 12.0, y: 6.0 },
    ];
    let g = Geometry::LineString(LineString::from(input.clone()));
    let result = as_polygon(buffer(&g, 2.0).unwrap());
    for pt in input {
        assert_eq!(
            locate_point_in_ring(pt, &result.exterior().0),
            Location::Interior,
            "input vertex {pt:?} not inside the buffer"
        );
    }
}

#[test]
fn result_vertices_stay_within_distance_of_the_input() {
    let input = vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 4.0, y: 3.0 },
        coord! { x: 9.0, y: 1.0 },
    ];
    let g = Geometry::LineString(LineString::from(input.clone()));
    let d = 2.0;
    let result = as_polygon(buffer(&g, d).unwrap());
    for pt in &result.exterior().0 {
        let min_dist = input
            .windows(2)
            .map(|w| {
                // distance from pt to segment
                let (a, b) = (w[0], w[1]);
                let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
                let t = (((pt.x - a.x) * (b.x - a.x) + (pt.y - a.y) * (b.y - a.y)) / len2)
                    .clamp(0.0, 1.0);
                let proj = coord! { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) };
                ((pt.x - proj.x).powi(2) + (pt.y - proj.y).powi(2)).sqrt()
            })
            .fold(f64::INFINITY, f64::min);
        assert!(min_dist <= d + 1e-9, "vertex {pt:?} at distance {min_dist}");
    }
}

#[test]
fn buffers_grow_monotonically_with_distance() {
    let g = Geometry::LineString(LineString::from(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 5.0, y: 5.0 },
        coord! { x: 10.0, y: 0.0 },
    ]));
    let a1 = area(&buffer(&g, 1.0).unwrap());
    let a2 = area(&buffer(&g, 2.0).unwrap());
    let a3 = area(&buffer(&g, 4.0).unwrap());
    assert!(a1 < a2 && a2 < a3);
}

#[test]
fn multipoint_buffer_unions_overlapping_disks() {
    let apart = Geometry::MultiPoint(MultiPoint::from(vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
    ]));
    let result = buffer(&apart, 1.0).unwrap();
    match result {
        Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
        other => panic!("expected MultiPolygon, got {other:?}"),
    }

    let close = Geometry::MultiPoint(MultiPoint::from(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
    ]));
    let result = buffer(&close, 1.0).unwrap();
    let a = area(&result);
    assert!(matches!(result, Geometry::Polygon(_)));
    // merged disks cover less than two full circles
    assert!(a > PI && a < 2.0 * PI);
}

#[test]
fn fixed_precision_model_snaps_result_coordinates() {
    let mut builder = BufferBuilder::new(BufferParams::default());
    builder.set_working_precision_model(PrecisionModel::fixed(10.0));
    let result = as_polygon(builder.buffer(&line_10(), 1.0).unwrap());
    assert!(!result.exterior().0.is_empty());
    for pt in &result.exterior().0 {
        assert_eq!(pt.x, (pt.x * 10.0).round() / 10.0);
        assert_eq!(pt.y, (pt.y * 10.0).round() / 10.0);
    }
}

#[test]
fn interrupt_flag_aborts_the_pipeline() {
    let mut builder = BufferBuilder::new(BufferParams::default());
    builder.interrupt_flag().interrupt();
    let result = builder.buffer(&line_10(), 1.0);
    assert_eq!(result, Err(BufferError::Interrupted));

    // the builder stays usable after a reset
    builder.interrupt_flag().reset();
    assert!(builder.buffer(&line_10(), 1.0).is_ok());
}

#[test]
fn builder_is_reusable_across_calls() {
    let mut builder = BufferBuilder::new(BufferParams::default());
    let first = area(&builder.buffer(&line_10(), 1.0).unwrap());
    let second = area(&builder.buffer(&line_10(), 1.0).unwrap());
    assert_eq!(first, second);
}

#[test]
fn mitre_join_produces_sharp_corners() {
    use bufrs::JoinStyle;
    let params = BufferParams::default()
        .with_join_style(JoinStyle::Mitre)
        .with_end_cap_style(EndCapStyle::Flat);
    let result = as_polygon(buffer_with_params(&square_10(), 1.0, params).unwrap());
    let a = result.unsigned_area();
    // sharp corners give the full 12 x 12 square
    assert!((a - 144.0).abs() < 1e-6, "mitred area {a}");
}

#[test]
fn bevel_join_cuts_the_corners() {
    use bufrs::JoinStyle;
    let params = BufferParams::default().with_join_style(JoinStyle::Bevel);
    let result = as_polygon(buffer_with_params(&square_10(), 1.0, params).unwrap());
    let a = result.unsigned_area();
    // each beveled corner drops half of the 1 x 1 corner square
    assert!((a - 142.0).abs() < 1e-6, "beveled area {a}");
}
