//! Single-sided buffering: offset lines and one-sided areas.

use bufrs::{BufferBuilder, BufferError, BufferParams};
use geo::Area;
use geo_types::{coord, Coord, Geometry, LineString, MultiLineString, Point};

fn builder() -> BufferBuilder {
    BufferBuilder::new(BufferParams::default())
}

fn horizontal_line() -> Geometry<f64> {
    Geometry::LineString(LineString::from(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 0.0 },
    ]))
}

fn as_line(g: Geometry<f64>) -> LineString<f64> {
    match g {
        Geometry::LineString(ls) => ls,
        other => panic!("expected a LineString result, got {other:?}"),
    }
}

fn endpoints(ls: &LineString<f64>) -> (Coord<f64>, Coord<f64>) {
    (*ls.0.first().unwrap(), *ls.0.last().unwrap())
}

fn close_to(a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

#[test]
fn left_side_of_a_horizontal_line() {
    let result = builder()
        .buffer_line_single_sided(&horizontal_line(), 1.0, true)
        .unwrap();
    let line = as_line(result);
    assert!(line.0.len() >= 2);
    for pt in &line.0 {
        assert!((pt.y - 1.0).abs() < 1e-6, "vertex {pt:?} off the offset line");
    }
    let (start, end) = endpoints(&line);
    let expected = (coord! { x: 0.0, y: 1.0 }, coord! { x: 10.0, y: 1.0 });
    assert!(
        (close_to(start, expected.0) && close_to(end, expected.1))
            || (close_to(start, expected.1) && close_to(end, expected.0)),
        "unexpected endpoints {start:?}, {end:?}"
    );
}

#[test]
fn right_side_of_a_horizontal_line() {
    let result = builder()
        .buffer_line_single_sided(&horizontal_line(), 1.0, false)
        .unwrap();
    let line = as_line(result);
    for pt in &line.0 {
        assert!((pt.y + 1.0).abs() < 1e-6, "vertex {pt:?} off the offset line");
    }
}

#[test]
fn left_side_of_a_diagonal_line() {
    let g = Geometry::LineString(LineString::from(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 10.0 },
    ]));
    let result = builder().buffer_line_single_sided(&g, 1.0, true).unwrap();
    let line = as_line(result);
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let (start, end) = endpoints(&line);
    let expected = (coord! { x: -h, y: h }, coord! { x: 10.0 - h, y: 10.0 + h });
    assert!(
        (close_to(start, expected.0) && close_to(end, expected.1))
            || (close_to(start, expected.1) && close_to(end, expected.0)),
        "unexpected endpoints {start:?}, {end:?}"
    );
}

#[test]
fn zero_distance_returns_the_input_line() {
    let g = horizontal_line();
    let result = builder().buffer_line_single_sided(&g, 0.0, true).unwrap();
    assert_eq!(result, g);
}

#[test]
fn non_linestring_input_is_rejected() {
    let g = Geometry::Point(Point::new(0.0, 0.0));
    let result = builder().buffer_line_single_sided(&g, 1.0, true);
    assert!(matches!(result, Err(BufferError::IllegalArgument { .. })));
}

#[test]
fn offset_line_follows_a_bent_input() {
    let g = Geometry::LineString(LineString::from(vec![
        coord! { x: 0.0, y: 0.0 },
        coord! { x: 10.0, y: 0.0 },
        coord! { x: 10.0, y: 10.0 },
    ]));
    let result = builder().buffer_line_single_sided(&g, 1.0, true).unwrap();
    let line = as_line(result);
    assert!(line.0.len() >= 2);
    // every vertex of the offset line is (about) one unit from the input
    for pt in &line.0 {
        let d_bottom = distance_to_segment(*pt, (0.0, 0.0), (10.0, 0.0));
        let d_right = distance_to_segment(*pt, (10.0, 0.0), (10.0, 10.0));
        let d = d_bottom.min(d_right);
        assert!(
            (d - 1.0).abs() < 0.05,
            "vertex {pt:?} at distance {d} from the input"
        );
    }
    // the left side of this input turns inside at the corner: the offset
    // line cuts across at (9, 1)
    assert!(
        line.0.iter().any(|pt| close_to(*pt, coord! { x: 9.0, y: 1.0 })),
        "missing the inside-turn vertex"
    );
}

#[test]
fn single_sided_buffer_of_multi_part_line_unions_the_parts() {
    let part = |y: f64| {
        LineString::from(vec![coord! { x: 0.0, y: y }, coord! { x: 10.0, y: y }])
    };
    let multi = Geometry::MultiLineString(MultiLineString::new(vec![part(0.0), part(20.0)]));
    let params = BufferParams::default().with_single_sided(true);

    let multi_result = BufferBuilder::new(params).buffer(&multi, 1.0).unwrap();
    let multi_area = areal_area(&multi_result);

    let single_area: f64 = [0.0, 20.0]
        .iter()
        .map(|&y| {
            let g = Geometry::LineString(part(y));
            areal_area(&BufferBuilder::new(params).buffer(&g, 1.0).unwrap())
        })
        .sum();

    assert!(
        (multi_area - single_area).abs() < 1e-6,
        "multi {multi_area} vs summed parts {single_area}"
    );
    assert!(multi_area > 19.0, "single-sided strips cover about 2 x 10");
}

fn areal_area(g: &Geometry<f64>) -> f64 {
    match g {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        other => panic!("expected an areal result, got {other:?}"),
    }
}

fn distance_to_segment(p: Coord<f64>, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let len2 = (bx - ax).powi(2) + (by - ay).powi(2);
    let t = (((p.x - ax) * (bx - ax) + (p.y - ay) * (by - ay)) / len2).clamp(0.0, 1.0);
    let (px, py) = (ax + t * (bx - ax), ay + t * (by - ay));
    ((p.x - px).powi(2) + (p.y - py).powi(2)).sqrt()
}
