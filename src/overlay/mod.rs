//! Linework overlay support for single-sided refinement: snap-tolerant
//! intersection of linear geometries, dissolving union of linework, and a
//! polygonizer for the noded arrangement.

use crate::errors::BufferError;
use crate::float_types::Real;
use crate::geom::{Envelope, PrecisionModel};
use crate::geomgraph::{Edge, EdgeList, Label, Location, PlanarGraph};
use crate::algorithm::{orientation, point_location};
use crate::noding::{McIndexNoder, NodedSegmentString, Noder};
use geo_types::{Coord, Geometry, LineString, Polygon};
use hashbrown::HashMap;
use rstar::primitives::Line;
use rstar::RTree;

/// Snap tolerance for overlaying linework that may diverge by rounding:
/// a small fraction of the larger geometry extent.
const SNAP_TOLERANCE_FACTOR: Real = 1e-9;

pub fn overlay_snap_tolerance(a: &[LineString<Real>], b: &[LineString<Real>]) -> Real {
    let mut env = Envelope::new();
    for ls in a.iter().chain(b.iter()) {
        for &pt in &ls.0 {
            env.expand_to_include(pt);
        }
    }
    env.diameter() * SNAP_TOLERANCE_FACTOR
}

/// The linework shared by `a` and `b`, within `snap_tol`: both sets are
/// noded together and the substrings of `a` lying on `b` are kept.
///
/// This is the snap-overlay INTERSECTION of two linear geometries; plain
/// intersection would lose segments where the inputs diverge by rounding.
pub fn linework_intersection(
    a: &[LineString<Real>],
    b: &[LineString<Real>],
    snap_tol: Real,
) -> Result<Vec<LineString<Real>>, BufferError> {
    let mut strings = Vec::new();
    for ls in a {
        if ls.0.len() >= 2 {
            strings.push(NodedSegmentString::new(
                ls.0.clone(),
                Some(Label::new(0, Location::Boundary, Location::None, Location::None)),
            ));
        }
    }
    for ls in b {
        if ls.0.len() >= 2 {
            strings.push(NodedSegmentString::new(
                ls.0.clone(),
                Some(Label::new(1, Location::Boundary, Location::None, Location::None)),
            ));
        }
    }

    let mut noder = McIndexNoder::new(PrecisionModel::Floating);
    noder.compute_nodes(strings)?;
    let noded = noder.noded_substrings();

    let tree = segment_tree(b);
    let max_dist_sq = snap_tol * snap_tol;

    let mut out = Vec::new();
    for ss in noded {
        let from_a = ss
            .label()
            .is_some_and(|l| l.location(0, crate::geomgraph::Position::On) == Location::Boundary);
        if !from_a {
            continue;
        }
        let on_b = ss.coords().windows(2).all(|w| {
            let mid = [(w[0].x + w[1].x) / 2.0, (w[0].y + w[1].y) / 2.0];
            tree.locate_within_distance(mid, max_dist_sq).next().is_some()
        });
        if on_b {
            out.push(LineString::from(ss.into_coords()));
        }
    }
    Ok(out)
}

/// Node all linework together and dissolve duplicate edges. The result is a
/// fully-noded, duplicate-free arrangement of the union.
pub fn linework_union(lines: &[LineString<Real>]) -> Result<Vec<LineString<Real>>, BufferError> {
    let strings: Vec<NodedSegmentString> = lines
        .iter()
        .filter(|ls| ls.0.len() >= 2)
        .map(|ls| NodedSegmentString::new(ls.0.clone(), None))
        .collect();

    let mut noder = McIndexNoder::new(PrecisionModel::Floating);
    noder.compute_nodes(strings)?;

    let mut edge_list = EdgeList::new();
    for ss in noder.noded_substrings() {
        let coords = crate::geom::remove_repeated_points(ss.coords());
        if coords.len() < 2 {
            continue;
        }
        let edge = Edge::new(coords, Label::default());
        if edge_list.find_equal_edge(&edge).is_none() {
            edge_list.add(edge);
        }
    }
    Ok(edge_list
        .iter()
        .map(|e| LineString::from(e.coords().to_vec()))
        .collect())
}

/// Union of a set of linear geometries as a single geometry, with shared
/// linework dissolved and chains re-merged.
pub fn union_linear(geoms: &[Geometry<Real>]) -> Result<Geometry<Real>, BufferError> {
    let mut lines: Vec<LineString<Real>> = Vec::new();
    for g in geoms {
        lines.extend(linework(g));
    }
    let noded = linework_union(&lines)?;
    let mut merger = crate::linemerge::LineMerger::new();
    for ls in &noded {
        merger.add_line(ls);
    }
    let merged = merger.merged_line_strings();
    Ok(match merged.len() {
        0 => Geometry::LineString(LineString::new(Vec::new())),
        1 => Geometry::LineString(merged.into_iter().next().unwrap()),
        _ => Geometry::MultiLineString(geo_types::MultiLineString::new(merged)),
    })
}

/// The linework of a geometry: boundary rings for areal inputs, the lines
/// themselves for linear inputs.
pub fn linework(g: &Geometry<Real>) -> Vec<LineString<Real>> {
    match g {
        Geometry::LineString(ls) => vec![ls.clone()],
        Geometry::MultiLineString(mls) => mls.0.clone(),
        Geometry::Line(l) => vec![LineString::from(vec![l.start, l.end])],
        Geometry::Polygon(p) => polygon_rings(p),
        Geometry::MultiPolygon(mp) => mp.0.iter().flat_map(polygon_rings).collect(),
        Geometry::Rect(r) => polygon_rings(&r.to_polygon()),
        Geometry::Triangle(t) => polygon_rings(&t.to_polygon()),
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(linework).collect(),
        Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
    }
}

fn polygon_rings(p: &Polygon<Real>) -> Vec<LineString<Real>> {
    let mut rings = Vec::with_capacity(1 + p.interiors().len());
    if p.exterior().0.len() >= 2 {
        rings.push(p.exterior().clone());
    }
    for hole in p.interiors() {
        if hole.0.len() >= 2 {
            rings.push(hole.clone());
        }
    }
    rings
}

/// Polygonize fully-noded linework: trace the faces of the arrangement and
/// return the bounded ones, with holes attached to their shells.
///
/// Dangling edges are pruned first; they cannot border a face.
pub fn polygonize(lines: &[LineString<Real>]) -> Result<Vec<Polygon<Real>>, BufferError> {
    let noded = linework_union(lines)?;

    // prune dangles: an edge with a free endpoint cannot bound a face
    let mut edges: Vec<Vec<Coord<Real>>> = noded.into_iter().map(|ls| ls.0).collect();
    loop {
        let mut degree: HashMap<(u64, u64), usize> = HashMap::new();
        for e in &edges {
            for pt in [e[0], *e.last().unwrap()] {
                *degree.entry((pt.x.to_bits(), pt.y.to_bits())).or_insert(0) += 1;
            }
        }
        let before = edges.len();
        edges.retain(|e| {
            let start = (e[0].x.to_bits(), e[0].y.to_bits());
            let last = e.last().unwrap();
            let end = (last.x.to_bits(), last.y.to_bits());
            // a closed edge counts its shared endpoint twice
            degree[&start] >= 2 && degree[&end] >= 2
        });
        if edges.len() == before {
            break;
        }
    }
    if edges.is_empty() {
        return Ok(Vec::new());
    }

    let graph = PlanarGraph::new(
        edges
            .into_iter()
            .map(|pts| Edge::new(pts, Label::default()))
            .collect(),
    );

    // trace every face walk once
    let mut visited = vec![false; graph.num_dir_edges()];
    let mut ccw_rings: Vec<(Vec<Coord<Real>>, Envelope)> = Vec::new();
    let mut cw_rings: Vec<(Vec<Coord<Real>>, Envelope)> = Vec::new();
    for start in graph.dir_edge_ids() {
        if visited[start.0] {
            continue;
        }
        let mut pts: Vec<Coord<Real>> = Vec::new();
        let mut de = start;
        loop {
            visited[de.0] = true;
            let de_pts = graph.dir_edge_coords(de);
            let skip = usize::from(!pts.is_empty());
            pts.extend(de_pts.into_iter().skip(skip));
            de = face_next(&graph, de);
            if de == start {
                break;
            }
        }
        let area = orientation::signed_area(&pts);
        if area > 0.0 {
            let env = Envelope::of_coords(&pts);
            ccw_rings.push((pts, env));
        } else if area < 0.0 {
            let env = Envelope::of_coords(&pts);
            cw_rings.push((pts, env));
        }
    }

    // attach each clockwise walk to the smallest face ring containing it
    let mut polys: Vec<(Vec<Coord<Real>>, Envelope, Vec<Vec<Coord<Real>>>)> = ccw_rings
        .into_iter()
        .map(|(pts, env)| (pts, env, Vec::new()))
        .collect();
    for (hole_pts, hole_env) in cw_rings {
        let mut best: Option<usize> = None;
        for (i, (shell_pts, shell_env, _)) in polys.iter().enumerate() {
            if *shell_env == hole_env || !shell_env.contains_envelope(&hole_env) {
                continue;
            }
            let test_pt = hole_pts
                .iter()
                .copied()
                .find(|pt| !shell_pts.contains(pt))
                .unwrap_or(hole_pts[0]);
            if point_location::is_in_ring(test_pt, shell_pts) {
                let smaller = match best {
                    None => true,
                    Some(b) => polys[b].1.contains_envelope(shell_env),
                };
                if smaller {
                    best = Some(i);
                }
            }
        }
        if let Some(b) = best {
            polys[b].2.push(hole_pts);
        }
        // walks not contained anywhere border the unbounded face; drop them
    }

    Ok(polys
        .into_iter()
        .map(|(shell, _, holes)| {
            Polygon::new(
                LineString::from(shell),
                holes.into_iter().map(LineString::from).collect(),
            )
        })
        .collect())
}

/// The face-tracing successor: the edge before `sym(de)` in the CCW star at
/// the head of `de`. Traces bounded faces counter-clockwise.
fn face_next(graph: &PlanarGraph, de: crate::geomgraph::DirectedEdgeId) -> crate::geomgraph::DirectedEdgeId {
    let sym = graph.sym(de);
    let node = graph.origin(sym);
    let star = graph.star(node);
    let idx = star
        .iter()
        .position(|&d| d == sym)
        .expect("directed edge missing from star");
    star[(idx + star.len() - 1) % star.len()]
}

fn segment_tree(lines: &[LineString<Real>]) -> RTree<Line<[f64; 2]>> {
    let segments: Vec<Line<[f64; 2]>> = lines
        .iter()
        .flat_map(|ls| {
            ls.0.windows(2)
                .map(|w| Line::new([w[0].x, w[0].y], [w[1].x, w[1].y]))
                .collect::<Vec<_>>()
        })
        .collect();
    RTree::bulk_load(segments)
}
