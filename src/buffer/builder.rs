//! The top-level buffer pipeline: curve generation, noding, edge merging,
//! subgraph partitioning, depth assignment, and polygon assembly.

use crate::buffer::curve_set_builder::CurveSetBuilder;
use crate::buffer::depth_locater::SubgraphDepthLocater;
use crate::buffer::offset_curve_builder::OffsetCurveBuilder;
use crate::buffer::params::{BufferParams, EndCapStyle};
use crate::buffer::polygon_builder::PolygonBuilder;
use crate::buffer::subgraph::BufferSubgraph;
use crate::errors::BufferError;
use crate::float_types::Real;
use crate::geom::{self, PrecisionModel};
use crate::geomgraph::{Edge, EdgeList, Label, Location, PlanarGraph, Position};
use crate::interrupt::InterruptFlag;
use crate::linemerge::LineMerger;
use crate::noding::{McIndexNoder, NodedSegmentString, Noder};
use crate::overlay;
use geo::{Area, EuclideanLength};
use geo_types::{Geometry, LineString, MultiPolygon, Polygon};

/// The depth change across an edge, walking left to right: +1 entering the
/// buffer interior, -1 leaving it, 0 otherwise.
pub fn depth_delta(label: &Label) -> i32 {
    let l_loc = label.location(0, Position::Left);
    let r_loc = label.location(0, Position::Right);
    if l_loc == Location::Interior && r_loc == Location::Exterior {
        1
    } else if l_loc == Location::Exterior && r_loc == Location::Interior {
        -1
    } else {
        0
    }
}

/// Builds the buffer geometry for a given input geometry and distance.
///
/// A builder may be reused across calls; no geometry state survives a call.
/// It caches its lazily-created noder (and the intersector inside it)
/// between calls. Not safe for concurrent use.
pub struct BufferBuilder {
    params: BufferParams,
    working_precision_model: Option<PrecisionModel>,
    working_noder: Option<Box<dyn Noder>>,
    cached_noder: Option<McIndexNoder>,
    invert_orientation: bool,
    interrupt: InterruptFlag,
}

impl BufferBuilder {
    pub fn new(params: BufferParams) -> Self {
        Self {
            params,
            working_precision_model: None,
            working_noder: None,
            cached_noder: None,
            invert_orientation: false,
            interrupt: InterruptFlag::new(),
        }
    }

    /// Override the precision model to compute with; without one, full
    /// floating precision is used.
    pub fn set_working_precision_model(&mut self, pm: PrecisionModel) {
        self.working_precision_model = Some(pm);
    }

    /// Install a caller-supplied noder; it is used as-is and never mutated.
    pub fn set_working_noder(&mut self, noder: Box<dyn Noder>) {
        self.working_noder = Some(noder);
    }

    /// Inputs with inverted ring orientation flip the orientation test in
    /// curve generation.
    pub fn set_invert_orientation(&mut self, invert_orientation: bool) {
        self.invert_orientation = invert_orientation;
    }

    /// A handle to the cooperative cancellation flag for this builder.
    pub fn interrupt_flag(&self) -> InterruptFlag {
        self.interrupt.clone()
    }

    /// Compute the buffer of `g` at the signed `distance`.
    pub fn buffer(
        &mut self,
        g: &Geometry<Real>,
        distance: Real,
    ) -> Result<Geometry<Real>, BufferError> {
        // Single-sided buffering only works on single geometries, so buffer
        // each component individually and union the results.
        if self.params.single_sided && component_count(g) > 1 {
            let mut part_results = Vec::new();
            for component in components(g) {
                // per-call graph state cannot be shared, so each component
                // gets its own builder
                let mut sub_builder = BufferBuilder::new(self.params);
                sub_builder.working_precision_model = self.working_precision_model;
                sub_builder.invert_orientation = self.invert_orientation;
                sub_builder.interrupt = self.interrupt.clone();
                part_results.push(sub_builder.buffer(&component, distance)?);
            }
            return unary_union_areal(&part_results, &self.interrupt);
        }

        let precision_model = self
            .working_precision_model
            .unwrap_or(PrecisionModel::Floating);

        let mut curve_set_builder = CurveSetBuilder::new(g, distance, precision_model, self.params);
        curve_set_builder.set_invert_orientation(self.invert_orientation);

        self.interrupt.check()?;

        let curves = curve_set_builder.curves();
        // short-circuit empty inputs and empty offsets
        if curves.is_empty() {
            return Ok(empty_result_geometry());
        }

        let edge_list = compute_noded_edges(self.noder(precision_model), curves)?;
        self.interrupt.check()?;

        let result_poly_list = build_area(edge_list, &self.interrupt)?;
        let result_geom = assemble_polygonal(result_poly_list);

        // Single-sided buffering of an areal input still runs the two-sided
        // pipeline above, leaving cap artifacts; polygonize the combined
        // linework and keep the dominant face.
        if self.params.single_sided {
            let mut all_linework = overlay::linework(g);
            all_linework.extend(overlay::linework(&result_geom));
            let noded_linework = overlay::linework_union(&all_linework)?;
            let polys = overlay::polygonize(&noded_linework)?;
            if polys.len() > 1 {
                if let Some(biggest) = polys
                    .into_iter()
                    .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
                {
                    return Ok(Geometry::Polygon(biggest));
                }
            }
        }

        Ok(result_geom)
    }

    /// The line used to create a single-sided buffer: the input offset to
    /// one side by `distance`, without end caps.
    pub fn buffer_line_single_sided(
        &mut self,
        g: &Geometry<Real>,
        distance: Real,
        left_side: bool,
    ) -> Result<Geometry<Real>, BufferError> {
        // input requirement: must be a LineString
        let Geometry::LineString(line) = g else {
            return Err(BufferError::IllegalArgument {
                operation: "buffer_line_single_sided",
                expected: "LineString inputs",
            });
        };

        // nothing to do for a distance of zero
        if distance == 0.0 {
            return Ok(g.clone());
        }
        if line.0.len() < 2 {
            return Ok(Geometry::LineString(LineString::new(Vec::new())));
        }

        let precision_model = self
            .working_precision_model
            .unwrap_or(PrecisionModel::Floating);

        // First, generate the two-sided buffer using a flat cap. The cap
        // override is a copied params value, not shared-state mutation.
        let mod_params = self
            .params
            .with_end_cap_style(EndCapStyle::Flat)
            // ignore the single-sided flag, which only applies to areal
            // geometries in the main pipeline
            .with_single_sided(false);
        let mut two_sided_builder = BufferBuilder::new(mod_params);
        two_sided_builder.working_precision_model = self.working_precision_model;
        let buf = two_sided_builder.buffer(g, distance)?;
        let buf_boundary = overlay::linework(&buf);

        // Then get the raw (unnoded) single-sided offset curve.
        let mut curve_builder = OffsetCurveBuilder::new(precision_model, mod_params);
        let line_list =
            curve_builder.single_sided_line_curve(&line.0, distance, left_side, !left_side);

        // Node the raw curve against itself.
        let curve_strings: Vec<NodedSegmentString> = line_list
            .into_iter()
            .map(|pts| NodedSegmentString::new(pts, None))
            .collect();
        let noder = self.noder(precision_model);
        noder.compute_nodes(curve_strings)?;
        let offset_lines: Vec<LineString<Real>> = noder
            .noded_substrings()
            .into_iter()
            .map(|ss| LineString::from(ss.into_coords()))
            .collect();

        // Intersect with the buffer boundary to keep the segments lying on
        // both. Snapping tolerates the divergence the cap and join curves
        // introduce into the boundary.
        let snap_tol = overlay::overlay_snap_tolerance(&offset_lines, &buf_boundary);
        let intersected = overlay::linework_intersection(&offset_lines, &buf_boundary, snap_tol)?;

        // Merge the fragments into maximal lines.
        let mut merger = LineMerger::new();
        for ls in &intersected {
            merger.add_line(ls);
        }
        let merged_lines = merger.merged_line_strings();

        // Strip the flat-cap remnants off the line ends: cap fragments sit
        // within the buffer distance of an input endpoint and are short.
        let start_point = line.0[0];
        let end_point = *line.0.last().unwrap();
        let input_length = line.euclidean_length();

        // Use 98% of the buffer width as the point-distance requirement,
        // tightened by 10% of the input length so the filter stays stable
        // for large distances.
        let pt_dist_allowance = (distance - input_length * 0.1).max(distance * 0.98);
        // Use 102% of the buffer width as the length bound recognizing a
        // segment that legitimately spans the cap region.
        let seg_length_allowance = 1.02 * distance;

        let mut merged_lines_geom: Vec<LineString<Real>> = Vec::new();
        for merged in merged_lines {
            let coords = &merged.0;
            if coords.is_empty() {
                continue;
            }
            let mut front = 0usize;
            let mut back = coords.len() - 1;
            let mut sz = back - front + 1;

            // clean up the front of the list
            while sz > 1 && geom::distance(coords[front], start_point) < pt_dist_allowance {
                let seg_length = geom::distance(coords[front], coords[front + 1]);
                if seg_length > seg_length_allowance {
                    break;
                }
                front += 1;
                sz -= 1;
            }
            while sz > 1 && geom::distance(coords[front], end_point) < pt_dist_allowance {
                let seg_length = geom::distance(coords[front], coords[front + 1]);
                if seg_length > seg_length_allowance {
                    break;
                }
                front += 1;
                sz -= 1;
            }
            // clean up the back of the list
            while sz > 1 && geom::distance(coords[back], start_point) < pt_dist_allowance {
                let seg_length = geom::distance(coords[back], coords[back - 1]);
                if seg_length > seg_length_allowance {
                    break;
                }
                back -= 1;
                sz -= 1;
            }
            while sz > 1 && geom::distance(coords[back], end_point) < pt_dist_allowance {
                let seg_length = geom::distance(coords[back], coords[back - 1]);
                if seg_length > seg_length_allowance {
                    break;
                }
                back -= 1;
                sz -= 1;
            }

            if sz > 1 {
                merged_lines_geom.push(LineString::from(coords[front..=back].to_vec()));
            }
        }

        Ok(match merged_lines_geom.len() {
            0 => Geometry::LineString(LineString::new(Vec::new())),
            1 => Geometry::LineString(merged_lines_geom.into_iter().next().unwrap()),
            _ => Geometry::MultiLineString(geo_types::MultiLineString::new(merged_lines_geom)),
        })
    }

    /// The noder to use: the caller-installed one if present, else the
    /// cached fast monotone-chain noder (created lazily, reused across
    /// calls of this builder).
    fn noder(&mut self, precision_model: PrecisionModel) -> &mut dyn Noder {
        if self.working_noder.is_some() {
            return self.working_noder.as_deref_mut().unwrap();
        }
        match &mut self.cached_noder {
            Some(noder) => noder.set_precision_model(precision_model),
            None => self.cached_noder = Some(McIndexNoder::new(precision_model)),
        }
        self.cached_noder.as_mut().unwrap()
    }
}

/// Union of areal geometries via the same depth machinery as buffering:
/// the labeled boundary curves at distance zero are noded and the faces
/// with positive depth assembled.
pub(crate) fn unary_union_areal(
    geoms: &[Geometry<Real>],
    interrupt: &InterruptFlag,
) -> Result<Geometry<Real>, BufferError> {
    let precision_model = PrecisionModel::Floating;
    let mut curves = Vec::new();
    for g in geoms {
        curves.extend(CurveSetBuilder::new(g, 0.0, precision_model, BufferParams::default()).curves());
    }
    if curves.is_empty() {
        return Ok(empty_result_geometry());
    }
    let mut noder = McIndexNoder::new(precision_model);
    let edge_list = compute_noded_edges(&mut noder, curves)?;
    let polys = build_area(edge_list, interrupt)?;
    Ok(assemble_polygonal(polys))
}

/// Node the raw curves and merge the substrings into the unique edge list.
fn compute_noded_edges(
    noder: &mut dyn Noder,
    curves: Vec<NodedSegmentString>,
) -> Result<EdgeList, BufferError> {
    noder.compute_nodes(curves)?;
    let noded_seg_strings = noder.noded_substrings();

    let mut edge_list = EdgeList::new();
    for seg_str in noded_seg_strings {
        let old_label = seg_str.label().copied();
        let coords = geom::remove_repeated_points(seg_str.coords());
        if coords.len() < 2 {
            // don't insert collapsed edges
            continue;
        }
        let edge = Edge::new(coords, old_label.unwrap_or_default());
        insert_unique_edge(&mut edge_list, edge);
    }
    Ok(edge_list)
}

/// Run the topology stages over a merged edge list and return the result
/// polygons.
fn build_area(
    edge_list: EdgeList,
    interrupt: &InterruptFlag,
) -> Result<Vec<Polygon<Real>>, BufferError> {
    let mut graph = PlanarGraph::new(edge_list.into_edges());
    let subgraph_list = create_subgraphs(&mut graph);
    interrupt.check()?;

    let mut poly_builder = PolygonBuilder::new();
    process_subgraphs(&mut graph, subgraph_list, &mut poly_builder, interrupt)?;
    Ok(poly_builder.polygons())
}

/// Merge an edge into the list: a geometrically equal existing edge absorbs
/// the label (flipped if the directions differ) and accumulates the depth
/// delta; otherwise the edge starts fresh with its own delta.
fn insert_unique_edge(edge_list: &mut EdgeList, e: Edge) {
    if let Some(existing_id) = edge_list.find_equal_edge(&e) {
        let same_direction = edge_list.get(existing_id).is_pointwise_equal(&e);
        let mut label_to_merge = *e.label();
        if !same_direction {
            label_to_merge.flip();
        }
        let merge_delta = depth_delta(&label_to_merge);

        let existing_edge = edge_list.get_mut(existing_id);
        existing_edge.label_mut().merge(&label_to_merge);
        existing_edge.set_depth_delta(existing_edge.depth_delta() + merge_delta);
        // e is discarded here
    } else {
        let delta = depth_delta(e.label());
        let mut e = e;
        e.set_depth_delta(delta);
        edge_list.add(e);
    }
}

/// Partition the graph into connected subgraphs, sorted in descending order
/// of their rightmost coordinate. This guarantees that when the polygons
/// for the subgraphs are built, shells are built before any holes they
/// contain.
fn create_subgraphs(graph: &mut PlanarGraph) -> Vec<BufferSubgraph> {
    let mut subgraph_list = Vec::new();
    let node_ids: Vec<_> = graph.node_ids().collect();
    for node in node_ids {
        if !graph.node(node).visited {
            subgraph_list.push(BufferSubgraph::create(graph, node));
        }
    }
    subgraph_list.sort_by(|a, b| {
        b.rightmost_coordinate()
            .x
            .total_cmp(&a.rightmost_coordinate().x)
    });
    subgraph_list
}

/// Process subgraphs in rightmost-descending order: locate each in the
/// depth of the already-processed ones, propagate its depths, mark its
/// result edges, and feed it to the polygon builder.
fn process_subgraphs(
    graph: &mut PlanarGraph,
    subgraph_list: Vec<BufferSubgraph>,
    poly_builder: &mut PolygonBuilder,
    interrupt: &InterruptFlag,
) -> Result<(), BufferError> {
    let mut processed_graphs: Vec<BufferSubgraph> = Vec::new();
    for mut subgraph in subgraph_list {
        interrupt.check()?;
        let p = subgraph.rightmost_coordinate();
        let outside_depth = SubgraphDepthLocater::new(&processed_graphs, graph).depth(p);
        subgraph.compute_depth(graph, outside_depth)?;
        subgraph.find_result_edges(graph);
        poly_builder.add(graph, subgraph.dir_edges(), subgraph.nodes())?;
        processed_graphs.push(subgraph);
    }
    Ok(())
}

fn assemble_polygonal(polys: Vec<Polygon<Real>>) -> Geometry<Real> {
    match polys.len() {
        0 => empty_result_geometry(),
        1 => Geometry::Polygon(polys.into_iter().next().unwrap()),
        _ => Geometry::MultiPolygon(MultiPolygon::new(polys)),
    }
}

fn empty_result_geometry() -> Geometry<Real> {
    Geometry::Polygon(Polygon::new(LineString::new(Vec::new()), Vec::new()))
}

fn component_count(g: &Geometry<Real>) -> usize {
    match g {
        Geometry::MultiPoint(mp) => mp.0.len(),
        Geometry::MultiLineString(mls) => mls.0.len(),
        Geometry::MultiPolygon(mp) => mp.0.len(),
        Geometry::GeometryCollection(gc) => gc.0.len(),
        _ => 1,
    }
}

fn components(g: &Geometry<Real>) -> Vec<Geometry<Real>> {
    match g {
        Geometry::MultiPoint(mp) => mp.0.iter().map(|p| Geometry::Point(*p)).collect(),
        Geometry::MultiLineString(mls) => mls
            .0
            .iter()
            .map(|ls| Geometry::LineString(ls.clone()))
            .collect(),
        Geometry::MultiPolygon(mp) => mp.0.iter().map(|p| Geometry::Polygon(p.clone())).collect(),
        Geometry::GeometryCollection(gc) => gc.0.to_vec(),
        other => vec![other.clone()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geomgraph::Location;
    use geo_types::coord;

    fn boundary_label(left: Location, right: Location) -> Label {
        Label::new(0, Location::Boundary, left, right)
    }

    #[test]
    fn depth_delta_of_labels() {
        assert_eq!(
            depth_delta(&boundary_label(Location::Interior, Location::Exterior)),
            1
        );
        assert_eq!(
            depth_delta(&boundary_label(Location::Exterior, Location::Interior)),
            -1
        );
        assert_eq!(
            depth_delta(&boundary_label(Location::Interior, Location::Interior)),
            0
        );
    }

    fn curve_edge(pts: &[(f64, f64)], left: Location, right: Location) -> Edge {
        Edge::new(
            pts.iter().map(|&(x, y)| coord! { x: x, y: y }).collect(),
            boundary_label(left, right),
        )
    }

    #[test]
    fn duplicate_edge_same_direction_doubles_depth_delta() {
        let mut list = EdgeList::new();
        let pts = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)];
        insert_unique_edge(
            &mut list,
            curve_edge(&pts, Location::Interior, Location::Exterior),
        );
        insert_unique_edge(
            &mut list,
            curve_edge(&pts, Location::Interior, Location::Exterior),
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).depth_delta(), 2);
    }

    #[test]
    fn duplicate_edge_reversed_direction_cancels_depth_delta() {
        let mut list = EdgeList::new();
        insert_unique_edge(
            &mut list,
            curve_edge(
                &[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)],
                Location::Interior,
                Location::Exterior,
            ),
        );
        insert_unique_edge(
            &mut list,
            curve_edge(
                &[(2.0, 0.0), (1.0, 1.0), (0.0, 0.0)],
                Location::Interior,
                Location::Exterior,
            ),
        );
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).depth_delta(), 0);
    }

    #[test]
    fn union_of_disjoint_squares_is_a_multipolygon() {
        let square = |x0: f64| {
            Geometry::Polygon(Polygon::new(
                LineString::from(vec![
                    coord! { x: x0, y: 0.0 },
                    coord! { x: x0 + 1.0, y: 0.0 },
                    coord! { x: x0 + 1.0, y: 1.0 },
                    coord! { x: x0, y: 1.0 },
                    coord! { x: x0, y: 0.0 },
                ]),
                Vec::new(),
            ))
        };
        let result = unary_union_areal(&[square(0.0), square(5.0)], &InterruptFlag::new()).unwrap();
        match result {
            Geometry::MultiPolygon(mp) => assert_eq!(mp.0.len(), 2),
            other => panic!("expected MultiPolygon, got {other:?}"),
        }
    }

    #[test]
    fn union_of_overlapping_squares_is_one_polygon() {
        let square = |x0: f64| {
            Geometry::Polygon(Polygon::new(
                LineString::from(vec![
                    coord! { x: x0, y: 0.0 },
                    coord! { x: x0 + 2.0, y: 0.0 },
                    coord! { x: x0 + 2.0, y: 2.0 },
                    coord! { x: x0, y: 2.0 },
                    coord! { x: x0, y: 0.0 },
                ]),
                Vec::new(),
            ))
        };
        let result = unary_union_areal(&[square(0.0), square(1.0)], &InterruptFlag::new()).unwrap();
        match result {
            Geometry::Polygon(p) => {
                assert!((p.unsigned_area() - 6.0).abs() < 1e-9);
            }
            other => panic!("expected Polygon, got {other:?}"),
        }
    }
}
