//! Connector routing: orthogonal control-point paths, diagonal curves, straight arrows, and
//! label placement along the realized route.

use crate::CompileOptions;
use crate::arrows::box_to_box_arrow;
use crate::geometry::{Direction, is_diagonal, scaled};
use crate::primitive::{Attribute, PathKind, Primitive};
use figz_core::geom::{Point, point};
use figz_core::{Connector, ControlPoint, SnapAxis, TextMidpoint, TextSection};

const CORNER_RADIUS: u32 = 10;
const BEND_OFFSET: f64 = 0.3;

/// One connector endpoint after anchor resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEndpoint {
    pub anchor: Point,
    pub side: Direction,
}

/// How the last control-point segment meets the end magnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approach {
    /// Already aligned: one straight arrow reaches the anchor.
    Straight,
    /// Perpendicular: a bend is inserted before the final arrow.
    Bend,
    /// Travelling along the magnet's own direction. No geometry is defined for this; it is drawn
    /// like [`Approach::Bend`].
    SameDirection,
}

/// Classifies the segment `previous -> last` against the end magnet's side.
pub fn approach(previous: Point, last: Point, end_side: Direction) -> Approach {
    let incoming = Direction::between(last, previous);
    if incoming == end_side.opposite() {
        Approach::Straight
    } else if incoming == end_side {
        Approach::SameDirection
    } else {
        Approach::Bend
    }
}

pub(crate) fn route_connector(
    connector: &Connector,
    start: ResolvedEndpoint,
    end: ResolvedEndpoint,
    label: Option<&str>,
    options: &CompileOptions,
    out: &mut Vec<Primitive>,
) {
    if options.debug_magnets {
        out.push(debug_mark("red", start.anchor));
        out.push(debug_mark("red", end.anchor));
    }

    if !connector.control_points.is_empty() {
        route_orthogonal(connector, start, end, label, options, out);
    } else if is_diagonal(start.anchor, end.anchor) {
        let arrow = box_to_box_arrow(start.anchor, end.anchor, start.side, end.side);
        out.push(Primitive::Path {
            attributes: vec![Attribute::ArrowTip, Attribute::Thick],
            points: arrow.points(),
            kind: PathKind::Curve,
        });
    } else {
        out.push(Primitive::arrow(start.anchor, end.anchor));
        if let Some(text) = label {
            out.push(label_on_straight(
                start.anchor,
                end.anchor,
                midpoint_or_default(connector),
                text,
            ));
        }
    }
}

fn route_orthogonal(
    connector: &Connector,
    start: ResolvedEndpoint,
    end: ResolvedEndpoint,
    label: Option<&str>,
    options: &CompileOptions,
    out: &mut Vec<Primitive>,
) {
    let control_points = &connector.control_points;
    if options.debug_control_points {
        for cp in control_points {
            out.push(debug_mark("blue", scaled(cp.position)));
        }
    }

    let mut route = snap_control_points(start.anchor, control_points);
    let snapped_last = route[route.len() - 1];
    let last = control_points
        .last()
        .map(|cp| scaled(cp.position))
        .unwrap_or(snapped_last);
    route.push(last);
    out.push(rounded_line(route.clone()));

    let approach = approach(snapped_last, last, end.side);
    if approach == Approach::SameDirection {
        tracing::warn!(
            side = ?end.side,
            "connector approaches its end magnet head-on; routing it through a bend"
        );
    }

    if approach == Approach::Straight {
        out.push(Primitive::arrow(last, end.anchor));
        route.push(end.anchor);
    } else {
        let mid = point(end.anchor.x, last.y);
        let offset = if last.y < end.anchor.y {
            -BEND_OFFSET
        } else {
            BEND_OFFSET
        };
        let lead_in = point(end.anchor.x, end.anchor.y + offset);
        out.push(rounded_line(vec![last, mid, lead_in]));
        out.push(Primitive::arrow(lead_in, end.anchor));
        route.extend([mid, lead_in, end.anchor]);
    }

    if let Some(text) = label {
        if let Some(p) = label_on_route(&route, midpoint_or_default(connector), text) {
            out.push(p);
        }
    }
}

/// Walks control points from `start`, moving along one axis per point.
pub fn snap_control_points(start: Point, control_points: &[ControlPoint]) -> Vec<Point> {
    let mut points = Vec::with_capacity(control_points.len() + 2);
    points.push(start);
    let mut current = start;
    for cp in control_points {
        let raw = scaled(cp.position);
        current = match cp.axis {
            SnapAxis::KeepX => point(current.x, raw.y),
            SnapAxis::KeepY => point(raw.x, current.y),
        };
        points.push(current);
    }
    points
}

fn rounded_line(points: Vec<Point>) -> Primitive {
    Primitive::line(
        vec![Attribute::Thick, Attribute::RoundedCorners(CORNER_RADIUS)],
        points,
    )
}

fn debug_mark(color: &str, position: Point) -> Primitive {
    Primitive::FilledMark {
        attributes: vec![Attribute::Color(color.to_string())],
        position,
        shape: "circle",
        size: "3pt",
    }
}

fn midpoint_or_default(connector: &Connector) -> TextMidpoint {
    connector.text_midpoint.unwrap_or_default()
}

fn label_style() -> Vec<Attribute> {
    vec![
        Attribute::Draw("none".to_string()),
        Attribute::Fill("white".to_string()),
    ]
}

/// Label on a single straight segment, offset from the end anchor by a share of half the span.
pub fn label_on_straight(start: Point, end: Point, midpoint: TextMidpoint, text: &str) -> Primitive {
    let vertical = Direction::between(start, end).is_vertical();
    let (from, to) = if vertical {
        (start.y, end.y)
    } else {
        (start.x, end.x)
    };

    let half = ((to - from) / 2.0).abs();
    let mut along = to - half;
    match midpoint.section {
        TextSection::MiddleToEnd => along += half * midpoint.offset,
        TextSection::StartToMiddle => along -= half * midpoint.offset,
    }

    let position = if vertical {
        point(start.x, along)
    } else {
        point(along, start.y)
    };
    Primitive::label(label_style(), position, text)
}

/// Label at an arc-length position along a multi-segment route.
pub fn label_on_route(route: &[Point], midpoint: TextMidpoint, text: &str) -> Option<Primitive> {
    let mut points = route.to_vec();
    if midpoint.section == TextSection::MiddleToEnd {
        points.reverse();
    }

    let total: f64 = points.windows(2).map(|w| (w[1] - w[0]).length()).sum();
    let half = total / 2.0;
    let target = (half - half * (midpoint.offset - 1.0).abs()).clamp(0.0, total);

    let mut consumed = 0.0;
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = (b - a).length();
        if len == 0.0 {
            continue;
        }
        if consumed + len >= target {
            let remaining = target - consumed;
            let dir = (b - a) / len;
            let position = if remaining <= len / 2.0 {
                a + dir * remaining
            } else {
                b - dir * (len - remaining)
            };
            let mut attributes = label_style();
            if a.x == b.x {
                attributes.push(Attribute::Anchor("south".to_string()));
            }
            return Some(Primitive::label(attributes, position, text));
        }
        consumed += len;
    }

    points
        .first()
        .map(|p| Primitive::label(label_style(), *p, text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position_of(p: &Primitive) -> Point {
        match p {
            Primitive::Node { position, .. } => *position,
            other => panic!("expected a node, got {other:?}"),
        }
    }

    #[test]
    fn approach_table() {
        let last = point(0.0, 0.0);
        // Previous point above the last one, entering a bottom magnet.
        assert_eq!(approach(point(0.0, -1.0), last, Direction::Bottom), Approach::Straight);
        assert_eq!(approach(point(0.0, 1.0), last, Direction::Top), Approach::Straight);
        assert_eq!(approach(point(-1.0, 0.0), last, Direction::Right), Approach::Straight);
        assert_eq!(approach(point(1.0, 0.0), last, Direction::Left), Approach::Straight);
        assert_eq!(approach(point(-1.0, 0.0), last, Direction::Top), Approach::Bend);
        assert_eq!(approach(point(0.0, 1.0), last, Direction::Left), Approach::Bend);
    }

    // Known gap: same-direction approaches have no dedicated geometry and fall back to a bend.
    #[test]
    fn approach_same_direction_is_flagged() {
        let last = point(0.0, 0.0);
        assert_eq!(approach(point(0.0, 1.0), last, Direction::Bottom), Approach::SameDirection);
        assert_eq!(approach(point(0.0, -1.0), last, Direction::Top), Approach::SameDirection);
        assert_eq!(approach(point(-1.0, 0.0), last, Direction::Left), Approach::SameDirection);
        assert_eq!(approach(point(1.0, 0.0), last, Direction::Right), Approach::SameDirection);
    }

    #[test]
    fn control_points_move_one_axis_at_a_time() {
        let cps = [
            ControlPoint {
                position: point(100.0, 200.0),
                axis: SnapAxis::KeepX,
            },
            ControlPoint {
                position: point(300.0, 400.0),
                axis: SnapAxis::KeepY,
            },
        ];
        let points = snap_control_points(point(1.0, 1.0), &cps);
        assert_eq!(points.len(), 3);
        assert!((points[1].x - 1.0).abs() < 1e-12);
        assert!((points[1].y - 3.6).abs() < 1e-12);
        assert!((points[2].x - 5.4).abs() < 1e-12);
        assert!((points[2].y - 3.6).abs() < 1e-12);
    }

    #[test]
    fn straight_label_offsets_from_the_end_anchor() {
        let start = point(0.0, 0.0);
        let end = point(4.0, 0.0);
        let mid = label_on_straight(
            start,
            end,
            TextMidpoint {
                section: TextSection::StartToMiddle,
                offset: 0.0,
            },
            "x",
        );
        assert_eq!(position_of(&mid), point(2.0, 0.0));

        let toward_end = label_on_straight(
            start,
            end,
            TextMidpoint {
                section: TextSection::MiddleToEnd,
                offset: 0.5,
            },
            "x",
        );
        assert_eq!(position_of(&toward_end), point(3.0, 0.0));

        let toward_start = label_on_straight(
            start,
            end,
            TextMidpoint {
                section: TextSection::StartToMiddle,
                offset: 0.5,
            },
            "x",
        );
        assert_eq!(position_of(&toward_start), point(1.0, 0.0));
        assert_eq!(
            toward_start.to_string(),
            r"\node[draw=none, fill=white] at (1.000000, 0.000000) {x};"
        );
    }

    #[test]
    fn straight_label_on_vertical_connector_keeps_start_x() {
        let p = label_on_straight(
            point(2.0, 0.0),
            point(2.0, 6.0),
            TextMidpoint::default(),
            "v",
        );
        assert_eq!(position_of(&p), point(2.0, 3.0));
    }

    #[test]
    fn route_label_walks_arc_length() {
        // Total length 6: 2 down, then 4 right.
        let route = [point(0.0, 0.0), point(0.0, 2.0), point(4.0, 2.0)];

        let middle = label_on_route(
            &route,
            TextMidpoint {
                section: TextSection::StartToMiddle,
                offset: 1.0,
            },
            "m",
        )
        .unwrap();
        assert_eq!(position_of(&middle), point(1.0, 2.0));
        assert!(!middle.attributes().contains(&Attribute::Anchor("south".into())));

        let early = label_on_route(
            &route,
            TextMidpoint {
                section: TextSection::StartToMiddle,
                offset: 0.5,
            },
            "e",
        )
        .unwrap();
        assert_eq!(position_of(&early), point(0.0, 1.5));
        assert!(early.attributes().contains(&Attribute::Anchor("south".into())));
    }

    #[test]
    fn route_label_reverses_for_the_second_half() {
        let route = [point(0.0, 0.0), point(0.0, 2.0), point(4.0, 2.0)];
        let p = label_on_route(
            &route,
            TextMidpoint {
                section: TextSection::MiddleToEnd,
                offset: 0.5,
            },
            "r",
        )
        .unwrap();
        // Walking from the end: target 1.5 along the 4-unit horizontal segment.
        assert_eq!(position_of(&p), point(2.5, 2.0));
    }

    #[test]
    fn route_label_on_degenerate_route_uses_first_point() {
        let p = label_on_route(&[point(1.0, 1.0)], TextMidpoint::default(), "d").unwrap();
        assert_eq!(position_of(&p), point(1.0, 1.0));
    }
}
