//! Polar geometry primitives for the ring.
//!
//! Angles are in degrees, measured clockwise from the visual top (12 o'clock).
//! The y axis points down, as on every 2D raster surface.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Point at `radius` and `angle_deg` around `center`. 0° is straight up.
pub fn polar_to_cartesian(center: Point, radius: f64, angle_deg: f64) -> Point {
    let rad = (angle_deg - 90.0).to_radians();
    Point {
        x: center.x + radius * rad.cos(),
        y: center.y + radius * rad.sin(),
    }
}

/// Inverse of [`polar_to_cartesian`]: (radius, angle in [0, 360)).
pub fn cartesian_to_polar(center: Point, p: Point) -> (f64, f64) {
    let dx = p.x - center.x;
    let dy = p.y - center.y;
    let angle = dy.atan2(dx).to_degrees() + 90.0;
    (dx.hypot(dy), normalize_angle(angle))
}

/// Wrap an angle into [0, 360).
pub fn normalize_angle(angle_deg: f64) -> f64 {
    let a = angle_deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 { 0.0 } else { a }
}

/// Text rotation that keeps radial text readable.
///
/// Text runs along the radius (`angle - 90`). On the left half of the ring,
/// where the normalized angle lies strictly inside (180°, 360°), it would read
/// upside down, so it is turned a further 180°.
pub fn upright_rotation(angle_deg: f64) -> f64 {
    let normalized = normalize_angle(angle_deg);
    if normalized > 180.0 && normalized < 360.0 {
        angle_deg + 90.0
    } else {
        angle_deg - 90.0
    }
}

/// One drawing command of a closed outline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    /// Elliptical arc with equal radii, as in SVG's `A` command.
    ArcTo {
        radius: f64,
        large_arc: bool,
        sweep: bool,
        to: Point,
    },
    Close,
}

/// Outline of an annulus sector between `inner` and `outer` radius spanning
/// `[start_deg, end_deg]`.
///
/// Two arcs joined by two radial lines: outer edge from end to start
/// (counter-clockwise), line inwards, inner edge back from start to end.
pub fn annulus_sector(
    center: Point,
    inner: f64,
    outer: f64,
    start_deg: f64,
    end_deg: f64,
) -> Vec<PathCommand> {
    let outer_from = polar_to_cartesian(center, outer, end_deg);
    let outer_to = polar_to_cartesian(center, outer, start_deg);
    let inner_from = polar_to_cartesian(center, inner, start_deg);
    let inner_to = polar_to_cartesian(center, inner, end_deg);
    let large_arc = end_deg - start_deg > 180.0;

    vec![
        PathCommand::MoveTo(outer_from),
        PathCommand::ArcTo {
            radius: outer,
            large_arc,
            sweep: false,
            to: outer_to,
        },
        PathCommand::LineTo(inner_from),
        PathCommand::ArcTo {
            radius: inner,
            large_arc,
            sweep: true,
            to: inner_to,
        },
        PathCommand::Close,
    ]
}

/// Serialize path commands into SVG path data (`M x y A r r 0 f s x y ...`).
pub fn path_data(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(|c| match c {
            PathCommand::MoveTo(p) => format!("M {} {}", fmt_coord(p.x), fmt_coord(p.y)),
            PathCommand::LineTo(p) => format!("L {} {}", fmt_coord(p.x), fmt_coord(p.y)),
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => format!(
                "A {r} {r} 0 {} {} {} {}",
                u8::from(*large_arc),
                u8::from(*sweep),
                fmt_coord(to.x),
                fmt_coord(to.y),
                r = fmt_coord(*radius),
            ),
            PathCommand::Close => "Z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Round to 3 decimals and drop trailing zeros.
pub fn fmt_coord(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    // avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const C: Point = Point { x: 250.0, y: 250.0 };

    #[test]
    fn test_zero_degrees_is_top() {
        let p = polar_to_cartesian(C, 100.0, 0.0);
        assert_abs_diff_eq!(p.x, 250.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ninety_degrees_is_right() {
        let p = polar_to_cartesian(C, 100.0, 90.0);
        assert_abs_diff_eq!(p.x, 350.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cartesian_to_polar_inverts() {
        for angle in [1.0, 15.0, 90.0, 179.0, 181.0, 270.0, 345.0] {
            let p = polar_to_cartesian(C, 123.0, angle);
            let (r, a) = cartesian_to_polar(C, p);
            assert_abs_diff_eq!(r, 123.0, epsilon = 1e-9);
            assert_abs_diff_eq!(a, angle, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(-15.0), 345.0);
        assert_eq!(normalize_angle(360.0), 0.0);
        assert_eq!(normalize_angle(725.0), 5.0);
        assert!(normalize_angle(-1e-20) < 360.0);
    }

    #[test]
    fn test_upright_rotation_right_half() {
        assert_eq!(upright_rotation(15.0), -75.0);
        assert_eq!(upright_rotation(165.0), 75.0);
        // exactly 180 is not flipped
        assert_eq!(upright_rotation(180.0), 90.0);
    }

    #[test]
    fn test_upright_rotation_left_half() {
        assert_eq!(upright_rotation(195.0), 285.0);
        assert_eq!(upright_rotation(345.0), 435.0);
        // negative angles normalize into the left half
        assert_eq!(upright_rotation(-15.0), 75.0);
    }

    #[test]
    fn test_annulus_sector_shape() {
        let cmds = annulus_sector(C, 110.0, 230.0, 0.0, 30.0);
        assert_eq!(cmds.len(), 5);
        match cmds[0] {
            PathCommand::MoveTo(p) => assert_abs_diff_eq!(p.distance(C), 230.0, epsilon = 1e-9),
            other => panic!("expected MoveTo, got {other:?}"),
        }
        match cmds[1] {
            PathCommand::ArcTo {
                radius,
                large_arc,
                sweep,
                to,
            } => {
                assert_eq!(radius, 230.0);
                assert!(!large_arc);
                assert!(!sweep);
                // outer arc ends at the start angle (top)
                assert_abs_diff_eq!(to.x, 250.0, epsilon = 1e-9);
                assert_abs_diff_eq!(to.y, 20.0, epsilon = 1e-9);
            }
            other => panic!("expected ArcTo, got {other:?}"),
        }
        assert!(matches!(cmds[3], PathCommand::ArcTo { sweep: true, radius, .. } if radius == 110.0));
        assert_eq!(cmds[4], PathCommand::Close);
    }

    #[test]
    fn test_large_arc_flag_only_beyond_half_turn() {
        let flag = |span: f64| match annulus_sector(C, 10.0, 20.0, 0.0, span)[1] {
            PathCommand::ArcTo { large_arc, .. } => large_arc,
            _ => unreachable!(),
        };
        assert!(!flag(30.0));
        assert!(!flag(180.0));
        assert!(flag(180.5));
        assert!(flag(300.0));
    }

    #[test]
    fn test_path_data() {
        let cmds = annulus_sector(C, 110.0, 230.0, 0.0, 90.0);
        let d = path_data(&cmds);
        assert!(d.starts_with("M 480 250 A 230 230 0 0 0 250 20 L 250 140 A 110 110 0 0 1 360 250"));
        assert!(d.ends_with('Z'));
    }

    #[test]
    fn test_fmt_coord() {
        assert_eq!(fmt_coord(1.23456), "1.235");
        assert_eq!(fmt_coord(-0.0001), "0");
        assert_eq!(fmt_coord(250.0), "250");
    }
}
