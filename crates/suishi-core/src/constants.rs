/// Number of month wedges on the ring.
pub const MONTHS: usize = 12;

/// Angular span of one month wedge, in degrees.
pub const WEDGE_SPAN_DEG: f64 = 30.0;

/// Global rotation so that February's wedge starts at the top (0°)
/// and January sits immediately counter-clockwise of it.
pub const GLOBAL_ROTATION_OFFSET_DEG: f64 = -30.0;

/// Day counts per month. February is always 28: leap years are not modeled.
pub const MONTH_DAYS: [u32; MONTHS] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// English month abbreviations used by term anchors ("Feb 4").
pub const MONTH_ABBREVIATIONS: [&str; MONTHS] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month labels drawn inside the wedges.
pub const MONTH_LABELS: [&str; MONTHS] = [
    "1月", "2月", "3月", "4月", "5月", "6月", "7月", "8月", "9月", "10月", "11月", "12月",
];

/// Ring centre (x and y) in the 500×500 view box.
pub const CENTER: f64 = 250.0;

pub const INNER_RADIUS: f64 = 110.0;

/// Outer radius of a wedge that is not expanded.
pub const RESTING_OUTER_RADIUS: f64 = 230.0;

/// Outer radius of the single expanded wedge.
pub const EXPANDED_OUTER_RADIUS: f64 = 255.0;

/// Hub disc is drawn this far inside the inner radius.
pub const HUB_INSET: f64 = 10.0;

/// Term label distance beyond the outer radius.
pub const LABEL_OFFSET_RESTING: f64 = 15.0;

/// Pushed further out when expanded, to clear the day ticks.
pub const LABEL_OFFSET_EXPANDED: f64 = 25.0;

/// Angular spacing between term labels sharing a wedge (±7° for a pair).
pub const LABEL_SPLAY_DEG: f64 = 14.0;

pub const TICK_LENGTH_ORDINARY: f64 = 4.0;

pub const TICK_LENGTH_ANCHOR: f64 = 8.0;

/// Anchor-day numerals sit this far inside the tick's inner end.
pub const NUMERAL_INSET: f64 = 8.0;

/// Numerical epsilon for angle comparisons.
pub const EPSILON: f64 = 1e-9;
