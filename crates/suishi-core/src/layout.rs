//! Radial layout engine.
//!
//! Turns the term table plus a focus month, today's date and the selected
//! term into backend-agnostic drawing primitives: one annulus-sector wedge per
//! month, month and term labels, and day ticks for the single expanded wedge.
//! Everything here is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CENTER, EXPANDED_OUTER_RADIUS, GLOBAL_ROTATION_OFFSET_DEG, HUB_INSET, INNER_RADIUS,
    LABEL_OFFSET_EXPANDED, LABEL_OFFSET_RESTING, LABEL_SPLAY_DEG, MONTH_DAYS, MONTH_LABELS,
    MONTHS, NUMERAL_INSET, RESTING_OUTER_RADIUS, TICK_LENGTH_ANCHOR, TICK_LENGTH_ORDINARY,
    WEDGE_SPAN_DEG,
};
use crate::geometry::{
    PathCommand, Point, annulus_sector, cartesian_to_polar, normalize_angle, polar_to_cartesian,
    upright_rotation,
};
use crate::table::TermTable;
use crate::term::Term;
use crate::time::MonthDay;

/// Radii and offsets of the ring. Defaults describe a 500×500 view box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RingGeometry {
    pub center: Point,
    pub inner_radius: f64,
    pub resting_outer_radius: f64,
    pub expanded_outer_radius: f64,
    pub hub_inset: f64,
    pub label_offset_resting: f64,
    pub label_offset_expanded: f64,
    pub label_splay_deg: f64,
    pub tick_length_ordinary: f64,
    pub tick_length_anchor: f64,
    pub numeral_inset: f64,
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self {
            center: Point::new(CENTER, CENTER),
            inner_radius: INNER_RADIUS,
            resting_outer_radius: RESTING_OUTER_RADIUS,
            expanded_outer_radius: EXPANDED_OUTER_RADIUS,
            hub_inset: HUB_INSET,
            label_offset_resting: LABEL_OFFSET_RESTING,
            label_offset_expanded: LABEL_OFFSET_EXPANDED,
            label_splay_deg: LABEL_SPLAY_DEG,
            tick_length_ordinary: TICK_LENGTH_ORDINARY,
            tick_length_anchor: TICK_LENGTH_ANCHOR,
            numeral_inset: NUMERAL_INSET,
        }
    }
}

/// Inputs of a layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Zero-based index of the expanded month. Must be < 12.
    pub focus_month: usize,
    pub today: MonthDay,
    pub selected_term_id: u8,
}

/// Positioned, rotated text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub position: Point,
    /// Rotation in degrees about `position`.
    pub rotation: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthLabelStyle {
    /// Today's calendar month; wins over `Expanded`.
    Current,
    Expanded,
    Resting,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthLabel {
    pub label: Label,
    pub style: MonthLabelStyle,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermLabel {
    pub term_id: u8,
    pub angle: f64,
    pub label: Label,
    pub color: String,
    /// Drawn bold when its wedge is expanded.
    pub emphasized: bool,
}

/// Visual class of a day tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickClass {
    Ordinary,
    Anchor,
    Today,
    AnchorToday,
}

impl TickClass {
    fn from_flags(is_anchor: bool, is_today: bool) -> Self {
        match (is_anchor, is_today) {
            (true, true) => TickClass::AnchorToday,
            (true, false) => TickClass::Anchor,
            (false, true) => TickClass::Today,
            (false, false) => TickClass::Ordinary,
        }
    }

    pub fn is_anchor(self) -> bool {
        matches!(self, TickClass::Anchor | TickClass::AnchorToday)
    }

    pub fn is_today(self) -> bool {
        matches!(self, TickClass::Today | TickClass::AnchorToday)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayTick {
    pub day: u32,
    pub angle: f64,
    /// End nearer the centre.
    pub inner: Point,
    /// End on the wedge's outer edge.
    pub outer: Point,
    pub length: f64,
    pub class: TickClass,
    /// Set only on anchor days; such ticks are selectable.
    pub term_id: Option<u8>,
    /// Day numeral, only on anchor days.
    pub numeral: Option<Label>,
    pub today_marker: Option<Point>,
    pub selected_marker: Option<Point>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WedgeArc {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub path: Vec<PathCommand>,
}

impl WedgeArc {
    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn mid_angle(&self) -> f64 {
        self.start_angle + self.span() / 2.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wedge {
    pub month_index: usize,
    pub expanded: bool,
    pub is_current_month: bool,
    pub arc: WedgeArc,
    pub month_label: MonthLabel,
    pub term_labels: Vec<TermLabel>,
    /// Empty unless `expanded`.
    pub ticks: Vec<DayTick>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RingLayout {
    pub center: Point,
    pub inner_radius: f64,
    pub resting_outer_radius: f64,
    pub hub_radius: f64,
    pub focus_month: usize,
    pub wedges: Vec<Wedge>,
}

impl RingLayout {
    pub fn wedge(&self, month_index: usize) -> &Wedge {
        &self.wedges[month_index]
    }

    pub fn expanded_wedge(&self) -> &Wedge {
        &self.wedges[self.focus_month]
    }

    /// Term selected by clicking the tick for `day` in `month_index`.
    /// Only anchor ticks of the expanded wedge select anything.
    pub fn select_tick(&self, month_index: usize, day: u32) -> Option<u8> {
        self.wedges
            .get(month_index)?
            .ticks
            .iter()
            .find(|t| t.day == day)
            .and_then(|t| t.term_id)
    }

    /// Month wedge under `point`, if the point lies inside the ring.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        let (radius, angle) = cartesian_to_polar(self.center, point);
        if radius < self.inner_radius {
            return None;
        }
        let month = month_at_angle(angle);
        (radius <= self.wedges[month].arc.outer_radius).then_some(month)
    }
}

/// Start angle of the wedge for a zero-based month.
pub fn wedge_start_angle(month_index: usize) -> f64 {
    month_index as f64 * WEDGE_SPAN_DEG + GLOBAL_ROTATION_OFFSET_DEG
}

/// Zero-based month whose wedge contains `angle_deg`.
pub fn month_at_angle(angle_deg: f64) -> usize {
    let from_january = normalize_angle(angle_deg - GLOBAL_ROTATION_OFFSET_DEG);
    ((from_january / WEDGE_SPAN_DEG) as usize).min(MONTHS - 1)
}

/// Lay out the whole ring.
///
/// Panics if `params.focus_month` is not a month index.
pub fn layout(table: &TermTable, params: &LayoutParams, geometry: &RingGeometry) -> RingLayout {
    assert!(
        params.focus_month < MONTHS,
        "focus month out of range: {}",
        params.focus_month
    );

    let wedges = (0..MONTHS)
        .map(|month_index| layout_wedge(table, params, geometry, month_index))
        .collect();

    RingLayout {
        center: geometry.center,
        inner_radius: geometry.inner_radius,
        resting_outer_radius: geometry.resting_outer_radius,
        hub_radius: geometry.inner_radius - geometry.hub_inset,
        focus_month: params.focus_month,
        wedges,
    }
}

fn layout_wedge(
    table: &TermTable,
    params: &LayoutParams,
    geometry: &RingGeometry,
    month_index: usize,
) -> Wedge {
    let expanded = month_index == params.focus_month;
    let is_current_month = month_index == params.today.month_index();
    let terms = table.terms_in_month(month_index);

    let start_angle = wedge_start_angle(month_index);
    let end_angle = start_angle + WEDGE_SPAN_DEG;
    let outer_radius = if expanded {
        geometry.expanded_outer_radius
    } else {
        geometry.resting_outer_radius
    };

    let arc = WedgeArc {
        inner_radius: geometry.inner_radius,
        outer_radius,
        start_angle,
        end_angle,
        path: annulus_sector(
            geometry.center,
            geometry.inner_radius,
            outer_radius,
            start_angle,
            end_angle,
        ),
    };

    let month_label = month_label(geometry, &arc, month_index, expanded, is_current_month);
    let term_labels = term_labels(geometry, &arc, &terms, expanded);
    let ticks = if expanded {
        day_ticks(geometry, &arc, &terms, month_index, params)
    } else {
        Vec::new()
    };

    Wedge {
        month_index,
        expanded,
        is_current_month,
        arc,
        month_label,
        term_labels,
        ticks,
    }
}

fn month_label(
    geometry: &RingGeometry,
    arc: &WedgeArc,
    month_index: usize,
    expanded: bool,
    is_current_month: bool,
) -> MonthLabel {
    let angle = arc.mid_angle();
    let radius = (arc.inner_radius + arc.outer_radius) / 2.0;
    let style = if is_current_month {
        MonthLabelStyle::Current
    } else if expanded {
        MonthLabelStyle::Expanded
    } else {
        MonthLabelStyle::Resting
    };
    MonthLabel {
        label: Label {
            text: MONTH_LABELS[month_index].to_string(),
            position: polar_to_cartesian(geometry.center, radius, angle),
            rotation: upright_rotation(angle),
        },
        style,
    }
}

fn term_labels(
    geometry: &RingGeometry,
    arc: &WedgeArc,
    terms: &[&Term],
    expanded: bool,
) -> Vec<TermLabel> {
    let offset = if expanded {
        geometry.label_offset_expanded
    } else {
        geometry.label_offset_resting
    };
    let radius = arc.outer_radius + offset;
    // Centre the group on the mid-angle: a pair lands at ±splay/2.
    let first = -(terms.len().saturating_sub(1) as f64) / 2.0;

    terms
        .iter()
        .enumerate()
        .map(|(i, term)| {
            let angle = arc.mid_angle() + (first + i as f64) * geometry.label_splay_deg;
            TermLabel {
                term_id: term.id,
                angle,
                label: Label {
                    text: term.name.clone(),
                    position: polar_to_cartesian(geometry.center, radius, angle),
                    rotation: upright_rotation(angle),
                },
                color: term.color.clone(),
                emphasized: expanded,
            }
        })
        .collect()
}

fn day_ticks(
    geometry: &RingGeometry,
    arc: &WedgeArc,
    terms: &[&Term],
    month_index: usize,
    params: &LayoutParams,
) -> Vec<DayTick> {
    let days = MONTH_DAYS[month_index];
    let per_day = arc.span() / days as f64;
    let is_current_month = month_index == params.today.month_index();

    (1..=days)
        .map(|day| {
            let angle = arc.start_angle + (day - 1) as f64 * per_day + per_day / 2.0;
            let term = terms.iter().find(|t| t.anchor.day == day);
            let is_today = is_current_month && day == params.today.day;
            let class = TickClass::from_flags(term.is_some(), is_today);

            let length = if class.is_anchor() {
                geometry.tick_length_anchor
            } else {
                geometry.tick_length_ordinary
            };
            let inner_radius = arc.outer_radius - length;
            let inner = polar_to_cartesian(geometry.center, inner_radius, angle);
            let outer = polar_to_cartesian(geometry.center, arc.outer_radius, angle);

            let numeral = term.map(|_| Label {
                text: day.to_string(),
                position: polar_to_cartesian(
                    geometry.center,
                    inner_radius - geometry.numeral_inset,
                    angle,
                ),
                rotation: upright_rotation(angle),
            });
            let selected_marker = term
                .filter(|t| t.id == params.selected_term_id)
                .map(|_| outer);

            DayTick {
                day,
                angle,
                inner,
                outer,
                length,
                class,
                term_id: term.map(|t| t.id),
                numeral,
                today_marker: is_today.then_some(inner),
                selected_marker,
            }
        })
        .collect()
}

/// Caches the most recent layout, keyed by its full input.
///
/// Owned by whoever drives the view; recomputes whenever the parameters
/// differ from the previous call. Tied to one table and geometry.
#[derive(Debug)]
pub struct LayoutMemo {
    geometry: RingGeometry,
    last: Option<(LayoutParams, RingLayout)>,
}

impl LayoutMemo {
    pub fn new(geometry: RingGeometry) -> Self {
        Self {
            geometry,
            last: None,
        }
    }

    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    /// Layout for `params`, reusing the previous result when inputs match.
    pub fn get(&mut self, table: &TermTable, params: LayoutParams) -> &RingLayout {
        if !self.is_cached(&params) {
            self.last = None;
        }
        let geometry = &self.geometry;
        &self
            .last
            .get_or_insert_with(|| (params, layout(table, &params, geometry)))
            .1
    }

    /// Whether a layout for exactly `params` is cached.
    pub fn is_cached(&self, params: &LayoutParams) -> bool {
        matches!(&self.last, Some((key, _)) if key == params)
    }

    /// Drop the cached layout, e.g. after the table was replaced.
    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
