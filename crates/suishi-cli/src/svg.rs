//! SVG backend for [`RingLayout`].

use std::fmt::Write;

use suishi_core::geometry::fmt_coord;
use suishi_core::layout::{Label, MonthLabelStyle};
use suishi_core::{DayTick, RingLayout, TickClass, Wedge, path_data};

const VIEW_SIZE: f64 = 500.0;

/// Render the ring as a standalone SVG document. `clock` goes in the hub.
pub fn render_svg(ring: &RingLayout, clock: &str) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {0} {0}" width="{0}" height="{0}">"#,
        fmt_coord(VIEW_SIZE)
    );

    let c = ring.center;
    let _ = writeln!(
        svg,
        r##"  <circle cx="{}" cy="{}" r="{}" fill="#fafaf9" opacity="0.5"/>"##,
        fmt_coord(c.x),
        fmt_coord(c.y),
        fmt_coord(ring.resting_outer_radius)
    );

    // The expanded wedge is drawn last so its wider outline stays on top.
    let (expanded, resting): (Vec<&Wedge>, Vec<&Wedge>) =
        ring.wedges.iter().partition(|w| w.expanded);
    for wedge in resting.into_iter().chain(expanded) {
        render_wedge(&mut svg, wedge);
    }

    let _ = writeln!(
        svg,
        r##"  <circle cx="{}" cy="{}" r="{}" fill="#0c0a09" stroke="#333" stroke-width="2"/>"##,
        fmt_coord(c.x),
        fmt_coord(c.y),
        fmt_coord(ring.hub_radius)
    );
    let _ = writeln!(
        svg,
        r##"  <text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle" font-family="monospace" font-size="40" fill="#4ade80">{}</text>"##,
        fmt_coord(c.x),
        fmt_coord(c.y),
        escape_xml(clock)
    );
    let _ = writeln!(svg, "</svg>");
    svg
}

fn render_wedge(svg: &mut String, wedge: &Wedge) {
    let (fill, stroke, width) = if wedge.expanded {
        ("#ffffff", "#ffffff", 3)
    } else {
        ("#fcfbf8", "#e5e5e5", 1)
    };
    let _ = writeln!(svg, r#"  <g data-month="{}">"#, wedge.month_index + 1);
    let _ = writeln!(
        svg,
        r#"    <path d="{}" fill="{fill}" stroke="{stroke}" stroke-width="{width}"/>"#,
        path_data(&wedge.arc.path)
    );

    let (color, weight) = match wedge.month_label.style {
        MonthLabelStyle::Current => ("#dc2626", "800"),
        MonthLabelStyle::Expanded => ("#a8a29e", "bold"),
        MonthLabelStyle::Resting => ("#d6d3d1", "bold"),
    };
    render_label(svg, &wedge.month_label.label, 12, color, weight);

    for term in &wedge.term_labels {
        if term.emphasized {
            render_label(svg, &term.label, 10, &term.color, "bold");
        } else {
            render_label(svg, &term.label, 10, "#a8a29e", "500");
        }
    }

    for tick in &wedge.ticks {
        render_tick(svg, tick);
    }
    let _ = writeln!(svg, "  </g>");
}

fn render_tick(svg: &mut String, tick: &DayTick) {
    let (stroke, width) = match tick.class {
        TickClass::Anchor | TickClass::AnchorToday => ("#ef4444", 2),
        TickClass::Today => ("#16a34a", 2),
        TickClass::Ordinary => ("#a8a29e", 1),
    };
    let term_attr = tick
        .term_id
        .map(|id| format!(r#" data-term="{id}""#))
        .unwrap_or_default();
    let _ = writeln!(
        svg,
        r#"    <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{stroke}" stroke-width="{width}"{term_attr}/>"#,
        fmt_coord(tick.inner.x),
        fmt_coord(tick.inner.y),
        fmt_coord(tick.outer.x),
        fmt_coord(tick.outer.y),
    );
    if let Some(p) = tick.today_marker {
        let _ = writeln!(
            svg,
            r##"    <circle cx="{}" cy="{}" r="3" fill="#16a34a"/>"##,
            fmt_coord(p.x),
            fmt_coord(p.y)
        );
    }
    if let Some(numeral) = &tick.numeral {
        render_label(svg, numeral, 9, "#dc2626", "bold");
    }
    if let Some(p) = tick.selected_marker {
        let _ = writeln!(
            svg,
            r##"    <circle cx="{}" cy="{}" r="3" fill="#ef4444"/>"##,
            fmt_coord(p.x),
            fmt_coord(p.y)
        );
    }
}

fn render_label(svg: &mut String, label: &Label, size: u32, fill: &str, weight: &str) {
    let x = fmt_coord(label.position.x);
    let y = fmt_coord(label.position.y);
    let _ = writeln!(
        svg,
        r#"    <text x="{x}" y="{y}" transform="rotate({} {x} {y})" text-anchor="middle" dominant-baseline="middle" font-size="{size}" font-weight="{weight}" fill="{fill}">{}</text>"#,
        fmt_coord(label.rotation),
        escape_xml(&label.text)
    );
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
