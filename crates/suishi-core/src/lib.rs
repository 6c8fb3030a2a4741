//! Solar-term calendar engine.
//!
//! Maps the 24 traditional solar terms onto a 12-month ring. Resolves the
//! term active on a date (with circular wrap-around between cycles) and lays
//! the ring out as polar drawing primitives: wedge arcs, day ticks and
//! upright labels.
//!
//! Zero I/O. Rendering and transport live in the binary.

pub mod clock;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod insight;
pub mod interaction;
pub mod layout;
pub mod panel;
pub mod resolver;
pub mod table;
pub mod term;
pub mod time;

pub use clock::{clock_face, format_time_of_day};
pub use error::{Result, TableError};
pub use geometry::{PathCommand, Point, path_data, polar_to_cartesian, upright_rotation};
pub use insight::{
    Insight, InsightState, InsightTicket, InsightTracker, insight_prompt, parse_insight,
};
pub use interaction::InteractionState;
pub use layout::{
    DayTick, LayoutMemo, LayoutParams, MonthLabelStyle, RingGeometry, RingLayout, TickClass,
    Wedge, layout,
};
pub use panel::TermPanel;
pub use resolver::{next_term, previous_term, resolve_current_term};
pub use table::TermTable;
pub use term::{Season, Term, TermRecord, format_anchor, parse_anchor};
pub use time::{CalendarDate, Clock, FixedClock, LocalDateTime, MonthDay, SystemClock};
