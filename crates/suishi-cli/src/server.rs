use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use schemars::JsonSchema;
use serde::Deserialize;
use suishi_core::constants::MONTHS;
use suishi_core::{
    CalendarDate, Clock, InsightTicket, InsightTracker, InteractionState, LayoutMemo,
    LayoutParams, Point, RingGeometry, RingLayout, Term, TermPanel, TermTable, clock_face, next_term,
    resolve_current_term,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::insight::{InsightSource, fetch_insight};
use crate::svg::render_svg;

#[derive(Clone)]
pub struct SuishiServer {
    state: Arc<Mutex<ViewState>>,
    clock: Arc<dyn Clock>,
    source: Arc<dyn InsightSource>,
    tool_router: ToolRouter<Self>,
}

/// Everything one ring view needs. Guarded by a single mutex so hover,
/// selection and the memoized layout always change together.
struct ViewState {
    table: TermTable,
    today: CalendarDate,
    current_term_id: u8,
    interaction: InteractionState,
    memo: LayoutMemo,
    insights: InsightTracker,
    /// The insight request in flight, if any, and its cancellation handle.
    in_flight: Option<(InsightTicket, CancellationToken)>,
}

impl ViewState {
    fn new(table: TermTable, today: CalendarDate, geometry: RingGeometry) -> Self {
        let current_term_id = resolve_current_term(today.month_day(), &table).id;
        Self {
            table,
            today,
            current_term_id,
            interaction: InteractionState::new(current_term_id),
            memo: LayoutMemo::new(geometry),
            insights: InsightTracker::new(),
            in_flight: None,
        }
    }

    fn params(&self) -> LayoutParams {
        self.interaction
            .layout_params(&self.table, self.current_term_id, self.today.month_day())
    }

    fn ring(&mut self) -> &RingLayout {
        let params = self.params();
        tracing::debug!("layout focus month {}", params.focus_month + 1);
        self.memo.get(&self.table, params)
    }

    fn current_term(&self) -> &Term {
        // current_term_id always comes from this table
        self.table
            .by_id(self.current_term_id)
            .unwrap_or_else(|| self.table.chronological_at(0))
    }

    fn selected_term(&self) -> &Term {
        self.table
            .by_id(self.interaction.selected_term_id)
            .unwrap_or_else(|| self.current_term())
    }

    fn panel(&self) -> TermPanel {
        let term = self.selected_term();
        TermPanel::new(term, self.current_term_id, self.insights.state_for(term.id))
    }

    /// Select `term`. Changing the selection drops any insight request still
    /// in flight for the previous term.
    fn select(&mut self, term: &Term) {
        if term.id != self.interaction.selected_term_id {
            self.cancel_in_flight();
        }
        self.interaction.on_select_term(term);
    }

    fn cancel_in_flight(&mut self) {
        if let Some((ticket, token)) = self.in_flight.take() {
            tracing::debug!("cancelling insight request for term {}", ticket.term_id);
            token.cancel();
        }
        self.insights.supersede();
    }

    /// Forget a request that ended without applying a result.
    fn abandon(&mut self, ticket: InsightTicket) {
        if self.insights.abandon(ticket) {
            tracing::debug!("insight request for term {} abandoned", ticket.term_id);
        }
        if self.in_flight.as_ref().is_some_and(|(t, _)| *t == ticket) {
            self.in_flight = None;
        }
    }

    /// Re-read today's date. Returns whether the current term changed.
    fn refresh(&mut self, today: CalendarDate) -> bool {
        self.today = today;
        let id = resolve_current_term(today.month_day(), &self.table).id;
        let changed = id != self.current_term_id;
        if changed {
            tracing::info!("current term changed: {} -> {}", self.current_term_id, id);
            self.current_term_id = id;
        }
        changed
    }
}

impl SuishiServer {
    pub fn new(
        table: TermTable,
        geometry: RingGeometry,
        clock: Arc<dyn Clock>,
        source: Arc<dyn InsightSource>,
    ) -> Self {
        let state = ViewState::new(table, clock.today(), geometry);
        Self {
            state: Arc::new(Mutex::new(state)),
            clock,
            source,
            tool_router: Self::tool_router(),
        }
    }
}

/// Abandons its ticket when dropped while still armed, so a cancelled tool
/// call never leaves the panel loading.
struct PendingInsight {
    state: Arc<Mutex<ViewState>>,
    ticket: Option<InsightTicket>,
}

impl PendingInsight {
    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for PendingInsight {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        match self.state.try_lock() {
            Ok(mut state) => state.abandon(ticket),
            Err(_) => {
                let state = Arc::clone(&self.state);
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    handle.spawn(async move {
                        state.lock().await.abandon(ticket);
                    });
                }
            }
        }
    }
}

fn json_result(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).unwrap_or_default(),
    )]))
}

fn month_index(month: u32) -> Result<usize, McpError> {
    if (1..=MONTHS as u32).contains(&month) {
        Ok((month - 1) as usize)
    } else {
        Err(McpError::invalid_params(
            format!("month must be 1-12, got {month}"),
            None,
        ))
    }
}

// --- Tool parameter types ---

#[derive(Debug, Deserialize, JsonSchema)]
struct MonthRequest {
    /// Calendar month, 1-12
    month: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SelectTermRequest {
    /// Term id (1-24) or name, e.g. "立春" or "Lìchūn"
    term: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SelectTickRequest {
    /// Calendar month of the tick, 1-12
    month: u32,
    /// Day of month
    day: u32,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct HitTestRequest {
    /// x in view-box units (500x500 by default)
    x: f64,
    /// y in view-box units, pointing down
    y: f64,
}

#[tool_router]
impl SuishiServer {
    #[tool(
        description = "The solar term in effect today, with today's date, the hub clock and the next term."
    )]
    async fn current_term(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        let term = state.current_term();
        json_result(&serde_json::json!({
            "date": state.today.to_string(),
            "clock": clock_face(self.clock.as_ref()),
            "term": term,
            "next": next_term(term, &state.table),
        }))
    }

    #[tool(description = "Pointer entered a month wedge. That month expands until hover_leave.")]
    async fn hover_enter(
        &self,
        Parameters(req): Parameters<MonthRequest>,
    ) -> Result<CallToolResult, McpError> {
        let index = month_index(req.month)?;
        let mut state = self.state.lock().await;
        state.interaction.on_hover_enter(index);
        let focus = state.params().focus_month + 1;
        json_result(&serde_json::json!({ "focus_month": focus }))
    }

    #[tool(
        description = "Pointer left a month wedge. Ignored unless that month is the one hovered."
    )]
    async fn hover_leave(
        &self,
        Parameters(req): Parameters<MonthRequest>,
    ) -> Result<CallToolResult, McpError> {
        let index = month_index(req.month)?;
        let mut state = self.state.lock().await;
        state.interaction.on_hover_leave(index);
        let focus = state.params().focus_month + 1;
        json_result(&serde_json::json!({ "focus_month": focus }))
    }

    #[tool(description = "Select a term by id or name and return its detail panel.")]
    async fn select_term(
        &self,
        Parameters(req): Parameters<SelectTermRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let Some(term) = state.table.lookup(&req.term).cloned() else {
            return Err(McpError::invalid_params(
                format!("unknown term: {}", req.term),
                None,
            ));
        };
        state.select(&term);
        json_result(&state.panel())
    }

    #[tool(
        description = "Click a day tick of the expanded month. Anchor ticks select their term; other ticks do nothing."
    )]
    async fn select_tick(
        &self,
        Parameters(req): Parameters<SelectTickRequest>,
    ) -> Result<CallToolResult, McpError> {
        let index = month_index(req.month)?;
        let mut state = self.state.lock().await;
        let hit = state
            .ring()
            .select_tick(index, req.day)
            .and_then(|id| state.table.by_id(id).cloned());
        match hit {
            Some(term) => {
                state.select(&term);
                json_result(&state.panel())
            }
            None => json_result(&serde_json::json!({ "selected": null })),
        }
    }

    #[tool(description = "Which month wedge contains the point (x, y), or null.")]
    async fn hit_test(
        &self,
        Parameters(req): Parameters<HitTestRequest>,
    ) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        let month = state.ring().hit_test(Point::new(req.x, req.y)).map(|m| m + 1);
        json_result(&serde_json::json!({ "month": month }))
    }

    #[tool(description = "Full ring layout as JSON drawing primitives.")]
    async fn layout(&self) -> Result<CallToolResult, McpError> {
        let mut state = self.state.lock().await;
        json_result(state.ring())
    }

    #[tool(description = "Render the ring as an SVG document.")]
    async fn render_svg(&self) -> Result<CallToolResult, McpError> {
        let clock = clock_face(self.clock.as_ref());
        let mut state = self.state.lock().await;
        let svg = render_svg(state.ring(), &clock);
        Ok(CallToolResult::success(vec![Content::text(svg)]))
    }

    #[tool(description = "Detail panel of the selected term, including any loaded insight.")]
    async fn panel(&self) -> Result<CallToolResult, McpError> {
        let state = self.state.lock().await;
        json_result(&state.panel())
    }

    #[tool(
        description = "Generate a poem, wellbeing advice and seasonal food for the selected term. A newer call supersedes an older one still in flight; the superseded call returns {\"stale\": true}."
    )]
    async fn insight(&self) -> Result<CallToolResult, McpError> {
        let (ticket, token, term) = {
            let mut state = self.state.lock().await;
            state.cancel_in_flight();
            let token = CancellationToken::new();
            let term = state.selected_term().clone();
            let ticket = state.insights.begin(term.id);
            state.in_flight = Some((ticket, token.clone()));
            (ticket, token, term)
        };
        let mut pending = PendingInsight {
            state: Arc::clone(&self.state),
            ticket: Some(ticket),
        };

        // lock released: the fetch must not block hover/selection
        let fetched = tokio::select! {
            insight = fetch_insight(self.source.as_ref(), &term) => Some(insight),
            _ = token.cancelled() => None,
        };

        let mut state = self.state.lock().await;
        pending.disarm();
        let applied = fetched.is_some_and(|insight| state.insights.complete(ticket, insight));
        if !applied {
            state.abandon(ticket);
            tracing::debug!("discarding superseded insight for {}", term.name);
            return json_result(&serde_json::json!({ "stale": true, "term_id": term.id }));
        }
        state.in_flight = None;
        let panel = TermPanel::new(&term, state.current_term_id, state.insights.state_for(term.id));
        json_result(&panel)
    }

    #[tool(
        description = "Re-read the clock and re-resolve the current term. Call after midnight or when the date may have changed."
    )]
    async fn refresh(&self) -> Result<CallToolResult, McpError> {
        let today = self.clock.today();
        let mut state = self.state.lock().await;
        let changed = state.refresh(today);
        json_result(&serde_json::json!({
            "date": today.to_string(),
            "term": state.current_term(),
            "changed": changed,
        }))
    }

    #[tool(description = "Current local time as HH:MM:SS.")]
    async fn clock(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(clock_face(
            self.clock.as_ref(),
        ))]))
    }
}

#[tool_handler]
impl ServerHandler for SuishiServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Radial calendar of the 24 Chinese solar terms (二十四节气).\n\n\
                 The ring has 12 month wedges; exactly one is expanded and shows day ticks. \
                 Hover (hover_enter/hover_leave) expands a month temporarily. Otherwise the \
                 selected term's month is expanded, or today's month when the selection is \
                 the current term.\n\
                 - current_term: what term it is today.\n\
                 - select_term / select_tick: choose a term; panel shows its details.\n\
                 - insight: fetch a poem, advice and seasonal food for the selected term.\n\
                 - layout / render_svg: the ring as JSON primitives or an SVG document.\n\
                 Months are 1-12 in every tool."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
