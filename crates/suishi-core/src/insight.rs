//! Seasonal insight records and request supersession.
//!
//! The text itself comes from an external generator; this module only owns
//! the record shape, the prompt, the fixed fallbacks, and the bookkeeping
//! that decides whether a finished request is still wanted.

use serde::{Deserialize, Serialize};

use crate::term::Term;

/// A poem, wellbeing advice and seasonal food for one term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insight {
    pub poem: String,
    pub advice: String,
    pub food: String,
}

impl Insight {
    /// Returned for any generator failure.
    pub fn fallback() -> Self {
        Self {
            poem: "春有百花秋有月，\n夏有凉风冬有雪。\n若无闲事挂心头，\n便是人间好时节。"
                .to_string(),
            advice: "顺应天时，早睡早起，保持心情舒畅。".to_string(),
            food: "时令蔬菜与清茶。".to_string(),
        }
    }

    /// Returned without contacting the generator when no API key is configured.
    pub fn missing_credential() -> Self {
        Self {
            poem: "请输入 API Key 以生成诗词。".to_string(),
            advice: "请输入 API Key 以获取养生建议。".to_string(),
            food: "暂无数据".to_string(),
        }
    }
}

/// Prompt asking the generator for an [`Insight`] as a JSON object.
pub fn insight_prompt(term: &Term) -> String {
    format!(
        "你是一位精通中国传统文化、二十四节气和中医养生的专家。\n\
         用户正在查询节气：{name}（{translation}）。{description}\n\n\
         请提供以下内容（全部使用中文）：\n\
         1. 一首关于这个节气的简短诗词（五言或七言绝句，或者优美的短句），富有文学意境。\n\
         2. 针对现代生活节奏的“养生”建议，切实可行。\n\
         3. 这个节气推荐食用的一到两种时令食材或菜肴。\n\n\
         保持语气平和、智慧且富有美感。\n\
         只返回一个 JSON 对象，字段为 \"poem\"、\"advice\"、\"food\"，均为字符串。",
        name = term.name,
        translation = term.translation,
        description = term.description,
    )
}

/// Parse generator output into an [`Insight`].
///
/// Accepts a bare JSON object or one wrapped in a Markdown code fence.
/// All three fields must be present; empty strings are rejected.
pub fn parse_insight(text: &str) -> Option<Insight> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    let insight: Insight = serde_json::from_str(body).ok()?;
    let complete = [&insight.poem, &insight.advice, &insight.food]
        .iter()
        .all(|s| !s.trim().is_empty());
    complete.then_some(insight)
}

/// Identifies one insight request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InsightTicket {
    pub generation: u64,
    pub term_id: u8,
}

/// What the detail panel should show for a term.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "insight", rename_all = "snake_case")]
pub enum InsightState {
    /// Nothing requested for this term yet.
    Idle,
    Loading,
    Ready(Insight),
    Unavailable,
}

/// Supersession bookkeeping for insight requests.
///
/// Every [`begin`](Self::begin) invalidates all earlier tickets; only the
/// newest ticket's result is ever applied.
#[derive(Debug, Default)]
pub struct InsightTracker {
    generation: u64,
    pending: Option<InsightTicket>,
    latest: Option<(u8, Insight)>,
}

impl InsightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `term_id`, superseding any in-flight one.
    pub fn begin(&mut self, term_id: u8) -> InsightTicket {
        self.generation += 1;
        let ticket = InsightTicket {
            generation: self.generation,
            term_id,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Apply a finished request. Returns `false` (and drops the result) when
    /// the ticket has been superseded.
    pub fn complete(&mut self, ticket: InsightTicket, insight: Insight) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        self.latest = Some((ticket.term_id, insight));
        true
    }

    /// Forget a request that ended without a result. No-op once superseded.
    pub fn abandon(&mut self, ticket: InsightTicket) -> bool {
        if self.pending != Some(ticket) {
            return false;
        }
        self.pending = None;
        true
    }

    /// Drop whatever request is in flight, so its result is discarded.
    pub fn supersede(&mut self) -> Option<InsightTicket> {
        self.pending.take()
    }

    pub fn is_current(&self, ticket: InsightTicket) -> bool {
        self.pending == Some(ticket)
    }

    pub fn pending(&self) -> Option<InsightTicket> {
        self.pending
    }

    pub fn state_for(&self, term_id: u8) -> InsightState {
        if self.pending.is_some_and(|t| t.term_id == term_id) {
            return InsightState::Loading;
        }
        match &self.latest {
            Some((id, insight)) if *id == term_id => InsightState::Ready(insight.clone()),
            _ => InsightState::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TermTable;

    fn sample() -> Insight {
        Insight {
            poem: "诗".into(),
            advice: "养".into(),
            food: "食".into(),
        }
    }

    #[test]
    fn test_fallbacks_are_fixed() {
        assert_eq!(Insight::fallback(), Insight::fallback());
        assert!(Insight::fallback().poem.contains("好时节"));
        assert_eq!(Insight::missing_credential().food, "暂无数据");
    }

    #[test]
    fn test_prompt_mentions_term() {
        let table = TermTable::builtin();
        let prompt = insight_prompt(table.by_id(10).unwrap());
        assert!(prompt.contains("夏至"));
        assert!(prompt.contains("\"poem\""));
    }

    #[test]
    fn test_parse_bare_json() {
        let parsed = parse_insight(r#"{"poem":"诗","advice":"养","food":"食"}"#);
        assert_eq!(parsed, Some(sample()));
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"poem\":\"诗\",\"advice\":\"养\",\"food\":\"食\"}\n```";
        assert_eq!(parse_insight(text), Some(sample()));
        let text = "```\n{\"poem\":\"诗\",\"advice\":\"养\",\"food\":\"食\"}\n```";
        assert_eq!(parse_insight(text), Some(sample()));
    }

    #[test]
    fn test_parse_rejects_incomplete() {
        assert!(parse_insight(r#"{"poem":"诗","advice":"养"}"#).is_none());
        assert!(parse_insight(r#"{"poem":"诗","advice":"","food":"食"}"#).is_none());
        assert!(parse_insight("not json at all").is_none());
    }

    #[test]
    fn test_tracker_applies_current_ticket() {
        let mut tracker = InsightTracker::new();
        let ticket = tracker.begin(4);
        assert_eq!(tracker.state_for(4), InsightState::Loading);
        assert!(tracker.complete(ticket, sample()));
        assert_eq!(tracker.state_for(4), InsightState::Ready(sample()));
        assert_eq!(tracker.state_for(5), InsightState::Idle);
        assert!(tracker.pending().is_none());
    }

    #[test]
    fn test_tracker_discards_superseded_result() {
        let mut tracker = InsightTracker::new();
        let first = tracker.begin(4);
        let second = tracker.begin(9);
        assert!(!tracker.is_current(first));
        assert!(!tracker.complete(first, sample()));
        assert_eq!(tracker.state_for(4), InsightState::Idle);
        assert_eq!(tracker.state_for(9), InsightState::Loading);
        assert!(tracker.complete(second, Insight::fallback()));
        assert_eq!(tracker.state_for(9), InsightState::Ready(Insight::fallback()));
    }

    #[test]
    fn test_reselecting_same_term_still_supersedes() {
        let mut tracker = InsightTracker::new();
        let first = tracker.begin(4);
        let second = tracker.begin(4);
        assert_ne!(first, second);
        assert!(!tracker.complete(first, sample()));
        assert!(tracker.complete(second, sample()));
    }

    #[test]
    fn test_completed_ticket_cannot_apply_twice() {
        let mut tracker = InsightTracker::new();
        let ticket = tracker.begin(1);
        assert!(tracker.complete(ticket, sample()));
        assert!(!tracker.complete(ticket, Insight::fallback()));
        assert_eq!(tracker.state_for(1), InsightState::Ready(sample()));
    }

    #[test]
    fn test_abandon_clears_loading() {
        let mut tracker = InsightTracker::new();
        let ticket = tracker.begin(7);
        assert!(tracker.abandon(ticket));
        assert_eq!(tracker.state_for(7), InsightState::Idle);
        assert!(!tracker.complete(ticket, sample()));
    }

    #[test]
    fn test_abandon_after_supersession_keeps_newer() {
        let mut tracker = InsightTracker::new();
        let old = tracker.begin(7);
        let new = tracker.begin(8);
        assert!(!tracker.abandon(old));
        assert_eq!(tracker.pending(), Some(new));
        assert_eq!(tracker.state_for(8), InsightState::Loading);
    }

    #[test]
    fn test_supersede_discards_in_flight() {
        let mut tracker = InsightTracker::new();
        let ticket = tracker.begin(3);
        assert_eq!(tracker.supersede(), Some(ticket));
        assert!(!tracker.complete(ticket, sample()));
        assert_eq!(tracker.state_for(3), InsightState::Idle);
        assert_eq!(tracker.supersede(), None);
    }
}
