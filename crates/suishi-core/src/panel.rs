use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::insight::InsightState;
use crate::term::Term;

/// Detail panel for the selected term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TermPanel {
    pub term_id: u8,
    pub name: String,
    pub translation: String,
    /// e.g. "2月4日"
    pub gregorian_date: String,
    pub is_current: bool,
    pub description: String,
    pub color: String,
    pub insight: InsightState,
}

impl TermPanel {
    pub fn new(term: &Term, current_term_id: u8, insight: InsightState) -> Self {
        Self {
            term_id: term.id,
            name: term.name.clone(),
            translation: term.translation.clone(),
            gregorian_date: term.gregorian_label(),
            is_current: term.id == current_term_id,
            description: term.description.clone(),
            color: term.color.clone(),
            insight,
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let badge = if self.is_current { "  [当前节气]" } else { "" };
        let _ = writeln!(out, "{}  {}{}", self.name, self.translation, badge);
        let _ = writeln!(out, "公历 {}", self.gregorian_date);
        let _ = writeln!(out, "\"{}\"", self.description);
        let _ = writeln!(out);

        match &self.insight {
            InsightState::Idle => {}
            InsightState::Loading => {
                let _ = writeln!(out, "正在寻访古籍智慧...");
            }
            InsightState::Ready(insight) => {
                let _ = writeln!(out, "诗意时节\n{}\n", insight.poem);
                let _ = writeln!(out, "养生之道\n{}\n", insight.advice);
                let _ = writeln!(out, "时令美食\n{}", insight.food);
            }
            InsightState::Unavailable => {
                let _ = writeln!(out, "无法加载数据。");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::Insight;
    use crate::table::TermTable;

    #[test]
    fn test_current_badge_and_date() {
        let table = TermTable::builtin();
        let panel = TermPanel::new(table.by_id(1).unwrap(), 1, InsightState::Unavailable);
        assert!(panel.is_current);
        assert_eq!(panel.gregorian_date, "2月4日");
        let text = panel.render_text();
        assert!(text.starts_with("立春  春季开始  [当前节气]"));
        assert!(text.contains("公历 2月4日"));
        assert!(text.contains("无法加载数据。"));
    }

    #[test]
    fn test_idle_renders_no_insight_area() {
        let table = TermTable::builtin();
        let panel = TermPanel::new(table.by_id(4).unwrap(), 1, InsightState::Idle);
        let text = panel.render_text();
        assert!(text.ends_with("\"\n\n"));
        assert!(!text.contains("无法加载数据"));
        assert!(!text.contains("正在寻访"));
    }

    #[test]
    fn test_not_current() {
        let table = TermTable::builtin();
        let panel = TermPanel::new(table.by_id(12).unwrap(), 1, InsightState::Loading);
        assert!(!panel.is_current);
        let text = panel.render_text();
        assert!(!text.contains("当前节气"));
        assert!(text.contains("正在寻访古籍智慧"));
    }

    #[test]
    fn test_ready_sections() {
        let table = TermTable::builtin();
        let panel = TermPanel::new(
            table.by_id(22).unwrap(),
            22,
            InsightState::Ready(Insight::fallback()),
        );
        let text = panel.render_text();
        assert!(text.contains("诗意时节\n春有百花秋有月"));
        assert!(text.contains("养生之道\n顺应天时"));
        assert!(text.contains("时令美食\n时令蔬菜与清茶。"));
    }
}
