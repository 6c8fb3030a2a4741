use serde::{Deserialize, Serialize};

use crate::constants::MONTHS;
use crate::layout::LayoutParams;
use crate::table::TermTable;
use crate::term::Term;
use crate::time::MonthDay;

/// Hover and selection state of one ring view.
///
/// Ephemeral: lives as long as the view and is never persisted. When shared
/// across threads, callers serialize access (the server keeps it behind a
/// mutex) so `hover` and `selected_term_id` always change as a pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionState {
    pub hover: Option<usize>,
    pub selected_term_id: u8,
}

impl InteractionState {
    /// Start with nothing hovered and the current term selected.
    pub fn new(current_term_id: u8) -> Self {
        Self {
            hover: None,
            selected_term_id: current_term_id,
        }
    }

    pub fn on_hover_enter(&mut self, month_index: usize) {
        assert!(month_index < MONTHS, "month index out of range: {month_index}");
        self.hover = Some(month_index);
    }

    /// Clears hover only if `month_index` is the month being hovered, so a
    /// late leave event from a previous wedge cannot undo a newer enter.
    pub fn on_hover_leave(&mut self, month_index: usize) {
        if self.hover == Some(month_index) {
            self.hover = None;
        }
    }

    pub fn on_select_term(&mut self, term: &Term) {
        self.selected_term_id = term.id;
    }

    /// Month to expand, by priority: hover, then the selected term's month
    /// when the selection differs from the current term, then today's month.
    pub fn effective_focus_month(
        &self,
        table: &TermTable,
        current_term_id: u8,
        today: MonthDay,
    ) -> usize {
        if let Some(month) = self.hover {
            return month;
        }
        if self.selected_term_id != current_term_id
            && let Some(term) = table.by_id(self.selected_term_id)
        {
            return term.month_index();
        }
        today.month_index()
    }

    /// Full layout input for the current state.
    pub fn layout_params(
        &self,
        table: &TermTable,
        current_term_id: u8,
        today: MonthDay,
    ) -> LayoutParams {
        LayoutParams {
            focus_month: self.effective_focus_month(table, current_term_id, today),
            today,
            selected_term_id: self.selected_term_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODAY: MonthDay = MonthDay { month: 10, day: 19 };
    const CURRENT: u8 = 17; // 寒露

    fn table() -> TermTable {
        TermTable::builtin()
    }

    #[test]
    fn test_initial_focus_is_today() {
        let s = InteractionState::new(CURRENT);
        assert_eq!(s.effective_focus_month(&table(), CURRENT, TODAY), 9);
    }

    #[test]
    fn test_hover_wins() {
        let mut s = InteractionState::new(CURRENT);
        s.on_hover_enter(3);
        assert_eq!(s.effective_focus_month(&table(), CURRENT, TODAY), 3);
    }

    #[test]
    fn test_hover_leave_restores() {
        let t = table();
        let mut s = InteractionState::new(CURRENT);
        s.on_hover_enter(3);
        s.on_hover_enter(4);
        assert_eq!(s.effective_focus_month(&t, CURRENT, TODAY), 4);
        // stale leave from the previous wedge is ignored
        s.on_hover_leave(3);
        assert_eq!(s.hover, Some(4));
        s.on_hover_leave(4);
        assert_eq!(s.hover, None);
        assert_eq!(s.effective_focus_month(&t, CURRENT, TODAY), 9);
    }

    #[test]
    fn test_divergent_selection_focuses_its_month() {
        let t = table();
        let mut s = InteractionState::new(CURRENT);
        s.on_select_term(t.by_id(10).unwrap()); // 夏至, June
        assert_eq!(s.effective_focus_month(&t, CURRENT, TODAY), 5);
        assert_eq!(s.hover, None);
    }

    #[test]
    fn test_selecting_current_term_again_focuses_today() {
        let t = table();
        let mut s = InteractionState::new(CURRENT);
        s.on_select_term(t.by_id(4).unwrap());
        s.on_select_term(t.by_id(CURRENT).unwrap());
        assert_eq!(s.effective_focus_month(&t, CURRENT, TODAY), 9);
    }

    #[test]
    fn test_current_term_in_other_month_still_focuses_today() {
        // Jan 2: current term is 冬至 (Dec 21) but today's month is January.
        let t = table();
        let s = InteractionState::new(22);
        assert_eq!(s.effective_focus_month(&t, 22, MonthDay::new(1, 2)), 0);
    }

    #[test]
    fn test_select_does_not_touch_hover() {
        let t = table();
        let mut s = InteractionState::new(CURRENT);
        s.on_hover_enter(7);
        s.on_select_term(t.by_id(1).unwrap());
        assert_eq!(s.hover, Some(7));
        assert_eq!(s.effective_focus_month(&t, CURRENT, TODAY), 7);
    }

    #[test]
    fn test_layout_params() {
        let t = table();
        let mut s = InteractionState::new(CURRENT);
        s.on_select_term(t.by_id(2).unwrap());
        let p = s.layout_params(&t, CURRENT, TODAY);
        assert_eq!(p.focus_month, 1);
        assert_eq!(p.selected_term_id, 2);
        assert_eq!(p.today, TODAY);
    }

    #[test]
    #[should_panic(expected = "month index out of range")]
    fn test_hover_out_of_range_panics() {
        InteractionState::new(CURRENT).on_hover_enter(12);
    }
}
