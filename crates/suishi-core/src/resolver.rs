use crate::table::TermTable;
use crate::term::Term;
use crate::time::MonthDay;

/// Resolve the term active on `today`: the latest anchor at or before the
/// date, wrapping into the previous cycle when the date precedes every anchor.
///
/// The year is ignored. Pure and deterministic.
pub fn resolve_current_term(today: MonthDay, table: &TermTable) -> &Term {
    table.chronological_at(active_chronological_index(today, table))
}

/// Index into the table's chronological order of the active term.
///
/// `p` counts anchors at or before `today`; the active term is the one just
/// before that partition point, taken modulo the table length. `p == 0`
/// therefore lands on the last term of the previous cycle, and `p == len`
/// on the last term of this one.
pub fn active_chronological_index(today: MonthDay, table: &TermTable) -> usize {
    let current = today.canonical();
    let len = table.len();
    let p = table
        .chronological()
        .take_while(|t| t.anchor.canonical() <= current)
        .count();
    (p + len - 1) % len
}

/// The term that follows `term` in the cycle.
pub fn next_term<'a>(term: &Term, table: &'a TermTable) -> &'a Term {
    let i = chronological_position(term, table);
    table.chronological_at((i + 1) % table.len())
}

/// The term that precedes `term` in the cycle.
pub fn previous_term<'a>(term: &Term, table: &'a TermTable) -> &'a Term {
    let i = chronological_position(term, table);
    table.chronological_at((i + table.len() - 1) % table.len())
}

fn chronological_position(term: &Term, table: &TermTable) -> usize {
    table
        .chronological()
        .position(|t| t.id == term.id)
        .unwrap_or_else(|| panic!("term {} is not in this table", term.id))
}
