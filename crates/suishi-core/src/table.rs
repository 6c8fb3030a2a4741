//! The immutable 24-term table.
//!
//! Storage order starts at 立春 (Feb 4), not at January. The chronological
//! (calendar) order is computed once at construction and kept alongside.

use std::collections::HashSet;

use crate::constants::MONTHS;
use crate::error::{Result, TableError};
use crate::term::{Term, TermRecord, format_anchor};

/// Built-in term data: (id, name, pinyin, translation, season, anchor, color, description).
const BUILTIN: [(u8, &str, &str, &str, &str, &str, &str, &str); 24] = [
    (1, "立春", "Lìchūn", "春季开始", "Spring", "Feb 4", "#bef264", "春回大地，万物复苏。"),
    (2, "雨水", "Yǔshuǐ", "降雨开始", "Spring", "Feb 19", "#a3e635", "降雨增多，草木萌动。"),
    (3, "惊蛰", "Jīngzhé", "春雷乍动", "Spring", "Mar 5", "#84cc16", "春雷始鸣，惊醒蛰伏昆虫。"),
    (4, "春分", "Chūnfēn", "昼夜平分", "Spring", "Mar 20", "#65a30d", "昼夜等长，春色正浓。"),
    (5, "清明", "Qīngmíng", "气清景明", "Spring", "Apr 4", "#4d7c0f", "天朗气清，春耕开始。"),
    (6, "谷雨", "Gǔyǔ", "雨生百谷", "Spring", "Apr 20", "#3f6212", "雨水充足，利于谷物生长。"),
    (7, "立夏", "Lìxià", "夏季开始", "Summer", "May 5", "#fca5a5", "万物生长，夏日初长。"),
    (8, "小满", "Xiǎomǎn", "物致于此小得盈满", "Summer", "May 21", "#f87171", "麦类灌浆，小得盈满。"),
    (9, "芒种", "Mángzhòng", "有芒之谷不可不种", "Summer", "Jun 5", "#ef4444", "有芒作物开始播种。"),
    (10, "夏至", "Xiàzhì", "白昼最长", "Summer", "Jun 21", "#dc2626", "炎热将至，白昼最长。"),
    (11, "小暑", "Xiǎoshǔ", "小热", "Summer", "Jul 7", "#b91c1c", "天气开始炎热，但未极点。"),
    (12, "大暑", "Dàshǔ", "大热", "Summer", "Jul 22", "#991b1b", "一年中最热的时期。"),
    (13, "立秋", "Lìqiū", "秋季开始", "Autumn", "Aug 7", "#fcd34d", "凉风至，秋季开始。"),
    (14, "处暑", "Chǔshǔ", "出暑", "Autumn", "Aug 23", "#fbbf24", "炎热暑气即将结束。"),
    (15, "白露", "Báilù", "露凝而白", "Autumn", "Sep 7", "#f59e0b", "天气转凉，夜间露水凝结。"),
    (16, "秋分", "Qiūfēn", "昼夜平分", "Autumn", "Sep 23", "#d97706", "昼夜平分，秋意渐浓。"),
    (17, "寒露", "Hánlù", "露水寒冷", "Autumn", "Oct 8", "#b45309", "露水寒冷，将欲凝结。"),
    (18, "霜降", "Shuāngjiàng", "气肃而凝", "Autumn", "Oct 23", "#92400e", "天气渐冷，初霜出现。"),
    (19, "立冬", "Lìdōng", "冬季开始", "Winter", "Nov 7", "#93c5fd", "万物收藏，冬季开始。"),
    (20, "小雪", "Xiǎoxuě", "小雪纷飞", "Winter", "Nov 22", "#60a5fa", "气温下降，开始降雪。"),
    (21, "大雪", "Dàxuě", "瑞雪兆丰年", "Winter", "Dec 7", "#3b82f6", "降雪量增多，地面积雪。"),
    (22, "冬至", "Dōngzhì", "极致之冬", "Winter", "Dec 21", "#2563eb", "白昼最短，寒冷将至。"),
    (23, "小寒", "Xiǎohán", "寒冷", "Winter", "Jan 5", "#1d4ed8", "气候开始寒冷。"),
    (24, "大寒", "Dàhán", "极寒", "Winter", "Jan 20", "#1e40af", "一年中最寒冷的时候。"),
];

#[derive(Clone, Debug)]
pub struct TermTable {
    terms: Vec<Term>,
    /// Indices into `terms`, sorted by canonical anchor value.
    chronological: Vec<usize>,
}

impl TermTable {
    /// The compiled-in table of the 24 traditional terms.
    pub fn builtin() -> Self {
        let records = BUILTIN
            .iter()
            .map(
                |&(id, name, pinyin, translation, season, anchor, color, description)| {
                    TermRecord {
                        id,
                        name: name.to_string(),
                        pinyin: pinyin.to_string(),
                        translation: translation.to_string(),
                        season: season.to_string(),
                        anchor: anchor.to_string(),
                        color: color.to_string(),
                        description: description.to_string(),
                    }
                },
            )
            .collect();
        // The built-in data is validated by the test suite.
        Self::from_records(records).unwrap_or_else(|e| panic!("built-in term table: {e}"))
    }

    /// Build a table from raw records, parsing anchors and checking invariants.
    pub fn from_records(records: Vec<TermRecord>) -> Result<Self> {
        let terms = records
            .into_iter()
            .map(TermRecord::into_term)
            .collect::<Result<Vec<_>>>()?;
        Self::from_terms(terms)
    }

    pub fn from_terms(terms: Vec<Term>) -> Result<Self> {
        if terms.is_empty() {
            return Err(TableError::Empty);
        }

        let mut ids = HashSet::new();
        let mut anchors = HashSet::new();
        for term in &terms {
            if !ids.insert(term.id) {
                return Err(TableError::DuplicateId(term.id));
            }
            if !anchors.insert(term.anchor) {
                return Err(TableError::DuplicateAnchor(format_anchor(term.anchor)));
            }
        }

        let mut chronological: Vec<usize> = (0..terms.len()).collect();
        chronological.sort_by_key(|&i| terms[i].anchor.canonical());

        Ok(Self {
            terms,
            chronological,
        })
    }

    /// Terms in storage order (starting at the spring term).
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in calendar order, January first.
    pub fn chronological(&self) -> impl ExactSizeIterator<Item = &Term> + '_ {
        self.chronological.iter().map(|&i| &self.terms[i])
    }

    /// The `i`-th term in calendar order.
    pub fn chronological_at(&self, i: usize) -> &Term {
        &self.terms[self.chronological[i]]
    }

    pub fn by_id(&self, id: u8) -> Option<&Term> {
        self.terms.iter().find(|t| t.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Term> {
        self.terms
            .iter()
            .find(|t| t.name == name || t.pinyin.eq_ignore_ascii_case(name))
    }

    /// Look up by numeric id, falling back to name or pinyin.
    pub fn lookup(&self, key: &str) -> Option<&Term> {
        let key = key.trim();
        match key.parse::<u8>() {
            Ok(id) => self.by_id(id),
            Err(_) => self.by_name(key),
        }
    }

    /// Terms anchored in the given zero-based month, in storage order.
    pub fn terms_in_month(&self, month_index: usize) -> Vec<&Term> {
        assert!(month_index < MONTHS, "month index out of range: {month_index}");
        self.terms
            .iter()
            .filter(|t| t.month_index() == month_index)
            .collect()
    }
}
