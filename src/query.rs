use rayon::prelude::*;
use std::time::Instant;
use tracing::trace;

use crate::record::{Column, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub ascending: bool,
}

impl SortState {
    /// Selecting the sorted column flips the direction, any other column
    /// starts ascending.
    pub fn toggle(current: Option<SortState>, column: Column) -> SortState {
        match current {
            Some(s) if s.column == column => SortState {
                column,
                ascending: !s.ascending,
            },
            _ => SortState {
                column,
                ascending: true,
            },
        }
    }
}

/// Split the filter text into lower-cased keywords.
pub fn keywords(filter: &str) -> Vec<String> {
    filter
        .trim()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Every keyword must be contained in at least one field.
pub fn matches(record: &Record, keywords: &[String]) -> bool {
    keywords.iter().all(|kw| {
        record
            .fields()
            .any(|value| value.to_lowercase().contains(kw.as_str()))
    })
}

pub fn filter(records: &[Record], filter_text: &str) -> Vec<Record> {
    let kws = keywords(filter_text);
    if kws.is_empty() {
        return records.to_vec();
    }
    // Indexed parallel filter keeps the input order.
    records
        .par_iter()
        .filter(|r| matches(r, &kws))
        .cloned()
        .collect()
}

pub fn sort(rows: &mut [Record], sort: SortState) {
    let column = sort.column;
    // par_sort_by is stable. Reversing the comparator keeps ties in load order.
    if sort.ascending {
        rows.par_sort_by(|a, b| a.field(column).cmp(b.field(column)));
    } else {
        rows.par_sort_by(|a, b| b.field(column).cmp(a.field(column)));
    }
}

/// Filter and order the records for display.
pub fn apply(records: &[Record], filter_text: &str, sort_state: Option<SortState>) -> Vec<Record> {
    let start_time = Instant::now();
    let mut rows = filter(records, filter_text);
    if let Some(s) = sort_state {
        sort(&mut rows, s);
    }
    trace!(
        "Query \"{}\" {:?}: {} of {} rows in {}ms",
        filter_text,
        sort_state,
        rows.len(),
        records.len(),
        start_time.elapsed().as_millis()
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Record> {
        vec![
            Record::new("C1", "Resistor", "RC0402", "0402", "YAGEO"),
            Record::new("C2", "Capacitor", "CL05", "0402", "SAMSUNG"),
            Record::new("C3", "Resistor", "RC0603", "0603", "YAGEO"),
            Record::new("C4", "Diode", "1N4148", "SOD-123", "ST"),
        ]
    }

    fn codes(rows: &[Record]) -> Vec<&str> {
        rows.iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn keywords_are_trimmed_and_lowercased() {
        assert_eq!(keywords("  Res   0402\t"), vec!["res", "0402"]);
        assert!(keywords("   ").is_empty());
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let rows = apply(&sample(), "", None);
        assert_eq!(codes(&rows), vec!["C1", "C2", "C3", "C4"]);
        let rows = apply(&sample(), "   ", None);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn single_keyword_is_case_insensitive() {
        let records = vec![
            Record::new("C1", "Resistor", "", "", ""),
            Record::new("C2", "Capacitor", "", "", ""),
        ];
        assert_eq!(codes(&apply(&records, "res", None)), vec!["C1"]);
        assert_eq!(codes(&apply(&records, "c1 resistor", None)), vec!["C1"]);
        assert!(apply(&records, "zz", None).is_empty());
    }

    #[test]
    fn keywords_may_hit_different_fields() {
        let rows = apply(&sample(), "yageo 0603", None);
        assert_eq!(codes(&rows), vec!["C3"]);
    }

    #[test]
    fn multi_keyword_is_intersection_of_single_keyword_sets() {
        let records = sample();
        let both = apply(&records, "resistor 0402", None);
        let swapped = apply(&records, "0402 resistor", None);
        let a = apply(&records, "resistor", None);
        let b = apply(&records, "0402", None);
        let intersection: Vec<Record> = a.into_iter().filter(|r| b.contains(r)).collect();
        assert_eq!(both, intersection);
        assert_eq!(both, swapped);
        assert_eq!(codes(&both), vec!["C1"]);
    }

    #[test]
    fn sort_is_stable_and_reversible() {
        let records = sample();
        let asc = SortState {
            column: Column::Package,
            ascending: true,
        };
        let rows = apply(&records, "", Some(asc));
        assert_eq!(codes(&rows), vec!["C1", "C2", "C3", "C4"]);

        let desc = SortState::toggle(Some(asc), Column::Package);
        assert!(!desc.ascending);
        let rows = apply(&records, "", Some(desc));
        // Ties (C1, C2 on 0402) keep load order in both directions.
        assert_eq!(codes(&rows), vec!["C4", "C3", "C1", "C2"]);

        let back = SortState::toggle(Some(desc), Column::Package);
        assert_eq!(back, asc);
        assert_eq!(codes(&apply(&records, "", Some(back))), vec!["C1", "C2", "C3", "C4"]);
    }

    #[test]
    fn sort_is_idempotent() {
        let by_name = SortState {
            column: Column::Name,
            ascending: true,
        };
        let mut once = apply(&sample(), "", Some(by_name));
        let expected = once.clone();
        sort(&mut once, by_name);
        assert_eq!(once, expected);
        assert_eq!(codes(&expected), vec!["C2", "C4", "C1", "C3"]);
    }

    #[test]
    fn descending_reverses_distinct_values() {
        let by_code = SortState {
            column: Column::Code,
            ascending: true,
        };
        let asc = apply(&sample(), "", Some(by_code));
        let mut desc = apply(&sample(), "", Some(SortState::toggle(Some(by_code), Column::Code)));
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn toggle_to_other_column_resets_to_ascending() {
        let desc = SortState {
            column: Column::Name,
            ascending: false,
        };
        let next = SortState::toggle(Some(desc), Column::Brand);
        assert_eq!(
            next,
            SortState {
                column: Column::Brand,
                ascending: true
            }
        );
        assert!(SortState::toggle(None, Column::Code).ascending);
    }

    #[test]
    fn sort_uses_code_point_order() {
        let records = vec![
            Record::new("b", "", "", "", ""),
            Record::new("B", "", "", "", ""),
            Record::new("a", "", "", "", ""),
        ];
        let rows = apply(
            &records,
            "",
            Some(SortState {
                column: Column::Code,
                ascending: true,
            }),
        );
        assert_eq!(codes(&rows), vec!["B", "a", "b"]);
    }
}
