use crate::paging::{PageSize, total_pages};
use crate::query::SortState;
use crate::record::Column;

/// Transient query settings of the table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub filter: String,
    pub sort: Option<SortState>,
    pub page: usize,
    pub page_size: PageSize,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            filter: String::new(),
            sort: None,
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryEvent {
    SetFilter(String),
    SortBy(Column),
    NextPage,
    PreviousPage,
    SetPageSize(PageSize),
    CyclePageSize,
    DataLoaded,
}

impl QueryState {
    /// Compute the next state. `matched` is the number of rows the current
    /// filter yields, needed to bound page navigation.
    pub fn reduce(&self, event: &QueryEvent, matched: usize) -> QueryState {
        let mut next = self.clone();
        match event {
            QueryEvent::SetFilter(text) => {
                next.filter = text.clone();
                next.page = 1;
            }
            QueryEvent::SortBy(column) => {
                next.sort = Some(SortState::toggle(self.sort, *column));
                next.page = 1;
            }
            QueryEvent::NextPage => {
                if self.page_size != PageSize::All && self.page < self.total_pages(matched) {
                    next.page = self.page + 1;
                }
            }
            QueryEvent::PreviousPage => {
                if self.page_size != PageSize::All && self.page > 1 {
                    next.page = self.page - 1;
                }
            }
            QueryEvent::SetPageSize(size) => {
                next.page_size = *size;
                next.page = 1;
            }
            QueryEvent::CyclePageSize => {
                next.page_size = self.page_size.next();
                next.page = 1;
            }
            QueryEvent::DataLoaded => next.page = 1,
        }
        next
    }

    pub fn total_pages(&self, matched: usize) -> usize {
        total_pages(matched, self.page_size)
    }

    pub fn can_go_next(&self, matched: usize) -> bool {
        self.page_size != PageSize::All && self.page < self.total_pages(matched)
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_size != PageSize::All && self.page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_page(page: usize) -> QueryState {
        QueryState {
            page,
            ..Default::default()
        }
    }

    #[test]
    fn filter_sort_and_page_size_reset_page() {
        let state = on_page(3);
        let events = [
            QueryEvent::SetFilter("res".into()),
            QueryEvent::SortBy(Column::Name),
            QueryEvent::SetPageSize(PageSize::Rows(60)),
            QueryEvent::CyclePageSize,
            QueryEvent::DataLoaded,
        ];
        for event in events {
            assert_eq!(state.reduce(&event, 100).page, 1, "{event:?}");
        }
    }

    #[test]
    fn sort_by_same_column_flips_direction() {
        let state = QueryState::default();
        let first = state.reduce(&QueryEvent::SortBy(Column::Code), 0);
        assert_eq!(first.sort.map(|s| s.ascending), Some(true));
        let second = first.reduce(&QueryEvent::SortBy(Column::Code), 0);
        assert_eq!(second.sort.map(|s| s.ascending), Some(false));
        let other = second.reduce(&QueryEvent::SortBy(Column::Brand), 0);
        assert_eq!(
            other.sort,
            Some(SortState {
                column: Column::Brand,
                ascending: true
            })
        );
    }

    #[test]
    fn next_is_noop_on_last_page() {
        let state = QueryState::default().reduce(&QueryEvent::SetPageSize(PageSize::Rows(1)), 0);
        let second = state.reduce(&QueryEvent::NextPage, 2);
        assert_eq!(second.page, 2);
        assert_eq!(second.reduce(&QueryEvent::NextPage, 2), second);
        assert!(!second.can_go_next(2));
    }

    #[test]
    fn previous_is_noop_on_first_page() {
        let state = QueryState::default();
        assert_eq!(state.reduce(&QueryEvent::PreviousPage, 100), state);
        assert!(!state.can_go_previous());
        let back = on_page(2).reduce(&QueryEvent::PreviousPage, 100);
        assert_eq!(back.page, 1);
    }

    #[test]
    fn navigation_disabled_when_showing_all() {
        let state = QueryState::default().reduce(&QueryEvent::SetPageSize(PageSize::All), 0);
        assert_eq!(state.reduce(&QueryEvent::NextPage, 1000), state);
        assert_eq!(state.reduce(&QueryEvent::PreviousPage, 1000), state);
        assert_eq!(state.total_pages(1000), 1);
    }

    #[test]
    fn cycle_page_size_wraps() {
        let mut state = QueryState::default();
        for expected in [PageSize::Rows(30), PageSize::Rows(60), PageSize::All, PageSize::Rows(15)] {
            state = state.reduce(&QueryEvent::CyclePageSize, 0);
            assert_eq!(state.page_size, expected);
        }
    }
}
