use ratatui::crossterm::event::KeyEvent;
use ratatui::layout::Rect;
use std::time::Instant;
use tracing::{debug, error, info, trace};

use crate::clipboard::{ClipboardSink, CopyOutcome, copy_text};
use crate::domain::{ATTRIBUTION, Message, PVConfig, PVError};
use crate::inputter::{InputResult, Inputter};
use crate::notice::{Notice, NoticeKind};
use crate::paging::{Page, paginate};
use crate::query;
use crate::record::{Column, Record};
use crate::state::{QueryEvent, QueryState};
use crate::theme::Theme;
use crate::ui::ScreenLayout;

#[derive(Debug, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    FAILED,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    FILTER,
    POPUP,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let area = Rect::new(0, 0, ui_width as u16, ui_height as u16);
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_height: ScreenLayout::new(area).body().height as usize,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }

    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width as u16, self.height as u16)
    }
}

pub struct Model {
    config: PVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    records: Vec<Record>,
    view: Vec<Record>,
    query: QueryState,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    uilayout: UILayout,
    theme: Theme,
    notice: Option<Notice>,
    load_error: Option<Notice>,
    clipboard: Box<dyn ClipboardSink>,
    input: Inputter,
    last_input: InputResult,
}

impl Model {
    pub fn init(
        config: &PVConfig,
        clipboard: Box<dyn ClipboardSink>,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let notice = config
            .show_notice
            .then(|| Notice::transient(ATTRIBUTION, NoticeKind::Info, config.notice_duration));
        Self {
            config: config.clone(),
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            records: Vec::new(),
            view: Vec::new(),
            query: QueryState::default().reduce(&QueryEvent::SetPageSize(config.page_size), 0),
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            theme: config.theme,
            notice,
            load_error: None,
            clipboard,
            input: Inputter::default(),
            last_input: InputResult::default(),
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), PVError> {
        let Some(msg) = message else {
            return Ok(());
        };

        // Data and resize events are handled in every modus.
        let msg = match msg {
            Message::Loaded(result) => {
                self.data_loaded(result);
                return Ok(());
            }
            Message::Resize(width, height) => {
                self.ui_resize(width, height);
                return Ok(());
            }
            other => other,
        };

        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MoveLeft => self.move_table_selection_left(),
                Message::MoveRight => self.move_table_selection_right(),
                Message::MoveBeginning => self.select_line(0),
                Message::MoveEnd => self.move_table_selection_end(),
                Message::NextPage => self.dispatch(QueryEvent::NextPage),
                Message::PreviousPage => self.dispatch(QueryEvent::PreviousPage),
                Message::CyclePageSize => self.dispatch(QueryEvent::CyclePageSize),
                Message::SortBy(column) => self.dispatch(QueryEvent::SortBy(column)),
                Message::SortCurrentColumn => self.sort_current_column(),
                Message::CopyCell => self.copy_table_cell(),
                Message::ClickCell { line, column } => {
                    self.select_cell(line, column);
                }
                Message::CopyAt { line, column } => {
                    if self.select_cell(line, column) {
                        self.copy_table_cell();
                    }
                }
                Message::ToggleTheme => self.toggle_theme(),
                Message::EnterFilter => self.enter_filter_mode(),
                Message::Help => self.show_help(),
                _ => (),
            },
            Modus::FILTER => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
        }
        Ok(())
    }

    // -------------------- Accessors used for rendering ---------------------- //

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::FILTER
    }

    pub fn show_popup(&self) -> bool {
        self.modus == Modus::POPUP
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    pub fn matched_records(&self) -> usize {
        self.view.len()
    }

    pub fn total_pages(&self) -> usize {
        self.query.total_pages(self.view.len())
    }

    pub fn page(&self) -> Page<'_, Record> {
        paginate(&self.view, self.query.page, self.query.page_size)
    }

    /// Rows of the current page that fit on screen, with the page index of the first one.
    pub fn visible_lines(&self) -> (usize, &[Record]) {
        let rows = self.page().rows;
        let rbegin = std::cmp::min(self.offset_row, rows.len());
        let rend = std::cmp::min(rbegin + self.uilayout.table_height, rows.len());
        (rbegin, &rows[rbegin..rend])
    }

    /// Curser position as (line on screen, column).
    pub fn curser(&self) -> (usize, Column) {
        let column = Column::from_index(self.curser_column).unwrap_or(Column::Code);
        (self.curser_row, column)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn filter_input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn layout(&self) -> &UILayout {
        &self.uilayout
    }

    pub fn source_name(&self) -> String {
        self.config
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string()
    }

    /// Notice for the status line: a live transient one first, then the load error.
    pub fn notice_at(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|n| n.is_visible_at(now))
            .or(self.load_error.as_ref())
    }

    // -------------------- State transitions ---------------------- //

    fn data_loaded(&mut self, result: Result<Vec<Record>, PVError>) {
        match result {
            Ok(records) => {
                info!("Received {} records", records.len());
                self.records = records;
                self.status = Status::READY;
                self.load_error = None;
            }
            Err(e) => {
                error!("Loading data failed: {}", e);
                self.records = Vec::new();
                self.status = Status::FAILED;
                self.load_error = Some(Notice::persistent(
                    format!("数据加载失败: {e}"),
                    NoticeKind::Failure,
                ));
            }
        }
        self.dispatch(QueryEvent::DataLoaded);
    }

    fn dispatch(&mut self, event: QueryEvent) {
        let next = self.query.reduce(&event, self.view.len());
        let requery = next.filter != self.query.filter
            || next.sort != self.query.sort
            || event == QueryEvent::DataLoaded;
        let moved = next.page != self.query.page || next.page_size != self.query.page_size;
        trace!("{:?}: {:?} -> {:?}", event, self.query, next);
        self.query = next;

        if requery {
            self.view = query::apply(&self.records, &self.query.filter, self.query.sort);
        }
        if requery || moved {
            self.curser_row = 0;
            self.offset_row = 0;
        }
    }

    fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn exit(&mut self) {
        if self.modus == Modus::POPUP {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::POPUP;
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        debug!("Theme switched to {:?}", self.theme);
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.select_line(self.offset_row + self.curser_row);
    }

    fn enter_filter_mode(&mut self) {
        trace!("Entering filter mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::FILTER;
        self.input.set(&self.query.filter);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.input != self.query.filter {
            self.dispatch(QueryEvent::SetFilter(self.last_input.input.clone()));
        }
        if self.last_input.finished {
            trace!(
                "Leaving filter mode with \"{}\" (canceled: {})",
                self.last_input.input, self.last_input.canceled
            );
            self.modus = self.previous_modus;
            self.previous_modus = Modus::FILTER;
        }
    }

    fn sort_current_column(&mut self) {
        if let Some(column) = Column::from_index(self.curser_column) {
            self.dispatch(QueryEvent::SortBy(column));
        }
    }

    fn copy_table_cell(&mut self) {
        let (rbegin, lines) = self.visible_lines();
        let Some(record) = lines.get(self.curser_row) else {
            trace!("No cell at curser {}:{}", rbegin + self.curser_row, self.curser_column);
            return;
        };
        let column = Column::from_index(self.curser_column).unwrap_or(Column::Code);
        let cell = record.field(column).to_string();

        let ttl = self.config.copy_notice_duration;
        self.notice = Some(match copy_text(self.clipboard.as_mut(), &cell) {
            CopyOutcome::Copied(text) => {
                Notice::transient(format!("已复制: {text}"), NoticeKind::Success, ttl)
            }
            CopyOutcome::Failed(_) => Notice::transient("复制失败", NoticeKind::Failure, ttl),
        });
    }

    // -------------------- Curser handling ---------------------- //

    fn page_len(&self) -> usize {
        self.page().rows.len()
    }

    /// Put the curser on the given row of the page, scrolling if needed.
    fn select_line(&mut self, idx: usize) {
        let nrows = self.page_len();
        let height = std::cmp::max(self.uilayout.table_height, 1);
        if nrows == 0 {
            self.curser_row = 0;
            self.offset_row = 0;
            return;
        }
        let idx = std::cmp::min(idx, nrows - 1);
        if idx < self.offset_row {
            self.offset_row = idx;
        } else if idx >= self.offset_row + height {
            self.offset_row = idx + 1 - height;
        }
        self.curser_row = idx - self.offset_row;
    }

    /// Select a cell addressed by screen line. Returns false if there is no row.
    fn select_cell(&mut self, line: usize, column: Column) -> bool {
        let (_, lines) = self.visible_lines();
        if line >= lines.len() {
            return false;
        }
        self.curser_row = line;
        self.curser_column = column.index();
        true
    }

    fn move_table_selection_up(&mut self, size: usize) {
        let idx = (self.offset_row + self.curser_row).saturating_sub(size);
        self.select_line(idx);
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let idx = self.offset_row + self.curser_row + size;
        self.select_line(idx);
    }

    fn move_table_selection_end(&mut self) {
        self.select_line(self.page_len().saturating_sub(1));
    }

    fn move_table_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
    }

    fn move_table_selection_right(&mut self) {
        if self.curser_column + 1 < Column::ALL.len() {
            self.curser_column += 1;
        }
    }
}
