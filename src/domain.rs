use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use crate::paging::PageSize;
use crate::record::{Column, Record};
use crate::theme::Theme;

pub const TITLE: &str = "基础元器件库查询";
pub const ATTRIBUTION: &str = "原始数据来源于：https://www.jlc-smt.com/lcsc/basic";
pub const FILTER_PLACEHOLDER: &str = "搜索元器件（空格分隔多条件）";

pub const HELP_TEXT: &str = "\
 /, f          Edit filter (Enter keep, Esc clear)
 Arrows, hjkl  Move cell cursor
 g, G          First / last row of page
 1 - 5         Sort by column (again to reverse)
 s             Sort by cursor column
 n, PageDown   Next page
 p, PageUp     Previous page
 z             Cycle page size (15/30/60/all)
 y, Enter      Copy cell to clipboard
 t             Toggle light / dark theme
 Mouse         Click header to sort, double click cell to copy
 ?             Help
 q             Quit";

#[derive(Debug)]
pub enum PVError {
    IoError(Error),
    PolarsError(PolarsError),
    SheetError(calamine::Error),
    ClipboardFailed(String),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
    UnknownFileType,
    NoSheet,
}

impl fmt::Display for PVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PVError::IoError(e) => write!(f, "io error: {e}"),
            PVError::PolarsError(e) => write!(f, "failed to parse table: {e}"),
            PVError::SheetError(e) => write!(f, "failed to parse workbook: {e}"),
            PVError::ClipboardFailed(e) => write!(f, "clipboard unavailable: {e}"),
            PVError::LoadingFailed(e) => write!(f, "loading failed: {e}"),
            PVError::FileNotFound => write!(f, "file not found"),
            PVError::PermissionDenied => write!(f, "permission denied"),
            PVError::UnknownFileType => write!(f, "unknown file type"),
            PVError::NoSheet => write!(f, "workbook has no sheet"),
        }
    }
}

impl std::error::Error for PVError {}

impl From<Error> for PVError {
    fn from(err: Error) -> Self {
        PVError::IoError(err)
    }
}

impl From<PolarsError> for PVError {
    fn from(err: PolarsError) -> Self {
        PVError::PolarsError(err)
    }
}

impl From<calamine::Error> for PVError {
    fn from(err: calamine::Error) -> Self {
        PVError::SheetError(err)
    }
}

impl From<arboard::Error> for PVError {
    fn from(err: arboard::Error) -> Self {
        PVError::ClipboardFailed(err.to_string())
    }
}

#[derive(Debug)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    NextPage,
    PreviousPage,
    CyclePageSize,
    SortBy(Column),
    SortCurrentColumn,
    CopyCell,
    // Mouse interaction, `line` counts from the first visible body row.
    ClickCell { line: usize, column: Column },
    CopyAt { line: usize, column: Column },
    ToggleTheme,
    EnterFilter,
    Help,
    Exit,
    RawKey(KeyEvent),
    Resize(usize, usize),
    Loaded(Result<Vec<Record>, PVError>),
}

#[derive(Debug, Clone, Setters)]
pub struct PVConfig {
    pub path: PathBuf,
    pub event_poll_time: u64,
    pub page_size: PageSize,
    pub theme: Theme,
    pub show_notice: bool,
    pub notice_duration: Duration,
    pub copy_notice_duration: Duration,
    pub double_click_window: Duration,
}

impl Default for PVConfig {
    fn default() -> Self {
        PVConfig {
            path: PathBuf::from("data.xlsx"),
            event_poll_time: 100,
            page_size: PageSize::default(),
            theme: Theme::Dark,
            show_notice: true,
            notice_duration: Duration::from_millis(4000),
            copy_notice_duration: Duration::from_millis(1500),
            double_click_window: Duration::from_millis(500),
        }
    }
}
