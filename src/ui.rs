use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Cell, Clear, Paragraph, Row, Table},
};
use std::time::Instant;

use crate::domain::{FILTER_PLACEHOLDER, HELP_TEXT, TITLE};
use crate::model::{Model, Status};
use crate::notice::NoticeKind;
use crate::record::Column;
use crate::theme::Palette;

pub const TITLE_HEIGHT: u16 = 1;
pub const FILTER_HEIGHT: u16 = 3;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const TABLE_HEADER_HEIGHT: u16 = 1;
pub const COLUMN_SPACING: u16 = 1;

const COLUMN_WIDTHS: [Constraint; 5] = [
    Constraint::Percentage(14),
    Constraint::Percentage(22),
    Constraint::Percentage(28),
    Constraint::Percentage(16),
    Constraint::Percentage(20),
];

/// Screen regions. Shared between rendering and mouse hit testing.
pub struct ScreenLayout {
    pub title: Rect,
    pub filter: Rect,
    pub table: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let [title, filter, table, status] = Layout::vertical([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(FILTER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(area);
        ScreenLayout {
            title,
            filter,
            table,
            status,
        }
    }

    pub fn table_inner(&self) -> Rect {
        Block::bordered().inner(self.table)
    }

    /// Table area below the header row.
    pub fn body(&self) -> Rect {
        let inner = self.table_inner();
        let header = std::cmp::min(TABLE_HEADER_HEIGHT, inner.height);
        Rect::new(inner.x, inner.y + header, inner.width, inner.height - header)
    }

    pub fn columns(&self) -> [Rect; 5] {
        Layout::horizontal(COLUMN_WIDTHS)
            .flex(Flex::Start)
            .spacing(COLUMN_SPACING)
            .areas(self.table_inner())
    }
}

#[derive(Debug, PartialEq)]
pub enum Hit {
    Header(Column),
    Cell { line: usize, column: Column },
}

pub fn hit_test(area: Rect, x: u16, y: u16) -> Option<Hit> {
    let layout = ScreenLayout::new(area);
    let inner = layout.table_inner();
    if y < inner.y || y >= inner.y + inner.height {
        return None;
    }
    let column = layout
        .columns()
        .iter()
        .position(|c| x >= c.x && x < c.x + c.width)
        .and_then(Column::from_index)?;
    if y < inner.y + TABLE_HEADER_HEIGHT {
        Some(Hit::Header(column))
    } else {
        let line = (y - inner.y - TABLE_HEADER_HEIGHT) as usize;
        Some(Hit::Cell { line, column })
    }
}

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let palette = model.theme().palette();
        let area = frame.area();
        let layout = ScreenLayout::new(area);

        frame.render_widget(
            Block::new().style(Style::new().fg(palette.fg).bg(palette.bg)),
            area,
        );
        self.render_title(model, &palette, layout.title, frame);
        self.render_filter(model, &palette, layout.filter, frame);
        self.render_table(model, &palette, &layout, frame);
        self.render_statusline(model, &palette, layout.status, frame);

        if model.show_popup() {
            self.render_popup(&palette, area, frame);
        }
    }

    fn render_title(&self, model: &Model, palette: &Palette, area: Rect, frame: &mut Frame) {
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(24)]).areas(area);
        let title = Line::from(vec![
            Span::styled(format!(" {TITLE} "), Style::new().fg(palette.header).bold()),
            Span::styled(model.source_name(), Style::new().fg(palette.dim)),
        ]);
        frame.render_widget(Paragraph::new(title), left);
        let theme = Line::from(vec![
            Span::styled("<t> ", Style::new().fg(palette.dim)),
            Span::styled(model.theme().label(), Style::new().fg(palette.accent)),
            " ".into(),
        ]);
        frame.render_widget(Paragraph::new(theme).alignment(Alignment::Right), right);
    }

    fn render_filter(&self, model: &Model, palette: &Palette, area: Rect, frame: &mut Frame) {
        let query = model.query();
        let editing = model.raw_keyevents();
        let border = if editing { palette.accent } else { palette.dim };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(border))
            .title(" 筛选 ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let badge = format!(" 共 {} / 筛 {} ", model.total_records(), model.matched_records());
        let pager = format!(" {} / {} ", query.page, model.total_pages());
        let size = format!(" {} ", query.page_size.label());
        let [input_area, badge_area, pager_area, size_area] = Layout::horizontal([
            Constraint::Min(10),
            Constraint::Length(Span::raw(&badge).width() as u16),
            Constraint::Length(Span::raw(&pager).width() as u16 + 4),
            Constraint::Length(Span::raw(&size).width() as u16),
        ])
        .spacing(1)
        .areas(inner);

        let text = if editing {
            model.filter_input().input.clone()
        } else {
            query.filter.clone()
        };
        let input = if text.is_empty() && !editing {
            Paragraph::new(Span::styled(FILTER_PLACEHOLDER, Style::new().fg(palette.dim)))
        } else {
            Paragraph::new(text.as_str())
        };
        frame.render_widget(input, input_area);
        if editing {
            let input = model.filter_input();
            let before: String = input.input.chars().take(input.curser_pos).collect();
            let x = input_area.x + Span::raw(before).width() as u16;
            frame.set_cursor_position((
                std::cmp::min(x, input_area.right().saturating_sub(1)),
                input_area.y,
            ));
        }

        frame.render_widget(
            Paragraph::new(Span::styled(
                badge,
                Style::new().fg(palette.cursor_fg).bg(palette.accent),
            )),
            badge_area,
        );

        let enabled = Style::new().fg(palette.accent).bold();
        let disabled = Style::new().fg(palette.dim);
        let matched = model.matched_records();
        let pager_line = Line::from(vec![
            Span::styled("◀", if query.can_go_previous() { enabled } else { disabled }),
            Span::raw(pager),
            Span::styled("▶", if query.can_go_next(matched) { enabled } else { disabled }),
        ]);
        frame.render_widget(Paragraph::new(pager_line).alignment(Alignment::Center), pager_area);
        frame.render_widget(
            Paragraph::new(Span::styled(size, Style::new().fg(palette.header))),
            size_area,
        );
    }

    fn render_table(&self, model: &Model, palette: &Palette, layout: &ScreenLayout, frame: &mut Frame) {
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(palette.dim));
        let sort = model.query().sort;

        let header = Row::new(Column::ALL.iter().map(|&column| {
            let arrow = match sort {
                Some(s) if s.column == column => {
                    if s.ascending {
                        " ↑"
                    } else {
                        " ↓"
                    }
                }
                _ => "",
            };
            Cell::from(format!("{}{}", column.label(), arrow))
        }))
        .style(Style::new().fg(palette.header).add_modifier(Modifier::BOLD));

        let (rbegin, lines) = model.visible_lines();
        let (curser_line, curser_column) = model.curser();
        let rows = lines.iter().enumerate().map(|(line, record)| {
            let stripe = if (rbegin + line) % 2 == 1 {
                Style::new().bg(palette.stripe)
            } else {
                Style::new()
            };
            Row::new(Column::ALL.iter().map(|&column| {
                let cell = Cell::from(record.field(column).to_string());
                if line == curser_line && column == curser_column && !model.raw_keyevents() {
                    cell.style(Style::new().fg(palette.cursor_fg).bg(palette.cursor_bg))
                } else {
                    cell
                }
            }))
            .style(stripe)
        });

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .block(block);
        frame.render_widget(table, layout.table);

        if lines.is_empty() {
            let message = match model.status {
                Status::LOADING => "加载中 ...",
                Status::FAILED => "数据加载失败",
                _ => "没有匹配的记录",
            };
            frame.render_widget(
                Paragraph::new(Span::styled(message, Style::new().fg(palette.dim)))
                    .alignment(Alignment::Center),
                layout.body(),
            );
        }
    }

    fn render_statusline(&self, model: &Model, palette: &Palette, area: Rect, frame: &mut Frame) {
        let line = match model.notice_at(Instant::now()) {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Info => palette.accent,
                    NoticeKind::Success => palette.success,
                    NoticeKind::Failure => palette.failure,
                };
                Line::from(Span::styled(format!(" {}", notice.message), Style::new().fg(color)))
            }
            None if model.raw_keyevents() => Line::from(vec![
                " Keep ".into(),
                "<Enter>".fg(palette.accent).bold(),
                " Clear ".into(),
                "<Esc>".fg(palette.accent).bold(),
            ]),
            None => Line::from(vec![
                " Filter ".into(),
                "</>".fg(palette.accent).bold(),
                " Sort ".into(),
                "<1-5>".fg(palette.accent).bold(),
                " Page ".into(),
                "<n/p>".fg(palette.accent).bold(),
                " Size ".into(),
                "<z>".fg(palette.accent).bold(),
                " Copy ".into(),
                "<y>".fg(palette.accent).bold(),
                " Help ".into(),
                "<?>".fg(palette.accent).bold(),
                " Quit ".into(),
                "<q>".fg(palette.accent).bold(),
            ]),
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_popup(&self, palette: &Palette, area: Rect, frame: &mut Frame) {
        let popup = centered_rect(area, 70, 70);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(palette.accent))
            .title(" Help ")
            .title_bottom(Line::from(" <Esc> close ").centered())
            .style(Style::new().fg(palette.fg).bg(palette.bg));
        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(Text::from(HELP_TEXT)).block(block), popup);
    }
}

fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}
