use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing::trace;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::domain::{Message, PVConfig, PVError};
use crate::model::Model;
use crate::record::Column;
use crate::ui::{Hit, hit_test};

pub struct Controller {
    event_poll_time: u64,
    double_click_window: Duration,
    receiver: Option<Receiver<Message>>,
    last_click: Option<(Hit, Instant)>,
}

impl Controller {
    pub fn new(cfg: &PVConfig, receiver: Receiver<Message>) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
            double_click_window: cfg.double_click_window,
            receiver: Some(receiver),
            last_click: None,
        }
    }

    pub fn handle_event(&mut self, model: &Model) -> Result<Option<Message>, PVError> {
        if let Some(message) = self.poll_loader() {
            return Ok(Some(message));
        }

        if event::poll(Duration::from_millis(self.event_poll_time))? {
            let message = match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    if model.raw_keyevents() {
                        Some(Message::RawKey(key))
                    } else {
                        self.handle_key(key)
                    }
                }
                Event::Mouse(mouse) if !model.raw_keyevents() && !model.show_popup() => {
                    self.handle_mouse(mouse, model, Instant::now())
                }
                Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
                _ => None,
            };
            return Ok(message);
        }
        Ok(None)
    }

    fn poll_loader(&mut self) -> Option<Message> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                trace!("Loader channel closed");
                self.receiver = None;
                None
            }
        }
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::Left, _) | (KeyCode::Char('h'), _) => Some(Message::MoveLeft),
            (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Some(Message::MoveRight),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::PageDown, _) | (KeyCode::Char('n'), _) => Some(Message::NextPage),
            (KeyCode::PageUp, _) | (KeyCode::Char('p'), _) => Some(Message::PreviousPage),
            (KeyCode::Char('z'), _) => Some(Message::CyclePageSize),
            (KeyCode::Char('s'), _) => Some(Message::SortCurrentColumn),
            (KeyCode::Char(c @ '1'..='5'), _) => c
                .to_digit(10)
                .and_then(|d| Column::from_index(d as usize - 1))
                .map(Message::SortBy),
            (KeyCode::Char('y'), _) | (KeyCode::Enter, _) => Some(Message::CopyCell),
            (KeyCode::Char('t'), _) => Some(Message::ToggleTheme),
            (KeyCode::Char('/'), _) | (KeyCode::Char('f'), _) => Some(Message::EnterFilter),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    /// Header clicks sort, a second click on the same cell within the
    /// double click window copies it.
    fn handle_mouse(&mut self, mouse: MouseEvent, model: &Model, now: Instant) -> Option<Message> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let hit = hit_test(model.layout().area(), mouse.column, mouse.row);
        trace!("Mouse down at {}:{} => {:?}", mouse.column, mouse.row, hit);
        match hit {
            Some(Hit::Header(column)) => {
                self.last_click = None;
                Some(Message::SortBy(column))
            }
            Some(Hit::Cell { line, column }) => {
                let double = matches!(
                    &self.last_click,
                    Some((Hit::Cell { line: l, column: c }, at))
                        if *l == line && *c == column
                            && now.duration_since(*at) <= self.double_click_window
                );
                if double {
                    self.last_click = None;
                    Some(Message::CopyAt { line, column })
                } else {
                    self.last_click = Some((Hit::Cell { line, column }, now));
                    Some(Message::ClickCell { line, column })
                }
            }
            None => {
                self.last_click = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::testing::MemoryClipboard;
    use crate::ui::ScreenLayout;
    use ratatui::crossterm::event::KeyEvent;
    use std::sync::mpsc;

    fn setup() -> (Controller, Model, mpsc::Sender<Message>) {
        let config = PVConfig::default();
        let (tx, rx) = mpsc::channel();
        let controller = Controller::new(&config, rx);
        let model = Model::init(&config, Box::new(MemoryClipboard::default()), 100, 30);
        (controller, model, tx)
    }

    fn left_down(x: u16, y: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: x,
            row: y,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn maps_keys() {
        let (controller, _, _) = setup();
        let key = |c| controller.handle_key(KeyEvent::new(c, KeyModifiers::NONE));
        assert!(matches!(key(KeyCode::Char('q')), Some(Message::Quit)));
        assert!(matches!(key(KeyCode::Char('3')), Some(Message::SortBy(Column::Model))));
        assert!(matches!(key(KeyCode::Char('5')), Some(Message::SortBy(Column::Brand))));
        assert!(key(KeyCode::Char('6')).is_none());
        assert!(matches!(key(KeyCode::Char('/')), Some(Message::EnterFilter)));
        assert!(matches!(key(KeyCode::PageDown), Some(Message::NextPage)));
        assert!(matches!(key(KeyCode::Char('y')), Some(Message::CopyCell)));
    }

    #[test]
    fn loader_result_is_forwarded_once() {
        let (mut controller, _, tx) = setup();
        tx.send(Message::Loaded(Ok(Vec::new()))).unwrap();
        drop(tx);
        assert!(matches!(controller.poll_loader(), Some(Message::Loaded(Ok(_)))));
        assert!(controller.poll_loader().is_none());
        assert!(controller.receiver.is_none());
    }

    #[test]
    fn double_click_copies_single_click_selects() {
        let (mut controller, model, _) = setup();
        let layout = ScreenLayout::new(model.layout().area());
        let body = layout.body();
        let x = layout.columns()[1].x;
        let t0 = Instant::now();

        let first = controller.handle_mouse(left_down(x, body.y + 1), &model, t0);
        assert!(matches!(
            first,
            Some(Message::ClickCell { line: 1, column: Column::Name })
        ));
        let second =
            controller.handle_mouse(left_down(x, body.y + 1), &model, t0 + Duration::from_millis(200));
        assert!(matches!(
            second,
            Some(Message::CopyAt { line: 1, column: Column::Name })
        ));

        // Too slow for a double click.
        controller.handle_mouse(left_down(x, body.y), &model, t0);
        let late = controller.handle_mouse(left_down(x, body.y), &model, t0 + Duration::from_secs(2));
        assert!(matches!(late, Some(Message::ClickCell { .. })));
    }

    #[test]
    fn header_click_sorts() {
        let (mut controller, model, _) = setup();
        let layout = ScreenLayout::new(model.layout().area());
        let header_y = layout.table_inner().y;
        let x = layout.columns()[3].x + 1;
        let message = controller.handle_mouse(left_down(x, header_y), &model, Instant::now());
        assert!(matches!(message, Some(Message::SortBy(Column::Package))));
    }
}
