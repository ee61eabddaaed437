use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::EntityKind;

pub enum HomeAction {
    Open(EntityKind),
    Logout,
    Quit,
}

#[derive(Clone, Copy)]
enum MenuEntry {
    Entity(EntityKind),
    Logout,
}

const MENU: [MenuEntry; 4] = [
    MenuEntry::Entity(EntityKind::Employee),
    MenuEntry::Entity(EntityKind::Client),
    MenuEntry::Entity(EntityKind::Product),
    MenuEntry::Logout,
];

// Represents the state of the landing menu
pub struct HomeState {
    list_state: ListState,
}

impl HomeState {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    pub fn next(&mut self) {
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % MENU.len());
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| if i == 0 { MENU.len() - 1 } else { i - 1 });
        self.list_state.select(Some(i));
    }

    fn selected(&self) -> MenuEntry {
        MENU[self.list_state.selected().unwrap_or(0).min(MENU.len() - 1)]
    }
}

impl Default for HomeState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key(state: &mut HomeState, key: KeyCode) -> Option<HomeAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(HomeAction::Quit),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        KeyCode::Enter => Some(match state.selected() {
            MenuEntry::Entity(kind) => HomeAction::Open(kind),
            MenuEntry::Logout => HomeAction::Logout,
        }),
        _ => None,
    }
}

pub fn render_home<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &mut HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(area);

    let items: Vec<ListItem> = MENU
        .iter()
        .map(|entry| {
            let text = match entry {
                MenuEntry::Entity(kind) => kind.plural(),
                MenuEntry::Logout => "Log out",
            };
            ListItem::new(Spans::from(vec![Span::raw(text)]))
        })
        .collect();

    let menu = List::new(items)
        .block(Block::default().title("Home").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(menu, chunks[0], &mut state.list_state);

    let help = Paragraph::new("<Enter> Open | <Up/Down> Navigate | <Q> Quit")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(help, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_wraps_and_opens_entities() {
        let mut state = HomeState::new();
        assert!(matches!(handle_key(&mut state, KeyCode::Enter), Some(HomeAction::Open(EntityKind::Employee))));

        handle_key(&mut state, KeyCode::Up);
        assert!(matches!(handle_key(&mut state, KeyCode::Enter), Some(HomeAction::Logout)));

        handle_key(&mut state, KeyCode::Down);
        handle_key(&mut state, KeyCode::Down);
        assert!(matches!(handle_key(&mut state, KeyCode::Enter), Some(HomeAction::Open(EntityKind::Client))));
    }
}
