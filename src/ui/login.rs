use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::models::fields::{FieldKind, FieldSpec, Rules};
use crate::ui::components::centered_rect;
use crate::ui::components::field_input::FieldInput;

static FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("username", "Username").rules(Rules::REQUIRED),
    FieldSpec::new("password", "Password")
        .kind(FieldKind::Secret)
        .rules(Rules::REQUIRED.min(6)),
];

pub enum LoginAction {
    Submit { username: String, password: String },
    Quit,
}

pub struct LoginState {
    inputs: [FieldInput; 2],
    errors: [Option<String>; 2],
    current: usize,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            inputs: [FieldInput::for_spec(&FIELDS[0]), FieldInput::for_spec(&FIELDS[1])],
            errors: [None, None],
            current: 0,
        }
    }

    pub fn switch_field(&mut self) {
        self.current = (self.current + 1) % FIELDS.len();
    }

    pub fn clear_password(&mut self) {
        self.inputs[1].clear();
        self.current = 1;
    }

    pub fn error(&self, index: usize) -> Option<&str> {
        self.errors.get(index).and_then(|e| e.as_deref())
    }

    fn validate(&mut self) -> bool {
        let mut valid = true;
        for (i, spec) in FIELDS.iter().enumerate() {
            self.errors[i] = spec.validate(&self.inputs[i].value(), true).err().map(|e| e.message);
            valid &= self.errors[i].is_none();
        }
        valid
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn handle_key(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    match key {
        KeyCode::Esc => return Some(LoginAction::Quit),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => state.switch_field(),
        KeyCode::Enter => {
            if state.validate() {
                return Some(LoginAction::Submit {
                    username: state.inputs[0].value().trim().to_string(),
                    password: state.inputs[1].value(),
                });
            }
        }
        _ => {
            if state.inputs[state.current].handle_key(key) {
                state.errors[state.current] = None;
            }
        }
    }
    None
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &LoginState) {
    let popup = centered_rect(60, 60, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(popup);

    frame.render_widget(Block::default().title("Login").borders(Borders::ALL), popup);

    for (i, spec) in FIELDS.iter().enumerate() {
        let style = if i == state.current {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let mut lines = vec![Spans::from(vec![
            Span::styled(format!("{}: ", spec.label), style),
            Span::styled(
                format!("{}{}", state.inputs[i].display(), if i == state.current { "|" } else { "" }),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ])];
        if let Some(error) = &state.errors[i] {
            lines.push(Spans::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
        }
        frame.render_widget(Paragraph::new(lines), chunks[i]);
    }

    let help = Paragraph::new("Enter - Sign in | Tab - Switch field | Esc - Quit").style(Style::default().fg(Color::Gray));
    frame.render_widget(help, chunks[2]);
}
