use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::models::{ColumnTier, Entity, FieldSpec};
use crate::ui::components::centered_rect;
use crate::ui::components::field_input::display_value;

/// A delete waiting for the user's explicit confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: i32,
    pub name: String,
    /// Confirmed and sent; waiting for the backend.
    pub in_flight: bool,
}

// Represents the state of an entity table screen
pub struct EntityListState<E: Entity> {
    records: Vec<E>,
    table_state: TableState,
    loading: bool,
    load_failed: bool,
    pending_delete: Option<PendingDelete>,
}

pub enum ListAction {
    Back,
    New,
    View(i32),
    Edit(i32),
    /// Only produced after the confirmation prompt was accepted.
    Delete(i32),
}

impl<E: Entity> EntityListState<E> {
    pub fn loading() -> Self {
        Self {
            records: Vec::new(),
            table_state: TableState::default(),
            loading: true,
            load_failed: false,
            pending_delete: None,
        }
    }

    /// Replaces the rows with a fresh fetch, keeping the selection in range.
    pub fn set_records(&mut self, records: Vec<E>) {
        self.records = records;
        self.loading = false;
        self.load_failed = false;
        let selected = match (self.table_state.selected(), self.records.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.table_state.select(selected);
    }

    /// The fetch failed: render an empty table.
    pub fn set_failed(&mut self) {
        self.records.clear();
        self.loading = false;
        self.load_failed = true;
        self.table_state.select(None);
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub fn next(&mut self) {
        if self.records.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= self.records.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.records.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.records.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_id(&mut self, id: i32) {
        if let Some(i) = self.records.iter().position(|r| r.id() == Some(id)) {
            self.table_state.select(Some(i));
        }
    }

    pub fn selected(&self) -> Option<&E> {
        self.table_state.selected().and_then(|i| self.records.get(i))
    }

    pub fn selected_id(&self) -> Option<i32> {
        self.selected().and_then(|record| record.id())
    }

    /// Raises the confirmation prompt for the selected record. Does nothing
    /// while a fetch is pending.
    pub fn request_delete(&mut self) {
        if self.loading {
            return;
        }
        let pending = self.selected().and_then(|record| {
            record.id().map(|id| PendingDelete {
                id,
                name: record.display_name().to_string(),
                in_flight: false,
            })
        });
        if pending.is_some() {
            self.pending_delete = pending;
        }
    }

    pub fn cancel_delete(&mut self) {
        if self.pending_delete.as_ref().is_some_and(|p| !p.in_flight) {
            self.pending_delete = None;
        }
    }

    fn confirm_delete(&mut self) -> Option<i32> {
        let pending = self.pending_delete.as_mut()?;
        if pending.in_flight {
            return None;
        }
        pending.in_flight = true;
        Some(pending.id)
    }

    /// The backend answered; the prompt goes away either way.
    pub fn delete_finished(&mut self) {
        self.pending_delete = None;
    }

    /// The record is gone on the backend: drop its row and wait for the re-fetch.
    pub fn delete_succeeded(&mut self, id: i32) {
        self.pending_delete = None;
        self.records.retain(|record| record.id() != Some(id));
        self.loading = true;
        let selected = match (self.table_state.selected(), self.records.len()) {
            (_, 0) => None,
            (Some(i), len) => Some(i.min(len - 1)),
            (None, _) => Some(0),
        };
        self.table_state.select(selected);
    }
}

/// Columns shown at a given terminal width. Secondary columns drop out below `narrow_width`.
pub fn visible_columns(fields: &'static [FieldSpec], width: u16, narrow_width: u16) -> Vec<&'static FieldSpec> {
    fields
        .iter()
        .filter(|spec| match spec.tier {
            ColumnTier::Primary => true,
            ColumnTier::Secondary => width >= narrow_width,
            ColumnTier::Hidden => false,
        })
        .collect()
}

pub fn handle_key<E: Entity>(state: &mut EntityListState<E>, key: KeyCode) -> Option<ListAction> {
    if state.pending_delete.is_some() {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => return state.confirm_delete().map(ListAction::Delete),
            KeyCode::Char('n') | KeyCode::Esc => state.cancel_delete(),
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ListAction::Back),
        KeyCode::Char('n') => return Some(ListAction::New),
        KeyCode::Char('v') | KeyCode::Enter => return state.selected_id().map(ListAction::View),
        KeyCode::Char('e') => return state.selected_id().map(ListAction::Edit),
        KeyCode::Char('d') => state.request_delete(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

pub fn render_entity_list<B: Backend, E: Entity>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut EntityListState<E>,
    narrow_width: u16,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(area);

    let columns = visible_columns(E::fields(), area.width, narrow_width);

    let mut header = vec![Cell::from("ID")];
    header.extend(columns.iter().map(|spec| Cell::from(spec.label)));
    header.push(Cell::from("Actions"));
    let header = Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)).bottom_margin(1);

    let rows: Vec<Row> = state
        .records
        .iter()
        .map(|record| {
            let mut cells = vec![Cell::from(record.id().map(|id| id.to_string()).unwrap_or_default())];
            cells.extend(
                columns
                    .iter()
                    .map(|spec| Cell::from(display_value(spec, &record.value(spec.key)))),
            );
            cells.push(Cell::from("v e d"));
            Row::new(cells)
        })
        .collect();

    let share = (90 / (columns.len() as u16 + 1)).max(5);
    let mut widths = vec![Constraint::Length(6)];
    widths.extend(columns.iter().map(|_| Constraint::Percentage(share)));
    widths.push(Constraint::Length(7));

    let title = if state.loading {
        format!("{} (loading...)", E::KIND.plural())
    } else if state.load_failed {
        format!("{} (could not load records)", E::KIND.plural())
    } else {
        E::KIND.plural().to_string()
    };

    let table = Table::new(rows)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL))
        .widths(&widths)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, chunks[0], &mut state.table_state);

    let label = E::KIND.label();
    let buttons_text = if state.selected().is_some() {
        format!("<N> New {label} | <V> View | <E> Edit | <D> Delete | <Esc> Back")
    } else {
        format!("<N> New {label} | <Esc> Back")
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[1]);

    if let Some(pending) = &state.pending_delete {
        render_delete_confirmation(frame, area, label, pending);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect, label: &str, pending: &PendingDelete) {
    let popup_area = centered_rect(50, 25, size);

    let controls = if pending.in_flight { "Deleting..." } else { "<Y> Delete  <N> Cancel" };

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(vec![
            Span::raw(format!("Are you sure you want to delete {} ", label.to_lowercase())),
            Span::styled(pending.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("?"),
        ]),
        Spans::from(""),
        Spans::from(controls),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}
