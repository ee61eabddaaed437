use std::marker::PhantomData;

use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::error::ValidationError;
use crate::models::fields::validate_all;
use crate::models::{Entity, FormValues};
use crate::ui::components::field_input::FieldInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i32),
    /// Every field disabled, no save.
    View(i32),
}

impl FormMode {
    pub fn id(self) -> Option<i32> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) | FormMode::View(id) => Some(id),
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, FormMode::View(_))
    }
}

pub enum FormAction<E> {
    Cancel,
    Submit(E),
}

/// Create/edit/view form for any entity, driven by its field descriptor.
pub struct EntityFormState<E: Entity> {
    mode: FormMode,
    inputs: Vec<FieldInput>,
    errors: Vec<Option<String>>,
    current: usize,
    editing: bool,
    loading: bool,
    submitting: bool,
    _entity: PhantomData<E>,
}

impl<E: Entity> EntityFormState<E> {
    /// Forms with an id start in the loading state until `populate` is called.
    pub fn new(mode: FormMode) -> Self {
        let fields = E::fields();
        Self {
            mode,
            inputs: fields.iter().map(FieldInput::for_spec).collect(),
            errors: vec![None; fields.len()],
            current: 0,
            editing: false,
            loading: mode.id().is_some(),
            submitting: false,
            _entity: PhantomData,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[cfg(test)]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn title(&self) -> String {
        let label = E::KIND.label();
        match self.mode {
            FormMode::Create => format!("New {label}"),
            FormMode::Edit(id) => format!("Edit {label}: {id}"),
            FormMode::View(id) => format!("View {label}: {id}"),
        }
    }

    /// Fills every field from a fetched record.
    pub fn populate(&mut self, entity: &E) {
        for (spec, input) in E::fields().iter().zip(self.inputs.iter_mut()) {
            input.set_value(&entity.value(spec.key));
        }
        self.errors.iter_mut().for_each(|e| *e = None);
        self.loading = false;
    }

    pub fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        for (spec, input) in E::fields().iter().zip(&self.inputs) {
            values.insert(spec.key, input.value());
        }
        values
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.inputs[i].value())
    }

    pub fn display(&self, key: &str) -> Option<String> {
        self.position(key).map(|i| self.inputs[i].display())
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.position(key).and_then(|i| self.errors[i].as_deref())
    }

    fn position(&self, key: &str) -> Option<usize> {
        E::fields().iter().position(|spec| spec.key == key)
    }

    pub fn focus(&mut self, key: &str) {
        if let Some(i) = self.position(key) {
            self.current = i;
        }
    }

    pub fn next_field(&mut self) {
        self.current = (self.current + 1) % self.inputs.len();
    }

    pub fn previous_field(&mut self) {
        self.current = if self.current == 0 { self.inputs.len() - 1 } else { self.current - 1 };
    }

    fn can_edit(&self) -> bool {
        !self.mode.is_read_only() && !self.loading && !self.submitting
    }

    pub fn toggle_editing(&mut self) {
        if self.editing {
            self.editing = false;
        } else if self.can_edit() {
            self.editing = true;
        }
    }

    /// Routes a keystroke to the focused field. Ignored in view mode.
    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing || !self.can_edit() {
            return;
        }
        if self.inputs[self.current].handle_key(key) {
            self.errors[self.current] = None;
        }
    }

    /// Runs the field rules; on success builds the record to send.
    pub fn validate(&mut self) -> Result<E, Vec<ValidationError>> {
        let values = self.values();
        let creating = self.mode.id().is_none();

        self.errors.iter_mut().for_each(|e| *e = None);
        if let Err(errors) = validate_all(E::fields(), &values, creating) {
            for error in &errors {
                if let Some(i) = self.position(error.field) {
                    self.errors[i] = Some(error.message.clone());
                }
            }
            if let Some(first) = errors.first() {
                self.focus(first.field);
            }
            return Err(errors);
        }

        Ok(E::from_values(self.mode.id(), &values))
    }

    /// The save failed; entered values stay as they are.
    pub fn submit_failed(&mut self) {
        self.submitting = false;
    }
}

pub fn handle_key<E: Entity>(state: &mut EntityFormState<E>, key: KeyCode) -> Option<FormAction<E>> {
    if state.editing {
        match key {
            KeyCode::Esc | KeyCode::Enter => state.toggle_editing(),
            KeyCode::Tab => {
                state.toggle_editing();
                state.next_field();
            }
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Esc => return Some(FormAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Char('s') if state.can_edit() => {
            if let Ok(entity) = state.validate() {
                state.submitting = true;
                return Some(FormAction::Submit(entity));
            }
        }
        _ => {}
    }

    None
}

pub fn render_entity_form<B: Backend, E: Entity>(f: &mut Frame<B>, area: Rect, state: &EntityFormState<E>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(state.title())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    if state.loading {
        let loading = Paragraph::new("Loading record...")
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL).title(format!("{} Details", E::KIND.label())));
        f.render_widget(loading, chunks[1]);
    } else {
        render_fields(f, state, chunks[1]);
    }

    let help_text = if state.mode.is_read_only() {
        "All fields are read-only | Up/Down - Navigate fields | Esc - Back"
    } else if state.submitting {
        "Saving..."
    } else if state.editing {
        "Enter - Done | Tab - Next field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_fields<B: Backend, E: Entity>(f: &mut Frame<B>, state: &EntityFormState<E>, area: Rect) {
    let read_only = state.mode.is_read_only();

    let items: Vec<ListItem> = E::fields()
        .iter()
        .zip(&state.inputs)
        .enumerate()
        .map(|(i, (spec, input))| {
            let focused = i == state.current;
            let label_style = if read_only {
                Style::default().fg(Color::DarkGray)
            } else if focused {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled(format!("{}: ", spec.label), label_style)];
            if focused && state.editing {
                spans.extend(caret_spans(input));
            } else {
                spans.push(Span::raw(input.display()));
            }

            let mut lines = vec![Spans::from(spans)];
            if let Some(error) = &state.errors[i] {
                lines.push(Spans::from(Span::styled(
                    format!("  {error}"),
                    Style::default().fg(Color::Red),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let form_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{} Details", E::KIND.label())),
    );

    f.render_widget(form_list, area);
}

/// The field text with the caret drawn at the input's cursor position.
fn caret_spans(input: &FieldInput) -> Vec<Span<'static>> {
    let display: Vec<char> = input.display().chars().collect();
    let column = input.cursor_column().map_or(display.len(), |c| c.min(display.len()));
    let bold = Style::default().add_modifier(Modifier::BOLD);

    vec![
        Span::styled(display[..column].iter().collect::<String>(), bold),
        Span::styled("|", Style::default().fg(Color::Yellow)),
        Span::styled(display[column..].iter().collect::<String>(), bold),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Employee, Group, Product};
    use pretty_assertions::assert_eq;
    use tui::{backend::TestBackend, Terminal};

    fn type_into<E: Entity>(form: &mut EntityFormState<E>, key: &str, text: &str) {
        form.focus(key);
        handle_key(form, KeyCode::Enter);
        for c in text.chars() {
            handle_key(form, KeyCode::Char(c));
        }
        handle_key(form, KeyCode::Enter);
    }

    fn maria() -> Client {
        Client {
            id: Some(42),
            name: "Maria".to_string(),
            national_id: "11144477735".to_string(),
            phone: "11987654321".to_string(),
        }
    }

    #[test]
    fn create_form_submits_unmasked_values() {
        let mut form = EntityFormState::<Client>::new(FormMode::Create);
        assert!(!form.is_loading());
        type_into(&mut form, "nome", "Maria");
        type_into(&mut form, "cpf", "111.444.777-35");
        type_into(&mut form, "telefone", "(11) 98765-4321");

        match handle_key(&mut form, KeyCode::Char('s')) {
            Some(FormAction::Submit(client)) => assert_eq!(client, Client { id: None, ..maria() }),
            _ => panic!("expected submit"),
        }
        assert!(form.is_submitting());
    }

    #[test]
    fn missing_required_field_blocks_submit() {
        let mut form = EntityFormState::<Client>::new(FormMode::Create);
        type_into(&mut form, "nome", "Maria");

        assert!(handle_key(&mut form, KeyCode::Char('s')).is_none());
        assert_eq!(form.error("cpf"), Some("National ID is required"));
        assert_eq!(form.error("telefone"), Some("Phone is required"));
        assert!(!form.is_submitting());
        assert_eq!(form.value("nome").as_deref(), Some("Maria"));
    }

    #[test]
    fn edit_form_waits_for_record() {
        let mut form = EntityFormState::<Client>::new(FormMode::Edit(42));
        assert!(form.is_loading());
        handle_key(&mut form, KeyCode::Enter);
        assert!(!form.is_editing());
        assert!(handle_key(&mut form, KeyCode::Char('s')).is_none());

        form.populate(&maria());
        assert!(!form.is_loading());
        assert_eq!(form.display("cpf").as_deref(), Some("111.444.777-35"));
        assert_eq!(form.title(), "Edit Client: 42");
    }

    #[test]
    fn view_mode_rejects_keystrokes() {
        let mut form = EntityFormState::<Client>::new(FormMode::View(42));
        form.populate(&maria());
        let before = form.values();

        handle_key(&mut form, KeyCode::Enter);
        for key in [KeyCode::Char('x'), KeyCode::Backspace, KeyCode::Char('9')] {
            handle_key(&mut form, key);
        }
        form.edit_current_field(KeyCode::Char('z'));

        assert_eq!(form.values(), before);
        assert!(handle_key(&mut form, KeyCode::Char('s')).is_none());
        assert!(matches!(handle_key(&mut form, KeyCode::Esc), Some(FormAction::Cancel)));
    }

    #[test]
    fn edit_mode_keeps_id_and_allows_blank_password() {
        let mut form = EntityFormState::<Employee>::new(FormMode::Edit(5));
        form.populate(&Employee {
            id: Some(5),
            name: "Ana".to_string(),
            national_id: "11144477735".to_string(),
            registration: "A1".to_string(),
            phone: String::new(),
            password: None,
            group: Some(Group::Admin),
        });

        let employee = form.validate().unwrap();
        assert_eq!(employee.id, Some(5));
        assert_eq!(employee.password, None);
        assert_eq!(employee.group, Some(Group::Admin));
    }

    #[test]
    fn new_employee_needs_password() {
        let mut form = EntityFormState::<Employee>::new(FormMode::Create);
        type_into(&mut form, "nome", "Ana");
        type_into(&mut form, "cpf", "11144477735");
        type_into(&mut form, "matricula", "A1");
        type_into(&mut form, "senha", "abc");

        assert!(form.validate().is_err());
        assert_eq!(form.error("senha"), Some("must have at least 6 characters"));
        assert_eq!(form.error("telefone"), None);
    }

    #[test]
    fn product_price_must_be_numeric() {
        let mut form = EntityFormState::<Product>::new(FormMode::Create);
        type_into(&mut form, "nome", "Coffee");
        type_into(&mut form, "valor_unitario", "-");
        type_into(&mut form, "foto", "coffee.png");
        type_into(&mut form, "descricao", "Espresso");

        assert!(form.validate().is_err());
        assert_eq!(form.error("valor_unitario"), Some("must be a number"));
    }

    #[test]
    fn failed_submit_preserves_values() {
        let mut form = EntityFormState::<Client>::new(FormMode::Edit(42));
        form.populate(&maria());
        assert!(matches!(handle_key(&mut form, KeyCode::Char('s')), Some(FormAction::Submit(_))));

        form.submit_failed();
        assert!(!form.is_submitting());
        assert_eq!(form.value("telefone").as_deref(), Some("11987654321"));
    }

    #[test]
    fn over_long_stored_value_is_kept_and_blocks_save() {
        let mut form = EntityFormState::<Client>::new(FormMode::Edit(42));
        form.populate(&Client {
            phone: "5511987654321".to_string(),
            ..maria()
        });

        assert!(handle_key(&mut form, KeyCode::Char('s')).is_none());
        assert_eq!(form.error("telefone"), Some("must have at most 11 characters"));
        assert_eq!(form.value("telefone").as_deref(), Some("5511987654321"));
        assert_eq!(form.display("telefone").as_deref(), Some("(55) 1 1987-654321"));
    }

    fn render_lines<E: Entity>(form: &EntityFormState<E>) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(60, 16)).unwrap();
        terminal
            .draw(|f| {
                let area = f.size();
                render_entity_form(f, area, form);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| (0..buffer.area.width).map(|x| buffer.get(x, y).symbol.as_str()).collect())
            .collect()
    }

    #[test]
    fn caret_follows_the_cursor_inside_masked_text() {
        let mut form = EntityFormState::<Client>::new(FormMode::Create);
        form.focus("cpf");
        handle_key(&mut form, KeyCode::Enter);
        for c in "11144477735".chars() {
            handle_key(&mut form, KeyCode::Char(c));
        }
        assert!(render_lines(&form).iter().any(|line| line.contains("National ID: 111.444.777-35|")));

        for _ in 0..8 {
            handle_key(&mut form, KeyCode::Left);
        }
        let lines = render_lines(&form);
        assert!(
            lines.iter().any(|line| line.contains("National ID: 111.|444.777-35")),
            "{lines:#?}"
        );

        handle_key(&mut form, KeyCode::Backspace);
        assert_eq!(form.value("cpf").as_deref(), Some("1144477735"));
        assert!(render_lines(&form).iter().any(|line| line.contains("National ID: 11|4.447.773-5")));
    }
}
