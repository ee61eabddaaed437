use crossterm::event::KeyCode;

use super::masked_input::{Mask, MaskedInputState};
use crate::models::fields::Choice;
use crate::models::{FieldKind, FieldSpec};

const SECRET_GLYPH: char = '•';

/// The editable control behind one form field.
#[derive(Debug, Clone)]
pub enum FieldInput {
    Text { value: String, secret: bool, numeric: bool },
    Masked(MaskedInputState),
    Choice {
        options: &'static [Choice],
        selected: Option<usize>,
    },
}

impl FieldInput {
    pub fn for_spec(spec: &FieldSpec) -> Self {
        match spec.kind {
            FieldKind::Text => Self::text(false, false),
            FieldKind::Secret => Self::text(true, false),
            FieldKind::Number => Self::text(false, true),
            FieldKind::Masked(pattern) => FieldInput::Masked(MaskedInputState::new(pattern)),
            FieldKind::Choice(options) => FieldInput::Choice { options, selected: None },
        }
    }

    fn text(secret: bool, numeric: bool) -> Self {
        FieldInput::Text {
            value: String::new(),
            secret,
            numeric,
        }
    }

    /// Unmasked value as stored in the form.
    pub fn value(&self) -> String {
        match self {
            FieldInput::Text { value, .. } => value.clone(),
            FieldInput::Masked(input) => input.value(),
            FieldInput::Choice { options, selected } => selected
                .and_then(|i| options.get(i))
                .map(|choice| choice.code.to_string())
                .unwrap_or_default(),
        }
    }

    /// What the user sees.
    pub fn display(&self) -> String {
        match self {
            FieldInput::Text { value, secret: true, .. } => SECRET_GLYPH.to_string().repeat(value.chars().count()),
            FieldInput::Text { value, .. } => value.clone(),
            FieldInput::Masked(input) => input.display(),
            FieldInput::Choice { options, selected } => selected
                .and_then(|i| options.get(i))
                .map(|choice| choice.label.to_string())
                .unwrap_or_default(),
        }
    }

    /// Cursor column within `display()`, `None` for choices.
    pub fn cursor_column(&self) -> Option<usize> {
        match self {
            FieldInput::Text { value, .. } => Some(value.chars().count()),
            FieldInput::Masked(input) => Some(input.cursor_column()),
            FieldInput::Choice { .. } => None,
        }
    }

    pub fn set_value(&mut self, new_value: &str) {
        match self {
            FieldInput::Text { value, .. } => *value = new_value.to_string(),
            FieldInput::Masked(input) => input.set_value(new_value),
            FieldInput::Choice { options, selected } => {
                *selected = options.iter().position(|choice| choice.code == new_value.trim());
            }
        }
    }

    pub fn clear(&mut self) {
        self.set_value("");
    }

    /// Applies one keystroke. Returns whether the value changed.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match self {
            FieldInput::Text { value, numeric, .. } => match key {
                KeyCode::Char(c) if !*numeric || c.is_ascii_digit() || matches!(c, '.' | ',' | '-') => {
                    value.push(c);
                    true
                }
                KeyCode::Backspace => value.pop().is_some(),
                _ => false,
            },
            FieldInput::Masked(input) => input.handle_key(key),
            FieldInput::Choice { options, selected } => {
                if options.is_empty() {
                    return false;
                }
                let last = options.len() - 1;
                let next = match (key, *selected) {
                    (KeyCode::Right | KeyCode::Char(' '), None) => Some(0),
                    (KeyCode::Right | KeyCode::Char(' '), Some(i)) => Some(if i >= last { 0 } else { i + 1 }),
                    (KeyCode::Left, None) => Some(last),
                    (KeyCode::Left, Some(i)) => Some(if i == 0 { last } else { i - 1 }),
                    (KeyCode::Backspace | KeyCode::Delete, _) => None,
                    _ => return false,
                };
                let changed = next != *selected;
                *selected = next;
                changed
            }
        }
    }
}

/// Cell text for a stored value, using the field's mask or choice labels.
pub fn display_value(spec: &FieldSpec, raw: &str) -> String {
    match spec.kind {
        FieldKind::Masked(pattern) => Mask::new(pattern).format(raw),
        FieldKind::Secret => SECRET_GLYPH.to_string().repeat(6),
        FieldKind::Choice(options) => options
            .iter()
            .find(|choice| choice.code == raw.trim())
            .map(|choice| choice.label.to_string())
            .unwrap_or_default(),
        FieldKind::Text | FieldKind::Number => raw.to_string(),
    }
}
