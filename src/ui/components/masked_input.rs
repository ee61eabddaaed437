use std::collections::HashMap;

use crossterm::event::KeyCode;

/// Which characters a mask placeholder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    Letter,
    Alphanumeric,
    Any,
}

impl CharClass {
    pub fn accepts(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Letter => c.is_alphabetic(),
            CharClass::Alphanumeric => c.is_alphanumeric(),
            CharClass::Any => !c.is_control(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Slot(CharClass),
    Literal(char),
}

/// A display pattern such as `000.000.000-00`: placeholders take typed
/// characters, everything else is fixed punctuation that is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    tokens: Vec<Token>,
}

impl Mask {
    /// Uses the default definitions, where `0` is a digit placeholder.
    pub fn new(pattern: &str) -> Self {
        Self::with_definitions(pattern, &HashMap::from([('0', CharClass::Digit)]))
    }

    pub fn with_definitions(pattern: &str, definitions: &HashMap<char, CharClass>) -> Self {
        let tokens = pattern
            .chars()
            .map(|c| match definitions.get(&c) {
                Some(class) => Token::Slot(*class),
                None => Token::Literal(c),
            })
            .collect();
        Self { tokens }
    }

    /// Number of placeholders, i.e. the longest unmasked value.
    pub fn capacity(&self) -> usize {
        self.tokens.iter().filter(|t| matches!(t, Token::Slot(_))).count()
    }

    fn slot(&self, index: usize) -> Option<CharClass> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                Token::Slot(class) => Some(*class),
                Token::Literal(_) => None,
            })
            .nth(index)
    }

    /// True when every character sits in a placeholder that accepts it.
    pub fn fits(&self, raw: &[char]) -> bool {
        raw.len() <= self.capacity()
            && raw
                .iter()
                .enumerate()
                .all(|(i, c)| self.slot(i).is_some_and(|class| class.accepts(*c)))
    }

    /// Extracts the placeholder characters from masked or raw text.
    /// Rejected characters are dropped. Characters past the last placeholder
    /// are kept when that placeholder would accept them, so an over-long
    /// stored value survives and fails validation instead of being cut.
    pub fn unmask(&self, text: &str) -> String {
        let mut raw = String::new();
        let mut pos = 0;

        'input: for c in text.chars() {
            while let Some(Token::Literal(literal)) = self.tokens.get(pos) {
                pos += 1;
                if *literal == c {
                    continue 'input;
                }
            }
            match self.tokens.get(pos) {
                Some(Token::Slot(class)) if class.accepts(c) => {
                    raw.push(c);
                    pos += 1;
                }
                Some(_) => {}
                None => {
                    if self.last_slot().is_some_and(|class| class.accepts(c)) {
                        raw.push(c);
                    }
                }
            }
        }

        raw
    }

    fn last_slot(&self) -> Option<CharClass> {
        self.tokens.iter().rev().find_map(|t| match t {
            Token::Slot(class) => Some(*class),
            Token::Literal(_) => None,
        })
    }

    /// Renders an unmasked value. Literals are emitted only while more
    /// characters follow them; overflow is appended as-is.
    pub fn format(&self, raw: &str) -> String {
        let mut chars = raw.chars().peekable();
        let mut out = String::new();

        for token in &self.tokens {
            if chars.peek().is_none() {
                break;
            }
            match token {
                Token::Literal(literal) => out.push(*literal),
                Token::Slot(_) => {
                    if let Some(c) = chars.next() {
                        out.push(c);
                    }
                }
            }
        }
        out.extend(chars);

        out
    }

    /// Column in `format(raw)` where the raw cursor index lands.
    pub fn display_offset(&self, raw: &str, cursor: usize) -> usize {
        if cursor >= raw.chars().count() {
            return self.format(raw).chars().count();
        }
        let mut slots = 0;
        for (i, token) in self.tokens.iter().enumerate() {
            if let Token::Slot(_) = token {
                if slots == cursor {
                    return i;
                }
                slots += 1;
            }
        }
        self.tokens.len() + (cursor - slots)
    }
}

/// Text input that shows the mask while holding only the unmasked characters.
#[derive(Debug, Clone)]
pub struct MaskedInputState {
    mask: Mask,
    raw: Vec<char>,
    cursor: usize,
}

impl MaskedInputState {
    pub fn new(pattern: &str) -> Self {
        Self::from_mask(Mask::new(pattern))
    }

    pub fn from_mask(mask: Mask) -> Self {
        Self {
            mask,
            raw: Vec::new(),
            cursor: 0,
        }
    }

    /// The unmasked value, what the form stores and sends.
    pub fn value(&self) -> String {
        self.raw.iter().collect()
    }

    pub fn display(&self) -> String {
        self.mask.format(&self.value())
    }

    pub fn cursor_column(&self) -> usize {
        self.mask.display_offset(&self.value(), self.cursor)
    }

    /// Controlled write, e.g. when a fetched record populates the form.
    /// Accepts masked or unmasked text; the cursor moves to the end.
    /// Nothing is truncated, even past the mask's capacity.
    pub fn set_value(&mut self, value: &str) {
        self.raw = self.mask.unmask(value).chars().collect();
        self.cursor = self.raw.len();
    }

    /// Applies one keystroke. Returns whether the value changed.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Char(c) => {
                let mut candidate = self.raw.clone();
                candidate.insert(self.cursor, c);
                if self.mask.fits(&candidate) {
                    self.raw = candidate;
                    self.cursor += 1;
                    return true;
                }
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.raw.remove(self.cursor);
                return true;
            }
            KeyCode::Delete if self.cursor < self.raw.len() => {
                self.raw.remove(self.cursor);
                return true;
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.raw.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.raw.len(),
            _ => {}
        }
        false
    }
}
