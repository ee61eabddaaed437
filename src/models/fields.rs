//! Declarative field descriptors shared by the generic form and list screens.

use std::collections::BTreeMap;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Display mask; the stored value is only the characters typed into placeholders.
    Masked(&'static str),
    /// Write-only; never rendered back.
    Secret,
    Number,
    Choice(&'static [Choice]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    Always,
    /// Required when creating, optional when editing an existing record.
    OnCreate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub required: Requirement,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
    pub numeric: bool,
}

impl Rules {
    pub const OPTIONAL: Rules = Rules {
        required: Requirement::Optional,
        min_len: None,
        max_len: None,
        numeric: false,
    };

    pub const REQUIRED: Rules = Rules {
        required: Requirement::Always,
        ..Rules::OPTIONAL
    };

    pub const fn on_create(self) -> Self {
        Rules {
            required: Requirement::OnCreate,
            ..self
        }
    }

    pub const fn min(self, n: usize) -> Self {
        Rules {
            min_len: Some(n),
            ..self
        }
    }

    pub const fn max(self, n: usize) -> Self {
        Rules {
            max_len: Some(n),
            ..self
        }
    }

    pub const fn exactly(self, n: usize) -> Self {
        self.min(n).max(n)
    }

    pub const fn numeric(self) -> Self {
        Rules {
            numeric: true,
            ..self
        }
    }
}

/// Where a field shows up in the entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTier {
    /// Always visible.
    Primary,
    /// Hidden on narrow terminals.
    Secondary,
    /// Never a column.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Wire key in the backend payload.
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: Rules,
    pub tier: ColumnTier,
}

impl FieldSpec {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        FieldSpec {
            key,
            label,
            kind: FieldKind::Text,
            rules: Rules::OPTIONAL,
            tier: ColumnTier::Primary,
        }
    }

    pub const fn kind(self, kind: FieldKind) -> Self {
        FieldSpec { kind, ..self }
    }

    pub const fn rules(self, rules: Rules) -> Self {
        FieldSpec { rules, ..self }
    }

    pub const fn tier(self, tier: ColumnTier) -> Self {
        FieldSpec { tier, ..self }
    }

    fn is_required(&self, creating: bool) -> bool {
        match self.rules.required {
            Requirement::Always => true,
            Requirement::OnCreate => creating,
            Requirement::Optional => false,
        }
    }

    /// Checks one unmasked value against the field's rules.
    pub fn validate(&self, value: &str, creating: bool) -> Result<(), ValidationError> {
        let fail = |message: String| {
            Err(ValidationError {
                field: self.key,
                label: self.label,
                message,
            })
        };

        let value = value.trim();
        if value.is_empty() {
            if self.is_required(creating) {
                return fail(format!("{} is required", self.label));
            }
            return Ok(());
        }

        if self.rules.numeric && parse_number(value).is_none() {
            return fail("must be a number".to_string());
        }

        let len = value.chars().count();
        match (self.rules.min_len, self.rules.max_len) {
            (Some(min), Some(max)) if min == max && len != min => {
                return fail(format!("must have exactly {min} characters"));
            }
            (Some(min), _) if len < min => {
                return fail(format!("must have at least {min} characters"));
            }
            (_, Some(max)) if len > max => {
                return fail(format!("must have at most {max} characters"));
            }
            _ => {}
        }

        Ok(())
    }
}

/// Accepts both `12.5` and `12,5`.
pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Unmasked form values keyed by wire key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues(BTreeMap<&'static str, String>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value, `None` when blank.
    pub fn optional(&self, key: &str) -> Option<String> {
        let value = self.get(key).trim();
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Runs every field's rules, collecting all violations.
pub fn validate_all(
    fields: &[FieldSpec],
    values: &FormValues,
    creating: bool,
) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = fields
        .iter()
        .filter_map(|spec| spec.validate(values.get(spec.key), creating).err())
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: FieldSpec = FieldSpec::new("nome", "Name").rules(Rules::REQUIRED.max(5));
    const CPF: FieldSpec = FieldSpec::new("cpf", "National ID")
        .kind(FieldKind::Masked("000.000.000-00"))
        .rules(Rules::REQUIRED.exactly(11));
    const PASSWORD: FieldSpec = FieldSpec::new("senha", "Password")
        .kind(FieldKind::Secret)
        .rules(Rules::REQUIRED.on_create().min(6));
    const PRICE: FieldSpec = FieldSpec::new("valor_unitario", "Unit price").rules(Rules::REQUIRED.numeric());

    #[test]
    fn required_blank_is_rejected() {
        let err = NAME.validate("   ", true).unwrap_err();
        assert_eq!(err.field, "nome");
        assert_eq!(err.message, "Name is required");
    }

    #[test]
    fn length_bounds() {
        assert!(NAME.validate("Maria", true).is_ok());
        assert_eq!(
            NAME.validate("Mariana", true).unwrap_err().message,
            "must have at most 5 characters"
        );
        assert_eq!(
            CPF.validate("1114447773", true).unwrap_err().message,
            "must have exactly 11 characters"
        );
        assert!(CPF.validate("11144477735", true).is_ok());
    }

    #[test]
    fn on_create_requirement_relaxes_when_editing() {
        assert!(PASSWORD.validate("", true).is_err());
        assert!(PASSWORD.validate("", false).is_ok());
        assert_eq!(
            PASSWORD.validate("abc", false).unwrap_err().message,
            "must have at least 6 characters"
        );
    }

    #[test]
    fn numeric_rule() {
        assert!(PRICE.validate("12.50", true).is_ok());
        assert!(PRICE.validate("12,50", true).is_ok());
        assert_eq!(PRICE.validate("twelve", true).unwrap_err().message, "must be a number");
    }

    #[test]
    fn validate_all_collects_every_violation() {
        let mut values = FormValues::new();
        values.insert("cpf", "123");
        let errors = validate_all(&[NAME, CPF, PRICE], &values, true).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["nome", "cpf", "valor_unitario"]);
    }
}
