use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::client::NATIONAL_ID_MASK;
use super::fields::{Choice, ColumnTier, FieldKind, FieldSpec, FormValues, Rules};
use super::{Entity, EntityKind, wire};

pub const EMPLOYEE_PHONE_MASK: &str = "(00) 00000-0000";

const GROUPS: &[Choice] = &[
    Choice { code: "1", label: "Admin" },
    Choice { code: "2", label: "Counter service" },
    Choice { code: "3", label: "Cashier service" },
];

static FIELDS: [FieldSpec; 6] = [
    FieldSpec::new("nome", "Name").rules(Rules::REQUIRED),
    FieldSpec::new("cpf", "National ID")
        .kind(FieldKind::Masked(NATIONAL_ID_MASK))
        .rules(Rules::REQUIRED.exactly(11)),
    FieldSpec::new("matricula", "Registration").rules(Rules::REQUIRED),
    FieldSpec::new("telefone", "Phone")
        .kind(FieldKind::Masked(EMPLOYEE_PHONE_MASK))
        .rules(Rules::OPTIONAL.min(10).max(11))
        .tier(ColumnTier::Secondary),
    FieldSpec::new("senha", "Password")
        .kind(FieldKind::Secret)
        .rules(Rules::REQUIRED.on_create().min(6))
        .tier(ColumnTier::Hidden),
    FieldSpec::new("grupo", "Group")
        .kind(FieldKind::Choice(GROUPS))
        .tier(ColumnTier::Secondary),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Admin,
    CounterService,
    CashierService,
}

impl Group {
    pub fn code(self) -> &'static str {
        match self {
            Group::Admin => "1",
            Group::CounterService => "2",
            Group::CashierService => "3",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "1" => Some(Group::Admin),
            "2" => Some(Group::CounterService),
            "3" => Some(Group::CashierService),
            _ => None,
        }
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

fn optional_group<'de, D>(deserializer: D) -> Result<Option<Group>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Group::from_code(&s),
        Some(Value::Number(n)) => Group::from_code(&n.to_string()),
        _ => None,
    })
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(
        rename = "id_funcionario",
        default,
        deserialize_with = "wire::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i32>,
    #[serde(rename = "nome", default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(rename = "cpf", default, deserialize_with = "wire::string")]
    pub national_id: String,
    #[serde(rename = "matricula", default, deserialize_with = "wire::string")]
    pub registration: String,
    #[serde(rename = "telefone", default, deserialize_with = "wire::string")]
    pub phone: String,
    /// Only ever sent; a blank password on update keeps the stored one.
    #[serde(rename = "senha", default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(rename = "grupo", default, deserialize_with = "optional_group", skip_serializing_if = "Option::is_none")]
    pub group: Option<Group>,
}

impl fmt::Debug for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Employee")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("national_id", &self.national_id)
            .field("registration", &self.registration)
            .field("phone", &self.phone)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("group", &self.group)
            .finish()
    }
}

impl Entity for Employee {
    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> Option<i32> {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn value(&self, key: &str) -> String {
        match key {
            "nome" => self.name.clone(),
            "cpf" => self.national_id.clone(),
            "matricula" => self.registration.clone(),
            "telefone" => self.phone.clone(),
            "grupo" => self.group.map(|g| g.code().to_string()).unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn from_values(id: Option<i32>, values: &FormValues) -> Self {
        Self {
            id,
            name: values.get("nome").trim().to_string(),
            national_id: values.get("cpf").to_string(),
            registration: values.get("matricula").trim().to_string(),
            phone: values.get("telefone").to_string(),
            password: values.optional("senha"),
            group: Group::from_code(values.get("grupo")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn password_is_write_only() {
        let employee: Employee = serde_json::from_value(json!({
            "id_funcionario": "9", "nome": "Ana", "cpf": "11144477735",
            "matricula": "A1", "telefone": "", "senha": "hash", "grupo": 2
        }))
        .unwrap();
        assert_eq!(employee.id, Some(9));
        assert_eq!(employee.password, None);
        assert_eq!(employee.group, Some(Group::CounterService));
        assert_eq!(employee.value("senha"), "");
        assert!(!format!("{employee:?}").contains("hash"));
    }

    #[test]
    fn blank_password_is_not_sent() {
        let mut values = FormValues::new();
        values.insert("nome", "Ana");
        values.insert("senha", "  ");
        values.insert("grupo", "1");
        let body = serde_json::to_value(Employee::from_values(Some(4), &values)).unwrap();
        assert_eq!(body.get("senha"), None);
        assert_eq!(body["grupo"], json!("1"));
        assert_eq!(body["id_funcionario"], json!(4));
    }
}
