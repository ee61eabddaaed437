use serde::{Deserialize, Serialize};

use super::fields::{ColumnTier, FieldKind, FieldSpec, FormValues, Rules};
use super::{Entity, EntityKind, wire};

pub const NATIONAL_ID_MASK: &str = "000.000.000-00";
pub const CLIENT_PHONE_MASK: &str = "(00) 0 0000-0000";

static FIELDS: [FieldSpec; 3] = [
    FieldSpec::new("nome", "Name").rules(Rules::REQUIRED),
    FieldSpec::new("cpf", "National ID")
        .kind(FieldKind::Masked(NATIONAL_ID_MASK))
        .rules(Rules::REQUIRED.exactly(11)),
    FieldSpec::new("telefone", "Phone")
        .kind(FieldKind::Masked(CLIENT_PHONE_MASK))
        .rules(Rules::REQUIRED.min(10).max(11))
        .tier(ColumnTier::Secondary),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(
        rename = "id_cliente",
        default,
        deserialize_with = "wire::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i32>,
    #[serde(rename = "nome", default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(rename = "cpf", default, deserialize_with = "wire::string")]
    pub national_id: String,
    #[serde(rename = "telefone", default, deserialize_with = "wire::string")]
    pub phone: String,
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;

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
            "telefone" => self.phone.clone(),
            _ => String::new(),
        }
    }

    fn from_values(id: Option<i32>, values: &FormValues) -> Self {
        Self {
            id,
            name: values.get("nome").trim().to_string(),
            national_id: values.get("cpf").to_string(),
            phone: values.get("telefone").to_string(),
        }
    }
}
