use serde::{Deserialize, Serialize};

use super::fields::{ColumnTier, FieldKind, FieldSpec, FormValues, Rules, parse_number};
use super::{Entity, EntityKind, wire};

static FIELDS: [FieldSpec; 4] = [
    FieldSpec::new("nome", "Name").rules(Rules::REQUIRED.max(100)),
    FieldSpec::new("valor_unitario", "Unit price")
        .kind(FieldKind::Number)
        .rules(Rules::REQUIRED.numeric().max(100)),
    FieldSpec::new("foto", "Photo")
        .rules(Rules::REQUIRED)
        .tier(ColumnTier::Secondary),
    FieldSpec::new("descricao", "Description")
        .rules(Rules::REQUIRED.max(300))
        .tier(ColumnTier::Secondary),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        rename = "id_produto",
        default,
        deserialize_with = "wire::optional_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i32>,
    #[serde(rename = "nome", default, deserialize_with = "wire::string")]
    pub name: String,
    #[serde(rename = "valor_unitario", default, deserialize_with = "wire::number")]
    pub unit_price: f64,
    /// Photo URL or file reference.
    #[serde(rename = "foto", default, deserialize_with = "wire::string")]
    pub photo: String,
    #[serde(rename = "descricao", default, deserialize_with = "wire::string")]
    pub description: String,
}

impl Entity for Product {
    const KIND: EntityKind = EntityKind::Product;

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
            "valor_unitario" => format_price(self.unit_price),
            "foto" => self.photo.clone(),
            "descricao" => self.description.clone(),
            _ => String::new(),
        }
    }

    fn from_values(id: Option<i32>, values: &FormValues) -> Self {
        Self {
            id,
            name: values.get("nome").trim().to_string(),
            unit_price: parse_number(values.get("valor_unitario")).unwrap_or_default(),
            photo: values.get("foto").trim().to_string(),
            description: values.get("descricao").trim().to_string(),
        }
    }
}

/// Money reads with two decimals; longer fractions are kept as they are.
fn format_price(value: f64) -> String {
    let cents = format!("{value:.2}");
    if cents.parse::<f64>() == Ok(value) {
        cents
    } else {
        value.to_string()
    }
}
