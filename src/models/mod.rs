mod client;
mod employee;
mod product;
pub mod fields;
pub mod wire;

use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use client::Client;
pub use employee::{Employee, Group};
pub use fields::{ColumnTier, FieldKind, FieldSpec, FormValues};
pub use product::Product;

/// The record types managed by the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Client,
    Employee,
    Product,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Client, EntityKind::Employee, EntityKind::Product];

    /// Backend path segment, also the singular route segment.
    pub fn resource(self) -> &'static str {
        match self {
            EntityKind::Client => "cliente",
            EntityKind::Employee => "funcionario",
            EntityKind::Product => "produto",
        }
    }

    /// Route segment of the list screen.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Client => "clientes",
            EntityKind::Employee => "funcionarios",
            EntityKind::Product => "produtos",
        }
    }

    /// Query parameter and payload key carrying the identifier.
    pub fn id_key(self) -> &'static str {
        match self {
            EntityKind::Client => "id_cliente",
            EntityKind::Employee => "id_funcionario",
            EntityKind::Product => "id_produto",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Client => "Client",
            EntityKind::Employee => "Employee",
            EntityKind::Product => "Product",
        }
    }

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Client => "Clients",
            EntityKind::Employee => "Employees",
            EntityKind::Product => "Products",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A backend-managed record driven by a field descriptor.
pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Assigned by the backend; `None` until created.
    fn id(&self) -> Option<i32>;

    /// Name used when the record is referred to in prompts.
    fn display_name(&self) -> &str;

    fn fields() -> &'static [FieldSpec];

    /// Unmasked value of one field, keyed by wire key.
    fn value(&self, key: &str) -> String;

    /// Builds a record from values that already passed validation.
    fn from_values(id: Option<i32>, values: &FormValues) -> Self;

    fn values(&self) -> FormValues {
        let mut values = FormValues::new();
        for spec in Self::fields() {
            values.insert(spec.key, self.value(spec.key));
        }
        values
    }
}
