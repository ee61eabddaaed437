//! Lenient deserializers for backend payloads, which send numbers and digit
//! strings interchangeably.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_id))
}

pub fn value_as_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

pub fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => Ok(n.as_f64().unwrap_or_default()),
        Some(Value::String(s)) => super::fields::parse_number(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid number {s:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!("invalid number {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "super::optional_id")]
        id: Option<i32>,
        #[serde(default, deserialize_with = "super::string")]
        digits: String,
        #[serde(default, deserialize_with = "super::number")]
        price: f64,
    }

    #[test]
    fn numbers_and_strings_are_interchangeable() {
        let a: Probe = serde_json::from_value(json!({"id": "7", "digits": 11987654321u64, "price": "3,5"})).unwrap();
        assert_eq!(a.id, Some(7));
        assert_eq!(a.digits, "11987654321");
        assert_eq!(a.price, 3.5);

        let b: Probe = serde_json::from_value(json!({"id": null})).unwrap();
        assert_eq!(b.id, None);
        assert_eq!(b.digits, "");
        assert_eq!(b.price, 0.0);
    }
}
