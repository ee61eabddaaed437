use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::{ApiRequest, Method, Transport};
use crate::config::normalize_root;
use crate::error::ServiceError;
use crate::models::Entity;
use crate::models::wire::value_as_id;

const DEFAULT_SAVE_ERROR: &str = "The server did not confirm the save.";

/// CRUD calls for one entity against `{proxy_root}{resource}/`.
///
/// Save outcomes are normalized here: the backend signals success with an
/// `id` in the body, so a 2xx reply without one is reported as
/// [`ServiceError::Rejected`].
pub struct EntityService<E, T> {
    transport: Arc<T>,
    base: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E, T> Clone for EntityService<E, T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base: self.base.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, T: Transport> EntityService<E, T> {
    pub fn new(transport: Arc<T>, proxy_root: &str) -> Self {
        let base = format!("{}{}/", normalize_root(proxy_root), E::KIND.resource());
        Self {
            transport,
            base,
            _entity: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn base(&self) -> &str {
        &self.base
    }

    async fn call(&self, request: ApiRequest) -> Result<Value, ServiceError> {
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("request failed with status {}", response.status));
            return Err(ServiceError::Server {
                status: response.status,
                message,
            });
        }
        Ok(response.body)
    }

    pub async fn list(&self) -> Result<Vec<E>, ServiceError> {
        debug!(entity = %E::KIND, "listing records");
        let body = self
            .call(ApiRequest::new(Method::Get, format!("{}all", self.base)))
            .await?;

        match body {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(ServiceError::from))
                .collect(),
            other => Err(ServiceError::Decode(format!("expected an array, got {other}"))),
        }
    }

    /// Zero matches is [`ServiceError::NotFound`]. With several matches the
    /// record carrying the requested id wins, else the first one.
    pub async fn get_by_id(&self, id: i32) -> Result<E, ServiceError> {
        debug!(entity = %E::KIND, id, "fetching record");
        let request = ApiRequest::new(Method::Get, format!("{}one", self.base)).query(E::KIND.id_key(), id);
        let body = self.call(request).await?;

        let mut matches: Vec<E> = match body {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<_, _>>()?,
            object @ Value::Object(_) => vec![serde_json::from_value(object)?],
            other => return Err(ServiceError::Decode(format!("expected a record, got {other}"))),
        };

        if matches.is_empty() {
            return Err(ServiceError::NotFound {
                entity: E::KIND.label(),
                id,
            });
        }
        if matches.len() > 1 {
            warn!(entity = %E::KIND, id, count = matches.len(), "lookup returned several records");
        }

        let position = matches.iter().position(|record| record.id() == Some(id)).unwrap_or(0);
        Ok(matches.swap_remove(position))
    }

    /// Returns the id assigned by the backend.
    pub async fn create(&self, entity: &E) -> Result<i32, ServiceError> {
        debug!(entity = %E::KIND, "creating record");
        let request = ApiRequest::new(Method::Post, self.base.clone()).json(serde_json::to_value(entity)?);
        let body = self.call(request).await?;
        save_outcome(&body)
    }

    pub async fn update(&self, id: i32, entity: &E) -> Result<i32, ServiceError> {
        debug!(entity = %E::KIND, id, "updating record");
        let request = ApiRequest::new(Method::Put, self.base.clone())
            .query(E::KIND.id_key(), id)
            .json(serde_json::to_value(entity)?);
        let body = self.call(request).await?;
        save_outcome(&body)
    }

    /// Returns the backend's acknowledgement body as-is.
    pub async fn delete(&self, id: i32) -> Result<Value, ServiceError> {
        debug!(entity = %E::KIND, id, "deleting record");
        let request = ApiRequest::new(Method::Delete, self.base.clone()).query(E::KIND.id_key(), id);
        self.call(request).await
    }
}

fn save_outcome(body: &Value) -> Result<i32, ServiceError> {
    match body.get("id").and_then(value_as_id) {
        Some(id) => Ok(id),
        None => Err(ServiceError::Rejected {
            message: error_message(body).unwrap_or_else(|| DEFAULT_SAVE_ERROR.to_string()),
        }),
    }
}

fn error_message(body: &Value) -> Option<String> {
    let message = match body {
        Value::String(text) => Some(text.as_str()),
        Value::Object(_) => ["erro", "error", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str)),
        _ => None,
    };
    message
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
