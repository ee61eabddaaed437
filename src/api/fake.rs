//! In-memory stand-in for the REST backend, speaking the same wire contract.

use std::collections::{BTreeMap, HashMap};
use std::future::{Future, ready};
use std::sync::Mutex;

use serde_json::{Value, json};

use super::{ApiRequest, ApiResponse, Method, Transport};
use crate::config::normalize_root;
use crate::error::ServiceError;
use crate::models::EntityKind;

#[derive(Default)]
struct FakeState {
    records: HashMap<EntityKind, BTreeMap<i32, Value>>,
    next_id: i32,
    requests: Vec<ApiRequest>,
    offline: bool,
    /// `Some(message)` answers saves with 200 and no id.
    reject_saves: Option<Option<String>>,
    fail_deletes: Option<u16>,
    ignore_id_filter: bool,
}

pub struct FakeBackend {
    root: String,
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new(root: &str) -> Self {
        Self {
            root: normalize_root(root),
            state: Mutex::new(FakeState {
                next_id: 1,
                ..FakeState::default()
            }),
        }
    }

    pub fn with_next_id(self, next_id: i32) -> Self {
        self.state.lock().unwrap().next_id = next_id;
        self
    }

    /// Stores a record as if it had been created, returning its id.
    pub fn seed(&self, kind: EntityKind, record: Value) -> i32 {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id;
        state.next_id += 1;
        state.records.entry(kind).or_default().insert(id, with_id(kind, record, id));
        id
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn reject_saves(&self, message: Option<&str>) {
        self.state.lock().unwrap().reject_saves = Some(message.map(str::to_string));
    }

    pub fn fail_deletes(&self, status: Option<u16>) {
        self.state.lock().unwrap().fail_deletes = status;
    }

    /// Makes `/one` answer with every record, like a backend ignoring the filter.
    pub fn ignore_id_filter(&self) {
        self.state.lock().unwrap().ignore_id_filter = true;
    }

    fn handle(&self, request: ApiRequest) -> Result<ApiResponse, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());

        if state.offline {
            return Err(ServiceError::Network("connection refused".to_string()));
        }

        let Some(path) = request.url.strip_prefix(&self.root) else {
            return Ok(reply(404, json!({"erro": "unknown root"})));
        };
        let (resource, tail) = path.split_once('/').unwrap_or((path, ""));
        let Some(kind) = EntityKind::ALL.into_iter().find(|k| k.resource() == resource) else {
            return Ok(reply(404, json!({"erro": "unknown resource"})));
        };
        let id = request
            .query
            .iter()
            .find(|(key, _)| key == kind.id_key())
            .and_then(|(_, value)| value.parse::<i32>().ok());

        let response = match (request.method, tail, id) {
            (Method::Get, "all", _) => {
                let all: Vec<Value> = state.records.get(&kind).map(|r| r.values().cloned().collect()).unwrap_or_default();
                reply(200, Value::Array(all))
            }
            (Method::Get, "one", Some(id)) => {
                let ignore = state.ignore_id_filter;
                let found: Vec<Value> = state
                    .records
                    .get(&kind)
                    .map(|r| {
                        r.iter()
                            .filter(|(key, _)| ignore || **key == id)
                            .map(|(_, v)| v.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                reply(200, Value::Array(found))
            }
            (Method::Post, "", _) => {
                if let Some(message) = state.reject_saves.clone() {
                    return Ok(rejection(message));
                }
                let id = state.next_id;
                state.next_id += 1;
                let record = with_id(kind, request.body.unwrap_or(Value::Null), id);
                state.records.entry(kind).or_default().insert(id, record);
                reply(200, json!({ "id": id }))
            }
            (Method::Put, "", Some(id)) => {
                if let Some(message) = state.reject_saves.clone() {
                    return Ok(rejection(message));
                }
                let records = state.records.entry(kind).or_default();
                if !records.contains_key(&id) {
                    return Ok(reply(404, json!({"erro": "record not found"})));
                }
                let record = with_id(kind, request.body.unwrap_or(Value::Null), id);
                records.insert(id, record);
                reply(200, json!({ "id": id }))
            }
            (Method::Delete, "", Some(id)) => {
                if let Some(status) = state.fail_deletes {
                    return Ok(reply(status, json!({"erro": "delete failed"})));
                }
                let removed = state.records.entry(kind).or_default().remove(&id).is_some();
                reply(200, json!({ "affectedRows": u8::from(removed) }))
            }
            _ => reply(404, json!({"erro": "no route"})),
        };

        Ok(response)
    }
}

impl Transport for FakeBackend {
    fn send(&self, request: ApiRequest) -> impl Future<Output = Result<ApiResponse, ServiceError>> + Send {
        ready(self.handle(request))
    }
}

fn reply(status: u16, body: Value) -> ApiResponse {
    ApiResponse { status, body }
}

fn rejection(message: Option<String>) -> ApiResponse {
    match message {
        Some(message) => reply(200, json!({ "erro": message })),
        None => reply(200, json!({})),
    }
}

fn with_id(kind: EntityKind, record: Value, id: i32) -> Value {
    let mut object = match record {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    object.insert(kind.id_key().to_string(), json!(id));
    Value::Object(object)
}
