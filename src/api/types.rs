//! Wire types for the G-Click task API.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Task category as understood by the `/tarefas` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    /// Compliance obligation (`Obrigacao`).
    Obligation,
    /// Service request (`Solicitacao`).
    Request,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 2] = [TaskCategory::Obligation, TaskCategory::Request];

    /// Value sent in the `categoria` query parameter.
    pub fn query_value(&self) -> &'static str {
        match self {
            Self::Obligation => "Obrigacao",
            Self::Request => "Solicitacao",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Obligation => write!(f, "Obligation"),
            Self::Request => write!(f, "Request"),
        }
    }
}

/// A responsible party: a user who owns tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

impl User {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Read a user out of one entry of the owners listing.
    ///
    /// Returns `None` for non-objects, a missing or non-positive `usuario`, or a
    /// missing or empty `nome`.
    pub fn from_entry(entry: &Value) -> Option<Self> {
        let obj = entry.as_object()?;
        let id = match obj.get("usuario")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        let name = obj.get("nome")?.as_str()?;
        if id <= 0 || name.is_empty() {
            return None;
        }
        Some(Self::new(id, name))
    }
}

/// A task record as returned by the API.
///
/// Only the fields the report needs are typed; everything else is kept in
/// `extra` so the raw dump reproduces the full record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "titulo", default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(rename = "dataAcao", default, deserialize_with = "lenient_string")]
    pub action_date: Option<String>,
    #[serde(rename = "dataConclusao", default, deserialize_with = "lenient_string")]
    pub completion_date: Option<String>,
    #[serde(rename = "dataVencimento", default, deserialize_with = "lenient_string")]
    pub due_date: Option<String>,
    #[serde(rename = "dataCriacao", default, deserialize_with = "lenient_string")]
    pub creation_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept strings, `null`, and scalar values rendered as text.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// A task joined with the owner it was fetched for.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedTask {
    pub task: Task,
    pub owner: User,
    pub category: TaskCategory,
}

/// Shape of a listing response body.
///
/// The API answers listing calls either with a Spring-style page object or,
/// for some endpoints, a bare array. Anything else is reported as
/// `Unexpected` so callers can warn instead of guessing.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// `{ "content": [...], "last": bool }`
    Page { content: Vec<Value>, last: bool },
    /// `[...]`
    Bare(Vec<Value>),
    /// Any other body; holds a short description of what was received.
    Unexpected(String),
}

impl Listing {
    pub fn classify(body: Value) -> Self {
        match body {
            Value::Array(items) => Listing::Bare(items),
            Value::Object(mut obj) => match obj.remove("content") {
                Some(Value::Array(content)) => {
                    let last = obj.get("last").and_then(Value::as_bool).unwrap_or(false);
                    Listing::Page { content, last }
                }
                Some(other) => {
                    Listing::Unexpected(format!("'content' is {}", describe(&other)))
                }
                None => Listing::Unexpected("object without 'content'".to_string()),
            },
            other => Listing::Unexpected(describe(&other).to_string()),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Body of a successful token exchange.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}
