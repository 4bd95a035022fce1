//! Workflow document model: the root definition, trigger events, and the
//! building blocks (events, actions, branches) shared by the state variants.

use crate::core::workflow::state::{EndState, EventState, State};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root of a workflow definition.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Workflow {
    #[serde(
        default,
        deserialize_with = "scalar_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text::required",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "scalar_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalar_text::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub owner: Option<String>,
    #[serde(
        rename = "trigger-defs",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub trigger_defs: Vec<TriggerEvent>,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(
        default,
        deserialize_with = "scalar_text::map",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub metadata: IndexMap<String, String>,
}

/// Root metadata fields are text. YAML writes `version: 1.0` as a float, so
/// numbers and booleans are taken in their text form.
mod scalar_text {
    use indexmap::IndexMap;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn text<E: serde::de::Error>(value: Value) -> Result<Option<String>, E> {
        match value {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            other => Err(E::custom(format!(
                "invalid type: expected a string, found {}",
                other
            ))),
        }
    }

    pub fn option<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        text(Value::deserialize(deserializer)?)
    }

    pub fn required<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(option(deserializer)?.unwrap_or_default())
    }

    pub fn map<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, String>, D::Error> {
        let raw = Option::<IndexMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        raw.into_iter()
            .map(|(key, value)| {
                let value = text::<D::Error>(value)?
                    .ok_or_else(|| D::Error::custom(format!("metadata `{}` has no value", key)))?;
                Ok((key, value))
            })
            .collect()
    }
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_trigger_defs(mut self, trigger_defs: Vec<TriggerEvent>) -> Self {
        self.trigger_defs = trigger_defs;
        self
    }

    pub fn with_states(mut self, states: Vec<State>) -> Self {
        self.states = states;
        self
    }

    pub fn with_state(mut self, state: impl Into<State>) -> Self {
        self.states.push(state.into());
        self
    }

    pub fn with_metadata<K, V, I>(mut self, metadata: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.metadata = metadata
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    pub fn has_triggers(&self) -> bool {
        !self.trigger_defs.is_empty()
    }

    pub fn has_states(&self) -> bool {
        !self.states.is_empty()
    }

    /// First state flagged as the start state.
    pub fn start_state(&self) -> Option<&State> {
        self.states.iter().find(|state| state.is_start())
    }

    pub fn state_by_name(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|state| state.name() == Some(name))
    }

    pub fn has_end_state(&self) -> bool {
        self.states.iter().any(|state| matches!(state, State::End(_)))
    }

    /// Event states in document order.
    pub fn event_states(&self) -> impl Iterator<Item = &EventState> {
        self.states.iter().filter_map(State::as_event)
    }

    pub fn end_states(&self) -> impl Iterator<Item = &EndState> {
        self.states.iter().filter_map(|state| match state {
            State::End(end) => Some(end),
            _ => None,
        })
    }
}

/// Externally named event definition that can activate event states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TriggerEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_token: Option<String>,
}

impl TriggerEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    pub fn with_correlation_token(mut self, token: impl Into<String>) -> Self {
        self.correlation_token = Some(token.into());
        self
    }

    /// Name used for expression matching; empty when unset.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// How the actions of an event or operation state are run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionMode {
    Sequential,
    Parallel,
}

impl ActionMode {
    pub const VALUES: [&'static str; 2] = ["SEQUENTIAL", "PARALLEL"];
}

/// One event an event state waits for.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_mode: Option<ActionMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

impl Event {
    pub fn new(event_expression: impl Into<String>) -> Self {
        Self {
            event_expression: Some(event_expression.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    pub fn with_action_mode(mut self, action_mode: ActionMode) -> Self {
        self.action_mode = Some(action_mode);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
        self.next_state = Some(next_state.into());
        self
    }
}

/// Function invocation performed by a state.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<Function>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<Retry>,
}

impl Action {
    pub fn new(function: Function) -> Self {
        Self {
            function: Some(function),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = Some(retry);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Function {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, String>,
}

impl Function {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Retry {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub match_expression: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retry: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

impl Retry {
    pub fn new(match_expression: impl Into<String>) -> Self {
        Self {
            match_expression: Some(match_expression.into()),
            ..Self::default()
        }
    }

    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = Some(max_retry);
        self
    }

    pub fn with_retry_interval(mut self, retry_interval: u64) -> Self {
        self.retry_interval = Some(retry_interval);
        self
    }

    pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
        self.next_state = Some(next_state.into());
        self
    }
}

/// Data filter applied around an operation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Filter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
}

/// Named sub-graph run by a parallel state.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Branch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub states: Vec<State>,
}

impl Branch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            states: Vec::new(),
        }
    }

    pub fn with_states(mut self, states: Vec<State>) -> Self {
        self.states = states;
        self
    }
}
