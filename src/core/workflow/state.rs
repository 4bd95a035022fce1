//! State variants and the `type`-discriminated (de)serialization that maps a
//! generic document node onto them.
//!
//! Reading goes through [`dispatch_state`]: the `type` field picks the concrete
//! shape, matched case-insensitively, and anything unrecognised falls back to
//! [`DefaultState`]. Writing goes through [`State::normalized`], which fills in
//! a generated id, the canonical `type`, and a per-variant default name before
//! the concrete fields are emitted.

use crate::core::workflow::choice::Choice;
use crate::core::workflow::ids::generate_unique_id;
use crate::core::workflow::model::{Action, ActionMode, Branch, Event, Filter};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

pub const DISCRIMINATOR_FIELD: &str = "type";

/// Canonical state discriminator values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateType {
    Event,
    Operation,
    Switch,
    Delay,
    Parallel,
    End,
}

impl StateType {
    pub const ALL: [StateType; 6] = [
        StateType::Event,
        StateType::Operation,
        StateType::Switch,
        StateType::Delay,
        StateType::Parallel,
        StateType::End,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Event => "EVENT",
            StateType::Operation => "OPERATION",
            StateType::Switch => "SWITCH",
            StateType::Delay => "DELAY",
            StateType::Parallel => "PARALLEL",
            StateType::End => "END",
        }
    }

    /// Case-insensitive lookup of a discriminator value.
    pub fn from_discriminator(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(text.trim()))
    }

    /// Name assigned on write when a state of this type has none.
    pub fn default_name(&self) -> &'static str {
        match self {
            StateType::Event => "eventstate",
            StateType::Operation => "operationstate",
            StateType::Switch => "switchstate",
            StateType::Delay => "delaystate",
            StateType::Parallel => "parallelstate",
            StateType::End => "endstate",
        }
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status reported by an end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndStatus {
    Success,
    Failure,
}

impl EndStatus {
    pub const VALUES: [&'static str; 2] = ["SUCCESS", "FAILURE"];
}

/// Failure to pick or build a concrete state from a document node.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("state discriminator `type` must be text, found {0}")]
    MalformedDiscriminator(String),
    #[error("invalid {kind} state: {source}")]
    Materialize {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

macro_rules! impl_state_header {
    ($ty:ty) => {
        impl $ty {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_id(mut self, id: impl Into<String>) -> Self {
                self.id = Some(id.into());
                self
            }

            pub fn with_name(mut self, name: impl Into<String>) -> Self {
                self.name = Some(name.into());
                self
            }
        }
    };
    ($ty:ty, startable) => {
        impl_state_header!($ty);

        impl $ty {
            pub fn with_start(mut self, start: bool) -> Self {
                self.start = start;
                self
            }

            pub fn with_end(mut self, end: bool) -> Self {
                self.end = Some(end);
                self
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl_state_header!(EventState, startable);

impl EventState {
    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_mode: Option<ActionMode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

impl_state_header!(OperationState, startable);

impl OperationState {
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

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SwitchState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl_state_header!(SwitchState, startable);

impl SwitchState {
    pub fn with_choices(mut self, choices: Vec<Choice>) -> Self {
        self.choices = choices;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DelayState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

impl_state_header!(DelayState, startable);

impl DelayState {
    pub fn with_time_delay(mut self, time_delay: u64) -> Self {
        self.time_delay = Some(time_delay);
        self
    }

    pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
        self.next_state = Some(next_state.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParallelState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    #[serde(default)]
    pub branches: Vec<Branch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

impl_state_header!(ParallelState, startable);

impl ParallelState {
    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
        self.next_state = Some(next_state.into());
        self
    }
}

/// Terminal state. It never starts a workflow, so it carries no start flag;
/// a `start` key in the source document is ignored and `false` is always written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EndStatus>,
}

impl_state_header!(EndState);

impl EndState {
    pub fn with_status(mut self, status: EndStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Fallback for nodes whose discriminator is absent or unrecognised.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DefaultState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub start: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<bool>,
    /// Discriminator text as it appeared in the source document.
    #[serde(skip)]
    pub raw_type: Option<String>,
}

impl_state_header!(DefaultState, startable);

impl DefaultState {
    pub fn with_raw_type(mut self, raw_type: impl Into<String>) -> Self {
        self.raw_type = Some(raw_type.into());
        self
    }
}

/// One node of the workflow control graph.
#[derive(Debug, Clone, PartialEq)]
pub enum State {
    Event(EventState),
    Operation(OperationState),
    Switch(SwitchState),
    Delay(DelayState),
    Parallel(ParallelState),
    End(EndState),
    Default(DefaultState),
}

impl State {
    /// Canonical type; `None` for the generic fallback.
    pub fn kind(&self) -> Option<StateType> {
        match self {
            State::Event(_) => Some(StateType::Event),
            State::Operation(_) => Some(StateType::Operation),
            State::Switch(_) => Some(StateType::Switch),
            State::Delay(_) => Some(StateType::Delay),
            State::Parallel(_) => Some(StateType::Parallel),
            State::End(_) => Some(StateType::End),
            State::Default(_) => None,
        }
    }

    /// Discriminator text this state is written with.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            State::Default(state) => state.raw_type.as_deref(),
            other => other.kind().map(|kind| kind.as_str()),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            State::Event(s) => s.id.as_deref(),
            State::Operation(s) => s.id.as_deref(),
            State::Switch(s) => s.id.as_deref(),
            State::Delay(s) => s.id.as_deref(),
            State::Parallel(s) => s.id.as_deref(),
            State::End(s) => s.id.as_deref(),
            State::Default(s) => s.id.as_deref(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            State::Event(s) => s.name.as_deref(),
            State::Operation(s) => s.name.as_deref(),
            State::Switch(s) => s.name.as_deref(),
            State::Delay(s) => s.name.as_deref(),
            State::Parallel(s) => s.name.as_deref(),
            State::End(s) => s.name.as_deref(),
            State::Default(s) => s.name.as_deref(),
        }
    }

    pub fn is_start(&self) -> bool {
        match self {
            State::Event(s) => s.start,
            State::Operation(s) => s.start,
            State::Switch(s) => s.start,
            State::Delay(s) => s.start,
            State::Parallel(s) => s.start,
            State::End(_) => false,
            State::Default(s) => s.start,
        }
    }

    pub fn end(&self) -> Option<bool> {
        match self {
            State::Event(s) => s.end,
            State::Operation(s) => s.end,
            State::Switch(s) => s.end,
            State::Delay(s) => s.end,
            State::Parallel(s) => s.end,
            State::End(_) => Some(true),
            State::Default(s) => s.end,
        }
    }

    /// Transition target for the variants that have a single one.
    pub fn next_state(&self) -> Option<&str> {
        match self {
            State::Operation(s) => s.next_state.as_deref(),
            State::Delay(s) => s.next_state.as_deref(),
            State::Parallel(s) => s.next_state.as_deref(),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventState> {
        match self {
            State::Event(state) => Some(state),
            _ => None,
        }
    }

    fn header_mut(&mut self) -> (&mut Option<String>, &mut Option<String>) {
        match self {
            State::Event(s) => (&mut s.id, &mut s.name),
            State::Operation(s) => (&mut s.id, &mut s.name),
            State::Switch(s) => (&mut s.id, &mut s.name),
            State::Delay(s) => (&mut s.id, &mut s.name),
            State::Parallel(s) => (&mut s.id, &mut s.name),
            State::End(s) => (&mut s.id, &mut s.name),
            State::Default(s) => (&mut s.id, &mut s.name),
        }
    }

    /// Copy of this state with write-time defaults applied: a generated id when
    /// none is set, and the per-variant default name when the name is empty.
    /// The receiver is left untouched.
    pub fn normalized(&self) -> State {
        let mut state = self.clone();
        let default_name = state.kind().map(|kind| kind.default_name());
        let (id, name) = state.header_mut();
        if id.as_deref().map_or(true, str::is_empty) {
            *id = Some(generate_unique_id());
        }
        if let Some(default_name) = default_name {
            if name.as_deref().map_or(true, str::is_empty) {
                *name = Some(default_name.to_string());
            }
        }
        state
    }
}

/// Pick the concrete state for `node` from its `type` field and build it.
pub fn dispatch_state(node: Value) -> Result<State, DispatchError> {
    let discriminator = discriminator_text(&node)?;
    let kind = discriminator.as_deref().and_then(StateType::from_discriminator);
    tracing::debug!(
        discriminator = discriminator.as_deref().unwrap_or(""),
        kind = kind.map(|k| k.as_str()).unwrap_or("DEFAULT"),
        "dispatching state"
    );

    let state = match kind {
        Some(StateType::Event) => State::Event(materialize(node, "EVENT")?),
        Some(StateType::Operation) => State::Operation(materialize(node, "OPERATION")?),
        Some(StateType::Switch) => State::Switch(materialize(node, "SWITCH")?),
        Some(StateType::Delay) => State::Delay(materialize(node, "DELAY")?),
        Some(StateType::Parallel) => State::Parallel(materialize(node, "PARALLEL")?),
        Some(StateType::End) => State::End(materialize(node, "END")?),
        None => {
            let mut state: DefaultState = materialize(node, "default")?;
            state.raw_type = discriminator;
            State::Default(state)
        }
    };
    Ok(state)
}

fn discriminator_text(node: &Value) -> Result<Option<String>, DispatchError> {
    match node.get(DISCRIMINATOR_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(other) => Err(DispatchError::MalformedDiscriminator(other.to_string())),
    }
}

fn materialize<T: serde::de::DeserializeOwned>(
    node: Value,
    kind: &str,
) -> Result<T, DispatchError> {
    serde_json::from_value(node).map_err(|source| DispatchError::Materialize {
        kind: kind.to_string(),
        source,
    })
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        dispatch_state(node).map_err(D::Error::custom)
    }
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(flatten)]
    state: &'a T,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<bool>,
}

impl<'a, T: Serialize> Tagged<'a, T> {
    fn new(kind: StateType, state: &'a T) -> Self {
        Self {
            state,
            kind: Some(kind.as_str()),
            start: None,
        }
    }
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let state = self.normalized();
        match &state {
            State::Event(s) => Tagged::new(StateType::Event, s).serialize(serializer),
            State::Operation(s) => Tagged::new(StateType::Operation, s).serialize(serializer),
            State::Switch(s) => Tagged::new(StateType::Switch, s).serialize(serializer),
            State::Delay(s) => Tagged::new(StateType::Delay, s).serialize(serializer),
            State::Parallel(s) => Tagged::new(StateType::Parallel, s).serialize(serializer),
            State::End(s) => Tagged {
                state: s,
                kind: Some(StateType::End.as_str()),
                start: Some(false),
            }
            .serialize(serializer),
            State::Default(s) => Tagged {
                state: s,
                kind: s.raw_type.as_deref(),
                start: None,
            }
            .serialize(serializer),
        }
    }
}

macro_rules! impl_into_state {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for State {
                fn from(state: $ty) -> Self {
                    State::$variant(state)
                }
            }
        )*
    };
}

impl_into_state!(
    EventState => Event,
    OperationState => Operation,
    SwitchState => Switch,
    DelayState => Delay,
    ParallelState => Parallel,
    EndState => End,
    DefaultState => Default,
);
