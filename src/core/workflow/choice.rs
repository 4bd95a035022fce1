//! Switch-state choices. A node carrying an `And`, `Not` or `Or` key is a
//! composite wrapping nested choices; anything else is a plain comparison.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

pub const AND_MARKER: &str = "And";
pub const NOT_MARKER: &str = "Not";
pub const OR_MARKER: &str = "Or";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl Operator {
    pub const VALUES: [&'static str; 5] = ["EQ", "LT", "LTE", "GT", "GTE"];
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operator::Eq => "EQ",
            Operator::Lt => "LT",
            Operator::Lte => "LTE",
            Operator::Gt => "GT",
            Operator::Gte => "GTE",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefaultChoice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

impl DefaultChoice {
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            value: Some(value.into()),
            operator: Some(operator),
            next_state: None,
        }
    }

    pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
        self.next_state = Some(next_state.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AndChoice {
    #[serde(rename = "And")]
    pub and: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct OrChoice {
    #[serde(rename = "Or")]
    pub or: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotChoice {
    #[serde(rename = "Not")]
    pub not: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_state: Option<String>,
}

macro_rules! impl_composite {
    ($ty:ident, $field:ident) => {
        impl $ty {
            pub fn new(choices: Vec<Choice>) -> Self {
                Self {
                    $field: choices,
                    next_state: None,
                }
            }

            pub fn with_next_state(mut self, next_state: impl Into<String>) -> Self {
                self.next_state = Some(next_state.into());
                self
            }
        }
    };
}

impl_composite!(AndChoice, and);
impl_composite!(OrChoice, or);
impl_composite!(NotChoice, not);

/// Each variant writes its own marker key, so no tag is needed on output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Choice {
    Default(DefaultChoice),
    And(AndChoice),
    Or(OrChoice),
    Not(NotChoice),
}

impl Choice {
    pub fn next_state(&self) -> Option<&str> {
        match self {
            Choice::Default(choice) => choice.next_state.as_deref(),
            Choice::And(choice) => choice.next_state.as_deref(),
            Choice::Or(choice) => choice.next_state.as_deref(),
            Choice::Not(choice) => choice.next_state.as_deref(),
        }
    }

    /// Nested choices of a composite; empty for a plain comparison.
    pub fn children(&self) -> &[Choice] {
        match self {
            Choice::Default(_) => &[],
            Choice::And(choice) => &choice.and,
            Choice::Or(choice) => &choice.or,
            Choice::Not(choice) => &choice.not,
        }
    }
}

/// Pick the choice variant by marker key presence, checked in And, Not, Or order.
pub fn dispatch_choice(node: Value) -> Result<Choice, serde_json::Error> {
    let has = |marker: &str| node.get(marker).is_some();
    if has(AND_MARKER) {
        serde_json::from_value(node).map(Choice::And)
    } else if has(NOT_MARKER) {
        serde_json::from_value(node).map(Choice::Not)
    } else if has(OR_MARKER) {
        serde_json::from_value(node).map(Choice::Or)
    } else {
        serde_json::from_value(node).map(Choice::Default)
    }
}

impl<'de> Deserialize<'de> for Choice {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let node = Value::deserialize(deserializer)?;
        dispatch_choice(node).map_err(D::Error::custom)
    }
}

impl From<DefaultChoice> for Choice {
    fn from(choice: DefaultChoice) -> Self {
        Choice::Default(choice)
    }
}

impl From<AndChoice> for Choice {
    fn from(choice: AndChoice) -> Self {
        Choice::And(choice)
    }
}

impl From<OrChoice> for Choice {
    fn from(choice: OrChoice) -> Self {
        Choice::Or(choice)
    }
}

impl From<NotChoice> for Choice {
    fn from(choice: NotChoice) -> Self {
        Choice::Not(choice)
    }
}
