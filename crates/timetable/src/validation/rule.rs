//! Field constraints and their evaluation.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

// Standard address syntax; any top-level domain is accepted.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .unwrap()
});

/// Discriminant of a [`Constraint`], used to key custom messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Required,
    Empty,
    Text,
    MinLength,
    MaxLength,
    Email,
    Pattern,
    OneOf,
    Number,
    Integer,
    Between,
    AtLeastField,
}

/// A single declarative check on one field.
///
/// `Required` and `DefaultsTo` decide what happens when the field is absent;
/// the rest only run on a present value, in declaration order.
#[derive(Debug, Clone)]
pub enum Constraint {
    Required,
    /// Present values must be non-empty strings.
    Text,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Pattern(&'static LazyLock<Regex>),
    OneOf(&'static [&'static str]),
    /// Present values must be whole numbers (numeric strings are accepted).
    Integer,
    Between(i64, i64),
    /// Numeric value must be at least the named sibling field's value.
    AtLeastField(&'static str),
    /// Value assumed when the field is absent.
    DefaultsTo(&'static str),
}

/// Every constraint on one field plus the label used in messages.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: &'static str,
    pub label: &'static str,
    pub constraints: Vec<Constraint>,
    messages: Vec<(RuleKind, &'static str)>,
}

impl FieldRule {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            label: field,
            constraints: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Human-readable name shown instead of the raw field identifier.
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn required(self) -> Self {
        self.with(Constraint::Required)
    }

    /// Required non-empty string.
    pub fn required_text(self) -> Self {
        self.required().with(Constraint::Text)
    }

    /// Replaces the default message for one kind of failure.
    pub fn message(mut self, kind: RuleKind, message: &'static str) -> Self {
        self.messages.push((kind, message));
        self
    }

    pub fn is_required(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Required))
    }

    pub fn default_value(&self) -> Option<&'static str> {
        self.constraints.iter().find_map(|c| match c {
            Constraint::DefaultsTo(v) => Some(*v),
            _ => None,
        })
    }

    /// Returns the first failing rule's message, or `None` if the field
    /// passes.
    pub fn check(&self, data: &Map<String, Value>) -> Option<String> {
        let value = match data.get(self.field) {
            None | Some(Value::Null) => {
                return if self.is_required() {
                    Some(self.fail(RuleKind::Required, format!("\"{}\" is required", self.label)))
                } else {
                    None
                };
            }
            Some(v) => v,
        };

        for constraint in &self.constraints {
            if let Err((kind, default)) = self.check_one(constraint, value, data) {
                return Some(self.fail(kind, default));
            }
        }
        None
    }

    fn fail(&self, kind: RuleKind, default: String) -> String {
        self.messages
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, m)| m.to_string())
            .unwrap_or(default)
    }

    fn check_one(
        &self,
        constraint: &Constraint,
        value: &Value,
        data: &Map<String, Value>,
    ) -> Result<(), (RuleKind, String)> {
        let label = self.label;
        match constraint {
            Constraint::Required | Constraint::DefaultsTo(_) => Ok(()),
            Constraint::Text => match value {
                Value::String(s) if s.is_empty() => Err((
                    RuleKind::Empty,
                    format!("\"{label}\" is not allowed to be empty"),
                )),
                Value::String(_) => Ok(()),
                _ => Err((RuleKind::Text, format!("\"{label}\" must be a string"))),
            },
            Constraint::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => Err((
                    RuleKind::MinLength,
                    format!("\"{label}\" length must be at least {min} characters long"),
                )),
                _ => Ok(()),
            },
            Constraint::MaxLength(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => Err((
                    RuleKind::MaxLength,
                    format!("\"{label}\" length must be less than or equal to {max} characters long"),
                )),
                _ => Ok(()),
            },
            Constraint::Email => match value.as_str() {
                Some(s) if is_valid_email(s) => Ok(()),
                _ => Err((RuleKind::Email, format!("\"{label}\" must be a valid email"))),
            },
            Constraint::Pattern(regex) => match value.as_str() {
                Some(s) if regex.is_match(s) => Ok(()),
                _ => Err((
                    RuleKind::Pattern,
                    format!(
                        "\"{label}\" with value \"{}\" fails to match the required pattern: {}",
                        display_value(value),
                        regex.as_str()
                    ),
                )),
            },
            Constraint::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                _ => Err((
                    RuleKind::OneOf,
                    format!("\"{label}\" must be one of [{}]", allowed.join(", ")),
                )),
            },
            Constraint::Integer => match as_number(value) {
                None => Err((RuleKind::Number, format!("\"{label}\" must be a number"))),
                Some(n) if n.fract() != 0.0 => {
                    Err((RuleKind::Integer, format!("\"{label}\" must be an integer")))
                }
                Some(_) => Ok(()),
            },
            Constraint::Between(min, max) => match as_number(value) {
                Some(n) if n < *min as f64 => Err((
                    RuleKind::Between,
                    format!("\"{label}\" must be greater than or equal to {min}"),
                )),
                Some(n) if n > *max as f64 => Err((
                    RuleKind::Between,
                    format!("\"{label}\" must be less than or equal to {max}"),
                )),
                _ => Ok(()),
            },
            Constraint::AtLeastField(other) => {
                // An unresolvable sibling reports its own error.
                let Some(floor) = data.get(*other).and_then(as_number) else {
                    return Ok(());
                };
                match as_number(value) {
                    Some(n) if n < floor => Err((
                        RuleKind::AtLeastField,
                        format!("\"{label}\" must be greater than or equal to ref:{other}"),
                    )),
                    _ => Ok(()),
                }
            }
        }
    }
}

/// Numbers and numeric strings both resolve, as form inputs arrive as text.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Checks address syntax: a local part, `@`, and a dotted domain.
pub fn is_valid_email(s: &str) -> bool {
    if !EMAIL_REGEX.is_match(s) {
        return false;
    }
    let local = s.split('@').next().unwrap_or_default();
    !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}
