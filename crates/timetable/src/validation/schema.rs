//! The named schemas every form is checked against.

use super::rule::{Constraint, FieldRule, RuleKind};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static MOBILE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

const MOBILE_MESSAGE: &str = "Please enter a valid 10-digit mobile number";

/// Which form is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    Login,
    Signup,
    JoinInvitation,
    ChangePassword,
    TimetableEntry,
    Faculty,
    Staff,
}

impl SchemaName {
    pub fn schema(&self) -> &'static Schema {
        match self {
            SchemaName::Login => &LOGIN,
            SchemaName::Signup => &SIGNUP,
            SchemaName::JoinInvitation => &JOIN_INVITATION,
            SchemaName::ChangePassword => &CHANGE_PASSWORD,
            SchemaName::TimetableEntry => &TIMETABLE_ENTRY,
            SchemaName::Faculty => &FACULTY,
            SchemaName::Staff => &STAFF,
        }
    }
}

/// An ordered list of field rules. Fields not listed are ignored.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: SchemaName,
    pub fields: Vec<FieldRule>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Fills absent fields that declare a default.
    pub fn apply_defaults(&self, data: &mut Map<String, Value>) {
        for rule in &self.fields {
            if let Some(default) = rule.default_value() {
                let absent = matches!(data.get(rule.field), None | Some(Value::Null));
                if absent {
                    data.insert(rule.field.to_string(), Value::String(default.to_string()));
                }
            }
        }
    }
}

fn email_field() -> FieldRule {
    FieldRule::new("email").required_text().with(Constraint::Email)
}

fn password_field(field: &'static str) -> FieldRule {
    FieldRule::new(field)
        .required_text()
        .with(Constraint::MinLength(6))
}

fn full_name_field() -> FieldRule {
    FieldRule::new("username")
        .label("Full Name")
        .required_text()
        .with(Constraint::MinLength(3))
        .with(Constraint::MaxLength(30))
}

fn mobile_field() -> FieldRule {
    FieldRule::new("mobileNo")
        .required_text()
        .with(Constraint::Pattern(&MOBILE_REGEX))
        .message(RuleKind::Pattern, MOBILE_MESSAGE)
}

fn period_field(field: &'static str) -> FieldRule {
    FieldRule::new(field)
        .required()
        .with(Constraint::Integer)
        .with(Constraint::Between(1, 8))
}

static LOGIN: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::Login,
    fields: vec![
        email_field()
            .message(RuleKind::Required, "Email is required")
            .message(RuleKind::Empty, "Email is required")
            .message(RuleKind::Email, "Please enter a valid email address"),
        password_field("password")
            .message(RuleKind::Required, "Password is required")
            .message(RuleKind::Empty, "Password is required")
            .message(RuleKind::MinLength, "Password must be at least 6 characters"),
    ],
});

static SIGNUP: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::Signup,
    fields: vec![
        full_name_field(),
        email_field(),
        password_field("password"),
        FieldRule::new("role")
            .required_text()
            .with(Constraint::OneOf(&["faculty", "supporting_staff"])),
    ],
});

static JOIN_INVITATION: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::JoinInvitation,
    fields: vec![full_name_field(), password_field("password")],
});

static CHANGE_PASSWORD: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::ChangePassword,
    fields: vec![
        FieldRule::new("currentPassword")
            .label("Current Password")
            .required_text(),
        password_field("newPassword").label("New Password"),
    ],
});

static TIMETABLE_ENTRY: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::TimetableEntry,
    fields: vec![
        FieldRule::new("course_code").label("Course Code").required_text(),
        FieldRule::new("subject_name").label("Subject Name").required_text(),
        FieldRule::new("faculty_name").label("Faculty Name").required_text(),
        FieldRule::new("venue").label("Venue").required_text(),
        FieldRule::new("semester").required_text(),
        FieldRule::new("section").required_text(),
        FieldRule::new("day").required_text(),
        period_field("period_number"),
        period_field("end_period").with(Constraint::AtLeastField("period_number")),
        FieldRule::new("type")
            .required_text()
            .with(Constraint::OneOf(&["Theory", "Lab"])),
        FieldRule::new("batch")
            .with(Constraint::OneOf(&["Odd", "Even", "Both"]))
            .with(Constraint::DefaultsTo("Both")),
    ],
});

fn person_fields(experience_field: &'static str) -> Vec<FieldRule> {
    vec![
        FieldRule::new("name").required_text(),
        FieldRule::new("qualification").required_text(),
        FieldRule::new("designation").required_text(),
        FieldRule::new(experience_field).required_text(),
        email_field(),
        mobile_field(),
    ]
}

static FACULTY: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::Faculty,
    fields: person_fields("teachingExp"),
});

static STAFF: LazyLock<Schema> = LazyLock::new(|| Schema {
    name: SchemaName::Staff,
    fields: person_fields("experience"),
});
