//! Schema-driven validation of form payloads.
//!
//! Every write is checked here before any request leaves the client. A
//! schema is a list of [`FieldRule`]s, each a list of declarative
//! [`Constraint`]s; cross-field rules name the sibling field they compare
//! against. Validation is not fail-fast: every failing field is reported,
//! each with the message of its first failing rule, in schema order.

mod rule;
mod schema;

pub use rule::{is_valid_email, Constraint, FieldRule, RuleKind};
pub use schema::{Schema, SchemaName};

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every failing field of a payload, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", self.first_message())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// The message a form shows: the first failing field's.
    pub fn first_message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or_default()
    }

    /// Message for one field, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Field name to message mapping.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.errors
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }
}

/// Validates `data` against the named schema.
///
/// Returns `None` when every field passes. Anything other than a JSON object
/// is treated as an empty form.
pub fn validate(data: &Value, schema: SchemaName) -> Option<ValidationErrors> {
    let empty = Map::new();
    let fields = data.as_object().unwrap_or(&empty);

    let errors: Vec<FieldError> = schema
        .schema()
        .fields
        .iter()
        .filter_map(|rule| {
            rule.check(fields).map(|message| FieldError {
                field: rule.field.to_string(),
                message,
            })
        })
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(ValidationErrors { errors })
    }
}

/// Serializes a typed form and validates it.
pub fn validate_record<T: Serialize>(record: &T, schema: SchemaName) -> Option<ValidationErrors> {
    let data = serde_json::to_value(record).unwrap_or(Value::Null);
    validate(&data, schema)
}

/// Which password form a confirmation check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordFlow {
    Reset,
    Change,
}

impl PasswordFlow {
    pub fn mismatch_message(&self) -> &'static str {
        match self {
            PasswordFlow::Reset => "Passwords don't match",
            PasswordFlow::Change => "New passwords don't match",
        }
    }
}

/// Confirmation pre-check run before any schema validation.
pub fn check_password_confirmation(
    password: &str,
    confirmation: &str,
    flow: PasswordFlow,
) -> Result<(), &'static str> {
    if password == confirmation {
        Ok(())
    } else {
        Err(flow.mismatch_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_entry() -> Value {
        json!({
            "semester": "I",
            "section": "A",
            "day": "Monday",
            "period_number": 2,
            "end_period": 4,
            "course_code": "CS101",
            "subject_name": "Programming in C",
            "faculty_name": "Dr. Anitha",
            "venue": "Room 204",
            "type": "Theory",
            "batch": "Both",
            "lab_name": "",
            "start_time": "09:50 AM",
            "end_time": "12:40 PM",
            "repeatDays": ["Wednesday"]
        })
    }

    fn valid_faculty() -> Value {
        json!({
            "name": "Dr. Priya",
            "qualification": "Ph.D",
            "designation": "Professor",
            "teachingExp": "12 Years",
            "email": "priya@college.edu",
            "mobileNo": "1234567890"
        })
    }

    #[test]
    fn test_login_reports_both_fields() {
        let errors = validate(&json!({"email": "bad", "password": "12345"}), SchemaName::Login)
            .expect("should fail");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(errors.first_message(), "Please enter a valid email address");
    }

    #[test]
    fn test_errors_display_first_message() {
        let errors = validate(&json!({"email": "bad"}), SchemaName::Login).unwrap();
        assert_eq!(errors.to_string(), "Please enter a valid email address");
        let boxed: Box<dyn std::error::Error> = Box::new(errors);
        assert_eq!(boxed.to_string(), "Please enter a valid email address");
    }

    #[test]
    fn test_login_accepts_valid_credentials() {
        assert_eq!(
            validate(&json!({"email": "a@b.com", "password": "abcdef"}), SchemaName::Login),
            None
        );
    }

    #[test]
    fn test_login_required_messages() {
        let errors = validate(&json!({"email": ""}), SchemaName::Login).unwrap();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }

    #[test]
    fn test_signup_role_and_name() {
        let errors = validate(
            &json!({
                "username": "Jo",
                "email": "jo@college.edu",
                "password": "secret1",
                "role": "admin"
            }),
            SchemaName::Signup,
        )
        .unwrap();
        assert_eq!(
            errors.get("username"),
            Some("\"Full Name\" length must be at least 3 characters long")
        );
        assert_eq!(
            errors.get("role"),
            Some("\"role\" must be one of [faculty, supporting_staff]")
        );
        assert!(!errors.contains("email"));
    }

    #[test]
    fn test_join_invitation_needs_no_email() {
        assert_eq!(
            validate(
                &json!({"username": "Lakshmi", "password": "hunter22"}),
                SchemaName::JoinInvitation
            ),
            None
        );
    }

    #[test]
    fn test_change_password_labels() {
        let errors = validate(
            &json!({"currentPassword": "", "newPassword": "abc"}),
            SchemaName::ChangePassword,
        )
        .unwrap();
        assert_eq!(
            errors.get("currentPassword"),
            Some("\"Current Password\" is not allowed to be empty")
        );
        assert_eq!(
            errors.get("newPassword"),
            Some("\"New Password\" length must be at least 6 characters long")
        );
    }

    #[test]
    fn test_timetable_entry_valid() {
        assert_eq!(validate(&valid_entry(), SchemaName::TimetableEntry), None);
    }

    #[test]
    fn test_timetable_entry_end_before_start() {
        let mut data = valid_entry();
        data["period_number"] = json!(3);
        data["end_period"] = json!(2);
        let errors = validate(&data, SchemaName::TimetableEntry).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("end_period"));
    }

    #[test]
    fn test_timetable_entry_collects_every_field() {
        let errors = validate(
            &json!({"course_code": "", "type": "Seminar", "batch": "All"}),
            SchemaName::TimetableEntry,
        )
        .unwrap();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "course_code",
                "subject_name",
                "faculty_name",
                "venue",
                "semester",
                "section",
                "day",
                "period_number",
                "end_period",
                "type",
                "batch"
            ]
        );
        assert_eq!(errors.first_message(), "\"Course Code\" is not allowed to be empty");
    }

    #[test]
    fn test_timetable_entry_batch_optional() {
        let mut data = valid_entry();
        data.as_object_mut().unwrap().remove("batch");
        assert_eq!(validate(&data, SchemaName::TimetableEntry), None);
    }

    #[test]
    fn test_faculty_mobile_pattern() {
        let mut data = valid_faculty();
        data["mobileNo"] = json!("12345");
        let errors = validate(&data, SchemaName::Faculty).unwrap();
        assert_eq!(
            errors.get("mobileNo"),
            Some("Please enter a valid 10-digit mobile number")
        );

        data["mobileNo"] = json!("1234567890");
        assert_eq!(validate(&data, SchemaName::Faculty), None);
    }

    #[test]
    fn test_staff_requires_experience() {
        let mut data = valid_faculty();
        let exp = data.as_object_mut().unwrap().remove("teachingExp").unwrap();
        assert!(validate(&data, SchemaName::Staff)
            .unwrap()
            .contains("experience"));
        data["experience"] = exp;
        assert_eq!(validate(&data, SchemaName::Staff), None);
    }

    #[test]
    fn test_non_object_is_empty_form() {
        let errors = validate(&json!("nope"), SchemaName::Login).unwrap();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_password_confirmation_precheck() {
        assert_eq!(
            check_password_confirmation("abcdef", "abcdeg", PasswordFlow::Reset),
            Err("Passwords don't match")
        );
        assert_eq!(
            check_password_confirmation("abcdef", "abcdeg", PasswordFlow::Change),
            Err("New passwords don't match")
        );
        // Runs independently of the schema's length rule.
        assert_eq!(
            check_password_confirmation("abc", "abc", PasswordFlow::Reset),
            Ok(())
        );
    }
}
