//! Student roster, faculty and supporting-staff endpoints.

use super::{require_role, require_session, ApiClient, ApiError};
use crate::auth::AuthContext;
use crate::types::{
    Faculty, FacultyDraft, RecordId, Role, Staff, StaffDraft, Student, StudentDraft, StudentYear,
};
use crate::validation::{validate_record, SchemaName};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use std::path::Path;

const OPERATION_FAILED: &str = "Operation failed";
const STAFF_SAVE_FAILED: &str = "Error saving staff";

/// Student body: the form plus the roster year it belongs to.
#[derive(Serialize)]
struct StudentPayload<'a> {
    #[serde(flatten)]
    draft: &'a StudentDraft,
    year: StudentYear,
}

/// An image attached to a staff record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePhoto {
    file_name: String,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl ProfilePhoto {
    /// Accepts JPEG, JPG, PNG and GIF images, judged by file extension.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ApiError> {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match extension.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            _ => return Err(ApiError::InvalidPhotoType { extension }),
        };
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Reads and checks an image from disk.
    pub async fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        // Check the type before reading a possibly large file.
        Self::new(file_name.clone(), Vec::new())?;
        let bytes = tokio::fs::read(path).await?;
        Self::new(file_name, bytes)
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.mime)?)
    }
}

fn staff_form(draft: &StaffDraft, photo: Option<ProfilePhoto>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in draft.form_fields() {
        form = form.text(name, value.to_string());
    }
    if let Some(photo) = photo {
        form = form.part("profilePhoto", photo.into_part()?);
    }
    Ok(form)
}

impl ApiClient {
    pub async fn list_students(
        &self,
        auth: &AuthContext,
        year: StudentYear,
    ) -> Result<Vec<Student>, ApiError> {
        require_session(auth)?;
        self.get_json(
            auth,
            &["students"],
            &[("year", year.as_str())],
            "Failed to load students",
        )
        .await
    }

    pub async fn create_student(
        &self,
        auth: &AuthContext,
        year: StudentYear,
        draft: &StudentDraft,
    ) -> Result<(), ApiError> {
        require_role(auth, Role::can_edit_students)?;
        let body = StudentPayload { draft, year };
        self.send_json(auth, Method::POST, &["students"], &body, OPERATION_FAILED)
            .await?;
        Ok(())
    }

    pub async fn update_student(
        &self,
        auth: &AuthContext,
        id: &RecordId,
        year: StudentYear,
        draft: &StudentDraft,
    ) -> Result<(), ApiError> {
        require_role(auth, Role::can_edit_students)?;
        let body = StudentPayload { draft, year };
        self.send_json(
            auth,
            Method::PUT,
            &["students", id.as_str()],
            &body,
            OPERATION_FAILED,
        )
        .await?;
        Ok(())
    }

    pub async fn delete_student(&self, auth: &AuthContext, id: &RecordId) -> Result<(), ApiError> {
        require_role(auth, Role::can_delete_students)?;
        self.send_empty(
            auth,
            Method::DELETE,
            &["students", id.as_str()],
            "Failed to delete student",
        )
        .await
    }

    pub async fn list_faculty(&self, auth: &AuthContext) -> Result<Vec<Faculty>, ApiError> {
        require_session(auth)?;
        self.get_json(auth, &["admin", "faculty"], &[], "Failed to load faculty")
            .await
    }

    pub async fn create_faculty(
        &self,
        auth: &AuthContext,
        draft: &FacultyDraft,
    ) -> Result<(), ApiError> {
        require_role(auth, Role::can_manage_faculty)?;
        if let Some(errors) = validate_record(draft, SchemaName::Faculty) {
            return Err(errors.into());
        }
        self.send_json(auth, Method::POST, &["admin", "faculty"], draft, OPERATION_FAILED)
            .await?;
        Ok(())
    }

    pub async fn list_staff(&self, auth: &AuthContext) -> Result<Vec<Staff>, ApiError> {
        require_session(auth)?;
        self.get_json(auth, &["admin", "staff"], &[], "Failed to load staff")
            .await
    }

    /// Creates a staff record as a multipart form, with an optional photo.
    pub async fn create_staff(
        &self,
        auth: &AuthContext,
        draft: &StaffDraft,
        photo: Option<ProfilePhoto>,
    ) -> Result<(), ApiError> {
        self.send_staff(auth, Method::POST, &["admin", "staff"], draft, photo)
            .await
    }

    /// Replaces a staff record. Without a photo the stored one is kept.
    pub async fn update_staff(
        &self,
        auth: &AuthContext,
        id: &RecordId,
        draft: &StaffDraft,
        photo: Option<ProfilePhoto>,
    ) -> Result<(), ApiError> {
        self.send_staff(auth, Method::PUT, &["admin", "staff", id.as_str()], draft, photo)
            .await
    }

    pub async fn delete_staff(&self, auth: &AuthContext, id: &RecordId) -> Result<(), ApiError> {
        require_role(auth, Role::can_delete_staff)?;
        self.send_empty(
            auth,
            Method::DELETE,
            &["admin", "staff", id.as_str()],
            "Error deleting staff",
        )
        .await
    }

    async fn send_staff(
        &self,
        auth: &AuthContext,
        method: Method,
        segments: &[&str],
        draft: &StaffDraft,
        photo: Option<ProfilePhoto>,
    ) -> Result<(), ApiError> {
        require_role(auth, Role::can_edit_staff)?;
        if let Some(errors) = validate_record(draft, SchemaName::Staff) {
            return Err(errors.into());
        }
        let url = self.endpoint(segments)?;
        let builder = self
            .request(auth, method.clone(), url.clone())
            .multipart(staff_form(draft, photo)?);
        self.dispatch(builder, &method, &url, STAFF_SAVE_FAILED)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_types() {
        assert_eq!(ProfilePhoto::new("me.JPG", vec![1]).unwrap().mime(), "image/jpeg");
        assert_eq!(ProfilePhoto::new("me.png", vec![1]).unwrap().mime(), "image/png");
        assert_eq!(ProfilePhoto::new("me.gif", vec![1]).unwrap().mime(), "image/gif");
        assert!(matches!(
            ProfilePhoto::new("me.webp", vec![1]),
            Err(ApiError::InvalidPhotoType { extension }) if extension == "webp"
        ));
        assert!(ProfilePhoto::new("photo", vec![1]).is_err());
    }

    #[test]
    fn test_student_payload_carries_year() {
        let draft = StudentDraft {
            roll_number: "21AD001".to_string(),
            student_name: "Asha".to_string(),
            remarks: String::new(),
        };
        let body = serde_json::to_value(StudentPayload {
            draft: &draft,
            year: StudentYear::Second,
        })
        .unwrap();
        assert_eq!(body["rollNumber"], "21AD001");
        assert_eq!(body["year"], "II");
    }
}
