//! Accounts, rosters and the role checks that gate writes.

use super::RecordId;
use serde::{Deserialize, Serialize};

wire_enum! {
    /// Account role as issued by the backend.
    Role, "role" {
        Admin => "admin",
        Hod => "hod",
        Faculty => "faculty",
        SupportingStaff => "supporting_staff",
        Student => "student",
    }
}

wire_enum! {
    /// Year of study for the student roster.
    StudentYear, "student year" {
        First => "I",
        Second => "II",
        Third => "III",
        Fourth => "IV",
    }
}

impl Role {
    /// May add, edit, duplicate and delete timetable entries.
    pub fn can_edit_timetable(&self) -> bool {
        matches!(
            self,
            Role::Admin | Role::Hod | Role::Faculty | Role::SupportingStaff
        )
    }

    /// May create and edit supporting-staff records.
    pub fn can_edit_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::SupportingStaff)
    }

    pub fn can_delete_staff(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// May add and edit students in the roster.
    pub fn can_edit_students(&self) -> bool {
        matches!(self, Role::Admin | Role::Faculty | Role::SupportingStaff)
    }

    pub fn can_delete_students(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// May add faculty members.
    pub fn can_manage_faculty(&self) -> bool {
        matches!(self, Role::Admin | Role::Hod)
    }
}

/// Account returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    #[serde(default)]
    pub courses: u64,
    #[serde(default)]
    pub faculty: u64,
    #[serde(default)]
    pub staff: u64,
    #[serde(default)]
    pub users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    #[serde(rename = "rollNumber")]
    pub roll_number: String,
    #[serde(rename = "studentName")]
    pub student_name: String,
    #[serde(default)]
    pub remarks: Option<String>,
    pub year: StudentYear,
}

/// Student form; the year is supplied by the roster being edited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentDraft {
    #[serde(rename = "rollNumber")]
    pub roll_number: String,
    #[serde(rename = "studentName")]
    pub student_name: String,
    #[serde(default)]
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faculty {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub designation: String,
    #[serde(rename = "teachingExp", default)]
    pub teaching_exp: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "mobileNo", default)]
    pub mobile_no: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyDraft {
    pub name: String,
    pub qualification: String,
    pub designation: String,
    #[serde(rename = "teachingExp")]
    pub teaching_exp: String,
    pub email: String,
    #[serde(rename = "mobileNo")]
    pub mobile_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub qualification: String,
    #[serde(default)]
    pub designation: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "mobileNo", default)]
    pub mobile_no: String,
    #[serde(rename = "profilePhoto", default)]
    pub profile_photo: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaffDraft {
    pub name: String,
    pub qualification: String,
    pub designation: String,
    pub experience: String,
    pub email: String,
    #[serde(rename = "mobileNo")]
    pub mobile_no: String,
}

impl StaffDraft {
    /// Text fields in the order they are sent as multipart parts.
    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("name", &self.name),
            ("designation", &self.designation),
            ("qualification", &self.qualification),
            ("experience", &self.experience),
            ("email", &self.email),
            ("mobileNo", &self.mobile_no),
        ]
    }
}

impl From<&Staff> for StaffDraft {
    fn from(staff: &Staff) -> Self {
        Self {
            name: staff.name.clone(),
            qualification: staff.qualification.clone(),
            designation: staff.designation.clone(),
            experience: staff.experience.clone(),
            email: staff.email.clone(),
            mobile_no: staff.mobile_no.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Hod.can_edit_timetable());
        assert!(!Role::Student.can_edit_timetable());
        assert!(Role::SupportingStaff.can_edit_staff());
        assert!(!Role::SupportingStaff.can_delete_staff());
        assert!(Role::Faculty.can_edit_students());
        assert!(!Role::Hod.can_edit_students());
        assert!(!Role::Faculty.can_delete_students());
    }

    #[test]
    fn test_role_wire_names() {
        let user: User = serde_json::from_value(json!({
            "id": "u1",
            "username": "Meena",
            "email": "meena@college.edu",
            "role": "supporting_staff"
        }))
        .unwrap();
        assert_eq!(user.role, Role::SupportingStaff);
    }

    #[test]
    fn test_staff_draft_from_record() {
        let staff: Staff = serde_json::from_value(json!({
            "id": 3,
            "name": "Kumar",
            "designation": "Lab Assistant",
            "qualification": "B.Sc",
            "experience": "5 Years",
            "email": "kumar@college.edu",
            "mobileNo": "9876543210",
            "profilePhoto": "/uploads/kumar.png"
        }))
        .unwrap();
        let draft = StaffDraft::from(&staff);
        assert_eq!(draft.form_fields()[5], ("mobileNo", "9876543210"));
    }
}
