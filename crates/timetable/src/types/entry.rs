//! Timetable entries and the editable draft behind the add/edit form.

use super::{derived_times, Batch, Day, EntryType, Section, Semester};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend-assigned identifier.
///
/// The backend may send ids as numbers or strings; both are held as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => RecordId(n.to_string()),
            Raw::Text(s) => RecordId(s),
        })
    }
}

/// Accepts a missing or null period as 0, which the grid treats as "no end".
fn period_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    Ok(Option::<u8>::deserialize(deserializer)?.unwrap_or(0))
}

/// Accepts a missing or null batch as the whole class.
fn batch_or_both<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Batch, D::Error> {
    Ok(Option::<Batch>::deserialize(deserializer)?.unwrap_or_default())
}

/// One scheduled class as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub id: RecordId,
    pub semester: Semester,
    pub section: Section,
    pub day: Day,
    pub period_number: u8,
    #[serde(default, deserialize_with = "period_or_zero")]
    pub end_period: u8,
    pub course_code: String,
    pub subject_name: String,
    pub faculty_name: String,
    pub venue: String,
    #[serde(rename = "type")]
    pub kind: EntryType,
    #[serde(default, deserialize_with = "batch_or_both")]
    pub batch: Batch,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TimetableEntry {
    /// Last period the entry occupies.
    ///
    /// An `end_period` before `period_number` is invalid input; the entry is
    /// then treated as occupying its start period only.
    pub fn last_period(&self) -> u8 {
        if self.end_period >= self.period_number {
            self.end_period
        } else {
            self.period_number
        }
    }

    /// Returns true if the entry's inclusive period range contains `period`.
    pub fn covers(&self, period: u8) -> bool {
        period >= self.period_number && period <= self.last_period()
    }
}

/// Semester and section pair that selects one class timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimetableFilter {
    pub semester: Semester,
    pub section: Section,
}

impl TimetableFilter {
    pub fn new(semester: Semester, section: Section) -> Self {
        Self { semester, section }
    }
}

impl Default for TimetableFilter {
    fn default() -> Self {
        Self::new(Semester::First, Section::A)
    }
}

/// What a timetable snapshot was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimetableQuery {
    /// One semester/section timetable.
    Class(TimetableFilter),
    /// Every class held in one venue, across semesters.
    Lab(String),
}

impl std::fmt::Display for TimetableQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimetableQuery::Class(filter) => {
                write!(f, "semester {} section {}", filter.semester, filter.section)
            }
            TimetableQuery::Lab(venue) => write!(f, "venue {}", venue),
        }
    }
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub semester: Semester,
    pub section: Section,
    pub day: Day,
    pub period_number: u8,
    pub end_period: u8,
    pub start_time: String,
    pub end_time: String,
    pub course_code: String,
    pub subject_name: String,
    pub faculty_name: String,
    pub lab_name: String,
    pub venue: String,
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub batch: Batch,
}

/// The add/edit form for a timetable entry.
///
/// Serializes with the same field names the validation schema checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub semester: Semester,
    pub section: Section,
    pub day: Day,
    pub period_number: u8,
    pub end_period: u8,
    pub start_time: String,
    pub end_time: String,
    pub course_code: String,
    pub subject_name: String,
    pub faculty_name: String,
    pub lab_name: String,
    pub venue: String,
    #[serde(rename = "type")]
    pub kind: EntryType,
    pub batch: Batch,
    #[serde(rename = "repeatDays", default)]
    pub repeat_days: Vec<Day>,
}

impl Default for EntryDraft {
    fn default() -> Self {
        Self {
            id: None,
            semester: Semester::First,
            section: Section::A,
            day: Day::Monday,
            period_number: 1,
            end_period: 1,
            start_time: "09:10 AM".to_string(),
            end_time: "09:50 AM".to_string(),
            course_code: String::new(),
            subject_name: String::new(),
            faculty_name: String::new(),
            lab_name: String::new(),
            venue: String::new(),
            kind: EntryType::Theory,
            batch: Batch::Both,
            repeat_days: Vec::new(),
        }
    }
}

impl EntryDraft {
    /// A blank draft for an empty cell of a class timetable.
    pub fn for_cell(filter: TimetableFilter, day: Day, period: u8) -> Self {
        let mut draft = Self {
            semester: filter.semester,
            section: filter.section,
            day,
            ..Self::default()
        };
        draft.set_period_number(period);
        draft.end_period = draft.period_number;
        draft.recompute_times();
        draft
    }

    /// A blank lab-session draft for an empty cell of a laboratory timetable.
    pub fn for_lab_cell(venue: &str, day: Day, period: u8) -> Self {
        let mut draft = Self::for_cell(TimetableFilter::default(), day, period);
        draft.venue = venue.to_string();
        draft.kind = EntryType::Lab;
        draft
    }

    /// An edit form pre-filled from an existing entry.
    pub fn edit(entry: &TimetableEntry) -> Self {
        let mut draft = Self::duplicate(entry);
        draft.id = Some(entry.id.clone());
        draft
    }

    /// A creation form seeded with every field of `entry` except its id and
    /// timestamps.
    pub fn duplicate(entry: &TimetableEntry) -> Self {
        let mut draft = Self {
            id: None,
            semester: entry.semester,
            section: entry.section,
            day: entry.day,
            period_number: entry.period_number,
            end_period: entry.last_period(),
            start_time: entry.start_time.clone().unwrap_or_default(),
            end_time: entry.end_time.clone().unwrap_or_default(),
            course_code: entry.course_code.clone(),
            subject_name: entry.subject_name.clone(),
            faculty_name: entry.faculty_name.clone(),
            lab_name: entry.lab_name.clone().unwrap_or_default(),
            venue: entry.venue.clone(),
            kind: entry.kind,
            batch: entry.batch,
            repeat_days: Vec::new(),
        };
        draft.recompute_times();
        draft
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Moves the start period, pulling the end period along if it would
    /// otherwise precede the start.
    pub fn set_period_number(&mut self, period: u8) {
        self.period_number = period;
        if self.end_period < period {
            self.end_period = period;
        }
    }

    /// Adds or removes an extra day to create copies on.
    ///
    /// The draft's own day is never a repeat day.
    pub fn toggle_repeat_day(&mut self, day: Day) {
        if day == self.day {
            return;
        }
        if let Some(pos) = self.repeat_days.iter().position(|d| *d == day) {
            self.repeat_days.remove(pos);
        } else {
            self.repeat_days.push(day);
        }
    }

    /// Every day a create request should be issued for: the draft's day
    /// first, then the repeat days in selection order, without duplicates.
    pub fn creation_days(&self) -> Vec<Day> {
        let mut days = vec![self.day];
        for day in &self.repeat_days {
            if !days.contains(day) {
                days.push(*day);
            }
        }
        days
    }

    /// Overwrites the display times from the period table.
    pub fn recompute_times(&mut self) {
        if let Some((start, end)) = derived_times(self.period_number, Some(self.end_period)) {
            self.start_time = start;
            self.end_time = end;
        }
    }

    /// Request body for this draft, placed on `day`.
    pub fn payload_for(&self, day: Day) -> EntryPayload {
        EntryPayload {
            id: self.id.clone(),
            semester: self.semester,
            section: self.section,
            day,
            period_number: self.period_number,
            end_period: self.end_period,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            course_code: self.course_code.clone(),
            subject_name: self.subject_name.clone(),
            faculty_name: self.faculty_name.clone(),
            lab_name: self.lab_name.clone(),
            venue: self.venue.clone(),
            kind: self.kind,
            batch: self.batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> serde_json::Value {
        json!({
            "id": 17,
            "semester": "III",
            "section": "B",
            "day": "Tuesday",
            "period_number": 2,
            "end_period": 4,
            "course_code": "CS301",
            "subject_name": "Operating Systems",
            "faculty_name": "Dr. Rao",
            "venue": "DATA SCIENCE LABORATORY",
            "type": "Lab",
            "batch": "Odd",
            "start_time": "09:50 AM",
            "end_time": "12:40 PM",
            "createdAt": "2024-06-01T10:00:00.000Z",
            "updatedAt": "2024-06-02T10:00:00.000Z"
        })
    }

    #[test]
    fn test_entry_deserializes_numeric_id() {
        let entry: TimetableEntry = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(entry.id.as_str(), "17");
        assert_eq!(entry.semester, Semester::Third);
        assert_eq!(entry.kind, EntryType::Lab);
        assert!(entry.created_at.is_some());
    }

    #[test]
    fn test_entry_missing_end_period_covers_start_only() {
        let mut value = sample_json();
        value["end_period"] = serde_json::Value::Null;
        value.as_object_mut().unwrap().remove("batch");
        let entry: TimetableEntry = serde_json::from_value(value).unwrap();
        assert_eq!(entry.end_period, 0);
        assert_eq!(entry.last_period(), 2);
        assert!(entry.covers(2));
        assert!(!entry.covers(3));
        assert_eq!(entry.batch, Batch::Both);
    }

    #[test]
    fn test_null_batch_loads_as_both() {
        let mut value = sample_json();
        value["batch"] = serde_json::Value::Null;
        let other = sample_json();
        let entries: Vec<TimetableEntry> =
            serde_json::from_value(json!([value, other])).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].batch, Batch::Both);
        assert_eq!(entries[1].batch, Batch::Odd);
    }

    #[test]
    fn test_duplicate_drops_identity() {
        let entry: TimetableEntry = serde_json::from_value(sample_json()).unwrap();
        let copy = EntryDraft::duplicate(&entry);
        assert!(copy.id.is_none());
        assert!(!copy.is_edit());
        assert_eq!(copy.course_code, "CS301");
        assert_eq!(copy.end_period, 4);

        let body = serde_json::to_value(copy.payload_for(copy.day)).unwrap();
        assert!(body.get("id").is_none());
        assert!(body.get("createdAt").is_none());

        let edit = EntryDraft::edit(&entry);
        assert_eq!(edit.id, Some(RecordId::new("17")));
    }

    #[test]
    fn test_set_period_number_raises_end() {
        let mut draft = EntryDraft::default();
        draft.end_period = 3;
        draft.set_period_number(2);
        assert_eq!(draft.end_period, 3);
        draft.set_period_number(5);
        assert_eq!(draft.end_period, 5);
    }

    #[test]
    fn test_creation_days_keep_order_and_skip_base_day() {
        let mut draft = EntryDraft::default();
        draft.toggle_repeat_day(Day::Friday);
        draft.toggle_repeat_day(Day::Monday);
        draft.toggle_repeat_day(Day::Wednesday);
        assert_eq!(
            draft.creation_days(),
            vec![Day::Monday, Day::Friday, Day::Wednesday]
        );
        draft.toggle_repeat_day(Day::Friday);
        assert_eq!(draft.creation_days(), vec![Day::Monday, Day::Wednesday]);
    }

    #[test]
    fn test_lab_cell_draft() {
        let draft = EntryDraft::for_lab_cell("GEN AI LABORATORY", Day::Thursday, 6);
        assert_eq!(draft.kind, EntryType::Lab);
        assert_eq!(draft.venue, "GEN AI LABORATORY");
        assert_eq!(draft.start_time, "02:15 PM");
        assert_eq!(draft.end_time, "03:00 PM");
    }
}
