//! Document exports generated by the backend.

use super::{ApiClient, ApiError};
use crate::auth::AuthContext;
use crate::types::{StudentYear, TimetableFilter};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use std::path::{Path, PathBuf};
use tracing::info;

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pdf,
    Word,
    Excel,
}

impl ExportFormat {
    /// Path segment of the export endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "word",
            ExportFormat::Excel => "excel",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Word => "docx",
            ExportFormat::Excel => "xlsx",
        }
    }

    /// Content type assumed when the backend doesn't send one.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "word" | "docx" => Ok(ExportFormat::Word),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// What to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// One class timetable
    Timetable(TimetableFilter),
    /// Every class held in one laboratory
    Lab(String),
    /// The student roster of one year
    Students(StudentYear),
}

impl ExportTarget {
    /// Students export to PDF, Word or Excel; timetables only to PDF or Word.
    pub fn supports(&self, format: ExportFormat) -> bool {
        match self {
            ExportTarget::Students(_) => true,
            ExportTarget::Timetable(_) | ExportTarget::Lab(_) => format != ExportFormat::Excel,
        }
    }

    /// Name the saved document gets.
    pub fn file_name(&self, format: ExportFormat) -> String {
        let ext = format.extension();
        match self {
            ExportTarget::Timetable(filter) => {
                format!("timetable_{}_{}.{}", filter.semester, filter.section, ext)
            }
            ExportTarget::Lab(venue) => format!("{}_Timetable.{}", venue.replace(' ', "_"), ext),
            ExportTarget::Students(year) => format!("students-{}.{}", year, ext),
        }
    }

    fn segments(&self, format: ExportFormat) -> Vec<&'static str> {
        match self {
            ExportTarget::Students(_) => vec!["students", "export", format.as_str()],
            _ => vec!["export", format.as_str()],
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            ExportTarget::Timetable(filter) => vec![
                ("semester", filter.semester.to_string()),
                ("section", filter.section.to_string()),
            ],
            ExportTarget::Lab(venue) => vec![("venue", venue.clone())],
            ExportTarget::Students(year) => vec![("year", year.to_string())],
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            ExportTarget::Timetable(_) => "Failed to export timetable. Please try again.",
            ExportTarget::Lab(_) => "Export failed",
            ExportTarget::Students(_) => "Failed to export file",
        }
    }
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTarget::Timetable(filter) => {
                write!(f, "timetable {} {}", filter.semester, filter.section)
            }
            ExportTarget::Lab(venue) => write!(f, "lab {}", venue),
            ExportTarget::Students(year) => write!(f, "students year {}", year),
        }
    }
}

/// A downloaded document, not yet written anywhere.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedDocument {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    /// Writes the document into `dir` under its file name.
    pub async fn save_in(&self, dir: &Path) -> Result<PathBuf, ApiError> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        info!(
            path = %path.display(),
            bytes = self.bytes.len(),
            "Saved exported document"
        );
        Ok(path)
    }
}

impl ApiClient {
    /// Downloads a generated document.
    ///
    /// # Arguments
    /// * `auth` - Caller's session; sent if present
    /// * `target` - Timetable, lab or student roster
    /// * `format` - Must be supported by `target`
    pub async fn export(
        &self,
        auth: &AuthContext,
        target: &ExportTarget,
        format: ExportFormat,
    ) -> Result<ExportedDocument, ApiError> {
        if !target.supports(format) {
            return Err(ApiError::UnsupportedExport {
                target: target.to_string(),
                format: format.to_string(),
            });
        }

        let url = self.endpoint(&target.segments(format))?;
        let builder = self
            .request(auth, Method::GET, url.clone())
            .query(&target.query());
        let response = self
            .dispatch(builder, &Method::GET, &url, target.failure_message())
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(format.content_type())
            .to_string();
        let bytes = response.bytes().await?.to_vec();

        Ok(ExportedDocument {
            file_name: target.file_name(format),
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Section, Semester};

    #[test]
    fn test_file_names() {
        let class = ExportTarget::Timetable(TimetableFilter::new(Semester::Fifth, Section::B));
        assert_eq!(class.file_name(ExportFormat::Pdf), "timetable_V_B.pdf");
        assert_eq!(class.file_name(ExportFormat::Word), "timetable_V_B.docx");

        let lab = ExportTarget::Lab("DEEP LEARNING LABORATORY".to_string());
        assert_eq!(
            lab.file_name(ExportFormat::Pdf),
            "DEEP_LEARNING_LABORATORY_Timetable.pdf"
        );

        let roster = ExportTarget::Students(StudentYear::Third);
        assert_eq!(roster.file_name(ExportFormat::Excel), "students-III.xlsx");
    }

    #[test]
    fn test_excel_only_for_students() {
        assert!(ExportTarget::Students(StudentYear::First).supports(ExportFormat::Excel));
        assert!(!ExportTarget::Lab("X".to_string()).supports(ExportFormat::Excel));
        assert!(ExportTarget::Timetable(TimetableFilter::default()).supports(ExportFormat::Word));
    }

    #[test]
    fn test_endpoint_segments() {
        assert_eq!(
            ExportTarget::Students(StudentYear::First).segments(ExportFormat::Word),
            vec!["students", "export", "word"]
        );
        assert_eq!(
            ExportTarget::Lab("X".to_string()).segments(ExportFormat::Pdf),
            vec!["export", "pdf"]
        );
    }

    #[test]
    fn test_failure_message_per_target() {
        let class = ExportTarget::Timetable(TimetableFilter::default());
        assert_eq!(
            class.failure_message(),
            "Failed to export timetable. Please try again."
        );
        assert_eq!(ExportTarget::Lab("X".to_string()).failure_message(), "Export failed");
        assert_eq!(
            ExportTarget::Students(StudentYear::First).failure_message(),
            "Failed to export file"
        );
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PDF".parse::<ExportFormat>(), Ok(ExportFormat::Pdf));
        assert_eq!("docx".parse::<ExportFormat>(), Ok(ExportFormat::Word));
        assert!("csv".parse::<ExportFormat>().is_err());
    }

    #[tokio::test]
    async fn test_save_in_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ExportedDocument {
            file_name: "students-I.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.4".to_vec(),
        };
        let path = doc.save_in(&dir.path().join("out")).await.unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"%PDF-1.4");
    }
}
