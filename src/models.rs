use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    #[serde(deserialize_with = "id_from_text_or_number")]
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub date_applied: String, // kept as supplied, see applied_on()
    #[serde(default)]
    pub work_type: WorkType,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl JobApplication {
    /// Calendar date of the application, or `None` when the stored text
    /// can't be read as a date.
    pub fn applied_on(&self) -> Option<NaiveDate> {
        parse_date(&self.date_applied)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

// Hand-written snapshots use numeric ids as often as string ones.
fn id_from_text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}

/// Reads `YYYY-MM-DD`, `YYYY/MM/DD` or an RFC 3339 timestamp (date part only).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y/%m/%d"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

// --- Work type ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkType {
    Remote,
    Hybrid,
    OnSite,
    /// Anything outside the fixed set, kept verbatim.
    Unrecognized(String),
}

impl WorkType {
    pub const ALL: [WorkType; 3] = [WorkType::Remote, WorkType::Hybrid, WorkType::OnSite];

    pub fn label(&self) -> &str {
        match self {
            WorkType::Remote => "Remote",
            WorkType::Hybrid => "Hybrid",
            WorkType::OnSite => "On-site",
            WorkType::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, WorkType::Unrecognized(_))
    }

    fn recognize(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "remote" => Some(WorkType::Remote),
            "hybrid" => Some(WorkType::Hybrid),
            "on-site" | "onsite" | "on site" | "on_site" => Some(WorkType::OnSite),
            _ => None,
        }
    }
}

/// A missing value reads as an empty unrecognized one.
impl Default for WorkType {
    fn default() -> Self {
        WorkType::Unrecognized(String::new())
    }
}

impl FromStr for WorkType {
    type Err = ParseError;

    /// Strict parse for user input: unknown spellings are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::recognize(s).ok_or_else(|| ParseError::WorkType(s.to_string()))
    }
}

impl From<String> for WorkType {
    fn from(value: String) -> Self {
        Self::recognize(&value).unwrap_or(WorkType::Unrecognized(value))
    }
}

impl From<WorkType> for String {
    fn from(value: WorkType) -> Self {
        match value {
            WorkType::Unrecognized(raw) => raw,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// --- Application status ---

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Rejected,
    Offer,
    Unrecognized(String),
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Rejected,
        ApplicationStatus::Offer,
    ];

    pub fn label(&self) -> &str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Offer => "Offer",
            ApplicationStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ApplicationStatus::Unrecognized(_))
    }

    fn recognize(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "applied" => Some(ApplicationStatus::Applied),
            "interview" => Some(ApplicationStatus::Interview),
            "rejected" => Some(ApplicationStatus::Rejected),
            "offer" => Some(ApplicationStatus::Offer),
            _ => None,
        }
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Unrecognized(String::new())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::recognize(s).ok_or_else(|| ParseError::Status(s.to_string()))
    }
}

impl From<String> for ApplicationStatus {
    fn from(value: String) -> Self {
        Self::recognize(&value).unwrap_or(ApplicationStatus::Unrecognized(value))
    }
}

impl From<ApplicationStatus> for String {
    fn from(value: ApplicationStatus) -> Self {
        match value {
            ApplicationStatus::Unrecognized(raw) => raw,
            other => other.label().to_string(),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_type_accepts_every_spelling_the_dashboard_used() {
        for raw in ["on-site", "onsite", "On-site", "ON SITE"] {
            assert_eq!(raw.parse::<WorkType>().unwrap(), WorkType::OnSite);
        }
        assert_eq!("Remote".parse::<WorkType>().unwrap(), WorkType::Remote);
        assert!("office".parse::<WorkType>().is_err());
    }

    #[test]
    fn unknown_status_survives_deserialization() {
        let json = r#"{"id":"9","company":"Acme","position":"Dev","dateApplied":"2023-05-10",
                       "workType":"remote","status":"Ghosted"}"#;
        let app: JobApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.work_type, WorkType::Remote);
        assert_eq!(app.status, ApplicationStatus::Unrecognized("Ghosted".to_string()));
        assert!(app.notes.is_none());

        let back = serde_json::to_value(&app).unwrap();
        assert_eq!(back["status"], "Ghosted");
        assert_eq!(back["workType"], "Remote");
    }

    #[test]
    fn numeric_id_and_missing_variants_still_load() {
        let json = r#"{"id":1,"company":"Acme","position":"Dev","dateApplied":"2023-05-10"}"#;
        let app: JobApplication = serde_json::from_str(json).unwrap();
        assert_eq!(app.id, "1");
        assert_eq!(app.work_type, WorkType::Unrecognized(String::new()));
        assert_eq!(app.status, ApplicationStatus::Unrecognized(String::new()));
        assert!(!app.status.is_recognized());

        let bad_id = r#"{"id":[1],"company":"Acme","position":"Dev"}"#;
        assert!(serde_json::from_str::<JobApplication>(bad_id).is_err());
    }

    #[test]
    fn dates_in_several_shapes() {
        let expected = NaiveDate::from_ymd_opt(2023, 5, 10);
        assert_eq!(parse_date("2023-05-10"), expected);
        assert_eq!(parse_date("2023/05/10"), expected);
        assert_eq!(parse_date("2023-05-10T08:30:00.000Z"), expected);
        assert_eq!(parse_date("last tuesday"), None);
        assert_eq!(parse_date(""), None);
    }
}
