use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::format_value;

/// Student details as returned by `/api/student-details/{key}/`.
///
/// Every field is kept as the raw JSON value the server sent. The server has
/// returned `cgpa` both as a number and as a string, so nothing is coerced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(rename = "studentName", default)]
    pub student_name: Option<Value>,
    #[serde(rename = "studentId", default)]
    pub student_id: Option<Value>,
    #[serde(default)]
    pub cgpa: Option<Value>,
    #[serde(rename = "firstMajor", default)]
    pub first_major: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
}

impl StudentProfile {
    /// Label/value pairs in display order.
    pub fn display_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", format_value(&self.student_name, "-")),
            ("ID", format_value(&self.student_id, "-")),
            ("CGPA", format_value(&self.cgpa, "-")),
            ("Major", format_value(&self.first_major, "-")),
            ("Email", format_value(&self.email, "-")),
        ]
    }
}
