use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ordered course labels from `/api/courses/{key}/`.
///
/// Labels are opaque. String entries are kept as-is; anything else the
/// server puts in the list is kept as compact JSON text so no entry is lost.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CourseList(Vec<String>);

impl CourseList {
    pub fn new(labels: Vec<String>) -> Self {
        Self(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for CourseList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<Value> = Vec::deserialize(deserializer)?;
        let labels = raw
            .into_iter()
            .map(|entry| match entry {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Ok(Self(labels))
    }
}

impl<'a> IntoIterator for &'a CourseList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_labels_keep_order() {
        let courses: CourseList = serde_json::from_str(r#"["CSE303", "CSE201", "MAT104"]"#).unwrap();
        assert_eq!(courses.labels(), ["CSE303", "CSE201", "MAT104"]);
    }

    #[test]
    fn test_non_string_entries_become_json_text() {
        let courses: CourseList =
            serde_json::from_str(r#"["CSE303", {"code": "CSE201", "section": 2}, 104]"#).unwrap();
        assert_eq!(courses.len(), 3);
        assert_eq!(courses.labels()[0], "CSE303");
        assert_eq!(courses.labels()[1], r#"{"code":"CSE201","section":2}"#);
        assert_eq!(courses.labels()[2], "104");
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let courses = CourseList::new(vec!["CS101".to_string(), "CS102".to_string()]);
        assert_eq!(serde_json::to_string(&courses).unwrap(), r#"["CS101","CS102"]"#);
    }
}
