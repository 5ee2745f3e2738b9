//! Student roster loading for the report selector.

use hoopform_core::report::Student;

use crate::api::AnalysisApi;

/// Message shown in place of options when the roster cannot be loaded.
pub const ROSTER_UNAVAILABLE: &str =
    "Failed to load the student list. Check the network connection or contact an administrator";

/// State of the student selector.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentOptions {
    /// Selectable students.
    Ready(Vec<Student>),
    /// Selector disabled; carries the message to show instead.
    Unavailable(String),
}

impl StudentOptions {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Selectable students, empty while unavailable.
    pub fn options(&self) -> &[Student] {
        match self {
            Self::Ready(students) => students,
            Self::Unavailable(_) => &[],
        }
    }

    pub fn find(&self, student_id: &str) -> Option<&Student> {
        self.options().iter().find(|s| s.id == student_id)
    }
}

/// Load the roster; failures disable the selector instead of erroring.
pub async fn load_student_options(api: &AnalysisApi) -> StudentOptions {
    match api.students().await {
        Ok(students) => {
            tracing::debug!(count = students.len(), "Loaded student roster");
            StudentOptions::Ready(students)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load student roster");
            StudentOptions::Unavailable(ROSTER_UNAVAILABLE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(id: &str) -> Student {
        Student {
            id: id.into(),
            name: format!("Student {id}"),
            parent_id: "parent001".into(),
        }
    }

    #[test]
    fn ready_exposes_options() {
        let options = StudentOptions::Ready(vec![student("s1"), student("s2")]);
        assert!(options.is_enabled());
        assert_eq!(options.options().len(), 2);
        assert_eq!(options.find("s2").map(|s| s.name.as_str()), Some("Student s2"));
    }

    #[test]
    fn unavailable_is_disabled_and_empty() {
        let options = StudentOptions::Unavailable(ROSTER_UNAVAILABLE.into());
        assert!(!options.is_enabled());
        assert!(options.options().is_empty());
        assert!(options.find("s1").is_none());
    }
}
