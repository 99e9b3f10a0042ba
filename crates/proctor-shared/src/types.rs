use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

// Closed enums are stored and transmitted as their SCREAMING_SNAKE_CASE
// names. Anything else is rejected at the boundary.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Student
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STUDENT" => Ok(Self::Student),
            "ADMIN" => Ok(Self::Admin),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExamStatus {
    Scheduled,
    Cancelled,
    Completed,
    Rescheduled,
}

impl ExamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::Rescheduled => "RESCHEDULED",
        }
    }
}

impl Default for ExamStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl FromStr for ExamStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(Self::Scheduled),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            "RESCHEDULED" => Ok(Self::Rescheduled),
            other => Err(ParseEnumError::new("exam status", other)),
        }
    }
}

/// Kind of study material attached to a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Video,
    Article,
    PracticeQuiz,
    Flashcards,
    Textbook,
    Notes,
    Other,
}

impl ResourceType {
    pub const ALL: [ResourceType; 7] = [
        Self::Video,
        Self::Article,
        Self::PracticeQuiz,
        Self::Flashcards,
        Self::Textbook,
        Self::Notes,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "VIDEO",
            Self::Article => "ARTICLE",
            Self::PracticeQuiz => "PRACTICE_QUIZ",
            Self::Flashcards => "FLASHCARDS",
            Self::Textbook => "TEXTBOOK",
            Self::Notes => "NOTES",
            Self::Other => "OTHER",
        }
    }
}

/// Used when a user has not stated a learning preference.
impl Default for ResourceType {
    fn default() -> Self {
        Self::Video
    }
}

impl FromStr for ResourceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("resource type", s))
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Role, ExamStatus, ResourceType);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_round_trips_through_str() {
        for t in ResourceType::ALL {
            assert_eq!(t.as_str().parse::<ResourceType>().unwrap(), t);
        }
    }

    #[test]
    fn test_unknown_values_rejected() {
        let err = "PODCAST".parse::<ResourceType>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid resource type: PODCAST");
        assert!("student".parse::<Role>().is_err());
        assert!("POSTPONED".parse::<ExamStatus>().is_err());
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ResourceType::PracticeQuiz).unwrap();
        assert_eq!(json, "\"PRACTICE_QUIZ\"");
        let status: ExamStatus = serde_json::from_str("\"RESCHEDULED\"").unwrap();
        assert_eq!(status, ExamStatus::Rescheduled);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Role::default(), Role::Student);
        assert_eq!(ExamStatus::default(), ExamStatus::Scheduled);
        assert_eq!(ResourceType::default(), ResourceType::Video);
        assert!(Role::Admin.is_admin());
    }
}
