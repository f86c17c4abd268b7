//! Focus session records and the user's study totals

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// XP awarded for each completed focus session
pub const XP_PER_FOCUS_SESSION: i64 = 10;

/// A focus session as recorded by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    #[serde(alias = "_id")]
    pub id: String,
    pub duration_minutes: u32,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a focus session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFocusSession {
    pub duration_minutes: u32,
    pub completed: bool,
}

impl NewFocusSession {
    pub fn completed(duration_minutes: u32) -> Self {
        Self {
            duration_minutes,
            completed: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyStats {
    #[serde(default)]
    pub total_hours: f64,
}

/// Backend-owned running totals for the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStudyAggregate {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub study_stats: StudyStats,
}

impl UserStudyAggregate {
    /// Partial update that credits one completed focus session of `duration_minutes`
    pub fn focus_reward(&self, duration_minutes: u32) -> UserUpdate {
        UserUpdate {
            xp: self.xp + XP_PER_FOCUS_SESSION,
            study_stats: StudyStats {
                total_hours: self.study_stats.total_hours + f64::from(duration_minutes) / 60.0,
            },
        }
    }
}

/// Partial user object sent to the user-update endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub xp: i64,
    pub study_stats: StudyStats,
}
