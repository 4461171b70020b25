//! Hypothesis records and the field-level patch applied by the store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MemoBoardError, Result};

/// Descriptive grouping; never consulted by the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Market,
    Tech,
    Team,
    Regulatory,
    Financial,
    Competitive,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Market,
        Category::Tech,
        Category::Team,
        Category::Regulatory,
        Category::Financial,
        Category::Competitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Tech => "tech",
            Self::Team => "team",
            Self::Regulatory => "regulatory",
            Self::Financial => "financial",
            Self::Competitive => "competitive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HypothesisKind {
    /// Invalidation alone blocks the recommendation.
    KillCriteria,
    /// Adjusts confidence only.
    Weighted,
}

impl HypothesisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KillCriteria => "kill_criteria",
            Self::Weighted => "weighted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Blocked,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::NotStarted,
        Status::InProgress,
        Status::Completed,
        Status::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }
}

impl std::str::FromStr for Status {
    type Err = MemoBoardError;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim().to_lowercase().replace('-', "_"))
            .ok_or_else(|| MemoBoardError::InvalidParams {
                message: format!(
                    "unknown status '{}'; expected one of not_started, in_progress, completed, blocked",
                    s
                ),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    Validated,
    Invalidated,
    Partial,
    Inconclusive,
}

impl Outcome {
    pub const ALL: [Outcome; 5] = [
        Outcome::Pending,
        Outcome::Validated,
        Outcome::Invalidated,
        Outcome::Partial,
        Outcome::Inconclusive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Validated => "validated",
            Self::Invalidated => "invalidated",
            Self::Partial => "partial",
            Self::Inconclusive => "inconclusive",
        }
    }

    /// Only validated and invalidated count toward the verdict.
    pub fn is_decided(&self) -> bool {
        matches!(self, Outcome::Validated | Outcome::Invalidated)
    }
}

impl std::str::FromStr for Outcome {
    type Err = MemoBoardError;

    fn from_str(s: &str) -> Result<Self> {
        Outcome::ALL
            .into_iter()
            .find(|v| v.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| MemoBoardError::InvalidParams {
                message: format!(
                    "unknown outcome '{}'; expected one of pending, validated, invalidated, partial, inconclusive",
                    s
                ),
            })
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single testable claim about the business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hypothesis {
    pub id: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub kind: HypothesisKind,
    pub title: String,
    pub description: String,
    pub success_criteria: String,
    pub status: Status,
    pub outcome: Outcome,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl Hypothesis {
    pub fn is_kill_criterion(&self) -> bool {
        self.kind == HypothesisKind::KillCriteria
    }

    /// Apply a patch; returns true if any field value changed.
    pub fn apply(&mut self, patch: &HypothesisPatch) -> bool {
        let before = (
            self.status,
            self.outcome,
            self.owner.clone(),
            self.due_date,
            self.notes.clone(),
        );

        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(outcome) = patch.outcome {
            self.outcome = outcome;
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.trim().to_string();
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }

        before
            != (
                self.status,
                self.outcome,
                self.owner.clone(),
                self.due_date,
                self.notes.clone(),
            )
    }
}

/// Partial update for one hypothesis. `None` leaves a field untouched;
/// `due_date: Some(None)` clears the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HypothesisPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HypothesisPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.outcome.is_none()
            && self.owner.is_none()
            && self.due_date.is_none()
            && self.notes.is_none()
    }

    pub fn status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn due_date(mut self, due: Option<NaiveDate>) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Parse a `YYYY-MM-DD` due date; empty input or "none" clears it.
pub fn parse_due_date(input: &str) -> Result<Option<NaiveDate>> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")?))
}
