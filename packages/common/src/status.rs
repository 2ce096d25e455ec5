#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a client project.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "discovery"))]
    Discovery,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "planning"))]
    Planning,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "in_progress"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "testing"))]
    Testing,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "on_hold"))]
    OnHold,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "cancelled"))]
    Cancelled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Planning => "planning",
            Self::InProgress => "in_progress",
            Self::Testing => "testing",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Discovery
    }
}

/// Priority shared by projects and tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "low"))]
    Low,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "medium"))]
    Medium,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "high"))]
    High,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "urgent"))]
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// Category of a support ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "bug"))]
    Bug,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "feature"))]
    Feature,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "support"))]
    Support,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "question"))]
    Question,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "other"))]
    Other,
}

impl TicketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Support => "support",
            Self::Question => "question",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TicketType {
    fn default() -> Self {
        Self::Support
    }
}

/// Status of a support ticket.
///
/// New tickets always enter as `Open`. Any transition among the five states
/// is accepted; `Resolved` and `Closed` are terminal only in the sense that
/// they stop counting as open, a closed ticket can still be reopened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "open"))]
    Open,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "in_progress"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "waiting_client"))]
    WaitingClient,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "resolved"))]
    Resolved,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "closed"))]
    Closed,
}

impl TicketStatus {
    /// All possible status values.
    pub const ALL: &'static [TicketStatus] = &[
        Self::Open,
        Self::InProgress,
        Self::WaitingClient,
        Self::Resolved,
        Self::Closed,
    ];

    /// Returns true if the ticket still counts towards open-ticket totals.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved | Self::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::WaitingClient => "waiting_client",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TicketStatus {
    fn default() -> Self {
        Self::Open
    }
}

/// Error when parsing an invalid ticket status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTicketStatusError {
    invalid: String,
}

impl fmt::Display for ParseTicketStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid ticket status '{}'. Valid values: {}",
            self.invalid,
            TicketStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseTicketStatusError {}

impl FromStr for TicketStatus {
    type Err = ParseTicketStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "waiting_client" => Ok(Self::WaitingClient),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseTicketStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Category of a shared project file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "document"))]
    Document,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "credential"))]
    Credential,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "report"))]
    Report,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "design"))]
    Design,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "code"))]
    Code,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "other"))]
    Other,
}

impl Default for FileCategory {
    fn default() -> Self {
        Self::Document
    }
}

/// Status of a project milestone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "in_progress"))]
    InProgress,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "completed"))]
    Completed,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "delayed"))]
    Delayed,
}

impl Default for MilestoneStatus {
    fn default() -> Self {
        Self::Pending
    }
}
