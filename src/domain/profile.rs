//! Member-profile domain model and onboarding validation rules.
//!
//! The portal gates the whole application on a completed profile, so the
//! rules here are the single source of truth for what "complete" means:
//! alumni carry the last year they were active, active members do not, and
//! the chosen team must belong to the chosen board area (division) unless it
//! is the `other` escape hatch.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Alumni can only report years the organization has existed for.
const MIN_LAST_ACTIVE_YEAR: i32 = 2016;
const MAX_LAST_ACTIVE_YEAR: i32 = 2100;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Active,
    Alumni,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Alumni => "alumni",
        }
    }
}

/// Board area. "Chair" is modeled as a normal division, not a role.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Division {
    Chair,
    Finance,
    Operations,
    Partner,
    Pr,
}

impl Division {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chair => "chair",
            Self::Finance => "finance",
            Self::Operations => "operations",
            Self::Partner => "partner",
            Self::Pr => "pr",
        }
    }

    /// Teams selectable within this division. `Other` is always allowed and
    /// intentionally not listed here.
    #[must_use]
    pub fn teams(self) -> &'static [Team] {
        match self {
            Self::Chair => &[Team::Hack, Team::Hc],
            Self::Finance => &[Team::It, Team::Legal],
            Self::Operations => &[Team::Concept, Team::Oc, Team::Participants],
            Self::Partner => &[Team::Startup, Team::Corporate, Team::Speaker],
            Self::Pr => &[Team::Marketing, Team::Gp],
        }
    }
}

/// Team within a division. `None` exists for division-level members and
/// legacy rows; `Other` lets alumni keep teams that no longer map.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    None,
    Hack,
    Hc,
    It,
    Legal,
    Concept,
    Oc,
    Participants,
    Startup,
    Corporate,
    Speaker,
    Marketing,
    Gp,
    Other,
}

impl Team {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Hack => "hack",
            Self::Hc => "hc",
            Self::It => "it",
            Self::Legal => "legal",
            Self::Concept => "concept",
            Self::Oc => "oc",
            Self::Participants => "participants",
            Self::Startup => "startup",
            Self::Corporate => "corporate",
            Self::Speaker => "speaker",
            Self::Marketing => "marketing",
            Self::Gp => "gp",
            Self::Other => "other",
        }
    }
}

/// Payload submitted by the profile-completion form.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ProfileUpdate {
    pub status: Status,
    pub last_active_year: Option<i32>,
    pub division: Division,
    pub team: Team,
    pub team_other: Option<String>,
}

/// One field-level validation failure, reported back to the form.
#[derive(Debug, Serialize, PartialEq, Eq, ToSchema)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A validated, cleaned-up profile ready to be persisted.
/// Constructing one always marks the profile complete.
#[derive(Debug, PartialEq, Eq)]
pub struct NormalizedProfile {
    pub status: Status,
    pub last_active_year: Option<i32>,
    pub division: Division,
    pub team: Team,
    pub team_other: Option<String>,
    pub is_profile_complete: bool,
}

impl ProfileUpdate {
    /// Validate the cross-field rules and normalize inapplicable fields.
    ///
    /// # Errors
    /// Returns every failed rule so the form can annotate all fields at once.
    pub fn validate(&self) -> Result<NormalizedProfile, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        match (self.status, self.last_active_year) {
            (Status::Alumni, None) => issues.push(ValidationIssue::new(
                "last_active_year",
                "Please provide the last year you were active.",
            )),
            (Status::Alumni, Some(year))
                if !(MIN_LAST_ACTIVE_YEAR..=MAX_LAST_ACTIVE_YEAR).contains(&year) =>
            {
                issues.push(ValidationIssue::new(
                    "last_active_year",
                    format!(
                        "Year must be between {MIN_LAST_ACTIVE_YEAR} and {MAX_LAST_ACTIVE_YEAR}."
                    ),
                ));
            }
            (Status::Active, Some(_)) => issues.push(ValidationIssue::new(
                "last_active_year",
                "Active members should not set a last active year.",
            )),
            _ => {}
        }

        if self.team != Team::Other && !self.division.teams().contains(&self.team) {
            issues.push(ValidationIssue::new(
                "team",
                "Selected team does not belong to the chosen board area.",
            ));
        }

        let team_other = self
            .team_other
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        if self.team == Team::Other {
            match team_other {
                None => issues.push(ValidationIssue::new(
                    "team_other",
                    "Please specify your team name.",
                )),
                Some(value) if value.len() < 2 || value.len() > 80 => issues.push(
                    ValidationIssue::new("team_other", "Team name must be 2-80 characters."),
                ),
                Some(_) => {}
            }
        } else if team_other.is_some() {
            issues.push(ValidationIssue::new(
                "team_other",
                "Only allowed when team is Other.",
            ));
        }

        if !issues.is_empty() {
            return Err(issues);
        }

        Ok(NormalizedProfile {
            status: self.status,
            last_active_year: match self.status {
                Status::Alumni => self.last_active_year,
                Status::Active => None,
            },
            division: self.division,
            team: self.team,
            team_other: match self.team {
                Team::Other => team_other.map(str::to_string),
                _ => None,
            },
            is_profile_complete: true,
        })
    }
}
