use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Lifecycle status of a note.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    #[default]
    Active,
    Inactive,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 2] = [NoteStatus::Active, NoteStatus::Inactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Which notes a view displays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    /// Returns `true` if a note with `status` passes this filter.
    pub fn matches(&self, status: NoteStatus) -> bool {
        match self {
            Self::All => true,
            Self::Active => status == NoteStatus::Active,
            Self::Inactive => status == NoteStatus::Inactive,
        }
    }

    /// The single status this filter selects, or `None` for `All`.
    pub fn status(&self) -> Option<NoteStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(NoteStatus::Active),
            Self::Inactive => Some(NoteStatus::Inactive),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl From<NoteStatus> for StatusFilter {
    fn from(status: NoteStatus) -> Self {
        match status {
            NoteStatus::Active => Self::Active,
            NoteStatus::Inactive => Self::Inactive,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            other => other.parse::<NoteStatus>().map(Self::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(NoteStatus::default(), NoteStatus::Active);
    }

    #[test]
    fn status_parse_is_case_insensitive() {
        assert_eq!("Active".parse::<NoteStatus>().unwrap(), NoteStatus::Active);
        assert_eq!(" INACTIVE ".parse::<NoteStatus>().unwrap(), NoteStatus::Inactive);
        assert!(matches!(
            "archived".parse::<NoteStatus>(),
            Err(TypeError::UnknownStatus(_))
        ));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&NoteStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
    }

    #[test]
    fn filter_matches() {
        assert!(StatusFilter::All.matches(NoteStatus::Active));
        assert!(StatusFilter::All.matches(NoteStatus::Inactive));
        assert!(StatusFilter::Active.matches(NoteStatus::Active));
        assert!(!StatusFilter::Active.matches(NoteStatus::Inactive));
        assert!(StatusFilter::Inactive.matches(NoteStatus::Inactive));
        assert!(!StatusFilter::Inactive.matches(NoteStatus::Active));
    }

    #[test]
    fn filter_parse_and_status() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "inactive".parse::<StatusFilter>().unwrap(),
            StatusFilter::Inactive
        );
        assert_eq!(StatusFilter::All.status(), None);
        assert_eq!(StatusFilter::Active.status(), Some(NoteStatus::Active));
        assert_eq!(StatusFilter::default(), StatusFilter::All);
    }
}
