use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{NoteId, OwnerId};
use crate::media::MediaPath;
use crate::status::NoteStatus;

/// A note record as held by the record store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub owner: OwnerId,
    pub name: String,
    pub description: String,
    pub status: NoteStatus,
    /// Reference to the attached image. Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<MediaPath>,
    /// Stamped by the creating caller; the natural sort key.
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Apply a validated patch in place. `image_path` and `created_at` are
    /// never touched.
    pub fn apply(&mut self, patch: NotePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Payload for creating a note. The store assigns the id and owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub image_path: Option<MediaPath>,
    pub created_at: DateTime<Utc>,
}

impl NewNote {
    /// A new active note without an image, stamped with the current time.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: NoteStatus::default(),
            image_path: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: NoteStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_image(mut self, path: MediaPath) -> Self {
        self.image_path = Some(path);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    /// Check required fields.
    pub fn validate(&self) -> Result<(), TypeError> {
        require("name", &self.name)?;
        require("description", &self.description)
    }

    /// Materialize the record with store-assigned identity.
    pub fn into_note(self, id: NoteId, owner: OwnerId) -> Note {
        Note {
            id,
            owner,
            name: self.name,
            description: self.description,
            status: self.status,
            image_path: self.image_path,
            created_at: self.created_at,
        }
    }
}

/// Partial update. There is deliberately no image field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NoteStatus>,
}

impl NotePatch {
    pub fn status(status: NoteStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), TypeError> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(description) = &self.description {
            require("description", description)?;
        }
        Ok(())
    }
}

fn require(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.trim().is_empty() {
        return Err(TypeError::blank(field));
    }
    Ok(())
}
