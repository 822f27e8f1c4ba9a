use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::OwnerId;

const MEDIA_ROOT: &str = "media";

/// Validated reference into the blob namespace.
///
/// Layout: `media/{owner}/{object}`. Paths minted for uploads use
/// `media/{owner}/{original_filename}-{timestamp_millis}`, which is unique per
/// upload event even when the same file name is uploaded repeatedly.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaPath {
    path: String,
    owner_len: usize,
}

impl MediaPath {
    /// Mint the path for a new upload.
    ///
    /// Only the final segment of `original_filename` is kept, so client-side
    /// directory names never leak into the namespace.
    pub fn for_upload(
        owner: &OwnerId,
        original_filename: &str,
        at: DateTime<Utc>,
    ) -> Result<Self, TypeError> {
        let base = original_filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if base.is_empty() || base == "." || base == ".." {
            return Err(TypeError::InvalidMediaPath {
                value: original_filename.to_string(),
                reason: "file name is empty".into(),
            });
        }
        Self::parse(&format!(
            "{MEDIA_ROOT}/{owner}/{base}-{}",
            at.timestamp_millis()
        ))
    }

    /// Parse and validate an existing path.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidMediaPath {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = value.split('/');
        if segments.next() != Some(MEDIA_ROOT) {
            return Err(invalid("must start with 'media/'"));
        }
        let owner = segments.next().ok_or_else(|| invalid("missing owner segment"))?;
        OwnerId::new(owner).map_err(|_| invalid("owner segment is not a valid owner id"))?;

        let mut object_segments = 0;
        for segment in segments {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(invalid("contains an empty or relative segment"));
            }
            object_segments += 1;
        }
        if object_segments == 0 {
            return Err(invalid("missing object name"));
        }

        Ok(Self {
            path: value.to_string(),
            owner_len: owner.len(),
        })
    }

    /// The owner segment.
    pub fn owner(&self) -> &str {
        let start = MEDIA_ROOT.len() + 1;
        &self.path[start..start + self.owner_len]
    }

    /// Returns `true` if this path lives in `owner`'s namespace.
    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.owner() == owner.as_str()
    }

    /// Everything after `media/{owner}/`.
    pub fn object_name(&self) -> &str {
        &self.path[MEDIA_ROOT.len() + self.owner_len + 2..]
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaPath({})", self.path)
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for MediaPath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaPath {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaPath> for String {
    fn from(path: MediaPath) -> Self {
        path.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn owner() -> OwnerId {
        OwnerId::new("user-1").unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn upload_path_follows_naming_convention() {
        let path = MediaPath::for_upload(&owner(), "cat.png", at(1_700_000_000_123)).unwrap();
        assert_eq!(path.as_str(), "media/user-1/cat.png-1700000000123");
        assert_eq!(path.owner(), "user-1");
        assert_eq!(path.object_name(), "cat.png-1700000000123");
        assert!(path.is_owned_by(&owner()));
    }

    #[test]
    fn repeated_filename_gets_distinct_paths() {
        let a = MediaPath::for_upload(&owner(), "cat.png", at(1)).unwrap();
        let b = MediaPath::for_upload(&owner(), "cat.png", at(2)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn upload_strips_client_directories() {
        let path = MediaPath::for_upload(&owner(), "C:\\pics\\dog.jpg", at(5)).unwrap();
        assert_eq!(path.as_str(), "media/user-1/dog.jpg-5");
        let path = MediaPath::for_upload(&owner(), "../../etc/passwd", at(5)).unwrap();
        assert_eq!(path.as_str(), "media/user-1/passwd-5");
    }

    #[test]
    fn upload_rejects_empty_filename() {
        assert!(MediaPath::for_upload(&owner(), "", at(1)).is_err());
        assert!(MediaPath::for_upload(&owner(), "dir/", at(1)).is_err());
        assert!(MediaPath::for_upload(&owner(), "..", at(1)).is_err());
    }

    #[test]
    fn parse_rejects_foreign_or_relative_paths() {
        for bad in [
            "uploads/user-1/a.png",
            "media/user-1",
            "media/user-1/",
            "media//a.png",
            "media/user-1/../other/a.png",
            "media/user-1/./a.png",
        ] {
            assert!(MediaPath::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn parse_accepts_nested_objects() {
        let path = MediaPath::parse("media/user-2/albums/a.png-1").unwrap();
        assert_eq!(path.owner(), "user-2");
        assert_eq!(path.object_name(), "albums/a.png-1");
    }

    #[test]
    fn serde_uses_plain_string() {
        let path = MediaPath::parse("media/user-1/a.png-1").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"media/user-1/a.png-1\"");
        let back: MediaPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<MediaPath>("\"media/x\"").is_err());
    }
}
