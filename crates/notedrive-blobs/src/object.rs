//! Stored object metadata and resolved URLs.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Default lifetime of a resolved URL.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// A presentable, time-limited URL for a stored object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

impl ResolvedUrl {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Metadata recorded alongside every stored object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobMeta {
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// `now + ttl`, saturating at the far future for absurd TTLs.
pub fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_now_plus_ttl() {
        let now = Utc::now();
        let expires = expiry_after(now, Duration::from_secs(60));
        assert_eq!((expires - now).num_seconds(), 60);
    }

    #[test]
    fn huge_ttl_saturates() {
        let expires = expiry_after(Utc::now(), Duration::from_secs(u64::MAX));
        assert_eq!(expires, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn expiry_check() {
        let now = Utc::now();
        let url = ResolvedUrl {
            url: "memory://x".into(),
            expires_at: expiry_after(now, Duration::from_secs(1)),
        };
        assert!(!url.is_expired_at(now));
        assert!(url.is_expired_at(url.expires_at));
    }
}
