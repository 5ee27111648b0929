//! Tag comparison policy.
//!
//! Decides whether a container running one image tag should move to another.
//! The `latest` sentinel is not a version: containers tracking `latest` are
//! refreshed whenever a new `latest` is pushed, and are otherwise left
//! alone. Concrete tags are compared as semantic versions, but only within
//! the same prerelease/build-metadata channel, so `1.3.0-beta` never
//! replaces `1.2.0` and vice versa.

use semver::Version;

/// Sentinel tag meaning "track the newest build".
pub const LATEST: &str = "latest";

/// Returns whether a container currently on `current` should be moved to
/// `target`.
///
/// An `Err` means one of the tags is not a semantic version; callers are
/// expected to skip that candidate rather than fail the whole run.
pub fn should_update(current: &str, target: &str) -> Result<bool, semver::Error> {
    if target == LATEST {
        return Ok(current == LATEST);
    }
    // A latest-tracking container is never pinned down to a concrete tag.
    if current == LATEST {
        return Ok(false);
    }
    let current = Version::parse(current)?;
    let target = Version::parse(target)?;
    Ok(current.pre == target.pre && current.build == target.build && current < target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_tracks_latest() {
        assert!(should_update("latest", "latest").unwrap());
    }

    #[test]
    fn pinned_container_ignores_latest_push() {
        assert!(!should_update("1.2.0", "latest").unwrap());
    }

    #[test]
    fn latest_container_ignores_concrete_push() {
        assert!(!should_update("latest", "1.3.0").unwrap());
    }

    #[test]
    fn newer_version_updates() {
        assert!(should_update("1.2.0", "1.3.0").unwrap());
        assert!(should_update("1.2.0", "1.2.1").unwrap());
        assert!(should_update("1.9.0", "1.10.0").unwrap());
    }

    #[test]
    fn same_or_older_version_does_not_update() {
        assert!(!should_update("1.3.0", "1.3.0").unwrap());
        assert!(!should_update("1.3.0", "1.2.0").unwrap());
    }

    #[test]
    fn prerelease_channel_must_match() {
        assert!(should_update("1.2.0-beta", "1.3.0-beta").unwrap());
        assert!(!should_update("1.2.0-beta", "1.3.0").unwrap());
        assert!(!should_update("1.2.0", "1.3.0-beta").unwrap());
        assert!(!should_update("1.2.0-alpha", "1.3.0-beta").unwrap());
    }

    #[test]
    fn build_metadata_channel_must_match() {
        assert!(should_update("1.2.0+build1", "1.3.0+build1").unwrap());
        assert!(!should_update("1.2.0+build1", "1.3.0+build2").unwrap());
        assert!(!should_update("1.3.0-beta+build1", "1.3.0").unwrap());
    }

    #[test]
    fn unparseable_tags_are_errors() {
        assert!(should_update("not-a-version", "1.3.0").is_err());
        assert!(should_update("1.2.0", "not-a-version").is_err());
        assert!(should_update("1.2", "1.3.0").is_err());
    }
}
