//! Image reference handling.
//!
//! Splits `repository[:tag]` strings the way the Docker reference grammar
//! does and validates references before they reach the daemon. Validation
//! covers the subset of the grammar this crate emits: an optional registry
//! host (possibly with a port), lowercase path components, and the usual
//! tag charset.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::version::LATEST;

fn repository_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9.-]*[a-zA-Z0-9])?(?::[0-9]+)?/)?[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$",
        )
        .unwrap()
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9._-]{0,127}$").unwrap())
}

/// Splits a container's image string into `(repository, tag)` on the last
/// `:`. A colon introducing a registry port (`registry:5000/app`) is not a
/// tag separator; an absent tag defaults to `latest`.
pub fn split_image(image: &str) -> (&str, &str) {
    match image.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, tag),
        _ => (image, LATEST),
    }
}

/// A validated `repository:tag` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    repository: String,
    tag: String,
}

impl ImageReference {
    /// Validates and combines a repository and tag. A malformed pair is a
    /// fatal input error for the whole update.
    pub fn new(repository: &str, tag: &str) -> Result<Self, String> {
        if !repository_re().is_match(repository) {
            return Err(format!("invalid repository name {repository:?}"));
        }
        if !tag_re().is_match(tag) {
            return Err(format!("invalid tag {tag:?}"));
        }
        Ok(Self {
            repository: repository.to_string(),
            tag: tag.to_string(),
        })
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The image field written into recreated containers: `repo:tag`, with
    /// the `:latest` suffix stripped so latest-tracking containers keep
    /// referencing the bare repository name.
    pub fn image_field(&self) -> String {
        if self.tag == LATEST {
            self.repository.clone()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.tag)
    }
}
