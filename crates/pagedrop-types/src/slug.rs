use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters a slug is drawn from: lowercase ASCII letters and digits.
pub const SLUG_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default slug length. 36^6 gives roughly 2.2 billion candidates.
pub const SLUG_LEN: usize = 6;

/// Upper bound accepted by [`Slug::parse`].
pub const MAX_SLUG_LEN: usize = 64;

/// Name of the document stored under every slug directory.
const INDEX_FILE: &str = "index.html";

/// Short, public-facing identifier for a deployment.
///
/// A slug is never recycled: once a deployment has been created under it the
/// slug stays taken, even after the deployment is unpublished.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Draw a fresh candidate of `len` characters, each chosen independently
    /// and uniformly from [`SLUG_ALPHABET`].
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let s = (0..len)
            .map(|_| SLUG_ALPHABET[rng.gen_range(0..SLUG_ALPHABET.len())] as char)
            .collect();
        Self(s)
    }

    /// Validate an untrusted string as a slug.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Err(TypeError::InvalidSlug {
                slug: s.to_string(),
                reason: "slug must not be empty".into(),
            });
        }
        if s.len() > MAX_SLUG_LEN {
            return Err(TypeError::InvalidSlug {
                slug: s.to_string(),
                reason: format!("slug longer than {MAX_SLUG_LEN} characters"),
            });
        }
        if let Some(ch) = s.bytes().find(|b| !SLUG_ALPHABET.contains(b)) {
            return Err(TypeError::InvalidSlug {
                slug: s.to_string(),
                reason: format!("contains forbidden character: {:?}", ch as char),
            });
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blob store path the deployment's bytes live under: `{slug}/index.html`.
    pub fn file_path(&self) -> String {
        format!("{}/{INDEX_FILE}", self.0)
    }
}

impl fmt::Debug for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slug({})", self.0)
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Slug {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Slug {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
