use bytes::Bytes;
use pagedrop_types::{Category, DeploymentId, Slug};
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};

/// A validated publish request.
///
/// Construction rejects an empty body or file name, so a `PublishRequest`
/// that exists can always be published without further checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishRequest {
    body: Bytes,
    file_name: String,
    category: Category,
    notes: Option<String>,
}

impl PublishRequest {
    pub fn new(
        body: impl Into<Bytes>,
        file_name: impl Into<String>,
        category: Category,
        notes: Option<String>,
    ) -> PublishResult<Self> {
        let body = body.into();
        let file_name = file_name.into();
        if body.is_empty() {
            return Err(PublishError::InvalidInput("document body is empty".into()));
        }
        if file_name.trim().is_empty() {
            return Err(PublishError::InvalidInput("file name is empty".into()));
        }
        Ok(Self {
            body,
            file_name,
            category,
            notes: notes.filter(|n| !n.trim().is_empty()),
        })
    }

    /// Build from loosely typed input. A missing category means
    /// [`Category::Default`]; an unknown one is invalid input.
    pub fn from_raw(
        body: impl Into<Bytes>,
        file_name: impl Into<String>,
        category: Option<&str>,
        notes: Option<String>,
    ) -> PublishResult<Self> {
        let category = match category {
            None => Category::Default,
            Some(s) => s
                .parse()
                .map_err(|e: pagedrop_types::TypeError| PublishError::InvalidInput(e.to_string()))?,
        };
        Self::new(body, file_name, category, notes)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Bytes, String, Category, Option<String>) {
        (self.body, self.file_name, self.category, self.notes)
    }
}

/// What a successful publish hands back to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReceipt {
    pub id: DeploymentId,
    pub slug: Slug,
    pub public_url: String,
}
