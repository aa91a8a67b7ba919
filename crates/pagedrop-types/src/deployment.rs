use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::TypeError;
use crate::id::DeploymentId;
use crate::slug::Slug;

/// Visibility state of a deployment.
///
/// The only transition is `Active -> Unpublished`; it is one-way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    #[default]
    Active,
    Unpublished,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unpublished => "unpublished",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "unpublished" => Ok(Self::Unpublished),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// Insert payload for a deployment row.
///
/// The metadata store assigns `id` and `created_at` when it accepts the row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDeployment {
    pub slug: Slug,
    pub file_name: String,
    pub file_path: String,
    pub public_url: String,
    pub category: Category,
    pub status: DeploymentStatus,
    pub notes: Option<String>,
}

impl NewDeployment {
    /// Promote into a stored row.
    pub fn into_deployment(self, id: DeploymentId, created_at: DateTime<Utc>) -> Deployment {
        Deployment {
            id,
            slug: self.slug,
            file_name: self.file_name,
            file_path: self.file_path,
            public_url: self.public_url,
            category: self.category,
            status: self.status,
            notes: self.notes,
            created_at,
        }
    }
}

/// A persisted deployment: the metadata row pointing at a stored document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub id: DeploymentId,
    pub slug: Slug,
    /// Original document name; informational only.
    pub file_name: String,
    /// Blob store path of the document bytes.
    pub file_path: String,
    pub public_url: String,
    pub category: Category,
    pub status: DeploymentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Deployment {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewDeployment {
        let slug = Slug::parse("abc123").unwrap();
        NewDeployment {
            file_path: slug.file_path(),
            public_url: format!("http://localhost/{}", slug.file_path()),
            slug,
            file_name: "a.html".into(),
            category: Category::Demo,
            status: DeploymentStatus::Active,
            notes: None,
        }
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(DeploymentStatus::default(), DeploymentStatus::Active);
        assert!(DeploymentStatus::Active.is_active());
        assert!(!DeploymentStatus::Unpublished.is_active());
    }

    #[test]
    fn status_parse() {
        assert_eq!("active".parse::<DeploymentStatus>().unwrap(), DeploymentStatus::Active);
        assert_eq!(
            "unpublished".parse::<DeploymentStatus>().unwrap(),
            DeploymentStatus::Unpublished
        );
        assert!("deleted".parse::<DeploymentStatus>().is_err());
    }

    #[test]
    fn into_deployment_keeps_fields() {
        let id = DeploymentId::new();
        let now = Utc::now();
        let row = sample().into_deployment(id, now);
        assert_eq!(row.id, id);
        assert_eq!(row.created_at, now);
        assert_eq!(row.slug.as_str(), "abc123");
        assert_eq!(row.file_path, "abc123/index.html");
        assert!(row.is_active());
    }

    #[test]
    fn row_serializes_with_snake_case_fields() {
        let row = sample().into_deployment(DeploymentId::new(), Utc::now());
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["file_name"], "a.html");
        assert_eq!(value["status"], "active");
        assert_eq!(value["category"], "demo");
        assert!(value["notes"].is_null());
    }
}
