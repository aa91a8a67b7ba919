//! In-process deployment table shared by the store backends.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use pagedrop_types::{Category, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug};
use serde::{Deserialize, Serialize};

use crate::error::{MetaError, MetaResult};

/// Deployment rows plus a unique slug index.
///
/// Not synchronized; backends wrap it in a lock.
#[derive(Debug, Default)]
pub struct DeploymentTable {
    rows: HashMap<DeploymentId, Deployment>,
    by_slug: HashMap<Slug, DeploymentId>,
}

/// On-disk form of a table.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct TableSnapshot {
    pub version: u32,
    pub deployments: Vec<Deployment>,
}

pub(crate) const SNAPSHOT_VERSION: u32 = 1;

impl DeploymentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert `row` unless its slug is taken.
    pub fn insert(
        &mut self,
        row: NewDeployment,
        id: DeploymentId,
        created_at: DateTime<Utc>,
    ) -> MetaResult<Deployment> {
        if self.by_slug.contains_key(&row.slug) {
            return Err(MetaError::SlugConflict { slug: row.slug });
        }
        let deployment = row.into_deployment(id, created_at);
        self.by_slug.insert(deployment.slug.clone(), id);
        self.rows.insert(id, deployment.clone());
        Ok(deployment)
    }

    /// Remove a row outright. Only used to undo an insert that could not be
    /// persisted.
    pub(crate) fn remove(&mut self, id: &DeploymentId) -> Option<Deployment> {
        let row = self.rows.remove(id)?;
        self.by_slug.remove(&row.slug);
        Some(row)
    }

    pub fn get_by_slug(&self, slug: &Slug) -> Option<&Deployment> {
        self.by_slug.get(slug).and_then(|id| self.rows.get(id))
    }

    pub fn get_by_id(&self, id: &DeploymentId) -> Option<&Deployment> {
        self.rows.get(id)
    }

    /// Matching rows, newest first. Rows created in the same instant fall
    /// back to id order, which is also time-ordered.
    pub fn list_where(&self, status: DeploymentStatus, category: Option<Category>) -> Vec<Deployment> {
        let mut result: Vec<Deployment> = self
            .rows
            .values()
            .filter(|d| d.status == status)
            .filter(|d| category.map_or(true, |c| d.category == c))
            .cloned()
            .collect();
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        result
    }

    /// Apply a status change. Returns the updated row and the status it had
    /// before.
    pub fn update_status(
        &mut self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> MetaResult<(Deployment, DeploymentStatus)> {
        let row = self
            .rows
            .get_mut(id)
            .ok_or(MetaError::NotFound { id: *id })?;
        let previous = row.status;
        if previous == DeploymentStatus::Unpublished && status == DeploymentStatus::Active {
            return Err(MetaError::InvalidTransition {
                id: *id,
                from: previous,
                to: status,
            });
        }
        row.status = status;
        Ok((row.clone(), previous))
    }

    /// Put a row's status back without transition checks. Only used to undo
    /// a change that could not be persisted.
    pub(crate) fn restore_status(&mut self, id: &DeploymentId, status: DeploymentStatus) {
        if let Some(row) = self.rows.get_mut(id) {
            row.status = status;
        }
    }

    pub(crate) fn snapshot(&self) -> TableSnapshot {
        let mut deployments: Vec<Deployment> = self.rows.values().cloned().collect();
        deployments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        TableSnapshot {
            version: SNAPSHOT_VERSION,
            deployments,
        }
    }

    pub(crate) fn from_snapshot(snapshot: TableSnapshot) -> MetaResult<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MetaError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        let mut table = Self::new();
        for row in snapshot.deployments {
            if table.by_slug.contains_key(&row.slug) {
                return Err(MetaError::Serialization(format!(
                    "duplicate slug in snapshot: {}",
                    row.slug
                )));
            }
            table.by_slug.insert(row.slug.clone(), row.id);
            table.rows.insert(row.id, row);
        }
        Ok(table)
    }
}
