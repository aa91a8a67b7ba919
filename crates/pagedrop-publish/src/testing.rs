//! Store doubles with injectable faults, shared by the crate's tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use pagedrop_blob::{BlobError, BlobResult, BlobStore, InMemoryBlobStore};
use pagedrop_meta::{Clock, InMemoryMetadataStore, MetaError, MetaResult, MetadataStore};
use pagedrop_types::{
    Category, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug,
};

use crate::allocator::SlugSource;

/// Insert payload for a row with no blob behind it.
pub(crate) fn new_row(slug: &str, category: Category) -> NewDeployment {
    let slug = Slug::parse(slug).unwrap();
    NewDeployment {
        file_path: slug.file_path(),
        public_url: format!("memory://pagedrop/{}", slug.file_path()),
        slug,
        file_name: "page.html".into(),
        category,
        status: DeploymentStatus::Active,
        notes: None,
    }
}

/// Clock that advances one second per call, starting at `start`.
pub(crate) fn stepping_clock(start: i64) -> Clock {
    let t = Arc::new(AtomicI64::new(start));
    Arc::new(move || {
        let secs = t.fetch_add(1, Ordering::SeqCst);
        Utc.timestamp_opt(secs, 0).unwrap()
    })
}

/// Candidates from a fixed script; the last one repeats once the script
/// runs out.
pub(crate) struct ScriptedSlugSource {
    script: Mutex<VecDeque<Slug>>,
    last: Mutex<Option<Slug>>,
    drawn: AtomicUsize,
}

impl ScriptedSlugSource {
    pub(crate) fn new<'a>(slugs: impl IntoIterator<Item = &'a str>) -> Self {
        let script = slugs.into_iter().map(|s| Slug::parse(s).unwrap()).collect();
        Self {
            script: Mutex::new(script),
            last: Mutex::new(None),
            drawn: AtomicUsize::new(0),
        }
    }

    pub(crate) fn cycling(slug: &str) -> Self {
        Self::new([slug])
    }

    pub(crate) fn drawn(&self) -> usize {
        self.drawn.load(Ordering::SeqCst)
    }
}

impl SlugSource for ScriptedSlugSource {
    fn next_candidate(&self, _len: usize) -> Slug {
        self.drawn.fetch_add(1, Ordering::SeqCst);
        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = Some(next);
        }
        last.clone().expect("script must not be empty")
    }
}

/// In-memory blob store whose operations can be made to fail.
#[derive(Default)]
pub(crate) struct FaultyBlobStore {
    inner: InMemoryBlobStore,
    fail_puts: AtomicBool,
    fail_gets: AtomicBool,
    fail_deletes: AtomicBool,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl FaultyBlobStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inner(&self) -> &InMemoryBlobStore {
        &self.inner
    }

    pub(crate) fn fail_puts(&self) {
        self.fail_puts.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Attempted puts, failed ones included.
    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Attempted deletes, failed ones included.
    pub(crate) fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

fn injected() -> BlobError {
    BlobError::Unavailable("injected fault".into())
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    async fn put(&self, path: &str, data: Bytes) -> BlobResult<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.put(path, data).await
    }

    async fn get(&self, path: &str) -> BlobResult<Option<Bytes>> {
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.get(path).await
    }

    async fn delete(&self, path: &str) -> BlobResult<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.delete(path).await
    }

    fn public_url_for(&self, path: &str) -> String {
        self.inner.public_url_for(path)
    }
}

// Zero (the default) defers to the inner store.
const SLUGS_ALL_TAKEN: u8 = 1;
const SLUGS_ALL_FREE: u8 = 2;

/// In-memory metadata store with injectable faults and a pre-check that
/// can be made to lie.
#[derive(Default)]
pub(crate) struct FaultyMetaStore {
    inner: InMemoryMetadataStore,
    fail_inserts: AtomicBool,
    fail_lookups: AtomicBool,
    slug_mode: AtomicU8,
    slug_lookups: AtomicUsize,
}

impl FaultyMetaStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inner(&self) -> &InMemoryMetadataStore {
        &self.inner
    }

    pub(crate) fn fail_inserts(&self) {
        self.fail_inserts.store(true, Ordering::SeqCst);
    }

    pub(crate) fn fail_lookups(&self) {
        self.fail_lookups.store(true, Ordering::SeqCst);
    }

    /// `slug_exists` answers `true` for every candidate.
    pub(crate) fn report_every_slug_taken(&self) {
        self.slug_mode.store(SLUGS_ALL_TAKEN, Ordering::SeqCst);
    }

    /// `slug_exists` answers `false` for every candidate.
    pub(crate) fn report_every_slug_free(&self) {
        self.slug_mode.store(SLUGS_ALL_FREE, Ordering::SeqCst);
    }

    pub(crate) fn slug_lookups(&self) -> usize {
        self.slug_lookups.load(Ordering::SeqCst)
    }

    fn check_lookups(&self) -> MetaResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(MetaError::Unavailable("injected fault".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for FaultyMetaStore {
    async fn insert_if_absent(&self, row: NewDeployment) -> MetaResult<Deployment> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(MetaError::Unavailable("injected fault".into()));
        }
        self.inner.insert_if_absent(row).await
    }

    async fn get_by_slug(&self, slug: &Slug) -> MetaResult<Option<Deployment>> {
        self.check_lookups()?;
        self.inner.get_by_slug(slug).await
    }

    async fn get_by_id(&self, id: &DeploymentId) -> MetaResult<Option<Deployment>> {
        self.check_lookups()?;
        self.inner.get_by_id(id).await
    }

    async fn list_where(
        &self,
        status: DeploymentStatus,
        category: Option<Category>,
    ) -> MetaResult<Vec<Deployment>> {
        self.check_lookups()?;
        self.inner.list_where(status, category).await
    }

    async fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> MetaResult<Deployment> {
        self.inner.update_status(id, status).await
    }

    async fn slug_exists(&self, slug: &Slug) -> MetaResult<bool> {
        self.slug_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_lookups()?;
        match self.slug_mode.load(Ordering::SeqCst) {
            SLUGS_ALL_TAKEN => Ok(true),
            SLUGS_ALL_FREE => Ok(false),
            _ => self.inner.slug_exists(slug).await,
        }
    }
}
