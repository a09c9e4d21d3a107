//! Durable JSON-file result store.
//!
//! One document per candidate under the store root. A write replaces the
//! whole document through a temporary file in the same directory followed by
//! a rename, so a crash leaves either the old document or the new one, never
//! a torn write.
//!
//! File work runs on the blocking pool and owns the candidate's lock until it
//! finishes. If the caller stops waiting (a timeout, a dropped task) the write
//! is abandoned before the rename, so an error returned to the caller never
//! hides a committed result.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use assessor_core::error::StoreError;
use assessor_core::results::AssessmentResult;
use assessor_core::traits::ResultStore;

use crate::locks::KeyedLocks;
use crate::policy::OverwritePolicy;

/// On-disk document for one candidate.
#[derive(Debug, Serialize, Deserialize)]
struct CandidateRecord {
    candidate_id: String,
    /// Oldest first; the last entry is current.
    versions: Vec<AssessmentResult>,
}

/// Stores results as JSON documents in a directory.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    policy: OverwritePolicy,
    locks: Arc<KeyedLocks<()>>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, policy: OverwritePolicy) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create store directory {}", root.display()))?;
        Ok(Self {
            root,
            policy,
            locks: Arc::new(KeyedLocks::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn policy(&self) -> OverwritePolicy {
        self.policy
    }

    /// Path of the document holding `candidate_id`'s results.
    pub fn record_path(&self, candidate_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(candidate_id)))
    }

    async fn load(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        // Writers always hold a slot, and the rename keeps documents whole,
        // so a candidate without a slot can be read without locking.
        let guard = match self.locks.existing(candidate_id) {
            Some(slot) => Some(slot.read_owned().await),
            None => None,
        };
        let path = self.record_path(candidate_id);
        let id = candidate_id.to_string();
        let locks = Arc::clone(&self.locks);
        let versions = blocking(move || {
            let versions = read_record(&path, &id);
            if let Some(guard) = guard {
                drop(guard);
                locks.release(&id);
            }
            versions
        })
        .await?;
        versions
            .filter(|v| !v.is_empty())
            .ok_or_else(|| StoreError::NotFound(candidate_id.to_string()))
    }
}

#[async_trait]
impl ResultStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn put(&self, result: AssessmentResult) -> Result<AssessmentResult, StoreError> {
        let id = result.candidate_id().to_string();
        let guard = self.locks.write(&id).await;
        let path = self.record_path(&id);
        let root = self.root.clone();
        let policy = self.policy;
        let locks = Arc::clone(&self.locks);
        let abandon = AbandonOnDrop::default();
        let abandoned = Arc::clone(&abandon.0);

        blocking(move || {
            let outcome = (|| -> Result<AssessmentResult, StoreError> {
                let mut versions = read_record(&path, &id)?.unwrap_or_default();
                let stored = policy.apply(&mut versions, result)?;
                let record = CandidateRecord {
                    candidate_id: id.clone(),
                    versions,
                };
                write_record(&root, &path, &record, &abandoned)?;
                tracing::debug!(path = %path.display(), version = stored.version(), "wrote result");
                Ok(stored)
            })();
            drop(guard);
            locks.release(&id);
            outcome
        })
        .await
    }

    async fn get(&self, candidate_id: &str) -> Result<AssessmentResult, StoreError> {
        let mut versions = self.load(candidate_id).await?;
        versions
            .pop()
            .ok_or_else(|| StoreError::NotFound(candidate_id.to_string()))
    }

    async fn history(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        self.load(candidate_id).await
    }
}

/// Marks a write as abandoned once the `put` future is dropped.
#[derive(Default)]
struct AbandonOnDrop(Arc<AtomicBool>);

impl Drop for AbandonOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Run file I/O off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {e}")))?
}

fn read_record(path: &Path, candidate_id: &str) -> Result<Option<Vec<AssessmentResult>>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StoreError::Unavailable(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        }
    };

    let corrupt = |reason: String| StoreError::Corrupt {
        candidate_id: candidate_id.to_string(),
        reason,
    };
    let record: CandidateRecord =
        serde_json::from_str(&content).map_err(|e| corrupt(e.to_string()))?;
    if record.candidate_id != candidate_id {
        return Err(corrupt(format!(
            "document belongs to {:?}",
            record.candidate_id
        )));
    }
    if let Some(stray) = record.versions.iter().find(|r| r.candidate_id() != candidate_id) {
        return Err(corrupt(format!(
            "version {} belongs to {:?}",
            stray.version(),
            stray.candidate_id()
        )));
    }
    Ok(Some(record.versions))
}

fn write_record(
    root: &Path,
    path: &Path,
    record: &CandidateRecord,
    abandoned: &AtomicBool,
) -> Result<(), StoreError> {
    let unavailable =
        |e: std::io::Error| StoreError::Unavailable(format!("failed to write {}: {e}", path.display()));

    let json = serde_json::to_vec_pretty(record)
        .map_err(|e| StoreError::Unavailable(format!("failed to encode result: {e}")))?;

    let mut tmp = NamedTempFile::new_in(root).map_err(unavailable)?;
    tmp.write_all(&json).map_err(unavailable)?;
    tmp.as_file().sync_all().map_err(unavailable)?;
    if abandoned.load(Ordering::Acquire) {
        // Dropping `tmp` removes the temporary file.
        tracing::debug!(path = %path.display(), "caller went away, write abandoned");
        return Err(StoreError::Unavailable(format!(
            "write to {} abandoned by the caller",
            path.display()
        )));
    }
    tmp.persist(path).map_err(|e| unavailable(e.error))?;
    Ok(())
}

/// File stem for a candidate id. Characters outside `[A-Za-z0-9_@-]` are
/// percent-encoded so any id maps to a distinct name inside the root.
fn file_stem(candidate_id: &str) -> String {
    let mut stem = String::with_capacity(candidate_id.len());
    for byte in candidate_id.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'@') {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::result;

    fn store(dir: &Path, policy: OverwritePolicy) -> FileStore {
        FileStore::open(dir.join("results"), policy).unwrap()
    }

    #[tokio::test]
    async fn put_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Reject);
        let stored = store.put(result("cand-1", 6)).await.unwrap();
        assert_eq!(store.get("cand-1").await.unwrap(), stored);
        assert!(store.record_path("cand-1").exists());
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let stored = {
            let store = store(dir.path(), OverwritePolicy::Reject);
            store.put(result("cand-1", 6)).await.unwrap()
        };
        let reopened = store(dir.path(), OverwritePolicy::Reject);
        assert_eq!(reopened.get("cand-1").await.unwrap(), stored);
    }

    #[tokio::test]
    async fn missing_candidate_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Reject);
        assert_eq!(
            store.get("cand-404").await.unwrap_err(),
            StoreError::NotFound("cand-404".into())
        );
    }

    #[tokio::test]
    async fn duplicate_is_rejected_and_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Reject);
        store.put(result("cand-1", 6)).await.unwrap();
        let before = std::fs::read(store.record_path("cand-1")).unwrap();

        let err = store.put(result("cand-1", 9)).await.unwrap_err();
        assert_eq!(err.to_string(), StoreError::DuplicateCandidate("cand-1".into()).to_string());
        assert_eq!(std::fs::read(store.record_path("cand-1")).unwrap(), before);
    }

    #[tokio::test]
    async fn replace_and_version_policies() {
        let dir = tempfile::tempdir().unwrap();

        let replacing = FileStore::open(dir.path().join("replace"), OverwritePolicy::Replace).unwrap();
        replacing.put(result("cand-1", 2)).await.unwrap();
        let newer = replacing.put(result("cand-1", 9)).await.unwrap();
        assert_eq!(newer.version(), 2);
        assert_eq!(replacing.history("cand-1").await.unwrap(), vec![newer]);

        let versioning = FileStore::open(dir.path().join("version"), OverwritePolicy::Version).unwrap();
        versioning.put(result("cand-1", 2)).await.unwrap();
        versioning.put(result("cand-1", 9)).await.unwrap();
        let history = versioning.history("cand-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].score(assessor_core::model::Phase::Aptitude).unwrap().raw, 8);
        assert_eq!(versioning.get("cand-1").await.unwrap().version(), 2);
    }

    #[tokio::test]
    async fn garbage_document_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Reject);
        std::fs::write(store.record_path("cand-1"), "{ not json").unwrap();
        let err = store.get("cand-1").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref candidate_id, .. } if candidate_id == "cand-1"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn document_for_another_candidate_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Reject);
        store.put(result("cand-1", 6)).await.unwrap();
        std::fs::copy(store.record_path("cand-1"), store.record_path("cand-2")).unwrap();
        assert!(matches!(
            store.get("cand-2").await.unwrap_err(),
            StoreError::Corrupt { .. }
        ));
    }

    #[test]
    fn file_names_stay_inside_root() {
        assert_eq!(file_stem("cand-1"), "cand-1");
        assert_eq!(file_stem("a.b@c"), "a%2Eb@c");
        assert_eq!(file_stem("../etc/passwd"), "%2E%2E%2Fetc%2Fpasswd");
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Version);
        for n in 0..3 {
            store.put(result("cand-1", n)).await.unwrap();
        }
        let names: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["cand-1.json"]);
    }

    #[test]
    fn abandoned_write_leaves_no_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cand-1.json");
        let record = CandidateRecord {
            candidate_id: "cand-1".into(),
            versions: vec![result("cand-1", 6)],
        };

        let err = write_record(dir.path(), &path, &record, &AtomicBool::new(true)).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(ref msg) if msg.contains("abandoned")));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        write_record(dir.path(), &path, &record, &AtomicBool::new(false)).unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn lookups_do_not_accumulate_locks() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path(), OverwritePolicy::Version);
        for n in 0..500 {
            assert!(store.get(&format!("ghost-{n}")).await.is_err());
        }
        assert_eq!(store.locks.len(), 0);

        store.put(result("cand-1", 6)).await.unwrap();
        store.put(result("cand-1", 7)).await.unwrap();
        store.history("cand-1").await.unwrap();
        assert_eq!(store.locks.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store(dir.path(), OverwritePolicy::Reject));

        let distinct = (0..10).map(|i| {
            let store = Arc::clone(&store);
            async move { store.put(result(&format!("cand-{i}"), 4)).await }
        });
        let outcomes = futures::future::join_all(distinct).await;
        assert!(outcomes.iter().all(Result::is_ok));

        let same: Vec<_> = (0..6)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.put(result("shared", i)).await })
            })
            .collect();
        let mut wins = 0;
        for handle in same {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.history("shared").await.unwrap().len(), 1);
        assert_eq!(store.locks.len(), 0);
    }
}
