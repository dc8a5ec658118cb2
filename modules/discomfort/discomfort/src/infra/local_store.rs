//! Device-local challenge storage: one JSON array in one file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use discomfort_sdk::{Challenge, ChallengeStore};
use tokio::sync::Mutex;

use crate::config::LocalStoreConfig;

/// Fixed namespace of the local challenge list.
pub const NAMESPACE: &str = "zesty_challenges";

pub struct LocalChallengeStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles on the file.
    lock: Mutex<()>,
}

impl LocalChallengeStore {
    #[must_use]
    pub fn new(config: &LocalStoreConfig) -> Self {
        Self::in_dir(&config.dir)
    }

    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{NAMESPACE}.json")),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> anyhow::Result<Vec<Challenge>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("corrupt challenge file {}", self.path.display())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    async fn write_all(&self, challenges: &[Challenge]) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_vec_pretty(challenges)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))
    }
}

#[async_trait]
impl ChallengeStore for LocalChallengeStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn list(&self) -> anyhow::Result<Vec<Challenge>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn insert(&self, challenge: &Challenge) -> anyhow::Result<()> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        all.push(challenge.clone());
        self.write_all(&all).await
    }

    async fn set_completed(
        &self,
        id: &str,
        completed_at: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Option<Challenge>> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        let Some(challenge) = all.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        match completed_at {
            Some(at) => challenge.complete(at),
            None => challenge.reactivate(),
        }
        let updated = challenge.clone();
        self.write_all(&all).await?;
        Ok(Some(updated))
    }

    async fn remove(&self, id: &str) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let mut all = self.read_all().await?;
        let before = all.len();
        all.retain(|c| c.id != id);
        if all.len() == before {
            return Ok(false);
        }
        self.write_all(&all).await?;
        Ok(true)
    }
}
