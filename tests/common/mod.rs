#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use release_watchbot::github::{FetchError, ReleaseSource};
use release_watchbot::model::Release;
use release_watchbot::notifier::{MessageFormat, Notifier};
use release_watchbot::seen::SeenStore;

/// Shared, ordered log of side effects across fakes.
pub type Events = Arc<Mutex<Vec<String>>>;

pub fn release(tag: &str, published_at: &str) -> Release {
    Release {
        tag: Some(tag.to_string()),
        name: Some(format!("Release {tag}")),
        published_at: Some(published_at.to_string()),
        url: Some(format!("https://github.com/example/releases/tag/{tag}")),
        draft: false,
        prerelease: false,
    }
}

#[derive(Clone, Default)]
pub struct ScriptedSource {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Result<Vec<Release>, FetchError>>>>>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl ScriptedSource {
    /// Queue responses for `repo`; once drained the repo lists no releases.
    pub async fn script(&self, repo: &str, responses: Vec<Result<Vec<Release>, FetchError>>) {
        self.scripts
            .lock()
            .await
            .entry(repo.to_string())
            .or_default()
            .extend(responses);
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.iter().map(|(r, _)| r.clone()).collect()
    }

    pub async fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().await.iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait::async_trait]
impl ReleaseSource for ScriptedSource {
    async fn list_releases(&self, repo: &str) -> Result<Vec<Release>, FetchError> {
        self.calls
            .lock()
            .await
            .push((repo.to_string(), Instant::now()));
        let mut guard = self.scripts.lock().await;
        guard
            .get_mut(repo)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    markers: Arc<Mutex<HashMap<String, String>>>,
    writes: Arc<Mutex<Vec<(String, String)>>>,
    fail_writes: Arc<Mutex<bool>>,
    fail_reads: Arc<Mutex<bool>>,
    events: Option<Events>,
}

impl MemoryStore {
    pub fn with_events(events: Events) -> Self {
        Self {
            events: Some(events),
            ..Default::default()
        }
    }

    pub async fn seed(&self, repo: &str, published_at: &str) {
        self.markers
            .lock()
            .await
            .insert(repo.to_string(), published_at.to_string());
    }

    pub async fn marker(&self, repo: &str) -> Option<String> {
        self.markers.lock().await.get(repo).cloned()
    }

    pub async fn writes(&self) -> Vec<(String, String)> {
        self.writes.lock().await.clone()
    }

    pub async fn fail_writes(&self) {
        *self.fail_writes.lock().await = true;
    }

    pub async fn fail_reads(&self) {
        *self.fail_reads.lock().await = true;
    }
}

#[async_trait::async_trait]
impl SeenStore for MemoryStore {
    async fn get_all(&self) -> Result<HashMap<String, String>> {
        if *self.fail_reads.lock().await {
            return Err(anyhow!("disk I/O error"));
        }
        Ok(self.markers.lock().await.clone())
    }

    async fn set(&self, repo: &str, published_at: &str) -> Result<()> {
        if *self.fail_writes.lock().await {
            return Err(anyhow!("database is locked"));
        }
        if let Some(events) = &self.events {
            events.lock().await.push(format!("set {repo}"));
        }
        self.writes
            .lock()
            .await
            .push((repo.to_string(), published_at.to_string()));
        self.markers
            .lock()
            .await
            .insert(repo.to_string(), published_at.to_string());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    responses: Arc<Mutex<VecDeque<Result<()>>>>,
    sent: Arc<Mutex<Vec<(String, MessageFormat)>>>,
    events: Option<Events>,
}

impl RecordingNotifier {
    pub fn with_events(events: Events) -> Self {
        Self {
            events: Some(events),
            ..Default::default()
        }
    }

    pub fn with_responses(responses: Vec<Result<()>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            ..Default::default()
        }
    }

    pub async fn sent(&self) -> Vec<(String, MessageFormat)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str, format: MessageFormat) -> Result<()> {
        if let Some(events) = &self.events {
            events.lock().await.push("send".to_string());
        }
        self.sent.lock().await.push((text.to_string(), format));
        let mut guard = self.responses.lock().await;
        guard.pop_front().unwrap_or(Ok(()))
    }
}
