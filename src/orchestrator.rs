//! Lifecycle owner for every scan session and parallel group.
//!
//! Each session runs in its own task with its own `CancellationToken`. Poll
//! sessions ask `/scan-status` on a fixed interval; stream sessions consume
//! one SSE connection. All state lives in a registry owned by the
//! orchestrator instance, so separate instances never see each other.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use ::time::{format_description::well_known, OffsetDateTime};
use futures_util::StreamExt;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::ScanBackend;
use crate::enrich::{enrich_hosts, ClientDirectory};
use crate::error::{ScanError, ScanResult};
use crate::parser::parse_nmap_xml;
use crate::stream::{BoxEventStream, ScanEvent, CONNECTION_LOST};
use crate::target::{parse_target, parse_targets};
use crate::types::{
    clamp_percent, GroupProgress, HostRecord, JobState, JobStatus, ScanProfile, ScanReport,
    ScanSession, ScanTarget, SessionKey, SessionStatus, Transport,
};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Delay between two status polls of a job.
    pub poll_interval: Duration,
    /// A session that gets no successful poll, or no stream frame, for this
    /// long ends in `error`. `None` waits forever.
    pub stall_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            stall_timeout: Some(Duration::from_secs(600)),
        }
    }
}

const CANCELLED_BY_USER: &str = "Scan cancelled by user";

struct SessionEntry {
    session: ScanSession,
    cancel: CancellationToken,
}

#[derive(Default)]
struct Registry {
    next_key: u64,
    sessions: BTreeMap<SessionKey, SessionEntry>,
    groups: HashMap<String, Vec<SessionKey>>,
}

impl Registry {
    fn insert(
        &mut self,
        target: ScanTarget,
        transport: Transport,
        group: Option<String>,
        job_id: Option<String>,
        status: SessionStatus,
        cancel: CancellationToken,
    ) -> SessionKey {
        self.next_key += 1;
        let key = SessionKey(self.next_key);
        let session = ScanSession {
            key,
            job_id,
            transport,
            group,
            target,
            status,
            percent: 0,
            hosts_found: 0,
            hosts: Vec::new(),
            error: None,
            started_at: now_rfc3339(),
        };
        self.sessions.insert(key, SessionEntry { session, cancel });
        key
    }

    /// Unregister a group and remove its member sessions.
    fn take_group(&mut self, group: &str) -> Option<Vec<SessionEntry>> {
        let members = self.groups.remove(group)?;
        Some(members.iter().filter_map(|k| self.sessions.remove(k)).collect())
    }
}

struct Inner {
    backend: Arc<dyn ScanBackend>,
    config: OrchestratorConfig,
    registry: RwLock<Registry>,
    clients: RwLock<ClientDirectory>,
    revision: watch::Sender<u64>,
    shutdown: CancellationToken,
}

/// Cheap to clone; clones share the same registry.
#[derive(Clone)]
pub struct ScanOrchestrator {
    inner: Arc<Inner>,
}

enum StreamStep {
    Event(ScanResult<ScanEvent>),
    Closed,
    Stalled,
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

impl ScanOrchestrator {
    pub fn new(backend: Arc<dyn ScanBackend>, config: OrchestratorConfig) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                backend,
                config,
                registry: RwLock::new(Registry::default()),
                clients: RwLock::new(ClientDirectory::default()),
                revision,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Receiver whose value bumps on every session change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|r| *r = r.wrapping_add(1));
    }

    async fn insert_session(
        &self,
        target: ScanTarget,
        transport: Transport,
        group: Option<String>,
        job_id: Option<String>,
        status: SessionStatus,
    ) -> (SessionKey, CancellationToken) {
        let cancel = self.inner.shutdown.child_token();
        let key = self.inner.registry.write().await.insert(
            target,
            transport,
            group,
            job_id,
            status,
            cancel.clone(),
        );
        self.bump();
        (key, cancel)
    }

    /// Apply `f` to a live session. Returns false if the session is gone or
    /// already terminal, in which case nothing changes.
    async fn update<F>(&self, key: SessionKey, f: F) -> bool
    where
        F: FnOnce(&mut ScanSession),
    {
        let applied = {
            let mut reg = self.inner.registry.write().await;
            match reg.sessions.get_mut(&key) {
                Some(entry) if !entry.session.status.is_terminal() => {
                    f(&mut entry.session);
                    true
                }
                _ => false,
            }
        };
        if applied {
            self.bump();
        }
        applied
    }

    async fn apply_progress(&self, key: SessionKey, percent: Option<f64>, hosts: Option<u64>) -> bool {
        self.update(key, |s| {
            s.status = SessionStatus::Scanning;
            if let Some(p) = percent {
                s.percent = s.percent.max(clamp_percent(p));
            }
            if let Some(h) = hosts {
                s.hosts_found = s.hosts_found.max(h);
            }
        })
        .await
    }

    async fn fail(&self, key: SessionKey, status: SessionStatus, message: String) {
        if self
            .update(key, |s| {
                s.status = status;
                s.error = Some(message.clone());
            })
            .await
        {
            warn!(session = %key, status = ?status, error = %message, "scan session ended");
        }
    }

    async fn complete(&self, key: SessionKey, report: Option<ScanReport>, reported_hosts: Option<u64>) {
        let has_report = report.is_some();
        let hosts = self.hosts_from_report(report).await;
        let count = hosts.len() as u64;
        if self
            .update(key, |s| {
                s.status = SessionStatus::Complete;
                s.percent = 100;
                s.hosts_found = if has_report {
                    count
                } else {
                    s.hosts_found.max(reported_hosts.unwrap_or(0))
                };
                s.hosts = hosts;
            })
            .await
        {
            info!(session = %key, hosts = count, "scan complete");
        }
    }

    async fn hosts_from_report(&self, report: Option<ScanReport>) -> Vec<HostRecord> {
        let mut hosts = match report {
            Some(ScanReport::Raw(xml)) => parse_nmap_xml(&xml),
            Some(ScanReport::Hosts(hosts)) => hosts,
            None => Vec::new(),
        };
        let dir = self.inner.clients.read().await;
        enrich_hosts(&mut hosts, &dir);
        hosts
    }

    fn spawn_remote_cancel(&self, job_id: String) {
        let backend = Arc::clone(&self.inner.backend);
        tokio::spawn(async move {
            match backend.cancel(&job_id).await {
                Ok(()) => debug!(job_id = %job_id, "remote cancel acknowledged"),
                Err(e) => warn!(job_id = %job_id, error = %e, "remote cancel failed"),
            }
        });
    }

    // ---- poll-based sessions ----

    /// Start a backend job for one IPv4 address or CIDR and poll it until it
    /// reaches a terminal state.
    ///
    /// Invalid targets are rejected before anything is sent. If the backend
    /// does not return a job id the session ends in `error` and the caller
    /// gets `StartFailed`.
    pub async fn start_single(&self, target: &str, profile: ScanProfile) -> ScanResult<SessionKey> {
        let target = parse_target(target, profile)?;
        let (key, cancel) = self
            .insert_session(target.clone(), Transport::Poll, None, None, SessionStatus::Idle)
            .await;

        let job_id = match self.inner.backend.start_job(&target).await {
            Ok(id) => id,
            Err(e) => {
                self.fail(key, SessionStatus::Error, e.to_string()).await;
                return Err(e);
            }
        };

        let attached = self
            .update(key, |s| {
                s.job_id = Some(job_id.clone());
                s.status = SessionStatus::Scanning;
            })
            .await;
        if !attached {
            // cancelled while the start call was in flight
            self.spawn_remote_cancel(job_id);
            return Ok(key);
        }
        info!(session = %key, job_id = %job_id, target = %target, "scan started");
        self.spawn_poll_loop(key, job_id, cancel);
        Ok(key)
    }

    fn spawn_poll_loop(&self, key: SessionKey, job_id: String, cancel: CancellationToken) {
        let this = self.clone();
        tokio::spawn(async move { this.run_poll_loop(key, job_id, cancel).await });
    }

    async fn run_poll_loop(&self, key: SessionKey, job_id: String, cancel: CancellationToken) {
        let period = self.inner.config.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_ok = Instant::now();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                r = self.inner.backend.poll_status(&job_id) => r,
            };
            match polled {
                Ok(status) => {
                    last_ok = Instant::now();
                    if self.apply_job_status(key, status).await {
                        return;
                    }
                }
                Err(e) => {
                    warn!(session = %key, job_id = %job_id, error = %e, "status poll failed, will retry");
                    if let Some(limit) = self.inner.config.stall_timeout {
                        if last_ok.elapsed() >= limit {
                            self.fail(key, SessionStatus::Error, format!("scan stalled: {e}")).await;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Returns true once the loop should stop.
    async fn apply_job_status(&self, key: SessionKey, status: JobStatus) -> bool {
        match status.status {
            JobState::Complete => {
                self.complete(key, status.result, Some(status.hosts_found)).await;
                true
            }
            JobState::Error => {
                let msg = status.error.unwrap_or_else(|| "scan failed".into());
                self.fail(key, SessionStatus::Error, msg).await;
                true
            }
            JobState::Cancelled => {
                let msg = status.error.unwrap_or_else(|| "scan cancelled by the backend".into());
                self.fail(key, SessionStatus::Cancelled, msg).await;
                true
            }
            JobState::Pending | JobState::Scanning | JobState::Unknown => {
                !self
                    .apply_progress(key, Some(status.percent), Some(status.hosts_found))
                    .await
            }
        }
    }

    /// Re-attach poll loops to jobs the backend still reports as running.
    /// Returns how many sessions were attached; a failed listing attaches none.
    pub async fn resume(&self) -> usize {
        let jobs = match self.inner.backend.list_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!(error = %e, "could not list running jobs, starting fresh");
                return 0;
            }
        };
        let tracked: HashSet<String> = {
            let reg = self.inner.registry.read().await;
            reg.sessions
                .values()
                .filter_map(|e| e.session.job_id.clone())
                .collect()
        };

        let mut attached = 0;
        for job in jobs.into_iter().filter(|j| j.status.is_active()) {
            if tracked.contains(&job.id) {
                continue;
            }
            let target = ScanTarget::new(job.target, job.scan_type.unwrap_or_default());
            let (key, cancel) = self
                .insert_session(
                    target,
                    Transport::Poll,
                    None,
                    Some(job.id.clone()),
                    SessionStatus::Scanning,
                )
                .await;
            self.apply_progress(key, Some(job.percent), Some(job.hosts_found))
                .await;
            info!(session = %key, job_id = %job.id, "resumed running scan");
            self.spawn_poll_loop(key, job.id, cancel);
            attached += 1;
        }
        attached
    }

    // ---- stream-based sessions ----

    async fn spawn_stream_session(&self, target: ScanTarget, group: Option<String>) -> SessionKey {
        let (key, cancel) = self
            .insert_session(target.clone(), Transport::Stream, group, None, SessionStatus::Idle)
            .await;
        self.spawn_stream(key, target, cancel);
        key
    }

    fn spawn_stream(&self, key: SessionKey, target: ScanTarget, cancel: CancellationToken) {
        let this = self.clone();
        tokio::spawn(async move { this.run_stream(key, target, cancel).await });
    }

    async fn next_step(&self, events: &mut BoxEventStream) -> StreamStep {
        let next = match self.inner.config.stall_timeout {
            Some(limit) => match time::timeout(limit, events.next()).await {
                Ok(n) => n,
                Err(_) => return StreamStep::Stalled,
            },
            None => events.next().await,
        };
        match next {
            Some(ev) => StreamStep::Event(ev),
            None => StreamStep::Closed,
        }
    }

    async fn run_stream(&self, key: SessionKey, target: ScanTarget, cancel: CancellationToken) {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            r = self.inner.backend.open_stream(&target) => r,
        };
        let mut events = match opened {
            Ok(s) => s,
            Err(e) => {
                self.fail(key, SessionStatus::Error, e.to_string()).await;
                return;
            }
        };
        if !self.apply_progress(key, None, None).await {
            return;
        }

        loop {
            let step = tokio::select! {
                biased;
                // dropping `events` closes the connection
                _ = cancel.cancelled() => return,
                s = self.next_step(&mut events) => s,
            };
            match step {
                StreamStep::Event(Ok(ev)) => {
                    if self.apply_event(key, ev).await {
                        return;
                    }
                }
                StreamStep::Event(Err(e)) => {
                    self.fail(key, SessionStatus::Error, e.to_string()).await;
                    return;
                }
                StreamStep::Closed => {
                    self.fail(key, SessionStatus::Error, CONNECTION_LOST.into()).await;
                    return;
                }
                StreamStep::Stalled => {
                    self.fail(key, SessionStatus::Error, "scan stalled: no events received".into())
                        .await;
                    return;
                }
            }
        }
    }

    /// Returns true once the stream should be dropped.
    async fn apply_event(&self, key: SessionKey, event: ScanEvent) -> bool {
        match event {
            ScanEvent::Started { message } => {
                debug!(session = %key, message = message.as_deref().unwrap_or(""), "scan stream started");
                false
            }
            ScanEvent::Progress { percent } => !self.apply_progress(key, Some(percent), None).await,
            ScanEvent::HostsUpdate { count } => !self.apply_progress(key, None, Some(count)).await,
            ScanEvent::Complete {
                report,
                hosts_found,
            } => {
                self.complete(key, report, hosts_found).await;
                true
            }
            ScanEvent::Error { message } => {
                let msg = message.unwrap_or_else(|| "scan failed".into());
                self.fail(key, SessionStatus::Error, msg).await;
                true
            }
        }
    }

    /// Scan several targets at once, one stream each, tracked under `group`.
    ///
    /// Every target is validated before any stream opens. A group already
    /// registered under the same key is stopped first.
    pub async fn start_parallel<S: AsRef<str>>(
        &self,
        group: &str,
        targets: &[S],
        profile: ScanProfile,
    ) -> ScanResult<String> {
        let targets = parse_targets(targets, profile)?;

        // replace any previous group and register every member in one step
        let (members, replaced) = {
            let mut reg = self.inner.registry.write().await;
            let replaced = reg.take_group(group).unwrap_or_default();
            let members: Vec<(SessionKey, ScanTarget, CancellationToken)> = targets
                .into_iter()
                .map(|target| {
                    let cancel = self.inner.shutdown.child_token();
                    let key = reg.insert(
                        target.clone(),
                        Transport::Stream,
                        Some(group.to_string()),
                        None,
                        SessionStatus::Idle,
                        cancel.clone(),
                    );
                    (key, target, cancel)
                })
                .collect();
            reg.groups
                .insert(group.to_string(), members.iter().map(|(k, _, _)| *k).collect());
            (members, replaced)
        };
        if !replaced.is_empty() {
            info!(group = %group, sessions = replaced.len(), "replacing running group");
            self.release(&replaced);
        }
        self.bump();

        info!(group = %group, members = members.len(), "parallel scan started");
        for (key, target, cancel) in members {
            self.spawn_stream(key, target, cancel);
        }
        Ok(group.to_string())
    }

    /// Start one polled scan per target, in order. If any start fails, the
    /// sessions already started are cancelled before the error is returned.
    pub async fn start_all<S: AsRef<str>>(
        &self,
        targets: &[S],
        profile: ScanProfile,
    ) -> ScanResult<Vec<SessionKey>> {
        let targets = parse_targets(targets, profile)?;
        let mut keys = Vec::with_capacity(targets.len());
        for target in &targets {
            match self.start_single(&target.address, profile).await {
                Ok(key) => keys.push(key),
                Err(e) => {
                    for key in &keys {
                        let _ = self.cancel(*key).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(keys)
    }

    /// Scan the externally visible address. Fails with `MissingWanAddress`
    /// until that address is known.
    pub async fn start_wan(&self, address: Option<&str>, profile: ScanProfile) -> ScanResult<SessionKey> {
        let address = address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(ScanError::MissingWanAddress)?;
        let target = parse_target(address, profile)?;
        info!(target = %target, "WAN scan started");
        Ok(self.spawn_stream_session(target, None).await)
    }

    // ---- cancellation and cleanup ----

    /// Mark a session cancelled and stop consuming its updates right away.
    ///
    /// For polled jobs a remote cancel is sent in the background; its outcome
    /// does not affect the local state. Cancelling a finished session is a
    /// no-op.
    pub async fn cancel(&self, key: SessionKey) -> ScanResult<()> {
        let (token, job_id) = {
            let mut reg = self.inner.registry.write().await;
            let entry = reg
                .sessions
                .get_mut(&key)
                .ok_or_else(|| ScanError::NotFound(format!("session {key}")))?;
            if entry.session.status.is_terminal() {
                return Ok(());
            }
            entry.session.status = SessionStatus::Cancelled;
            entry.session.error = Some(CANCELLED_BY_USER.into());
            let job_id = match entry.session.transport {
                Transport::Poll => entry.session.job_id.clone(),
                Transport::Stream => None,
            };
            (entry.cancel.clone(), job_id)
        };
        token.cancel();
        self.bump();
        info!(session = %key, "scan cancelled");
        if let Some(job_id) = job_id {
            self.spawn_remote_cancel(job_id);
        }
        Ok(())
    }

    /// Cancel every unfinished member of a group but keep the sessions.
    pub async fn cancel_group(&self, group: &str) -> ScanResult<()> {
        let members = self
            .group_members(group)
            .await
            .ok_or_else(|| ScanError::NotFound(format!("group {group}")))?;
        for key in members {
            match self.cancel(key).await {
                Ok(()) | Err(ScanError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Close every member stream and forget the group and its sessions.
    pub async fn stop_group(&self, group: &str) -> ScanResult<usize> {
        let removed = self
            .inner
            .registry
            .write()
            .await
            .take_group(group)
            .ok_or_else(|| ScanError::NotFound(format!("group {group}")))?;
        self.release(&removed);
        self.bump();
        info!(group = %group, sessions = removed.len(), "parallel scan stopped");
        Ok(removed.len())
    }

    /// Stop the tasks of sessions already taken out of the registry.
    fn release(&self, entries: &[SessionEntry]) {
        for entry in entries {
            entry.cancel.cancel();
            if let (Transport::Poll, Some(job_id), false) = (
                entry.session.transport,
                entry.session.job_id.clone(),
                entry.session.status.is_terminal(),
            ) {
                self.spawn_remote_cancel(job_id);
            }
        }
    }

    /// Forget a session, cancelling it first if it is still running.
    pub async fn discard(&self, key: SessionKey) -> bool {
        if let Err(ScanError::NotFound(_)) = self.cancel(key).await {
            return false;
        }
        let removed = {
            let mut reg = self.inner.registry.write().await;
            let removed = reg.sessions.remove(&key).is_some();
            for members in reg.groups.values_mut() {
                members.retain(|k| *k != key);
            }
            reg.groups.retain(|_, members| !members.is_empty());
            removed
        };
        if removed {
            self.bump();
        }
        removed
    }

    /// Hand over the hosts of a completed session and forget it. Sessions that
    /// are not complete are left in place.
    pub async fn take_results(&self, key: SessionKey) -> Option<Vec<HostRecord>> {
        let hosts = {
            let mut reg = self.inner.registry.write().await;
            match reg.sessions.get(&key) {
                Some(e) if e.session.status == SessionStatus::Complete => {}
                _ => return None,
            }
            let entry = reg.sessions.remove(&key)?;
            for members in reg.groups.values_mut() {
                members.retain(|k| *k != key);
            }
            reg.groups.retain(|_, members| !members.is_empty());
            entry.session.hosts
        };
        self.bump();
        Some(hosts)
    }

    /// Stop every session task and the client refresh. Sessions keep their
    /// last recorded state; remote jobs are left to the backend.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }

    // ---- snapshots ----

    pub async fn session(&self, key: SessionKey) -> Option<ScanSession> {
        let reg = self.inner.registry.read().await;
        reg.sessions.get(&key).map(|e| e.session.clone())
    }

    pub async fn sessions(&self) -> Vec<ScanSession> {
        let reg = self.inner.registry.read().await;
        reg.sessions.values().map(|e| e.session.clone()).collect()
    }

    async fn group_members(&self, group: &str) -> Option<Vec<SessionKey>> {
        let reg = self.inner.registry.read().await;
        reg.groups.get(group).cloned()
    }

    pub async fn group_progress(&self, group: &str) -> Option<GroupProgress> {
        let reg = self.inner.registry.read().await;
        let members = reg.groups.get(group)?;
        let sessions: Vec<&ScanSession> = members
            .iter()
            .filter_map(|k| reg.sessions.get(k).map(|e| &e.session))
            .collect();
        let percent = if sessions.is_empty() {
            0
        } else {
            let total: f64 = sessions.iter().map(|s| f64::from(s.percent)).sum();
            clamp_percent(total / sessions.len() as f64)
        };
        let hosts_found = sessions
            .iter()
            .filter(|s| s.status == SessionStatus::Complete)
            .map(|s| s.hosts_found)
            .sum();
        Some(GroupProgress {
            key: group.to_string(),
            members: members.clone(),
            percent,
            hosts_found,
            done: sessions.iter().all(|s| s.status.is_terminal()),
        })
    }

    /// Wait until the session is terminal. `None` if it does not exist or is
    /// removed while waiting.
    pub async fn wait_until_terminal(&self, key: SessionKey) -> Option<ScanSession> {
        let mut rx = self.subscribe();
        loop {
            match self.session(key).await {
                None => return None,
                Some(s) if s.status.is_terminal() => return Some(s),
                Some(_) => {}
            }
            if rx.changed().await.is_err() {
                return self.session(key).await;
            }
        }
    }

    /// Wait until every member of the group is terminal.
    pub async fn wait_group(&self, group: &str) -> Option<GroupProgress> {
        let mut rx = self.subscribe();
        loop {
            match self.group_progress(group).await {
                None => return None,
                Some(p) if p.done => return Some(p),
                Some(_) => {}
            }
            if rx.changed().await.is_err() {
                return self.group_progress(group).await;
            }
        }
    }

    // ---- client directory ----

    /// Replace the enrichment snapshot with the backend's current directory.
    pub async fn refresh_clients(&self) -> ScanResult<usize> {
        let clients = self.inner.backend.fetch_clients().await?;
        let dir = ClientDirectory::new(clients);
        let n = dir.len();
        *self.inner.clients.write().await = dir;
        debug!(clients = n, "client directory refreshed");
        Ok(n)
    }

    /// Refresh the client directory every `interval` until shutdown.
    pub fn spawn_client_refresh(&self, interval: Duration) -> JoinHandle<()> {
        let this = self.clone();
        let stop = self.inner.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = stop.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                if let Err(e) = this.refresh_clients().await {
                    warn!(error = %e, "client directory refresh failed");
                }
            }
        })
    }
}
