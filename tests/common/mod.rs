#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream;
use netguard_scan::client::ScanBackend;
use netguard_scan::orchestrator::{OrchestratorConfig, ScanOrchestrator};
use netguard_scan::stream::{BoxEventStream, ScanEventStream};
use netguard_scan::types::{
    JobState, JobStatus, JobSummary, NetworkClient, ScanReport, ScanTarget,
};
use netguard_scan::{ScanError, ScanResult};
use tokio::sync::{mpsc, oneshot};

pub type Feed = mpsc::UnboundedSender<Result<Vec<u8>, String>>;

/// In-memory backend. Records every call as a short string.
#[derive(Default)]
pub struct MockBackend {
    pub calls: Mutex<Vec<String>>,
    pub start_result: Mutex<Option<ScanResult<String>>>,
    pub start_gate: Mutex<Option<oneshot::Receiver<()>>>,
    /// Starts for this target address fail with `StartFailed`.
    pub reject_target: Mutex<Option<String>>,
    pub statuses: Mutex<VecDeque<ScanResult<JobStatus>>>,
    pub cancel_fails: bool,
    pub feeds: Mutex<HashMap<String, mpsc::UnboundedReceiver<Result<Vec<u8>, String>>>>,
    pub jobs: Mutex<Option<ScanResult<Vec<JobSummary>>>>,
    pub clients: Mutex<Vec<NetworkClient>>,
}

impl MockBackend {
    pub fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn push_status(&self, s: ScanResult<JobStatus>) {
        self.statuses.lock().unwrap().push_back(s);
    }

    /// Register a stream for `target`; frames sent on the returned handle are
    /// delivered as raw SSE bytes. Dropping it closes the connection.
    pub fn feed(&self, target: &str) -> Feed {
        let (tx, rx) = mpsc::unbounded_channel();
        self.feeds.lock().unwrap().insert(target.to_string(), rx);
        tx
    }
}

#[async_trait]
impl ScanBackend for MockBackend {
    async fn start_job(&self, target: &ScanTarget) -> ScanResult<String> {
        self.record(format!("start:{}:{}", target.address, target.profile));
        let gate = self.start_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.reject_target.lock().unwrap().as_deref() == Some(target.address.as_str()) {
            return Err(ScanError::StartFailed(format!("backend refused {}", target.address)));
        }
        self.start_result
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok("job-1".to_string()))
    }

    async fn poll_status(&self, job_id: &str) -> ScanResult<JobStatus> {
        self.record(format!("poll:{job_id}"));
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(status(JobState::Scanning, 10.0, 0)))
    }

    async fn cancel(&self, job_id: &str) -> ScanResult<()> {
        self.record(format!("cancel:{job_id}"));
        if self.cancel_fails {
            Err(ScanError::CancelFailed("connection refused".into()))
        } else {
            Ok(())
        }
    }

    async fn open_stream(&self, target: &ScanTarget) -> ScanResult<BoxEventStream> {
        self.record(format!("stream:{}:{}", target.address, target.profile));
        let rx = self
            .feeds
            .lock()
            .unwrap()
            .remove(&target.address)
            .ok_or_else(|| ScanError::StartFailed(format!("no stream for {}", target.address)))?;
        let bytes = stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) });
        Ok(ScanEventStream::new(Box::pin(bytes)).into_boxed())
    }

    async fn list_jobs(&self) -> ScanResult<Vec<JobSummary>> {
        self.record("jobs".to_string());
        self.jobs.lock().unwrap().clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_clients(&self) -> ScanResult<Vec<NetworkClient>> {
        self.record("clients".to_string());
        Ok(self.clients.lock().unwrap().clone())
    }
}

pub fn status(state: JobState, percent: f64, hosts_found: u64) -> JobStatus {
    JobStatus {
        percent,
        hosts_found,
        status: state,
        result: None,
        error: None,
    }
}

pub fn complete_status(xml: &str) -> JobStatus {
    JobStatus {
        percent: 100.0,
        hosts_found: 0,
        status: JobState::Complete,
        result: Some(ScanReport::Raw(xml.to_string())),
        error: None,
    }
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        poll_interval: Duration::from_millis(10),
        stall_timeout: None,
    }
}

pub fn orchestrator(backend: &Arc<MockBackend>) -> ScanOrchestrator {
    ScanOrchestrator::new(backend.clone(), fast_config())
}

/// One SSE frame carrying `value` as JSON.
pub fn frame(value: serde_json::Value) -> Result<Vec<u8>, String> {
    Ok(format!("data: {value}\n\n").into_bytes())
}

/// Nmap report with the given up hosts and one down host. Each host is an
/// address plus a comma-separated list of open ports.
pub fn report(up: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<nmaprun scanner=\"nmap\">\n");
    for (addr, ports) in up {
        xml.push_str("<host><status state=\"up\"/>");
        xml.push_str(&format!("<address addr=\"{addr}\" addrtype=\"ipv4\"/>"));
        xml.push_str("<ports>");
        for p in ports.split(',').filter(|p| !p.is_empty()) {
            xml.push_str(&format!(
                "<port protocol=\"tcp\" portid=\"{p}\"><state state=\"open\"/></port>"
            ));
        }
        xml.push_str("</ports></host>\n");
    }
    xml.push_str("<host><status state=\"down\"/><address addr=\"10.255.255.254\" addrtype=\"ipv4\"/></host>\n");
    xml.push_str("</nmaprun>\n");
    xml
}

/// Re-evaluate an async condition until it holds or a couple of seconds pass.
/// Expands in place, so the condition may use `.await`.
macro_rules! eventually {
    ($cond:expr) => {{
        let mut ok = false;
        for _ in 0..200 {
            if $cond {
                ok = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        ok
    }};
}
