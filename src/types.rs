use std::fmt;

use serde::{Deserialize, Serialize};

/// Scan depth requested from the backend, sent as `scanType`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanProfile {
    Ping,
    #[default]
    Ports,
    Full,
}

impl ScanProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanProfile::Ping => "ping",
            ScanProfile::Ports => "ports",
            ScanProfile::Full => "full",
        }
    }
}

impl fmt::Display for ScanProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScanProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ping" => Ok(ScanProfile::Ping),
            "ports" => Ok(ScanProfile::Ports),
            "full" => Ok(ScanProfile::Full),
            other => Err(format!("unknown scan profile: {other}")),
        }
    }
}

/// Address expression plus profile. Fixed for the lifetime of a session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    pub address: String,
    pub profile: ScanProfile,
}

impl ScanTarget {
    pub fn new(address: impl Into<String>, profile: ScanProfile) -> Self {
        Self {
            address: address.into(),
            profile,
        }
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.profile)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Scanning,
    Complete,
    Error,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Complete | SessionStatus::Error | SessionStatus::Cancelled
        )
    }
}

/// How a session receives its updates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    Poll,
    Stream,
}

/// Where a host is attached on the network, taken from the client directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Connection {
    Wired {
        switch: Option<String>,
        port: Option<u32>,
    },
    Wireless {
        access_point: Option<String>,
        ssid: Option<String>,
        signal_dbm: Option<i32>,
    },
}

/// One discovered endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HostRecord {
    pub address: String,
    #[serde(default = "unknown_hostname")]
    pub hostname: String,
    /// Ports reported in the `open` state, in report order.
    #[serde(default)]
    pub open_ports: Vec<u16>,
    #[serde(default = "unknown_os")]
    pub os_guess: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
}

pub const UNKNOWN_HOSTNAME: &str = "unknown";
pub const UNKNOWN_OS: &str = "Unknown";

fn unknown_hostname() -> String {
    UNKNOWN_HOSTNAME.to_string()
}

fn unknown_os() -> String {
    UNKNOWN_OS.to_string()
}

impl HostRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            hostname: unknown_hostname(),
            open_ports: Vec::new(),
            os_guess: unknown_os(),
            mac: None,
            vendor: None,
            connection: None,
        }
    }
}

/// Locally assigned session identifier. The backend job id arrives later.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SessionKey(pub u64);

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of one scan attempt, as handed to observers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanSession {
    pub key: SessionKey,
    pub job_id: Option<String>,
    pub transport: Transport,
    pub group: Option<String>,
    pub target: ScanTarget,
    pub status: SessionStatus,
    pub percent: u8,
    pub hosts_found: u64,
    pub hosts: Vec<HostRecord>,
    pub error: Option<String>,
    pub started_at: String,
}

/// Aggregate view over the members of a parallel scan group.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupProgress {
    pub key: String,
    pub members: Vec<SessionKey>,
    /// Mean of member percentages.
    pub percent: u8,
    /// Sum of host counts over members that completed.
    pub hosts_found: u64,
    pub done: bool,
}

/// Remote job state as reported by `/scan-status` and `/jobs`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[serde(alias = "queued")]
    Pending,
    #[serde(alias = "running", alias = "in_progress")]
    Scanning,
    #[serde(alias = "completed", alias = "done")]
    Complete,
    #[serde(alias = "failed")]
    Error,
    #[serde(alias = "canceled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl JobState {
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Pending | JobState::Scanning)
    }
}

/// A finished job's result. The backend sends either the raw Nmap report or a
/// list it already parsed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ScanReport {
    Raw(String),
    Hosts(Vec<HostRecord>),
}

/// Body of `GET /scan-status/{jobId}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub hosts_found: u64,
    pub status: JobState,
    #[serde(default)]
    pub result: Option<ScanReport>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One entry of `GET /jobs`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobSummary {
    pub id: String,
    pub target: String,
    #[serde(default)]
    pub scan_type: Option<ScanProfile>,
    pub status: JobState,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub hosts_found: u64,
}

/// One entry of the network client directory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NetworkClient {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_wired: bool,
    #[serde(default, alias = "sw_name")]
    pub switch_name: Option<String>,
    #[serde(default, alias = "sw_port")]
    pub switch_port: Option<u32>,
    #[serde(default)]
    pub ap_name: Option<String>,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub signal: Option<i32>,
}

/// Clamp a backend-reported percentage into `0..=100`.
pub fn clamp_percent(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_status_accepts_raw_report() {
        let body = r#"{"percent": 100, "hostsFound": 1, "status": "completed", "result": "<nmaprun/>"}"#;
        let s: JobStatus = serde_json::from_str(body).unwrap();
        assert_eq!(s.status, JobState::Complete);
        assert_eq!(s.result, Some(ScanReport::Raw("<nmaprun/>".into())));
    }

    #[test]
    fn job_status_accepts_host_list() {
        let body = r#"{"status": "complete", "result": [{"address": "10.0.0.1", "hostname": "gw", "open_ports": [22], "os_guess": "Linux"}]}"#;
        let s: JobStatus = serde_json::from_str(body).unwrap();
        match s.result {
            Some(ScanReport::Hosts(h)) => assert_eq!(h[0].open_ports, vec![22]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_job_state_does_not_fail() {
        let s: JobStatus = serde_json::from_str(r#"{"status": "paused"}"#).unwrap();
        assert_eq!(s.status, JobState::Unknown);
        assert_eq!(s.percent, 0.0);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(clamp_percent(-3.0), 0);
        assert_eq!(clamp_percent(42.4), 42);
        assert_eq!(clamp_percent(250.0), 100);
        assert_eq!(clamp_percent(f64::NAN), 0);
    }

    #[test]
    fn profile_parses_case_insensitively() {
        assert_eq!("FULL".parse::<ScanProfile>().unwrap(), ScanProfile::Full);
        assert!("deep".parse::<ScanProfile>().is_err());
    }
}
