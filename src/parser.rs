//! Nmap XML report parsing.
//!
//! Only the parts of the `nmaprun` document the dashboard shows are modelled;
//! everything else in the report is skipped by the deserializer.

use serde::Deserialize;
use tracing::debug;

use crate::types::HostRecord;

#[derive(Debug, Deserialize)]
struct NmapRun {
    #[serde(rename = "host", default)]
    hosts: Vec<Host>,
}

#[derive(Debug, Deserialize)]
struct Host {
    #[serde(default)]
    status: Option<Status>,
    #[serde(rename = "address", default)]
    addresses: Vec<Address>,
    #[serde(default)]
    hostnames: Option<Hostnames>,
    #[serde(default)]
    ports: Option<Ports>,
    #[serde(default)]
    os: Option<Os>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Address {
    #[serde(rename = "@addr")]
    addr: String,
    #[serde(rename = "@addrtype", default)]
    addr_type: Option<String>,
    #[serde(rename = "@vendor", default)]
    vendor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Hostnames {
    #[serde(rename = "hostname", default)]
    names: Vec<Hostname>,
}

#[derive(Debug, Deserialize)]
struct Hostname {
    #[serde(rename = "@name")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Ports {
    #[serde(rename = "port", default)]
    ports: Vec<Port>,
}

#[derive(Debug, Deserialize)]
struct Port {
    #[serde(rename = "@portid")]
    portid: u16,
    #[serde(default)]
    state: Option<PortState>,
}

#[derive(Debug, Deserialize)]
struct PortState {
    #[serde(rename = "@state")]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Os {
    #[serde(rename = "osmatch", default)]
    matches: Vec<OsMatch>,
}

#[derive(Debug, Deserialize)]
struct OsMatch {
    #[serde(rename = "@name")]
    name: String,
}

/// Convert an Nmap XML report into host records, in report order.
///
/// - Hosts whose status is not exactly `up` are dropped, as are hosts
///   without an IP address record.
/// - Only ports in the `open` state are kept.
/// - Missing hostname becomes `"unknown"`, missing OS match `"Unknown"`.
///
/// Never fails: input that does not parse as a report yields an empty list.
pub fn parse_nmap_xml(xml: &str) -> Vec<HostRecord> {
    let run: NmapRun = match quick_xml::de::from_str(xml) {
        Ok(run) => run,
        Err(e) => {
            debug!(error = %e, "discarding unparseable scan report");
            return Vec::new();
        }
    };
    run.hosts.into_iter().filter_map(into_record).collect()
}

fn into_record(host: Host) -> Option<HostRecord> {
    if host.status.as_ref().map(|s| s.state.as_str()) != Some("up") {
        return None;
    }

    let ip = host.addresses.iter().find(|a| {
        matches!(a.addr_type.as_deref(), None | Some("ipv4") | Some("ipv6"))
    })?;
    let mut record = HostRecord::new(ip.addr.clone());

    if let Some(hw) = host
        .addresses
        .iter()
        .find(|a| a.addr_type.as_deref() == Some("mac"))
    {
        record.mac = Some(hw.addr.clone());
        record.vendor = hw.vendor.clone().filter(|v| !v.is_empty());
    }

    if let Some(name) = host
        .hostnames
        .and_then(|h| h.names.into_iter().map(|n| n.name).find(|n| !n.is_empty()))
    {
        record.hostname = name;
    }

    if let Some(ports) = host.ports {
        record.open_ports = ports
            .ports
            .into_iter()
            .filter(|p| p.state.as_ref().map(|s| s.state.as_str()) == Some("open"))
            .map(|p| p.portid)
            .collect();
    }

    if let Some(os) = host.os.and_then(|os| os.matches.into_iter().next()) {
        record.os_guess = os.name;
    }

    Some(record)
}
