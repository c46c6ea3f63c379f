use std::collections::HashMap;

use crate::types::{Connection, HostRecord, NetworkClient, UNKNOWN_HOSTNAME};

/// Read-only snapshot of the network client directory, indexed for lookup by
/// IP and by MAC.
#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<NetworkClient>,
    by_ip: HashMap<String, usize>,
    by_mac: HashMap<String, usize>,
}

fn normalize_mac(mac: &str) -> String {
    mac.trim().to_ascii_lowercase().replace('-', ":")
}

impl ClientDirectory {
    pub fn new(clients: Vec<NetworkClient>) -> Self {
        let mut by_ip = HashMap::new();
        let mut by_mac = HashMap::new();
        for (i, c) in clients.iter().enumerate() {
            if let Some(ip) = c.ip.as_deref().filter(|s| !s.is_empty()) {
                by_ip.entry(ip.trim().to_string()).or_insert(i);
            }
            if let Some(mac) = c.mac.as_deref().filter(|s| !s.is_empty()) {
                by_mac.entry(normalize_mac(mac)).or_insert(i);
            }
        }
        Self {
            clients,
            by_ip,
            by_mac,
        }
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Match by address first, then by hardware address.
    pub fn lookup(&self, host: &HostRecord) -> Option<&NetworkClient> {
        self.by_ip
            .get(&host.address)
            .or_else(|| {
                host.mac
                    .as_deref()
                    .and_then(|m| self.by_mac.get(&normalize_mac(m)))
            })
            .map(|&i| &self.clients[i])
    }
}

fn connection_of(client: &NetworkClient) -> Connection {
    if client.is_wired {
        Connection::Wired {
            switch: client.switch_name.clone(),
            port: client.switch_port,
        }
    } else {
        Connection::Wireless {
            access_point: client.ap_name.clone(),
            ssid: client.essid.clone(),
            signal_dbm: client.signal,
        }
    }
}

/// Decorate hosts with connection metadata from the directory. Hosts that do
/// not match any client are left as they are.
pub fn enrich_hosts(hosts: &mut [HostRecord], directory: &ClientDirectory) {
    if directory.is_empty() {
        return;
    }
    for host in hosts.iter_mut() {
        let Some(client) = directory.lookup(host) else {
            continue;
        };
        host.connection = Some(connection_of(client));
        if host.hostname == UNKNOWN_HOSTNAME {
            if let Some(name) = client
                .hostname
                .as_deref()
                .or(client.name.as_deref())
                .filter(|n| !n.is_empty())
            {
                host.hostname = name.to_string();
            }
        }
        if host.mac.is_none() {
            host.mac = client.mac.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wired() -> NetworkClient {
        NetworkClient {
            ip: Some("192.168.1.10".into()),
            mac: Some("AA:BB:CC:00:00:01".into()),
            hostname: Some("nas".into()),
            is_wired: true,
            switch_name: Some("USW-24".into()),
            switch_port: Some(7),
            ..Default::default()
        }
    }

    fn wireless() -> NetworkClient {
        NetworkClient {
            ip: Some("192.168.1.20".into()),
            mac: Some("aa-bb-cc-00-00-02".into()),
            name: Some("phone".into()),
            ap_name: Some("U6-Lite".into()),
            essid: Some("home".into()),
            signal: Some(-61),
            ..Default::default()
        }
    }

    #[test]
    fn matches_by_ip_and_fills_unknown_hostname() {
        let dir = ClientDirectory::new(vec![wired(), wireless()]);
        let mut hosts = vec![HostRecord::new("192.168.1.10")];
        enrich_hosts(&mut hosts, &dir);
        assert_eq!(hosts[0].hostname, "nas");
        assert_eq!(
            hosts[0].connection,
            Some(Connection::Wired { switch: Some("USW-24".into()), port: Some(7) })
        );
        assert_eq!(hosts[0].mac.as_deref(), Some("AA:BB:CC:00:00:01"));
    }

    #[test]
    fn matches_by_mac_when_ip_differs() {
        let dir = ClientDirectory::new(vec![wired(), wireless()]);
        let mut host = HostRecord::new("192.168.1.99");
        host.hostname = "android.lan".into();
        host.mac = Some("AA:BB:CC:00:00:02".into());
        let mut hosts = vec![host];
        enrich_hosts(&mut hosts, &dir);
        assert_eq!(hosts[0].hostname, "android.lan");
        assert_eq!(
            hosts[0].connection,
            Some(Connection::Wireless {
                access_point: Some("U6-Lite".into()),
                ssid: Some("home".into()),
                signal_dbm: Some(-61),
            })
        );
    }

    #[test]
    fn unmatched_hosts_untouched() {
        let dir = ClientDirectory::new(vec![wired()]);
        let mut hosts = vec![HostRecord::new("10.9.9.9")];
        let before = hosts.clone();
        enrich_hosts(&mut hosts, &dir);
        assert_eq!(hosts, before);
    }
}
