use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use if_addrs::{get_if_addrs, IfAddr};
use ipnet::Ipv4Net;
use tracing::debug;

/// The /24 a host address sits in, e.g. `192.168.1.42` -> `192.168.1.0/24`.
pub fn home_subnet(ip: Ipv4Addr) -> Ipv4Net {
    Ipv4Net::new(ip, 24).expect("/24 is always valid").trunc()
}

/// Local non-loopback IPv4 interfaces, each widened to its /24, deduplicated
/// and sorted. Used as scan targets when none are given.
pub fn local_subnets() -> Result<Vec<Ipv4Net>> {
    let mut nets = BTreeSet::new();
    for iface in get_if_addrs().context("listing network interfaces")? {
        if let IfAddr::V4(v4) = iface.addr {
            if v4.ip.is_loopback() || v4.ip.is_link_local() {
                continue;
            }
            debug!(interface = %iface.name, ip = %v4.ip, "found local IPv4 interface");
            nets.insert(home_subnet(v4.ip));
        }
    }
    Ok(nets.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subnet_is_truncated_to_24() {
        assert_eq!(home_subnet(Ipv4Addr::new(10, 1, 2, 3)).to_string(), "10.1.2.0/24");
    }
}
