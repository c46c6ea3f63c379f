use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use crate::error::{ScanError, ScanResult};
use crate::types::{ScanProfile, ScanTarget};

/// Validate an address expression and build a `ScanTarget`.
///
/// Accepts a single IPv4 address (`192.168.1.10`) or an IPv4 CIDR block
/// (`192.168.1.0/24`). Surrounding whitespace is trimmed. Anything else is
/// rejected before a request is ever built.
pub fn parse_target(input: &str, profile: ScanProfile) -> ScanResult<ScanTarget> {
    let t = input.trim();
    if t.is_empty() {
        return Err(ScanError::InvalidTarget("target is empty".into()));
    }
    if t.contains('/') {
        t.parse::<Ipv4Net>()
            .map_err(|e| ScanError::InvalidTarget(format!("{t}: invalid CIDR: {e}")))?;
    } else {
        t.parse::<Ipv4Addr>()
            .map_err(|e| ScanError::InvalidTarget(format!("{t}: invalid IPv4 address: {e}")))?;
    }
    Ok(ScanTarget::new(t, profile))
}

/// Validate every target before any of them is dispatched.
pub fn parse_targets<S: AsRef<str>>(inputs: &[S], profile: ScanProfile) -> ScanResult<Vec<ScanTarget>> {
    if inputs.is_empty() {
        return Err(ScanError::InvalidTarget("no targets given".into()));
    }
    inputs
        .iter()
        .map(|s| parse_target(s.as_ref(), profile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_address_and_cidr() {
        let t = parse_target(" 10.0.0.5 ", ScanProfile::Ping).unwrap();
        assert_eq!(t.address, "10.0.0.5");
        let t = parse_target("192.168.1.0/24", ScanProfile::Ports).unwrap();
        assert_eq!(t.address, "192.168.1.0/24");
        assert_eq!(t.profile, ScanProfile::Ports);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["not-an-ip", "", "300.1.1.1", "10.0.0.0/33", "fe80::1", "host.lan"] {
            assert!(
                matches!(parse_target(bad, ScanProfile::Ping), Err(ScanError::InvalidTarget(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn one_bad_target_rejects_all() {
        let err = parse_targets(&["10.0.0.0/24", "nope"], ScanProfile::Ping).unwrap_err();
        assert!(matches!(err, ScanError::InvalidTarget(_)));
        let empty: [&str; 0] = [];
        assert!(parse_targets(&empty, ScanProfile::Ping).is_err());
    }
}
