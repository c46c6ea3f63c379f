mod common;

use netguard_scan::parser::parse_nmap_xml;
use netguard_scan::types::{UNKNOWN_HOSTNAME, UNKNOWN_OS};

use common::report;

#[test]
fn only_down_hosts_gives_empty_list() {
    assert!(parse_nmap_xml(&report(&[])).is_empty());
}

#[test]
fn open_port_count_matches_report() {
    let xml = report(&[("10.0.0.1", "22,80,443"), ("10.0.0.2", ""), ("10.0.0.3", "8080")]);
    let hosts = parse_nmap_xml(&xml);
    let counts: Vec<usize> = hosts.iter().map(|h| h.open_ports.len()).collect();
    assert_eq!(counts, vec![3, 0, 1]);
    assert_eq!(hosts[0].open_ports, vec![22, 80, 443]);
}

#[test]
fn hosts_without_names_get_placeholders() {
    let hosts = parse_nmap_xml(&report(&[("10.0.0.9", "53")]));
    assert_eq!(hosts.len(), 1);
    assert_eq!(hosts[0].hostname, UNKNOWN_HOSTNAME);
    assert_eq!(hosts[0].os_guess, UNKNOWN_OS);
    assert!(hosts[0].connection.is_none());
}

#[test]
fn filtered_and_closed_ports_are_dropped() {
    let xml = r#"<nmaprun>
<host><status state="up"/><address addr="172.16.0.5" addrtype="ipv4"/>
<ports>
<port protocol="tcp" portid="22"><state state="open"/></port>
<port protocol="tcp" portid="23"><state state="closed"/></port>
<port protocol="tcp" portid="25"><state state="filtered"/></port>
<port protocol="tcp" portid="139"><state state="open|filtered"/></port>
</ports></host>
</nmaprun>"#;
    let hosts = parse_nmap_xml(xml);
    assert_eq!(hosts[0].open_ports, vec![22]);
}

#[test]
fn empty_input_is_not_an_error() {
    assert!(parse_nmap_xml("").is_empty());
}

/// Report with `hosts` up hosts whose ports cycle through every state Nmap
/// reports, with scan progress elements between the hosts. Returns the XML
/// and how many ports are in the `open` state.
fn mixed_report(hosts: usize) -> (String, usize) {
    const STATES: [&str; 5] = ["open", "closed", "filtered", "open|filtered", "unfiltered"];
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<nmaprun scanner=\"nmap\">\n");
    let mut open = 0;
    for i in 0..hosts {
        xml.push_str(&format!(
            "<taskprogress task=\"SYN Stealth Scan\" time=\"1700000{i:03}\" percent=\"{}\"/>\n",
            i * 100 / hosts
        ));
        xml.push_str(&format!(
            "<host><status state=\"up\"/><address addr=\"10.1.0.{}\" addrtype=\"ipv4\"/><ports>",
            i + 1
        ));
        for j in 0..(i % 6) {
            let state = STATES[(i * 7 + j * 3) % STATES.len()];
            if state == "open" {
                open += 1;
            }
            xml.push_str(&format!(
                "<port protocol=\"tcp\" portid=\"{}\"><state state=\"{state}\"/></port>",
                1000 + j
            ));
        }
        xml.push_str("</ports></host>\n");
    }
    xml.push_str("<runstats><finished time=\"1700001000\"/></runstats>\n</nmaprun>\n");
    (xml, open)
}

#[test]
fn open_port_total_matches_generated_reports() {
    for hosts in [1, 5, 17, 40] {
        let (xml, open) = mixed_report(hosts);
        let parsed = parse_nmap_xml(&xml);
        assert_eq!(parsed.len(), hosts);
        let total: usize = parsed.iter().map(|h| h.open_ports.len()).sum();
        assert_eq!(total, open, "{hosts} hosts");
    }
}
