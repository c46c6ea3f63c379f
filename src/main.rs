use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use netguard_scan::client::{BackendConfig, HttpBackend};
use netguard_scan::netdetect;
use netguard_scan::orchestrator::{OrchestratorConfig, ScanOrchestrator};
use netguard_scan::server::{self, AppState};
use netguard_scan::types::{HostRecord, ScanProfile, ScanSession, SessionKey, SessionStatus};

/// netguard-scan: run and follow NetGuard network scans from the terminal.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "netguard-scan",
    version,
    about = "Run and follow NetGuard network scans: polled jobs, parallel subnet streams and WAN scans.",
    long_about = None
)]
struct Cli {
    /// Base URL of the NetGuard backend API.
    #[arg(long = "backend-url", env = "NETGUARD_BACKEND_URL", default_value = "http://127.0.0.1:3001/api")]
    backend_url: String,

    /// Bearer token sent with every backend request.
    #[arg(long, env = "NETGUARD_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// IPv4 address or CIDR to scan. Repeat or comma-separate. If omitted, local /24s are used.
    #[arg(long = "target", value_delimiter = ',')]
    targets: Vec<String>,

    /// Scan profile: ping, ports or full.
    #[arg(long, default_value = "ports")]
    profile: ScanProfile,

    /// Stream every target in parallel instead of polling one job per target.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Scan the external (WAN) address instead of the targets.
    #[arg(long = "wan-scan", default_value_t = false)]
    wan_scan: bool,

    /// External address used by --wan-scan.
    #[arg(long = "wan-address", env = "NETGUARD_WAN_ADDRESS")]
    wan_address: Option<String>,

    /// Re-attach to jobs the backend still reports as running.
    #[arg(long, default_value_t = false)]
    resume: bool,

    /// Delay between status polls in milliseconds.
    #[arg(long = "poll-interval-ms", default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Give up on a scan after this many seconds without news (0 = never).
    #[arg(long = "stall-timeout-secs", default_value_t = 600)]
    stall_timeout_secs: u64,

    /// Refresh the client directory used for enrichment every N seconds (0 = never).
    #[arg(long = "client-refresh-secs", default_value_t = 60)]
    client_refresh_secs: u64,

    /// Write results as pretty JSON to this path (optional).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Serve the local dashboard API and UI.
    #[arg(long = "serve-ui", default_value_t = false)]
    serve_ui: bool,

    /// Address for --serve-ui.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// More log output (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const CLI_GROUP: &str = "cli";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,netguard_scan=info",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    info!(
        backend = %cli.backend_url,
        profile = %cli.profile,
        parallel = cli.parallel,
        wan_scan = cli.wan_scan,
        serve_ui = cli.serve_ui,
        "netguard-scan starting"
    );
    if cli.token.is_none() {
        warn!("no bearer token configured; the backend will likely reject requests");
    }

    let mut backend_cfg = BackendConfig::new(cli.backend_url.clone());
    if let Some(t) = cli.token.clone() {
        backend_cfg = backend_cfg.with_token(t);
    }
    let backend = HttpBackend::new(backend_cfg).context("creating backend client")?;
    let orchestrator = ScanOrchestrator::new(
        Arc::new(backend),
        OrchestratorConfig {
            poll_interval: Duration::from_millis(cli.poll_interval_ms.max(100)),
            stall_timeout: (cli.stall_timeout_secs > 0).then(|| Duration::from_secs(cli.stall_timeout_secs)),
        },
    );

    if cli.client_refresh_secs > 0 {
        orchestrator.spawn_client_refresh(Duration::from_secs(cli.client_refresh_secs));
    }

    // Ctrl+C cancels whatever is still running.
    let orch_ctrlc = orchestrator.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            for s in orch_ctrlc.sessions().await {
                if !s.status.is_terminal() {
                    let _ = orch_ctrlc.cancel(s.key).await;
                }
            }
        }
    });

    if cli.serve_ui {
        let state = AppState::new(orchestrator.clone(), cli.wan_address.clone());
        let bind = cli.bind.clone();
        tokio::spawn(async move {
            if let Err(e) = server::spawn_server(&bind, state).await {
                warn!(error = %e, "dashboard server stopped");
            }
        });
        println!("Dashboard starting at http://{} (Ctrl+C to stop)", cli.bind);
    }

    let mut keys: Vec<SessionKey> = Vec::new();

    if cli.resume {
        let n = orchestrator.resume().await;
        println!("Resumed {n} running scan(s)");
        keys.extend(orchestrator.sessions().await.iter().map(|s| s.key));
    }

    if cli.wan_scan {
        let key = orchestrator
            .start_wan(cli.wan_address.as_deref(), cli.profile)
            .await
            .context("starting WAN scan")?;
        keys.push(key);
    } else {
        let targets = if cli.targets.is_empty() && !cli.serve_ui && !cli.resume {
            let nets = netdetect::local_subnets().context("detecting local subnets")?;
            println!("No targets given, using local networks:");
            for n in &nets {
                println!("  - {n}");
            }
            nets.iter().map(|n| n.to_string()).collect()
        } else {
            cli.targets.clone()
        };

        if !targets.is_empty() {
            if cli.parallel {
                orchestrator
                    .start_parallel(CLI_GROUP, &targets, cli.profile)
                    .await
                    .context("starting parallel scan")?;
                if let Some(p) = orchestrator.group_progress(CLI_GROUP).await {
                    keys.extend(p.members);
                }
            } else {
                // on failure the scans already started are cancelled
                let started = orchestrator
                    .start_all(&targets, cli.profile)
                    .await
                    .context("starting scans")?;
                keys.extend(started);
            }
        }
    }

    let mut all_hosts: Vec<HostRecord> = Vec::new();
    for key in keys {
        let Some(session) = orchestrator.wait_until_terminal(key).await else {
            continue;
        };
        print_session_summary(&session);
        if let Some(hosts) = orchestrator.take_results(key).await {
            all_hosts.extend(hosts);
        }
    }

    if !all_hosts.is_empty() || !cli.serve_ui {
        print_results_table(&all_hosts);
    }
    if let Some(path) = cli.output.as_deref() {
        if let Err(e) = write_results_json(path, &all_hosts) {
            eprintln!("Failed to write JSON to {}: {}", path.display(), e);
        } else {
            println!("Wrote JSON results to {}", path.display());
        }
    }

    if cli.serve_ui {
        println!("Press Ctrl+C to stop the server...");
        let _ = tokio::signal::ctrl_c().await;
        orchestrator.shutdown();
    }

    Ok(())
}

fn print_session_summary(s: &ScanSession) {
    match s.status {
        SessionStatus::Complete => println!(
            "[{}] {} complete: {} host(s)",
            s.key, s.target, s.hosts_found
        ),
        _ => println!(
            "[{}] {} {:?}: {}",
            s.key,
            s.target,
            s.status,
            s.error.as_deref().unwrap_or("no details")
        ),
    }
}

fn print_results_table(hosts: &[HostRecord]) {
    let mut addr_w = "address".len();
    let mut name_w = "hostname".len();
    let mut os_w = "os".len();
    for h in hosts {
        addr_w = addr_w.max(h.address.len());
        name_w = name_w.max(h.hostname.len().min(32));
        os_w = os_w.max(h.os_guess.len().min(32));
    }

    println!("\nHosts up: {}", hosts.len());
    println!(
        "{:<addr_w$}  {:<name_w$}  {:<os_w$}  open ports",
        "address",
        "hostname",
        "os",
        addr_w = addr_w,
        name_w = name_w,
        os_w = os_w
    );
    println!(
        "{:-<addr_w$}  {:-<name_w$}  {:-<os_w$}  {:-<10}",
        "",
        "",
        "",
        "",
        addr_w = addr_w,
        name_w = name_w,
        os_w = os_w
    );
    for h in hosts {
        let ports = h
            .open_ports
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",");
        println!(
            "{:<addr_w$}  {:<name_w$}  {:<os_w$}  {}",
            h.address,
            truncate(&h.hostname, 32),
            truncate(&h.os_guess, 32),
            ports,
            addr_w = addr_w,
            name_w = name_w,
            os_w = os_w
        );
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn write_results_json(path: &std::path::Path, hosts: &[HostRecord]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, hosts)?;
    Ok(())
}
