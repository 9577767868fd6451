use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use synce_conninfo::{ConnectionInfo, list_in, synce_directory};
use tracing::debug;

/// CLI tool to inspect the connection files the SynCE daemon keeps for
/// connected Windows Mobile devices
#[derive(Parser, Debug)]
#[clap(name = "synce-conninfo", about = "Show SynCE device connection info")]
struct Args {
    /// State directory to scan (defaults to $SYNCE_DIR or ~/.synce)
    #[clap(short, long)]
    dir: Option<PathBuf>,

    /// List every live connection instead of just the first
    #[clap(short, long)]
    all: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let dir = match args.dir {
        Some(dir) => dir,
        None => synce_directory().context("locating the SynCE state directory")?,
    };
    debug!("scanning {}", dir.display());

    let connections = list_in(&dir)
        .with_context(|| format!("scanning {}", dir.display()))?;

    if connections.is_empty() {
        println!("No device connected (no live connection files in {}).", dir.display());
        std::process::exit(1);
    }

    let shown: &[ConnectionInfo] = if args.all {
        &connections
    } else {
        &connections[..1]
    };

    for info in shown {
        print_connection(info);
    }
    if !args.all && connections.len() > 1 {
        println!("({} more connected; use --all)", connections.len() - 1);
    }
    Ok(())
}

fn print_connection(info: &ConnectionInfo) {
    println!("{}", info.name);
    println!("  address:   {}", info.device_ip);
    if let Some(model) = &info.model {
        println!("  model:     {}", model);
    }
    if let Some(os) = info.os_description() {
        println!("  os:        {}", os);
    }
    if let Some(cpu) = info.processor_type {
        println!("  cpu type:  {}", cpu);
    }
    if let (Some(p1), Some(p2)) = (info.partner_id_1, info.partner_id_2) {
        println!("  partners:  {} / {}", p1, p2);
    }
    println!(
        "  transport: {}",
        info.transport.as_deref().unwrap_or("(legacy proxy)")
    );
    if let Some(pid) = info.dccm_pid {
        println!("  daemon:    pid {}", pid);
    }
    if let Some(source) = &info.source {
        println!("  file:      {}", source.display());
    }
    println!(
        "  locked:    {}",
        if info.password.is_some() { "yes" } else { "no" }
    );
}
