//! tls-policy-resolve
//!
//! Resolves the TLS policy for one subject and prints the choice report as
//! JSON. The subject is read from a file or stdin, e.g.
//! `{"kind": "host_registration", "host_name": "esx1", "vendor": "VMWARE"}`.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;

use tls_policy::{
    ChoiceReport, ConfigError, InMemoryStores, PolicySubject, PolicyType, ResolutionError,
    TlsPolicy, TlsPolicyConfig, TlsPolicyEngine, TlsPolicyError, TlsPolicySubject, TlsProtection,
    TlsVersion,
};

/// Resolve the TLS trust policy that governs a managed host.
#[derive(Parser, Debug)]
#[command(name = "tls-policy-resolve", version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (allowed types, global and default policies)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON store snapshot (stored policies, host and vendor assignments)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Also build the executable policy and describe it
    #[arg(long)]
    create: bool,

    /// Subject JSON file; stdin when omitted
    subject: Option<PathBuf>,
}

#[derive(Serialize)]
struct Output<'a> {
    report: &'a ChoiceReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    policy: Option<PolicySummary>,
}

#[derive(Serialize)]
struct PolicySummary {
    policy_type: PolicyType,
    protection: TlsProtection,
    protocols: Vec<TlsVersion>,
    secure: bool,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_subject(path: Option<&Path>) -> Result<TlsPolicySubject, TlsPolicyError> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(p).map_err(|source| ConfigError::Io {
            path: p.to_path_buf(),
            source,
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| ConfigError::Io {
                    path: PathBuf::from("-"),
                    source,
                })?;
            buf
        }
    };
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(ConfigError::from)?;
    TlsPolicySubject::from_json(&value)
}

fn run(cli: &Cli) -> Result<String, TlsPolicyError> {
    let mut config = match &cli.config {
        Some(path) => TlsPolicyConfig::from_json_file(path)?,
        None => TlsPolicyConfig::new(),
    };
    config.apply_env()?;

    let stores = match &cli.store {
        Some(path) => InMemoryStores::load_json_file(path)?,
        None => InMemoryStores::new(),
    };
    let engine = TlsPolicyEngine::new(stores.policy_stores());

    let parsed = read_subject(cli.subject.as_deref())?;
    let subject = parsed.as_subject();
    let report = engine
        .resolve_policy_with_report(subject, &config)?
        .ok_or_else(|| ResolutionError::NotFound {
            address: subject.host_descriptor().internet_address,
        })?;

    let policy = if cli.create {
        let policy = engine.create(&report.descriptor)?;
        Some(PolicySummary {
            policy_type: policy.policy_type(),
            protection: policy.protection(),
            protocols: policy.protocol_versions().to_vec(),
            secure: policy.is_secure(),
        })
    } else {
        None
    };

    let output = Output {
        report: &report,
        policy,
    };
    serde_json::to_string_pretty(&output).map_err(|e| TlsPolicyError::internal(e.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
