// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kubekit::addons::metallb;
use kubekit::bulk::{self, BulkPodsConfig};
use kubekit::config::Config;
use kubekit::kubernetes::pods::{self, PodConfig};
use kubekit::kubernetes::{apply, namespaces, KubeClient};
use kubekit::tools::kube_proxy::{self, KubeProxyLocation};
use kubekit::types::ImagePullPolicy;

#[derive(Parser)]
#[command(name = "kubekit")]
#[command(about = "Convenience commands for driving a Kubernetes cluster", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Namespace for namespaced commands (defaults to KUBEKIT_NAMESPACE)
    #[arg(short, long, global = true, default_value = "")]
    namespace: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage namespaces
    #[command(subcommand)]
    Namespace(NamespaceCommand),

    /// Manage pods
    #[command(subcommand)]
    Pod(PodCommand),

    /// Run a command inside a pod
    Exec {
        pod: String,

        /// Container to run in; the first one when unset
        #[arg(short, long)]
        container: Option<String>,

        #[arg(last = true, required = true)]
        command: Vec<String>,
    },

    /// Server-side apply every document of a manifest
    Apply {
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,
    },

    /// Delete every object named in a manifest
    Delete {
        #[arg(short = 'f', long = "filename")]
        file: PathBuf,
    },

    /// Install and configure MetalLB
    #[command(subcommand)]
    Metallb(MetallbCommand),

    /// Inspect kube-proxy
    #[command(subcommand)]
    KubeProxy(KubeProxyCommand),

    /// Create many pods across random namespaces and time their start-up
    BulkPods {
        #[arg(long, default_value_t = 10)]
        namespaces: usize,

        #[arg(long, default_value_t = 100)]
        pods: usize,

        #[arg(long, default_value = "docker.io/nginx")]
        image: String,

        #[arg(long, default_value_t = 20)]
        concurrency: usize,

        /// Keep the namespaces instead of deleting them afterwards
        #[arg(long)]
        keep: bool,
    },
}

#[derive(Subcommand)]
enum NamespaceCommand {
    Create { name: String },
    /// Delete and wait until the namespace is gone
    Delete { name: String },
    List,
}

#[derive(Subcommand)]
enum PodCommand {
    /// Create a single-container pod and wait until it runs
    Create {
        name: String,

        #[arg(long)]
        image: String,

        /// Labels as key=value
        #[arg(short, long, value_parser = parse_label)]
        label: Vec<(String, String)>,

        #[arg(long)]
        pull_policy: Option<ImagePullPolicy>,
    },
    /// Print the pod IP
    Ip { name: String },
    /// Print the first pod whose name contains the given text
    Find { substring: String },
}

#[derive(Subcommand)]
enum MetallbCommand {
    /// Apply the upstream manifests for a release, e.g. v0.9.6
    Deploy {
        #[arg(long)]
        version: String,
    },
    /// Create the memberlist secret
    Secret,
    /// Create the legacy layer2 address-pool configmap
    Config {
        #[arg(long, required = true)]
        addresses: Vec<String>,
    },
    /// Create an IPAddressPool and an L2Advertisement for it
    Pool {
        name: String,

        #[arg(long, required = true)]
        addresses: Vec<String>,

        #[arg(long)]
        no_auto_assign: bool,
    },
}

#[derive(Subcommand)]
enum KubeProxyCommand {
    /// Print the proxy mode (iptables or ipvs)
    Mode,
    /// Save the node's firewall rules to a local file
    SaveFirewall,
}

fn parse_label(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("kubekit={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;
    let kc = KubeClient::connect(&config)
        .await
        .context("Failed to connect to the cluster")?;

    let interrupt = kc.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let ns = cli.namespace.as_str();
    match cli.command {
        Commands::Namespace(cmd) => namespace(&kc, cmd).await,
        Commands::Pod(cmd) => pod(&kc, ns, cmd).await,
        Commands::Exec {
            pod,
            container,
            command,
        } => {
            let command: Vec<&str> = command.iter().map(String::as_str).collect();
            let output = pods::exec(&kc, ns, &pod, container.as_deref(), &command).await?;
            print!("{}", output.stdout);
            eprint!("{}", output.stderr);
            Ok(())
        }
        Commands::Apply { file } => print_lines(apply::apply_yaml(&kc, &read_manifest(&file).await?).await?),
        Commands::Delete { file } => print_lines(apply::delete_yaml(&kc, &read_manifest(&file).await?).await?),
        Commands::Metallb(cmd) => metallb(&kc, cmd).await,
        Commands::KubeProxy(cmd) => kube_proxy(&kc, cmd).await,
        Commands::BulkPods {
            namespaces,
            pods,
            image,
            concurrency,
            keep,
        } => {
            let config = BulkPodsConfig {
                namespaces,
                pods_per_namespace: pods,
                image,
                concurrency,
            };
            bulk_pods(&kc, &config, keep).await
        }
    }
}

async fn read_manifest(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_lines(lines: Vec<String>) -> Result<()> {
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

async fn namespace(kc: &KubeClient, cmd: NamespaceCommand) -> Result<()> {
    match cmd {
        NamespaceCommand::Create { name } => {
            namespaces::create(kc, &name).await?;
        }
        NamespaceCommand::Delete { name } => {
            namespaces::delete(kc, &name)
                .await
                .with_context(|| format!("Namespace {} was not removed", name))?;
        }
        NamespaceCommand::List => print_lines(namespaces::list(kc).await?)?,
    }
    Ok(())
}

async fn pod(kc: &KubeClient, ns: &str, cmd: PodCommand) -> Result<()> {
    match cmd {
        PodCommand::Create {
            name,
            image,
            label,
            pull_policy,
        } => {
            let config = PodConfig {
                name,
                namespace: ns.to_string(),
                image,
                labels: label.into_iter().collect::<BTreeMap<_, _>>(),
                image_pull_policy: pull_policy,
                ..Default::default()
            };
            pods::create(kc, &config).await?;
        }
        PodCommand::Ip { name } => println!("{}", pods::get_ip(kc, ns, &name).await?),
        PodCommand::Find { substring } => {
            let pod = pods::find_by_name_contains(kc, ns, &substring).await?;
            println!("{}", kube::ResourceExt::name_any(&pod));
        }
    }
    Ok(())
}

async fn metallb(kc: &KubeClient, cmd: MetallbCommand) -> Result<()> {
    match cmd {
        MetallbCommand::Deploy { version } => {
            print_lines(metallb::deploy(kc, &version).await?)?;
        }
        MetallbCommand::Secret => {
            metallb::create_secret(kc).await?;
        }
        MetallbCommand::Config { addresses } => {
            let config = metallb::LegacyConfig {
                addresses,
                ..Default::default()
            };
            metallb::create_config(kc, &config).await?;
        }
        MetallbCommand::Pool {
            name,
            addresses,
            no_auto_assign,
        } => {
            metallb::create_address_pool(kc, &name, &addresses, !no_auto_assign).await?;
            metallb::create_l2_advertisement(kc, &name, &[name.clone()]).await?;
        }
    }
    Ok(())
}

async fn kube_proxy(kc: &KubeClient, cmd: KubeProxyCommand) -> Result<()> {
    let location = KubeProxyLocation::default();
    match cmd {
        KubeProxyCommand::Mode => println!("{}", kube_proxy::detect_mode(kc, &location).await?),
        KubeProxyCommand::SaveFirewall => {
            let path = kube_proxy::save_firewall_state(kc, &location).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn bulk_pods(kc: &KubeClient, config: &BulkPodsConfig, keep: bool) -> Result<()> {
    let report = bulk::create_pods(kc, config).await?;

    for timing in &report.timings {
        println!(
            "{}/{}\t{:.1}s",
            timing.namespace,
            timing.pod,
            timing.ready_after.as_secs_f64()
        );
    }
    for (pod, reason) in &report.failures {
        println!("{}\tFAILED: {}", pod, reason);
    }
    if let Some(mean) = report.mean_ready_time() {
        info!(
            "Mean time to ready {:.1}s over {} pods",
            mean.as_secs_f64(),
            report.timings.len()
        );
    }
    if let Some(slowest) = report.slowest() {
        info!(
            "Slowest pod {}/{} took {:.1}s",
            slowest.namespace,
            slowest.pod,
            slowest.ready_after.as_secs_f64()
        );
    }

    if keep {
        info!("Keeping namespaces {:?}", report.namespaces);
        return Ok(());
    }
    bulk::cleanup(kc, &report.namespaces)
        .await
        .context("Failed to clean up namespaces")
}
