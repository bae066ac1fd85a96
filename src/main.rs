mod gateway;
mod i18n;

use aide_channels::{LogNotifier, TelegramNotifier};
use aide_core::config::{self, shellexpand, AideConfig, Config};
use aide_core::domain::Domain;
use aide_core::message::Language;
use aide_core::traits::Notifier;
use aide_memory::Store;
use aide_resolver::{EntityResolver, Resolution};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "aide",
    version,
    about = "aide: reminders, digests and entity resolution for a personal assistant"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the reminder and digest loops until Ctrl-C.
    Start,
    /// Run a single reminder sweep and exit.
    Sweep,
    /// Show configuration and store health.
    Status,
    /// Resolve a free-text reference against an owner's records.
    Resolve {
        /// Owner id.
        #[arg(long)]
        owner: String,
        /// Record kind: task, contact, list, event or email.
        #[arg(long, default_value = "task")]
        domain: String,
        /// The reference, e.g. "buy milk".
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
}

/// Console output plus a non-blocking file log under `{data_dir}/logs`.
/// The guard must live as long as the process.
fn init_logging(cfg: &AideConfig) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level))
    };
    let log_dir = PathBuf::from(shellexpand(&cfg.data_dir)).join("logs");

    match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(&log_dir, "aide.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer())
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .init();
            Some(guard)
        }
        Err(e) => {
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer())
                .init();
            warn!("file logging disabled, cannot create {}: {e}", log_dir.display());
            None
        }
    }
}

/// Notifiers by channel name. The log notifier is always present.
fn build_notifiers(cfg: &Config) -> anyhow::Result<HashMap<String, Arc<dyn Notifier>>> {
    let mut notifiers: HashMap<String, Arc<dyn Notifier>> = HashMap::new();
    notifiers.insert("log".to_string(), Arc::new(LogNotifier));

    if let Some(ref tg) = cfg.channel.telegram {
        if tg.enabled {
            let telegram = TelegramNotifier::from_config(tg)?;
            notifiers.insert("telegram".to_string(), Arc::new(telegram));
        }
    }
    Ok(notifiers)
}

async fn build_gateway(cfg: &Config) -> anyhow::Result<gateway::Gateway> {
    let store = Store::new(&cfg.memory)
        .await?
        .with_timezone(cfg.locale.tz()?);
    let notifiers = build_notifiers(cfg)?;
    let resolver = Arc::new(EntityResolver::new(
        Arc::new(store.clone()),
        &cfg.resolver,
    ));
    Ok(gateway::Gateway::new(store, notifiers, resolver, cfg))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _guard = init_logging(&cfg.aide);

    match cli.command {
        Commands::Start => {
            let gw = Arc::new(build_gateway(&cfg).await?);
            info!("{} starting", cfg.aide.name);
            gw.run().await?;
        }
        Commands::Sweep => {
            let gw = build_gateway(&cfg).await?;
            let report = gw.sweep(Utc::now()).await?;
            println!("sweep: {report}");
        }
        Commands::Status => {
            println!("aide status\n");
            println!("Config: {}", cli.config);
            println!("Data dir: {}", shellexpand(&cfg.aide.data_dir));
            println!("Database: {}", shellexpand(&cfg.memory.db_path));
            println!("Timezone: {}", cfg.locale.timezone);
            println!("Language: {}", cfg.locale.language);
            println!(
                "Scheduler: {} (every {}s, grace {}m)",
                if cfg.scheduler.enabled { "on" } else { "off" },
                cfg.scheduler.poll_interval_secs,
                cfg.scheduler.grace_window_minutes
            );
            println!(
                "Digest: {} (at {:02}:00 owner-local)",
                if cfg.digest.enabled { "on" } else { "off" },
                cfg.digest.hour
            );
            println!();

            match &cfg.channel.telegram {
                Some(tg) if tg.enabled && !tg.bot_token.is_empty() => {
                    println!("  telegram: configured")
                }
                Some(tg) if tg.enabled => println!("  telegram: enabled but missing bot_token"),
                Some(_) => println!("  telegram: disabled"),
                None => println!("  telegram: not configured"),
            }
            println!();

            let store = Store::new(&cfg.memory).await?;
            for (table, count) in store.table_counts().await? {
                println!("  {table}: {count}");
            }
        }
        Commands::Resolve {
            owner,
            domain,
            query,
        } => {
            if query.is_empty() {
                anyhow::bail!("no query provided. Usage: aide resolve --owner <id> <text>");
            }
            let domain: Domain = domain.parse()?;
            let gw = build_gateway(&cfg).await?;
            let language = match gw.store().get_owner(&owner).await? {
                Some(o) => Language::from_name(o.language.as_deref().unwrap_or(&cfg.locale.language)),
                None => Language::from_name(&cfg.locale.language),
            };
            let resolution = gw
                .resolver()
                .resolve_one_or_ask(&query.join(" "), &owner, domain, language, Utc::now())
                .await?;
            match resolution {
                Resolution::NotFound => println!("no match"),
                Resolution::Resolved(c) => println!(
                    "{} {} ({:.2}, {:?})",
                    c.entity.id(),
                    c.entity.label(),
                    c.score,
                    c.reason
                ),
                Resolution::Ambiguous { prompt, .. } => println!("{prompt}"),
                Resolution::Selected(r) => println!("{}", r.id.unwrap_or_default()),
            }
        }
    }

    Ok(())
}
