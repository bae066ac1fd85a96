//! Gateway: wires the store, notifiers and resolver together and runs the
//! background loops.
//!
//! Everything is constructed explicitly in `main` and handed in here; there
//! is no global registry.

mod digest;
mod scheduler;


use aide_core::config::{Config, DigestConfig, SchedulerConfig};
use aide_core::error::AideError;
use aide_core::message::{Language, Notification};
use aide_core::traits::Notifier;
use aide_memory::{Owner, Store};
use aide_resolver::EntityResolver;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// How often expired disambiguation contexts are dropped.
const CONTEXT_PURGE_SECS: u64 = 300;

pub struct Gateway {
    pub(super) store: Store,
    pub(super) notifiers: HashMap<String, Arc<dyn Notifier>>,
    pub(super) resolver: Arc<EntityResolver>,
    pub(super) scheduler_config: SchedulerConfig,
    pub(super) digest_config: DigestConfig,
    /// Language for owners that have not chosen one.
    pub(super) default_language: Language,
}

impl Gateway {
    pub fn new(
        store: Store,
        notifiers: HashMap<String, Arc<dyn Notifier>>,
        resolver: Arc<EntityResolver>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            notifiers,
            resolver,
            scheduler_config: config.scheduler.clone(),
            digest_config: config.digest.clone(),
            default_language: Language::from_name(&config.locale.language),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn resolver(&self) -> &EntityResolver {
        &self.resolver
    }

    pub(super) fn language_of(&self, owner: &Owner) -> Language {
        owner
            .language
            .as_deref()
            .map_or(self.default_language, Language::from_name)
    }

    /// Send `text` to `owner` through the notifier named by their channel.
    pub(super) async fn notify(&self, owner: &Owner, text: String) -> Result<(), AideError> {
        let notifier = self.notifiers.get(&owner.channel).ok_or_else(|| {
            AideError::Channel(format!("no notifier registered for '{}'", owner.channel))
        })?;
        let notification = Notification {
            owner_id: owner.id.clone(),
            channel: owner.channel.clone(),
            reply_target: owner.reply_target.clone(),
            text,
        };
        notifier.send(&notification).await
    }

    /// Run the dispatch and digest loops until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        let mut names: Vec<&str> = self.notifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        info!(
            "aide gateway running | notifiers: {} | scheduler: {} | digest: {}",
            names.join(", "),
            if self.scheduler_config.enabled { "on" } else { "off" },
            if self.digest_config.enabled { "on" } else { "off" },
        );

        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        if self.scheduler_config.enabled {
            let gw = self.clone();
            handles.push(tokio::spawn(async move { gw.scheduler_loop().await }));
        }
        if self.digest_config.enabled {
            let gw = self.clone();
            handles.push(tokio::spawn(async move { gw.digest_loop().await }));
        }
        let gw = self.clone();
        handles.push(tokio::spawn(async move { gw.context_purge_loop().await }));

        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for shutdown signal: {e}");
        }
        info!("Received shutdown signal");

        for handle in &handles {
            handle.abort();
        }
        info!("aide gateway stopped");
        Ok(())
    }

    async fn scheduler_loop(&self) {
        let period = Duration::from_secs(self.scheduler_config.poll_interval_secs);
        loop {
            match self.sweep(Utc::now()).await {
                Ok(report) if !report.is_empty() => info!("scheduler: {report}"),
                Ok(_) => {}
                Err(e) => error!("scheduler: sweep failed: {e}"),
            }
            tokio::time::sleep(period).await;
        }
    }

    async fn digest_loop(&self) {
        let period = Duration::from_secs(self.digest_config.poll_interval_secs);
        loop {
            match self.digest_tick(Utc::now()).await {
                Ok(0) => {}
                Ok(sent) => info!("digest: sent {sent} digest(s)"),
                Err(e) => error!("digest: tick failed: {e}"),
            }
            tokio::time::sleep(period).await;
        }
    }

    async fn context_purge_loop(&self) {
        let period = Duration::from_secs(CONTEXT_PURGE_SECS);
        loop {
            tokio::time::sleep(period).await;
            let removed = self.resolver.contexts().purge_expired(Utc::now()).await;
            if removed > 0 {
                info!("resolver: purged {removed} expired disambiguation context(s)");
            }
        }
    }
}
