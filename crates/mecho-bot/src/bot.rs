use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mecho_cas::CanonicalId;
use mecho_catalog::{AwaitState, AwaitStatus, Catalog};
use mecho_config::{log_bot_debug, log_bot_info, log_bot_warn, Config};
use mecho_fetch::{Fetcher, ImageSource};

use crate::command::Command;
use crate::message::{HandleResult, InboundMessage, Reply};
use crate::reply;

/// Knobs taken from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotSettings {
    pub command: String,
    pub await_ttl: Duration,
    pub list_limit: usize,
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            command: config.bot.command.clone(),
            await_ttl: config.capture.await_ttl(),
            list_limit: config.display.list_limit,
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Message handler over one shared catalog.
pub struct MemeBot<F: Fetcher> {
    catalog: Arc<Catalog>,
    awaiting: AwaitState,
    fetcher: F,
    settings: BotSettings,
}

impl<F: Fetcher> MemeBot<F> {
    pub fn new(catalog: Arc<Catalog>, fetcher: F, settings: BotSettings) -> Self {
        Self {
            catalog,
            awaiting: AwaitState::new(),
            fetcher,
            settings,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn awaiting(&self) -> &AwaitState {
        &self.awaiting
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    /// Handle one message at the current time.
    pub async fn handle(&self, msg: &InboundMessage) -> HandleResult {
        self.handle_at(msg, Utc::now()).await
    }

    /// Handle one message as if received at `now`.
    ///
    /// Commands win; anything else goes through [`MemeBot::on_group_message_at`].
    pub async fn handle_at(&self, msg: &InboundMessage, now: DateTime<Utc>) -> HandleResult {
        match Command::parse(&msg.text, &self.settings.command) {
            Some(command) => self.handle_command_at(command, msg, now).await,
            None => self.on_group_message_at(msg, now).await,
        }
    }

    pub async fn handle_command(&self, command: Command, msg: &InboundMessage) -> HandleResult {
        self.handle_command_at(command, msg, Utc::now()).await
    }

    async fn handle_command_at(
        &self,
        command: Command,
        msg: &InboundMessage,
        now: DateTime<Utc>,
    ) -> HandleResult {
        let word = self.settings.command.as_str();
        log_bot_debug!(
            "Command received",
            conversation = msg.conversation_id.as_str(),
            user = msg.user_id.as_str(),
            command = format!("{command:?}"),
        );

        match command {
            Command::Add => match msg.first_image() {
                Some(image) => self.capture(image).await,
                None => {
                    let expiry =
                        self.awaiting
                            .start_waiting_at(msg.await_key(), self.settings.await_ttl, now);
                    log_bot_debug!(
                        "Awaiting image",
                        user = msg.user_id.as_str(),
                        expiry = expiry.to_rfc3339(),
                    );
                    HandleResult::text(reply::awaiting(self.settings.await_ttl.num_seconds()))
                }
            },

            Command::Name { target, alias } => {
                let Some(id) = self.catalog.resolve(&target) else {
                    return HandleResult::HandledWithError(format!(
                        "{}\nAdd it first with: /{word} add",
                        reply::not_found(&target)
                    ));
                };
                match self.catalog.bind_alias(&id, &alias) {
                    Ok(()) => HandleResult::text(reply::alias_bound(alias.trim(), &id)),
                    Err(e) => HandleResult::HandledWithError(format!("Cannot bind alias: {e}")),
                }
            }

            Command::Show { query } => match self.catalog.describe(&query) {
                Some(desc) => HandleResult::text(reply::show(&desc)),
                None => HandleResult::HandledWithError(reply::not_found(&query)),
            },

            Command::List => HandleResult::text(reply::list(
                word,
                &self.catalog.list(),
                self.settings.list_limit,
            )),

            Command::Delete { query } => {
                let Some(id) = self.catalog.resolve(&query) else {
                    return HandleResult::HandledWithError(reply::not_found(&query));
                };
                if self.catalog.delete_id(&id) {
                    HandleResult::text(reply::deleted(&query, &id))
                } else {
                    HandleResult::HandledWithError(format!("Delete failed: {query}"))
                }
            }

            Command::Reload => match self.catalog.reload() {
                Ok(report) => HandleResult::text(reply::reloaded(&report)),
                Err(e) => {
                    log_bot_warn!("Reload failed", error = e.to_string());
                    HandleResult::HandledWithError(format!("Reload failed: {e}"))
                }
            },

            Command::Incomplete(action) => HandleResult::text(reply::usage_for(word, action)),

            Command::Help => HandleResult::text(reply::help(word)),
        }
    }

    /// Non-command messages: finish a pending capture, or replay a known image.
    pub async fn on_group_message(&self, msg: &InboundMessage) -> HandleResult {
        self.on_group_message_at(msg, Utc::now()).await
    }

    pub async fn on_group_message_at(
        &self,
        msg: &InboundMessage,
        now: DateTime<Utc>,
    ) -> HandleResult {
        let key = msg.await_key();
        match self.awaiting.check_at(&key, now) {
            AwaitStatus::StillWaiting => {
                if let Some(image) = msg.first_image() {
                    let result = self.capture(image).await;
                    self.awaiting.consume(&key);
                    return result;
                }
            }
            AwaitStatus::Expired => {
                log_bot_debug!("Await window expired", user = msg.user_id.as_str());
            }
            AwaitStatus::NotWaiting => {}
        }

        self.replay(msg)
    }

    /// First attached image whose filename names a stored blob.
    fn replay(&self, msg: &InboundMessage) -> HandleResult {
        for image in &msg.images {
            let Some(id) = image.filename_stem().and_then(CanonicalId::parse) else {
                continue;
            };
            if let Some(path) = self.catalog.blob_path(&id) {
                log_bot_info!(
                    "Replaying meme",
                    id = id.as_str(),
                    conversation = msg.conversation_id.as_str(),
                );
                return HandleResult::Handled(Reply::Image(path));
            }
        }
        HandleResult::NotHandled
    }

    async fn capture(&self, image: &ImageSource) -> HandleResult {
        let data = match image.load(&self.fetcher).await {
            Ok(data) => data,
            Err(e) => {
                log_bot_warn!("Could not read image", error = e.to_string());
                return HandleResult::HandledWithError(format!("Add failed: {e}"));
            }
        };

        match self.catalog.add_from_bytes(&data.bytes, &data.extension) {
            Ok(id) => {
                let alias = self.catalog.aliases().reverse_lookup(&id);
                HandleResult::text(reply::added(&self.settings.command, &id, alias.as_deref()))
            }
            Err(e) => {
                log_bot_warn!("Could not store image", error = e.to_string());
                HandleResult::HandledWithError(format!("Add failed: {e}"))
            }
        }
    }
}
