//! Bot orchestration: routes user intents to the GPS core and
//! formats the results for Telegram.

use anyhow::Result;
use tokio::time::Duration;
use tracing::{error, info};

use crate::frontend::telegram::{
    BotCommand, CallbackQuery, InlineKeyboard, Message, TelegramClient, Update,
};
use crate::lang;
use crate::module::gps::{TrackingClient, VehicleActivity, VehicleSnapshot};
use crate::module::maps::MapsClient;

const CALLBACK_CHECK_STATUS: &str = "check_status";
const CALLBACK_UPDATE_LOCATION: &str = "update_location";

/// How long to back off after a failed update poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct BotHandler {
    telegram: TelegramClient,
    gps: TrackingClient,
    maps: MapsClient,
}

impl BotHandler {
    pub fn new(telegram: TelegramClient, gps: TrackingClient, maps: MapsClient) -> Self {
        Self { telegram, gps, maps }
    }

    /// Run the long-polling update loop. Never returns on the happy
    /// path; individual update failures are logged and skipped.
    pub async fn run(&self) -> Result<()> {
        if let Err(e) = self
            .telegram
            .set_my_commands(vec![
                BotCommand { command: "start", description: lang::CMD_START },
                BotCommand { command: "help", description: lang::CMD_HELP },
            ])
            .await
        {
            error!("Failed to set bot commands: {:#}", e);
        }

        info!("Bot started, entering update loop");
        let mut offset = 0i64;
        loop {
            match self.telegram.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    error!("Failed to poll Telegram updates: {:#}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn handle_update(&self, update: Update) {
        if let Some(message) = update.message {
            self.handle_message(message).await;
        } else if let Some(callback) = update.callback_query {
            self.handle_callback(callback).await;
        }
    }

    async fn handle_message(&self, message: Message) {
        let chat_id = message.chat.id;
        let text = message.text.as_deref().unwrap_or("").trim();

        let result = match text {
            "/start" => {
                self.telegram
                    .send_message(chat_id, lang::WELCOME_MESSAGE, false, Some(&main_keyboard()))
                    .await
                    .map(|_| ())
            }
            "/help" => {
                self.telegram
                    .send_message(chat_id, lang::HELP_MESSAGE, true, Some(&main_keyboard()))
                    .await
                    .map(|_| ())
            }
            _ => return,
        };

        if let Err(e) = result {
            error!("Failed to answer {} in chat {}: {:#}", text, chat_id, e);
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) {
        // Best effort; an expired query id is not worth failing over.
        if let Err(e) = self.telegram.answer_callback_query(&callback.id).await {
            error!("Failed to answer callback query: {:#}", e);
        }

        let Some(chat_id) = callback.message.as_ref().map(|m| m.chat.id) else {
            return;
        };

        match callback.data.as_deref() {
            Some(CALLBACK_CHECK_STATUS) => {
                if let Err(e) = self.check_status(chat_id).await {
                    error!("Error in check_status: {:#}", e);
                    self.send_plain(chat_id, lang::STATUS_ERROR).await;
                }
            }
            Some(CALLBACK_UPDATE_LOCATION) => {
                if let Err(e) = self.update_location(chat_id).await {
                    error!("Error in update_location: {:#}", e);
                    self.send_plain(chat_id, lang::UPDATE_ERROR).await;
                }
            }
            _ => {}
        }
    }

    /// "Обновить местоположение": trigger a device-side location push.
    async fn update_location(&self, chat_id: i64) -> Result<()> {
        let processing = self
            .telegram
            .send_message(chat_id, lang::PROCESSING_UPDATE, false, None)
            .await?;

        let sent = self.gps.request_update().await;
        let text = if sent { lang::UPDATE_SUCCESS } else { lang::UPDATE_FAILED };
        self.telegram
            .edit_message_text(chat_id, processing.message_id, text, Some(&main_keyboard()))
            .await
    }

    /// "Проверить статус": fetch, enrich with travel time and map,
    /// and render the status card.
    async fn check_status(&self, chat_id: i64) -> Result<()> {
        let processing = self
            .telegram
            .send_message(chat_id, lang::GETTING_STATUS, false, None)
            .await?;

        let Some(snapshot) = self.gps.fetch_status().await else {
            return self
                .telegram
                .edit_message_text(
                    chat_id,
                    processing.message_id,
                    lang::STATUS_FAILED,
                    Some(&main_keyboard()),
                )
                .await;
        };

        let travel_time = self
            .maps
            .travel_time_home(snapshot.lat, snapshot.lng)
            .await
            .unwrap_or_else(|| lang::STATUS_UNKNOWN.to_string());

        if let Err(e) = self.telegram.delete_message(chat_id, processing.message_id).await {
            error!("Failed to delete processing message: {:#}", e);
        }

        self.telegram
            .send_location(chat_id, snapshot.lat, snapshot.lng)
            .await?;

        if let Some(image) = self.maps.static_map(snapshot.lat, snapshot.lng).await {
            if let Err(e) = self.telegram.send_photo(chat_id, image).await {
                error!("Failed to send map image: {:#}", e);
            }
        }

        self.telegram
            .send_message(
                chat_id,
                &format_status(&snapshot, &travel_time),
                true,
                Some(&main_keyboard()),
            )
            .await
            .map(|_| ())
    }

    async fn send_plain(&self, chat_id: i64, text: &str) {
        if let Err(e) = self
            .telegram
            .send_message(chat_id, text, false, Some(&main_keyboard()))
            .await
        {
            error!("Failed to send message to chat {}: {:#}", chat_id, e);
        }
    }
}

fn main_keyboard() -> InlineKeyboard {
    InlineKeyboard::row(&[
        (lang::BUTTON_CHECK_STATUS, CALLBACK_CHECK_STATUS),
        (lang::BUTTON_UPDATE_LOCATION, CALLBACK_UPDATE_LOCATION),
    ])
}

fn describe_activity(activity: &VehicleActivity) -> String {
    match activity {
        VehicleActivity::Unknown => lang::STATUS_UNKNOWN.to_string(),
        VehicleActivity::Stationary { minutes } => lang::status_static(*minutes),
        VehicleActivity::Raw(raw) => raw.clone(),
    }
}

fn format_status(snapshot: &VehicleSnapshot, travel_time: &str) -> String {
    lang::status_message(
        &snapshot.name,
        &snapshot.update_time.format("%d.%m.%Y %H:%M").to_string(),
        travel_time,
        &describe_activity(&snapshot.activity),
        snapshot.speed,
        snapshot.battery,
    )
}
