pub mod format;
pub mod notifier;
pub mod telegram;

use tracing::warn;

use crate::config::Settings;
use notifier::{ConsoleNotifier, Notifier};
use telegram::TelegramNotifier;

/// Pick the sink: Telegram when both credentials are set, console otherwise.
pub fn from_settings(settings: &Settings) -> Box<dyn Notifier> {
    if !settings.telegram_configured() {
        warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set; alerts go to the log");
        return Box::new(ConsoleNotifier);
    }

    match TelegramNotifier::from_settings(settings) {
        Ok(telegram) => Box::new(telegram),
        Err(e) => {
            warn!(error = %e, "Telegram client unavailable; alerts go to the log");
            Box::new(ConsoleNotifier)
        }
    }
}
