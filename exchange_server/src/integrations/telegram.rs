use exchange_engine::{
    db_types::Notification,
    events::{EventHandlers, EventHooks, NotifiableEvent},
};
use futures::future::BoxFuture;
use log::*;
use provider_tools::{escape_html, ProviderApiError, TelegramApi, TelegramConfig};

pub const TELEGRAM_EVENT_BUFFER_SIZE: usize = 25;

/// Assigns event handlers that forward user notifications to Telegram.
///
/// Every committed order creation, order status change and wallet credit carries the notification that was stored with
/// it. The handlers send its title and message to the user's chat. Delivery is best-effort: failures are logged and
/// nothing is retried, since the ledger has already been committed by the time the event is published.
///
/// If no bot token is configured, no hooks are registered and notifications stay in the database only.
pub fn create_telegram_event_handlers(config: TelegramConfig) -> Result<EventHandlers, ProviderApiError> {
    let mut hooks = EventHooks::default();
    if !config.is_configured() {
        warn!("✉️ XG_TELEGRAM_BOT_TOKEN is not set. User notifications will not be sent to Telegram.");
        return Ok(EventHandlers::new(TELEGRAM_EVENT_BUFFER_SIZE, hooks));
    }
    let api = TelegramApi::new(config)?;
    let api_clone = api.clone();
    hooks.on_order_created(move |ev| notify(api_clone.clone(), ev));
    let api_clone = api.clone();
    hooks.on_order_status_changed(move |ev| notify(api_clone.clone(), ev));
    hooks.on_deposit_credited(move |ev| notify(api.clone(), ev));
    Ok(EventHandlers::new(TELEGRAM_EVENT_BUFFER_SIZE, hooks))
}

fn notify<E: NotifiableEvent>(api: TelegramApi, event: E) -> BoxFuture<'static, ()> {
    let chat_id = event.telegram_id();
    let text = format_notification(event.notification());
    let notification_id = event.notification().id;
    Box::pin(async move {
        match api.send_message(chat_id, &text).await {
            Ok(()) => debug!("✉️ Notification #{notification_id} sent to chat {chat_id}"),
            Err(e) => warn!("✉️ Could not send notification #{notification_id} to chat {chat_id}. {e}"),
        }
    })
}

/// Renders a notification for Telegram's HTML parse mode: the title in bold, then the message.
pub fn format_notification(notification: &Notification) -> String {
    format!("<b>{}</b>\n{}", escape_html(&notification.title), escape_html(&notification.message))
}
