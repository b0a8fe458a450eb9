//! Notifier — fire-and-forget event sink for user-visible state changes.
//!
//! Detects the webhook flavor heuristically from the URL and renders
//! accordingly. Delivery failures are logged at warning and never propagate.

use std::time::Duration;

use serde_json::json;

use crate::model::WardenEvent;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WebhookFlavor {
    DiscordEmbed,
    SlackText,
    Generic,
}

fn flavor_of(url: &str) -> WebhookFlavor {
    if url.contains("discord.com/api/webhooks") {
        WebhookFlavor::DiscordEmbed
    } else if url.contains("hooks.slack.com") {
        WebhookFlavor::SlackText
    } else {
        WebhookFlavor::Generic
    }
}

#[derive(Clone)]
pub struct Notifier {
    url: Option<String>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { url, client }
    }

    /// Fire-and-forget: spawns the delivery and returns immediately.
    pub fn notify(&self, event: WardenEvent) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = deliver(&client, &url, &event).await {
                tracing::warn!(error = %e, kind = event.kind(), "notification delivery failed");
            }
        });
    }
}

async fn deliver(client: &reqwest::Client, url: &str, event: &WardenEvent) -> Result<(), reqwest::Error> {
    let body = render(url, event);
    client.post(url).json(&body).send().await?.error_for_status()?;
    Ok(())
}

fn render(url: &str, event: &WardenEvent) -> serde_json::Value {
    match flavor_of(url) {
        WebhookFlavor::DiscordEmbed => json!({
            "embeds": [{
                "title": event.kind(),
                "description": message_of(event),
            }],
        }),
        WebhookFlavor::SlackText => json!({
            "text": format!("*{}*: {}", event.kind(), message_of(event)),
        }),
        WebhookFlavor::Generic => serde_json::to_value(event).unwrap_or(json!({ "type": event.kind() })),
    }
}

fn message_of(event: &WardenEvent) -> String {
    match event {
        WardenEvent::ContainerUpdated { message, .. }
        | WardenEvent::ContainerUnhealthy { message, .. }
        | WardenEvent::ContainerGaveUp { message, .. }
        | WardenEvent::ContainerRestarted { message, .. }
        | WardenEvent::UpdateCycleStart { message, .. }
        | WardenEvent::UpdateCycleEnd { message, .. } => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discord_urls_are_detected() {
        assert_eq!(
            flavor_of("https://discord.com/api/webhooks/123/abc"),
            WebhookFlavor::DiscordEmbed
        );
    }

    #[test]
    fn slack_urls_are_detected() {
        assert_eq!(flavor_of("https://hooks.slack.com/services/T/B/X"), WebhookFlavor::SlackText);
    }

    #[test]
    fn unknown_urls_fall_back_to_generic() {
        assert_eq!(flavor_of("https://example.com/hook"), WebhookFlavor::Generic);
    }

    #[test]
    fn no_url_configured_means_notify_is_a_no_op() {
        // constructing and calling notify() without a configured URL must not panic
        // and must not attempt any network I/O; there is nothing further to assert
        // since delivery is fire-and-forget.
        let notifier = Notifier::new(None);
        notifier.notify(WardenEvent::UpdateCycleStart {
            timestamp: chrono::Utc::now(),
            message: "cycle started".to_string(),
        });
    }
}
