use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::NotifyError;
use crate::models::ProductSnapshot;

const TELEGRAM_API: &str = "https://api.telegram.org";

pub trait Notify {
    fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Posts messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

#[derive(Deserialize)]
struct TelegramReply {
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: Client, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client,
            bot_token,
            chat_id,
        }
    }
}

impl Notify for TelegramNotifier {
    fn send(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return Err(NotifyError::NotConfigured);
        };

        let url = format!("{TELEGRAM_API}/bot{token}/sendMessage");
        let resp = self
            .client
            .post(url)
            .form(&[("chat_id", chat_id.as_str()), ("text", text)])
            .send()?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let reply = resp.json::<TelegramReply>().ok();
        Err(rejection(status, reply))
    }
}

fn rejection(status: StatusCode, reply: Option<TelegramReply>) -> NotifyError {
    let description = reply.and_then(|reply| reply.description).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string()
    });
    NotifyError::Rejected {
        status: status.as_u16(),
        description,
    }
}

fn amount(value: Option<f64>) -> String {
    value.map_or_else(|| "not found".to_string(), |v| format!("₹{v}"))
}

/// Text for a deal found by the keyword scan.
pub fn deal_message(snapshot: &ProductSnapshot) -> String {
    let title = snapshot.title.as_deref().unwrap_or("(Title not found)");
    let rating = snapshot
        .rating
        .map_or_else(|| "not found".to_string(), |r| r.to_string());
    format!(
        "🔥 HOT DEAL ALERT! 🔥\n\n🛒 {title}\n🔗 {url}\n💰 Current Price: {price}\n💰 Actual Price: {list}\n⭐ Rating: {rating}",
        url = snapshot.url,
        price = amount(snapshot.price),
        list = amount(snapshot.list_price),
    )
}

/// Text for a tracked product at or under its target.
pub fn target_message(url: &str, price: f64) -> String {
    format!("🔥 Grab fast! Price dropped!\n\nProduct: {url}\nCurrent Price: ₹{price}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_message_fills_gaps() {
        let snapshot = ProductSnapshot {
            url: "https://x/dp/1".into(),
            price: Some(1200.0),
            rating: Some(4.5),
            ..ProductSnapshot::default()
        };
        let text = deal_message(&snapshot);
        assert!(text.contains("(Title not found)"));
        assert!(text.contains("Current Price: ₹1200"));
        assert!(text.contains("Actual Price: not found"));
        assert!(text.contains("Rating: 4.5"));
    }

    #[test]
    fn rejection_prefers_telegram_description() {
        let reply: TelegramReply =
            serde_json::from_str(r#"{"ok": false, "error_code": 400, "description": "Bad Request: chat not found"}"#)
                .unwrap();
        let err = rejection(StatusCode::BAD_REQUEST, Some(reply));
        assert_eq!(
            err.to_string(),
            "notification rejected with HTTP 400: Bad Request: chat not found"
        );

        let err = rejection(StatusCode::BAD_GATEWAY, None);
        assert!(matches!(
            err,
            NotifyError::Rejected { status: 502, ref description } if description == "Bad Gateway"
        ));
    }

    #[test]
    fn unconfigured_notifier_refuses() {
        let notifier = TelegramNotifier::new(Client::new(), None, Some("42".into()));
        assert!(matches!(notifier.send("hi"), Err(NotifyError::NotConfigured)));
    }
}
