//! Twilio API client for WhatsApp

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WhatsAppError};

/// Twilio API client
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    phone_number: String,
    base_url: String,
}

/// Incoming WhatsApp message from a Twilio webhook
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IncomingMessage {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub message_sid: String,
}

impl IncomingMessage {
    /// Sender phone number with the `whatsapp:` channel prefix removed.
    pub fn phone(&self) -> &str {
        self.from.strip_prefix("whatsapp:").unwrap_or(&self.from)
    }
}

/// Outgoing message payload
#[derive(Debug, Serialize)]
struct SendMessagePayload {
    #[serde(rename = "From")]
    from: String,
    #[serde(rename = "To")]
    to: String,
    #[serde(rename = "Body")]
    body: String,
}

impl TwilioClient {
    /// Create a new Twilio client
    pub fn new(account_sid: String, auth_token: String, phone_number: String) -> Self {
        Self {
            client: Client::new(),
            account_sid,
            auth_token,
            phone_number,
            base_url: "https://api.twilio.com".to_string(),
        }
    }

    /// Send a WhatsApp message out of band (proactive notifications).
    ///
    /// Webhook replies go back as TwiML instead and do not need this.
    pub async fn send_message(&self, to: &str, body: &str) -> Result<String> {
        info!("Sending WhatsApp message to {}", to);

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let payload = SendMessagePayload {
            from: format!("whatsapp:{}", self.phone_number),
            to: format!("whatsapp:{}", to.strip_prefix("whatsapp:").unwrap_or(to)),
            body: body.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api(format!(
                "Failed to send message: {} - {}",
                status, text
            )));
        }

        #[derive(Deserialize)]
        struct SendMessageResponse {
            sid: String,
        }

        let result: SendMessageResponse = response.json().await?;
        Ok(result.sid)
    }

    /// Verify a webhook signature.
    ///
    /// Twilio signs the full webhook URL followed by the POST parameters
    /// sorted by name, HMAC-SHA1 keyed with the auth token, base64.
    pub fn verify_signature(&self, url: &str, params: &[(String, String)], signature: &str) -> bool {
        verify_signature(&self.auth_token, url, params, signature)
    }
}

/// Standalone signature check so the webhook can validate without a full
/// client.
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    use base64::Engine as _;
    use hmac::{Hmac, Mac};
    use sha1::Sha1;

    type HmacSha1 = Hmac<Sha1>;

    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut data = url.to_string();
    for (key, value) in sorted {
        data.push_str(key);
        data.push_str(value);
    }

    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(data.as_bytes());

    let expected = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    expected == signature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TwilioClient::new(
            "AC123".to_string(),
            "token123".to_string(),
            "+1234567890".to_string(),
        );
        assert_eq!(client.account_sid, "AC123");
    }

    #[test]
    fn test_incoming_phone_strips_channel_prefix() {
        let msg = IncomingMessage {
            from: "whatsapp:+254712345678".to_string(),
            to: "whatsapp:+14155238886".to_string(),
            body: "weather".to_string(),
            message_sid: "SM123".to_string(),
        };
        assert_eq!(msg.phone(), "+254712345678");
    }

    #[test]
    fn test_signature_roundtrip() {
        use base64::Engine as _;
        use hmac::{Hmac, Mac};
        use sha1::Sha1;

        let token = "secret";
        let url = "https://bot.example.com/webhook/whatsapp";
        let params = vec![
            ("From".to_string(), "whatsapp:+254712345678".to_string()),
            ("Body".to_string(), "weather".to_string()),
        ];

        // compute the expected signature the way Twilio does
        let mut mac = Hmac::<Sha1>::new_from_slice(token.as_bytes()).unwrap();
        mac.update(format!("{}Bodyweather{}", url, "Fromwhatsapp:+254712345678").as_bytes());
        let signature =
            base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());

        assert!(verify_signature(token, url, &params, &signature));
        assert!(!verify_signature(token, url, &params, "bogus"));
    }
}
