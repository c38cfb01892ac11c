use reqwest::Client;
use serde::Serialize;

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct ResendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    text: String,
    html: String,
}

impl EmailClient {
    pub fn new(api_url: &str, api_key: &str, from_email: &str, from_name: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from_email: from_email.to_string(),
            from_name: from_name.to_string(),
        }
    }

    pub async fn send_email(
        &self,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<(), String> {
        let request = ResendRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            text: text.to_string(),
            html: render_html(subject, text),
        };

        let response = self.client
            .post(format!("{}/emails", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("email send failed: {e}"))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("email API error: {body}"));
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_html(subject: &str, text: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
        <h2 style="color: #e4405f;">HotSox - {}</h2>
        <p>{}</p>
        <p style="color: #666; margin-top: 20px;">You receive this mail because notifications are enabled in your HotSox profile.</p>
        </div>"#,
        escape_html(subject),
        escape_html(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_body_is_escaped() {
        let html = render_html("<b>hi</b>", "a & b");
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn api_url_trailing_slash_is_dropped() {
        let client = EmailClient::new("https://api.resend.com/", "key", "noreply@hotsox.app", "HotSox");
        assert_eq!(client.api_url, "https://api.resend.com");
    }
}
