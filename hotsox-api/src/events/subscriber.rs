use std::sync::Arc;

use diesel::prelude::*;
use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;

use hotsox_shared::clients::db;
use hotsox_shared::types::event::{payloads, routing_keys, Event};
use hotsox_shared::AppResult;

use crate::models::NewMessageMail;
use crate::schema::message_mails;
use crate::AppState;

const MAIL_QUEUE: &str = "hotsox-api.mail";
const PREFETCH: u16 = 8;

/// What the worker does with one mail request.
#[derive(Debug)]
struct MailPlan {
    inbox: Option<NewMessageMail>,
    send_email: bool,
}

fn plan(mail: &payloads::MailRequested) -> MailPlan {
    MailPlan {
        inbox: mail.user_id.map(|user_id| NewMessageMail {
            user_id,
            subject: mail.subject.clone(),
            message: mail.message.clone(),
        }),
        send_email: mail.notification && !mail.recipient.is_empty(),
    }
}

fn file_in_inbox(state: &AppState, mail: NewMessageMail) -> AppResult<()> {
    let mut conn = db::connection(&state.db)?;
    diesel::insert_into(message_mails::table)
        .values(&mail)
        .execute(&mut conn)?;
    Ok(())
}

async fn deliver(state: &AppState, mail: payloads::MailRequested) -> &'static str {
    let plan = plan(&mail);

    if let Some(inbox) = plan.inbox {
        let user_id = inbox.user_id;
        if let Err(e) = file_in_inbox(state, inbox) {
            tracing::error!(error = %e, user_id = %user_id, "failed to store mail in inbox");
        }
    }

    if !plan.send_email {
        return "skipped";
    }
    if state.config.resend_api_key.is_empty() {
        tracing::info!(to = %mail.recipient, subject = %mail.subject, "email delivery disabled, not sending");
        return "skipped";
    }

    match state.email.send_email(&mail.recipient, &mail.subject, &mail.message).await {
        Ok(()) => "sent",
        Err(e) => {
            tracing::error!(error = %e, to = %mail.recipient, "failed to send email");
            "failed"
        }
    }
}

/// Consumes mail requests: files them in the recipient's inbox and emails
/// recipients who opted in to notifications.
pub async fn listen_mail_requests(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(MAIL_QUEUE, &[routing_keys::MAIL_REQUESTED], PREFETCH)
        .await?;

    tracing::info!("listening for mail requests");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                match serde_json::from_slice::<Event<payloads::MailRequested>>(&delivery.data) {
                    Ok(event) => {
                        tracing::debug!(event_id = %event.id, user_id = ?event.user_id, "received mail.requested event");
                        let outcome = deliver(&state, event.data).await;
                        metrics::counter!("hotsox_mails_total", "outcome" => outcome).increment(1);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize mail.requested event");
                        metrics::counter!("hotsox_mails_total", "outcome" => "invalid").increment(1);
                    }
                }

                if let Err(e) = delivery.ack(BasicAckOptions::default()).await {
                    tracing::warn!(error = %e, "failed to ack mail delivery");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "mail consumer error");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn request(user_id: Option<Uuid>, notification: bool) -> payloads::MailRequested {
        payloads::MailRequested {
            user_id,
            recipient: "bob@example.com".into(),
            subject: "alice has unmached you".into(),
            message: "The match between bob and alice has been deleted".into(),
            notification,
        }
    }

    #[test]
    fn inbox_row_only_for_existing_accounts() {
        let id = Uuid::now_v7();
        let with_user = plan(&request(Some(id), false));
        assert_eq!(with_user.inbox.map(|m| m.user_id), Some(id));
        assert!(!with_user.send_email);

        let deleted = plan(&request(None, true));
        assert!(deleted.inbox.is_none());
        assert!(deleted.send_email);
    }

    #[test]
    fn no_email_without_recipient() {
        let mut mail = request(None, true);
        mail.recipient.clear();
        assert!(!plan(&mail).send_email);
    }
}
