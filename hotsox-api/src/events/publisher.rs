use uuid::Uuid;

use hotsox_shared::clients::rabbitmq::RabbitMQClient;
use hotsox_shared::types::event::{payloads, routing_keys, Event};

use crate::domain::mail::{account_deletion_mail, unmatch_mails, MailDraft};
use crate::models::User;

const SOURCE: &str = "hotsox-api";

/// Builds the queued mail for `recipient`. `file_in_inbox` also stores it as a
/// `MessageMail`, which only makes sense while the account exists.
pub fn mail_event(recipient: &User, draft: MailDraft, file_in_inbox: bool) -> Event<payloads::MailRequested> {
    Event::new(
        SOURCE,
        routing_keys::MAIL_REQUESTED,
        payloads::MailRequested {
            user_id: file_in_inbox.then_some(recipient.id),
            recipient: recipient.email.clone(),
            subject: draft.subject,
            message: draft.message,
            notification: recipient.notification,
        },
    )
    .with_user(recipient.id)
}

async fn publish_mail(rabbitmq: &RabbitMQClient, event: Event<payloads::MailRequested>, correlation: Uuid) {
    let event = event.with_correlation(correlation);
    if let Err(e) = rabbitmq.publish(routing_keys::MAIL_REQUESTED, &event).await {
        tracing::error!(error = %e, user_id = ?event.user_id, "failed to publish mail.requested event");
    }
}

pub async fn publish_unmatch_mails(rabbitmq: &RabbitMQClient, me: &User, other: &User) {
    let mails = unmatch_mails(&me.username, &other.username);
    let correlation = Uuid::now_v7();
    publish_mail(rabbitmq, mail_event(me, mails.to_requester, true), correlation).await;
    publish_mail(rabbitmq, mail_event(other, mails.to_other, true), correlation).await;
}

pub async fn publish_account_deleted(rabbitmq: &RabbitMQClient, user: &User) {
    publish_mail(rabbitmq, mail_event(user, account_deletion_mail(), false), Uuid::now_v7()).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn user(notification: bool) -> User {
        User {
            id: Uuid::now_v7(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            first_name: "Alice".into(),
            last_name: "Sock".into(),
            info_about: String::new(),
            info_birthday: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            info_gender: "female".into(),
            info_gender_preference: "everyone".into(),
            location_city: "Berlin".into(),
            location_latitude: 0.0,
            location_longitude: 0.0,
            notification,
            is_active: true,
            role: "user".into(),
            last_login: None,
            date_joined: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unmatch_mail_is_filed_in_inbox() {
        let alice = user(false);
        let draft = unmatch_mails("alice", "bob").to_requester;
        let event = mail_event(&alice, draft, true);
        assert_eq!(event.data.user_id, Some(alice.id));
        assert_eq!(event.data.recipient, "alice@example.com");
        assert!(!event.data.notification);
        assert_eq!(event.event_type, routing_keys::MAIL_REQUESTED);
    }

    #[test]
    fn deletion_mail_skips_inbox() {
        let alice = user(true);
        let event = mail_event(&alice, account_deletion_mail(), false);
        assert_eq!(event.data.user_id, None);
        assert!(event.data.notification);
        assert_eq!(event.data.subject, "HotSox Account Deletion");
    }
}
