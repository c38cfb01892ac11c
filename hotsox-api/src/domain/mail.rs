/// Subject and body of a mail before it is addressed to someone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDraft {
    pub subject: String,
    pub message: String,
}

pub struct UnmatchMails {
    pub to_requester: MailDraft,
    pub to_other: MailDraft,
}

pub fn unmatch_mails(me: &str, other: &str) -> UnmatchMails {
    let message = format!("The match between {other} and {me} has been deleted");
    UnmatchMails {
        to_requester: MailDraft {
            subject: format!("You have unmached with {other}"),
            message: message.clone(),
        },
        to_other: MailDraft {
            subject: format!("{me} has unmached you"),
            message,
        },
    }
}

pub fn account_deletion_mail() -> MailDraft {
    MailDraft {
        subject: "HotSox Account Deletion".to_string(),
        message: "Your HotSox account has been deleted. We are very sorry to see you go :(".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmatch_mails_address_both_sides() {
        let mails = unmatch_mails("alice", "bob");
        assert_eq!(mails.to_requester.subject, "You have unmached with bob");
        assert_eq!(mails.to_other.subject, "alice has unmached you");
        assert_eq!(mails.to_requester.message, "The match between bob and alice has been deleted");
        assert_eq!(mails.to_requester.message, mails.to_other.message);
    }

    #[test]
    fn deletion_mail_text() {
        let mail = account_deletion_mail();
        assert_eq!(mail.subject, "HotSox Account Deletion");
        assert!(mail.message.starts_with("Your HotSox account has been deleted."));
    }
}
