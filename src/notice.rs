use std::fmt;

use crate::domain::email_address::EmailAddress;
use crate::domain::resolved_client::ResolvedClient;
use crate::domain::ticket_id::TicketId;
use crate::template::NoticeTemplate;

pub const PRECEDENCE_BULK: &str = "bulk";

/// An address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeAddress {
    pub name: Option<String>,
    pub email: EmailAddress,
}

impl NoticeAddress {
    pub fn new(name: Option<String>, email: EmailAddress) -> NoticeAddress {
        NoticeAddress { name, email }
    }
}

impl fmt::Display for NoticeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} <{}>", name, self.email),
            None => write!(f, "{}", self.email),
        }
    }
}

/// A ticket in the request tracker, e.g. `rt.vpsfree.cz #123456`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketReference {
    pub tracker_host: String,
    pub ticket: TicketId,
}

impl fmt::Display for TicketReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.tracker_host, self.ticket)
    }
}

/// A fully composed expiry warning, ready to be printed or sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub from: NoticeAddress,
    pub to: Vec<NoticeAddress>,
    pub subject: String,
    pub ticket: Option<TicketReference>,
    pub body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ComposeError {
    #[error("Client {client} has no e-mail address in the roster.")]
    MissingRecipient { client: String },
    #[error("Client {client} has an invalid e-mail address: {reason}")]
    InvalidRecipient { client: String, reason: String },
}

/// Renders expiry warnings for resolved clients.
#[derive(Debug, Clone)]
pub struct NoticeComposer {
    sender: NoticeAddress,
    ticket_tracker_host: String,
    template: NoticeTemplate,
}

impl NoticeComposer {
    pub fn new(
        sender: NoticeAddress,
        ticket_tracker_host: String,
        template: NoticeTemplate,
    ) -> NoticeComposer {
        NoticeComposer {
            sender,
            ticket_tracker_host,
            template,
        }
    }

    pub fn sender(&self) -> &NoticeAddress {
        &self.sender
    }

    #[tracing::instrument(
        name = "Composing an expiry notice",
        skip(self, client),
        fields(client = %client.entry.client)
    )]
    pub fn compose(&self, client: &ResolvedClient) -> Result<Notice, ComposeError> {
        let recipient = recipient_of(client)?;
        let body = self.template.render_body(
            &client.entry.client,
            client.days_to_expire(),
            client.expiry_date(),
        );

        let mut notice = Notice {
            from: self.sender.clone(),
            to: vec![NoticeAddress::new(None, recipient)],
            subject: self.template.subject().to_string(),
            ticket: None,
            body,
        };

        if let Some(ticket) = client.entry.ticket {
            let reference = TicketReference {
                tracker_host: self.ticket_tracker_host.clone(),
                ticket,
            };

            // The tracker receives a copy so that replies land in the ticket.
            notice.to.push(self.sender.clone());
            notice.subject = format!("[{}] {}", reference, notice.subject);
            notice.ticket = Some(reference);
        }

        Ok(notice)
    }
}

fn recipient_of(client: &ResolvedClient) -> Result<EmailAddress, ComposeError> {
    let email = client
        .entry
        .email
        .clone()
        .ok_or_else(|| ComposeError::MissingRecipient {
            client: client.entry.client.to_string(),
        })?;

    EmailAddress::parse(email).map_err(|reason| ComposeError::InvalidRecipient {
        client: client.entry.client.to_string(),
        reason,
    })
}
