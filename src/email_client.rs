use lettre::address::AddressError;
use lettre::message::header::{ContentTransferEncoding, ContentType, Header, HeaderName, HeaderValue};
use lettre::message::{Body, Mailbox};
use lettre::transport::smtp;
use lettre::{Address, Message, SmtpTransport, Transport};
use std::io::Write;
use std::time;

use crate::errors::error_chain_fmt;
use crate::notice::{Notice, NoticeAddress, PRECEDENCE_BULK};

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

#[derive(thiserror::Error)]
pub enum EmailClientError {
    #[error("{address} is not a deliverable address.")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("Failed to build the message: {0}")]
    InvalidMessage(String),
    #[error("The mail relay refused the message.")]
    TransportFailure(#[from] smtp::Error),
    #[error("Failed to print the message.")]
    Output(#[from] std::io::Error),
}

impl std::fmt::Debug for EmailClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Something that takes composed notices off the dispatcher's hands.
pub trait EmailClient {
    fn send_notice(&mut self, notice: &Notice) -> Result<(), EmailClientError>;
}

/// Delivers notices to an unauthenticated SMTP relay, one connection per
/// message.
pub struct SmtpEmailClient {
    transport: SmtpTransport,
}

impl SmtpEmailClient {
    pub fn new(host: &str, port: u16, timeout: Option<time::Duration>) -> SmtpEmailClient {
        let transport = SmtpTransport::builder_dangerous(host)
            .port(port)
            .timeout(Some(timeout.unwrap_or(REQUEST_TIMEOUT)))
            .build();

        SmtpEmailClient { transport }
    }
}

impl EmailClient for SmtpEmailClient {
    #[tracing::instrument(
        name = "Sending an expiry notice",
        skip(self, notice),
        fields(subject = %notice.subject)
    )]
    fn send_notice(&mut self, notice: &Notice) -> Result<(), EmailClientError> {
        let message = build_message(notice)?;
        let response = self.transport.send(&message)?;

        tracing::info!("Mail relay accepted the notice: {:?}", response.code());

        Ok(())
    }
}

/// Prints notices instead of sending them; never touches the network.
pub struct DryRunEmailClient<W> {
    out: W,
}

impl<W: Write> DryRunEmailClient<W> {
    pub fn new(out: W) -> DryRunEmailClient<W> {
        DryRunEmailClient { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EmailClient for DryRunEmailClient<W> {
    fn send_notice(&mut self, notice: &Notice) -> Result<(), EmailClientError> {
        let message = build_message(notice)?;

        writeln!(
            self.out,
            "Would send:\n{}\n---",
            String::from_utf8_lossy(&message.formatted())
        )?;

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Precedence(String);

impl Header for Precedence {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Precedence")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RtTicket(String);

impl Header for RtTicket {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("RT-Ticket")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

fn mailbox(address: &NoticeAddress) -> Result<Mailbox, EmailClientError> {
    let email = address
        .email
        .as_ref()
        .parse::<Address>()
        .map_err(|source| EmailClientError::InvalidAddress {
            address: address.email.to_string(),
            source,
        })?;

    Ok(Mailbox::new(address.name.clone(), email))
}

/// Frames a notice as a quoted-printable plain text message.
pub fn build_message(notice: &Notice) -> Result<Message, EmailClientError> {
    let mut message_builder = Message::builder()
        .from(mailbox(&notice.from)?)
        .subject(notice.subject.as_str())
        .header(Precedence(PRECEDENCE_BULK.to_string()));

    for to_addr in &notice.to {
        message_builder = message_builder.to(mailbox(to_addr)?);
    }

    if let Some(ticket) = &notice.ticket {
        message_builder = message_builder.header(RtTicket(ticket.to_string()));
    }

    let body = Body::new_with_encoding(notice.body.clone(), ContentTransferEncoding::QuotedPrintable)
        .map_err(|_| {
            EmailClientError::InvalidMessage("body cannot be quoted-printable encoded".to_string())
        })?;

    message_builder
        .header(ContentType::TEXT_PLAIN)
        .body(body)
        .map_err(|err| EmailClientError::InvalidMessage(err.to_string()))
}
