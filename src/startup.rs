use std::io::{self, Write};

use crate::certificate::{resolve_roster, CertificateError};
use crate::config::Settings;
use crate::dispatch::{send_expiry_notices, DispatchError, DispatchSummary};
use crate::email_client::{DryRunEmailClient, EmailClient, SmtpEmailClient};
use crate::errors::error_chain_fmt;
use crate::notice::NoticeComposer;
use crate::roster::{load_roster, RosterError};
use crate::template::NoticeTemplate;

#[derive(thiserror::Error)]
pub enum RunError {
    #[error("The configuration is not valid.")]
    ConfigurationInvalid(#[from] config::ConfigError),
    #[error("The configured sender is not valid: {0}")]
    SenderInvalid(String),
    #[error("The client roster is unreadable.")]
    RosterUnreadable(#[from] RosterError),
    #[error("A client certificate is unreadable.")]
    CertificateUnreadable(#[from] CertificateError),
    #[error("Dispatching expiry notices failed.")]
    DispatchFailed(#[from] DispatchError),
}

impl std::fmt::Debug for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Debug)]
pub struct Application {
    settings: Settings,
    composer: NoticeComposer,
}

impl Application {
    pub fn build(settings: Settings) -> Result<Self, RunError> {
        let sender = settings
            .get_email_client_sender()
            .map_err(RunError::SenderInvalid)?;
        let composer = NoticeComposer::new(
            sender,
            settings.email_client.ticket_tracker_host.clone(),
            NoticeTemplate::default(),
        );

        Ok(Self { settings, composer })
    }

    /// Runs one sweep, printing to stdout and sending through the
    /// configured relay when `really_send` is set.
    pub fn run(&self) -> Result<DispatchSummary, RunError> {
        let mut progress = io::stdout();

        if self.settings.is_really_send() {
            let email_client = &self.settings.email_client;
            let mut email_client = SmtpEmailClient::new(
                &email_client.smtp_host,
                email_client.smtp_port,
                Some(email_client.get_timeout()),
            );
            self.run_with(&mut email_client, &mut progress)
        } else {
            let mut email_client = DryRunEmailClient::new(io::stdout());
            self.run_with(&mut email_client, &mut progress)
        }
    }

    /// Loads the roster, resolves every certificate, orders clients by
    /// expiry and dispatches the notices.
    #[tracing::instrument(
        name = "Checking certificate expiry",
        skip(self, email_client, progress),
        fields(
            roster = %self.settings.get_roster_path().display(),
            certificate_dir = %self.settings.get_certificate_dir().display(),
            max_days = self.settings.get_max_days()
        )
    )]
    pub fn run_with<E, W>(
        &self,
        email_client: &mut E,
        progress: &mut W,
    ) -> Result<DispatchSummary, RunError>
    where
        E: EmailClient,
        W: Write,
    {
        let entries = load_roster(self.settings.get_roster_path())?;
        let mut clients = resolve_roster(entries, self.settings.get_certificate_dir())?;
        clients.sort_by_key(|client| client.expiry_date());

        let summary = send_expiry_notices(
            &clients,
            self.settings.get_max_days(),
            self.settings.is_verbose(),
            &self.composer,
            email_client,
            progress,
        )?;

        Ok(summary)
    }
}
