use std::io::Write;

use crate::domain::resolved_client::ResolvedClient;
use crate::email_client::{EmailClient, EmailClientError};
use crate::errors::error_chain_fmt;
use crate::notice::{ComposeError, NoticeComposer};

const PROGRESS_DATE_FORMAT: &str = "%d. %m. %Y %H:%M UTC";

#[derive(thiserror::Error)]
pub enum DispatchError {
    #[error("Failed to compose an expiry notice.")]
    ComposeError(#[from] ComposeError),
    #[error("Failed to dispatch an expiry notice.")]
    SendEmailError(#[from] EmailClientError),
    #[error("Failed to report progress.")]
    ProgressError(#[source] std::io::Error),
}

impl std::fmt::Debug for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Counts of a finished dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub checked: usize,
    pub notified: usize,
}

/// Expired certificates and certificates expiring today are left alone.
pub fn qualifies_for_notice(days_to_expire: i64, max_days: i64) -> bool {
    0 < days_to_expire && days_to_expire < max_days
}

/// Sends a notice to every client whose certificate expires inside the
/// window. The first failure aborts the run.
#[tracing::instrument(
    name = "Sending expiry notices",
    skip(clients, composer, email_client, progress),
    fields(clients = clients.len())
)]
pub fn send_expiry_notices<E, W>(
    clients: &[ResolvedClient],
    max_days: i64,
    verbose: bool,
    composer: &NoticeComposer,
    email_client: &mut E,
    progress: &mut W,
) -> Result<DispatchSummary, DispatchError>
where
    E: EmailClient,
    W: Write,
{
    let mut summary = DispatchSummary::default();

    for client in clients {
        summary.checked += 1;

        if verbose {
            writeln!(
                progress,
                "Client {} expires in {} days, on {}",
                client.entry.client,
                client.days_to_expire(),
                client.expiry_date().format(PROGRESS_DATE_FORMAT)
            )
            .map_err(DispatchError::ProgressError)?;
        }

        if !qualifies_for_notice(client.days_to_expire(), max_days) {
            continue;
        }

        let notice = composer.compose(client)?;
        email_client.send_notice(&notice)?;
        summary.notified += 1;
    }

    tracing::info!(
        "Checked {} clients, {} notices dispatched",
        summary.checked,
        summary.notified
    );

    Ok(summary)
}
