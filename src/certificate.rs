use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use x509_parser::pem::parse_x509_pem;

use crate::domain::client_entry::ClientEntry;
use crate::domain::resolved_client::{CertificateExpiry, ResolvedClient};
use crate::errors::error_chain_fmt;

const GENERALIZED_TIME_FORMAT: &str = "%Y%m%d%H%M%SZ";
const GENERALIZED_TIME_LENGTH: usize = 15;
const PEM_CERTIFICATE_LABEL: &str = "CERTIFICATE";

#[derive(thiserror::Error)]
pub enum CertificateError {
    #[error("Failed to read the certificate {path}.")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The certificate {path} could not be parsed: {reason}")]
    Unparseable { path: PathBuf, reason: String },
}

impl std::fmt::Debug for CertificateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Parses a not-after timestamp of the exact form `YYYYMMDDHHMMSSZ`.
///
/// Fractional seconds, numeric offsets and a lowercase `z` are rejected.
pub fn parse_generalized_time(value: &str) -> Result<DateTime<Utc>, String> {
    let is_plain_zulu = value.len() == GENERALIZED_TIME_LENGTH
        && value.ends_with('Z')
        && value[..GENERALIZED_TIME_LENGTH - 1]
            .bytes()
            .all(|byte| byte.is_ascii_digit());

    if !is_plain_zulu {
        return Err(format!("{} is not a YYYYMMDDHHMMSSZ timestamp", value));
    }

    NaiveDateTime::parse_from_str(value, GENERALIZED_TIME_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|err| format!("{} is not a valid timestamp: {}", value, err))
}

/// Reads the not-after instant of the PEM certificate stored at `path`.
#[tracing::instrument(name = "Reading a certificate expiry")]
pub fn read_certificate_expiry(path: &Path) -> Result<DateTime<Utc>, CertificateError> {
    let content = std::fs::read(path).map_err(|source| CertificateError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let unparseable = |reason: String| CertificateError::Unparseable {
        path: path.to_path_buf(),
        reason,
    };

    let (_, pem) = parse_x509_pem(&content).map_err(|err| unparseable(err.to_string()))?;

    if pem.label != PEM_CERTIFICATE_LABEL {
        return Err(unparseable(format!(
            "expected a {} block, found {}",
            PEM_CERTIFICATE_LABEL, pem.label
        )));
    }

    let certificate = pem
        .parse_x509()
        .map_err(|err| unparseable(err.to_string()))?;
    let not_after = certificate.validity().not_after.timestamp();

    // UTCTime and GeneralizedTime encodings both end up in the generalized form.
    let not_after = Utc
        .timestamp_opt(not_after, 0)
        .single()
        .ok_or_else(|| unparseable(format!("not-after {} is out of range", not_after)))?
        .format(GENERALIZED_TIME_FORMAT)
        .to_string();

    parse_generalized_time(&not_after).map_err(unparseable)
}

/// Locates and reads the certificate of a single client.
#[tracing::instrument(
    name = "Resolving a client certificate",
    skip(entry, certificate_dir),
    fields(client = %entry.client)
)]
pub fn resolve_client(
    entry: ClientEntry,
    certificate_dir: &Path,
    now: DateTime<Utc>,
) -> Result<ResolvedClient, CertificateError> {
    let path = certificate_dir.join(entry.client.certificate_file_name());
    let expiry_date = read_certificate_expiry(&path)?;

    Ok(ResolvedClient::new(
        entry,
        CertificateExpiry::at(expiry_date, now),
    ))
}

/// Resolves every roster entry against the same instant, keeping roster order.
pub fn resolve_roster(
    entries: Vec<ClientEntry>,
    certificate_dir: &Path,
) -> Result<Vec<ResolvedClient>, CertificateError> {
    let now = Utc::now();

    entries
        .into_iter()
        .map(|entry| resolve_client(entry, certificate_dir, now))
        .collect()
}
