use chrono::{DateTime, Duration, Utc};

use crate::domain::client_entry::ClientEntry;

/// The instant a certificate stops being valid, together with the number of
/// whole days left until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateExpiry {
    expiry_date: DateTime<Utc>,
    days_to_expire: i64,
}

impl CertificateExpiry {
    /// Whole days are floored, also for certificates that already expired.
    pub fn at(expiry_date: DateTime<Utc>, now: DateTime<Utc>) -> CertificateExpiry {
        let remaining = expiry_date.signed_duration_since(now);
        let whole_days = remaining.num_days();
        // num_days truncates towards zero
        let days_to_expire = if remaining < Duration::days(whole_days) {
            whole_days - 1
        } else {
            whole_days
        };

        CertificateExpiry {
            expiry_date,
            days_to_expire,
        }
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry_date
    }

    pub fn days_to_expire(&self) -> i64 {
        self.days_to_expire
    }
}

/// A roster entry whose certificate has been located and read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedClient {
    pub entry: ClientEntry,
    pub expiry: CertificateExpiry,
}

impl ResolvedClient {
    pub fn new(entry: ClientEntry, expiry: CertificateExpiry) -> ResolvedClient {
        ResolvedClient { entry, expiry }
    }

    pub fn expiry_date(&self) -> DateTime<Utc> {
        self.expiry.expiry_date()
    }

    pub fn days_to_expire(&self) -> i64 {
        self.expiry.days_to_expire()
    }
}
