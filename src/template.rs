use chrono::{DateTime, Utc};

use crate::domain::client_name::ClientName;

const EXPIRY_NOTICE_SUBJECT: &str = "Blížící se expirace certifikátu pro IPv6 tunel";
const EXPIRY_NOTICE_BODY: &str = include_str!("../templates/expiry_notice.txt");
const EXPIRY_DATE_FORMAT: &str = "%d. %m. %Y v %H:%M UTC";

/// Text of the expiry warning, with `{client}`, `{days}` and `{expdate}`
/// placeholders in the body.
#[derive(Debug, Clone)]
pub struct NoticeTemplate {
    subject: String,
    body: String,
}

impl Default for NoticeTemplate {
    fn default() -> Self {
        NoticeTemplate::new(EXPIRY_NOTICE_SUBJECT, EXPIRY_NOTICE_BODY)
    }
}

impl NoticeTemplate {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> NoticeTemplate {
        NoticeTemplate {
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn render_body(
        &self,
        client: &ClientName,
        days_to_expire: i64,
        expiry_date: DateTime<Utc>,
    ) -> String {
        self.body
            .replace("{client}", client.as_ref())
            .replace("{days}", &days_to_expire.to_string())
            .replace(
                "{expdate}",
                &expiry_date.format(EXPIRY_DATE_FORMAT).to_string(),
            )
    }
}
