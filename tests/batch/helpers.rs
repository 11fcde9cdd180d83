use rcgen::{Certificate, CertificateParams, DistinguishedName, DnType};
use std::path::PathBuf;
use tempfile::TempDir;
use time::OffsetDateTime;

use cert_expiry_notifier::{
    config::{ApplicationSettings, EmailClientSettings, Settings},
    dispatch::DispatchSummary,
    email_client::DryRunEmailClient,
    startup::{Application, RunError},
};

pub const CLIENT_LIST: &str = r#"
---
ipv6tun_clients:
  - id: 210
    client: oskar1
    email: ondrej@caletka.cz
  - id: 211
    client: oskar2
    email: ondrej@caletka.cz
    ticket: 123456
...
"#;

// 2020-02-20T12:34:56Z
pub const PAST_EXPIRY_TIMESTAMP: i64 = 1_582_202_096;

pub struct TestApp {
    pub dir: TempDir,
    pub settings: Settings,
}

pub struct DryRun {
    pub result: Result<DispatchSummary, RunError>,
    pub progress: String,
    pub notices: String,
}

impl TestApp {
    pub fn spawn_app(client_list: &str) -> TestApp {
        let dir = tempfile::tempdir().expect("Failed to create a temporary directory.");
        let roster_path = dir.path().join("clientlist.yaml");
        let certificate_dir = dir.path().join("issued");

        std::fs::write(&roster_path, client_list).expect("Failed to write the roster.");
        std::fs::create_dir(&certificate_dir).expect("Failed to create the certificate store.");

        let settings = Settings {
            application: ApplicationSettings {
                roster_path,
                certificate_dir,
                max_days: 31,
                really_send: false,
                verbose: true,
            },
            email_client: EmailClientSettings {
                smtp_host: "127.0.0.1".to_string(),
                smtp_port: 25,
                timeout_seconds: 1,
                sender_name: "vpsFree.cz IPv6 tunely".to_string(),
                sender_email: "ipv6tun@vpsfree.cz".to_string(),
                ticket_tracker_host: "rt.vpsfree.cz".to_string(),
            },
        };

        TestApp { dir, settings }
    }

    pub fn certificate_path(&self, client: &str) -> PathBuf {
        self.settings
            .application
            .certificate_dir
            .join(format!("{}.crt", client))
    }

    /// Issues a self-signed certificate for `client` into the store.
    pub fn issue_certificate(&self, client: &str, not_after: OffsetDateTime) {
        let mut params = CertificateParams::new(vec![client.to_string()]);
        let mut distinguished_name = DistinguishedName::new();
        distinguished_name.push(DnType::CommonName, client.to_string());
        params.distinguished_name = distinguished_name;
        params.not_before = OffsetDateTime::from_unix_timestamp(PAST_EXPIRY_TIMESTAMP - 86_400)
            .expect("Invalid timestamp.");
        params.not_after = not_after;

        let certificate = Certificate::from_params(params).expect("Failed to issue a certificate.");
        let pem = certificate
            .serialize_pem()
            .expect("Failed to serialize the certificate.");

        std::fs::write(self.certificate_path(client), pem)
            .expect("Failed to write the certificate.");
    }

    /// Issues a certificate valid for `days` from now.
    pub fn issue_certificate_for_days(&self, client: &str, days: i64) {
        self.issue_certificate(client, OffsetDateTime::now_utc() + time::Duration::days(days));
    }

    pub fn run_dry(&self) -> DryRun {
        let application =
            Application::build(self.settings.clone()).expect("Failed to build application.");
        let mut email_client = DryRunEmailClient::new(Vec::<u8>::new());
        let mut progress = Vec::<u8>::new();

        let result = application.run_with(&mut email_client, &mut progress);

        DryRun {
            result,
            progress: String::from_utf8(progress).expect("Progress is not UTF-8."),
            notices: String::from_utf8(email_client.into_inner()).expect("Notices are not UTF-8."),
        }
    }
}
