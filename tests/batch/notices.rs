use cert_expiry_notifier::dispatch::{DispatchError, DispatchSummary};
use cert_expiry_notifier::email_client::EmailClientError;
use cert_expiry_notifier::startup::{Application, RunError};
use claim::{assert_matches, assert_ok};
use std::net::TcpListener;
use time::OffsetDateTime;

use crate::helpers::{TestApp, CLIENT_LIST, PAST_EXPIRY_TIMESTAMP};

const CLIENT_LIST_WITH_EXPIRED: &str = r#"
ipv6tun_clients:
  - id: 212
    client: oskar2
    email: ondrej@caletka.cz
    ticket: 123456
  - id: 213
    client: oskar3
    email: ondrej@caletka.cz
  - id: 210
    client: oskar1
    email: ondrej@caletka.cz
"#;

#[test]
fn dry_run_prints_progress_and_notices() {
    let test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let dry_run = test_app.run_dry();

    assert_ok!(&dry_run.result);
    assert!(dry_run.progress.contains("oskar1 expires in 9 days,"));
    assert!(dry_run.progress.contains("oskar2 expires in 19 days,"));
    assert_eq!(dry_run.notices.matches("Would send:").count(), 2);
    assert!(dry_run.notices.contains("#123456"));
    assert!(dry_run.notices.contains("To: ondrej@caletka.cz\r\n"));
}

#[test]
fn clients_are_reported_earliest_expiry_first() {
    let test_app = TestApp::spawn_app(CLIENT_LIST_WITH_EXPIRED);
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);
    test_app.issue_certificate(
        "oskar3",
        OffsetDateTime::from_unix_timestamp(PAST_EXPIRY_TIMESTAMP).unwrap(),
    );

    let dry_run = test_app.run_dry();

    let reported: Vec<&str> = dry_run
        .progress
        .lines()
        .map(|line| line.split_whitespace().nth(1).unwrap())
        .collect();
    assert_eq!(reported, vec!["oskar3", "oskar1", "oskar2"]);
    assert!(dry_run
        .progress
        .starts_with("Client oskar3 expires in -"));
    assert!(dry_run.progress.contains(", on 20. 02. 2020 12:34 UTC\n"));
    // The expired certificate is reported but never noticed.
    assert_eq!(
        dry_run.result.unwrap(),
        DispatchSummary {
            checked: 3,
            notified: 2
        }
    );
    assert!(!dry_run.notices.contains("oskar3"));
}

#[test]
fn quiet_run_prints_only_notices() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.application.verbose = false;
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let dry_run = test_app.run_dry();

    assert_ok!(&dry_run.result);
    assert!(dry_run.progress.is_empty());
    assert_eq!(dry_run.notices.matches("Would send:").count(), 2);
}

#[test]
fn narrower_window_skips_later_expiries() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.application.max_days = 15;
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let dry_run = test_app.run_dry();

    assert_ok!(&dry_run.result);
    assert_eq!(dry_run.notices.matches("Would send:").count(), 1);
    assert!(!dry_run.notices.contains("#123456"));
    assert_eq!(dry_run.progress.lines().count(), 2);
}

#[test]
fn unreachable_relay_aborts_the_run() {
    let port = closed_port();

    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.application.really_send = true;
    test_app.settings.email_client.smtp_port = port;
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let application = Application::build(test_app.settings.clone()).unwrap();
    let mut email_client = cert_expiry_notifier::email_client::SmtpEmailClient::new(
        &test_app.settings.email_client.smtp_host,
        port,
        Some(test_app.settings.email_client.get_timeout()),
    );
    let mut progress = Vec::<u8>::new();

    let result = application.run_with(&mut email_client, &mut progress);

    assert_matches!(
        result,
        Err(RunError::DispatchFailed(DispatchError::SendEmailError(
            EmailClientError::TransportFailure(_)
        )))
    );
    // Progress stops at the first client, whose notice failed.
    assert_eq!(String::from_utf8(progress).unwrap().lines().count(), 1);
}

fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[test]
fn run_without_really_send_never_contacts_the_relay() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.email_client.smtp_port = closed_port();
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let application = Application::build(test_app.settings.clone()).unwrap();
    let result = application.run();

    assert_eq!(
        result.unwrap(),
        DispatchSummary {
            checked: 2,
            notified: 2
        }
    );
}

#[test]
fn run_with_really_send_uses_the_configured_relay() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.application.really_send = true;
    test_app.settings.email_client.smtp_port = closed_port();
    test_app.issue_certificate_for_days("oskar1", 10);
    test_app.issue_certificate_for_days("oskar2", 20);

    let application = Application::build(test_app.settings.clone()).unwrap();
    let result = application.run();

    assert_matches!(
        result,
        Err(RunError::DispatchFailed(DispatchError::SendEmailError(
            EmailClientError::TransportFailure(_)
        )))
    );
}

#[test]
fn invalid_sender_is_rejected_before_any_work() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.email_client.sender_email = "ipv6tun".to_string();

    let result = Application::build(test_app.settings.clone());

    assert_matches!(result, Err(RunError::SenderInvalid(_)));
}
