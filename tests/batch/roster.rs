use cert_expiry_notifier::roster::{load_roster, RosterError};
use cert_expiry_notifier::startup::RunError;
use claim::{assert_matches, assert_ok};

use crate::helpers::{TestApp, CLIENT_LIST};

#[test]
fn roster_is_loaded_in_file_order() {
    let test_app = TestApp::spawn_app(CLIENT_LIST);

    let result = load_roster(&test_app.settings.application.roster_path);

    assert_ok!(&result);
    let clients = result.unwrap();
    assert_eq!(clients.len(), 2);
    assert_eq!(clients[0].client.as_ref(), "oskar1");
    assert_eq!(clients[0].id.as_deref(), Some("210"));
    assert_eq!(clients[1].ticket.map(|ticket| ticket.value()), Some(123456));
}

#[test]
fn non_numeric_ids_are_accepted() {
    let test_app = TestApp::spawn_app(
        "ipv6tun_clients:\n  - id: abc-7\n    client: oskar1\n  - id: [1, 2]\n    client: oskar2\n",
    );

    let clients = load_roster(&test_app.settings.application.roster_path).unwrap();

    assert_eq!(clients[0].id.as_deref(), Some("abc-7"));
    assert_eq!(clients[1].client.as_ref(), "oskar2");
}

#[test]
fn malformed_roster_is_rejected() {
    let test_cases = vec![
        ("ipv6tun_clients: oskar1\n", "clients is not a list"),
        ("ipv6tun_clients:\n  - email: ondrej@caletka.cz\n", "entry without client"),
        ("ipv6tun_clients:\n  - client: [oskar1]\n", "client is not a string"),
        ("ipv6tun_clients: [\n", "broken YAML"),
    ];

    for (client_list, description) in test_cases {
        let test_app = TestApp::spawn_app(client_list);

        let result = load_roster(&test_app.settings.application.roster_path);

        assert!(
            result.is_err(),
            "The roster was accepted although it had {}",
            description
        );
    }
}

#[test]
fn run_fails_when_roster_is_missing() {
    let mut test_app = TestApp::spawn_app(CLIENT_LIST);
    test_app.settings.application.roster_path = test_app.dir.path().join("missing.yaml");

    let dry_run = test_app.run_dry();

    assert_matches!(
        dry_run.result,
        Err(RunError::RosterUnreadable(RosterError::Unreadable { .. }))
    );
    assert!(dry_run.progress.is_empty());
}
