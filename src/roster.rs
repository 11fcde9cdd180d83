use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::client_entry::{ClientEntry, ClientEntryBody};
use crate::errors::error_chain_fmt;

#[derive(Deserialize, Debug)]
struct RosterBody {
    ipv6tun_clients: Vec<ClientEntryBody>,
}

#[derive(thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read the client roster {path}.")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("The client roster {path} is not a valid roster.")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("The client roster {path} contains an invalid entry: {reason}")]
    InvalidEntry { path: PathBuf, reason: String },
}

impl std::fmt::Debug for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Reads the roster file and returns its clients in file order.
#[tracing::instrument(name = "Loading the client roster")]
pub fn load_roster(path: &Path) -> Result<Vec<ClientEntry>, RosterError> {
    let content = std::fs::read_to_string(path).map_err(|source| RosterError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let clients = parse_roster(&content).map_err(|err| match err {
        ParseFailure::Structure(source) => RosterError::Invalid {
            path: path.to_path_buf(),
            source,
        },
        ParseFailure::Entry(reason) => RosterError::InvalidEntry {
            path: path.to_path_buf(),
            reason,
        },
    })?;

    tracing::info!("Loaded {} clients from the roster", clients.len());

    Ok(clients)
}

#[derive(Debug)]
enum ParseFailure {
    Structure(serde_yaml::Error),
    Entry(String),
}

fn parse_roster(content: &str) -> Result<Vec<ClientEntry>, ParseFailure> {
    let body: RosterBody = serde_yaml::from_str(content).map_err(ParseFailure::Structure)?;

    body.ipv6tun_clients
        .into_iter()
        .map(ClientEntry::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ParseFailure::Entry)
}
