use serde::Deserialize;
use serde_aux::field_attributes::deserialize_option_number_from_string;

use crate::domain::client_name::ClientName;
use crate::domain::ticket_id::TicketId;

/// One tunnel subscriber, as listed in the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    /// Carried through untouched; only used to identify the row.
    pub id: Option<String>,
    pub client: ClientName,
    /// Validated only when a notice is composed for this client.
    pub email: Option<String>,
    pub ticket: Option<TicketId>,
}

#[derive(Deserialize, Debug)]
pub struct ClientEntryBody {
    #[serde(default)]
    pub id: Option<serde_yaml::Value>,
    pub client: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub ticket: Option<u64>,
}

impl TryFrom<ClientEntryBody> for ClientEntry {
    type Error = String;

    fn try_from(body: ClientEntryBody) -> Result<Self, Self::Error> {
        let client = ClientName::parse(body.client)?;
        let ticket = body.ticket.and_then(TicketId::parse);

        Ok(ClientEntry {
            id: body.id.and_then(id_to_string),
            client,
            email: body.email,
            ticket,
        })
    }
}

fn id_to_string(id: serde_yaml::Value) -> Option<String> {
    match id {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::String(id) => Some(id),
        serde_yaml::Value::Number(id) => Some(id.to_string()),
        serde_yaml::Value::Bool(id) => Some(id.to_string()),
        other => serde_yaml::to_string(&other)
            .ok()
            .map(|id| id.trim().to_string()),
    }
}
