pub mod client_entry;
pub mod client_name;
pub mod email_address;
pub mod resolved_client;
pub mod ticket_id;
