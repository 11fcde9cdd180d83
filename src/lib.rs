pub mod certificate;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod email_client;
pub mod errors;
pub mod notice;
pub mod roster;
pub mod startup;
pub mod telemetry;
pub mod template;
