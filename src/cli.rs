use clap::Parser;
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser, Debug)]
#[command(name = "cert_expiry_notifier")]
#[command(
    about = "Warn IPv6 tunnel users whose client certificates are about to expire",
    long_about = None
)]
pub struct Cli {
    /// Directory holding base and per-environment configuration files
    #[arg(long, value_name = "DIR", default_value = "config")]
    pub config_dir: PathBuf,
    /// YAML list of clients
    #[arg(long, value_name = "PATH")]
    pub clientlist: Option<PathBuf>,
    /// Directory with issued client certificates
    #[arg(long, value_name = "DIR")]
    pub certpath: Option<PathBuf>,
    /// Warn clients whose certificate expires in fewer days than this
    #[arg(long, value_name = "DAYS")]
    pub maxdays: Option<i64>,
    /// Hand notices to the mail relay instead of printing them
    #[arg(long)]
    pub really_send: bool,
    /// Report every client's expiry
    #[arg(long, overrides_with = "quiet")]
    pub verbose: bool,
    /// Only report notices
    #[arg(long, overrides_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        let verbose = match (self.verbose, self.quiet) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };

        ConfigOverrides {
            roster_path: self.clientlist.clone(),
            certificate_dir: self.certpath.clone(),
            max_days: self.maxdays,
            really_send: self.really_send.then_some(true),
            verbose,
        }
    }
}
