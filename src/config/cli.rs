//! Command-line flags.
//!
//! Flags are spelled with a single dash (`-tcp`, `-port=9999`). They are
//! rewritten into clap's long form before parsing, so `--tcp` works too.

use std::ffi::OsString;

use clap::{ArgAction, Parser};

use crate::config::schema::{ListenerConfig, DEFAULT_PORT};
use crate::config::validation::ConfigError;

#[derive(Debug, Clone, Parser)]
#[command(name = "iamyouare")]
#[command(about = "Report server hostname and client address over TCP, UDP or HTTP", long_about = None)]
pub struct Args {
    /// Serve raw over TCP
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub tcp: bool,

    /// Serve raw over UDP
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub udp: bool,

    /// Serve HTTP (the default when nothing else is selected)
    #[arg(
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub http: bool,

    /// Port number
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl Args {
    /// Parse the process arguments, exiting with usage on error.
    pub fn from_env() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Validate the selection into a `ListenerConfig`.
    pub fn into_config(self) -> Result<ListenerConfig, ConfigError> {
        ListenerConfig::new(self.tcp, self.udp, self.http, self.port)
    }
}

/// Rewrite single-dash long flags (`-port=1`) into `--port=1`.
///
/// The program name, short flags (`-h`), and anything after a bare `--`
/// are left alone.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(index, arg)| {
            let arg: OsString = arg.into();
            if index == 0 || passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some(flag) if flag.len() > 2 && flag.starts_with('-') && !flag.starts_with("--") => {
                    OsString::from(format!("-{flag}"))
                }
                _ => arg,
            }
        })
        .collect()
}
