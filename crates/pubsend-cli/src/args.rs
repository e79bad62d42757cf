//! Command-line arguments.

use std::ffi::OsString;
use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};
use pubsend_core::DispatchOptions;

/// Publish messages to a Pub/Sub topic.
///
/// DATA is base64-decoded when possible and sent as raw bytes otherwise.
/// Pass `-` to read one base64 message per line from stdin.
#[derive(Debug, Parser)]
#[command(name = "pubsend", version, about, long_about = None)]
pub struct Cli {
    /// Topic name, or projects/PROJECT_ID/topics/NAME
    pub topic: Option<String>,

    /// Message data (base64 or raw), or `-` for stdin
    pub data: Option<String>,

    /// Google project ID (defaults to gcloud settings)
    #[arg(short, long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project: Option<String>,

    /// List available topics
    #[arg(short, long)]
    pub list: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Maximum number of messages in flight at once
    #[arg(long, value_name = "N")]
    pub max_in_flight: Option<NonZeroUsize>,

    /// Cancel outstanding publishes after the first failure
    #[arg(long)]
    pub fail_fast: bool,

    /// Output format of the publish summary
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn dispatch_options(&self) -> DispatchOptions {
        DispatchOptions {
            max_in_flight: self.max_in_flight,
            cancel_on_error: self.fail_fast,
        }
    }
}

/// Single-dash long spellings accepted alongside the `--` forms.
const SINGLE_DASH_LONG: &[&str] = &["project", "list"];

/// Rewrite `-project`, `-project=ID` and `-list` to their `--` forms.
///
/// clap would otherwise read `-project` as `-p roject` and `-list` as bundled
/// short flags. Arguments after `--` are left alone.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    let mut positional_only = false;
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if positional_only {
                return arg;
            }
            if arg == "--" {
                positional_only = true;
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let Some(rest) = text.strip_prefix('-').filter(|r| !r.starts_with('-')) else {
                return arg;
            };
            let name = rest.split_once('=').map_or(rest, |(name, _)| name);
            if SINGLE_DASH_LONG.contains(&name) {
                OsString::from(format!("-{text}"))
            } else {
                arg
            }
        })
        .collect()
}
