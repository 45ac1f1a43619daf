//! hotbind: binds a demo settings file and logs every change made to it.
//!
//! Edit the file while this runs; each saved edit is loaded and written
//! back into the held settings without restarting.

mod demo;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hotbind_common::{HotbindError, Result};
use hotbind_config::{Descriptor, Format, ReloadMode, Shared};
use tracing_subscriber::EnvFilter;

use crate::demo::{summary, DemoSettings};

#[derive(Parser)]
#[command(name = "hotbind", about = "Watch a typed config file and log reloads")]
struct Args {
    /// Directory holding the config file.
    #[arg(short, long, default_value = hotbind_config::DEFAULT_CONFIG_DIR)]
    dir: PathBuf,

    /// File format: json, toml or yaml.
    #[arg(short, long, default_value_t = Format::Toml)]
    format: Format,

    /// Logical file name; the format's extension is appended when missing.
    #[arg(short, long, default_value = "demo")]
    name: String,

    /// Poll for changes instead of relying on OS notifications.
    #[arg(long)]
    poll: bool,

    /// Encrypt the file with this secret.
    #[arg(long)]
    encrypt_secret: Option<String>,

    /// Log filter directive, overriding RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn descriptor(&self) -> Descriptor {
        let mode = if self.poll {
            ReloadMode::Polling
        } else {
            ReloadMode::EventDriven
        };
        let descriptor = Descriptor::new(self.name.as_str(), self.format)
            .directory(&self.dir)
            .reload(mode);
        match &self.encrypt_secret {
            Some(secret) => descriptor.encrypted(true).secret(secret.as_str()),
            None => descriptor,
        }
    }
}

fn init_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "hotbind=info,hotbind_config=info".into()),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "hotbind failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    Shared::<DemoSettings>::bind(args.descriptor())?;
    let settings = Shared::<DemoSettings>::current()?;
    let path = Shared::<DemoSettings>::path()?;
    let is_new = Shared::<DemoSettings>::is_new();

    // Never hold a settings guard across a `Shared` call.
    let initial = settings.read().clone();
    tracing::info!(path = %path.display(), new = is_new, "{}", summary(&initial));

    let mut revisions = Shared::<DemoSettings>::subscribe();
    let outcome = loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let revision = *revisions.borrow_and_update();
                let current = settings.read().clone();
                if current.verbose {
                    tracing::info!(revision, settings = ?current, "settings changed");
                } else {
                    tracing::info!(revision, "{}", summary(&current));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break signal.map_err(HotbindError::from);
            }
        }
    };

    Shared::<DemoSettings>::stop();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotbind_config::ConfigError;

    #[test]
    fn args_default_to_toml_in_config_dir() {
        let args = Args::parse_from(["hotbind"]);
        assert_eq!(args.format, Format::Toml);
        assert_eq!(args.dir, PathBuf::from("./config"));
        assert!(!args.poll);
    }

    #[test]
    fn descriptor_reflects_flags() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = Args::parse_from([
            "hotbind",
            "--dir",
            dir.path().to_str().unwrap(),
            "--format",
            "yml",
            "--poll",
            "--encrypt-secret",
            "pw",
        ]);
        let descriptor = args.descriptor();
        assert_eq!(descriptor.format(), Format::Yaml);
        assert_eq!(descriptor.reload_mode(), ReloadMode::Polling);
        assert!(descriptor.is_encrypted());
        assert_eq!(descriptor.resolve().unwrap(), dir.path().join("demo.yaml"));
    }

    #[tokio::test]
    async fn bind_failure_is_reported_as_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let args = Args::parse_from([
            "hotbind",
            "--dir",
            dir.path().to_str().unwrap(),
            "--format",
            "ini",
        ]);
        let err = run(&args).await.unwrap_err();
        assert!(
            matches!(err, HotbindError::Config(ConfigError::UnsupportedFormat(_))),
            "got {err:?}"
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["hotbind", "--format", "csv"]).is_err());
    }
}
