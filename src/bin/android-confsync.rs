//! Android Configuration Synchronization Tooling
//!
//! This is the entry-point of `android-confsync`, a command-line tool to
//! apply the configuration of a mobile application to its native Android
//! project. Its main input is the application configuration (`app.json`),
//! which declares the native integrations the application uses.
//!
//! This CLI is mainly a dispatcher of the operations available in
//! `android_confsync::op::*`. It is a simple clap-based CLI that forwards the
//! arguments to `android_confsync` and visualizes the results.

use android_confsync::android::{facebook, google_maps};
use android_confsync::config::AppConfig;
use android_confsync::op::sync;
use clap;
use tracing::debug;

struct Cli {
    cmd: clap::Command,
}

impl Cli {
    fn new() -> Self {
        let mut cmd;

        cmd = clap::Command::new("android-confsync")
            .propagate_version(true)
            .subcommand_required(true)
            .about("Android Configuration Synchronization")
            .long_about("Apply the application configuration to its native Android project")
            .version(clap::crate_version!());

        cmd = cmd.arg(
            clap::Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to the application configuration relative to the working directory")
                .default_value("./app.json")
                .value_parser(clap::value_parser!(std::path::PathBuf))
        );

        cmd = cmd.arg(
            clap::Arg::new("project-dir")
                .long("project-dir")
                .value_name("PATH")
                .help("Path to the application project containing the `android` directory")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf))
        );

        cmd = cmd.arg(
            clap::Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every change applied")
                .action(clap::ArgAction::SetTrue)
        );

        cmd = cmd.subcommand(
            clap::Command::new("sync")
                .about("Apply the configuration to the native Android project")
                .arg(
                    clap::Arg::new("services-target")
                        .long("services-target")
                        .value_name("PATH")
                        .help("Destination of google-services.json relative to the project directory")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                )
        );

        cmd = cmd.subcommand(
            clap::Command::new("metadata")
                .about("Print the manifest meta-data derived from the configuration")
        );

        Self {
            cmd: cmd,
        }
    }

    fn init_logging(m: &clap::ArgMatches) {
        let filter = if m.get_flag("verbose") {
            tracing_subscriber::EnvFilter::new("android_confsync=debug")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        };

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    fn config(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<AppConfig, u8> {
        let path: &std::path::PathBuf = m.get_one("config")
            .expect("Config-flag lacks a value");

        match AppConfig::parse_path(path) {
            Err(e) => {
                eprintln!("Cannot load configuration {:?}: {}", path, e);
                Err(1)
            },
            Ok(v) => {
                debug!(path = ?path, "loaded configuration");
                Ok(v)
            },
        }
    }

    fn op_sync(
        &self,
        m: &clap::ArgMatches,
        m_op: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let config = self.config(m)?;
        let project_dir: &std::path::PathBuf = m.get_one("project-dir")
            .expect("Project-flag lacks a value");
        let options = sync::Options {
            services_target: m_op.get_one::<std::path::PathBuf>("services-target").cloned(),
        };

        match sync::sync(&config, project_dir, &options) {
            Err(e) => {
                eprintln!("Cannot sync native project: {}", e);
                Err(1)
            },
            Ok(report) => {
                for path in report.updated.iter() {
                    println!("Updated {}", path.display());
                }
                if report.services_file_copied {
                    println!("Copied google-services.json");
                }
                Ok(())
            },
        }
    }

    fn op_metadata(
        &self,
        m: &clap::ArgMatches,
    ) -> Result<(), u8> {
        let config = self.config(m)?;
        let map = google_maps::sync_meta_data(&config);
        let map = facebook::sync_meta_data_into(&config, map);

        match serde_json::to_string_pretty(&map) {
            Err(e) => {
                eprintln!("Cannot render meta-data: {}", e);
                Err(1)
            },
            Ok(v) => {
                println!("{}", v);
                Ok(())
            },
        }
    }

    fn run(mut self) -> Result<(), u8> {
        let (m, r);

        r = self.cmd.try_get_matches_from_mut(
            std::env::args_os(),
        );

        match r {
            Ok(v) => m = v,
            Err(e) => {
                return match e.kind() {
                    clap::error::ErrorKind::DisplayHelp |
                    clap::error::ErrorKind::DisplayVersion => {
                        e.print().expect("Cannot write to STDERR");
                        Ok(())
                    },
                    _ => {
                        e.print().expect("Cannot write to STDERR");
                        Err(2)
                    }
                }
            }
        }

        Self::init_logging(&m);

        match m.subcommand() {
            Some(("sync", m_op)) => self.op_sync(&m, m_op),
            Some(("metadata", _)) => self.op_metadata(&m),
            _ => std::unreachable!(),
        }
    }
}

fn main() -> std::process::ExitCode {
    match Cli::new().run() {
        Ok(()) => 0.into(),
        Err(v) => v.into(),
    }
}
