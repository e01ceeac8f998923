pub mod env;
pub mod settings;

#[cfg(feature = "cli")]
use crate::domain::model::{Component, Operation};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{ArgGroup, Parser};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "moitt")]
#[command(about = "Select an operation and component(s)")]
#[command(group(ArgGroup::new("operation").required(true).args(["install", "uninstall"])))]
pub struct CliConfig {
    #[arg(short, long, help = "install operation")]
    pub install: bool,

    #[arg(short, long, help = "uninstall operation")]
    pub uninstall: bool,

    #[arg(short, long, value_enum, help = "Specify Component from ocp, registry-puller, istio")]
    pub component: Option<Component>,

    #[arg(short, long, default_value = "assets", help = "OCP cluster config assets directory path")]
    pub directory: String,

    #[arg(short, long, default_value = "4.3.9", help = "OCP installer version")]
    pub version: String,

    #[arg(short, long, help = "install istio operator from quay.io")]
    pub quay: bool,

    #[arg(short, long, default_value = "stable", help = "OLM release channel")]
    pub release: String,

    #[arg(long, default_value = "moitt.toml", help = "Path to the optional settings file")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn operation(&self) -> Operation {
        if self.uninstall {
            Operation::Uninstall
        } else {
            Operation::Install
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("directory", &self.directory)?;
        validate_non_empty_string("version", &self.version)?;
        validate_non_empty_string("release", &self.release)?;
        Ok(())
    }
}
