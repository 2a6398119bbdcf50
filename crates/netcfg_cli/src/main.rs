//! netcfg-builder CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Inventory error
//! - 4: Template error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use netcfg_inventory::InventoryError;
use netcfg_render::RenderError;
use netcfg_vars::VarsError;

mod commands;

use commands::render::UnhandledExtra;
use commands::Cli;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INVENTORY_ERROR: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "netcfg=debug,info"
    } else if cli.quiet {
        "error"
    } else {
        "netcfg=info,warn"
    };

    // Logs go to stderr; stdout carries the rendered configuration.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .try_init();

    match commands::render::execute(cli.render).await {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if e.downcast_ref::<UnhandledExtra>().is_some() {
        return ExitCodes::INVALID_ARGS;
    }
    if let Some(err) = e.downcast_ref::<InventoryError>() {
        return inventory_code(err);
    }
    if let Some(err) = e.downcast_ref::<VarsError>() {
        return match err {
            VarsError::Inventory(inner) => inventory_code(inner),
            VarsError::InvalidPriority(_)
            | VarsError::LoaderLoad { .. }
            | VarsError::MissingArgument(_)
            | VarsError::UnsetEnvironment(_) => ExitCodes::INVALID_ARGS,
            VarsError::Io(_) => ExitCodes::GENERAL_ERROR,
        };
    }
    if e.downcast_ref::<RenderError>().is_some() {
        return ExitCodes::TEMPLATE_ERROR;
    }
    ExitCodes::GENERAL_ERROR
}

fn inventory_code(err: &InventoryError) -> u8 {
    match err {
        InventoryError::MissingConfig(_) | InventoryError::InvalidConfig { .. } => {
            ExitCodes::INVALID_ARGS
        }
        _ => ExitCodes::INVENTORY_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let missing = anyhow::Error::from(InventoryError::MissingConfig("NETBOX_ADDR".into()));
        assert_eq!(categorize_error(&missing), ExitCodes::INVALID_ARGS);

        let not_found = anyhow::Error::from(VarsError::Inventory(InventoryError::NotFound(
            "Device r1 not found in inventory (matched 0 records)".into(),
        )));
        assert_eq!(categorize_error(&not_found), ExitCodes::INVENTORY_ERROR);

        let hostname = anyhow::Error::from(VarsError::MissingArgument("hostname".into()));
        assert_eq!(categorize_error(&hostname), ExitCodes::INVALID_ARGS);

        let raised = anyhow::Error::from(RenderError::Raised {
            template: "router.j2".into(),
            line: 3,
            message: "bad config".into(),
        });
        assert_eq!(categorize_error(&raised), ExitCodes::TEMPLATE_ERROR);

        let extra = anyhow::Error::from(UnhandledExtra("x.py".into()));
        assert_eq!(categorize_error(&extra), ExitCodes::INVALID_ARGS);

        let load = anyhow::Error::from(VarsError::load("site.yaml", "bad indent"));
        assert_eq!(categorize_error(&load), ExitCodes::INVALID_ARGS);

        let io = anyhow::Error::from(VarsError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )));
        assert_eq!(categorize_error(&io), ExitCodes::GENERAL_ERROR);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("disk full")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
