//! CLI command definitions.
//!
//! netcfg-builder has a single job: resolve the variables for one device
//! and render one template with them.

use clap::Parser;

pub mod render;

/// netcfg-builder - render network device configurations
#[derive(Parser)]
#[command(name = "netcfg-builder")]
#[command(version, about = "Render network device configurations from templates")]
#[command(long_about = r#"
netcfg-builder renders a device configuration from a Jinja-style template.
Template variables come from the NetBox inventory (when --hostname is given)
and from any number of -e sources, later sources overriding earlier ones:

  -e key=value        a single variable (highest precedence)
  -e vars.yaml        a TOML, YAML, or JSON variable file
  -e vars/            every variable file in a directory

ENVIRONMENT:
  NETBOX_ADDR         inventory base address (required with --hostname)
  NETBOX_TOKEN        inventory API token (required with --hostname)
  NETBOX_TIMEOUT      request timeout in seconds (default 60)
  NETBOX_VERIFY_TLS   verify the inventory TLS certificate (default false)

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Inventory error
  4 - Template error
"#)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub render: render::RenderArgs,
}
