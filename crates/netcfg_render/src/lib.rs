//! # netcfg_render
//!
//! Configuration template rendering for netcfg-builder.
//!
//! Templates are Jinja-style files under a root directory. On top of the
//! template engine this crate adds:
//!
//! - Relative includes resolved against the including template's own
//!   directory (`{% include "../common/ntp.j2" %}`)
//! - Helpers for template authors: `raise`, the `None`, `contains`, and
//!   `startswith` tests, and the `ifaces_numeric` filter
//! - `raise(...)` failures reported as `<template>:<line>: <message>`
//!
//! ## Example
//!
//! ```rust,no_run
//! use netcfg_render::TemplateRenderer;
//! use serde_json::json;
//!
//! let renderer = TemplateRenderer::new("templates");
//! let config = renderer
//!     .render("eos/leaf.j2", &json!({ "hostname": "nyc1le01" }))
//!     .unwrap();
//! print!("{}", config);
//! ```

pub mod error;
pub mod helpers;
pub mod paths;
pub mod renderer;

pub use error::{RenderError, RenderResult};
pub use helpers::{iface_key, ifaces_numeric, RaisedError};
pub use paths::resolve_include;
pub use renderer::{render_path, TemplateRenderer};
