//! Functions, tests, and filters available inside templates.
//!
//! | name             | kind     | usage                                   |
//! |------------------|----------|-----------------------------------------|
//! | `raise`          | function | `{{ raise("ASN missing") }}`            |
//! | `None`           | test     | `{% if ASN is None %}`                  |
//! | `contains`       | test     | `{% if "Ethernet1" is contains(INTF_DESC) %}` |
//! | `startswith`     | test     | `{% if name is startswith("Vlan") %}`   |
//! | `ifaces_numeric` | filter   | `{% for i in INTF_DESC\|ifaces_numeric %}` |

use std::fmt;
use std::sync::OnceLock;

use minijinja::value::{Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind};
use regex::Regex;

/// Error carried as the source of a `raise(...)` failure, so the renderer
/// can tell template assertions apart from other engine errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaisedError {
    pub message: String,
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RaisedError {}

/// Register every helper on `env`.
pub fn register(env: &mut Environment<'_>) {
    env.add_function("raise", raise);
    env.add_test("None", is_none);
    env.add_test("contains", contains);
    env.add_test("startswith", startswith);
    env.add_filter("ifaces_numeric", ifaces_numeric_filter);
}

/// Abort rendering with `message`.
pub fn raise(message: String) -> Result<Value, Error> {
    Err(
        Error::new(ErrorKind::InvalidOperation, message.clone())
            .with_source(RaisedError { message }),
    )
}

/// `none` and undefined values are both absent.
fn is_none(value: Value) -> bool {
    value.is_none() || value.is_undefined()
}

/// Element of a sequence, key of a mapping, or substring of a string.
fn contains(value: Value, container: Value) -> Result<bool, Error> {
    match container.kind() {
        ValueKind::String => match (container.as_str(), value.as_str()) {
            (Some(haystack), Some(needle)) => Ok(haystack.contains(needle)),
            _ => Ok(false),
        },
        ValueKind::Seq | ValueKind::Iterable => {
            Ok(container.try_iter()?.any(|item| item == value))
        }
        ValueKind::Map => Ok(!container.get_item(&value)?.is_undefined()),
        ValueKind::None | ValueKind::Undefined => Ok(false),
        other => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot test containment in a value of kind {:?}", other),
        )),
    }
}

fn startswith(value: String, prefix: String) -> bool {
    value.starts_with(&prefix)
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\d]+").expect("prefix pattern is valid"))
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("number pattern is valid"))
}

/// Sort key for an interface name: the first non-numeric run, then every
/// numeric group as an integer.
///
/// `Ethernet1/10` → `("Ethernet", [1, 10])`.
pub fn iface_key(name: &str) -> (String, Vec<u64>) {
    let prefix = prefix_pattern()
        .find(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let numbers = number_pattern()
        .find_iter(name)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .collect();
    (prefix, numbers)
}

/// Filter body: accepts a sequence of names or a mapping keyed by name.
fn ifaces_numeric_filter(value: Value) -> Result<Vec<String>, Error> {
    let names = value
        .try_iter()?
        .map(|item| match item.as_str() {
            Some(name) => name.to_string(),
            None => item.to_string(),
        })
        .collect();
    Ok(ifaces_numeric(names))
}

/// Sort interface names in natural order, so `Ethernet2` precedes
/// `Ethernet10`.
pub fn ifaces_numeric(names: Vec<String>) -> Vec<String> {
    let mut names = names;
    names.sort_by_cached_key(|name| iface_key(name));
    names
}
