//! Adapter administration through the external configuration tool.
//!
//! Enabling, disabling, renaming and querying an adapter by its friendly
//! name. Status output is localized; English and Simplified Chinese labels
//! are understood.

use std::fmt;

use serde::Serialize;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{any, rest, take_till};

use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::helper::IpHelper;
use crate::host::Host;

/// Result type for winnow parsers.
type PResult<T> = core::result::Result<T, winnow::error::ErrMode<ContextError>>;

/// Administrative state of an adapter as the tool reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminStatus {
    Disabled,
    Enabled,
    Connected,
    Unknown,
}

impl fmt::Display for AdminStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
            Self::Connected => "connected",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

const ADMIN_LABELS: &[&str] = &["Administrative state", "管理状态"];
const CONNECT_LABELS: &[&str] = &["Connect state", "连接状态"];
const DISABLED: &[&str] = &["Disabled", "已禁用"];
const ENABLED: &[&str] = &["Enabled", "已启用"];
const CONNECTED: &[&str] = &["Connected", "已连接"];

/// One `label: value` line, either colon width.
fn field<'s>(input: &mut &'s str) -> PResult<(&'s str, &'s str)> {
    let label = take_till(1.., |c: char| c == ':' || c == '：').parse_next(input)?;
    any.parse_next(input)?;
    let value = rest.parse_next(input)?;
    Ok((label.trim(), value.trim()))
}

/// Parse `interface show interface name=...` output.
///
/// A disabled adapter is [`AdminStatus::Disabled`] whatever its connect
/// state; an enabled one is [`AdminStatus::Connected`] when connected.
/// Output without a recognizable administrative state is
/// [`AdminStatus::Unknown`].
pub fn parse_admin_status(output: &str) -> AdminStatus {
    let mut admin = None;
    let mut connect = None;
    for line in output.lines() {
        let Ok((label, value)) = field.parse(line.trim()) else {
            continue;
        };
        if ADMIN_LABELS.contains(&label) {
            admin = Some(value);
        } else if CONNECT_LABELS.contains(&label) {
            connect = Some(value);
        }
    }

    match admin {
        Some(v) if DISABLED.contains(&v) => AdminStatus::Disabled,
        _ if connect.is_some_and(|v| CONNECTED.contains(&v)) => AdminStatus::Connected,
        Some(v) if ENABLED.contains(&v) => AdminStatus::Enabled,
        _ => AdminStatus::Unknown,
    }
}

/// Check a friendly name can be quoted on a command line.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Parse("empty interface name".into()));
    }
    if name.contains(['"', '\r', '\n']) {
        return Err(Error::Parse(format!("interface name {name:?} cannot be quoted")));
    }
    Ok(())
}

pub fn admin_command(name: &str, enabled: bool) -> Result<String> {
    validate_name(name)?;
    let state = if enabled { "enable" } else { "disable" };
    Ok(format!("interface set interface name=\"{name}\" admin={state}"))
}

pub fn status_command(name: &str) -> Result<String> {
    validate_name(name)?;
    Ok(format!("interface show interface name=\"{name}\""))
}

pub fn rename_command(old: &str, new: &str) -> Result<String> {
    validate_name(old)?;
    validate_name(new)?;
    Ok(format!("interface set interface name=\"{old}\" newname=\"{new}\""))
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    /// Enable or disable an adapter.
    pub fn set_admin_state(&self, name: &str, enabled: bool) -> Result<()> {
        let cmd = admin_command(name, enabled)?;
        self.runner().run(&[cmd])?.into_checked()?;
        tracing::info!(interface = name, enabled, "admin state changed");
        Ok(())
    }

    /// Query an adapter's administrative state.
    pub fn admin_status(&self, name: &str) -> Result<AdminStatus> {
        let cmd = status_command(name)?;
        let text = self.runner().run(&[cmd])?.into_text()?;
        let status = parse_admin_status(&text);
        tracing::debug!(interface = name, %status, "admin status");
        Ok(status)
    }

    /// Rename an adapter.
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        let cmd = rename_command(old, new)?;
        self.runner().run(&[cmd])?.into_checked()?;
        tracing::info!(from = old, to = new, "interface renamed");
        Ok(())
    }

    /// Run arbitrary commands and return the output without prompts.
    pub fn run_script(&self, commands: &[String]) -> Result<String> {
        self.runner().run(commands)?.into_text()
    }
}
