use std::fmt;

use clap::ValueEnum;

use crate::{ProvisionError, Result};

/// Oldest major release whose keytool accepts `-ext`.
pub const SAN_MIN_MAJOR: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct JavaVersion {
    pub major: u32,
    pub minor: u32,
}

impl JavaVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Parses the version line of a `java -version` report. Lines printed
    /// ahead of it (`Picked up JAVA_TOOL_OPTIONS: ...`) are skipped.
    ///
    /// Both the legacy `1.x` scheme (`java version "1.8.0_292"`) and the
    /// current one (`openjdk version "17.0.2" 2022-01-18`) are accepted.
    pub fn parse_report(report: &str) -> Result<Self> {
        let line = report
            .lines()
            .find(|l| l.contains("version \""))
            .or_else(|| report.lines().next())
            .unwrap_or_default()
            .trim();
        let unrecognized = || ProvisionError::UnrecognizedVersion(line.to_string());

        let quoted = line.split('"').nth(1).ok_or_else(unrecognized)?;
        let mut parts = quoted.split(['.', '_', '-', '+']).map(leading_number);

        let first = parts.next().flatten().ok_or_else(unrecognized)?;
        let second = parts.next().flatten();
        match (first, second) {
            (1, Some(major)) => Ok(Self::new(major, parts.next().flatten().unwrap_or(0))),
            (1, None) => Err(unrecognized()),
            (major, minor) => Ok(Self::new(major, minor.unwrap_or(0))),
        }
    }

    pub fn supports_extensions(&self) -> bool {
        self.major >= SAN_MIN_MAJOR
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

fn leading_number(part: &str) -> Option<u32> {
    let end = part
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(part.len());
    part[..end].parse().ok()
}

/// Whether the server certificate carries a Subject Alternative Name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SanPolicy {
    /// Add the SAN when the installed runtime supports it
    #[default]
    Auto,
    /// Always add the SAN without probing the runtime
    Always,
    /// Never add the SAN
    Never,
}

impl SanPolicy {
    pub fn needs_probe(&self) -> bool {
        matches!(self, SanPolicy::Auto)
    }

    pub fn wants_san(&self, version: Option<JavaVersion>) -> bool {
        match self {
            SanPolicy::Auto => version.is_some_and(|v| v.supports_extensions()),
            SanPolicy::Always => true,
            SanPolicy::Never => false,
        }
    }
}
