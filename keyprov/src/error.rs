use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Cannot prepare output directory {}: {source}", .path.display())]
    OutputDir { path: PathBuf, source: io::Error },

    #[error("Refusing to empty {}: it is or contains the working directory", .0.display())]
    UnsafeOutputDir(PathBuf),

    #[error("Failed to run `{program}`: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("{step} failed ({status}): {diagnostics}")]
    ToolFailed {
        step: &'static str,
        status: ExitStatus,
        diagnostics: String,
    },

    #[error("Cannot parse version report: `{0}`")]
    UnrecognizedVersion(String),

    #[error("Hostname `{0}` is not a plain DNS name")]
    InvalidHostname(String),

    #[error("Cannot discover outbound IPv4 address: {0}")]
    AddressDiscovery(io::Error),

    #[error("Cannot write {}: {source}", .path.display())]
    WriteArtifact { path: PathBuf, source: io::Error },
}
