use std::{
    ffi::{OsStr, OsString},
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use tracing::debug;

use crate::{DistinguishedName, JavaVersion, ProvisionError, Result, Secret, SubjectAltName};

pub const KEY_ALGORITHM: &str = "RSA";
pub const KEY_SIZE: u32 = 2048;

/// Parameters of `keytool -genkeypair`.
#[derive(Debug, Clone)]
pub struct KeypairRequest {
    pub dname: DistinguishedName,
    pub san: Option<SubjectAltName>,
    pub keystore: PathBuf,
    pub alias: String,
    pub key_alg: String,
    pub key_size: u32,
    pub secret: Secret,
}

impl KeypairRequest {
    pub fn new(
        dname: DistinguishedName,
        san: Option<SubjectAltName>,
        keystore: impl Into<PathBuf>,
        alias: impl Into<String>,
        secret: Secret,
    ) -> Self {
        Self {
            dname,
            san,
            keystore: keystore.into(),
            alias: alias.into(),
            key_alg: KEY_ALGORITHM.to_string(),
            key_size: KEY_SIZE,
            secret,
        }
    }
}

/// The key-management tool all key material is delegated to.
pub trait KeyToolClient {
    fn report_version(&self) -> Result<JavaVersion>;

    fn generate_keypair(&self, request: &KeypairRequest) -> Result<()>;

    /// Writes the certificate stored under `alias` to `dest` as PEM.
    fn export_certificate(
        &self,
        keystore: &Path,
        secret: &Secret,
        alias: &str,
        dest: &Path,
    ) -> Result<()>;

    /// Imports the PEM certificate at `cert` into `keystore` as a trusted entry.
    fn import_certificate(
        &self,
        cert: &Path,
        alias: &str,
        keystore: &Path,
        secret: &Secret,
    ) -> Result<()>;
}

pub fn genkeypair_args(request: &KeypairRequest) -> Vec<OsString> {
    let secret = request.secret.expose();
    let mut args: Vec<OsString> = vec![
        "-genkeypair".into(),
        "-dname".into(),
        request.dname.to_string().into(),
    ];
    if let Some(san) = &request.san {
        args.push("-ext".into());
        args.push(san.to_string().into());
    }
    args.extend([
        "-keystore".into(),
        request.keystore.as_os_str().to_owned(),
        "-keyalg".into(),
        request.key_alg.as_str().into(),
        "-keysize".into(),
        request.key_size.to_string().into(),
        "-storepass".into(),
        secret.into(),
        "-alias".into(),
        request.alias.as_str().into(),
        "-keypass".into(),
        secret.into(),
    ]);
    args
}

pub fn exportcert_args(keystore: &Path, secret: &Secret, alias: &str) -> Vec<OsString> {
    vec![
        "-exportcert".into(),
        "-rfc".into(),
        "-keystore".into(),
        keystore.as_os_str().to_owned(),
        "-storepass".into(),
        secret.expose().into(),
        "-alias".into(),
        alias.into(),
    ]
}

pub fn import_args(cert: &Path, alias: &str, keystore: &Path, secret: &Secret) -> Vec<OsString> {
    vec![
        "-import".into(),
        "-noprompt".into(),
        "-file".into(),
        cert.as_os_str().to_owned(),
        "-alias".into(),
        alias.into(),
        "-keystore".into(),
        keystore.as_os_str().to_owned(),
        "-storepass".into(),
        secret.expose().into(),
        "-keypass".into(),
        secret.expose().into(),
    ]
}

/// Runs `keytool` and `java` as child processes, blocking until each exits.
#[derive(Debug, Clone)]
pub struct ProcessKeyTool {
    pub keytool: OsString,
    pub java: OsString,
}

impl ProcessKeyTool {
    pub fn new(keytool: impl Into<OsString>, java: impl Into<OsString>) -> Self {
        Self {
            keytool: keytool.into(),
            java: java.into(),
        }
    }

    fn run(&self, step: &'static str, args: &[OsString], secret: &Secret) -> Result<Output> {
        debug!(
            "{step}: {} {}",
            self.keytool.to_string_lossy(),
            redacted(args, secret)
        );
        let output = spawn(&self.keytool, args)?;
        check(step, output)
    }
}

impl Default for ProcessKeyTool {
    fn default() -> Self {
        Self::new("keytool", "java")
    }
}

impl KeyToolClient for ProcessKeyTool {
    fn report_version(&self) -> Result<JavaVersion> {
        let output = check("version probe", spawn(&self.java, &[OsString::from("-version")])?)?;
        // The runtime reports its version on stderr.
        let report = if output.stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout)
        } else {
            String::from_utf8_lossy(&output.stderr)
        };
        JavaVersion::parse_report(&report)
    }

    fn generate_keypair(&self, request: &KeypairRequest) -> Result<()> {
        self.run("keypair generation", &genkeypair_args(request), &request.secret)?;
        Ok(())
    }

    fn export_certificate(
        &self,
        keystore: &Path,
        secret: &Secret,
        alias: &str,
        dest: &Path,
    ) -> Result<()> {
        let output = self.run(
            "certificate export",
            &exportcert_args(keystore, secret, alias),
            secret,
        )?;
        fs::write(dest, output.stdout).map_err(|source| ProvisionError::WriteArtifact {
            path: dest.to_path_buf(),
            source,
        })
    }

    fn import_certificate(
        &self,
        cert: &Path,
        alias: &str,
        keystore: &Path,
        secret: &Secret,
    ) -> Result<()> {
        self.run(
            "certificate import",
            &import_args(cert, alias, keystore, secret),
            secret,
        )?;
        Ok(())
    }
}

fn spawn(program: &OsStr, args: &[OsString]) -> Result<Output> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ProvisionError::Spawn {
            program: program.to_string_lossy().into_owned(),
            source,
        })
}

fn check(step: &'static str, output: Output) -> Result<Output> {
    if output.status.success() {
        return Ok(output);
    }
    let diagnostics = if output.stderr.is_empty() {
        &output.stdout
    } else {
        &output.stderr
    };
    Err(ProvisionError::ToolFailed {
        step,
        status: output.status,
        diagnostics: String::from_utf8_lossy(diagnostics).trim().to_string(),
    })
}

fn redacted(args: &[OsString], secret: &Secret) -> String {
    args.iter()
        .map(|arg| {
            if arg == secret.expose() {
                "***".into()
            } else {
                arg.to_string_lossy()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
