use std::{
    env, fs, io,
    path::{Component, Path, PathBuf},
};

use tracing::{info, warn};

use crate::{
    AddressDiscovery, DistinguishedName, KeyToolClient, KeypairRequest, ProvisionError, Result,
    SanPolicy, Secret, SubjectAltName,
};

/// Alias of the server entry in both keystores.
pub const ALIAS: &str = "server";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionConfig {
    pub out_dir: PathBuf,
    pub san: SanPolicy,
    pub server_command: String,
    pub client_command: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("keys"),
            san: SanPolicy::Auto,
            server_command: "java ChainMain".to_string(),
            client_command: "java WalletCLI".to_string(),
        }
    }
}

/// Files produced by a run, in the order they are created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub server_keystore: PathBuf,
    pub certificate: PathBuf,
    pub client_keystore: PathBuf,
}

impl Artifacts {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            server_keystore: dir.join("server.jks"),
            certificate: dir.join("client.pem"),
            client_keystore: dir.join("client.jks"),
        }
    }
}

#[derive(Debug)]
pub struct Provisioned {
    pub artifacts: Artifacts,
    pub san: Option<SubjectAltName>,
    pub warnings: Vec<String>,
    server_command: String,
    client_command: String,
}

impl Provisioned {
    /// Next steps for the operator.
    pub fn guidance(&self) -> String {
        format!(
            "-----\n\n\
             All done. You can now run the server with something like\n\
             KEYSTORE_PASSWORD=your-password {server} -keystore path/to/server.jks\n\
             and the client with\n\
             KEYSTORE_PASSWORD=your-password {client} -hostname HOST -keystore path/to/client.jks\n\
             \n\
             Generated files:\n  {server_ks}\n  {cert}\n  {client_ks}\n\
             \n\
             If you need to interact with the server using curl, you can\n\
             use curl --cacert {cert} -X METHOD https://HOST:PORT\n",
            server = self.server_command,
            client = self.client_command,
            server_ks = self.artifacts.server_keystore.display(),
            cert = self.artifacts.certificate.display(),
            client_ks = self.artifacts.client_keystore.display(),
        )
    }
}

pub struct KeyProvisioner<K, A> {
    keytool: K,
    discovery: A,
    config: ProvisionConfig,
}

impl<K: KeyToolClient, A: AddressDiscovery> KeyProvisioner<K, A> {
    pub fn new(keytool: K, discovery: A, config: ProvisionConfig) -> Self {
        Self {
            keytool,
            discovery,
            config,
        }
    }

    pub fn keytool(&self) -> &K {
        &self.keytool
    }

    /// Generates the server keystore, its PEM export and the client keystore
    /// into a freshly emptied output directory. Stops at the first failure,
    /// leaving whatever was already written in place.
    pub fn run(&self, secret: &Secret, host: &str) -> Result<Provisioned> {
        let artifacts = Artifacts::in_dir(&self.config.out_dir);
        let mut warnings = Vec::new();

        reset_output_dir(&self.config.out_dir)?;

        let version = if self.config.san.needs_probe() {
            let version = self.keytool.report_version()?;
            info!("Detected Java {version}");
            Some(version)
        } else {
            None
        };

        let san = if self.config.san.wants_san(version) {
            let ip = self
                .discovery
                .discover_outbound_address()
                .map_err(ProvisionError::AddressDiscovery)?;
            Some(SubjectAltName::new(host, ip)?)
        } else {
            if let Some(version) = version {
                let warning = format!(
                    "Java {version} does not support certificate extensions; the server \
                     certificate will not name this machine's IP address, so only \
                     localhost connections will validate. Install Java 8 or newer to \
                     fix this."
                );
                warn!("{warning}");
                warnings.push(warning);
            }
            None
        };

        info!(
            "Generating server key-pairs into {}",
            artifacts.server_keystore.display()
        );
        let request = KeypairRequest::new(
            DistinguishedName::for_host(host),
            san.clone(),
            &artifacts.server_keystore,
            ALIAS,
            secret.clone(),
        );
        self.keytool.generate_keypair(&request)?;

        info!(
            "Generating client certificate into {}",
            artifacts.certificate.display()
        );
        self.keytool.export_certificate(
            &artifacts.server_keystore,
            secret,
            ALIAS,
            &artifacts.certificate,
        )?;

        info!(
            "Generating client keystore into {} from certificate",
            artifacts.client_keystore.display()
        );
        self.keytool.import_certificate(
            &artifacts.certificate,
            ALIAS,
            &artifacts.client_keystore,
            secret,
        )?;

        Ok(Provisioned {
            artifacts,
            san,
            warnings,
            server_command: self.config.server_command.clone(),
            client_command: self.config.client_command.clone(),
        })
    }
}

/// Deletes `dir` with everything in it, then creates it empty.
///
/// Refuses to touch the working directory or any directory enclosing it.
pub fn reset_output_dir(dir: &Path) -> Result<()> {
    let fail = |source| ProvisionError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };

    let cwd = env::current_dir().map_err(fail)?;
    ensure_not_enclosing(dir, &cwd)?;

    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(fail(e)),
        _ => {}
    }
    match fs::create_dir_all(dir) {
        Err(e) if e.kind() != io::ErrorKind::AlreadyExists => Err(fail(e)),
        _ => Ok(()),
    }
}

fn ensure_not_enclosing(dir: &Path, cwd: &Path) -> Result<()> {
    let refuse = || Err(ProvisionError::UnsafeOutputDir(dir.to_path_buf()));

    let only_navigation = dir.components().all(|c| {
        matches!(
            c,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if dir.as_os_str().is_empty() || only_navigation {
        return refuse();
    }

    // Nothing to delete if it does not resolve.
    let Ok(target) = cwd.join(dir).canonicalize() else {
        return Ok(());
    };
    let cwd = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
    if cwd.starts_with(&target) {
        return refuse();
    }
    Ok(())
}
