use clap::{builder::NonEmptyStringValueParser, Parser};

use crate::{ProvisionConfig, SanPolicy, Secret};

#[derive(Parser, Debug)]
#[clap(
    name = "tlsgen",
    about = "Generate keystores for the client and server by shelling out to keytool"
)]
pub struct Opt {
    /// Password to use for the keystore
    #[clap(value_name = "PASSWORD", value_parser = NonEmptyStringValueParser::new())]
    pub password: String,
    /// Hostname of the server
    #[clap(value_name = "HOSTNAME", value_parser = NonEmptyStringValueParser::new())]
    pub host: String,
    /// keytool executable
    #[clap(long = "keytool", default_value = "keytool")]
    pub keytool: String,
    /// Java runtime probed for extension support
    #[clap(long = "java", default_value = "java")]
    pub java: String,
    /// When to add the Subject Alternative Name extension
    #[clap(long = "san", value_enum, default_value_t = SanPolicy::Auto)]
    pub san: SanPolicy,
    /// Server command shown in the instructions
    #[clap(long = "server-command", default_value = "java ChainMain")]
    pub server_command: String,
    /// Client command shown in the instructions
    #[clap(long = "client-command", default_value = "java WalletCLI")]
    pub client_command: String,
}

impl Opt {
    pub fn secret(&self) -> Secret {
        Secret::new(self.password.clone())
    }

    pub fn config(&self) -> ProvisionConfig {
        ProvisionConfig {
            san: self.san,
            server_command: self.server_command.clone(),
            client_command: self.client_command.clone(),
            ..ProvisionConfig::default()
        }
    }
}
