use std::{fmt, net::Ipv4Addr};

use crate::{ProvisionError, Result};

/// Subject of the generated server certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub organizational_unit: String,
    pub organization: String,
    pub locality: String,
    pub state: String,
    pub country: String,
}

impl DistinguishedName {
    /// CN is the server hostname; the organisational fields are fixed.
    pub fn for_host(host: &str) -> Self {
        Self {
            common_name: host.to_string(),
            organizational_unit: "CSSE".to_string(),
            organization: "University of Western Australia".to_string(),
            locality: "Perth".to_string(),
            state: "Western Australia".to_string(),
            country: "AU".to_string(),
        }
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            ("CN", &self.common_name),
            ("OU", &self.organizational_unit),
            ("O", &self.organization),
            ("L", &self.locality),
            ("S", &self.state),
            ("C", &self.country),
        ];
        for (i, (key, value)) in fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}=")?;
            for c in value.chars() {
                if matches!(c, ',' | '+' | '=' | '"' | '\\' | '<' | '>' | ';') {
                    f.write_str("\\")?;
                }
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// `-ext` value naming the server by DNS name and outbound IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAltName {
    pub dns: String,
    pub ip: Ipv4Addr,
}

impl SubjectAltName {
    /// `dns` must be a plain DNS name; keytool's `-ext` grammar has no escaping.
    pub fn new(dns: impl Into<String>, ip: Ipv4Addr) -> Result<Self> {
        let dns = dns.into();
        if !is_dns_name(&dns) {
            return Err(ProvisionError::InvalidHostname(dns));
        }
        Ok(Self { dns, ip })
    }
}

fn is_dns_name(name: &str) -> bool {
    name.len() <= 253
        && name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

impl fmt::Display for SubjectAltName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "san=dns:{},ip:{}", self.dns, self.ip)
    }
}
