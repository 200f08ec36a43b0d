use std::{
    io,
    net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket},
};

use tracing::debug;

/// Finds the address of the interface used for outbound traffic.
pub trait AddressDiscovery {
    fn discover_outbound_address(&self) -> io::Result<Ipv4Addr>;
}

/// Connects a throwaway UDP socket towards `target` and reads back the
/// locally bound address. Connecting a datagram socket only selects a route;
/// nothing is sent.
#[derive(Debug, Clone, Copy)]
pub struct UdpProbe {
    pub target: SocketAddrV4,
}

impl UdpProbe {
    pub const DEFAULT_TARGET: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(8, 8, 8, 8), 80);

    pub fn new(target: SocketAddrV4) -> Self {
        Self { target }
    }
}

impl Default for UdpProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TARGET)
    }
}

impl AddressDiscovery for UdpProbe {
    fn discover_outbound_address(&self) -> io::Result<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(self.target)?;
        match socket.local_addr()? {
            SocketAddr::V4(local) => {
                debug!("Outbound address towards {} is {}", self.target, local.ip());
                Ok(*local.ip())
            }
            SocketAddr::V6(local) => Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("probe socket bound to IPv6 address {local}"),
            )),
        }
    }
}

/// Always reports the same address.
#[derive(Debug, Clone, Copy)]
pub struct FixedAddress(pub Ipv4Addr);

impl AddressDiscovery for FixedAddress {
    fn discover_outbound_address(&self) -> io::Result<Ipv4Addr> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_probe_reports_loopback() {
        let probe = UdpProbe::new(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9));
        let addr = probe.discover_outbound_address().unwrap();
        assert!(addr.is_loopback());
    }

    #[test]
    fn fixed_address() {
        let addr = Ipv4Addr::new(192, 168, 1, 20);
        assert_eq!(FixedAddress(addr).discover_outbound_address().unwrap(), addr);
    }
}
