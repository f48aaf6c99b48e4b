//! Reader identity detection.
//!
//! The notification carries the reader's IP and MAC address. Both are looked
//! up once at startup; anything that cannot be detected is reported as
//! `"unknown"` rather than failing startup.

use crate::payload::ReaderIdentity;
use lensreader_core::constants::UNKNOWN_IDENTITY;
use std::fs;
use std::net::{IpAddr, UdpSocket};
use std::path::Path;
use tracing::{debug, warn};

const SYS_NET: &str = "/sys/class/net";

/// Address used to pick the outbound interface. No packet is sent.
const ROUTE_PROBE: &str = "8.8.8.8:80";

/// Detect the reader's identity.
///
/// `interface` selects the network interface whose MAC address is reported;
/// when `None`, the first non-loopback interface with a hardware address is
/// used.
pub fn detect(
    interface: Option<&str>,
    reader_model: Option<String>,
    reader_name: Option<String>,
) -> ReaderIdentity {
    let ip_address = detect_ip().map(|ip| ip.to_string()).unwrap_or_else(|| {
        warn!("Could not determine reader IP address");
        UNKNOWN_IDENTITY.to_string()
    });

    let mac_address = detect_mac(Path::new(SYS_NET), interface).unwrap_or_else(|| {
        warn!(?interface, "Could not determine reader MAC address");
        UNKNOWN_IDENTITY.to_string()
    });

    let identity = ReaderIdentity::new(mac_address, ip_address, reader_model, reader_name);
    debug!(?identity, "Reader identity detected");
    identity
}

/// Local address of the interface that routes to the outside world.
pub fn detect_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(ROUTE_PROBE).ok()?;
    let ip = socket.local_addr().ok()?.ip();
    (!ip.is_unspecified()).then_some(ip)
}

/// Hardware address of `interface`, read from a sysfs-style directory.
fn detect_mac(sys_net: &Path, interface: Option<&str>) -> Option<String> {
    if let Some(name) = interface {
        return read_mac(&sys_net.join(name));
    }

    let mut names: Vec<String> = fs::read_dir(sys_net)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "lo")
        .collect();
    names.sort();

    names.iter().find_map(|name| read_mac(&sys_net.join(name)))
}

fn read_mac(interface_dir: &Path) -> Option<String> {
    let address = fs::read_to_string(interface_dir.join("address")).ok()?;
    let address = address.trim().to_ascii_lowercase();

    (!address.is_empty() && address != "00:00:00:00:00:00").then_some(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_sys_net(interfaces: &[(&str, &str)]) -> TempDir {
        let root = tempfile::tempdir().unwrap();
        for (name, address) in interfaces {
            let dir = root.path().join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("address"), format!("{address}\n")).unwrap();
        }
        root
    }

    #[test]
    fn test_detect_mac_skips_loopback_and_zero() {
        let root = fake_sys_net(&[
            ("lo", "00:00:00:00:00:00"),
            ("dummy0", "00:00:00:00:00:00"),
            ("eth0", "B8:27:EB:12:34:56"),
        ]);

        assert_eq!(
            detect_mac(root.path(), None).as_deref(),
            Some("b8:27:eb:12:34:56")
        );
    }

    #[test]
    fn test_detect_mac_named_interface() {
        let root = fake_sys_net(&[("eth0", "aa:aa:aa:aa:aa:aa"), ("wlan0", "bb:bb:bb:bb:bb:bb")]);

        assert_eq!(
            detect_mac(root.path(), Some("wlan0")).as_deref(),
            Some("bb:bb:bb:bb:bb:bb")
        );
        assert_eq!(detect_mac(root.path(), Some("missing")), None);
    }

    #[test]
    fn test_fake_sys_net_is_removed_on_drop() {
        let root = fake_sys_net(&[("eth0", "aa:aa:aa:aa:aa:aa")]);
        let path = root.path().to_path_buf();
        assert!(path.join("eth0").join("address").exists());

        drop(root);
        assert!(!path.exists());
    }

    #[test]
    fn test_detect_mac_missing_directory() {
        assert_eq!(detect_mac(Path::new("/nonexistent/sys/net"), None), None);
    }

    #[test]
    fn test_detect_never_panics() {
        let identity = detect(Some("definitely-not-an-interface"), None, Some("x".into()));
        assert_eq!(identity.mac_address, UNKNOWN_IDENTITY);
        assert_eq!(identity.reader_name, "x");
    }
}
