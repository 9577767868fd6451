//! Reader for the connection-info files the SynCE daemon drops in its state
//! directory, one per connected Windows Mobile device.
//!
//! The files are flat INI-style text. A minimal one looks like:
//!
//! ```text
//! [dccm]
//! pid=1234
//!
//! [device]
//! ip=192.168.131.201
//! name=PocketPC
//!
//! [connection]
//! transport=ppp
//! ```
//!
//! A file only describes a *usable* connection while the daemon that wrote it
//! is still running, so discovery pairs parsing with a pid liveness check.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConnInfoError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("SYNCE_DIR is unset and no home directory was found")]
    NoSynceDir,
    #[error("malformed connection file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// One parsed connection-info file.
///
/// Only `device_ip` is mandatory; daemons differ in how much identity they
/// record. Numeric fields absent from the file stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionInfo {
    pub device_ip: String,
    pub name: String,
    pub password: Option<String>,
    /// XOR key for the password handshake. Zero when the device is unlocked.
    pub key: u32,
    pub os_major: Option<u32>,
    pub os_minor: Option<u32>,
    pub build_number: Option<u32>,
    pub processor_type: Option<u32>,
    pub partner_id_1: Option<u32>,
    pub partner_id_2: Option<u32>,
    pub model: Option<String>,
    pub os_name: Option<String>,
    pub transport: Option<String>,
    pub dccm_pid: Option<i32>,
    /// File this record was read from, when it came from disk.
    pub source: Option<PathBuf>,
}

impl ConnectionInfo {
    /// Parses the INI-style text of a connection file.
    pub fn parse(text: &str, source: Option<&Path>) -> Result<Self, ConnInfoError> {
        let section_re = Regex::new(r"^\[([^\]]+)\]$").unwrap();
        let pair_re = Regex::new(r"^([A-Za-z0-9_]+)\s*=\s*(.*)$").unwrap();

        let path_of = || source.map(Path::to_path_buf).unwrap_or_default();
        let mut info = ConnectionInfo {
            source: source.map(Path::to_path_buf),
            ..ConnectionInfo::default()
        };
        let mut section = String::new();

        for (lineno, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(caps) = section_re.captures(line) {
                section = caps[1].to_ascii_lowercase();
                continue;
            }
            let Some(caps) = pair_re.captures(line) else {
                return Err(ConnInfoError::Malformed {
                    path: path_of(),
                    reason: format!("line {}: expected `key = value`", lineno + 1),
                });
            };
            let key = caps[1].to_ascii_lowercase();
            let value = caps[2].trim();

            match (section.as_str(), key.as_str()) {
                ("dccm", "pid") => info.dccm_pid = parse_num(value),
                ("device", "ip") => info.device_ip = value.to_string(),
                ("device", "name") => info.name = value.to_string(),
                ("device", "password") if !value.is_empty() => {
                    info.password = Some(value.to_string())
                }
                ("device", "key") => info.key = parse_num(value).unwrap_or(0),
                ("device", "os_version") => info.os_major = parse_num(value),
                ("device", "os_minor") => info.os_minor = parse_num(value),
                ("device", "build_number") => info.build_number = parse_num(value),
                ("device", "processor_type") => info.processor_type = parse_num(value),
                ("device", "partner_id_1") => info.partner_id_1 = parse_num(value),
                ("device", "partner_id_2") => info.partner_id_2 = parse_num(value),
                // Older daemons wrote `hardware` and `class` for the same fields.
                ("device", "model") | ("device", "hardware") => {
                    info.model = Some(value.to_string())
                }
                ("device", "os_name") | ("device", "class") => {
                    info.os_name = Some(value.to_string())
                }
                ("connection", "transport") => info.transport = Some(value.to_string()),
                _ => debug!("ignoring unknown entry [{}] {}", section, key),
            }
        }

        if info.device_ip.is_empty() {
            return Err(ConnInfoError::Malformed {
                path: path_of(),
                reason: "missing device ip".to_string(),
            });
        }
        if info.name.is_empty() {
            info.name = info.device_ip.clone();
        }
        Ok(info)
    }

    /// Reads and parses one connection file.
    pub fn load(path: &Path) -> Result<Self, ConnInfoError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text, Some(path))
    }

    /// True when the daemon that recorded this connection is still running.
    ///
    /// Files with no recorded pid are treated as stale.
    pub fn daemon_alive(&self) -> bool {
        self.dccm_pid.is_some_and(pid_alive)
    }

    /// Whether RAPI traffic goes straight to the device over TCP.
    ///
    /// `ppp`-family transports carry a routable device address; everything
    /// else (including files with no transport entry, written by legacy
    /// daemons) is reached through the daemon's local proxy socket.
    pub fn uses_direct_tcp(&self) -> bool {
        self.transport
            .as_deref()
            .is_some_and(|t| t.starts_with("ppp"))
    }

    /// Path of the daemon's per-device proxy socket inside `synce_dir`.
    pub fn proxy_socket_path(&self, synce_dir: &Path) -> PathBuf {
        synce_dir.join(&self.device_ip)
    }

    /// Short OS description, e.g. `Windows Mobile 5.2 (build 1234)`.
    pub fn os_description(&self) -> Option<String> {
        let major = self.os_major?;
        let base = self.os_name.as_deref().unwrap_or("Windows CE");
        let mut desc = format!("{} {}.{}", base, major, self.os_minor.unwrap_or(0));
        if let Some(build) = self.build_number {
            desc.push_str(&format!(" (build {})", build));
        }
        Some(desc)
    }
}

fn parse_num<T: std::str::FromStr>(value: &str) -> Option<T> {
    value.trim().parse().ok()
}

/// The SynCE state directory: `$SYNCE_DIR` when set, else `$HOME/.synce`.
pub fn synce_directory() -> Result<PathBuf, ConnInfoError> {
    if let Some(dir) = std::env::var_os("SYNCE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".synce"))
        .ok_or(ConnInfoError::NoSynceDir)
}

/// All live connections recorded under `dir`, in directory order.
///
/// Unreadable or malformed files are skipped with a warning; a missing
/// directory just means no daemon has ever run.
pub fn list_in(dir: &Path) -> Result<Vec<ConnectionInfo>, ConnInfoError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            // Skips the daemon's unix proxy sockets, which share this dir.
            continue;
        }
        let path = entry.path();
        match ConnectionInfo::load(&path) {
            Ok(info) => {
                if info.daemon_alive() {
                    found.push(info);
                } else {
                    debug!("stale connection file {} (daemon gone)", path.display());
                }
            }
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    Ok(found)
}

/// First live connection in `dir`, if any.
pub fn discover_in(dir: &Path) -> Result<Option<ConnectionInfo>, ConnInfoError> {
    Ok(list_in(dir)?.into_iter().next())
}

/// First live connection in the default SynCE directory.
pub fn discover() -> Result<Option<ConnectionInfo>, ConnInfoError> {
    discover_in(&synce_directory()?)
}

/// Checks whether `pid` names a running process.
#[cfg(unix)]
pub fn pid_alive(pid: i32) -> bool {
    if pid <= 0 {
        return false;
    }
    // Signal 0 probes existence without delivering anything. EPERM still
    // means the process exists, just not ours.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn pid_alive(pid: i32) -> bool {
    pid > 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
[dccm]
pid=4242

[device]
ip=192.168.131.201
name=PocketPC
os_version=5
os_minor=2
build_number=1235
processor_type=2577
partner_id_1=1171881967
partner_id_2=581940664
model=HTC Universal
class=Windows Mobile

[connection]
transport=ppp
";

    #[test]
    fn parses_full_file() {
        let info = ConnectionInfo::parse(SAMPLE, None).unwrap();
        assert_eq!(info.device_ip, "192.168.131.201");
        assert_eq!(info.name, "PocketPC");
        assert_eq!(info.dccm_pid, Some(4242));
        assert_eq!(info.os_major, Some(5));
        assert_eq!(info.os_minor, Some(2));
        assert_eq!(info.build_number, Some(1235));
        assert_eq!(info.model.as_deref(), Some("HTC Universal"));
        assert_eq!(info.os_name.as_deref(), Some("Windows Mobile"));
        assert_eq!(info.transport.as_deref(), Some("ppp"));
        assert!(info.uses_direct_tcp());
        assert!(info.password.is_none());
        assert_eq!(info.key, 0);
    }

    #[test]
    fn name_falls_back_to_ip() {
        let info = ConnectionInfo::parse("[device]\nip=10.0.0.2\n", None).unwrap();
        assert_eq!(info.name, "10.0.0.2");
    }

    #[test]
    fn missing_ip_is_malformed() {
        let err = ConnectionInfo::parse("[device]\nname=Foo\n", None).unwrap_err();
        assert!(matches!(err, ConnInfoError::Malformed { .. }));
    }

    #[test]
    fn garbage_line_is_malformed() {
        let err = ConnectionInfo::parse("[device]\nip=10.0.0.2\nwhat even\n", None).unwrap_err();
        assert!(matches!(err, ConnInfoError::Malformed { .. }));
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let text = "# header\n\n[device]\n; note\nip=10.0.0.9\n";
        let info = ConnectionInfo::parse(text, None).unwrap();
        assert_eq!(info.device_ip, "10.0.0.9");
    }

    #[test]
    fn password_and_key() {
        let text = "[device]\nip=10.0.0.2\npassword=1234\nkey=66\n";
        let info = ConnectionInfo::parse(text, None).unwrap();
        assert_eq!(info.password.as_deref(), Some("1234"));
        assert_eq!(info.key, 66);
    }

    #[test]
    fn legacy_transport_uses_proxy() {
        let info = ConnectionInfo::parse("[device]\nip=10.0.0.2\n", None).unwrap();
        assert!(!info.uses_direct_tcp());
        assert_eq!(
            info.proxy_socket_path(Path::new("/tmp/synce")),
            PathBuf::from("/tmp/synce/10.0.0.2")
        );
    }

    #[test]
    fn os_description_formats() {
        let info = ConnectionInfo::parse(SAMPLE, None).unwrap();
        assert_eq!(
            info.os_description().as_deref(),
            Some("Windows Mobile 5.2 (build 1235)")
        );
    }

    #[cfg(unix)]
    #[test]
    fn own_pid_is_alive() {
        assert!(pid_alive(std::process::id() as i32));
        assert!(!pid_alive(0));
    }

    #[test]
    fn discovers_live_connection_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        let live = format!(
            "[dccm]\npid={}\n\n[device]\nip=10.0.0.3\nname=Live\n",
            std::process::id()
        );
        std::fs::write(dir.path().join("10.0.0.3"), live).unwrap();

        let found = discover_in(dir.path()).unwrap().unwrap();
        assert_eq!(found.name, "Live");
        assert_eq!(found.source, Some(dir.path().join("10.0.0.3")));
    }

    #[test]
    fn skips_stale_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        // pid 1 is init: alive but never a dccm we own. Use an impossible pid.
        std::fs::write(
            dir.path().join("10.0.0.4"),
            "[dccm]\npid=-7\n\n[device]\nip=10.0.0.4\n",
        )
        .unwrap();
        let mut junk = std::fs::File::create(dir.path().join("junk")).unwrap();
        junk.write_all(b"not an ini file at all").unwrap();

        assert!(discover_in(dir.path()).unwrap().is_none());
    }

    #[test]
    fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("never-created");
        assert!(list_in(&gone).unwrap().is_empty());
    }
}
