use std::fmt;
use std::path::PathBuf;

/// Which top-level screen the application is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppScreen {
    Overview,
    Install,
}

const BYTES_PER_MB: f64 = 1_048_576.0;

pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// One storage volume reported by the connected device.
///
/// `location` is the opaque device-side root the communicator installs into.
/// The entry that is displayed is the entry that gets used, so the visible
/// list and the retained locations cannot drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEntry {
    pub name: String,
    pub location: String,
    pub free_bytes: u64,
    pub total_bytes: u64,
}

impl StorageEntry {
    /// Label shown in the storage list, with sizes in MB at two decimals.
    pub fn label(&self) -> String {
        format!(
            "{} [Free: {:.2}MB , Total: {:.2}MB]",
            self.name,
            bytes_to_mb(self.free_bytes),
            bytes_to_mb(self.total_bytes)
        )
    }
}

// Display matches the list label so widgets can render entries directly
impl fmt::Display for StorageEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Everything the communicator needs to install one package, assembled from
/// the form at submit time.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallRequest {
    pub cab_path: PathBuf,
    pub location: String,
    pub delete_after: bool,
}

/// Identity of the connected handset, as recorded by the connection daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub name: String,
    pub address: String,
    pub model: Option<String>,
    pub os: Option<String>,
    pub transport: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_to_mb_divides_by_mebibyte() {
        assert_eq!(bytes_to_mb(1_048_576), 1.0);
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(524_288), 0.5);
    }

    #[test]
    fn storage_label_formats_two_decimals() {
        let entry = StorageEntry {
            name: "SD Card".to_string(),
            location: "\\Storage Card".to_string(),
            free_bytes: 104_857_600,
            total_bytes: 209_715_200,
        };
        assert_eq!(entry.label(), "SD Card [Free: 100.00MB , Total: 200.00MB]");
        assert_eq!(entry.to_string(), entry.label());
    }

    #[test]
    fn storage_label_rounds_fractions() {
        let entry = StorageEntry {
            name: "Main Memory".to_string(),
            location: "\\".to_string(),
            free_bytes: 1_572_864,  // 1.5 MB
            total_bytes: 3_407_872, // 3.25 MB
        };
        assert_eq!(entry.label(), "Main Memory [Free: 1.50MB , Total: 3.25MB]");
    }
}
