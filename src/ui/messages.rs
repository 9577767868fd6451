use crate::models::DeviceInfo;
use crate::ui::install_workflow::InstallMessage;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum Message {
    // App-level messages
    OpenInstaller,
    BackToOverview,
    Exit,

    // Device probing
    ProbeDevice,
    DeviceProbed(Option<DeviceInfo>),

    // Settings persistence
    CabDirUsed(PathBuf),
    DeleteDefaultChanged(bool),

    // Module-specific message variants
    Install(InstallMessage),
}
