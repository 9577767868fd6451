use crate::models::StorageEntry;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum InstallMessage {
    Activate,                         // reset the form and reload storage
    StorageLoaded(Vec<StorageEntry>),
    StorageLoadFailed(String),
    NotConnected,                     // probe found no handset
    SelectStorage(usize),
    BrowseCab,
    CabChosen(Option<PathBuf>),       // None when the picker was dismissed
    CabPathEdited(String),
    SetDeleteAfter(bool),
    Confirm,                          // validate the form and start installing
    CopyProgress(u32),                // integer percentage from the copy loop
    InstallCompleted,
    InstallFailed(String),
    InstallAnother,                   // back to a fresh form
    Cancel,                           // leave the workflow without resetting it
}
