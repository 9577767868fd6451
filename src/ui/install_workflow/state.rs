use crate::models::StorageEntry;
use thiserror::Error;

/// What is on screen inside the install workflow.
#[derive(Debug, Clone)]
pub enum InstallPhase {
    Form,
    Installing(u32),                // copy progress 0-100
    Completion(Result<(), String>), // success, or the failure text
}

/// Names shown on the progress and completion screens.
#[derive(Debug, Clone)]
pub struct InstallSummary {
    pub package: String,
    pub destination: String,
}

#[derive(Debug, Clone)]
pub struct InstallState {
    pub phase: InstallPhase,
    pub storage: Vec<StorageEntry>,
    pub selected_storage: Option<usize>,
    pub cab_path: String,
    pub delete_after: bool,
    pub loading_storage: bool,
    pub notice: Option<String>,
    pub form_error: Option<String>,
    pub active_install: Option<InstallSummary>,
}

impl InstallState {
    pub fn new() -> Self {
        Self {
            phase: InstallPhase::Form,
            storage: Vec::new(),
            selected_storage: None,
            cab_path: String::new(),
            delete_after: false,
            loading_storage: false,
            notice: None,
            form_error: None,
            active_install: None,
        }
    }
}

/// Why the form cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("select a storage location for the installation")]
    NoSelection,
    #[error("select a software package to install")]
    NoPackage,
}
