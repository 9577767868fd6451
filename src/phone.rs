//! Device communication layer.
//!
//! [`PhoneCommunicator`] is the seam between the UI and a handset: the live
//! implementation talks RAPI through the connection daemon, tests swap in a
//! recording mock.

pub mod error;
pub mod rapi;
pub mod synce;

pub use error::PhoneError;
pub use synce::SyncePhone;

use crate::models::{DeviceInfo, InstallRequest, StorageEntry};
use async_trait::async_trait;
use iced::task::{self, Sipper};
use std::sync::Arc;
use tokio::sync::mpsc;

#[async_trait]
pub trait PhoneCommunicator: Send + Sync {
    /// Cheap probe used to decide whether a handset is reachable.
    async fn is_connected(&self) -> bool;

    async fn device_info(&self) -> Result<DeviceInfo, PhoneError>;

    async fn storage_inventory(&self) -> Result<Vec<StorageEntry>, PhoneError>;

    /// Copies the package to the device and starts the on-device installer.
    /// Integer percentages are pushed into `progress` as the copy advances.
    async fn install_program(
        &self,
        request: InstallRequest,
        progress: mpsc::UnboundedSender<u32>,
    ) -> Result<(), PhoneError>;
}

/// Runs an installation as a sipper so the UI can watch copy progress.
pub fn install_stream(
    phone: Arc<dyn PhoneCommunicator>,
    request: InstallRequest,
) -> impl Sipper<Result<(), PhoneError>, u32> + Send + 'static {
    task::sipper(async move |sipper| -> Result<(), PhoneError> {
        let (tx, mut rx) = mpsc::unbounded_channel();

        // Forward progress events from the communicator to the sipper
        {
            let mut s = sipper.clone();
            tokio::task::spawn(async move {
                while let Some(percent) = rx.recv().await {
                    s.send(percent).await;
                }
            });
        }

        phone.install_program(request, tx).await
    })
}
