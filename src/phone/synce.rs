//! Live communicator backed by the SynCE connection daemon.
//!
//! The daemon writes one info file per connected handset; discovery picks
//! the first file whose daemon is still running. RAPI sessions are opened
//! per call, the daemon keeps the expensive device link alive between them.

use crate::models::{DeviceInfo, InstallRequest, StorageEntry};
use crate::phone::error::PhoneError;
use crate::phone::rapi::{ops, RapiSession};
use crate::phone::PhoneCommunicator;
use async_trait::async_trait;
use std::path::PathBuf;
use synce_conninfo::ConnectionInfo;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Default)]
pub struct SyncePhone;

impl SyncePhone {
    pub fn new() -> Self {
        Self
    }

    async fn live_connection(&self) -> Result<(ConnectionInfo, PathBuf), PhoneError> {
        let found = tokio::task::spawn_blocking(|| -> Result<_, PhoneError> {
            let dir = synce_conninfo::synce_directory()?;
            let info = synce_conninfo::discover_in(&dir)?;
            Ok((dir, info))
        })
        .await
        .map_err(|e| PhoneError::Io(std::io::Error::other(e)))??;

        match found {
            (dir, Some(info)) => {
                debug!("found {} at {}", info.name, info.device_ip);
                Ok((info, dir))
            }
            (_, None) => Err(PhoneError::NotConnected),
        }
    }

    async fn open_session(&self) -> Result<RapiSession, PhoneError> {
        let (info, dir) = self.live_connection().await?;
        RapiSession::connect(&info, &dir).await
    }
}

#[async_trait]
impl PhoneCommunicator for SyncePhone {
    async fn is_connected(&self) -> bool {
        self.live_connection().await.is_ok()
    }

    async fn device_info(&self) -> Result<DeviceInfo, PhoneError> {
        let (info, _) = self.live_connection().await?;
        let os = info.os_description();
        Ok(DeviceInfo {
            name: info.name,
            address: info.device_ip,
            model: info.model,
            os,
            transport: info.transport,
        })
    }

    async fn storage_inventory(&self) -> Result<Vec<StorageEntry>, PhoneError> {
        let mut session = self.open_session().await?;
        ops::storage_inventory(&mut session).await
    }

    async fn install_program(
        &self,
        request: InstallRequest,
        progress: mpsc::UnboundedSender<u32>,
    ) -> Result<(), PhoneError> {
        let mut session = self.open_session().await?;
        ops::install_cab(&mut session, &request, &progress).await
    }
}
