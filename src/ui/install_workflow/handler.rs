use super::messages::InstallMessage;
use super::state::{FormError, InstallPhase, InstallState, InstallSummary};
use crate::models::InstallRequest;
use crate::phone::{self, PhoneCommunicator};
use crate::ui::messages::Message;
use crate::utils::settings::Settings;
use iced::Task;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub fn handle_message(
    state: &mut InstallState,
    phone: &Arc<dyn PhoneCommunicator>,
    settings: &Settings,
    message: InstallMessage,
) -> Task<Message> {
    match message {
        InstallMessage::Activate => {
            // Every activation starts from a clean form
            *state = InstallState::new();
            state.delete_after = settings.delete_cab_default;
            state.loading_storage = true;
            debug!("install form activated, loading storage");

            let phone = Arc::clone(phone);
            Task::perform(
                async move {
                    if !phone.is_connected().await {
                        return InstallMessage::NotConnected;
                    }
                    match phone.storage_inventory().await {
                        Ok(entries) => InstallMessage::StorageLoaded(entries),
                        Err(e) => InstallMessage::StorageLoadFailed(e.to_string()),
                    }
                },
                Message::Install,
            )
        }

        InstallMessage::StorageLoaded(entries) => {
            info!("loaded {} storage locations", entries.len());
            state.storage = entries;
            state.selected_storage = None;
            state.loading_storage = false;
            Task::none()
        }

        InstallMessage::StorageLoadFailed(reason) => {
            error!("storage inventory failed: {reason}");
            state.loading_storage = false;
            state.form_error = Some(format!("Could not read storage information: {reason}"));
            Task::none()
        }

        InstallMessage::NotConnected => {
            warn!("no device connected, leaving the storage list empty");
            state.loading_storage = false;
            state.notice =
                Some("No device connected. Connect a handset and reopen this screen.".to_string());
            Task::none()
        }

        InstallMessage::SelectStorage(index) => {
            if index < state.storage.len() {
                state.selected_storage = Some(index);
                state.form_error = None;
            }
            Task::none()
        }

        InstallMessage::BrowseCab => {
            let start_dir = settings.last_cab_dir.clone();
            Task::perform(
                async move {
                    let mut dialog = rfd::AsyncFileDialog::new()
                        .add_filter("Microsoft Cabinet files", &["cab"])
                        .set_title("Select software package");
                    if let Some(dir) = start_dir {
                        dialog = dialog.set_directory(dir);
                    }
                    dialog
                        .pick_file()
                        .await
                        .map(|handle| handle.path().to_path_buf())
                },
                |choice| Message::Install(InstallMessage::CabChosen(choice)),
            )
        }

        InstallMessage::CabChosen(Some(path)) => {
            debug!("package chosen: {}", path.display());
            state.cab_path = path.display().to_string();
            state.form_error = None;
            match path.parent() {
                Some(dir) => Task::done(Message::CabDirUsed(dir.to_path_buf())),
                None => Task::none(),
            }
        }

        InstallMessage::CabChosen(None) => {
            debug!("package selection cancelled");
            Task::none()
        }

        InstallMessage::CabPathEdited(path) => {
            state.cab_path = path;
            state.form_error = None;
            Task::none()
        }

        InstallMessage::SetDeleteAfter(value) => {
            state.delete_after = value;
            Task::none()
        }

        InstallMessage::Confirm => match build_install_request(state) {
            Ok(request) => {
                info!(
                    "installing {} to {}",
                    request.cab_path.display(),
                    request.location
                );
                state.form_error = None;
                state.active_install = Some(InstallSummary {
                    package: request
                        .cab_path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| request.cab_path.display().to_string()),
                    destination: state
                        .selected_storage
                        .and_then(|i| state.storage.get(i))
                        .map(|entry| entry.name.clone())
                        .unwrap_or_default(),
                });
                state.phase = InstallPhase::Installing(0);

                let run = Task::sip(
                    phone::install_stream(Arc::clone(phone), request.clone()),
                    |percent| Message::Install(InstallMessage::CopyProgress(percent)),
                    |result| match result {
                        Ok(()) => Message::Install(InstallMessage::InstallCompleted),
                        Err(e) => Message::Install(InstallMessage::InstallFailed(e.to_string())),
                    },
                );
                let remember = Task::done(Message::DeleteDefaultChanged(request.delete_after));
                Task::batch(vec![remember, run])
            }
            Err(e) => {
                warn!("install rejected: {e}");
                state.form_error = Some(e.to_string());
                Task::none()
            }
        },

        InstallMessage::CopyProgress(percent) => {
            debug!("copy progress {percent}%");
            if let InstallPhase::Installing(ref mut current) = state.phase {
                *current = percent;
            }
            Task::none()
        }

        InstallMessage::InstallCompleted => {
            info!("installation finished");
            state.phase = InstallPhase::Completion(Ok(()));
            Task::none()
        }

        InstallMessage::InstallFailed(reason) => {
            error!("installation failed: {reason}");
            state.phase = InstallPhase::Completion(Err(reason));
            Task::none()
        }

        InstallMessage::InstallAnother => Task::done(Message::Install(InstallMessage::Activate)),

        InstallMessage::Cancel => {
            // The form keeps its contents until the next activation
            debug!("install workflow dismissed");
            Task::done(Message::BackToOverview)
        }
    }
}

/// Validates the form and assembles the request handed to the communicator.
pub fn build_install_request(state: &InstallState) -> Result<InstallRequest, FormError> {
    let entry = state
        .selected_storage
        .and_then(|index| state.storage.get(index))
        .ok_or(FormError::NoSelection)?;

    let path = state.cab_path.trim();
    if path.is_empty() {
        return Err(FormError::NoPackage);
    }

    Ok(InstallRequest {
        cab_path: PathBuf::from(path),
        location: entry.location.clone(),
        delete_after: state.delete_after,
    })
}
