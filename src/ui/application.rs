use crate::models::{AppScreen, DeviceInfo};
use crate::phone::{PhoneCommunicator, PhoneError, SyncePhone};
use crate::ui::install_workflow::{self, InstallMessage, InstallPhase, InstallState};
use crate::ui::messages::Message;
use crate::ui::overview;
use crate::utils::settings::{Settings, SettingsStore};
use iced::{Element, Task};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct CabManager {
    pub screen: AppScreen,
    pub install: InstallState,

    // Shared resources
    pub phone: Arc<dyn PhoneCommunicator>,
    pub device: Option<DeviceInfo>,
    pub probing_device: bool,
    pub settings: Settings,
    settings_store: Option<SettingsStore>,
}

impl CabManager {
    pub fn new() -> (Self, Task<Message>) {
        let settings_store = match SettingsStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("settings will not be persisted: {e}");
                None
            }
        };
        let settings = settings_store
            .as_ref()
            .map(|store| store.load())
            .unwrap_or_default();

        let app = Self {
            screen: AppScreen::Overview,
            install: InstallState::new(),
            phone: Arc::new(SyncePhone::new()),
            device: None,
            probing_device: false,
            settings,
            settings_store,
        };

        (app, Task::done(Message::ProbeDevice))
    }

    pub fn title(&self) -> String {
        format!("SynCE CAB Manager v{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenInstaller => {
                self.screen = AppScreen::Install;
                Task::done(Message::Install(InstallMessage::Activate))
            }

            Message::BackToOverview => {
                self.screen = AppScreen::Overview;
                Task::done(Message::ProbeDevice)
            }

            Message::Exit => {
                std::process::exit(0);
            }

            Message::ProbeDevice => {
                self.probing_device = true;
                let phone = Arc::clone(&self.phone);
                Task::perform(
                    async move {
                        match phone.device_info().await {
                            Ok(info) => Some(info),
                            Err(PhoneError::NotConnected) => None,
                            Err(e) => {
                                warn!("device probe failed: {e}");
                                None
                            }
                        }
                    },
                    Message::DeviceProbed,
                )
            }

            Message::DeviceProbed(device) => {
                self.probing_device = false;
                match &device {
                    Some(info) => info!("connected to {} at {}", info.name, info.address),
                    None => debug!("no device present"),
                }
                self.device = device;
                Task::none()
            }

            Message::CabDirUsed(dir) => {
                self.settings.last_cab_dir = Some(dir);
                self.persist_settings();
                Task::none()
            }

            Message::DeleteDefaultChanged(value) => {
                if self.settings.delete_cab_default != value {
                    self.settings.delete_cab_default = value;
                    self.persist_settings();
                }
                Task::none()
            }

            // Delegate install workflow messages
            Message::Install(install_msg) => install_workflow::handler::handle_message(
                &mut self.install,
                &self.phone,
                &self.settings,
                install_msg,
            ),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        match self.screen {
            AppScreen::Overview => {
                overview::view_overview(self.device.as_ref(), self.probing_device)
            }
            AppScreen::Install => match &self.install.phase {
                InstallPhase::Form => install_workflow::view_install_form(&self.install),
                InstallPhase::Installing(_) => {
                    install_workflow::view_install_progress(&self.install)
                }
                InstallPhase::Completion(_) => {
                    install_workflow::view_install_completion(&self.install)
                }
            },
        }
    }

    fn persist_settings(&self) {
        if let Some(store) = &self.settings_store {
            if let Err(e) = store.save(&self.settings) {
                warn!("could not save settings: {e}");
            }
        }
    }
}
