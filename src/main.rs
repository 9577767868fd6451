mod models;
mod phone;
mod style;
mod ui;
mod utils;
mod version;

use tracing::info;

pub fn main() -> iced::Result {
    let _log_guard = utils::logging::init();
    info!("Starting SynCE CAB Manager v{}", version::VERSION);

    // Start the application and probe for a connected handset
    iced::application(
        ui::application::CabManager::new,
        ui::application::CabManager::update,
        ui::application::CabManager::view,
    )
    .title(ui::application::CabManager::title)
    .window_size(iced::Size::new(560f32, 720f32))
    .theme(|_: &ui::application::CabManager| style::custom_theme())
    .centered()
    .run()
}
