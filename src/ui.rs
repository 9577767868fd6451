pub mod application;
pub mod overview;

// Modular workflow modules
pub mod install_workflow;

// Unified message system
pub mod messages;

#[allow(unused_imports)]
pub use application::CabManager;
#[allow(unused_imports)]
pub use install_workflow::{
    view_install_completion, view_install_form, view_install_progress,
};
pub use overview::view_overview;

// Include the logo SVG data
pub const LOGO_SVG: &[u8] = include_bytes!("assets/logo.svg");
