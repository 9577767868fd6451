// Public library interface for synce-cab-manager
//
// This module exposes the device communication layer as a library
// that can be used outside the GUI application.

// Re-export modules that should be available to users of the library
pub mod models;
pub mod phone;
pub mod utils;
