// Public API - what other modules can use
pub use handlers::{create_player, list_players};
pub use secret::validate_admin_secret;

// Internal modules
mod handlers;
mod secret;
