pub mod crypto;
pub mod error;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use paths::PathManager;
pub use settings::{clean_url, AssetTypeExtensions, Credentials, Settings};

/// Load environment variables from .env files.
/// Variables already set are never overwritten, so ./.env is loaded first to
/// take precedence over ~/.env, and the real environment beats both.
/// Call this before `Settings::load` so the `BYNDER_*` overrides are visible.
pub fn load_env_file() {
    dotenv::dotenv().ok();

    if let Some(home) = dirs::home_dir() {
        dotenv::from_path(home.join(".env")).ok();
    }
}
