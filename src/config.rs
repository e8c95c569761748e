use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Cliniq";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set
pub fn default_log_filter() -> &'static str {
    "info,cliniq=debug"
}

/// Get the application data directory
/// ~/Cliniq/ on all platforms (user-visible)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Cliniq")
}

/// Get the clinic database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}
