/// Startup configuration, read once from the environment (a `.env` file is
/// honored in development). The shell can still re-point the sidecar at
/// runtime with `backend.select`.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Base URL of the REST backend, e.g. `http://127.0.0.1:8000/api`.
    pub backend_url: Option<String>,
    /// Start against the bundled mock data instead of a live backend.
    pub mock: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let backend_url = std::env::var("SCHOOLDESK_BACKEND_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let mock = std::env::var("SCHOOLDESK_MOCK")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        Config { backend_url, mock }
    }
}
