use rand::RngCore;

use monitor_app::AppState;

/// Header carrying the per-process API token.
pub const TOKEN_HEADER: &str = "x-monitor-token";

#[derive(Clone)]
pub struct HttpState {
    pub app: AppState,
    pub api_token: String,
}

impl HttpState {
    pub fn new(app: AppState, api_token: String) -> Self {
        Self { app, api_token }
    }
}

pub fn generate_api_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}
