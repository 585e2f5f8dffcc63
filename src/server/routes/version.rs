use axum::extract::State;

use crate::server::app::AppState;

/// `/api/version`: the extraction engine's version as plain text
pub async fn version_handler(State(state): State<AppState>) -> String {
    state.facade.version().to_string()
}
