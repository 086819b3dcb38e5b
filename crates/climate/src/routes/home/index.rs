use std::sync::Arc;

use axum::{extract::State, response::Html};

use crate::{templates::index_page, AppState};

/// Route listing (GET /)
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(index_page(&state.remote_url).into_string())
}
