// src/state.rs

use axum::extract::FromRef;

use crate::{config::Config, repository::DynRepository};

#[derive(Clone)]
pub struct AppState {
    pub repo: DynRepository,
    pub config: Config,
}

impl FromRef<AppState> for DynRepository {
    fn from_ref(state: &AppState) -> Self {
        state.repo.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
