//! Review route groups.

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

pub fn inspection_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/inspections", API_PREFIX),
            get(handlers::inspections::list_inspections),
        )
        .route(
            &format!("{}/inspections/{{id}}", API_PREFIX),
            get(handlers::inspections::get_inspection),
        )
        .route(
            &format!("{}/inspections/{{id}}/report", API_PREFIX),
            get(handlers::reports::get_report),
        )
        .with_state(state)
}

pub fn review_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/inspections/{{id}}/decision", API_PREFIX),
            post(handlers::decisions::submit_decision),
        )
        .route(
            &format!("{}/damages/{{id}}/approval", API_PREFIX),
            put(handlers::damages::set_damage_approval),
        )
        .with_state(state)
}
