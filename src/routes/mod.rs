// Route exports
pub mod auth;
pub mod events;
pub mod matches;
pub mod profiles;

use actix_web::{middleware, web, HttpResponse};
use std::sync::Arc;

use crate::bot::Dispatcher;
use crate::core::{CoreError, Matchmaker};
use crate::models::ErrorResponse;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub bot_token: Arc<str>,
}

impl AppState {
    pub fn new(matchmaker: Matchmaker, bot_token: impl Into<Arc<str>>) -> Self {
        Self {
            dispatcher: Dispatcher::new(matchmaker),
            bot_token: bot_token.into(),
        }
    }

    pub fn matchmaker(&self) -> &Matchmaker {
        self.dispatcher.matchmaker()
    }
}

/// Everything under `/api/v1` needs the bot token, except the health check
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(profiles::configure_health)
            .service(
                web::scope("")
                    .wrap(middleware::from_fn(auth::require_bot_token))
                    .configure(events::configure)
                    .configure(profiles::configure)
                    .configure(matches::configure),
            ),
    );
}

pub(crate) fn error_body(status: u16, error: &str, message: impl Into<String>) -> ErrorResponse {
    ErrorResponse {
        error: error.to_string(),
        message: message.into(),
        status_code: status,
    }
}

/// Map the core's failure classes onto HTTP statuses
pub(crate) fn core_error_response(err: CoreError) -> HttpResponse {
    match err {
        CoreError::Validation { step, source } => HttpResponse::BadRequest()
            .json(error_body(400, "Validation failed", format!("{}: {}", step, source))),
        CoreError::Conflict(msg) => HttpResponse::Conflict().json(error_body(409, "Conflict", msg)),
        CoreError::NotFound(msg) => HttpResponse::NotFound().json(error_body(404, "Not found", msg)),
        CoreError::Storage(msg) => {
            tracing::error!("Storage failure: {}", msg);
            HttpResponse::ServiceUnavailable().json(error_body(
                503,
                "Storage unavailable",
                "The operation could not be completed, please retry",
            ))
        }
    }
}
