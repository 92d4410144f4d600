use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::HeaderMap;
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse};

use crate::routes::{error_body, AppState};

pub const BOT_TOKEN_HEADER: &str = "X-Bot-Token";

pub(crate) fn token_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(BOT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|token| token == expected)
}

/// Rejects any request that does not carry the configured bot token.
///
/// Wrapped around every `/api/v1` route except the health check.
pub async fn require_bot_token(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, actix_web::Error> {
    let authorized = req
        .app_data::<web::Data<AppState>>()
        .is_some_and(|state| token_matches(req.headers(), &state.bot_token));

    if !authorized {
        tracing::warn!(
            "Rejected {} {} with missing or wrong bot token",
            req.method(),
            req.path()
        );
        let response = HttpResponse::Unauthorized().json(error_body(
            401,
            "Unauthorized",
            format!("missing or invalid {} header", BOT_TOKEN_HEADER),
        ));
        return Ok(req.into_response(response));
    }

    Ok(next.call(req).await?.map_into_boxed_body())
}
