use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::bot::ReplyBuffer;
use crate::models::{EventResponse, InboundEventRequest};
use crate::routes::{error_body, AppState};

/// Configure the transport webhook
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(receive_event));
}

/// Inbound event webhook
///
/// POST /api/v1/events
///
/// Request body:
/// ```json
/// {
///   "userId": 12345,
///   "username": "ann",
///   "displayName": "Ann",
///   "event": { "type": "text", "text": "/start" }
/// }
/// ```
///
/// Responds with the replies the transport should deliver, in order.
/// The bot token is checked by the scope middleware.
async fn receive_event(
    state: web::Data<AppState>,
    req: web::Json<InboundEventRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for inbound event: {:?}", errors);
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    let user_id = req.user_id;
    let buffer = ReplyBuffer::new();
    state
        .dispatcher
        .handle(req.into_inner().into(), &buffer)
        .await;

    let replies = buffer.into_replies();
    tracing::debug!("Event from user {} produced {} replies", user_id, replies.len());

    HttpResponse::Ok().json(EventResponse { replies })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnboardingSettings;
    use crate::core::Matchmaker;
    use crate::routes::auth::BOT_TOKEN_HEADER;
    use crate::routes::configure_routes;
    use crate::services::MemoryStore;
    use actix_web::{test, App};
    use std::sync::Arc;

    fn app_state() -> AppState {
        let matchmaker = Matchmaker::new(Arc::new(MemoryStore::new()), &OnboardingSettings::default());
        AppState::new(matchmaker, "secret")
    }

    #[actix_web::test]
    async fn test_event_requires_token() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/events")
            .set_json(serde_json::json!({
                "userId": 1,
                "displayName": "Ann",
                "event": {"type": "text", "text": "/start"}
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_start_returns_welcome() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/v1/events")
            .insert_header((BOT_TOKEN_HEADER, "secret"))
            .set_json(serde_json::json!({
                "userId": 1,
                "displayName": "Ann",
                "event": {"type": "text", "text": "/start"}
            }))
            .to_request();

        let body: EventResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.replies.len(), 1);
        assert_eq!(body.replies[0].user_id, 1);
        assert!(body.replies[0].text.contains("Ann"));
        assert!(!body.replies[0].choices.is_empty());
    }
}
