use actix_web::{web, HttpResponse, Responder};

use crate::models::{HealthResponse, UserId};
use crate::routes::{core_error_response, error_body, AppState};

/// Configure the unauthenticated health check
pub fn configure_health(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}

/// Configure profile read/delete routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/profiles/{user_id}", web::get().to(get_active_profile))
        .route("/profiles/{user_id}", web::delete().to(deactivate_profile));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let healthy = state.matchmaker().health_check().await;

    let status = if healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/profiles/{userId}
async fn get_active_profile(state: web::Data<AppState>, path: web::Path<UserId>) -> impl Responder {
    let user_id = path.into_inner();

    match state.matchmaker().get_active_profile(user_id).await {
        Ok(Some(profile)) => HttpResponse::Ok().json(profile),
        Ok(None) => HttpResponse::NotFound().json(error_body(
            404,
            "Not found",
            format!("no active profile for user {}", user_id),
        )),
        Err(e) => core_error_response(e),
    }
}

/// DELETE /api/v1/profiles/{userId}
///
/// Soft delete: the profile stays stored with `isActive = false`.
async fn deactivate_profile(state: web::Data<AppState>, path: web::Path<UserId>) -> impl Responder {
    match state.matchmaker().deactivate_profile(path.into_inner()).await {
        Ok(profile) => HttpResponse::Ok().json(profile),
        Err(e) => core_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnboardingSettings;
    use crate::core::Matchmaker;
    use crate::services::MemoryStore;
    use actix_web::{test, App};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_missing_profile_is_404() {
        let matchmaker = Matchmaker::new(Arc::new(MemoryStore::new()), &OnboardingSettings::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(matchmaker, "secret")))
                .configure(configure_health)
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/profiles/5").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::delete().uri("/profiles/5").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);

        let req = test::TestRequest::get().uri("/health").to_request();
        let health: HealthResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(health.status, "healthy");
    }
}
