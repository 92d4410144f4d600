use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::models::{CandidateResponse, MatchEntry, MatchesResponse, RecordInterestRequest, UserId};
use crate::routes::{core_error_response, error_body, AppState};

/// Configure candidate, interest and match routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/candidates/{user_id}", web::get().to(select_candidate))
        .route("/interests", web::post().to(record_interest))
        .route("/matches/{user_id}", web::get().to(list_matches));
}

/// GET /api/v1/candidates/{userId}
///
/// `{"candidate": null}` once everything eligible has been rated.
async fn select_candidate(state: web::Data<AppState>, path: web::Path<UserId>) -> impl Responder {
    let user_id = path.into_inner();

    match state.matchmaker().select_candidate(user_id).await {
        Ok(candidate) => {
            if candidate.is_none() {
                tracing::debug!("No candidates left for user {}", user_id);
            }
            HttpResponse::Ok().json(CandidateResponse { candidate })
        }
        Err(e) => core_error_response(e),
    }
}

/// Record interest endpoint
///
/// POST /api/v1/interests
///
/// Request body:
/// ```json
/// {
///   "userId": 12345,
///   "profileId": "uuid",
///   "liked": true
/// }
/// ```
async fn record_interest(
    state: web::Data<AppState>,
    req: web::Json<RecordInterestRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(error_body(400, "Validation failed", errors.to_string()));
    }

    match state
        .matchmaker()
        .record_interest(req.user_id, req.profile_id, req.liked)
        .await
    {
        Ok(outcome) => HttpResponse::Ok().json(outcome),
        Err(e) => core_error_response(e),
    }
}

/// GET /api/v1/matches/{userId}
async fn list_matches(state: web::Data<AppState>, path: web::Path<UserId>) -> impl Responder {
    let user_id = path.into_inner();

    match state.matchmaker().list_matches(user_id).await {
        Ok(matches) => {
            let matches: Vec<MatchEntry> = matches.collect();
            tracing::info!("Returning {} matches for user {}", matches.len(), user_id);
            HttpResponse::Ok().json(MatchesResponse {
                count: matches.len(),
                matches,
            })
        }
        Err(e) => core_error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OnboardingSettings;
    use crate::core::Matchmaker;
    use crate::models::{Gender, MatchOutcome, NewProfile, User};
    use crate::services::{MemoryStore, Store};
    use actix_web::{test, App};
    use std::sync::Arc;

    async fn seeded_store() -> (Arc<MemoryStore>, uuid::Uuid, uuid::Uuid) {
        let store = Arc::new(MemoryStore::new());
        let mut ids = Vec::new();
        for id in [1, 2] {
            store
                .upsert_user(&User {
                    user_id: id,
                    handle: Some(format!("user{}", id)),
                    display_name: format!("User {}", id),
                })
                .await
                .unwrap();
            let profile = store
                .create_profile(NewProfile {
                    user_id: id,
                    display_name: format!("User {}", id),
                    photo_ref: "photo".to_string(),
                    gender: Gender::Female,
                    faculty: None,
                    age: 20,
                    bio: String::new(),
                })
                .await
                .unwrap();
            ids.push(profile.id);
        }
        (store, ids[0], ids[1])
    }

    #[actix_web::test]
    async fn test_mutual_likes_over_http() {
        let (store, first, second) = seeded_store().await;
        let matchmaker = Matchmaker::new(store, &OnboardingSettings::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(matchmaker, "secret")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/interests")
            .set_json(serde_json::json!({"userId": 1, "profileId": second, "liked": true}))
            .to_request();
        let outcome: MatchOutcome = test::call_and_read_body_json(&app, req).await;
        assert_eq!(outcome, MatchOutcome::LikeRecorded);

        let req = test::TestRequest::post()
            .uri("/interests")
            .set_json(serde_json::json!({"userId": 2, "profileId": first, "liked": true}))
            .to_request();
        let outcome: MatchOutcome = test::call_and_read_body_json(&app, req).await;
        assert!(outcome.is_match());

        let req = test::TestRequest::get().uri("/matches/1").to_request();
        let body: MatchesResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.count, 1);
        assert_eq!(body.matches[0].user.user_id, 2);

        let req = test::TestRequest::get().uri("/candidates/1").to_request();
        let body: CandidateResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.candidate.is_none());
    }

    #[actix_web::test]
    async fn test_rating_unknown_profile_is_404() {
        let (store, _, _) = seeded_store().await;
        let matchmaker = Matchmaker::new(store, &OnboardingSettings::default());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(matchmaker, "secret")))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/interests")
            .set_json(serde_json::json!({"userId": 1, "profileId": uuid::Uuid::new_v4(), "liked": true}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 404);
    }
}
