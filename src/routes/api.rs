// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityForm, ChallengeForm};
use crate::routes::views::{
    ActivitiesResponse, ChallengesResponse, DashboardResponse, ParticipationsResponse,
    UserResponse,
};
use crate::time_utils::utc_date;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

/// API routes (require a signed-in session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/activities", get(get_activities).post(create_activity))
        .route("/api/challenges", get(get_challenges).post(create_challenge))
        .route("/api/challenges/{id}/join", post(join_challenge))
        .route("/api/participations", get(get_participations))
}

// ─── User Profile ────────────────────────────────────────────

async fn get_me(Extension(auth): Extension<AuthUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&auth.user))
}

/// Profile, activity totals and the user's active challenges.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let session = &auth.session;
    let user_id = auth.user.id.as_str();

    let (activities, challenges, participations) = tokio::join!(
        state.data.fetch_activities(session, user_id),
        state.data.fetch_challenges(session),
        state.data.fetch_participations(session, user_id),
    );

    Ok(Json(DashboardResponse::new(
        &auth.user,
        &activities?,
        &challenges?,
        &participations?,
        Utc::now(),
        state.is_demo_mode(),
    )))
}

// ─── Activities ──────────────────────────────────────────────

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ActivitiesResponse>> {
    let activities = state
        .data
        .fetch_activities(&auth.session, &auth.user.id)
        .await?;

    Ok(Json(ActivitiesResponse::new(
        activities,
        state.is_demo_mode(),
    )))
}

/// Record an activity and return the updated list.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(form): Json<ActivityForm>,
) -> Result<(StatusCode, Json<ActivitiesResponse>)> {
    form.validate()?;

    let new_activity = form.into_new_activity(utc_date(Utc::now()));
    tracing::debug!(
        user_id = %auth.user.id,
        activity_type = %new_activity.activity_type,
        distance_km = new_activity.distance_km,
        "Adding activity"
    );

    let activities = state
        .data
        .add_activity(&auth.session, &auth.user.id, new_activity)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActivitiesResponse::new(activities, state.is_demo_mode())),
    ))
}

// ─── Challenges ──────────────────────────────────────────────

async fn challenges_response(state: &AppState, auth: &AuthUser) -> Result<ChallengesResponse> {
    let (challenges, participations) = tokio::join!(
        state.data.fetch_challenges(&auth.session),
        state.data.fetch_participations(&auth.session, &auth.user.id),
    );

    Ok(ChallengesResponse::new(
        challenges?,
        &participations?,
        Utc::now(),
        state.is_demo_mode(),
    ))
}

async fn get_challenges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ChallengesResponse>> {
    Ok(Json(challenges_response(&state, &auth).await?))
}

/// Create a challenge and return the updated challenge list.
async fn create_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(form): Json<ChallengeForm>,
) -> Result<(StatusCode, Json<ChallengesResponse>)> {
    form.validate()?;

    let new_challenge = form
        .into_new_challenge(utc_date(Utc::now()))
        .ok_or_else(|| AppError::BadRequest("end_date must not be before start_date".into()))?;
    tracing::debug!(
        user_id = %auth.user.id,
        title = %new_challenge.title,
        "Creating challenge"
    );

    let challenges = state
        .data
        .create_challenge(&auth.session, &auth.user.id, new_challenge)
        .await?;
    let participations = state
        .data
        .fetch_participations(&auth.session, &auth.user.id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ChallengesResponse::new(
            challenges,
            &participations,
            Utc::now(),
            state.is_demo_mode(),
        )),
    ))
}

/// Join a challenge. The challenge id is not checked against the list and
/// repeated joins are accepted.
///
/// The response is built from the participation list the join returned, which
/// includes a locally kept participation when the insert failed.
async fn join_challenge(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(challenge_id): Path<String>,
) -> Result<Json<ChallengesResponse>> {
    let participations = state
        .data
        .join_challenge(&auth.session, &auth.user.id, &challenge_id)
        .await?;
    let challenges = state.data.fetch_challenges(&auth.session).await?;

    Ok(Json(ChallengesResponse::new(
        challenges,
        &participations,
        Utc::now(),
        state.is_demo_mode(),
    )))
}

async fn get_participations(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ParticipationsResponse>> {
    let participations = state
        .data
        .fetch_participations(&auth.session, &auth.user.id)
        .await?;

    Ok(Json(ParticipationsResponse {
        participations,
        demo_mode: state.is_demo_mode(),
    }))
}
