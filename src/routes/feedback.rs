use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::feedback::{FeedbackCreated, SubmitFeedbackRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::feedback_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(submit_feedback))
}

#[utoipa::path(
    post,
    path = "/feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 200, description = "Record feedback for a delivered order's product", body = ApiResponse<FeedbackCreated>),
        (status = 400, description = "Rating out of range or order not delivered"),
        (status = 404, description = "Order or product not found"),
        (status = 409, description = "Feedback already submitted"),
    ),
    security(("bearer_auth" = [])),
    tag = "Feedback"
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> AppResult<Json<ApiResponse<FeedbackCreated>>> {
    let resp = feedback_service::submit(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}
