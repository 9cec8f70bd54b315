use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::feedback::{FeedbackCreated, SubmitFeedbackRequest},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_student},
    models::{Order, OrderStatus},
    response::ApiResponse,
};

/// Admit one rating+comment per (student, order, product), for delivered
/// orders only. Write-once: no update or delete path exists.
pub async fn submit(
    pool: &DbPool,
    user: &AuthUser,
    payload: SubmitFeedbackRequest,
) -> AppResult<ApiResponse<FeedbackCreated>> {
    ensure_student(user)?;

    if !(1..=5).contains(&payload.rating) {
        return Err(AppError::Validation(
            "rating must be an integer between 1 and 5".to_string(),
        ));
    }

    let order = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE id = $1 AND customer_id = $2",
    )
    .bind(payload.order_id)
    .bind(user.user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    if order.status.parse::<OrderStatus>() != Ok(OrderStatus::Delivered) {
        return Err(AppError::Validation(
            "feedback is only allowed for delivered orders".to_string(),
        ));
    }

    let in_order: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM order_items WHERE order_id = $1 AND product_id = $2",
    )
    .bind(payload.order_id)
    .bind(payload.product_id)
    .fetch_optional(pool)
    .await?;
    if in_order.is_none() {
        return Err(AppError::NotFound(
            "product is not part of this order".to_string(),
        ));
    }

    // The unique index on (order, product, student) decides races: the loser
    // of a concurrent double-submit gets no row back and reports a conflict.
    let inserted: Option<(Uuid,)> = sqlx::query_as(
        r#"
        INSERT INTO feedback (id, student_id, order_id, product_id, rating, comment)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (order_id, product_id, student_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.order_id)
    .bind(payload.product_id)
    .bind(payload.rating)
    .bind(payload.comment.as_deref())
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some((id,)) => Ok(ApiResponse::with_message(
            "Feedback recorded",
            FeedbackCreated { feedback_id: id },
        )),
        None => Err(AppError::Conflict(
            "feedback already submitted for this product".to_string(),
        )),
    }
}
