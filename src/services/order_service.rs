use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::orders::{CheckoutRequest, CheckoutResponse, OrderDetail, OrderItemView, OrderList},
    entity::{
        cart_items::{self, Column as CartCol, Entity as CartItems},
        feedback::{Column as FeedbackCol, Entity as Feedback},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        payments::{ActiveModel as PaymentActive, Column as PaymentCol, Entity as Payments, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_student},
    models::{Order, OrderItem, OrderStatus, Payment, PaymentMethod, PaymentStatus},
    response::ApiResponse,
    state::AppState,
};

/// Turn the student's cart into one order (plus paired payment) per vendor.
///
/// The whole sequence runs in one transaction: a failure after some vendor
/// groups have been materialized rolls everything back, so a retry starts
/// from the untouched cart and cannot duplicate orders. Prices and names come
/// from the cart-line snapshots; the live product rows are never consulted.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<CheckoutResponse>> {
    ensure_student(user)?;

    let method = match payload.payment_method.as_deref() {
        None => PaymentMethod::Cash,
        Some(raw) => raw.parse::<PaymentMethod>().map_err(|_| {
            AppError::Validation(format!("unknown payment method: {raw}"))
        })?,
    };

    let txn = state.orm.begin().await?;

    let lines = CartItems::find()
        .filter(CartCol::StudentId.eq(user.user_id))
        .order_by_asc(CartCol::CreatedAt)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Err(AppError::Validation("cart is empty".to_string()));
    }

    let groups = partition_by_vendor(&lines);
    let mut order_ids = Vec::with_capacity(groups.len());

    for (vendor_id, group) in groups {
        let total = order_total(&group);
        let order_id = Uuid::new_v4();

        OrderActive {
            id: Set(order_id),
            vendor_id: Set(vendor_id),
            customer_id: Set(user.user_id),
            total_amount: Set(total),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            shipping_address: Set(payload.shipping_address.clone()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for line in &group {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(line.product_id),
                product_name: Set(line.product_name.clone()),
                unit_price: Set(line.unit_price),
                quantity: Set(line.quantity),
                subtotal: Set(line.unit_price * line.quantity as i64),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }

        PaymentActive {
            order_id: Set(order_id),
            method: Set(method.as_str().to_string()),
            status: Set(PaymentStatus::Pending.as_str().to_string()),
            amount: Set(total),
            transaction_id: Set(payload.transaction_id.clone()),
            completed_at: Set(None),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        order_ids.push(order_id);
    }

    CartItems::delete_many()
        .filter(CartCol::StudentId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(student = %user.user_id, orders = order_ids.len(), "checkout committed");

    Ok(ApiResponse::with_message(
        "Checkout complete",
        CheckoutResponse { order_ids },
    ))
}

/// Orders for the calling student, newest first, with the paired payment and
/// a per-item flag for feedback already submitted.
pub async fn list_orders(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<OrderList>> {
    ensure_student(user)?;

    let orders = Orders::find()
        .filter(OrderCol::CustomerId.eq(user.user_id))
        .order_by_desc(OrderCol::CreatedAt)
        .all(&state.orm)
        .await?;

    if orders.is_empty() {
        return Ok(ApiResponse::success(OrderList { orders: vec![] }));
    }

    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

    let mut items_by_order: BTreeMap<Uuid, Vec<OrderItemModel>> = BTreeMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids.clone()))
        .all(&state.orm)
        .await?
    {
        items_by_order.entry(item.order_id).or_default().push(item);
    }

    let mut payments_by_order: BTreeMap<Uuid, PaymentModel> = BTreeMap::new();
    for payment in Payments::find()
        .filter(PaymentCol::OrderId.is_in(order_ids.clone()))
        .all(&state.orm)
        .await?
    {
        payments_by_order.insert(payment.order_id, payment);
    }

    let reviewed: HashSet<(Uuid, Uuid)> = Feedback::find()
        .filter(FeedbackCol::StudentId.eq(user.user_id))
        .filter(FeedbackCol::OrderId.is_in(order_ids))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|f| (f.order_id, f.product_id))
        .collect();

    let orders = orders
        .into_iter()
        .map(|order| {
            let items = items_by_order
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(|item| {
                    let feedback_submitted = reviewed.contains(&(item.order_id, item.product_id));
                    OrderItemView {
                        item: order_item_from_entity(item),
                        feedback_submitted,
                    }
                })
                .collect();
            let payment = payments_by_order
                .remove(&order.id)
                .map(payment_from_entity);
            OrderDetail {
                order: order_from_entity(order),
                items,
                payment,
            }
        })
        .collect();

    Ok(ApiResponse::success(OrderList { orders }))
}

fn partition_by_vendor(lines: &[cart_items::Model]) -> BTreeMap<Uuid, Vec<&cart_items::Model>> {
    let mut groups: BTreeMap<Uuid, Vec<&cart_items::Model>> = BTreeMap::new();
    for line in lines {
        groups.entry(line.vendor_id).or_default().push(line);
    }
    groups
}

fn order_total(lines: &[&cart_items::Model]) -> i64 {
    lines
        .iter()
        .map(|line| line.unit_price * line.quantity as i64)
        .sum()
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        vendor_id: model.vendor_id,
        customer_id: model.customer_id,
        total_amount: model.total_amount,
        status: model.status,
        shipping_address: model.shipping_address,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

pub(crate) fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        product_name: model.product_name,
        unit_price: model.unit_price,
        quantity: model.quantity,
        subtotal: model.subtotal,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        order_id: model.order_id,
        method: model.method,
        status: model.status,
        amount: model.amount,
        transaction_id: model.transaction_id,
        completed_at: model.completed_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
