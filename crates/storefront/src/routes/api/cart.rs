//! Cart API handlers.
//!
//! Every successful mutation sets `HX-Trigger: cart-updated` so open pages
//! can refresh their cart badge.

use axum::{
    Json,
    extract::State,
    response::{AppendHeaders, IntoResponse},
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::{ApiJson, ApiQuery, RequiredFields};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::CartSummary;
use crate::routes::CART_UPDATED_EVENT;
use crate::services::SetQuantityOutcome;
use crate::state::AppState;

/// Body of `POST /api/cart`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AddToCartRequest {
    pub book_id: Option<String>,
    /// Defaults to one copy.
    pub quantity: Option<i64>,
}

/// Body of `PUT /api/cart`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCartRequest {
    pub cart_item_id: Option<String>,
    pub quantity: Option<i64>,
}

/// Query for `DELETE /api/cart`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCartQuery {
    pub cart_item_id: Option<String>,
    #[serde(default)]
    pub clear: bool,
}

fn cart_updated() -> AppendHeaders<[(&'static str, &'static str); 1]> {
    AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)])
}

/// `GET /api/cart`
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartSummary>> {
    Ok(Json(state.cart().summary().await?))
}

/// `POST /api/cart`
#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let mut fields = RequiredFields::default();
    let Some(book_id) = fields.check("bookId", body.book_id) else {
        return Err(fields.into_error());
    };
    let quantity = body.quantity.unwrap_or(1);

    let item = state.cart().add_or_merge(&book_id, quantity).await?;
    add_breadcrumb("cart", "Added to cart", Some(&[("book_id", book_id.as_str())]));

    Ok((
        cart_updated(),
        Json(json!({ "message": "Item added to cart", "item": item })),
    ))
}

/// `PUT /api/cart`
#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateCartRequest>,
) -> Result<impl IntoResponse> {
    let mut fields = RequiredFields::default();
    let cart_item_id = fields.check("cartItemId", body.cart_item_id);
    let quantity = fields.check("quantity", body.quantity);
    let (Some(cart_item_id), Some(quantity)) = (cart_item_id, quantity) else {
        return Err(fields.into_error());
    };

    let body = match state.cart().set_quantity(&cart_item_id, quantity).await? {
        SetQuantityOutcome::Updated(item) => {
            json!({ "message": "Cart item updated", "item": item })
        }
        SetQuantityOutcome::Removed => {
            json!({ "message": "Item removed from cart", "id": cart_item_id })
        }
        SetQuantityOutcome::NotFound => {
            return Err(AppError::NotFound("Cart item".to_string()));
        }
    };

    Ok((cart_updated(), Json(body)))
}

/// `DELETE /api/cart?cartItemId=` or `DELETE /api/cart?clear=true`
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DeleteCartQuery>,
) -> Result<impl IntoResponse> {
    if query.clear {
        let deleted = state.cart().clear().await?;
        return Ok((
            cart_updated(),
            Json(json!({ "message": "Cart cleared", "deletedCount": deleted })),
        ));
    }

    let Some(cart_item_id) = query.cart_item_id else {
        return Err(AppError::BadRequest(
            "Provide cartItemId or clear=true".to_string(),
        ));
    };

    if !state.cart().remove(&cart_item_id).await? {
        return Err(AppError::NotFound("Cart item".to_string()));
    }

    Ok((
        cart_updated(),
        Json(json!({ "message": "Item removed from cart", "id": cart_item_id })),
    ))
}
