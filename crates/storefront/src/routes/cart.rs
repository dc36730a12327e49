//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every successful mutation responds with `HX-Trigger: cart-updated` so the
//! header badge refreshes itself.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::{CartSummary, CartSummaryLine};
use crate::routes::CART_UPDATED_EVENT;
use crate::services::SetQuantityOutcome;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    /// `false` once the book has left the catalog.
    pub available: bool,
}

impl From<&CartSummaryLine> for CartItemView {
    fn from(entry: &CartSummaryLine) -> Self {
        let book = entry.book.as_ref();
        Self {
            id: entry.line.id.to_string(),
            book_id: entry.line.book_id.to_string(),
            title: book.map_or_else(
                || "No longer available".to_string(),
                |b| b.details.title.clone(),
            ),
            author: book.map(|b| b.details.author.clone()).unwrap_or_default(),
            image_url: book.map(|b| b.details.image_url.clone()),
            quantity: entry.line.quantity.as_u32(),
            price: book.map_or_else(String::new, |b| b.details.price.display()),
            line_price: entry.line_total.display(),
            available: book.is_some(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&CartSummary> for CartView {
    fn from(summary: &CartSummary) -> Self {
        Self {
            items: summary.lines.iter().map(CartItemView::from).collect(),
            subtotal: summary.subtotal.display(),
            item_count: summary.item_count,
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub book_id: String,
    pub quantity: Option<i64>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

fn cart_updated() -> AppendHeaders<[(&'static str, &'static str); 1]> {
    AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)])
}

/// Render the current cart as the items fragment.
async fn items_fragment(state: &AppState) -> Result<CartItemsTemplate> {
    let summary = state.cart().summary().await?;
    Ok(CartItemsTemplate {
        cart: CartView::from(&summary),
    })
}

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<CartShowTemplate> {
    let summary = state.cart().summary().await?;
    Ok(CartShowTemplate {
        cart: CartView::from(&summary),
    })
}

/// Add item to cart (HTMX).
///
/// Returns the updated count badge.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let quantity = form.quantity.unwrap_or(1);
    state.cart().add_or_merge(&form.book_id, quantity).await?;
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("book_id", form.book_id.as_str())]),
    );

    let count = state.cart().item_count().await?;
    Ok((cart_updated(), CartCountTemplate { count }).into_response())
}

/// Update cart item quantity (HTMX). Zero removes the line.
///
/// An unknown line changes nothing and fires no trigger.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let outcome = state
        .cart()
        .set_quantity(&form.line_id, form.quantity)
        .await?;
    let fragment = items_fragment(&state).await?;

    match outcome {
        SetQuantityOutcome::Updated(_) | SetQuantityOutcome::Removed => {
            Ok((cart_updated(), fragment).into_response())
        }
        SetQuantityOutcome::NotFound => Ok(fragment.into_response()),
    }
}

/// Remove item from cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let removed = state.cart().remove(&form.line_id).await?;
    let fragment = items_fragment(&state).await?;

    if removed {
        Ok((cart_updated(), fragment).into_response())
    } else {
        Ok(fragment.into_response())
    }
}

/// Empty the cart (HTMX).
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Response> {
    state.cart().clear().await?;
    let fragment = items_fragment(&state).await?;
    Ok((cart_updated(), fragment).into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Result<CartCountTemplate> {
    let count = state.cart().item_count().await?;
    Ok(CartCountTemplate { count })
}
