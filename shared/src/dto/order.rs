//! Order API DTOs and status machine

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Order lifecycle states
///
/// Orders are immutable except this bounded transition and shipment
/// metadata. The allowed edges are checked by [`OrderStatus::can_transition_to`];
/// anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Whether `next` is a legal successor state
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Processing, Cancelled)
                | (Delivered, Refunded)
                | (Cancelled, Refunded)
        )
    }
}

/// Payment states; pass-through fields owned by the payment gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

/// One snapshotted order line
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    #[validate(length(min = 1))]
    pub product_id: String,
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(length(min = 1))]
    pub product_image: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[validate(range(min = 0.0))]
    pub total: f64,
}

/// Postal address
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub company: Option<String>,
    #[validate(length(min = 1))]
    pub address1: String,
    pub address2: Option<String>,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub postal_code: String,
    #[validate(length(min = 1))]
    pub country: String,
    pub phone: Option<String>,
}

/// Shipping address plus carrier fields
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub address: AddressInput,
    #[validate(length(min = 1))]
    pub method: String,
    #[validate(range(min = 0.0))]
    pub cost: f64,
    pub tracking_number: Option<String>,
}

/// Payment sub-record as submitted at checkout
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInput {
    #[validate(length(min = 1))]
    pub method: String,
    #[serde(default)]
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
}

/// Declared totals; must be arithmetically consistent with the line items
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TotalsInput {
    #[validate(range(min = 0.0))]
    pub subtotal: f64,
    #[validate(range(min = 0.0))]
    pub shipping: f64,
    #[validate(range(min = 0.0))]
    pub tax: f64,
    #[validate(range(min = 0.0))]
    pub discount: f64,
    #[validate(range(min = 0.0))]
    pub total: f64,
}

/// POST /api/orders
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<OrderItemInput>,
    #[validate(nested)]
    pub shipping: ShippingInput,
    #[validate(nested)]
    pub billing: AddressInput,
    #[validate(nested)]
    pub payment: PaymentInput,
    #[validate(nested)]
    pub totals: TotalsInput,
    #[validate(length(max = 10000))]
    pub notes: Option<String>,
}

/// PATCH /api/orders/admin/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
}
