//! Order Model
//!
//! Orders are immutable once created, except the bounded status transition
//! and shipment metadata (tracking number, shipped/delivered stamps).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::dto::order::{
    AddressInput, CreateOrderRequest, OrderItemInput, PaymentInput, ShippingInput, TotalsInput,
};
use shared::{OrderStatus, PaymentStatus};
use surrealdb::RecordId;

use super::serde_helpers;

/// Snapshotted order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub price: f64,
    pub quantity: u32,
    pub total: f64,
}

impl From<OrderItemInput> for OrderItem {
    fn from(input: OrderItemInput) -> Self {
        Self {
            product_id: input.product_id,
            product_name: input.product_name,
            product_image: input.product_image,
            price: input.price,
            quantity: input.quantity,
            total: input.total,
        }
    }
}

/// Postal address snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
}

impl From<AddressInput> for Address {
    fn from(input: AddressInput) -> Self {
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            company: input.company,
            address1: input.address1,
            address2: input.address2,
            city: input.city,
            state: input.state,
            postal_code: input.postal_code,
            country: input.country,
            phone: input.phone,
        }
    }
}

/// Shipping address plus carrier fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    #[serde(flatten)]
    pub address: Address,
    pub method: String,
    pub cost: f64,
    pub tracking_number: Option<String>,
}

impl From<ShippingInput> for ShippingInfo {
    fn from(input: ShippingInput) -> Self {
        Self {
            address: input.address.into(),
            method: input.method,
            cost: input.cost,
            tracking_number: input.tracking_number,
        }
    }
}

/// Payment sub-record; gateway-owned pass-through fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub method: String,
    #[serde(default)]
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub stripe_payment_intent_id: Option<String>,
    pub stripe_checkout_session_id: Option<String>,
}

impl From<PaymentInput> for PaymentInfo {
    fn from(input: PaymentInput) -> Self {
        Self {
            method: input.method,
            status: input.status,
            transaction_id: input.transaction_id,
            paid_at: None,
            stripe_payment_intent_id: input.stripe_payment_intent_id,
            stripe_checkout_session_id: input.stripe_checkout_session_id,
        }
    }
}

/// Order totals record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
}

impl From<TotalsInput> for Totals {
    fn from(input: TotalsInput) -> Self {
        Self {
            subtotal: input.subtotal,
            shipping: input.shipping,
            tax: input.tax,
            discount: input.discount,
            total: input.total,
        }
    }
}

/// Order record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub order_number: String,
    /// Owning identity; None for guest checkout
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub shipping: ShippingInfo,
    pub billing: Address,
    pub payment: PaymentInfo,
    pub totals: Totals,
    pub notes: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot a validated checkout payload into a new pending order
    pub fn from_request(
        request: CreateOrderRequest,
        order_number: String,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            order_number,
            user_id,
            status: OrderStatus::Pending,
            items: request.items.into_iter().map(Into::into).collect(),
            shipping: request.shipping.into(),
            billing: request.billing.into(),
            payment: request.payment.into(),
            totals: request.totals.into(),
            notes: request.notes,
            shipped_at: None,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record id as "order:key" string; empty before the record is stored
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|t| t.to_string()).unwrap_or_default()
    }
}
