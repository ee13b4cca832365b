//! Order domain types as the backend serves them.
//!
//! Wire names are the backend's camelCase; the record identity is the
//! Mongo-style `_id` field. Display-payload fields are tolerant of absence
//! so a lean backend response still decodes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use terra_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ShippingMethod};

/// An order as held by the backend.
///
/// The console never mutates this locally: after every successful mutation
/// the whole record is replaced with the backend's canonical copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Backend identity.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// Human-facing order number, immutable.
    pub order_number: String,
    /// Fulfillment axis.
    #[serde(default)]
    pub order_status: OrderStatus,
    /// Payment axis, independent of fulfillment.
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Carrier tracking number, populated once the order ships.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    /// Last payment link dispatched to the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_link: Option<String>,
    /// Order total.
    pub total_amount: Decimal,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Customer contact details.
    pub customer: Customer,
    /// Delivery details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingAddress>,
    /// How the customer chose to pay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

/// A purchased line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Delivery address and method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<ShippingMethod>,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}
