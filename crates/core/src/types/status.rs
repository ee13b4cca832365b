//! Status and role enums with their display metadata.
//!
//! Every axis the backend exposes as a free-form string is an exhaustive
//! enum here, with a total `label()` mapping for display. A new backend
//! status value fails deserialization (and a new variant fails to compile
//! until every `match` handles it) instead of silently falling through a
//! string map.

use serde::{Deserialize, Serialize};

/// Order fulfillment status (the `orderStatus` wire field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, not yet picked up by an operator.
    #[default]
    New,
    /// An operator is assembling the order.
    Processing,
    /// Handed to the carrier; customer may have a tracking number.
    Shipped,
    /// Confirmed received.
    Delivered,
    /// Cancelled by operator or customer.
    Cancelled,
}

impl OrderStatus {
    /// Human-readable label for badges and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "new"),
            Self::Processing => write!(f, "processing"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Order payment status, independent of the fulfillment axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting payment.
    #[default]
    Pending,
    /// Payment confirmed.
    Paid,
    /// Payment attempt failed. Set by the backend only.
    Failed,
    /// Payment returned to the customer.
    Refunded,
}

impl PaymentStatus {
    /// Human-readable label for badges and CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Failed => "Failed",
            Self::Refunded => "Refunded",
        }
    }

    /// Whether an operator may request this value.
    ///
    /// `failed` is a terminal state the backend reaches on its own; the
    /// console never submits it.
    #[must_use]
    pub const fn is_operator_settable(self) -> bool {
        !matches!(self, Self::Failed)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(format!("invalid payment status: {s}")),
        }
    }
}

/// Admin role attached to the authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access including admin account management.
    SuperAdmin,
    /// Full access to store management features.
    Admin,
    /// Read-only access to store data.
    Viewer,
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

/// How the customer chose to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash handed to the courier on delivery.
    CashCourier,
    /// Instant bank transfer via a payment link.
    Sbp,
}

impl PaymentMethod {
    /// Human-readable label for CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CashCourier => "Cash to courier",
            Self::Sbp => "Bank transfer (SBP)",
        }
    }
}

/// How the order is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Store's own courier within the city.
    OwnCourier,
    /// CDEK pickup point.
    CdekPvz,
    /// CDEK courier to the door.
    CdekCourier,
    /// National postal service.
    Post,
}

impl ShippingMethod {
    /// Human-readable label for CLI output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OwnCourier => "Own courier",
            Self::CdekPvz => "CDEK pickup point",
            Self::CdekCourier => "CDEK courier",
            Self::Post => "Postal service",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Processing).expect("serialize"),
            "\"processing\""
        );
        let status: OrderStatus = serde_json::from_str("\"shipped\"").expect("deserialize");
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_order_status_parse_roundtrip() {
        for status in [
            OrderStatus::New,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            let parsed: OrderStatus = status.to_string().parse().expect("parse");
            assert_eq!(parsed, status);
        }
        assert!("unknown".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_payment_status_operator_settable() {
        assert!(PaymentStatus::Pending.is_operator_settable());
        assert!(PaymentStatus::Paid.is_operator_settable());
        assert!(PaymentStatus::Refunded.is_operator_settable());
        assert!(!PaymentStatus::Failed.is_operator_settable());
    }

    #[test]
    fn test_payment_status_labels_total() {
        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert!(!status.label().is_empty());
        }
    }

    #[test]
    fn test_admin_role_parse() {
        let role: AdminRole = "admin".parse().expect("parse");
        assert_eq!(role, AdminRole::Admin);
        assert!("owner".parse::<AdminRole>().is_err());
    }

    #[test]
    fn test_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashCourier).expect("serialize"),
            "\"cash_courier\""
        );
        assert_eq!(
            serde_json::to_string(&ShippingMethod::CdekPvz).expect("serialize"),
            "\"cdek_pvz\""
        );
    }
}
