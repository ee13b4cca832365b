//! Order workflow controller.
//!
//! Requests fulfillment/payment status transitions and the customer-facing
//! side effects tied to them (shipment notice, payment-link dispatch), and
//! reconciles the local projection with what the backend actually accepted.
//! Every request goes through the session manager's transport path, so the
//! current credential is always attached and a dead credential force-clears
//! the session no matter which operation tripped over it.

pub mod types;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use terra_core::{OrderId, OrderStatus, PaymentStatus};

use crate::error::ApiError;
use crate::session::SessionManager;

pub use types::{Customer, Order, OrderItem, ShippingAddress};

/// Body of a `PUT /orders/:id/status` request.
///
/// Exactly the fields of the requested transition are present; nothing is
/// carried over from earlier calls or from the stored order.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusUpdateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    order_status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tracking_number: Option<&'a str>,
}

/// Body of a `POST /orders/:id/send-payment-link` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentLinkRequest<'a> {
    payment_link: &'a str,
}

/// Envelope of `GET /orders`.
#[derive(Debug, Deserialize)]
struct OrderListResponse {
    #[serde(default)]
    data: Vec<Order>,
}

/// Envelope of every order mutation response.
#[derive(Debug, Default, Deserialize)]
struct MutationResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Order>,
    #[serde(default)]
    message: Option<String>,
}

/// Result of a fulfillment transition.
#[derive(Debug, Clone)]
pub struct FulfillmentUpdate {
    /// Canonical order record after the transition.
    pub order: Order,
    /// Whether the backend was asked to notify the customer with a tracking
    /// number as part of this transition.
    pub customer_notified: bool,
}

/// Result of a payment-link dispatch.
#[derive(Debug, Clone)]
pub struct PaymentLinkDispatch {
    /// Canonical order record after the dispatch.
    pub order: Order,
    /// Whether a link had already been recorded for this order before this
    /// call (callers word "send" vs "resend" off this).
    pub resent: bool,
}

/// Order workflow controller.
///
/// Owns the client-side projection of the backend's order collection and the
/// currently open detail view. The backend is the only source of truth for
/// whether a transition was accepted; its returned record replaces the local
/// copy wholesale, never a partial patch.
#[derive(Clone)]
pub struct OrderWorkflow {
    inner: Arc<OrderWorkflowInner>,
}

struct OrderWorkflowInner {
    session: SessionManager,
    /// Local projection of the backend order collection.
    orders: RwLock<Vec<Order>>,
    /// Order currently opened for editing, if any.
    open_order: RwLock<Option<OrderId>>,
}

impl OrderWorkflow {
    /// Create a controller issuing its calls through the given session.
    #[must_use]
    pub fn new(session: SessionManager) -> Self {
        Self {
            inner: Arc::new(OrderWorkflowInner {
                session,
                orders: RwLock::new(Vec::new()),
                open_order: RwLock::new(None),
            }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Fetch the backend order collection and replace the local projection.
    ///
    /// Pure read on the backend side; no notification can fire from here.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`], [`ApiError::Unauthorized`] or
    /// [`ApiError::Rejected`] from the transport path; the local projection
    /// is left untouched on failure.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Order>, ApiError> {
        let request = self
            .inner
            .session
            .http()
            .get(self.inner.session.endpoint("orders"));
        let response = self.inner.session.send(request).await?;
        let body: OrderListResponse = response.json().await.map_err(ApiError::from)?;

        *self.inner.orders.write().await = body.data.clone();
        Ok(body.data)
    }

    /// Snapshot of the local projection.
    pub async fn orders(&self) -> Vec<Order> {
        self.inner.orders.read().await.clone()
    }

    /// Local copy of one order.
    pub async fn order(&self, id: &OrderId) -> Option<Order> {
        self.inner
            .orders
            .read()
            .await
            .iter()
            .find(|order| &order.id == id)
            .cloned()
    }

    // =========================================================================
    // Detail view
    // =========================================================================

    /// Mark an order as opened for editing.
    pub async fn open(&self, id: OrderId) {
        *self.inner.open_order.write().await = Some(id);
    }

    /// Close the open detail view, if any.
    pub async fn close(&self) {
        *self.inner.open_order.write().await = None;
    }

    /// Order currently opened for editing.
    pub async fn open_order(&self) -> Option<OrderId> {
        self.inner.open_order.read().await.clone()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Request a fulfillment-status transition.
    ///
    /// The tracking number rides along only when the target status is
    /// `shipped` and the supplied value is non-empty after trimming - the
    /// backend then notifies the customer with it in one message. For any
    /// other target the tracking number is never sent, even if supplied.
    /// Shipping without a tracking number is legal; no tracking notice goes
    /// out then.
    ///
    /// On success the canonical record replaces the local copy and the
    /// detail view for that order closes. On failure local state is
    /// untouched.
    ///
    /// # Errors
    ///
    /// [`ApiError::Transport`], [`ApiError::Unauthorized`],
    /// [`ApiError::Rejected`] (illegal transition per server rules) or
    /// [`ApiError::Response`].
    #[instrument(skip(self), fields(order = %id, status = %status))]
    pub async fn set_fulfillment_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<FulfillmentUpdate, ApiError> {
        let tracking = tracking_to_send(status, tracking_number);

        let body = StatusUpdateRequest {
            order_status: Some(status),
            payment_status: None,
            tracking_number: tracking,
        };
        let request = self
            .inner
            .session
            .http()
            .put(self.inner.session.endpoint(&format!("orders/{id}/status")))
            .json(&body);

        let order = self.accept(request).await?;
        info!(notified = tracking.is_some(), "Fulfillment status updated");
        Ok(FulfillmentUpdate {
            order,
            customer_notified: tracking.is_some(),
        })
    }

    /// Request a payment-status transition.
    ///
    /// `failed` is reserved for the backend and rejected locally without a
    /// network call. The local copy takes whatever value the backend
    /// returns, which may differ from the requested one.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for a non-settable target, otherwise as
    /// [`set_fulfillment_status`](Self::set_fulfillment_status).
    #[instrument(skip(self), fields(order = %id, status = %status))]
    pub async fn set_payment_status(
        &self,
        id: &OrderId,
        status: PaymentStatus,
    ) -> Result<Order, ApiError> {
        if !status.is_operator_settable() {
            return Err(ApiError::Validation(format!(
                "payment status '{status}' cannot be requested from the console"
            )));
        }

        let body = StatusUpdateRequest {
            order_status: None,
            payment_status: Some(status),
            tracking_number: None,
        };
        let request = self
            .inner
            .session
            .http()
            .put(self.inner.session.endpoint(&format!("orders/{id}/status")))
            .json(&body);

        let order = self.accept(request).await?;
        info!("Payment status updated");
        Ok(order)
    }

    /// Dispatch (or re-dispatch) a payment link to the customer.
    ///
    /// The link is trimmed first; an empty result fails validation with no
    /// network call. Resending is always legal - repeated calls are never
    /// rejected as duplicates - and each call overwrites the locally held
    /// link with the latest submitted value.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for an empty link, otherwise as
    /// [`set_fulfillment_status`](Self::set_fulfillment_status).
    #[instrument(skip(self, link), fields(order = %id))]
    pub async fn send_payment_link(
        &self,
        id: &OrderId,
        link: &str,
    ) -> Result<PaymentLinkDispatch, ApiError> {
        let link = link.trim();
        if link.is_empty() {
            return Err(ApiError::Validation(
                "payment link must not be empty".to_owned(),
            ));
        }

        let resent = self
            .order(id)
            .await
            .is_some_and(|order| order.payment_link.is_some());

        let request = self
            .inner
            .session
            .http()
            .post(
                self.inner
                    .session
                    .endpoint(&format!("orders/{id}/send-payment-link")),
            )
            .json(&PaymentLinkRequest { payment_link: link });

        let response = self.inner.session.send(request).await?;
        let mut order = unwrap_mutation(response).await?;
        // The latest submitted link wins locally, whatever the backend echoes.
        order.payment_link = Some(link.to_owned());
        let order = self.adopt(order).await;

        info!(resent, "Payment link dispatched");
        Ok(PaymentLinkDispatch { order, resent })
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Run a mutation and adopt the canonical order the backend returns.
    async fn accept(&self, request: reqwest::RequestBuilder) -> Result<Order, ApiError> {
        let response = self.inner.session.send(request).await?;
        let order = unwrap_mutation(response).await?;
        Ok(self.adopt(order).await)
    }

    /// Replace the local copy wholesale and close its detail view.
    async fn adopt(&self, order: Order) -> Order {
        {
            let mut orders = self.inner.orders.write().await;
            if let Some(slot) = orders.iter_mut().find(|held| held.id == order.id) {
                *slot = order.clone();
            } else {
                orders.push(order.clone());
            }
        }

        let mut open = self.inner.open_order.write().await;
        if open.as_ref() == Some(&order.id) {
            *open = None;
        }
        order
    }
}

/// Decode a mutation envelope into the canonical order record.
async fn unwrap_mutation(response: reqwest::Response) -> Result<Order, ApiError> {
    let body: MutationResponse = response.json().await.map_err(ApiError::from)?;
    if !body.success {
        return Err(ApiError::Rejected(
            body.message
                .unwrap_or_else(|| "Transition refused".to_owned()),
        ));
    }
    body.data.ok_or_else(|| {
        ApiError::Response("mutation response carried no order record".to_owned())
    })
}

/// Tracking number to attach to a fulfillment transition, if any.
///
/// Only a transition to `shipped` may carry one, and only when it is
/// non-empty after trimming.
fn tracking_to_send(status: OrderStatus, tracking_number: Option<&str>) -> Option<&str> {
    if status == OrderStatus::Shipped {
        tracking_number.map(str::trim).filter(|t| !t.is_empty())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_rides_only_on_shipped() {
        assert_eq!(
            tracking_to_send(OrderStatus::Shipped, Some("TRACK123")),
            Some("TRACK123")
        );
        assert_eq!(
            tracking_to_send(OrderStatus::Shipped, Some("  TRACK123  ")),
            Some("TRACK123")
        );
        assert_eq!(tracking_to_send(OrderStatus::Shipped, Some("   ")), None);
        assert_eq!(tracking_to_send(OrderStatus::Shipped, None), None);
        // Supplied but irrelevant: any other target drops it.
        assert_eq!(tracking_to_send(OrderStatus::Processing, Some("TRACK123")), None);
        assert_eq!(tracking_to_send(OrderStatus::Cancelled, Some("TRACK123")), None);
    }

    #[test]
    fn test_status_request_payload_shapes() {
        let body = StatusUpdateRequest {
            order_status: Some(OrderStatus::Shipped),
            payment_status: None,
            tracking_number: Some("TRACK123"),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["orderStatus"], "shipped");
        assert_eq!(json["trackingNumber"], "TRACK123");
        assert!(json.get("paymentStatus").is_none());

        let body = StatusUpdateRequest {
            order_status: Some(OrderStatus::Processing),
            payment_status: None,
            tracking_number: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["orderStatus"], "processing");
        assert!(json.get("trackingNumber").is_none());

        let body = StatusUpdateRequest {
            order_status: None,
            payment_status: Some(PaymentStatus::Paid),
            tracking_number: None,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["paymentStatus"], "paid");
        assert!(json.get("orderStatus").is_none());
    }

    #[test]
    fn test_payment_link_request_wire_name() {
        let body = PaymentLinkRequest {
            payment_link: "https://pay.example/x",
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["paymentLink"], "https://pay.example/x");
    }
}
