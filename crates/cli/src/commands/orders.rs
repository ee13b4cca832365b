//! Order workflow commands.

use terra_core::{OrderId, OrderStatus, PaymentStatus};

use terra_console::OrderWorkflow;

use super::CommandError;

/// List all orders with their dual status.
///
/// # Errors
///
/// Returns `CommandError::Api` when the listing fails.
pub async fn list(workflow: &OrderWorkflow) -> Result<(), CommandError> {
    let orders = workflow.list().await?;
    if orders.is_empty() {
        println!("No orders yet");
        return Ok(());
    }

    println!(
        "{:<12} {:<12} {:<10} {:>12}  {:<12} CUSTOMER",
        "NUMBER", "STATUS", "PAYMENT", "TOTAL", "DATE"
    );
    for order in orders {
        println!(
            "{:<12} {:<12} {:<10} {:>12}  {:<12} {} {} <{}>",
            order.order_number,
            order.order_status.label(),
            order.payment_status.label(),
            order.total_amount,
            order.created_at.date_naive(),
            order.customer.first_name,
            order.customer.last_name,
            order.customer.email,
        );
    }
    Ok(())
}

/// Show one order in detail.
///
/// # Errors
///
/// Returns `CommandError::Input` when the backend holds no such order and
/// `CommandError::Api` when the listing fails.
pub async fn show(workflow: &OrderWorkflow, id: &str) -> Result<(), CommandError> {
    workflow.list().await?;
    let id = OrderId::from(id);
    let order = workflow
        .order(&id)
        .await
        .ok_or_else(|| CommandError::Input(format!("no order with id {id}")))?;

    println!("Order {} ({})", order.order_number, order.id);
    println!(
        "Status:   {} / {}",
        order.order_status.label(),
        order.payment_status.label()
    );
    print!(
        "Customer: {} {} <{}>",
        order.customer.first_name, order.customer.last_name, order.customer.email
    );
    if let Some(phone) = &order.customer.phone {
        print!(" {phone}");
    }
    println!();
    if let Some(method) = order.payment_method {
        println!("Payment:  {}", method.label());
    }
    if let Some(shipping) = &order.shipping {
        let method = shipping.method.map_or("-", |m| m.label());
        println!(
            "Shipping: {}, {}, {}, {}, {}",
            method, shipping.address, shipping.city, shipping.postal_code, shipping.country
        );
    }
    if let Some(tracking) = &order.tracking_number {
        println!("Tracking: {tracking}");
    }
    if let Some(link) = &order.payment_link {
        println!("Link:     {link} (already sent)");
    }
    println!("Items:");
    for item in &order.items {
        println!("  {} x {} @ {}", item.quantity, item.name, item.price);
    }
    println!("Total:    {}", order.total_amount);
    Ok(())
}

/// Request a fulfillment-status transition.
///
/// # Errors
///
/// Returns `CommandError::Input` for an unknown status name and
/// `CommandError::Api` when the backend refuses the transition.
pub async fn set_status(
    workflow: &OrderWorkflow,
    id: &str,
    status: &str,
    tracking: Option<&str>,
) -> Result<(), CommandError> {
    let status: OrderStatus = status.parse().map_err(CommandError::Input)?;

    let update = workflow
        .set_fulfillment_status(&OrderId::from(id), status, tracking)
        .await?;

    if update.customer_notified {
        println!(
            "Order {} is now {}; customer notified with the tracking number",
            update.order.order_number,
            update.order.order_status.label()
        );
    } else {
        println!(
            "Order {} is now {}",
            update.order.order_number,
            update.order.order_status.label()
        );
    }
    Ok(())
}

/// Request a payment-status transition.
///
/// # Errors
///
/// Returns `CommandError::Input` for an unknown status name and
/// `CommandError::Api` when the transition is refused (including `failed`,
/// which only the backend may set).
pub async fn set_payment(
    workflow: &OrderWorkflow,
    id: &str,
    status: &str,
) -> Result<(), CommandError> {
    let status: PaymentStatus = status.parse().map_err(CommandError::Input)?;

    let order = workflow
        .set_payment_status(&OrderId::from(id), status)
        .await?;

    // The backend's answer is authoritative and may differ from the request.
    println!(
        "Order {} payment is now {}",
        order.order_number,
        order.payment_status.label()
    );
    Ok(())
}

/// Send (or resend) a payment link to the customer.
///
/// # Errors
///
/// Returns `CommandError::Api` with a validation error for an empty link,
/// otherwise when the dispatch fails.
pub async fn send_link(
    workflow: &OrderWorkflow,
    id: &str,
    link: &str,
) -> Result<(), CommandError> {
    let dispatch = workflow.send_payment_link(&OrderId::from(id), link).await?;

    if dispatch.resent {
        println!(
            "Payment link re-sent to the customer for order {}",
            dispatch.order.order_number
        );
    } else {
        println!(
            "Payment link sent to the customer for order {}",
            dispatch.order.order_number
        );
    }
    Ok(())
}
