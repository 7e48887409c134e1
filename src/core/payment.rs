//! Payment confirmation and card data masking.

use crate::{
    core::order::SYSTEM_ACTOR,
    entities::{OrderStatus, PaymentStatus},
    errors::{Error, Result},
    repository::{OrderRepository, PaymentRepository},
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{error, info, instrument, warn};

/// Outcome reported by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Funds were captured
    Received,
    /// The payment attempt was abandoned
    Cancelled,
}

impl FromStr for PaymentOutcome {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RECEIVED" => Ok(Self::Received),
            "CANCELLED" => Ok(Self::Cancelled),
            other => {
                error!("payment status not valid: {other}");
                Err(Error::validation(format!("payment status not valid: {other}")))
            }
        }
    }
}

/// Input for [`submit_payment`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    /// Order being paid
    pub order_reference: String,
    /// Cardholder name in clear; stored masked
    pub card_holder_name: String,
    /// Card number in clear; stored masked
    pub card_number: String,
    /// `RECEIVED` or `CANCELLED`
    pub status: String,
}

/// Result of a payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentResult {
    /// Order the payment belongs to
    pub order_reference: String,
    /// Order status after the call
    pub order_status: OrderStatus,
    /// Payment status after the call
    pub payment_status: PaymentStatus,
}

/// Records the payment outcome for an order.
///
/// `RECEIVED` moves a `PENDING PAYMENT` order to `PAYMENT RECEIVED` and its
/// payment to `RECEIVED`, storing the card data masked. `CANCELLED` leaves
/// both records untouched.
///
/// # Errors
/// - `ResourceNotFound` if the order or its payment is missing
/// - `Validation` for an unknown status token
/// - `Conflict` if the order is not awaiting payment
#[instrument(skip(db, request), fields(order = %request.order_reference, status = %request.status))]
pub async fn submit_payment(
    db: &DatabaseConnection,
    request: SubmitPaymentRequest,
) -> Result<SubmitPaymentResult> {
    OrderRepository::new(db)
        .find_by_id(&request.order_reference)
        .await?;
    let outcome: PaymentOutcome = request.status.parse()?;

    let txn = db.begin().await?;
    let orders = OrderRepository::new(&txn);
    let payments = PaymentRepository::new(&txn);

    let mut order = orders.find_by_id(&request.order_reference).await?;
    let mut payment = payments
        .find_by_order_reference(&order.order_reference)
        .await?;

    match outcome {
        PaymentOutcome::Received => {
            if order.status != OrderStatus::PendingPayment {
                error!(
                    "order {} is not awaiting payment: {:?}",
                    order.order_reference, order.status
                );
                return Err(Error::conflict(format!(
                    "order is not awaiting payment: {:?}",
                    order.status
                )));
            }

            let now = Utc::now();
            order.status = OrderStatus::PaymentReceived;
            order.updated_at = now;
            SYSTEM_ACTOR.clone_into(&mut order.updated_by);

            payment.status = PaymentStatus::Received;
            payment.card_number = mask_card(&request.card_number);
            payment.card_holder_name = mask_name(&request.card_holder_name);
            payment.payment_date = now;
            payment.updated_at = now;
            SYSTEM_ACTOR.clone_into(&mut payment.updated_by);

            order = orders.update(order).await?;
            payment = payments.update(payment).await?;
        }
        PaymentOutcome::Cancelled => {
            warn!(
                "payment for order {} reported cancelled; order left unchanged",
                order.order_reference
            );
        }
    }

    txn.commit().await?;
    info!(
        "Payment processed for order {}: {:?}",
        order.order_reference, payment.status
    );

    Ok(SubmitPaymentResult {
        order_reference: order.order_reference,
        order_status: order.status,
        payment_status: payment.status,
    })
}

/// Masks a card number down to its last four digits.
///
/// Spaces and dashes are removed first; numbers of four digits or fewer are
/// returned as they are.
#[must_use]
pub fn mask_card(card_number: &str) -> String {
    let digits: Vec<char> = card_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    if digits.len() <= 4 {
        return digits.into_iter().collect();
    }

    let hidden = digits.len() - 4;
    "*".repeat(hidden) + &digits[hidden..].iter().collect::<String>()
}

/// Keeps the first character of every word of a name and masks the rest.
#[must_use]
pub fn mask_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                let rest = chars.count();
                format!("{first}{}", "*".repeat(rest))
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::order::{SubmitOrderRequest, submit_order};
    use crate::entities::{Order, Payment};
    use crate::test_utils::*;
    use sea_orm::EntityTrait;

    async fn pending_order(db: &DatabaseConnection) -> Result<String> {
        create_test_account(db, "alice").await?;
        let planter = create_test_product(db, "Planter", 1_500, 10).await?;
        let submitted = submit_order(
            db,
            SubmitOrderRequest {
                account_username: "alice".to_string(),
                delivery_address: "12 Garden Lane".to_string(),
                order_items: vec![line_for(&planter, 2)],
            },
        )
        .await?;
        Ok(submitted.order_reference)
    }

    fn payment_request(order_reference: &str, status: &str) -> SubmitPaymentRequest {
        SubmitPaymentRequest {
            order_reference: order_reference.to_string(),
            card_holder_name: "John Smith".to_string(),
            card_number: "4111-1111 1111-1111".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_mask_card() {
        assert_eq!(mask_card("4111111111111111"), "************1111");
        assert_eq!(mask_card("4111 1111-1111 1111"), "************1111");
        assert_eq!(mask_card("1234"), "1234");
        assert_eq!(mask_card("12"), "12");
        assert_eq!(mask_card(""), "");
    }

    #[test]
    fn test_mask_name() {
        assert_eq!(mask_name("John Smith"), "J*** S****");
        assert_eq!(mask_name("  A   Lee "), "A L**");
        assert_eq!(mask_name(""), "");
    }

    #[test]
    fn test_outcome_tokens() {
        assert_eq!(
            "RECEIVED".parse::<PaymentOutcome>().unwrap(),
            PaymentOutcome::Received
        );
        assert_eq!(
            "CANCELLED".parse::<PaymentOutcome>().unwrap(),
            PaymentOutcome::Cancelled
        );
        assert!(matches!(
            "received".parse::<PaymentOutcome>(),
            Err(Error::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_payment_received() -> Result<()> {
        let db = setup_test_db().await?;
        let reference = pending_order(&db).await?;

        let result = submit_payment(&db, payment_request(&reference, "RECEIVED")).await?;
        assert_eq!(result.order_status, OrderStatus::PaymentReceived);
        assert_eq!(result.payment_status, PaymentStatus::Received);

        let payment = Payment::find().one(&db).await?.unwrap();
        assert_eq!(payment.card_number, "************1111");
        assert_eq!(payment.card_holder_name, "J*** S****");
        assert_eq!(payment.status, PaymentStatus::Received);

        let order = Order::find_by_id(reference).one(&db).await?.unwrap();
        assert_eq!(order.status, OrderStatus::PaymentReceived);

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_received_twice_conflicts() -> Result<()> {
        let db = setup_test_db().await?;
        let reference = pending_order(&db).await?;

        submit_payment(&db, payment_request(&reference, "RECEIVED")).await?;
        let second = submit_payment(&db, payment_request(&reference, "RECEIVED")).await;
        assert!(matches!(second, Err(Error::Conflict { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_cancelled_is_noop() -> Result<()> {
        let db = setup_test_db().await?;
        let reference = pending_order(&db).await?;

        let result = submit_payment(&db, payment_request(&reference, "CANCELLED")).await?;
        assert_eq!(result.order_status, OrderStatus::PendingPayment);
        assert_eq!(result.payment_status, PaymentStatus::Pending);

        let payment = Payment::find().one(&db).await?.unwrap();
        assert_eq!(payment.card_number, "");

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_unknown_status() -> Result<()> {
        let db = setup_test_db().await?;
        let reference = pending_order(&db).await?;

        let result = submit_payment(&db, payment_request(&reference, "PAID")).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_payment_unknown_order() -> Result<()> {
        let db = setup_test_db().await?;

        let result = submit_payment(&db, payment_request("ORDER-missing", "RECEIVED")).await;
        assert!(matches!(result, Err(Error::ResourceNotFound { .. })));

        Ok(())
    }
}
