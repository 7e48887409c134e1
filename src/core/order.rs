//! Order lifecycle - submission, cancellation and order queries.
//!
//! Submission validates the cart, locks and decrements product stock, computes
//! totals with overflow checks, and persists the order, its items and its
//! payment in one transaction. Cancellation reverses the stock decrement in the
//! same transaction that cancels the order and its payment. Any error returned
//! before `commit` drops the transaction, which rolls it back, so callers never
//! observe a partial order or a partial stock change.
//!
//! Products are locked in the order lines appear in the request. Two concurrent
//! submissions naming the same two products in opposite order can deadlock; the
//! store aborts one of them and the caller sees a `DbOperation` error.

use crate::{
    core::{
        pagination::{Metadata, Pagination},
        reference::{self, ORDER_ITEM_PREFIX, ORDER_PREFIX, PAYMENT_PREFIX},
    },
    entities::{OrderStatus, PaymentStatus, account, order, order_item, payment, product},
    errors::{Error, Result},
    repository::{
        AccountRepository, OrderFilter, OrderItemRepository, OrderRepository, PaymentRepository,
        ProductRepository,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{error, info, instrument, warn};

/// Maximum number of lines in one order
pub const MAX_ORDER_LINES: usize = 100;
/// Maximum quantity of a single line
pub const MAX_LINE_QUANTITY: i64 = 1_000;
/// Maximum quantity summed over all lines
pub const MAX_ORDER_QUANTITY: i64 = 10_000;
/// Maximum order total in minor currency units
pub const MAX_ORDER_TOTAL: i64 = 10_000_000_000;

/// Actor recorded on rows changed by the system rather than a customer
pub const SYSTEM_ACTOR: &str = "SYSTEM";

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    /// Product to order
    pub product_id: i64,
    /// Unit price the customer saw
    pub price_used: i64,
    /// Units to order
    pub quantity: i64,
    /// Name snapshot stored on the item
    #[serde(default)]
    pub product_name: String,
    /// Image snapshot stored on the item
    #[serde(default)]
    pub product_image_url: String,
}

/// Input for [`submit_order`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderRequest {
    /// Authenticated account placing the order
    #[serde(default)]
    pub account_username: String,
    /// Shipping address
    pub delivery_address: String,
    /// Lines in the order they should be processed
    pub order_items: Vec<OrderLineRequest>,
}

/// Result of a committed submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResult {
    /// Generated order reference
    pub order_reference: String,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
    /// Always `PENDING PAYMENT`
    pub order_status: OrderStatus,
    /// Grand total
    pub total: i64,
}

/// Input for [`cancel_order`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderRequest {
    /// Order to cancel
    pub order_reference: String,
    /// Authenticated account requesting the cancellation
    #[serde(default)]
    pub account_username: String,
}

/// Result of a committed cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResult {
    /// Cancelled order
    pub order_reference: String,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
    /// Always `CANCELLED`
    pub order_status: OrderStatus,
    /// `CANCELLED` or `REFUNDED`
    pub payment_status: PaymentStatus,
}

/// Input for [`get_account_orders`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOrdersQuery {
    /// Owner of the orders
    #[serde(default)]
    pub account_username: String,
    /// Optional substring of the order reference
    #[serde(default)]
    pub order_reference: String,
    /// Page selection
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Order row in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Order reference
    pub order_reference: String,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
    /// Current state
    pub status: OrderStatus,
    /// Grand total
    pub total: i64,
}

/// A page of an account's orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountOrders {
    /// Orders on this page, newest first
    pub orders: Vec<OrderSummary>,
    /// Listing metadata
    pub metadata: Metadata,
}

/// Product snapshot embedded in an order item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemProduct {
    /// Product id
    pub id: i64,
    /// Name at submission time
    pub name: String,
    /// Image at submission time
    pub image_url: String,
}

/// One item of an order detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    /// Item reference
    pub order_item_reference: String,
    /// Units ordered
    pub quantity: i64,
    /// Unit price snapshot
    pub price: i64,
    /// Line total
    pub total: i64,
    /// Product snapshot
    pub product: OrderItemProduct,
}

/// Payment part of an order detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    /// Payment reference
    pub payment_reference: String,
    /// Current state
    pub status: PaymentStatus,
    /// Mirrors the order total
    pub total: i64,
    /// Masked holder name
    pub card_holder_name: String,
    /// Masked card number
    pub card_number: String,
}

/// Full view of one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    /// Order reference
    pub order_reference: String,
    /// When the order was placed
    pub order_date: DateTime<Utc>,
    /// Shipping address
    pub delivery_address: String,
    /// Current state
    pub status: OrderStatus,
    /// Grand total
    pub total: i64,
    /// The order's payment
    pub payment: PaymentSummary,
    /// Items in line order
    pub order_items: Vec<OrderItemDetail>,
}

/// Checks the cart against the abuse limits without touching the store.
///
/// # Errors
/// Returns a `Validation` error naming the first violated rule.
pub fn validate_order_request(request: &SubmitOrderRequest) -> Result<()> {
    let reject = |message: String| {
        error!("{message}");
        Err(Error::validation(message))
    };

    if request.order_items.is_empty() {
        return reject("empty order items".to_string());
    }
    if request.order_items.len() > MAX_ORDER_LINES {
        return reject(format!(
            "too many order items: {} (max {MAX_ORDER_LINES})",
            request.order_items.len()
        ));
    }

    let mut total_quantity: i64 = 0;
    for (index, line) in request.order_items.iter().enumerate() {
        if line.product_id == 0 {
            return reject(format!("invalid product id at index {index}"));
        }
        if line.quantity <= 0 {
            return reject(format!("invalid quantity at index {index}"));
        }
        if line.price_used <= 0 {
            return reject(format!("invalid price at index {index}"));
        }
        if line.quantity > MAX_LINE_QUANTITY {
            return reject(format!(
                "quantity too large at index {index} (max {MAX_LINE_QUANTITY})"
            ));
        }
        total_quantity += line.quantity;
    }

    if total_quantity > MAX_ORDER_QUANTITY {
        return reject(format!(
            "grand total quantity too large: {total_quantity} (max {MAX_ORDER_QUANTITY})"
        ));
    }

    Ok(())
}

/// Submits an order; on success the order is `PENDING PAYMENT` with a
/// `PENDING` payment and the stock of every line has been decremented.
///
/// # Errors
/// - `Validation` for cart limits, unknown or inactive products, insufficient
///   stock, line total overflow, or a grand total above [`MAX_ORDER_TOTAL`]
/// - `AccessDenied` if the account is inactive
/// - `Conflict` if the grand total overflows or a reference cannot be generated
/// - `ResourceNotFound` if the account does not exist
/// - `DbOperation` for store failures
#[instrument(skip(db, request), fields(account = %request.account_username, lines = request.order_items.len()))]
pub async fn submit_order(
    db: &DatabaseConnection,
    request: SubmitOrderRequest,
) -> Result<SubmitOrderResult> {
    validate_order_request(&request)?;

    let txn = db.begin().await?;
    let accounts = AccountRepository::new(&txn);
    let products = ProductRepository::new(&txn);
    let orders = OrderRepository::new(&txn);
    let order_items = OrderItemRepository::new(&txn);
    let payments = PaymentRepository::new(&txn);

    let order_reference = reference::generate(ORDER_PREFIX)?;

    let account = accounts.find_by_username(&request.account_username).await?;
    if !account.is_active {
        error!("account inactive: {}", account.username);
        return Err(Error::access_denied("account inactive"));
    }

    ensure_products_exist(&products, &request.order_items).await?;

    let now = Utc::now();
    // Locked products touched by this order, in first-seen order. Repeated
    // product ids reserve against the same working copy.
    let mut reserved: Vec<product::Model> = Vec::new();
    let mut items = Vec::with_capacity(request.order_items.len());
    let mut grand_total: i64 = 0;

    for (line_number, line) in request.order_items.iter().enumerate() {
        let index = match reserved.iter().position(|p| p.id == line.product_id) {
            Some(index) => index,
            None => {
                reserved.push(products.find_by_id(line.product_id).await?);
                reserved.len() - 1
            }
        };
        reserve_stock(&mut reserved[index], line.quantity, now)?;

        let item = build_order_item(line, line_number, &order_reference, &account, now)?;
        grand_total = accumulate_total(grand_total, item.total)?;
        items.push(item);
    }

    let order = orders
        .create(order::Model {
            order_reference: order_reference.clone(),
            order_date: now,
            account_username: account.username.clone(),
            delivery_address: request.delivery_address,
            status: OrderStatus::PendingPayment,
            total: grand_total,
            created_at: now,
            updated_at: now,
            created_by: account.username.clone(),
            updated_by: account.username.clone(),
            deleted_at: None,
        })
        .await?;

    for (i, item) in items.iter().enumerate() {
        info!(
            "orderItem[{i}] ref={} product={} qty={}",
            item.order_item_reference, item.product_id, item.quantity
        );
    }
    order_items.create_batch(&items).await?;
    products.batch_upsert(&reserved).await?;
    payments.create(build_payment(&order, &account, now)?).await?;

    txn.commit().await?;
    info!(
        "Order created successfully: {} total: {}",
        order.order_reference, order.total
    );

    Ok(SubmitOrderResult {
        order_reference: order.order_reference,
        order_date: order.order_date,
        order_status: order.status,
        total: order.total,
    })
}

/// Rejects the request if any referenced product id does not exist.
async fn ensure_products_exist<C>(
    products: &ProductRepository<'_, C>,
    lines: &[OrderLineRequest],
) -> Result<()>
where
    C: ConnectionTrait,
{
    let ids: Vec<i64> = lines.iter().map(|line| line.product_id).collect();
    let found: HashSet<i64> = products
        .find_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    if let Some(missing) = ids.iter().find(|id| !found.contains(id)) {
        error!("product not found: {missing}");
        return Err(Error::validation(format!("product not found: {missing}")));
    }
    Ok(())
}

/// Takes `quantity` units out of a locked product's stock.
fn reserve_stock(product: &mut product::Model, quantity: i64, now: DateTime<Utc>) -> Result<()> {
    if !product.is_active {
        error!("product is not active: {}", product.id);
        return Err(Error::validation(format!(
            "product is not active: {}",
            product.id
        )));
    }
    if product.stock < quantity {
        let message = format!(
            "insufficient stock for product: {}, requested: {quantity}, available: {}",
            product.id, product.stock
        );
        error!("{message}");
        return Err(Error::validation(message));
    }

    product.stock -= quantity;
    product.updated_at = now;
    SYSTEM_ACTOR.clone_into(&mut product.updated_by);
    Ok(())
}

/// Builds an order item with snapshotted product data and an overflow-checked
/// line total.
fn build_order_item(
    line: &OrderLineRequest,
    line_number: usize,
    order_reference: &str,
    account: &account::Model,
    now: DateTime<Utc>,
) -> Result<order_item::Model> {
    let order_item_reference = reference::generate(ORDER_ITEM_PREFIX)?;

    let total = match line.price_used.checked_mul(line.quantity) {
        Some(total) if total >= 0 => total,
        _ => {
            error!("price calculation overflow for product: {}", line.product_id);
            return Err(Error::validation(format!(
                "price calculation overflow for product: {}",
                line.product_id
            )));
        }
    };

    // Bounded by MAX_ORDER_LINES
    let line_number = i32::try_from(line_number)
        .map_err(|_| Error::validation(format!("too many order items: {line_number}")))?;

    Ok(order_item::Model {
        order_item_reference,
        order_reference: order_reference.to_string(),
        line_number,
        product_id: line.product_id,
        price_snapshot: line.price_used,
        quantity: line.quantity,
        total,
        product_name_snapshot: line.product_name.clone(),
        product_image_url_snapshot: line.product_image_url.clone(),
        created_at: now,
        updated_at: now,
        created_by: account.username.clone(),
        updated_by: account.username.clone(),
        deleted_at: None,
    })
}

/// Adds a line total to the running grand total.
///
/// # Errors
/// `Conflict` on integer overflow, `Validation` above [`MAX_ORDER_TOTAL`].
fn accumulate_total(grand_total: i64, line_total: i64) -> Result<i64> {
    let Some(next) = grand_total.checked_add(line_total) else {
        error!("grand total overflow");
        return Err(Error::conflict("grand total overflow"));
    };
    if next > MAX_ORDER_TOTAL {
        error!("order total exceeds maximum limit: {next}");
        return Err(Error::validation(format!(
            "order total exceeds maximum limit: {next}"
        )));
    }
    Ok(next)
}

fn build_payment(
    order: &order::Model,
    account: &account::Model,
    now: DateTime<Utc>,
) -> Result<payment::Model> {
    Ok(payment::Model {
        payment_reference: reference::generate(PAYMENT_PREFIX)?,
        order_reference: order.order_reference.clone(),
        total: order.total,
        card_holder_name: String::new(),
        card_number: String::new(),
        status: PaymentStatus::Pending,
        payment_date: now,
        created_at: now,
        updated_at: now,
        created_by: account.username.clone(),
        updated_by: account.username.clone(),
        deleted_at: None,
    })
}

/// Decides the payment status a cancellation moves to.
///
/// | order status       | payment after |
/// |--------------------|---------------|
/// | `PENDING PAYMENT`  | `CANCELLED`   |
/// | `PAYMENT RECEIVED` | `REFUNDED`    |
///
/// Anything else is rejected with `Conflict`; an order that does not belong to
/// `username` is rejected with `AccessDenied`.
fn cancellation_outcome(order: &order::Model, username: &str) -> Result<PaymentStatus> {
    if order.account_username != username {
        error!(
            "account {username} may not cancel order {}",
            order.order_reference
        );
        return Err(Error::access_denied("order belongs to another account"));
    }

    match order.status {
        OrderStatus::PendingPayment => Ok(PaymentStatus::Cancelled),
        OrderStatus::PaymentReceived => Ok(PaymentStatus::Refunded),
        OrderStatus::Processed => {
            error!("order status already final: {}", order.order_reference);
            Err(Error::conflict("order status already final"))
        }
        OrderStatus::Finished | OrderStatus::Cancelled => {
            error!(
                "order {} cannot be cancelled from status {:?}",
                order.order_reference, order.status
            );
            Err(Error::conflict(format!(
                "order cannot be cancelled from status {:?}",
                order.status
            )))
        }
    }
}

/// Adds each item's quantity back to its product.
///
/// Returns the touched products in first-seen order. Items whose product is
/// not in `products` are skipped.
fn restore_stock(
    items: &[order_item::Model],
    products: Vec<product::Model>,
    now: DateTime<Utc>,
) -> Vec<product::Model> {
    let mut by_id: HashMap<i64, product::Model> =
        products.into_iter().map(|p| (p.id, p)).collect();
    let mut touched: Vec<i64> = Vec::new();

    for item in items {
        let Some(product) = by_id.get_mut(&item.product_id) else {
            warn!(
                "product {} of item {} no longer exists, stock not restored",
                item.product_id, item.order_item_reference
            );
            continue;
        };
        product.stock = product.stock.saturating_add(item.quantity);
        product.updated_at = now;
        SYSTEM_ACTOR.clone_into(&mut product.updated_by);
        if !touched.contains(&product.id) {
            touched.push(product.id);
        }
    }

    touched
        .into_iter()
        .filter_map(|id| by_id.remove(&id))
        .collect()
}

/// Cancels an order, cancels or refunds its payment, and returns the ordered
/// units to stock.
///
/// # Errors
/// - `ResourceNotFound` if the order, the account or the payment is missing
/// - `AccessDenied` if the order belongs to another account
/// - `Conflict` if the order is `PROCESSED`, `FINISHED` or already `CANCELLED`
/// - `DbOperation` for store failures
#[instrument(skip(db, request), fields(order = %request.order_reference))]
pub async fn cancel_order(
    db: &DatabaseConnection,
    request: CancelOrderRequest,
) -> Result<CancelOrderResult> {
    let (order, _) = OrderRepository::new(db)
        .find_by_id_with_items(&request.order_reference)
        .await?;
    let account = AccountRepository::new(db)
        .find_by_username(&request.account_username)
        .await?;
    cancellation_outcome(&order, &account.username)?;
    PaymentRepository::new(db)
        .find_by_order_reference(&order.order_reference)
        .await?;

    let txn = db.begin().await?;
    let orders = OrderRepository::new(&txn);
    let payments = PaymentRepository::new(&txn);
    let products = ProductRepository::new(&txn);

    // Re-read under lock so a concurrent transition cannot be overwritten.
    let (mut order, items) = orders
        .find_by_id_with_items(&request.order_reference)
        .await?;
    let payment_status = cancellation_outcome(&order, &account.username)?;
    let mut payment = payments
        .find_by_order_reference(&order.order_reference)
        .await?;

    let now = Utc::now();
    order.status = OrderStatus::Cancelled;
    order.updated_at = now;
    order.updated_by.clone_from(&account.username);
    payment.status = payment_status;
    payment.updated_at = now;
    payment.updated_by.clone_from(&account.username);

    let order = orders.update(order).await?;
    let payment = payments.update(payment).await?;

    let mut product_ids: Vec<i64> = items.iter().map(|item| item.product_id).collect();
    product_ids.sort_unstable();
    product_ids.dedup();
    let restocked = restore_stock(
        &items,
        products.find_by_ids_for_update(&product_ids).await?,
        now,
    );
    for product in &restocked {
        info!("restocked product {} to {}", product.id, product.stock);
    }
    products.batch_upsert(&restocked).await?;

    txn.commit().await?;
    info!("Order cancelled: {}", order.order_reference);

    Ok(CancelOrderResult {
        order_reference: order.order_reference,
        order_date: order.order_date,
        order_status: order.status,
        payment_status: payment.status,
    })
}

/// Lists an account's orders, newest first.
///
/// # Errors
/// `Validation` for out-of-range pagination, `DbOperation` for store failures.
#[instrument(skip(db))]
pub async fn get_account_orders(
    db: &DatabaseConnection,
    query: AccountOrdersQuery,
) -> Result<AccountOrders> {
    let page = query.pagination.to_page_request()?;
    let filter = OrderFilter {
        order_reference: query.order_reference,
    };

    let (rows, total_data) = OrderRepository::new(db)
        .find_with_filters(&query.account_username, &filter, page)
        .await?;

    let orders = rows
        .into_iter()
        .map(|order| OrderSummary {
            order_reference: order.order_reference,
            order_date: order.order_date,
            status: order.status,
            total: order.total,
        })
        .collect();

    Ok(AccountOrders {
        orders,
        metadata: query.pagination.metadata(total_data),
    })
}

/// Loads one order with its items and payment.
///
/// # Errors
/// `ResourceNotFound` if the order or its payment is missing.
#[instrument(skip(db))]
pub async fn get_order_detail(db: &DatabaseConnection, order_reference: &str) -> Result<OrderDetail> {
    let (order, items) = OrderRepository::new(db)
        .find_by_id_with_items(order_reference)
        .await?;
    let payment = PaymentRepository::new(db)
        .find_by_order_reference(order_reference)
        .await?;

    let order_items = items
        .into_iter()
        .map(|item| OrderItemDetail {
            order_item_reference: item.order_item_reference,
            quantity: item.quantity,
            price: item.price_snapshot,
            total: item.total,
            product: OrderItemProduct {
                id: item.product_id,
                name: item.product_name_snapshot,
                image_url: item.product_image_url_snapshot,
            },
        })
        .collect();

    Ok(OrderDetail {
        order_reference: order.order_reference,
        order_date: order.order_date,
        delivery_address: order.delivery_address,
        status: order.status,
        total: order.total,
        payment: PaymentSummary {
            payment_reference: payment.payment_reference,
            status: payment.status,
            total: payment.total,
            card_holder_name: payment.card_holder_name,
            card_number: payment.card_number,
        },
        order_items,
    })
}
