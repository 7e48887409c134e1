//! Account business logic - registration, login and profile maintenance.

use crate::{
    config::auth::AuthConfig,
    core::auth::{SessionToken, hash_password, issue_token, validate_password, verify_password},
    entities::account,
    errors::{Error, Result},
    repository::AccountRepository,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use validator::Validate;

/// Input for [`register`].
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Unique login name
    #[validate(length(min = 1, max = 100, message = "username must be 1 to 100 characters"))]
    pub username: String,
    /// Name shown to other users
    #[validate(length(min = 1, max = 100, message = "display name must be 1 to 100 characters"))]
    pub display_name: String,
    /// Unique contact address
    #[validate(
        length(max = 200, message = "email must be at most 200 characters"),
        email(message = "email is not valid")
    )]
    pub email: String,
    /// Clear-text password, checked against the policy
    pub login_password: String,
    /// Default delivery address
    #[serde(default)]
    pub registered_address: String,
}

/// Input for [`update_account`].
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    /// Authenticated account
    #[serde(default)]
    pub username: String,
    /// New display name
    #[validate(length(min = 1, max = 100, message = "display name must be 1 to 100 characters"))]
    pub display_name: String,
    /// New contact address
    #[validate(
        length(max = 200, message = "email must be at most 200 characters"),
        email(message = "email is not valid")
    )]
    pub email: String,
    /// New default delivery address
    #[serde(default)]
    pub registered_address: String,
}

/// Input for [`update_password`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    /// Authenticated account
    #[serde(default)]
    pub username: String,
    /// Current password
    pub old_password: String,
    /// Replacement password, checked against the policy
    pub new_password: String,
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    /// Login name
    pub username: String,
    /// Display name
    pub display_name: String,
    /// Contact address
    pub email: String,
    /// Default delivery address
    pub registered_address: String,
    /// Whether the account may log in and order
    pub is_active: bool,
}

impl From<account::Model> for AccountView {
    fn from(account: account::Model) -> Self {
        Self {
            username: account.username,
            display_name: account.display_name,
            email: account.email,
            registered_address: account.registered_address,
            is_active: account.is_active,
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    /// Session token for subsequent calls
    #[serde(flatten)]
    pub token: SessionToken,
    /// The logged-in account
    pub account: AccountView,
}

fn check(request: &impl Validate) -> Result<()> {
    request.validate().map_err(|e| {
        error!("request validation failed: {e}");
        Error::validation(e.to_string())
    })
}

/// Registers a new, active account.
///
/// # Errors
/// `Validation` for malformed fields, a weak password, or a username or email
/// that is already taken.
#[instrument(skip(db, request), fields(username = %request.username))]
pub async fn register(db: &DatabaseConnection, request: RegisterRequest) -> Result<AccountView> {
    check(&request)?;
    validate_password(&request.login_password)?;

    let txn = db.begin().await?;
    let accounts = AccountRepository::new(&txn);

    if accounts.exists_by_username(&request.username).await? {
        error!("username already registered: {}", request.username);
        return Err(Error::validation("username already registered"));
    }
    if accounts.exists_by_email(&request.email).await? {
        error!("email already registered: {}", request.email);
        return Err(Error::validation("email already registered"));
    }

    let now = Utc::now();
    let account = accounts
        .create(account::ActiveModel {
            username: Set(request.username.clone()),
            display_name: Set(request.display_name),
            email: Set(request.email),
            login_password: Set(hash_password(&request.login_password)?),
            registered_address: Set(request.registered_address),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            created_by: Set(request.username.clone()),
            updated_by: Set(request.username),
            deleted_at: Set(None),
            ..Default::default()
        })
        .await?;

    txn.commit().await?;
    info!("Account registered: {}", account.username);
    Ok(account.into())
}

/// Verifies credentials and issues a session token.
///
/// # Errors
/// - `Validation` if the password does not meet the policy
/// - `ResourceNotFound` for an unknown username
/// - `AuthFailed` for a wrong password or an inactive account
#[instrument(skip(db, password, config))]
pub async fn login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    config: &AuthConfig,
) -> Result<LoginResult> {
    validate_password(password)?;

    let account = AccountRepository::new(db).find_by_username(username).await?;
    if !verify_password(password, &account.login_password) {
        error!("wrong password for {username}");
        return Err(Error::auth_failed("invalid username or password"));
    }
    if !account.is_active {
        error!("inactive account tried to log in: {username}");
        return Err(Error::auth_failed("account inactive"));
    }

    let token = issue_token(&account.username, config)?;
    info!("Login succeeded: {username}");
    Ok(LoginResult {
        token,
        account: account.into(),
    })
}

/// Loads an account's public profile.
///
/// # Errors
/// `ResourceNotFound` for an unknown username.
pub async fn get_account_detail(db: &DatabaseConnection, username: &str) -> Result<AccountView> {
    AccountRepository::new(db)
        .find_by_username(username)
        .await
        .map(AccountView::from)
}

/// Replaces the editable profile fields of an account.
///
/// # Errors
/// `Validation` for malformed fields, `ResourceNotFound` for an unknown
/// account, `DbOperation` if the email is taken by another account.
#[instrument(skip(db, request), fields(username = %request.username))]
pub async fn update_account(
    db: &DatabaseConnection,
    request: UpdateAccountRequest,
) -> Result<AccountView> {
    check(&request)?;

    let txn = db.begin().await?;
    let accounts = AccountRepository::new(&txn);

    let mut account = accounts.find_by_username(&request.username).await?;
    account.display_name = request.display_name;
    account.email = request.email;
    account.registered_address = request.registered_address;
    account.updated_at = Utc::now();
    account.updated_by.clone_from(&request.username);
    let account = accounts.update(account).await?;

    txn.commit().await?;
    info!("Account updated: {}", account.username);
    Ok(account.into())
}

/// Changes an account's password after checking the current one.
///
/// # Errors
/// - `Validation` if the new password does not meet the policy
/// - `ResourceNotFound` for an unknown account
/// - `AuthFailed` if the current password is wrong
#[instrument(skip(db, request), fields(username = %request.username))]
pub async fn update_password(db: &DatabaseConnection, request: UpdatePasswordRequest) -> Result<()> {
    validate_password(&request.new_password)?;

    let txn = db.begin().await?;
    let accounts = AccountRepository::new(&txn);

    let mut account = accounts.find_by_username(&request.username).await?;
    if !verify_password(&request.old_password, &account.login_password) {
        error!("wrong current password for {}", request.username);
        return Err(Error::auth_failed("current password is wrong"));
    }

    account.login_password = hash_password(&request.new_password)?;
    account.updated_at = Utc::now();
    account.updated_by.clone_from(&request.username);
    accounts.update(account).await?;

    txn.commit().await?;
    info!("Password changed: {}", request.username);
    Ok(())
}
