//! The mutation pipeline: state-changing calls with declared invalidation.
//!
//! Every mutation follows the same flow: validate locally (validation errors
//! never reach the network), round-trip through the server, then invalidate
//! the declared cache keys so subsequent reads reflect server truth. On
//! failure the cache is left untouched - nothing optimistic was committed.
//!
//! Serialization of mutations against one resource is cooperative: the view
//! layer disables the triggering control while a mutation is in flight. The
//! pipeline itself does not lock.

use tracing::instrument;

use mekong_core::{Email, ProductId};

use crate::error::{AppError, Result};
use crate::models::{
    AccessToken, CartItemPayload, Comment, CommentPayload, LoginPayload, RegisterPayload,
};
use crate::query::QueryKey;
use crate::session::CurrentUser;

use super::StorefrontStore;

/// Minimum password length accepted by the registration and login forms.
const MIN_PASSWORD_LEN: usize = 6;
/// Minimum username length accepted by the registration form.
const MIN_USERNAME_LEN: usize = 3;

impl StorefrontStore {
    // =========================================================================
    // Cart Mutations
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// Invalidates: the cart (and, transitively, the cart-with-products join).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous,
    /// [`AppError::Validation`] for a zero quantity, or the API error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        self.require_auth()?;
        validate_quantity(quantity)?;

        let _: serde_json::Value = self
            .inner
            .api
            .post(
                "cart/add",
                &CartItemPayload {
                    product_id,
                    quantity,
                },
            )
            .await?;

        self.inner.queries.invalidate(&QueryKey::Cart).await;
        Ok(())
    }

    /// Set the quantity of a product already in the cart.
    ///
    /// A quantity below 1 is rejected locally without a network call; use
    /// [`Self::remove_from_cart`] to delete a line.
    ///
    /// Invalidates: the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous,
    /// [`AppError::Validation`] for a zero quantity, or the API error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_cart_quantity(&self, product_id: ProductId, quantity: u32) -> Result<()> {
        self.require_auth()?;
        validate_quantity(quantity)?;

        let _: serde_json::Value = self
            .inner
            .api
            .put(
                "cart/update",
                &CartItemPayload {
                    product_id,
                    quantity,
                },
            )
            .await?;

        self.inner.queries.invalidate(&QueryKey::Cart).await;
        Ok(())
    }

    /// Remove a product from the cart.
    ///
    /// Invalidates: the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous, or the API error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<()> {
        self.require_auth()?;

        let _: serde_json::Value = self
            .inner
            .api
            .delete(&format!("cart/remove?product_id={product_id}"))
            .await?;

        self.inner.queries.invalidate(&QueryKey::Cart).await;
        Ok(())
    }

    // =========================================================================
    // Comment Mutations
    // =========================================================================

    /// Post a comment on a product.
    ///
    /// Invalidates: the product's comments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AuthRequired`] when anonymous,
    /// [`AppError::Validation`] for empty content, or the API error.
    #[instrument(skip(self, content), fields(product_id = %product_id))]
    pub async fn add_comment(
        &self,
        product_id: ProductId,
        content: &str,
        user_name: &str,
    ) -> Result<Comment> {
        self.require_auth()?;

        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "Vui lòng nhập nội dung bình luận".to_owned(),
            ));
        }

        let comment = self
            .inner
            .api
            .post(
                &format!("products/{product_id}/comments"),
                &CommentPayload { content, user_name },
            )
            .await?;

        self.inner
            .queries
            .invalidate(&QueryKey::Comments(product_id))
            .await;
        Ok(comment)
    }

    // =========================================================================
    // Auth Mutations
    // =========================================================================

    /// Log in and establish a session.
    ///
    /// Invalidates: the cart - it is scoped to the session that just changed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed email or short
    /// password, the API error for rejected credentials, or a session error
    /// if the issued token does not decode.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<CurrentUser> {
        let email = validate_email(email)?;
        validate_password(password)?;

        let token: AccessToken = self
            .inner
            .api
            .post(
                "auth/login",
                &LoginPayload {
                    email: email.as_str(),
                    password,
                },
            )
            .await?;

        let user = self.inner.session.login(&token.access_token)?;
        self.inner.queries.invalidate(&QueryKey::Cart).await;
        Ok(user)
    }

    /// Log out. The cart cache goes with the session.
    pub async fn logout(&self) {
        self.inner.session.logout();
        self.inner.queries.invalidate(&QueryKey::Cart).await;
    }

    /// Register a new account.
    ///
    /// Registration alone does not establish a session; the UI sends the user
    /// to the login page afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed input, or the API error
    /// (e.g. the email is already taken).
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<()> {
        let email = validate_email(email)?;
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AppError::Validation(
                "Tên người dùng phải có ít nhất 3 ký tự".to_owned(),
            ));
        }
        validate_password(password)?;

        let _: serde_json::Value = self
            .inner
            .api
            .post(
                "auth/register",
                &RegisterPayload {
                    email: email.as_str(),
                    username,
                    password,
                },
            )
            .await?;

        Ok(())
    }
}

fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::Validation("Số lượng không hợp lệ".to_owned()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<Email> {
    Email::parse(email).map_err(|_| AppError::Validation("Email không hợp lệ".to_owned()))
}

fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(
            "Mật khẩu phải có ít nhất 6 ký tự".to_owned(),
        ));
    }
    Ok(())
}
