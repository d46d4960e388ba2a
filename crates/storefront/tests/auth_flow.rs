//! Session lifecycle: login, register, 401 downgrade, persistence.

mod common;

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mekong_core::UserId;
use mekong_storefront::AppError;
use mekong_storefront::session::{FileSlot, SessionStore};

use common::{anonymous_store, cart_json, logged_in_store, token_for};

#[tokio::test]
async fn login_establishes_a_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "linh@example.com",
            "password": "motconvit",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token_for("linh@example.com", "linh", 7),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = anonymous_store(&server);
    assert!(!store.session().is_authenticated());

    let user = store.login("linh@example.com", "motconvit").await.expect("login");
    assert_eq!(user.id, UserId::new(7));
    assert_eq!(user.username, "linh");
    assert_eq!(user.email.as_str(), "linh@example.com");
    assert!(!user.is_admin);

    assert!(store.session().is_authenticated());
    assert_eq!(store.session().current_user(), Some(user));
}

#[tokio::test]
async fn rejected_credentials_surface_the_backend_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Sai email hoặc mật khẩu"})),
        )
        .mount(&server)
        .await;

    let store = anonymous_store(&server);
    let err = store
        .login("linh@example.com", "saimatkhau")
        .await
        .expect_err("bad credentials");

    assert_eq!(err.user_message(), "Sai email hoặc mật khẩu");
    assert!(!store.session().is_authenticated());
}

#[tokio::test]
async fn login_validation_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = anonymous_store(&server);

    assert!(matches!(
        store.login("khong-hop-le", "motconvit").await.expect_err("email"),
        AppError::Validation(_)
    ));
    assert!(matches!(
        store.login("linh@example.com", "ngan").await.expect_err("password"),
        AppError::Validation(_)
    ));
}

#[tokio::test]
async fn any_401_downgrades_the_session() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({"detail": "Phiên đã hết hạn"})),
        )
        .mount(&server)
        .await;

    let store = logged_in_store(&server);
    assert!(store.session().is_authenticated());

    let err = store.cart().await.expect_err("expired token");
    assert_eq!(err.user_message(), "Phiên đã hết hạn");

    // The 401 side effect: Authenticated -> Anonymous
    assert!(!store.session().is_authenticated());
    assert_eq!(store.session().current_user(), None);
}

#[tokio::test]
async fn register_does_not_establish_a_session() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(serde_json::json!({
            "email": "linh@example.com",
            "username": "linh",
            "password": "motconvit",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let store = anonymous_store(&server);
    store
        .register("linh@example.com", "linh", "motconvit")
        .await
        .expect("register");

    assert!(!store.session().is_authenticated());
}

#[tokio::test]
async fn register_validation_never_reaches_the_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let store = anonymous_store(&server);
    let err = store
        .register("linh@example.com", "ab", "motconvit")
        .await
        .expect_err("short username");
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn session_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slot_path = dir.path().join("session");

    let first = SessionStore::new(FileSlot::new(slot_path.clone()));
    first
        .login(&token_for("linh@example.com", "linh", 7))
        .expect("login");
    drop(first);

    // A fresh store over the same slot restores the session
    let second = SessionStore::new(FileSlot::new(slot_path.clone()));
    assert!(second.is_authenticated());
    assert_eq!(
        second.current_user().map(|u| u.username),
        Some("linh".to_owned())
    );

    // Logout clears the slot for good
    second.logout();
    let third = SessionStore::new(FileSlot::new(slot_path));
    assert!(!third.is_authenticated());
}

#[tokio::test]
async fn logout_drops_the_cart_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cart/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(&[(10, 1, 1)])))
        .expect(2)
        .mount(&server)
        .await;

    let store = logged_in_store(&server);
    store.cart().await.expect("cart");

    store.logout().await;
    assert!(!store.session().is_authenticated());

    // Logging back in must not see the previous user's cached cart
    store
        .session()
        .login(&token_for("linh@example.com", "linh", 7))
        .expect("login");
    store.cart().await.expect("cart refetch");
}
