//! Integration tests for the session controller against a mock VRChat API.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use vrcf_core::api::VrchatClient;
use vrcf_core::session::{SessionController, SessionState};
use wiremock::matchers::{header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_user_json() -> serde_json::Value {
    json!({
        "id": "usr_5b9e6688-a27e-4566-92f2-8e3f5c27b222",
        "displayName": "tupper",
        "username": "tupper",
        "currentAvatarThumbnailImageUrl": "https://api.vrchat.cloud/api/1/image/file_x/1/256",
        // Undocumented field the decoder must strip.
        "pronounsHistory": [{"pronouns": "they/them"}],
    })
}

fn friends_json() -> serde_json::Value {
    json!([
        {
            "id": "usr_aaaa",
            "displayName": "aki",
            "status": "join me",
            "statusDescription": "come hang out",
            "lastActivity": "2026-08-06T10:00:00.000Z",
            "location": "wrld_4432ea9b-729c-46e3-8eaf-846aa0a37fdd:12345",
        },
        {
            "id": "usr_bbbb",
            "displayName": "mori",
            "status": "offline",
            "statusDescription": "",
            "lastActivity": "2026-08-05T22:00:00.000Z",
            "location": "offline",
        },
    ])
}

fn controller(server: &MockServer) -> SessionController {
    let client = VrchatClient::new(server.uri()).unwrap();
    SessionController::new(client)
}

async fn mount_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_user_json()))
        .mount(server)
        .await;
}

async fn mount_friends(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/user/friends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_json()))
        .mount(server)
        .await;
}

/// Mounts a login response that reports a pending second factor, valid
/// for a single request so a later `/auth/user` mock takes over.
async fn mount_pending_login(server: &MockServer, methods: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "requiresTwoFactorAuth": methods })),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_success_authenticates_and_fetches_friends_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_user_json()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/user/friends"))
        .and(query_param("offset", "0"))
        .and(query_param("n", "100"))
        .and(query_param("offline", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_json()))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    match &*controller.state().borrow() {
        SessionState::Authenticated(user) => assert_eq!(user.display_name, "tupper"),
        other => panic!("expected Authenticated, got {other:?}"),
    }
    assert_eq!(controller.friends().borrow().len(), 2);
    assert!(!*controller.friends_loading().borrow());
}

#[tokio::test]
async fn test_login_passes_through_authenticating() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_user_json())
                .set_delay(Duration::from_millis(250)),
        )
        .mount(&server)
        .await;
    mount_friends(&server).await;

    let controller = Arc::new(controller(&server));
    let submitting = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.submit("tupper", "hunter2").await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(*controller.state().borrow(), SessionState::Authenticating);

    submitting.await.unwrap();
    assert!(matches!(
        &*controller.state().borrow(),
        SessionState::Authenticated(_)
    ));
}

#[tokio::test]
async fn test_login_email_otp_branch() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["emailOtp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    assert_eq!(
        *controller.state().borrow(),
        SessionState::RequiresEmailVerification
    );
}

#[tokio::test]
async fn test_login_totp_branch() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["totp", "otp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    assert_eq!(
        *controller.state().borrow(),
        SessionState::RequiresTwoFactorVerification
    );
}

#[tokio::test]
async fn test_login_failure_preserves_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid Username/Email or Password", "status_code": 401}
        })))
        .mount(&server)
        .await;

    let controller = controller(&server);
    controller.submit("tupper", "wrong").await;

    match &*controller.state().borrow() {
        SessionState::Failed(message) => {
            assert!(message.contains("Invalid Username/Email or Password"));
        }
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_email_otp_verify_flow() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["emailOtp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;
    assert_eq!(
        *controller.state().borrow(),
        SessionState::RequiresEmailVerification
    );

    Mock::given(method("POST"))
        .and(path("/auth/twofactorauth/emailotp/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
        .expect(1)
        .mount(&server)
        .await;
    mount_user(&server).await;
    mount_friends(&server).await;

    controller.submit_otp("123456").await;

    assert!(matches!(
        &*controller.state().borrow(),
        SessionState::Authenticated(_)
    ));
    assert_eq!(controller.friends().borrow().len(), 2);
}

#[tokio::test]
async fn test_totp_verify_flow() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["totp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;
    assert_eq!(
        *controller.state().borrow(),
        SessionState::RequiresTwoFactorVerification
    );

    Mock::given(method("POST"))
        .and(path("/auth/twofactorauth/totp/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": true})))
        .expect(1)
        .mount(&server)
        .await;
    mount_user(&server).await;
    mount_friends(&server).await;

    controller.submit_totp("654321").await;

    assert!(matches!(
        &*controller.state().borrow(),
        SessionState::Authenticated(_)
    ));
}

#[tokio::test]
async fn test_otp_verify_failure_is_terminal() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["emailOtp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    Mock::given(method("POST"))
        .and(path("/auth/twofactorauth/emailotp/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid two-factor code", "status_code": 401}
        })))
        .mount(&server)
        .await;

    controller.submit_otp("000000").await;

    // No re-branching into a verification state: failures here are final.
    match &*controller.state().borrow() {
        SessionState::Failed(message) => assert!(message.contains("Invalid two-factor code")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unverified_ack_is_a_failure() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["totp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    Mock::given(method("POST"))
        .and(path("/auth/twofactorauth/totp/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verified": false})))
        .mount(&server)
        .await;

    controller.submit_totp("000000").await;

    match &*controller.state().borrow() {
        SessionState::Failed(message) => assert!(message.contains("rejected")),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_friends_fetch_failure_degrades_to_empty() {
    let server = MockServer::start().await;
    mount_user(&server).await;

    // First fetch succeeds, every later one fails.
    Mock::given(method("GET"))
        .and(path("/auth/user/friends"))
        .respond_with(ResponseTemplate::new(200).set_body_json(friends_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/user/friends"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;
    assert_eq!(controller.friends().borrow().len(), 2);

    controller.load_friends().await;

    // Prior contents are gone, the flag is cleared, and the session is
    // still authenticated: the failure stays silent.
    assert!(controller.friends().borrow().is_empty());
    assert!(!*controller.friends_loading().borrow());
    assert!(matches!(
        &*controller.state().borrow(),
        SessionState::Authenticated(_)
    ));
}

#[tokio::test]
async fn test_reset_returns_to_idle_and_clears_friends() {
    let server = MockServer::start().await;
    mount_user(&server).await;
    mount_friends(&server).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;
    assert!(!controller.friends().borrow().is_empty());

    controller.reset();

    assert_eq!(*controller.state().borrow(), SessionState::Idle);
    assert!(controller.friends().borrow().is_empty());
}

#[tokio::test]
async fn test_reset_backs_out_of_verification() {
    let server = MockServer::start().await;
    mount_pending_login(&server, json!(["emailOtp"])).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;
    assert_eq!(
        *controller.state().borrow(),
        SessionState::RequiresEmailVerification
    );

    controller.reset();
    assert_eq!(*controller.state().borrow(), SessionState::Idle);
}

#[tokio::test]
async fn test_asset_fetch_shares_session_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "auth=authcookie_abc123; Path=/; HttpOnly")
                .set_body_json(current_user_json()),
        )
        .mount(&server)
        .await;
    mount_friends(&server).await;

    let controller = controller(&server);
    controller.submit("tupper", "hunter2").await;

    Mock::given(method("GET"))
        .and(path("/image/file_x/1/256"))
        .and(header("cookie", "auth=authcookie_abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = controller
        .client()
        .fetch_asset(&format!("{}/image/file_x/1/256", server.uri()))
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"png");
}
