//! Shared helpers for HTTP tests: an app over in-memory stores with
//! stubbed Google collaborators.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use memberhub_api::{AppState, Backends, build_app};
use memberhub_auth::google::GoogleUserInfo;
use memberhub_auth::memory::{
    MemoryApiKeyStore, MemoryMemberDirectory, MemoryRoleStore, MemorySessionStore,
};
use memberhub_auth::{
    ActivityRecorder, IdTokenVerifier, LoginState, OAuthProvider, RoleStore, VerifiedIdentity,
};
use memberhub_core::config::AppConfig;
use memberhub_core::error::ErrorKind;
use memberhub_core::{AppError, AppResult, MemberId};
use memberhub_entity::member::MemberInfo;
use memberhub_entity::role::Role;

pub const FRONTEND: &str = "http://frontend.test";

pub const PRES: i32 = 1;
pub const MEM: i32 = 2;
pub const AVP_RND: i32 = 3;
pub const ADMIN: i32 = 4;

/// Accepts `google:{email}` as a valid ID token for `email`.
pub struct StubVerifier;

#[async_trait]
impl IdTokenVerifier for StubVerifier {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        token
            .strip_prefix("google:")
            .map(|email| VerifiedIdentity {
                email: email.to_string(),
                name: None,
            })
            .ok_or_else(|| AppError::unauthorized("Invalid ID token"))
    }
}

/// Exchanges `code:{email}` for `access:{email}`; anything else fails.
pub struct StubOAuth;

#[async_trait]
impl OAuthProvider for StubOAuth {
    fn authorization_url(&self, state: &LoginState) -> AppResult<String> {
        Ok(format!(
            "https://accounts.example/auth?state={}",
            state.encode()
        ))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<String> {
        code.strip_prefix("code:")
            .map(|email| format!("access:{email}"))
            .ok_or_else(|| AppError::new(ErrorKind::ExternalService, "bad code"))
    }

    async fn user_info(&self, access_token: &str) -> AppResult<GoogleUserInfo> {
        let email = access_token
            .strip_prefix("access:")
            .filter(|e| *e != "broken@example.org")
            .ok_or_else(|| AppError::new(ErrorKind::ExternalService, "userinfo failed"))?;
        Ok(GoogleUserInfo {
            id: "1".to_string(),
            email: email.to_string(),
            verified_email: true,
            name: None,
        })
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub members: Arc<MemoryMemberDirectory>,
    pub roles: Arc<MemoryRoleStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub api_keys: Arc<MemoryApiKeyStore>,
}

pub fn test_config() -> AppConfig {
    AppConfig::from_toml(&format!(
        r#"
        [server.cors]
        allowed_origins = ["{FRONTEND}"]

        [database]
        url = "postgres://localhost/memberhub_test"

        [auth]
        jwt_secret = "http-test-secret"
        google_client_id = "test-client"
        "#
    ))
    .unwrap()
}

fn member(id: i32, email: &str, position: &str, committee: &str) -> MemberInfo {
    MemberInfo {
        id: MemberId::from(id),
        email: email.to_string(),
        full_name: format!("Member {id}"),
        position_id: Some(position.to_string()),
        committee_id: Some(committee.to_string()),
    }
}

pub fn email(id: i32) -> &'static str {
    match id {
        PRES => "pres@example.org",
        MEM => "mem@example.org",
        AVP_RND => "avp@example.org",
        ADMIN => "admin@example.org",
        _ => "unknown@example.org",
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let members = Arc::new(MemoryMemberDirectory::new());
        members.insert(member(PRES, email(PRES), "PRES", "EXEC")).await;
        members.insert(member(MEM, email(MEM), "MEM", "EXT")).await;
        members.insert(member(AVP_RND, email(AVP_RND), "AVP", "RND")).await;
        members.insert(member(ADMIN, email(ADMIN), "MEM", "EXT")).await;

        let roles = Arc::new(MemoryRoleStore::new());
        roles
            .grant(MemberId::from(ADMIN), &Role::admin(), None)
            .await
            .unwrap();

        let sessions = Arc::new(MemorySessionStore::new(Arc::clone(&members)));
        let api_keys = Arc::new(MemoryApiKeyStore::new());
        let (activity, _drain) = ActivityRecorder::spawn(sessions.clone(), 64);

        let state = AppState::new(
            Arc::new(test_config()),
            Backends {
                members: members.clone(),
                roles: roles.clone(),
                sessions: sessions.clone(),
                api_keys: api_keys.clone(),
            },
            activity,
            Arc::new(StubVerifier),
            Arc::new(StubOAuth),
        );

        Self {
            router: build_app(state.clone()),
            state,
            members,
            roles,
            sessions,
            api_keys,
        }
    }

    /// Logs `member` in and returns the session ID.
    pub async fn login(&self, member: i32) -> String {
        self.state
            .sessions
            .create_session(MemberId::from(member), false, Some("test-agent"), None)
            .await
            .unwrap()
            .id
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn with_session(method: &str, uri: &str, session_id: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", format!("session_id={session_id}"))
        .body(Body::empty())
        .unwrap()
}

pub fn with_bearer(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"));
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::FOUND);
    response.headers()["location"].to_str().unwrap().to_string()
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get("set-cookie")
        .map(|v| v.to_str().unwrap().to_string())
}
