#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderValue, StatusCode, header::AUTHORIZATION};
use axum_test::TestServer;
use codecamp::{
    Config,
    ai::{AiError, AiProvider, AiRequest, AiResponse, AiResult},
    auth::hash_password,
    build_server_with,
    model::{
        CrudRepository, DbConnection,
        entity::{UserEntity, UserEntityCreateUpdate},
    },
    web::{AppState, AuthenticatedUser, UserRole},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct-horse-battery";

/// AI provider with a fixed answer, or a fixed failure.
pub struct ScriptedProvider {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AiProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: AiRequest) -> AiResult<AiResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(text) => Ok(AiResponse {
                text: text.clone(),
                model: String::from("scripted-model"),
                elapsed: Duration::from_millis(1),
            }),
            None => Err(AiError::Status {
                status: 503,
                message: String::from("scripted outage"),
            }),
        }
    }
}

pub fn test_config(overrides: &[(&str, &str)]) -> Config {
    let overrides: HashMap<String, String> = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::default()
        .with_overrides(|key| overrides.get(key).cloned())
        .expect("invalid test config")
}

pub struct FlowServer {
    pub server: TestServer,
    pub state: AppState,
}

pub async fn setup_server_with(config: Config, provider: Arc<dyn AiProvider>) -> FlowServer {
    let db = DbConnection::in_memory().await.unwrap();
    let (state, app) = build_server_with(db, Arc::new(config), provider)
        .await
        .unwrap();
    FlowServer {
        server: TestServer::new(app).unwrap(),
        state,
    }
}

pub async fn setup_server() -> FlowServer {
    setup_server_with(test_config(&[]), ScriptedProvider::answering("scripted answer")).await
}

impl FlowServer {
    /// Admins can't be created over HTTP, the first one is seeded directly.
    pub async fn seed_admin(&self, email: &str) -> UserEntity {
        let system = AuthenticatedUser::system();
        let user = UserEntity::create(
            self.state.pool(),
            &system,
            UserEntityCreateUpdate {
                email: email.to_string(),
                name: String::from("Admin"),
                password_hash: hash_password(PASSWORD).unwrap(),
            },
        )
        .await
        .unwrap();

        user.set_role(self.state.pool(), &system, UserRole::Admin)
            .await
            .unwrap()
    }
}

#[derive(Debug)]
pub struct FlowContext {
    pub store: HashMap<&'static str, Value>, // a way to pass data between steps
}

impl FlowContext {
    pub fn new() -> Self {
        Self {
            store: HashMap::new(),
        }
    }

    pub fn store(&mut self, key: &'static str, val: Value) {
        self.store.insert(key, val);
    }

    pub fn get(&self, key: &str) -> &Value {
        self.store.get(key).expect("missing store key")
    }

    pub fn get_json<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned,
    {
        let obj = self.get(key);
        serde_json::from_value(obj.clone()).expect("Invalid json format")
    }

    /// `token` field of a stored register/login response.
    pub fn token(&self, key: &str) -> String {
        self.get(key)["token"]
            .as_str()
            .expect("stored response has no token")
            .to_string()
    }
}

pub enum Auth {
    None,
    Stored(&'static str),
    Raw(String),
}

pub struct Action {
    #[allow(unused)]
    pub name: &'static str,
    pub method: &'static str,
    pub path: String,
    pub dyn_path: Option<Box<dyn Fn(&FlowContext) -> String + Send + Sync>>,
    pub body: Option<Value>,
    pub dyn_body: Option<Box<dyn Fn(&FlowContext) -> Value + Send + Sync>>,
    pub auth: Auth,
    pub expect: StatusCode,
    pub query_params: Vec<(String, String)>,
    pub body_asserts: Vec<Box<dyn Fn(&Value) + Send + Sync>>,
    pub save_as: Option<&'static str>,
}

impl Action {
    pub fn new(name: &'static str, method: &'static str, path: &str) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            dyn_path: None,
            body: None,
            dyn_body: None,
            auth: Auth::None,
            expect: StatusCode::OK,
            query_params: vec![],
            body_asserts: vec![],
            save_as: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_expect(mut self, expect: StatusCode) -> Self {
        self.expect = expect;
        self
    }

    /// Sends the token from the response stored under `key`.
    pub fn as_user(mut self, key: &'static str) -> Self {
        self.auth = Auth::Stored(key);
        self
    }

    pub fn with_bearer(mut self, token: &str) -> Self {
        self.auth = Auth::Raw(token.to_string());
        self
    }

    pub fn with_param(mut self, key: &str, val: &str) -> Self {
        self.query_params
            .push((String::from(key), String::from(val)));
        self
    }

    pub fn with_dyn_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> String + Send + Sync + 'static,
    {
        self.dyn_path = Some(Box::new(f));
        self
    }

    pub fn with_dyn_body<F>(mut self, f: F) -> Self
    where
        F: Fn(&FlowContext) -> Value + Send + Sync + 'static,
    {
        self.dyn_body = Some(Box::new(f));
        self
    }

    pub fn with_save_as(mut self, key: &'static str) -> Self {
        self.save_as = Some(key);
        self
    }

    pub fn assert_body<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.body_asserts.push(Box::new(check));
        self
    }
}

pub struct Flow {
    actions: Vec<Action>,
}

impl Flow {
    pub fn new() -> Self {
        Self { actions: vec![] }
    }

    pub fn step(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub async fn run(self, server: &FlowServer) -> FlowContext {
        let server = &server.server;
        let mut ctx = FlowContext::new(); // create new context for this flow
        for action in self.actions {
            println!("==> Running test action `{}`", action.name);

            let path = if let Some(dyn_path_fn) = &action.dyn_path {
                dyn_path_fn(&ctx)
            } else {
                action.path.clone()
            };

            let mut req = match action.method {
                "GET" => server.get(&path),
                "POST" => server.post(&path),
                "PUT" => server.put(&path),
                "DELETE" => server.delete(&path),
                _ => panic!("unsupported method {}", action.method),
            };

            let token = match &action.auth {
                Auth::None => None,
                Auth::Stored(key) => Some(ctx.token(key)),
                Auth::Raw(token) => Some(token.clone()),
            };
            if let Some(token) = token {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).unwrap();
                req = req.add_header(AUTHORIZATION, value);
            }

            match (&action.dyn_body, &action.body) {
                (Some(f), _) => {
                    req = req.json(&f(&ctx));
                }
                (_, Some(json)) => req = req.json(json),
                _ => {}
            }

            for (k, v) in &action.query_params {
                req = req.add_query_param(k, v);
            }

            let resp = req.await;
            resp.assert_status(action.expect);

            if !action.body_asserts.is_empty() || action.save_as.is_some() {
                let body = resp.json::<Value>();
                for check in &action.body_asserts {
                    check(&body);
                }
                if let Some(save_key) = action.save_as {
                    ctx.store(save_key, body);
                }
            }
        }
        ctx
    }
}

// Common actions builders

pub fn register_action(email: &str, name: &str) -> Action {
    Action::new("register", "POST", "/api/v1/register").with_body(json!({
        "email": email,
        "password": PASSWORD,
        "name": name,
    }))
}

pub fn login_action(email: &str, password: &str) -> Action {
    Action::new("login", "POST", "/api/v1/login").with_body(json!({
        "email": email,
        "password": password,
    }))
}

pub fn create_lesson_action(title: &str, difficulty: &str, order_index: i32) -> Action {
    Action::new("create_lesson", "POST", "/api/v1/admin/lessons").with_body(json!({
        "title": title,
        "description": format!("About {title}"),
        "difficulty": difficulty,
        "content": format!("# {title}"),
        "order_index": order_index,
    }))
}

/// Path built from the `lesson_id` of a stored create-lesson response.
pub fn lesson_path(key: &'static str, suffix: &'static str) -> impl Fn(&FlowContext) -> String {
    move |ctx| {
        let id = ctx.get(key)["lesson_id"]
            .as_str()
            .expect("stored response has no lesson_id")
            .to_string();
        format!("/api/v1/lessons/{id}{suffix}")
    }
}

pub fn admin_lesson_path(key: &'static str, suffix: &'static str) -> impl Fn(&FlowContext) -> String {
    move |ctx| {
        let id = ctx.get(key)["lesson_id"]
            .as_str()
            .expect("stored response has no lesson_id")
            .to_string();
        format!("/api/v1/admin/lessons/{id}{suffix}")
    }
}
