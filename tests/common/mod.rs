//! In-process mock of the platform API shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

use startup_platform::resilience::RetryPolicy;
use startup_platform::session::TokenStore;
use startup_platform::{ApiClient, AuthTokens};

const PAGE_SIZE: usize = 20;

#[derive(Clone)]
struct MockUser {
    id: Uuid,
    email: String,
    password: String,
    full_name: String,
    role: String,
    bio: Option<String>,
    skills: Vec<String>,
    avatar_url: Option<String>,
    created_at: String,
}

#[derive(Clone)]
struct MockStartup {
    id: Uuid,
    name: String,
    description: Option<String>,
    industry: Option<String>,
    stage: Option<String>,
    website: Option<String>,
    owner_id: Uuid,
    created_at: String,
}

#[derive(Clone)]
struct MockInterest {
    id: Uuid,
    user_id: Uuid,
    startup_id: Uuid,
    created_at: String,
}

/// Shared state of the mock server plus knobs the tests turn.
pub struct MockApi {
    base_url: String,
    users: Mutex<HashMap<Uuid, MockUser>>,
    startups: Mutex<Vec<MockStartup>>,
    interests: Mutex<Vec<MockInterest>>,
    access_tokens: Mutex<HashMap<String, Uuid>>,
    refresh_tokens: Mutex<HashMap<String, Uuid>>,
    bearers: Mutex<Vec<String>>,
    token_seq: AtomicU64,
    refresh_calls: AtomicU32,
    refresh_delay_ms: AtomicU64,
    fail_refresh: AtomicBool,
    reject_bearers: AtomicBool,
    health_calls: AtomicU32,
    health_delay_ms: AtomicU64,
}

impl MockApi {
    fn new(base_url: String) -> Self {
        Self {
            base_url,
            users: Mutex::new(HashMap::new()),
            startups: Mutex::new(Vec::new()),
            interests: Mutex::new(Vec::new()),
            access_tokens: Mutex::new(HashMap::new()),
            refresh_tokens: Mutex::new(HashMap::new()),
            bearers: Mutex::new(Vec::new()),
            token_seq: AtomicU64::new(0),
            refresh_calls: AtomicU32::new(0),
            refresh_delay_ms: AtomicU64::new(0),
            fail_refresh: AtomicBool::new(false),
            reject_bearers: AtomicBool::new(false),
            health_calls: AtomicU32::new(0),
            health_delay_ms: AtomicU64::new(0),
        }
    }

    /// Start the mock on an ephemeral port.
    pub async fn start() -> Arc<MockApi> {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let api = Arc::new(MockApi::new(format!("http://{addr}/api")));

        let app = router(api.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        api
    }

    /// Start the mock, but drop the first `drops` connections without answering,
    /// the way a sleeping host does while it boots.
    pub async fn start_with_dropped_connections(drops: u32) -> (Arc<MockApi>, Arc<AtomicU32>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let api = Arc::new(MockApi::new(format!("http://{addr}/api")));
        let dropped = Arc::new(AtomicU32::new(0));

        let app = router(api.clone());
        let counter = dropped.clone();
        tokio::spawn(async move {
            while counter.load(Ordering::SeqCst) < drops {
                match listener.accept().await {
                    Ok((socket, _)) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                        drop(socket);
                    }
                    Err(_) => return,
                }
            }
            let _ = axum::serve(listener, app).await;
        });
        (api, dropped)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client against this mock with fast retries and an in-memory store.
    pub fn client(&self) -> ApiClient {
        self.client_builder().build().unwrap()
    }

    pub fn client_with_store(&self, store: Arc<dyn TokenStore>) -> ApiClient {
        self.client_builder().token_store(store).build().unwrap()
    }

    fn client_builder(&self) -> startup_platform::http::ApiClientBuilder {
        ApiClient::builder(self.base_url.clone())
            .retry_policy(RetryPolicy::new(3, 10, 50))
            .request_timeout(Duration::from_secs(5))
            .no_proxy()
    }

    pub fn seed_user(&self, email: &str, password: &str, role: &str) -> Uuid {
        let user = MockUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: email.split('@').next().unwrap_or_default().to_string(),
            role: role.to_string(),
            bio: None,
            skills: Vec::new(),
            avatar_url: None,
            created_at: now(),
        };
        let id = user.id;
        self.users.lock().unwrap().insert(id, user);
        id
    }

    pub fn seed_startup(&self, owner_id: Uuid, name: &str) -> Uuid {
        let startup = MockStartup {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            industry: Some("fintech".into()),
            stage: Some("seed".into()),
            website: None,
            owner_id,
            created_at: now(),
        };
        let id = startup.id;
        self.startups.lock().unwrap().push(startup);
        id
    }

    /// Mint a token pair for `user_id` as if the user had logged in.
    pub fn issue_tokens(&self, user_id: Uuid) -> AuthTokens {
        let access = self.mint_access(user_id);
        let n = self.token_seq.fetch_add(1, Ordering::SeqCst);
        let refresh = format!("refresh-{n}");
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh.clone(), user_id);
        AuthTokens::new(access, refresh)
    }

    fn mint_access(&self, user_id: Uuid) -> String {
        let n = self.token_seq.fetch_add(1, Ordering::SeqCst);
        let access = format!("access-{n}");
        self.access_tokens
            .lock()
            .unwrap()
            .insert(access.clone(), user_id);
        access
    }

    /// Invalidate every access token issued so far.
    pub fn expire_access_tokens(&self) {
        self.access_tokens.lock().unwrap().clear();
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set_fail_refresh(&self, fail: bool) {
        self.fail_refresh.store(fail, Ordering::SeqCst);
    }

    /// Answer 401 to every bearer, even freshly refreshed ones.
    pub fn set_reject_bearers(&self, reject: bool) {
        self.reject_bearers.store(reject, Ordering::SeqCst);
    }

    /// Hold every health response for `delay`, like a host still booting.
    pub fn set_health_delay(&self, delay: Duration) {
        self.health_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn health_calls(&self) -> u32 {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> u32 {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn bearers(&self) -> Vec<String> {
        self.bearers.lock().unwrap().clone()
    }

    pub fn interest_count(&self, startup_id: Uuid) -> usize {
        self.interests
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.startup_id == startup_id)
            .count()
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<MockUser, Response> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));
        let Some(token) = token else {
            return Err(reply(
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Authentication credentials were not provided."}),
            ));
        };
        self.bearers.lock().unwrap().push(token.to_string());

        if self.reject_bearers.load(Ordering::SeqCst) {
            return Err(token_not_valid());
        }
        let user_id = self.access_tokens.lock().unwrap().get(token).copied();
        user_id
            .and_then(|id| self.users.lock().unwrap().get(&id).cloned())
            .ok_or_else(token_not_valid)
    }

    fn user_json(&self, user: &MockUser) -> Value {
        json!({
            "id": user.id,
            "email": user.email,
            "full_name": user.full_name,
            "role": user.role,
            "bio": user.bio,
            "skills": user.skills,
            "avatar_url": user.avatar_url,
            "created_at": user.created_at,
            "updated_at": user.created_at,
        })
    }

    fn startup_json(&self, startup: &MockStartup, viewer: Option<Uuid>) -> Value {
        let interests = self.interests.lock().unwrap();
        let count = interests
            .iter()
            .filter(|i| i.startup_id == startup.id)
            .count();
        let mine = viewer.map(|v| {
            interests
                .iter()
                .any(|i| i.startup_id == startup.id && i.user_id == v)
        });
        let owner_name = self
            .users
            .lock()
            .unwrap()
            .get(&startup.owner_id)
            .map(|u| u.full_name.clone());

        json!({
            "id": startup.id,
            "name": startup.name,
            "description": startup.description,
            "industry": startup.industry,
            "stage": startup.stage,
            "website": startup.website,
            "owner_id": startup.owner_id,
            "owner_name": owner_name,
            "interest_count": count,
            "has_expressed_interest": mine,
            "created_at": startup.created_at,
            "updated_at": startup.created_at,
        })
    }

    fn interest_json(&self, interest: &MockInterest) -> Value {
        let user = self.users.lock().unwrap().get(&interest.user_id).cloned();
        let startup_name = self
            .startups
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == interest.startup_id)
            .map(|s| s.name.clone());

        json!({
            "id": interest.id,
            "user_id": interest.user_id,
            "user_name": user.as_ref().map(|u| u.full_name.clone()),
            "user_email": user.as_ref().map(|u| u.email.clone()),
            "startup_id": interest.startup_id,
            "startup_name": startup_name,
            "created_at": interest.created_at,
        })
    }

    fn find_startup(&self, id: Uuid) -> Option<MockStartup> {
        self.startups
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn paginate(&self, path: &str, items: Vec<Value>, page: usize) -> Value {
        let count = items.len();
        let start = (page - 1) * PAGE_SIZE;
        let results: Vec<Value> = items.into_iter().skip(start).take(PAGE_SIZE).collect();
        let next = (start + PAGE_SIZE < count)
            .then(|| format!("{}{}?page={}", self.base_url, path, page + 1));
        let previous = (page > 1).then(|| format!("{}{}?page={}", self.base_url, path, page - 1));

        json!({"count": count, "next": next, "previous": previous, "results": results})
    }
}

fn router(api: Arc<MockApi>) -> Router {
    Router::new()
        .route("/api/health/", get(health))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/login/", post(login))
        .route("/api/auth/token/refresh/", post(refresh))
        .route("/api/auth/me/", get(me).patch(update_me))
        .route("/api/auth/users/", get(list_users))
        .route("/api/auth/users/{id}/", get(get_user))
        .route("/api/startups/", get(list_startups).post(create_startup))
        .route("/api/startups/my/", get(my_startups))
        .route("/api/startups/my/interests/", get(my_interests))
        .route(
            "/api/startups/{id}/",
            get(get_startup).patch(update_startup).delete(delete_startup),
        )
        .route(
            "/api/startups/{id}/interest/",
            post(express_interest).delete(withdraw_interest),
        )
        .route("/api/startups/{id}/interests/", get(startup_interests))
        .with_state(api)
}

type Api = State<Arc<MockApi>>;

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn token_not_valid() -> Response {
    reply(
        StatusCode::UNAUTHORIZED,
        json!({"detail": "Given token not valid for any token type", "code": "token_not_valid"}),
    )
}

fn not_found() -> Response {
    reply(StatusCode::NOT_FOUND, json!({"detail": "Not found."}))
}

fn forbidden(detail: &str) -> Response {
    reply(StatusCode::FORBIDDEN, json!({"detail": detail}))
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn page_param(query: &HashMap<String, String>) -> usize {
    query
        .get("page")
        .and_then(|p| p.parse().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

fn str_field(body: &Value, key: &str) -> Option<String> {
    body.get(key).and_then(Value::as_str).map(str::to_string)
}

macro_rules! authed {
    ($api:expr, $headers:expr) => {
        match $api.authenticate(&$headers) {
            Ok(user) => user,
            Err(response) => return response,
        }
    };
}

async fn health(State(api): Api) -> Response {
    api.health_calls.fetch_add(1, Ordering::SeqCst);
    let delay = api.health_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    reply(
        StatusCode::OK,
        json!({"status": "ok", "message": "Startup Platform API is running", "version": "1.0.0"}),
    )
}

async fn register(State(api): Api, Json(body): Json<Value>) -> Response {
    let email = str_field(&body, "email").unwrap_or_default().to_lowercase();
    let password = str_field(&body, "password").unwrap_or_default();
    let mut errors = serde_json::Map::new();

    if email.is_empty() {
        errors.insert("email".into(), json!(["This field is required."]));
    } else if api.users.lock().unwrap().values().any(|u| u.email == email) {
        errors.insert(
            "email".into(),
            json!(["user with this email already exists."]),
        );
    }
    if Some(password.as_str()) != body.get("password_confirm").and_then(Value::as_str) {
        errors.insert("password".into(), json!(["Password fields didn't match."]));
    }
    if !errors.is_empty() {
        return reply(StatusCode::BAD_REQUEST, Value::Object(errors));
    }

    let role = str_field(&body, "role").unwrap_or_else(|| "talent".into());
    let id = api.seed_user(&email, &password, &role);
    if let Some(name) = str_field(&body, "full_name") {
        if let Some(user) = api.users.lock().unwrap().get_mut(&id) {
            user.full_name = name;
        }
    }

    let tokens = api.issue_tokens(id);
    let user = api.users.lock().unwrap().get(&id).cloned().unwrap();
    reply(
        StatusCode::CREATED,
        json!({
            "user": api.user_json(&user),
            "tokens": {"access": tokens.access, "refresh": tokens.refresh},
            "message": "User registered successfully!",
        }),
    )
}

async fn login(State(api): Api, Json(body): Json<Value>) -> Response {
    let email = str_field(&body, "email").unwrap_or_default();
    let password = str_field(&body, "password").unwrap_or_default();
    let user = api
        .users
        .lock()
        .unwrap()
        .values()
        .find(|u| u.email == email && u.password == password)
        .cloned();

    let Some(user) = user else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"error": {"non_field_errors": ["Invalid email or password."]}}),
        );
    };

    let tokens = api.issue_tokens(user.id);
    reply(
        StatusCode::OK,
        json!({
            "user": api.user_json(&user),
            "tokens": {"access": tokens.access, "refresh": tokens.refresh},
            "message": "Login successful!",
        }),
    )
}

async fn refresh(State(api): Api, Json(body): Json<Value>) -> Response {
    api.refresh_calls.fetch_add(1, Ordering::SeqCst);
    let delay = api.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if api.fail_refresh.load(Ordering::SeqCst) {
        return token_not_valid();
    }
    let presented = str_field(&body, "refresh").unwrap_or_default();
    let user_id = api.refresh_tokens.lock().unwrap().get(&presented).copied();
    match user_id {
        Some(user_id) => reply(StatusCode::OK, json!({"access": api.mint_access(user_id)})),
        None => token_not_valid(),
    }
}

async fn me(State(api): Api, headers: HeaderMap) -> Response {
    let user = authed!(api, headers);
    reply(StatusCode::OK, api.user_json(&user))
}

async fn update_me(State(api): Api, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = authed!(api, headers);
    let updated = {
        let mut users = api.users.lock().unwrap();
        let Some(stored) = users.get_mut(&user.id) else {
            return not_found();
        };
        if let Some(name) = str_field(&body, "full_name") {
            stored.full_name = name;
        }
        if let Some(bio) = str_field(&body, "bio") {
            stored.bio = Some(bio);
        }
        if let Some(url) = str_field(&body, "avatar_url") {
            stored.avatar_url = Some(url);
        }
        if let Some(skills) = body.get("skills").and_then(Value::as_array) {
            stored.skills = skills
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
        }
        stored.clone()
    };

    reply(
        StatusCode::OK,
        json!({"user": api.user_json(&updated), "message": "Profile updated successfully!"}),
    )
}

async fn list_users(
    State(api): Api,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    authed!(api, headers);
    let mut users: Vec<MockUser> = api.users.lock().unwrap().values().cloned().collect();
    users.sort_by(|a, b| a.email.cmp(&b.email));

    let items = users
        .iter()
        .filter(|u| query.get("role").map_or(true, |r| &u.role == r))
        .map(|u| api.user_json(u))
        .collect();
    reply(
        StatusCode::OK,
        api.paginate("/auth/users/", items, page_param(&query)),
    )
}

async fn get_user(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    authed!(api, headers);
    let user = api.users.lock().unwrap().get(&id).cloned();
    match user {
        Some(user) => reply(StatusCode::OK, api.user_json(&user)),
        None => not_found(),
    }
}

async fn list_startups(
    State(api): Api,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let viewer = authed!(api, headers);
    let startups = api.startups.lock().unwrap().clone();

    let items = startups
        .iter()
        .filter(|s| {
            query
                .get("industry")
                .map_or(true, |i| s.industry.as_ref() == Some(i))
        })
        .filter(|s| query.get("stage").map_or(true, |st| s.stage.as_ref() == Some(st)))
        .filter(|s| {
            query
                .get("owner_id")
                .map_or(true, |o| s.owner_id.to_string() == *o)
        })
        .map(|s| api.startup_json(s, Some(viewer.id)))
        .collect();
    reply(
        StatusCode::OK,
        api.paginate("/startups/", items, page_param(&query)),
    )
}

async fn create_startup(State(api): Api, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = authed!(api, headers);
    if user.role != "founder" {
        return forbidden("Only founders can create startups.");
    }
    let name = str_field(&body, "name").unwrap_or_default();
    if name.trim().is_empty() {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"name": ["This field may not be blank."]}),
        );
    }

    let id = api.seed_startup(user.id, &name);
    let startup = {
        let mut startups = api.startups.lock().unwrap();
        let Some(stored) = startups.iter_mut().find(|s| s.id == id) else {
            return not_found();
        };
        stored.description = str_field(&body, "description");
        stored.industry = str_field(&body, "industry");
        stored.stage = str_field(&body, "stage");
        stored.website = str_field(&body, "website");
        stored.clone()
    };

    reply(
        StatusCode::CREATED,
        json!({
            "startup": api.startup_json(&startup, Some(user.id)),
            "message": "Startup created successfully!",
        }),
    )
}

async fn my_startups(State(api): Api, headers: HeaderMap) -> Response {
    let user = authed!(api, headers);
    let startups = api.startups.lock().unwrap().clone();
    let items: Vec<Value> = startups
        .iter()
        .filter(|s| s.owner_id == user.id)
        .map(|s| api.startup_json(s, Some(user.id)))
        .collect();
    reply(StatusCode::OK, Value::Array(items))
}

async fn get_startup(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    let user = authed!(api, headers);
    match api.find_startup(id) {
        Some(startup) => reply(StatusCode::OK, api.startup_json(&startup, Some(user.id))),
        None => not_found(),
    }
}

async fn update_startup(
    State(api): Api,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    let user = authed!(api, headers);
    let updated = {
        let mut startups = api.startups.lock().unwrap();
        let Some(stored) = startups.iter_mut().find(|s| s.id == id) else {
            return not_found();
        };
        if stored.owner_id != user.id {
            return forbidden("You do not have permission to perform this action.");
        }
        if let Some(name) = str_field(&body, "name") {
            stored.name = name;
        }
        if let Some(description) = str_field(&body, "description") {
            stored.description = Some(description);
        }
        if let Some(industry) = str_field(&body, "industry") {
            stored.industry = Some(industry);
        }
        if let Some(stage) = str_field(&body, "stage") {
            stored.stage = Some(stage);
        }
        if let Some(website) = str_field(&body, "website") {
            stored.website = Some(website);
        }
        stored.clone()
    };

    reply(
        StatusCode::OK,
        json!({
            "startup": api.startup_json(&updated, Some(user.id)),
            "message": "Startup updated successfully!",
        }),
    )
}

async fn delete_startup(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    let user = authed!(api, headers);
    {
        let mut startups = api.startups.lock().unwrap();
        let Some(position) = startups.iter().position(|s| s.id == id) else {
            return not_found();
        };
        if startups[position].owner_id != user.id {
            return forbidden("You do not have permission to perform this action.");
        }
        startups.remove(position);
    }
    api.interests.lock().unwrap().retain(|i| i.startup_id != id);

    reply(
        StatusCode::OK,
        json!({"message": "Startup deleted successfully!"}),
    )
}

async fn express_interest(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    let user = authed!(api, headers);
    if user.role != "talent" {
        return forbidden("Only talent users can perform this action.");
    }
    if api.find_startup(id).is_none() {
        return not_found();
    }

    let interest = {
        let mut interests = api.interests.lock().unwrap();
        if interests
            .iter()
            .any(|i| i.startup_id == id && i.user_id == user.id)
        {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"message": "You have already expressed interest in this startup."}),
            );
        }
        let interest = MockInterest {
            id: Uuid::new_v4(),
            user_id: user.id,
            startup_id: id,
            created_at: now(),
        };
        interests.push(interest.clone());
        interest
    };

    reply(StatusCode::CREATED, api.interest_json(&interest))
}

async fn withdraw_interest(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    let user = authed!(api, headers);
    if user.role != "talent" {
        return forbidden("Only talent users can perform this action.");
    }
    if api.find_startup(id).is_none() {
        return not_found();
    }

    let mut interests = api.interests.lock().unwrap();
    let Some(position) = interests
        .iter()
        .position(|i| i.startup_id == id && i.user_id == user.id)
    else {
        return reply(
            StatusCode::BAD_REQUEST,
            json!({"message": "You have not expressed interest in this startup."}),
        );
    };
    interests.remove(position);

    reply(
        StatusCode::OK,
        json!({"message": "Interest withdrawn successfully!"}),
    )
}

async fn startup_interests(State(api): Api, headers: HeaderMap, Path(id): Path<Uuid>) -> Response {
    let user = authed!(api, headers);
    let Some(startup) = api.find_startup(id) else {
        return not_found();
    };
    if startup.owner_id != user.id {
        return forbidden("You do not have permission to perform this action.");
    }

    let interests = api.interests.lock().unwrap().clone();
    let items = interests
        .iter()
        .filter(|i| i.startup_id == id)
        .map(|i| api.interest_json(i))
        .collect();
    reply(StatusCode::OK, api.paginate(&format!("/startups/{id}/interests/"), items, 1))
}

async fn my_interests(State(api): Api, headers: HeaderMap) -> Response {
    let user = authed!(api, headers);
    if user.role != "talent" {
        return forbidden("Only talent users can perform this action.");
    }

    let interests = api.interests.lock().unwrap().clone();
    let items: Vec<Value> = interests
        .iter()
        .filter(|i| i.user_id == user.id)
        .map(|i| api.interest_json(i))
        .collect();
    reply(StatusCode::OK, Value::Array(items))
}
