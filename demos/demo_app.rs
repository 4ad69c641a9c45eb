//! Demo application for QuickAPI
//!
//! Wires a handful of handlers over the framework's collaborators and drives
//! a few requests through `dispatch`. Each handler passes request data
//! straight into a sink, which is exactly what the framework allows.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use quickapi::app::{DEFAULT_HOST, DEFAULT_PORT};
use quickapi::cache::JsonCache;
use quickapi::{
    json, Application, DataTransformer, DatabaseConnection, HtmlResponse, JsonResponse,
    QueryBuilder, Request, Response, Sanitizer, ServerError, ServerResult, SystemHelper,
    TemplateEngine, TokenValidator, Value,
};
use std::rc::Rc;

const PROFILE_TEMPLATE: &str = "<h1>{{username}}</h1><p>{{bio}}</p>";
const DASHBOARD_TEMPLATE: &str = "<h1>Welcome back, {{username}}</h1><p>{{stats}}</p>";

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {l} {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Debug))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn search_users(req: Request, db: &DatabaseConnection) -> ServerResult<JsonResponse> {
    let name = req.get_query_param("name", "");
    let sql = format!("SELECT * FROM users WHERE username LIKE '%{}%'", name);
    let users = db.execute_query(&sql, [])?;
    Ok(JsonResponse::ok(json!({ "users": users })))
}

fn get_user_profile(
    req: Request,
    db: &DatabaseConnection,
    templates: &TemplateEngine,
) -> ServerResult<Response> {
    let user_id = req.get_path_param("user_id", "");
    let sql = QueryBuilder::new("users")
        .select(&["username", "bio"])
        .where_raw(format!("id = {}", user_id))
        .limit(1)
        .build();
    let rows = db.execute_query(&sql, [])?;
    let Some(user) = rows.into_iter().next() else {
        return Ok(JsonResponse::new(json!({ "error": "not found" }), 404).into());
    };
    Ok(HtmlResponse::ok(templates.render_string(PROFILE_TEMPLATE, &user)).into())
}

fn update_profile(req: Request, db: &DatabaseConnection) -> ServerResult<JsonResponse> {
    let body = req.get_json_body()?;
    let bio = body.get("bio").and_then(Value::as_str).unwrap_or("");
    let cleaned = Sanitizer::strip_tags(bio);
    let user_id = req.get_path_param("user_id", "");
    let sql = format!("UPDATE users SET bio = '{}' WHERE id = {}", cleaned, user_id);
    db.execute_update(&sql, [])?;
    Ok(JsonResponse::ok(json!({ "status": "updated" })))
}

fn admin_diagnostics(req: Request) -> ServerResult<JsonResponse> {
    let host = req.get_query_param("host", "");
    let output = SystemHelper::ping_host(&host)?;
    Ok(JsonResponse::ok(json!({ "ping_result": output })))
}

fn download_report(req: Request) -> ServerResult<Response> {
    let filename = req.get_query_param("filename", "");
    let content = SystemHelper::read_file(format!("reports/{}", filename))?;
    Ok(Response::new(content, 200, "text/plain"))
}

fn render_dashboard(req: Request, templates: &TemplateEngine, cache: &JsonCache) -> HtmlResponse {
    let username = req.get_cookie("username", "guest");
    let stats = cache.get_or_compute(format!("stats:{}", username), || {
        json!({ "visits": 1, "user": username })
    });
    let context = DataTransformer::merge_dicts(
        &json_map(json!({ "username": "guest" })),
        &json_map(json!({ "username": username, "stats": stats })),
    );
    HtmlResponse::ok(templates.render_string(DASHBOARD_TEMPLATE, &context))
}

fn login(req: Request, db: &DatabaseConnection, validator: &TokenValidator) -> ServerResult<JsonResponse> {
    let token = req.get_header("Authorization", "");
    if token.is_empty() {
        return Err(ServerError::Unauthorized("missing token".to_string()));
    }
    let claims = validator.decode_token(&token);
    let username = claims
        .get("preferred_username")
        .map(DataTransformer::stringify)
        .unwrap_or_default();
    let sql = format!("SELECT * FROM users WHERE username = '{}'", username);
    let results = db.execute_query(&sql, [])?;
    Ok(match results.into_iter().next() {
        Some(user) => JsonResponse::ok(json!({ "user": user })),
        None => JsonResponse::new(json!({ "error": "not found" }), 404),
    })
}

fn json_map(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let mut app = Application::new("demo-app");
    app.debug(true);

    let db = Rc::new(DatabaseConnection::new(":memory:"));
    db.connect()?;
    db.execute_raw(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, username TEXT, bio TEXT);
         INSERT INTO users (username, bio) VALUES ('alice', 'likes rust');
         INSERT INTO users (username, bio) VALUES ('bob', 'likes sql');",
    )?;
    let templates = Rc::new(TemplateEngine::default());
    let validator = Rc::new(TokenValidator::new("supersecret"));
    let cache = Rc::new(JsonCache::new());

    let handle = db.clone();
    app.get("/api/users/search", move |req| search_users(req, &handle));

    let (handle, engine) = (db.clone(), templates.clone());
    app.get("/api/users/<user_id>", move |req| get_user_profile(req, &handle, &engine));

    let handle = db.clone();
    app.post("/api/users/<user_id>", move |req| update_profile(req, &handle));

    app.get("/admin/diagnostics", admin_diagnostics);
    app.get("/reports/download", download_report);

    let (engine, store) = (templates.clone(), cache.clone());
    app.get("/dashboard", move |req| render_dashboard(req, &engine, &store));

    let (handle, tokens) = (db.clone(), validator.clone());
    app.post("/auth/login", move |req| login(req, &handle, &tokens));

    for key in app.routes() {
        println!("route {}", key);
    }

    let requests = [
        ("GET", "/api/users/search", Request::builder().query_string("name=%27%20OR%20%271%27%3D%271").build()),
        ("GET", "/api/users/1", Request::builder().build()),
        ("POST", "/api/users/2", Request::builder().body(r#"{"bio": "<i>hi</i>"}"#).build()),
        ("GET", "/dashboard", Request::builder().cookie("username", "<b>eve</b>").build()),
        ("POST", "/auth/login", Request::builder().build()),
        ("GET", "/missing", Request::builder().build()),
    ];
    for (method, path, req) in requests {
        match app.dispatch(method, path, req) {
            Some(Ok(res)) => println!("{} {} -> {} {}", method, path, res.status, res.body),
            Some(Err(err)) => println!("{} {} -> error: {}", method, path, err),
            None => println!("{} {} -> no route", method, path),
        }
    }

    app.run(DEFAULT_HOST, DEFAULT_PORT);
    db.close()?;
    Ok(())
}
