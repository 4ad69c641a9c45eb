//! Application is the main entry point for the framework.
//!
//! It owns the route table, the middleware list and the configuration, and
//! turns a `(method, path)` pair into a call of the registered handler.
//!
//! # Examples
//!
//! ```rust
//! use quickapi::app::Application;
//! use quickapi::http::{JsonResponse, Request};
//! use quickapi::json;
//!
//! let mut app = Application::new("demo-app");
//! app.get("/ping", |_req| JsonResponse::ok(json!({ "pong": true })));
//!
//! let res = app.dispatch("GET", "/ping", Request::default()).unwrap().unwrap();
//! assert_eq!(res.body, r#"{"pong":true}"#);
//! ```

use crate::config::Config;
use crate::handler::{HttpResponse, IntoResponse};
use crate::http::{Method, Request};
use crate::middleware::{Middleware, MiddlewareManager};
use crate::router::{RouteKey, Router};
use log::{debug, info, warn};
use serde_json::{Map, Value};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub struct Application {
    app_name: String,
    debug: bool,
    router: Router,
    middlewares: MiddlewareManager,
    config: Config,
}

impl Application {
    pub fn new<T: Into<String>>(app_name: T) -> Self {
        Self {
            app_name: app_name.into(),
            debug: false,
            router: Router::new(),
            middlewares: MiddlewareManager::new(),
            config: Config::new(),
        }
    }

    pub fn debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub fn name(&self) -> &str {
        &self.app_name
    }

    /// Registers `handler` for `(method, path)`. A later registration for
    /// the same pair replaces the earlier one.
    pub fn register<F, R>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.router.add(method, path, handler);
        self
    }

    /// Registers one handler under every method in `methods`; an empty
    /// slice registers it for `GET`.
    pub fn route<F, R>(&mut self, path: &str, methods: &[Method], handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + Clone + 'static,
        R: IntoResponse + 'static,
    {
        let methods = if methods.is_empty() {
            &[Method::GET][..]
        } else {
            methods
        };
        for method in methods {
            self.router.add(*method, path, handler.clone());
        }
        self
    }

    /// Registers a GET route handler
    pub fn get<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Method::GET, path, handler)
    }

    /// Registers a POST route handler
    pub fn post<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Method::POST, path, handler)
    }

    /// Registers a PUT route handler
    pub fn put<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Method::PUT, path, handler)
    }

    /// Registers a PATCH route handler
    pub fn patch<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Method::PATCH, path, handler)
    }

    /// Registers a DELETE route handler
    pub fn delete<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.register(Method::DELETE, path, handler)
    }

    /// Appends a middleware. Dispatch does not run the middleware list.
    pub fn add_middleware(&mut self, middleware: impl Middleware) -> &mut Self {
        self.middlewares.add(middleware);
        self
    }

    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    pub fn configure(&mut self, config: Map<String, Value>) -> &mut Self {
        self.config.update(config);
        self
    }

    pub fn get_config(&self, key: &str, default: Value) -> Value {
        self.config.get_or(key, default)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn routes(&self) -> Vec<RouteKey> {
        self.router.route_keys()
    }

    /// Calls the handler registered for `(method, path)`.
    ///
    /// Returns `None` when the method is unknown or nothing is registered
    /// for the pair. Errors raised by the handler are returned unchanged
    /// inside `Some`.
    pub fn dispatch(&self, method: &str, path: &str, request: Request) -> Option<HttpResponse> {
        let Some(parsed) = Method::from_string(method) else {
            warn!("[{}] unknown method {:?} for {}", self.app_name, method, path);
            return None;
        };
        let Some((route, params)) = self.router.resolve(parsed, path) else {
            debug!("[{}] no route for {}:{}", self.app_name, parsed, path);
            return None;
        };
        debug!("[{}] dispatching {}:{}", self.app_name, parsed, path);
        let request = if params.is_empty() {
            request
        } else {
            request.with_params(params)
        };
        Some(route.handle(request))
    }

    /// Logs the start line. There is no transport behind it.
    pub fn run(&self, host: &str, port: u16) {
        info!(
            "[{}] Starting on {}:{} (debug={})",
            self.app_name, host, port, self.debug
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServerError;
    use crate::handler::HttpResponse;
    use crate::http::{JsonResponse, Response};
    use crate::middleware::Next;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn dispatch_calls_registered_handler() {
        let mut app = Application::new("test");
        app.get("/hello", |req: Request| {
            Response::text(format!("hi {}", req.get_query_param("name", "")))
        });

        let req = Request::builder().query_param("name", "<b>bob</b>").build();
        let res = app.dispatch("GET", "/hello", req).unwrap().unwrap();
        assert_eq!(res.body, "hi <b>bob</b>");
    }

    #[test]
    fn method_is_case_insensitive() {
        let mut app = Application::new("test");
        app.post("/login", |_req| Response::text("ok"));
        assert!(app.dispatch("post", "/login", Request::default()).is_some());
    }

    #[test]
    fn unknown_route_or_method_is_none() {
        let mut app = Application::new("test");
        app.get("/a", |_req| Response::text("a"));

        assert!(app.dispatch("GET", "/b", Request::default()).is_none());
        assert!(app.dispatch("POST", "/a", Request::default()).is_none());
        assert!(app.dispatch("BREW", "/a", Request::default()).is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut app = Application::new("test");
        app.get("/v", |_req| Response::text("first"));
        app.get("/v", |_req| Response::text("second"));

        let res = app.dispatch("GET", "/v", Request::default()).unwrap().unwrap();
        assert_eq!(res.body, "second");
        assert_eq!(app.routes().len(), 1);
    }

    #[test]
    fn route_registers_each_method() {
        let mut app = Application::new("test");
        app.route("/items", &[Method::GET, Method::POST], |req: Request| {
            Response::text(req.method().as_str())
        });
        app.route("/default", &[], |_req: Request| Response::text("get"));

        let post = app.dispatch("POST", "/items", Request::default()).unwrap().unwrap();
        assert_eq!(post.body, "GET");
        assert!(app.dispatch("GET", "/default", Request::default()).is_some());
        assert!(app.dispatch("POST", "/default", Request::default()).is_none());
    }

    #[test]
    fn handler_errors_propagate() {
        let mut app = Application::new("test");
        app.post("/json", |req: Request| -> HttpResponse {
            let body = req.get_json_body()?;
            Ok(JsonResponse::ok(body).into())
        });

        let bad = Request::builder().body("{oops").build();
        let result = app.dispatch("POST", "/json", bad).unwrap();
        assert!(matches!(result, Err(ServerError::ParseError(_))));
    }

    #[test]
    fn placeholder_routes_expose_params() {
        let mut app = Application::new("test");
        app.get("/api/users/<user_id>", |req: Request| {
            Response::text(req.get_path_param("user_id", ""))
        });
        app.get("/api/users/me", |_req| Response::text("literal"));

        let res = app.dispatch("GET", "/api/users/17", Request::default()).unwrap().unwrap();
        assert_eq!(res.body, "17");
        let res = app.dispatch("GET", "/api/users/me", Request::default()).unwrap().unwrap();
        assert_eq!(res.body, "literal");
        let res = app
            .dispatch("GET", "/api/users/<user_id>", Request::default())
            .unwrap()
            .unwrap();
        assert_eq!(res.body, "<user_id>");
    }

    #[test]
    fn middleware_is_registered_but_not_run() {
        let calls = Rc::new(Cell::new(0));
        let mut app = Application::new("test");
        let seen = calls.clone();
        app.add_middleware(move |req: Request, next: Next<'_>| -> HttpResponse {
            seen.set(seen.get() + 1);
            next.run(req)
        });
        app.get("/", |_req| Response::text("root"));

        assert_eq!(app.middleware_count(), 1);
        let res = app.dispatch("GET", "/", Request::default()).unwrap().unwrap();
        assert_eq!(res.body, "root");
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn configuration_with_defaults() {
        let mut app = Application::new("test");
        app.debug(true);
        let Value::Object(config) = json!({"db_path": "app.db"}) else {
            unreachable!()
        };
        app.configure(config);

        assert!(app.is_debug());
        assert_eq!(app.name(), "test");
        assert_eq!(app.get_config("db_path", Value::Null), json!("app.db"));
        assert_eq!(app.get_config("missing", json!(5)), json!(5));
        assert_eq!(app.config().get("db_path"), Some(&json!("app.db")));
        assert_eq!(app.config().len(), 1);
        app.run(DEFAULT_HOST, DEFAULT_PORT);
    }
}
