//! # QuickAPI
//!
//! A small, synchronous request-routing framework.
//!
//! ## Features
//!
//! - Method + path routing with `<name>` placeholder segments
//! - Request snapshots with default-valued accessors
//! - Plain, JSON and HTML responses
//! - A lazily connected SQLite handle and a fluent `SELECT` builder
//! - `{{key}}` template substitution
//! - Token decoding, string sanitizers, shell/file/log helpers
//! - Data transforms and an in-memory cache
//!
//! Nothing in the crate escapes data on the caller's behalf. Request values,
//! token claims and transform outputs are handed on exactly as received;
//! escaping, if any, is the handler's job.
//!
//! ## Quick Start
//!
//! ```rust
//! use quickapi::app::Application;
//! use quickapi::http::{HtmlResponse, Request};
//!
//! let mut app = Application::new("demo-app");
//! app.get("/greet", |req: Request| {
//!     HtmlResponse::ok(format!("<p>Hello {}</p>", req.get_query_param("name", "guest")))
//! });
//!
//! let req = Request::builder().query_param("name", "Ada").build();
//! let res = app.dispatch("GET", "/greet", req).unwrap().unwrap();
//! assert_eq!(res.body, "<p>Hello Ada</p>");
//! ```

pub mod app;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handler;
pub mod http;
pub mod middleware;
pub mod router;
pub mod security;
pub mod templating;
pub mod transform;
pub extern crate serde_json;

pub use app::Application;
pub use cache::CacheManager;
pub use database::{DatabaseConnection, QueryBuilder};
pub use error::{ServerError, ServerResult};
pub use http::{HtmlResponse, JsonResponse, Method, Request, Response};
pub use security::{Sanitizer, SystemHelper, TokenValidator};
pub use templating::TemplateEngine;
pub use transform::DataTransformer;

// Reexport serde_json
pub use serde_json::{json, Value};
