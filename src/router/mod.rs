//! Route table.
//!
//! Routes are stored by path, then by method. A path segment written as
//! `<name>` is a placeholder: lookups try the literal path first and only
//! then walk the placeholder routes in the order they were registered.

use crate::handler::{Handler, HttpResponse, IntoResponse};
use crate::http::{Method, Request};
use log::debug;
use std::collections::HashMap;
use std::fmt;

pub(crate) struct Route {
    pub(crate) handler: Box<dyn Handler>,
}

impl Route {
    pub fn handle(&self, req: Request) -> HttpResponse {
        self.handler.handle(req)
    }
}

/// The `"<METHOD>:<path>"` identity of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.method, self.path)
    }
}

#[derive(Default)]
pub struct Router {
    pub(crate) routes: HashMap<String, HashMap<Method, Route>>,
    pub(crate) dynamic_routes: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            dynamic_routes: Vec::new(),
        }
    }

    pub fn get<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::GET, path, handler)
    }

    pub fn post<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::POST, path, handler)
    }

    pub fn put<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PUT, path, handler)
    }

    pub fn patch<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::PATCH, path, handler)
    }

    pub fn delete<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::DELETE, path, handler)
    }

    pub fn head<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::HEAD, path, handler)
    }

    pub fn options<F, R>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add(Method::OPTIONS, path, handler)
    }

    /// Registers `handler` for `(method, path)`, replacing any earlier one.
    pub fn add<F, R>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Request) -> R + 'static,
        R: IntoResponse + 'static,
    {
        self.add_boxed(method, path, Box::new(handler));
        self
    }

    pub(crate) fn add_boxed(&mut self, method: Method, path: &str, handler: Box<dyn Handler>) {
        if is_pattern(path) && !self.dynamic_routes.iter().any(|p| p == path) {
            self.dynamic_routes.push(path.to_string());
        }
        let replaced = self
            .routes
            .entry(path.to_string())
            .or_default()
            .insert(method, Route { handler })
            .is_some();
        debug!(
            "registered route {}:{}{}",
            method,
            path,
            if replaced { " (replaced)" } else { "" }
        );
    }

    /// Finds the route for `(method, path)` along with any captured
    /// placeholder segments.
    pub(crate) fn resolve(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(&Route, HashMap<String, String>)> {
        if let Some(route) = self.routes.get(path).and_then(|routes| routes.get(&method)) {
            // A pattern hit by its own text captures its placeholders verbatim.
            let params = match_dynamic_path(path, path).unwrap_or_default();
            return Some((route, params));
        }

        for pattern in &self.dynamic_routes {
            let Some(route) = self.routes.get(pattern).and_then(|routes| routes.get(&method)) else {
                continue;
            };
            if let Some(params) = match_dynamic_path(pattern, path) {
                return Some((route, params));
            }
        }
        None
    }

    pub fn contains(&self, method: Method, path: &str) -> bool {
        self.routes
            .get(path)
            .is_some_and(|routes| routes.contains_key(&method))
    }

    /// All registered keys, sorted.
    pub fn route_keys(&self) -> Vec<RouteKey> {
        let mut keys: Vec<RouteKey> = self
            .routes
            .iter()
            .flat_map(|(path, routes)| {
                routes.keys().map(move |method| RouteKey {
                    method: *method,
                    path: path.clone(),
                })
            })
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_pattern(path: &str) -> bool {
    path.split('/').any(|segment| placeholder_name(segment).is_some())
}

fn placeholder_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .filter(|name| !name.is_empty())
}

fn match_dynamic_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(name) = placeholder_name(pattern_part) {
            if path_part.is_empty() {
                return None;
            }
            params.insert(name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}
