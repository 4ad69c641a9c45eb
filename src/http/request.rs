use crate::error::ServerResult;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

#[derive(Eq, Hash, PartialEq, PartialOrd, Ord, Copy, Clone, Debug)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    HEAD,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    /// Parses a method name case-insensitively. Unknown names yield `None`.
    pub fn from_string(s: &str) -> Option<Method> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "CONNECT" => Some(Method::CONNECT),
            "OPTIONS" => Some(Method::OPTIONS),
            "TRACE" => Some(Method::TRACE),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file attached to a multipart field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub content: String,
}

/// Read-only snapshot of an incoming request.
///
/// Every accessor hands back the client's bytes as they arrived. Nothing is
/// escaped, trimmed or validated; missing keys fall back to the caller's
/// default instead of failing.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    remote_addr: String,
    query: HashMap<String, String>,
    headers: HashMap<String, String>,
    form: HashMap<String, String>,
    cookies: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
    params: HashMap<String, String>,
    body: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            method: Method::GET,
            path: "/".to_string(),
            remote_addr: "127.0.0.1".to_string(),
            query: HashMap::new(),
            headers: HashMap::new(),
            form: HashMap::new(),
            cookies: HashMap::new(),
            files: HashMap::new(),
            params: HashMap::new(),
            body: String::new(),
        }
    }
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Builds a request from an environ-style JSON object with the keys
    /// `method`, `path`, `remote_addr`, `body`, `headers`, `query_params`,
    /// `form_data`, `cookies` and `files`. Absent or mistyped keys keep
    /// their defaults. A `method` that is not a known [`Method`] leaves the
    /// request as `GET`; the raw string is not kept.
    pub fn from_environ(environ: &Value) -> Request {
        let mut builder = RequestBuilder::new();
        let Some(environ) = environ.as_object() else {
            return builder.build();
        };

        if let Some(method) = environ.get("method").and_then(Value::as_str) {
            builder.method_str(method);
        }
        if let Some(path) = environ.get("path").and_then(Value::as_str) {
            builder.path(path);
        }
        if let Some(addr) = environ.get("remote_addr").and_then(Value::as_str) {
            builder.remote_addr(addr);
        }
        match environ.get("body") {
            Some(Value::String(body)) => {
                builder.body(body);
            }
            Some(Value::Null) | None => {}
            Some(other) => {
                builder.body(other.to_string());
            }
        }
        for (name, value) in string_pairs(environ.get("headers")) {
            builder.header(name, value);
        }
        for (name, value) in string_pairs(environ.get("query_params")) {
            builder.query_param(name, value);
        }
        for (name, value) in string_pairs(environ.get("form_data")) {
            builder.form_field(name, value);
        }
        for (name, value) in string_pairs(environ.get("cookies")) {
            builder.cookie(name, value);
        }
        if let Some(files) = environ.get("files").and_then(Value::as_object) {
            for (field, info) in files {
                if let Ok(file) = serde_json::from_value::<UploadedFile>(info.clone()) {
                    builder.file(field, file);
                }
            }
        }
        builder.build()
    }

    pub fn get_query_param(&self, name: &str, default: &str) -> String {
        lookup(&self.query, name, default)
    }

    pub fn get_all_query_params(&self) -> HashMap<String, String> {
        self.query.clone()
    }

    pub fn get_header(&self, name: &str, default: &str) -> String {
        lookup(&self.headers, &name.to_lowercase(), default)
    }

    /// Decodes the body as JSON. An empty body decodes to an empty object;
    /// malformed JSON is returned as an error.
    pub fn get_json_body(&self) -> ServerResult<Value> {
        if self.body.is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn get_raw_body(&self) -> &str {
        &self.body
    }

    pub fn get_form_field(&self, name: &str, default: &str) -> String {
        lookup(&self.form, name, default)
    }

    pub fn get_cookie(&self, name: &str, default: &str) -> String {
        lookup(&self.cookies, name, default)
    }

    pub fn get_uploaded_filename(&self, field: &str) -> String {
        self.files
            .get(field)
            .map(|file| file.filename.clone())
            .unwrap_or_default()
    }

    /// Segment captured by a `<name>` placeholder in the matched route.
    pub fn get_path_param(&self, name: &str, default: &str) -> String {
        lookup(&self.params, name, default)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Request {
        self.params = params;
        self
    }
}

fn lookup(map: &HashMap<String, String>, key: &str, default: &str) -> String {
    map.get(key).cloned().unwrap_or_else(|| default.to_string())
}

fn string_pairs(value: Option<&Value>) -> Vec<(String, String)> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Debug, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            request: Request::default(),
        }
    }

    pub fn method(&mut self, method: Method) -> &mut Self {
        self.request.method = method;
        self
    }

    /// Unknown method names leave the current method in place.
    pub fn method_str(&mut self, method: &str) -> &mut Self {
        if let Some(method) = Method::from_string(method) {
            self.request.method = method;
        }
        self
    }

    pub fn path<T: AsRef<str>>(&mut self, path: T) -> &mut Self {
        self.request.path = path.as_ref().to_string();
        self
    }

    pub fn remote_addr<T: AsRef<str>>(&mut self, addr: T) -> &mut Self {
        self.request.remote_addr = addr.as_ref().to_string();
        self
    }

    pub fn header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.request
            .headers
            .insert(name.as_ref().to_lowercase(), value.as_ref().to_string());
        self
    }

    pub fn query_param<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.request
            .query
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Adds every pair of a raw `a=1&b=2` query string, percent-decoded.
    pub fn query_string(&mut self, query: &str) -> &mut Self {
        self.request.query.extend(parse_urlencoded(query));
        self
    }

    pub fn form_field<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.request
            .form
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Sets the body and also fills the form fields from it, as a
    /// transport would for `application/x-www-form-urlencoded`.
    pub fn form_urlencoded(&mut self, body: &str) -> &mut Self {
        self.request.form.extend(parse_urlencoded(body));
        self.request.body = body.to_string();
        self
    }

    pub fn cookie<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.request
            .cookies
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    pub fn file<K: AsRef<str>>(&mut self, field: K, file: UploadedFile) -> &mut Self {
        self.request.files.insert(field.as_ref().to_string(), file);
        self
    }

    pub fn body<T: AsRef<str>>(&mut self, body: T) -> &mut Self {
        self.request.body = body.as_ref().to_string();
        self
    }

    pub fn build(&mut self) -> Request {
        std::mem::take(&mut self.request)
    }
}

fn parse_urlencoded(data: &str) -> HashMap<String, String> {
    data.split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}
