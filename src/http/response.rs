use crate::error::ServerError;
use serde_json::Value;
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
    pub content_type: String,
    pub headers: HashMap<String, String>,
}

impl Response {
    pub fn new<T: AsRef<str>>(body: T, status: u16, content_type: &str) -> Response {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), content_type.to_string());
        Response {
            status,
            body: body.as_ref().to_string(),
            content_type: content_type.to_string(),
            headers,
        }
    }

    pub fn text<T: AsRef<str>>(content: T) -> Response {
        Response::new(content, 200, "text/plain")
    }

    // Chainable status setter
    pub fn status(&mut self, status: u16) -> &mut Self {
        self.status = status;
        self
    }

    pub fn set_header<K: AsRef<str>, V: AsRef<str>>(&mut self, name: K, value: V) -> &mut Self {
        self.headers
            .insert(name.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Only one `Set-Cookie` header is kept; a later cookie replaces it.
    pub fn set_cookie(&mut self, name: &str, value: &str) -> &mut Self {
        self.set_header("Set-Cookie", format!("{}={}", name, value))
    }

    /// Points the client at `url`, which is used exactly as given.
    pub fn redirect(&mut self, url: &str, permanent: bool) -> &mut Self {
        self.status = if permanent { 301 } else { 302 };
        self.set_header("Location", url)
    }

    pub fn error(err: ServerError) -> Response {
        let status = err.status_code();
        let body = serde_json::json!({
            "error": {
                "message": err.to_string(),
                "status": status
            }
        });
        JsonResponse::new(body, status).into()
    }
}

impl Default for Response {
    fn default() -> Self {
        Response::new("", 200, "text/plain")
    }
}

/// A response whose body is the JSON text of `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonResponse {
    response: Response,
    pub data: Value,
}

impl JsonResponse {
    pub fn new(data: Value, status: u16) -> JsonResponse {
        JsonResponse {
            response: Response::new(data.to_string(), status, "application/json"),
            data,
        }
    }

    pub fn ok(data: Value) -> JsonResponse {
        JsonResponse::new(data, 200)
    }
}

impl Deref for JsonResponse {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.response
    }
}

impl DerefMut for JsonResponse {
    fn deref_mut(&mut self) -> &mut Response {
        &mut self.response
    }
}

impl From<JsonResponse> for Response {
    fn from(json: JsonResponse) -> Response {
        json.response
    }
}

/// A response whose body is sent to the browser exactly as supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct HtmlResponse {
    response: Response,
}

impl HtmlResponse {
    pub fn new<T: AsRef<str>>(html: T, status: u16) -> HtmlResponse {
        HtmlResponse {
            response: Response::new(html, status, "text/html"),
        }
    }

    pub fn ok<T: AsRef<str>>(html: T) -> HtmlResponse {
        HtmlResponse::new(html, 200)
    }
}

impl Deref for HtmlResponse {
    type Target = Response;

    fn deref(&self) -> &Response {
        &self.response
    }
}

impl DerefMut for HtmlResponse {
    fn deref_mut(&mut self) -> &mut Response {
        &mut self.response
    }
}

impl From<HtmlResponse> for Response {
    fn from(html: HtmlResponse) -> Response {
        html.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_response_carries_content_type_header() {
        let res = Response::new("hello", 201, "text/plain");
        assert_eq!(res.status, 201);
        assert_eq!(res.get_header("Content-Type"), Some("text/plain"));
    }

    #[test]
    fn redirect_keeps_url_verbatim() {
        let mut res = Response::text("");
        res.redirect("//evil.example/phish", false);
        assert_eq!(res.status, 302);
        assert_eq!(res.get_header("Location"), Some("//evil.example/phish"));

        res.redirect("/home", true);
        assert_eq!(res.status, 301);
        assert_eq!(res.get_header("Location"), Some("/home"));
    }

    #[test]
    fn later_cookie_replaces_earlier() {
        let mut res = Response::default();
        res.set_cookie("a", "1").set_cookie("b", "2");
        assert_eq!(res.get_header("Set-Cookie"), Some("b=2"));
    }

    #[test]
    fn json_response_keeps_data() {
        let res = JsonResponse::new(json!({"users": []}), 200);
        assert_eq!(res.data, json!({"users": []}));
        assert_eq!(res.body, r#"{"users":[]}"#);
        assert_eq!(res.content_type, "application/json");
    }

    #[test]
    fn html_response_is_not_escaped() {
        let res = HtmlResponse::new("<script>alert(1)</script>", 200);
        assert_eq!(res.body, "<script>alert(1)</script>");
        assert_eq!(res.get_header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn error_response_uses_status_code() {
        let res = Response::error(ServerError::NotFound);
        assert_eq!(res.status, 404);
        assert!(res.body.contains("Not found"));

        let res = Response::error(ServerError::Unauthorized("missing token".to_string()));
        assert_eq!(res.status, 401);
        assert_eq!(res.content_type, "application/json");
        assert!(res.body.contains("missing token"));
    }

    #[test]
    fn status_setter_chains() {
        let mut res = Response::text("gone");
        res.status(410).set_header("X-Reason", "expired");
        assert_eq!(res.status, 410);
        assert_eq!(res.get_header("X-Reason"), Some("expired"));
        assert_eq!(res.body, "gone");
    }
}
