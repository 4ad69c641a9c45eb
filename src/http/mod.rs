pub(crate) mod request;
pub(crate) mod response;

pub use request::{Method, Request, RequestBuilder, UploadedFile};
pub use response::{HtmlResponse, JsonResponse, Response};
