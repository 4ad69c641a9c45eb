use crate::error::ServerResult;
use crate::http::{HtmlResponse, JsonResponse, Request, Response};

pub type HttpResponse = ServerResult<Response>;

pub trait IntoResponse {
    fn into_response(self) -> HttpResponse;
}

impl IntoResponse for Response {
    fn into_response(self) -> HttpResponse {
        Ok(self)
    }
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> HttpResponse {
        Ok(self.into())
    }
}

impl IntoResponse for HtmlResponse {
    fn into_response(self) -> HttpResponse {
        Ok(self.into())
    }
}

impl<T: IntoResponse> IntoResponse for ServerResult<T> {
    fn into_response(self) -> HttpResponse {
        self.and_then(IntoResponse::into_response)
    }
}

pub trait Handler {
    fn handle(&self, req: Request) -> HttpResponse;
}

impl<F, R> Handler for F
where
    F: Fn(Request) -> R,
    R: IntoResponse,
{
    fn handle(&self, req: Request) -> HttpResponse {
        (self)(req).into_response()
    }
}
