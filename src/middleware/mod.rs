//! Middleware registration.
//!
//! Middleware are collected in registration order and kept on the
//! application, but dispatch calls the matched handler directly: nothing in
//! this list runs unless a caller drives it through [`MiddlewareManager::call`].

use crate::handler::{Handler, HttpResponse};
use crate::http::Request;

/// The rest of the chain, handed to a middleware.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    handler: &'a dyn Handler,
}

impl<'a> Next<'a> {
    pub fn new(handler: &'a dyn Handler) -> Self {
        Self { handler }
    }

    pub fn run(&self, req: Request) -> HttpResponse {
        self.handler.handle(req)
    }
}

pub trait Middleware: 'static {
    fn call(&self, req: Request, next: Next<'_>) -> HttpResponse;
}

impl<F> Middleware for F
where
    F: Fn(Request, Next<'_>) -> HttpResponse + 'static,
{
    fn call(&self, req: Request, next: Next<'_>) -> HttpResponse {
        (self)(req, next)
    }
}

#[derive(Default)]
pub struct MiddlewareManager {
    middlewares: Vec<Box<dyn Middleware>>,
}

impl MiddlewareManager {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware>(&mut self, middleware: M) {
        self.middlewares.push(Box::new(middleware));
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Runs `req` through the chain in registration order, ending at `handler`.
    pub fn call(&self, req: Request, handler: &dyn Handler) -> HttpResponse {
        self.call_from(0, req, handler)
    }

    fn call_from(&self, index: usize, req: Request, handler: &dyn Handler) -> HttpResponse {
        match self.middlewares.get(index) {
            None => handler.handle(req),
            Some(middleware) => {
                let rest = |req: Request| self.call_from(index + 1, req, handler);
                middleware.call(req, Next::new(&rest))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;

    #[test]
    fn chain_runs_in_registration_order() {
        let mut manager = MiddlewareManager::new();
        manager.add(|req: Request, next: Next<'_>| -> HttpResponse {
            let mut res = next.run(req)?;
            res.body.push_str(" outer");
            Ok(res)
        });
        manager.add(|req: Request, next: Next<'_>| -> HttpResponse {
            let mut res = next.run(req)?;
            res.body.push_str(" inner");
            Ok(res)
        });
        assert_eq!(manager.len(), 2);

        let handler = |_req: Request| Response::text("handler");
        let res = manager.call(Request::default(), &handler).unwrap();
        assert_eq!(res.body, "handler inner outer");
    }

    #[test]
    fn middleware_can_short_circuit() {
        let mut manager = MiddlewareManager::new();
        manager.add(|_req: Request, _next: Next<'_>| -> HttpResponse {
            Ok(Response::new("blocked", 403, "text/plain"))
        });

        let handler = |_req: Request| -> Response { panic!("handler must not run") };
        let res = manager.call(Request::default(), &handler).unwrap();
        assert_eq!(res.status, 403);
    }
}
