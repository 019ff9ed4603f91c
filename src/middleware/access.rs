//! Route guard applied with `wrap = "AccessGate::admin()"`.
//!
//! Runs after [`ClientCtx`] has resolved the caller and before any extractor,
//! so a rejected request never has its body parsed.

use super::ClientCtx;
use actix_web::body::EitherBody;
use actix_web::dev::{self, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Requirement {
    Login,
    Admin,
}

#[derive(Clone, Copy, Debug)]
pub struct AccessGate(Requirement);

impl AccessGate {
    /// Any logged-in user.
    pub fn login() -> Self {
        Self(Requirement::Login)
    }

    /// Logged-in users with the admin flag.
    pub fn admin() -> Self {
        Self(Requirement::Admin)
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware {
            service: Rc::new(service),
            requirement: self.0,
        }))
    }
}

pub struct AccessGateMiddleware<S> {
    service: Rc<S>,
    requirement: Requirement,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = {
            let client = ClientCtx::from_extensions(req.request());
            match self.requirement {
                Requirement::Login => client.require_login().map(|_| ()),
                Requirement::Admin => client.require_admin().map(|_| ()),
            }
        };

        if let Err(err) = verdict {
            log::debug!("Access denied to {}: {}", req.path(), err);
            let res = req.into_response(err.error_response());
            return Box::pin(async move { Ok(res.map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
