use crate::auth::{AuthContext, Authenticator};
use crate::web::error::ApiError;
use actix_web::body::EitherBody;
use actix_web::dev::{self, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web::Data, Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

/// Client context passed to routes.
/// Set once per request by the middleware half of this type. None is a guest.
#[derive(Clone, Debug, Default)]
pub struct ClientCtx(Option<AuthContext>);

impl ClientCtx {
    pub fn new(auth: Option<AuthContext>) -> Self {
        Self(auth)
    }

    /// Require user to be logged in.
    pub fn require_login(&self) -> Result<&AuthContext, ApiError> {
        self.0.as_ref().ok_or(ApiError::Unauthenticated)
    }

    /// Require an admin. Guests get 401, members 403.
    pub fn require_admin(&self) -> Result<&AuthContext, ApiError> {
        let auth = self.require_login()?;
        if auth.is_admin {
            Ok(auth)
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Pull the context stored by the middleware. Guest if it never ran.
    pub fn from_extensions(req: &HttpRequest) -> Self {
        req.extensions().get::<ClientCtx>().cloned().unwrap_or_default()
    }
}

/// This implementation is what actually provides the `client: ClientCtx` in the parameters of route functions.
impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(ClientCtx::from_extensions(req)))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Client context middleware
pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
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
        let svc = self.service.clone();

        Box::pin(async move {
            let authenticator = req.app_data::<Data<Arc<dyn Authenticator>>>().cloned();

            let auth = match authenticator {
                Some(authenticator) => {
                    let resolved = authenticator.authenticate(req.request()).await;
                    match resolved {
                        Ok(auth) => auth,
                        Err(err) => {
                            log::error!("Unable to resolve client in middleware: {}", err);
                            let res = req.into_response(ApiError::Internal.error_response());
                            return Ok(res.map_into_right_body());
                        }
                    }
                }
                None => {
                    log::warn!("No authenticator registered; request treated as guest");
                    None
                }
            };

            req.extensions_mut().insert(ClientCtx(auth));

            svc.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}
