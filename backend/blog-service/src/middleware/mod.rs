/// HTTP middleware utilities for blog-service
///
/// Provides bearer-token viewer resolution and request latency metrics.
/// Routes never reject guests here; write handlers ask for an
/// [`AuthenticatedUser`] instead.
use crate::error::AppError;
use crate::models::{Identity, Viewer};
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{http::header, Error, FromRequest, HttpMessage, HttpRequest, ResponseError};
use crypto_core::jwt;
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::time::Instant;

// =====================================================================
// JWT viewer resolution
// =====================================================================

/// Resolve the request's [`Viewer`] from an optional bearer token.
///
/// No `Authorization` header means a guest. A header that is present but not a
/// valid RS256 access token is rejected with 401.
pub struct JwtViewerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtViewerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtViewerMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtViewerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtViewerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtViewerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .map(|h| h.to_str().unwrap_or_default().to_string());

            let viewer = match auth_header {
                None => Viewer::Guest,
                Some(value) => match identity_from_header(&value) {
                    Ok(identity) => Viewer::User(identity),
                    Err(err) => {
                        let response = err.error_response();
                        return Ok(req.into_response(response).map_into_right_body());
                    }
                },
            };

            req.extensions_mut().insert(viewer);

            service.call(req).await.map(ServiceResponse::map_into_left_body)
        })
    }
}

/// Validate a raw `Authorization` header value into an identity.
pub fn identity_from_header(value: &str) -> Result<Identity, AppError> {
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".to_string()))?;

    let claims = jwt::validate_token(token).map_err(|err| {
        tracing::debug!(error = %err, "rejected bearer token");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let id = claims
        .claims
        .user_id()
        .map_err(|_| AppError::Unauthorized("Invalid user ID".to_string()))?;

    Ok(Identity {
        id,
        username: claims.claims.username,
    })
}

/// Requests that bypassed [`JwtViewerMiddleware`] are guests.
impl FromRequest for Viewer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<Viewer>().cloned().unwrap_or_default()))
    }
}

/// Login-required extractor. Guests get 401.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let identity = match req.extensions().get::<Viewer>() {
            Some(Viewer::User(identity)) => Ok(AuthenticatedUser(identity.clone())),
            _ => Err(AppError::Unauthorized("Login required".to_string()).into()),
        };
        ready(identity)
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let path = req.path().to_string();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let status = match &res {
                Ok(response) => response.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };
            let elapsed = start.elapsed();

            crate::metrics::observe_request(&method, status, elapsed);
            tracing::debug!(
                %method,
                %path,
                status,
                elapsed_ms = elapsed.as_millis() as u64,
                "request completed"
            );
            res
        })
    }
}
