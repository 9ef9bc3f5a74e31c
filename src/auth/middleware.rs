use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    http::header,
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse, ResponseError,
};
use futures::future::LocalBoxFuture;

use crate::{
    app_state::AppState,
    auth::{
        utils::{prefers_html, require_role, session_token},
        Claims,
    },
    errors::AppError,
    models::domain::user::UserRole,
};

const LOGIN_PATH: &str = "/auth/login";
const HOME_PATH: &str = "/";

/// Browsers are redirected, API clients get the JSON error body.
fn reject<B>(req: ServiceRequest, error: AppError, redirect_to: &str) -> ServiceResponse<EitherBody<B>> {
    let response = if prefers_html(req.headers()) {
        HttpResponse::Found()
            .insert_header((header::LOCATION, redirect_to))
            .finish()
    } else {
        error.error_response()
    };

    req.into_response(response).map_into_right_body()
}

/// Requires a valid session (bearer header or cookie) and stores its [`Claims`]
/// in the request extensions.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
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
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| ErrorInternalServerError("Application state not configured"))?;

            let Some(token) = session_token(req.request()) else {
                let error = AppError::Unauthorized("Authentication required".to_string());
                return Ok(reject(req, error, LOGIN_PATH));
            };

            let claims = match state.jwt_service.validate_token(&token) {
                Ok(claims) => claims,
                Err(error) => {
                    log::debug!("Rejected session token: {}", error);
                    return Ok(reject(req, error, LOGIN_PATH));
                }
            };

            req.extensions_mut().insert(claims);

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Limits a scope to the given roles. Must be nested inside [`AuthMiddleware`].
pub struct RoleGuard {
    allowed: Rc<Vec<UserRole>>,
}

impl RoleGuard {
    pub fn new(allowed: &[UserRole]) -> Self {
        Self {
            allowed: Rc::new(allowed.to_vec()),
        }
    }

    pub fn teachers() -> Self {
        Self::new(&[UserRole::Teacher, UserRole::Admin])
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed: Rc::clone(&self.allowed),
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    allowed: Rc<Vec<UserRole>>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let service = Rc::clone(&self.service);
        let allowed = Rc::clone(&self.allowed);

        Box::pin(async move {
            let claims = req.extensions().get::<Claims>().cloned();
            let verdict = match claims {
                None => Err((
                    AppError::Unauthorized("Authentication required".to_string()),
                    LOGIN_PATH,
                )),
                Some(claims) => require_role(&claims, &allowed).map_err(|error| {
                    log::info!(
                        "User '{}' with role '{}' denied access to {}",
                        claims.username,
                        claims.role,
                        req.path()
                    );
                    (error, HOME_PATH)
                }),
            };

            if let Err((error, redirect_to)) = verdict {
                return Ok(reject(req, error, redirect_to));
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Extractor for handlers behind [`AuthMiddleware`].
pub struct AuthenticatedUser(pub Claims);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let claims = req
            .extensions()
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()));

        ready(claims.map(AuthenticatedUser))
    }
}

/// Claims of the caller when a valid session is present, for public routes
/// whose behaviour depends on who is asking. Invalid tokens are ignored.
pub struct OptionalClaims(pub Option<Claims>);

impl FromRequest for OptionalClaims {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(claims) = req.extensions().get::<Claims>().cloned() {
            return ready(Ok(OptionalClaims(Some(claims))));
        }

        let claims = match (req.app_data::<web::Data<AppState>>(), session_token(req)) {
            (Some(state), Some(token)) => state.jwt_service.validate_token(&token).ok(),
            _ => None,
        };

        ready(Ok(OptionalClaims(claims)))
    }
}
