use actix_http::Payload;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::{ErrorForbidden, ErrorUnauthorized},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::middleware::auth::Claims;
use crate::models::account::UserRole;

fn parse_role(role_str: &str) -> UserRole {
    match role_str {
        "admin" => UserRole::Admin,
        "driver" => UserRole::Driver,
        "user" => UserRole::User,
        other => {
            log::debug!("Unknown role in token: {}", other);
            UserRole::User
        }
    }
}

/// Admins pass every role gate; everyone else needs the exact role.
fn role_allows(claims: &Claims, required: UserRole) -> bool {
    match claims.role.as_deref() {
        Some(role_str) => {
            let user_role = parse_role(role_str);
            user_role == required || user_role == UserRole::Admin
        }
        None => false,
    }
}

pub struct RequireRole {
    required_role: UserRole,
}

impl RequireRole {
    pub fn new(role: UserRole) -> Self {
        RequireRole {
            required_role: role,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireRoleService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            required_role: self.required_role,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    required_role: UserRole,
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let required_role = self.required_role;

        // Clone the claims before checking
        let claims = req.extensions().get::<Claims>().cloned();

        if let Some(claims) = claims {
            if role_allows(&claims, required_role) {
                return Box::pin(self.service.call(req));
            }
            log::debug!(
                "Role check failed: required {:?}, token carried {:?}",
                required_role,
                claims.role
            );
            Box::pin(ready(Err(ErrorForbidden("Insufficient permissions"))))
        } else {
            Box::pin(ready(Err(ErrorUnauthorized("No authorization"))))
        }
    }
}

/// Extractor for driver-only handlers: the authenticated caller with the
/// driver (or admin) role.
#[derive(Clone)]
pub struct DriverIdentity {
    pub user_id: String,
    pub email: String,
}

impl FromRequest for DriverIdentity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        match claims {
            Some(claims) if role_allows(&claims, UserRole::Driver) => {
                ready(Ok(DriverIdentity {
                    user_id: claims.user_id,
                    email: claims.sub,
                }))
            }
            Some(_) => ready(Err(ErrorForbidden("Driver role required"))),
            None => ready(Err(ErrorUnauthorized("User not authenticated"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_with_role(role: Option<&str>) -> Claims {
        Claims {
            sub: "rider@example.com".to_string(),
            exp: 2_000_000_000,
            iat: 1_000_000_000,
            user_id: "64b000000000000000000000".to_string(),
            role: role.map(String::from),
        }
    }

    #[test]
    fn admin_passes_every_gate() {
        let claims = claims_with_role(Some("admin"));
        assert!(role_allows(&claims, UserRole::User));
        assert!(role_allows(&claims, UserRole::Driver));
        assert!(role_allows(&claims, UserRole::Admin));
    }

    #[test]
    fn driver_does_not_pass_admin_gate() {
        let claims = claims_with_role(Some("driver"));
        assert!(role_allows(&claims, UserRole::Driver));
        assert!(!role_allows(&claims, UserRole::Admin));
    }

    #[test]
    fn missing_or_unknown_role_is_plain_user() {
        let missing = claims_with_role(None);
        assert!(!role_allows(&missing, UserRole::User));

        let unknown = claims_with_role(Some("superuser"));
        assert!(role_allows(&unknown, UserRole::User));
        assert!(!role_allows(&unknown, UserRole::Admin));
    }
}
