//! Who is making a request, and what they may do.

use crate::orm::users;
use actix_session::SessionExt;
use actix_web::HttpRequest;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait};

/// Session key holding the logged-in user's id.
pub const SESSION_USER_KEY: &str = "user_id";

bitflags::bitflags! {
    /// Capabilities granted to a request.
    pub struct Permissions: u32 {
        const FILE_REPORTS = 0b0001;
        const VIEW_REPORTS = 0b0010;
        const MANAGE_REPORTS = 0b0100;
    }
}

/// Identity of an authenticated caller, built once per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: i32,
    pub is_admin: bool,
    pub permissions: Permissions,
}

impl AuthContext {
    pub fn new(user_id: i32, is_admin: bool) -> Self {
        let mut permissions = Permissions::FILE_REPORTS;
        if is_admin {
            permissions |= Permissions::VIEW_REPORTS | Permissions::MANAGE_REPORTS;
        }

        Self {
            user_id,
            is_admin,
            permissions,
        }
    }

    pub fn can(&self, permission: Permissions) -> bool {
        self.permissions.contains(permission)
    }
}

/// Resolves the caller of a request.
///
/// `Ok(None)` means anonymous. Errors are infrastructure failures only.
#[async_trait(?Send)]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, req: &HttpRequest) -> Result<Option<AuthContext>, DbErr>;
}

/// Reads the user id from the cookie session and loads the admin flag.
pub struct SessionAuthenticator {
    db: DatabaseConnection,
}

impl SessionAuthenticator {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait(?Send)]
impl Authenticator for SessionAuthenticator {
    async fn authenticate(&self, req: &HttpRequest) -> Result<Option<AuthContext>, DbErr> {
        let user_id = match req.get_session().get::<i32>(SESSION_USER_KEY) {
            Ok(Some(user_id)) => user_id,
            Ok(None) => return Ok(None),
            Err(e) => {
                log::warn!("Unreadable session payload, treating as guest: {}", e);
                return Ok(None);
            }
        };

        // A session for a deleted account is just a guest.
        let user = users::Entity::find_by_id(user_id).one(&self.db).await?;
        Ok(user.map(|u| AuthContext::new(u.id, u.is_admin)))
    }
}
