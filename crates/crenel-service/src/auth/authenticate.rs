use base64::{Engine as _, engine::general_purpose::STANDARD};

use crenel_db::db::connection::DbConnection;
use crenel_db::db::query::admin_user;
use crenel_db::model::admin_user::AdminUser;

use crate::auth::password::verify_password;
use crate::error::{ServiceError, ServiceResult};

/// Credentials carried by an HTTP Basic `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub email: String,
    pub password: String,
}

/// ## Summary
/// Parses an `Authorization` header value of the Basic scheme.
///
/// Returns `None` for any other scheme, for undecodable payloads, and for
/// payloads missing the `user:password` separator. The password keeps any
/// colons it contains.
#[must_use]
pub fn parse_basic_header(header: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (email, password) = decoded.split_once(':')?;

    Some(BasicCredentials {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// ## Summary
/// Resolves Basic credentials against the administrator accounts.
///
/// ## Errors
/// Returns `NotAuthenticated` when the account is unknown or the password
/// does not match; the two cases are indistinguishable to the caller.
#[tracing::instrument(skip(conn, credentials))]
pub async fn authenticate_admin(
    conn: &mut DbConnection<'_>,
    credentials: &BasicCredentials,
) -> ServiceResult<AdminUser> {
    let Some(account) = admin_user::fetch_by_email(conn, &credentials.email).await? else {
        tracing::debug!("unknown administrator account");
        return Err(ServiceError::NotAuthenticated);
    };

    verify_password(&credentials.password, &account.password_hash)?;

    tracing::debug!(admin = %account.email, "administrator authenticated");
    Ok(account)
}
