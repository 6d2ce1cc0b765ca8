use axum::http::HeaderMap;

use super::AuthError;
use crate::common::UserId;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Seller,
    Buyer,
    Other,
}

impl Role {
    fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("seller") => Role::Seller,
            Some("buyer") => Role::Buyer,
            _ => Role::Other,
        }
    }
}

/// Authenticated caller, as forwarded by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: UserId,
    pub role: Role,
}

impl Requester {
    pub fn seller(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Seller,
        }
    }

    /// Reads the identity headers. A missing user id is 401-class, a present
    /// but malformed one is 400-class.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        let raw = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::MissingUserId)?;

        let user_id = UserId::parse(raw).map_err(|_| AuthError::MalformedUserId)?;

        let role = Role::from_header(
            headers
                .get(USER_ROLE_HEADER)
                .and_then(|v| v.to_str().ok()),
        );

        Ok(Self { user_id, role })
    }

    /// Like [`Requester::from_headers`] but insists on the seller role. The
    /// role is checked before the user id is read.
    pub fn seller_from_headers(headers: &HeaderMap) -> Result<Self, AuthError> {
        require_seller_role(headers)?;
        Self::from_headers(headers)
    }
}

/// Role check for routes that do not need a user id (e.g. listing a user's
/// lands by path parameter).
pub fn require_seller_role(headers: &HeaderMap) -> Result<(), AuthError> {
    let role = Role::from_header(
        headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok()),
    );
    if role == Role::Seller {
        Ok(())
    } else {
        Err(AuthError::SellerRoleRequired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn seller_headers_resolve() {
        let user = UserId::new();
        let requester = Requester::seller_from_headers(&headers(&[
            ("x-user-id", &user.to_string()),
            ("x-user-role", "seller"),
        ]))
        .unwrap();
        assert_eq!(requester, Requester::seller(user));
    }

    #[test]
    fn missing_user_id_is_rejected() {
        let err = Requester::from_headers(&headers(&[("x-user-role", "seller")])).unwrap_err();
        assert_eq!(err, AuthError::MissingUserId);

        let err = Requester::from_headers(&headers(&[("x-user-id", "  ")])).unwrap_err();
        assert_eq!(err, AuthError::MissingUserId);
    }

    #[test]
    fn malformed_user_id_is_distinct_from_missing() {
        let err = Requester::from_headers(&headers(&[("x-user-id", "12345")])).unwrap_err();
        assert_eq!(err, AuthError::MalformedUserId);
    }

    #[test]
    fn non_seller_role_is_rejected() {
        let user = UserId::new().to_string();
        for role in ["buyer", "admin", "Seller"] {
            let err = Requester::seller_from_headers(&headers(&[
                ("x-user-id", &user),
                ("x-user-role", role),
            ]))
            .unwrap_err();
            assert_eq!(err, AuthError::SellerRoleRequired);
        }

        let err = Requester::seller_from_headers(&headers(&[("x-user-id", &user)])).unwrap_err();
        assert_eq!(err, AuthError::SellerRoleRequired);
    }

    #[test]
    fn role_is_checked_before_user_id() {
        let err = Requester::seller_from_headers(&headers(&[("x-user-role", "buyer")])).unwrap_err();
        assert_eq!(err, AuthError::SellerRoleRequired);

        let err = Requester::seller_from_headers(&headers(&[
            ("x-user-id", "not-a-uuid"),
            ("x-user-role", "seller"),
        ]))
        .unwrap_err();
        assert_eq!(err, AuthError::MalformedUserId);
    }

    #[test]
    fn role_only_check() {
        assert!(require_seller_role(&headers(&[("x-user-role", "seller")])).is_ok());
        assert!(require_seller_role(&HeaderMap::new()).is_err());
    }
}
