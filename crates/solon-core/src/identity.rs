//! Caller identity resolution.
//!
//! A request is made by exactly one kind of caller. The endpoint decides which
//! kind it expects ([`RoleKind`]); [`Identity::resolve`] then parses that kind's
//! header convention. Resolution never fails: a missing or malformed header
//! yields an identity whose [`Identity::is_legitimate`] predicate is `false`,
//! while the partially parsed claims stay available for diagnostics.
//!
//! | Role | Header(s) | Legitimate when |
//! |------|-----------|-----------------|
//! | Service | configured scheduler header | value is non-empty |
//! | Admin | `X-Goog-Authenticated-User-Email` as `authenticator:email` | exactly two non-empty parts |
//! | User | `X-<affix>-Authenticated-User-Id`, `X-<affix>-Authenticated-User-Email` | both non-empty (id is a UUID when required) |

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Header carrying the `authenticator:email` pair for administrators.
pub const ADMIN_HEADER: &str = "X-Goog-Authenticated-User-Email";

/// Default header carrying a calling service's identity.
pub const DEFAULT_SERVICE_HEADER: &str = "X-Scheduler-Identity";

/// Default affix used to build the user header names.
pub const DEFAULT_HEADER_AFFIX: &str = "Solon";

/// The kind of caller an endpoint accepts.
///
/// Chosen by endpoint configuration, never inferred from the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    /// No caller kind; every request is rejected.
    #[default]
    None,
    /// Service-to-service calls (schedulers, workers).
    Service,
    /// Administrators behind the identity-aware proxy.
    Admin,
    /// End users authenticated by the gateway.
    User,
}

impl RoleKind {
    /// Returns the lowercase role name used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Service => "service",
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How user identifiers must be shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserIdFormat {
    /// Any non-empty string.
    #[default]
    Opaque,
    /// Must parse as a UUID.
    Uuid,
}

/// Header naming used during identity resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Affix inserted into the user headers (`X-<affix>-Authenticated-User-Id`).
    pub header_affix: String,
    /// Header carrying a service caller's identity.
    pub service_header: String,
    /// Header carrying the administrator `authenticator:email` pair.
    pub admin_header: String,
    /// Required shape of user identifiers.
    pub user_id_format: UserIdFormat,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            header_affix: DEFAULT_HEADER_AFFIX.to_string(),
            service_header: DEFAULT_SERVICE_HEADER.to_string(),
            admin_header: ADMIN_HEADER.to_string(),
            user_id_format: UserIdFormat::Opaque,
        }
    }
}

impl IdentityConfig {
    /// Creates a configuration with the given header affix and defaults elsewhere.
    #[must_use]
    pub fn with_affix(affix: impl Into<String>) -> Self {
        Self {
            header_affix: affix.into(),
            ..Self::default()
        }
    }

    /// Name of the header carrying the authenticated user's id.
    #[must_use]
    pub fn user_id_header(&self) -> String {
        format!("X-{}-Authenticated-User-Id", self.header_affix)
    }

    /// Name of the header carrying the authenticated user's email.
    #[must_use]
    pub fn user_email_header(&self) -> String {
        format!("X-{}-Authenticated-User-Email", self.header_affix)
    }
}

/// A calling service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceIdentity {
    /// Raw identity string supplied by the caller.
    pub id: String,
}

/// An administrator authenticated by the identity-aware proxy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AdminIdentity {
    /// The authenticator prefix (e.g. `accounts.google.com`).
    pub authenticator: String,
    /// The administrator's email.
    pub email: String,
}

/// A user identifier as read from the id header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserId {
    /// Free-form identifier.
    Opaque(String),
    /// Structured identifier.
    Uuid(Uuid),
    /// Raw value that failed the configured format.
    Malformed(String),
}

impl UserId {
    /// Parses a raw header value according to `format`.
    #[must_use]
    pub fn parse(raw: &str, format: UserIdFormat) -> Self {
        match format {
            UserIdFormat::Opaque => Self::Opaque(raw.to_string()),
            UserIdFormat::Uuid => Uuid::parse_str(raw)
                .map_or_else(|_| Self::Malformed(raw.to_string()), Self::Uuid),
        }
    }

    /// Returns the UUID if the identifier is structured.
    #[must_use]
    pub const fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` if the identifier is usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Opaque(raw) => !raw.is_empty(),
            Self::Uuid(_) => true,
            Self::Malformed(_) => false,
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque(raw) | Self::Malformed(raw) => f.write_str(raw),
            Self::Uuid(id) => write!(f, "{id}"),
        }
    }
}

/// An end user authenticated by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// The user's identifier.
    pub id: UserId,
    /// The user's email.
    pub email: String,
}

/// The resolved caller of one request.
///
/// A single sum type, so a binding can never carry claims for two roles at once.
///
/// # Example
///
/// ```
/// use http::HeaderMap;
/// use solon_core::{Identity, IdentityConfig, RoleKind};
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     "x-goog-authenticated-user-email",
///     "accounts.google.com:ops@example.com".parse().unwrap(),
/// );
///
/// let identity = Identity::resolve(RoleKind::Admin, &headers, &IdentityConfig::default());
/// assert!(identity.is_legitimate());
/// assert_eq!(identity.email(), Some("ops@example.com"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Identity {
    /// Nothing resolved.
    #[default]
    None,
    /// A calling service.
    Service(ServiceIdentity),
    /// An administrator.
    Admin(AdminIdentity),
    /// An end user.
    User(UserIdentity),
}

impl Identity {
    /// Parses the identity of `kind` from request headers.
    ///
    /// Always returns a value; check [`Identity::is_legitimate`] before trusting it.
    #[must_use]
    pub fn resolve(kind: RoleKind, headers: &HeaderMap, config: &IdentityConfig) -> Self {
        match kind {
            RoleKind::None => Self::None,
            RoleKind::Service => Self::Service(ServiceIdentity {
                id: header_value(headers, &config.service_header).to_string(),
            }),
            RoleKind::Admin => Self::Admin(parse_admin(header_value(headers, &config.admin_header))),
            RoleKind::User => Self::User(UserIdentity {
                id: UserId::parse(
                    header_value(headers, &config.user_id_header()),
                    config.user_id_format,
                ),
                email: header_value(headers, &config.user_email_header()).to_string(),
            }),
        }
    }

    /// Returns `true` if the identity is well-formed for its role.
    #[must_use]
    pub fn is_legitimate(&self) -> bool {
        match self {
            Self::None => false,
            Self::Service(service) => !service.id.is_empty(),
            Self::Admin(admin) => !admin.authenticator.is_empty() && !admin.email.is_empty(),
            Self::User(user) => user.id.is_valid() && !user.email.is_empty(),
        }
    }

    /// Returns the role this identity was resolved for.
    #[must_use]
    pub const fn role(&self) -> RoleKind {
        match self {
            Self::None => RoleKind::None,
            Self::Service(_) => RoleKind::Service,
            Self::Admin(_) => RoleKind::Admin,
            Self::User(_) => RoleKind::User,
        }
    }

    /// Returns the service claims, if any.
    #[must_use]
    pub const fn as_service(&self) -> Option<&ServiceIdentity> {
        match self {
            Self::Service(service) => Some(service),
            _ => None,
        }
    }

    /// Returns the administrator claims, if any.
    #[must_use]
    pub const fn as_admin(&self) -> Option<&AdminIdentity> {
        match self {
            Self::Admin(admin) => Some(admin),
            _ => None,
        }
    }

    /// Returns the user claims, if any.
    #[must_use]
    pub const fn as_user(&self) -> Option<&UserIdentity> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    /// Returns the caller's email for admins and users.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Admin(admin) => Some(admin.email.as_str()),
            Self::User(user) => Some(user.email.as_str()),
            Self::None | Self::Service(_) => None,
        }
    }

    /// Returns a string identifier suitable for logging.
    ///
    /// Emails are left out; only the role and the caller id appear.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::Service(service) => format!("service:{}", service.id),
            Self::Admin(admin) => format!("admin:{}", admin.authenticator),
            Self::User(user) => format!("user:{}", user.id),
        }
    }
}

// Absent and non-UTF-8 headers read as empty.
fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn parse_admin(raw: &str) -> AdminIdentity {
    let pieces: Vec<&str> = raw.split(':').collect();
    match pieces.as_slice() {
        [authenticator, email] => AdminIdentity {
            authenticator: (*authenticator).to_string(),
            email: (*email).to_string(),
        },
        _ => AdminIdentity::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderName, HeaderValue};
    use proptest::prelude::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_none_is_never_legitimate() {
        let identity = Identity::resolve(
            RoleKind::None,
            &headers(&[("x-scheduler-identity", "cron")]),
            &IdentityConfig::default(),
        );
        assert_eq!(identity, Identity::None);
        assert!(!identity.is_legitimate());
    }

    #[test]
    fn test_service_identity() {
        let config = IdentityConfig {
            service_header: "X-Cron-Caller".to_string(),
            ..IdentityConfig::default()
        };
        let identity =
            Identity::resolve(RoleKind::Service, &headers(&[("x-cron-caller", "billing")]), &config);

        assert!(identity.is_legitimate());
        assert_eq!(identity.as_service().unwrap().id, "billing");
        assert_eq!(identity.log_id(), "service:billing");
    }

    #[test]
    fn test_service_identity_missing_header() {
        let identity =
            Identity::resolve(RoleKind::Service, &HeaderMap::new(), &IdentityConfig::default());
        assert_eq!(identity.role(), RoleKind::Service);
        assert!(!identity.is_legitimate());
    }

    #[test]
    fn test_admin_identity() {
        let identity = Identity::resolve(
            RoleKind::Admin,
            &headers(&[(ADMIN_HEADER, "accounts.google.com:ops@example.com")]),
            &IdentityConfig::default(),
        );

        let admin = identity.as_admin().unwrap();
        assert_eq!(admin.authenticator, "accounts.google.com");
        assert_eq!(admin.email, "ops@example.com");
        assert!(identity.is_legitimate());
    }

    #[test]
    fn test_admin_identity_empty_part() {
        let identity = Identity::resolve(
            RoleKind::Admin,
            &headers(&[(ADMIN_HEADER, ":ops@example.com")]),
            &IdentityConfig::default(),
        );
        assert!(!identity.is_legitimate());
        assert_eq!(identity.email(), Some("ops@example.com"));
    }

    #[test]
    fn test_user_identity_opaque() {
        let config = IdentityConfig::with_affix("Rewards");
        let identity = Identity::resolve(
            RoleKind::User,
            &headers(&[
                ("X-Rewards-Authenticated-User-Id", "u-42"),
                ("X-Rewards-Authenticated-User-Email", "alice@example.com"),
            ]),
            &config,
        );

        let user = identity.as_user().unwrap();
        assert_eq!(user.id, UserId::Opaque("u-42".to_string()));
        assert_eq!(user.email, "alice@example.com");
        assert!(identity.is_legitimate());
    }

    #[test]
    fn test_user_identity_requires_uuid() {
        let config = IdentityConfig {
            user_id_format: UserIdFormat::Uuid,
            ..IdentityConfig::with_affix("Rewards")
        };
        let identity = Identity::resolve(
            RoleKind::User,
            &headers(&[
                ("X-Rewards-Authenticated-User-Id", "u-42"),
                ("X-Rewards-Authenticated-User-Email", "alice@example.com"),
            ]),
            &config,
        );

        assert!(!identity.is_legitimate());
        assert_eq!(
            identity.as_user().unwrap().id,
            UserId::Malformed("u-42".to_string())
        );
    }

    #[test]
    fn test_user_identity_with_uuid() {
        let config = IdentityConfig {
            user_id_format: UserIdFormat::Uuid,
            ..IdentityConfig::with_affix("Rewards")
        };
        let id = "8d6f8a3e-5f8e-4b58-9d0a-0c9f3d1f2b7a";
        let identity = Identity::resolve(
            RoleKind::User,
            &headers(&[
                ("X-Rewards-Authenticated-User-Id", id),
                ("X-Rewards-Authenticated-User-Email", "alice@example.com"),
            ]),
            &config,
        );

        assert!(identity.is_legitimate());
        let user = identity.as_user().unwrap();
        assert_eq!(user.id.as_uuid().unwrap().to_string(), id);
    }

    #[test]
    fn test_header_names_follow_affix() {
        let config = IdentityConfig::with_affix("Shop");
        assert_eq!(config.user_id_header(), "X-Shop-Authenticated-User-Id");
        assert_eq!(config.user_email_header(), "X-Shop-Authenticated-User-Email");
    }

    #[test]
    fn test_serialization() {
        let identity = Identity::Admin(AdminIdentity {
            authenticator: "idp".to_string(),
            email: "ops@example.com".to_string(),
        });
        let json = serde_json::to_string(&identity).unwrap();
        assert!(json.contains("\"type\":\"admin\""));

        let parsed: Identity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, identity);
    }

    fn token() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9._@+-]{1,24}"
    }

    proptest! {
        #[test]
        fn proptest_well_formed_admin_header_is_legitimate(auth in token(), email in token()) {
            let raw = format!("{auth}:{email}");
            let identity = Identity::resolve(
                RoleKind::Admin,
                &headers(&[(ADMIN_HEADER, raw.as_str())]),
                &IdentityConfig::default(),
            );

            prop_assert!(identity.is_legitimate());
            let admin = identity.as_admin().unwrap();
            prop_assert_eq!(&admin.authenticator, &auth);
            prop_assert_eq!(&admin.email, &email);
        }

        #[test]
        fn proptest_admin_header_without_two_parts_is_rejected(
            parts in prop::collection::vec(token(), 1..6).prop_filter("two parts", |p| p.len() != 2)
        ) {
            let raw = parts.join(":");
            let identity = Identity::resolve(
                RoleKind::Admin,
                &headers(&[(ADMIN_HEADER, raw.as_str())]),
                &IdentityConfig::default(),
            );
            prop_assert!(!identity.is_legitimate());
        }

        #[test]
        fn proptest_user_needs_both_headers(id in token(), email in token(), drop_id in any::<bool>()) {
            let config = IdentityConfig::default();
            let id_header = config.user_id_header();
            let email_header = config.user_email_header();

            let only_one = if drop_id {
                headers(&[(email_header.as_str(), email.as_str())])
            } else {
                headers(&[(id_header.as_str(), id.as_str())])
            };
            let partial = Identity::resolve(RoleKind::User, &only_one, &config);
            prop_assert!(!partial.is_legitimate());

            let both = headers(&[(id_header.as_str(), id.as_str()), (email_header.as_str(), email.as_str())]);
            let full = Identity::resolve(RoleKind::User, &both, &config);
            prop_assert!(full.is_legitimate());
        }
    }
}
