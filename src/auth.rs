//! Credential encoding and session-cookie capture.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::PcError;

pub const LWSSO_COOKIE: &str = "LWSSO_COOKIE_KEY";
pub const QC_SESSION_COOKIE: &str = "QCSession";

/// Login pair supplied on the command line; read once, never mutated.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Value for the `Authorization` header: `Basic <base64(user:password)>`.
    pub fn basic_auth_header(&self) -> String {
        let pair = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(pair))
    }
}

/// The two cookies the authentication endpoint hands back.
///
/// Both are required for every later call, so an absent key fails here
/// instead of surfacing as a rejected request deeper into the workflow.
#[derive(Debug)]
pub struct SessionCookies {
    lwsso: String,
    qc_session: String,
}

impl SessionCookies {
    /// Capture the session cookies from `Set-Cookie` response header values.
    pub fn from_set_cookie_values<'a, I>(values: I) -> Result<Self, PcError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut lwsso = None;
        let mut qc_session = None;
        for value in values {
            // Only the name=value pair matters; attributes follow the first ';'.
            let Some((name, cookie_value)) = value
                .split(';')
                .next()
                .and_then(|pair| pair.split_once('='))
            else {
                continue;
            };
            match name.trim() {
                LWSSO_COOKIE => lwsso = Some(cookie_value.to_string()),
                QC_SESSION_COOKIE => qc_session = Some(cookie_value.to_string()),
                _ => {}
            }
        }
        Ok(Self {
            lwsso: lwsso.ok_or(PcError::MissingCookie { name: LWSSO_COOKIE })?,
            qc_session: qc_session.ok_or(PcError::MissingCookie {
                name: QC_SESSION_COOKIE,
            })?,
        })
    }

    /// `Cookie` header value used on every call after authentication.
    pub fn cookie_header(&self) -> String {
        format!(
            "{LWSSO_COOKIE}={};{QC_SESSION_COOKIE}={};",
            self.lwsso, self.qc_session
        )
    }
}
