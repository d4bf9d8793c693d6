//! Credential gate: HTTP Basic parsing, credential lookup, and bcrypt
//! password handling.
//!
//! The gate either authenticates a request or rejects it before any gateway
//! logic runs. Rejection is fail-closed: a malformed header, an empty
//! username, a failed lookup, a missing user, and a hash mismatch all end the
//! request with the same 401.

use actix_web::HttpRequest;
use base64::prelude::*;
use bcrypt::DEFAULT_COST;
use log::warn;
use rusqlite::Connection;

use crate::error::AuthError;
use crate::executor::{self, Outcome};
use crate::value::Value;

/// Username/password pair as supplied by the client.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Pull Basic credentials out of the request's `Authorization` header.
pub fn credentials_from_request(req: &HttpRequest) -> Result<Credentials, AuthError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| {
            AuthError::MalformedAuthorization("header contains invalid characters".to_string())
        })?;
    parse_basic_header(header)
}

/// Parse an `Authorization: Basic <base64(username:password)>` header value.
///
/// The first colon splits username from password, so passwords may contain
/// colons; usernames may not.
pub fn parse_basic_header(header: &str) -> Result<Credentials, AuthError> {
    let encoded = header.strip_prefix("Basic ").ok_or_else(|| {
        AuthError::MalformedAuthorization("header must start with 'Basic '".to_string())
    })?;

    let decoded = BASE64_STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| AuthError::MalformedAuthorization(format!("invalid base64: {e}")))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|e| AuthError::MalformedAuthorization(format!("invalid utf-8: {e}")))?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        AuthError::MalformedAuthorization("credentials must be 'username:password'".to_string())
    })?;

    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// Statement that fetches the stored credential row for a username.
///
/// The username is spliced into the statement text verbatim; which rows match
/// special characters therefore follows the text splice, not a bound
/// parameter.
pub fn credential_lookup_sql(username: &str) -> String {
    format!("SELECT * FROM users WHERE name ='{username}'")
}

/// Statement that replaces a user's stored password hash. Same verbatim
/// splicing as the lookup.
pub fn password_update_sql(username: &str, password_hash: &str) -> String {
    format!("UPDATE users SET password = '{password_hash}' WHERE name = '{username}'")
}

/// Hash a plaintext password with bcrypt (salted, one-way).
pub fn hash_password(password: &str, cost: Option<u32>) -> Result<String, AuthError> {
    bcrypt::hash(password, cost.unwrap_or(DEFAULT_COST))
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a plaintext password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Run the credential gate against the request's connection.
///
/// The lookup reuses the read executor, so a lookup failure arrives as an
/// `Error` outcome and rejects the request rather than escaping.
pub fn authenticate(conn: &Connection, credentials: &Credentials) -> Result<(), AuthError> {
    if credentials.username.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let lookup = credential_lookup_sql(&credentials.username);
    let rows = match executor::run_query(conn, &lookup) {
        Outcome::Rows(rows) => rows,
        Outcome::Error(message) => {
            warn!("credential lookup failed: {message}");
            return Err(AuthError::Lookup(message));
        }
        Outcome::Status => return Err(AuthError::InvalidCredentials),
    };

    // Username uniqueness is assumed, not enforced; only the first row is
    // ever consulted.
    let record = rows.first().ok_or(AuthError::InvalidCredentials)?;
    match record.get("name") {
        Some(Value::Text(name)) if name == &credentials.username => {}
        _ => return Err(AuthError::InvalidCredentials),
    }
    let stored_hash = match record.get("password") {
        Some(Value::Text(hash)) => hash,
        _ => return Err(AuthError::InvalidCredentials),
    };

    if verify_password(&credentials.password, stored_hash)? {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Low cost keeps the bcrypt-heavy tests fast.
    const TEST_COST: u32 = 4;

    fn seeded_conn(password: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (name TEXT NOT NULL, password TEXT NOT NULL);")
            .unwrap();
        let hash = hash_password(password, Some(TEST_COST)).unwrap();
        conn.execute(
            "INSERT INTO users (name, password) VALUES (?1, ?2)",
            rusqlite::params!["alice", hash],
        )
        .unwrap();
        conn
    }

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn parses_a_valid_basic_header() {
        // base64("user:pass")
        let credentials = parse_basic_header("Basic dXNlcjpwYXNz").unwrap();
        assert_eq!(credentials.username, "user");
        assert_eq!(credentials.password, "pass");
    }

    #[test]
    fn password_may_contain_colons() {
        // base64("admin:p@ss:word")
        let credentials = parse_basic_header("Basic YWRtaW46cEBzczp3b3Jk").unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "p@ss:word");
    }

    #[test]
    fn malformed_headers_are_rejected() {
        for header in [
            "dXNlcjpwYXNz",        // missing prefix
            "Basic !!invalid!!",   // bad base64
            "Basic dXNlcnBhc3M=",  // base64("userpass"), no colon
            "Bearer sometoken",
        ] {
            assert!(matches!(
                parse_basic_header(header),
                Err(AuthError::MalformedAuthorization(_))
            ));
        }
    }

    #[test]
    fn lookup_sql_splices_the_username_verbatim() {
        assert_eq!(
            credential_lookup_sql("alice"),
            "SELECT * FROM users WHERE name ='alice'"
        );
        assert_eq!(
            credential_lookup_sql("o'brien"),
            "SELECT * FROM users WHERE name ='o'brien'"
        );
    }

    #[test]
    fn update_sql_splices_hash_and_username() {
        assert_eq!(
            password_update_sql("alice", "h4sh"),
            "UPDATE users SET password = 'h4sh' WHERE name = 'alice'"
        );
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("secret", Some(TEST_COST)).unwrap();
        assert!(verify_password("secret", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn correct_credentials_authenticate() {
        let conn = seeded_conn("secret");
        assert!(authenticate(&conn, &creds("alice", "secret")).is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let conn = seeded_conn("secret");
        assert!(matches!(
            authenticate(&conn, &creds("alice", "nope")),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn unknown_user_is_rejected() {
        let conn = seeded_conn("secret");
        assert!(matches!(
            authenticate(&conn, &creds("mallory", "secret")),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn empty_username_is_rejected_before_lookup() {
        let conn = Connection::open_in_memory().unwrap();
        // No users table at all: the empty-username check must fire first.
        assert!(matches!(
            authenticate(&conn, &creds("", "anything")),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn missing_users_table_rejects_instead_of_escaping() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            authenticate(&conn, &creds("alice", "secret")),
            Err(AuthError::Lookup(_))
        ));
    }
}
