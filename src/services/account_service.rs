use bcrypt::BcryptError;
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$";

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN)
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

/// Blocking; call from `web::block`.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

/// A stored value that is not a bcrypt hash never verifies.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}
