//! Default sensitive field names
//!
//! Curated list of body/user field names that are redacted out of the box.
//! Matching is exact (body mode is case-sensitive), so common casing and
//! bracket variants are listed explicitly where they appear in the wild
//! (e.g. the `card[...]` names produced by payment forms).

/// Field names redacted by default in bodies, user records, and query maps.
pub const DEFAULT_SANITIZE_FIELDS: &[&str] = &[
    "access_token",
    "api_key",
    "api_secret",
    "auth_token",
    "bank_account",
    "bank_account_number",
    "card[cvc]",
    "card[cvv]",
    "card[exp_month]",
    "card[exp_year]",
    "card[number]",
    "card_number",
    "cc_number",
    "ccnum",
    "client_secret",
    "credit_card",
    "credit_card_number",
    "csrf_token",
    "cvc",
    "cvv",
    "new_password",
    "old_password",
    "pass",
    "passphrase",
    "passwd",
    "password",
    "password_confirm",
    "password_confirmation",
    "pin",
    "private_key",
    "refresh_token",
    "secret",
    "secret_key",
    "secret_token",
    "security_answer",
    "security_code",
    "session_token",
    "social_security_number",
    "ssn",
    "stripe_token",
    "token",
];

pub(crate) fn default_sanitize_fields() -> Vec<String> {
    DEFAULT_SANITIZE_FIELDS.iter().map(|s| s.to_string()).collect()
}
