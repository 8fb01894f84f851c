//! Sensitive-field masking
//!
//! Rewrites value trees so that secret material never reaches a log line,
//! while identifiers that operators need for correlation pass through
//! untouched. Two operating modes share one string-masking core:
//!
//! - **Header mode** (`is_headers = true`): names compared
//!   case-insensitively, `referer`/`referrer` treated as aliases, and the
//!   `authorization` value masked scheme-preserving. No value heuristics.
//! - **Body mode** (`is_headers = false`): names compared exactly, with an
//!   ordered exemption chain evaluated per string leaf before the sensitive
//!   list applies: id-style field names, then identifier-shaped values
//!   (object id / CUID / UUID), then credit-card digit masking for unlisted
//!   fields.
//!
//! The exemption chain runs before list membership and wins, so a value that
//! is both CUID-shaped and card-shaped stays readable. Masking is
//! length-preserving: every masked character becomes `*`, which also makes
//! the pass idempotent.
//!
//! Recursion depth is proportional to input nesting depth; adapters should
//! bound capture depth for untrusted input.

use std::collections::BTreeMap;

use crate::card;
use crate::config::MaskOptions;
use crate::utils::to_snake_case;
use crate::value::{ObjectId, Value};

/// Rewrite a tree, masking string leaves per mode and field list.
///
/// The input is never mutated; the output mirrors the input's shape exactly
/// with only string leaves potentially altered. Non-string leaves (numbers,
/// buffers, stream handles) pass through as-is.
pub fn mask_props(value: &Value, props: &[String], options: &MaskOptions) -> Value {
    match value {
        // a bare string has no field name; value heuristics still apply
        Value::String(s) => Value::String(mask_string(None, s, props, options)),
        Value::Array(items) => Value::Array(
            items.iter().map(|item| mask_props(item, props, options)).collect(),
        ),
        Value::Object(map) => {
            let mut masked = BTreeMap::new();
            for (key, child) in map {
                let child = match child {
                    Value::String(s) => {
                        Value::String(mask_string(Some(key), s, props, options))
                    }
                    Value::Array(_) | Value::Object(_) => mask_props(child, props, options),
                    other => other.clone(),
                };
                masked.insert(key.clone(), child);
            }
            Value::Object(masked)
        }
        other => other.clone(),
    }
}

/// Mask one string leaf keyed by its field name (if any).
pub fn mask_string(key: Option<&str>, value: &str, props: &[String], options: &MaskOptions) -> String {
    let in_props = match key {
        Some(k) if options.is_headers => header_props_contain(k, props),
        Some(k) => props.iter().any(|p| p == k),
        None => false,
    };

    if !options.is_headers {
        // id-style field names are never masked
        if options.check_id {
            if let Some(k) = key {
                if is_id_field(k) {
                    return value.to_string();
                }
            }
        }

        // identifier-shaped values stay readable for correlation
        if is_id_value(value, options) {
            return value.to_string();
        }

        // Card numbers mask digits only, preserving separators. Listed
        // fields fall through to the full mask instead: that keeps masking
        // idempotent (an all-`*` value is a fixed point) and redacts listed
        // fields completely.
        if options.mask_credit_cards && !in_props && card::is_credit_card(value) {
            return mask_digits(value);
        }
    }

    if !in_props {
        return value.to_string();
    }

    // Authorization: <scheme> <credentials> keeps the scheme readable
    if options.is_headers && key.is_some_and(|k| k.eq_ignore_ascii_case("authorization")) {
        if let Some((scheme, credentials)) = value.split_once(' ') {
            return format!("{scheme} {}", mask_all(credentials));
        }
    }

    mask_all(value)
}

/// Case-insensitive membership check with the `referer`/`referrer` aliasing:
/// listing either spelling redacts both.
fn header_props_contain(key: &str, props: &[String]) -> bool {
    if props.iter().any(|p| p.eq_ignore_ascii_case(key)) {
        return true;
    }
    if key.eq_ignore_ascii_case("referer") || key.eq_ignore_ascii_case("referrer") {
        return props
            .iter()
            .any(|p| p.eq_ignore_ascii_case("referer") || p.eq_ignore_ascii_case("referrer"));
    }
    false
}

/// Apply header-mode masking to a flat header map. Keys are expected to be
/// lower-cased already (see [`crate::utils::lower_case_headers`]).
pub fn mask_header_map(
    headers: &BTreeMap<String, String>,
    props: &[String],
) -> BTreeMap<String, String> {
    let options = MaskOptions {
        is_headers: true,
        ..MaskOptions::default()
    };
    headers
        .iter()
        .map(|(name, value)| (name.clone(), mask_string(Some(name), value, props, &options)))
        .collect()
}

/// Whether a field name designates a primary-key-style identifier:
/// `id`, `_id`, or any name whose snake-case form ends in `_id`
/// (`product_id`, `product-id`, `product[id]`, `productId`, `productID`).
fn is_id_field(key: &str) -> bool {
    let lower = key.to_ascii_lowercase();
    if lower == "id" || lower == "_id" {
        return true;
    }
    to_snake_case(key).ends_with("_id")
}

/// Whether a string value is identifier-shaped: canonical object-id hex,
/// CUID (heuristic: starts with `c`, length >= 7), or a non-nil UUID v1-v5.
fn is_id_value(value: &str, options: &MaskOptions) -> bool {
    if options.check_object_id && ObjectId::is_valid_hex(value) {
        return true;
    }
    if options.check_cuid && value.starts_with('c') && value.len() >= 7 {
        return true;
    }
    if options.check_uuid && is_uuid(value) {
        return true;
    }
    false
}

fn is_uuid(value: &str) -> bool {
    // hyphenated form only
    if value.len() != 36 {
        return false;
    }
    match uuid::Uuid::try_parse(value) {
        Ok(parsed) => !parsed.is_nil() && (1..=5).contains(&parsed.get_version_num()),
        Err(_) => false,
    }
}

fn mask_all(value: &str) -> String {
    value.chars().map(|_| '*').collect()
}

fn mask_digits(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_digit() { '*' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body_options() -> MaskOptions {
        MaskOptions::default()
    }

    fn header_options() -> MaskOptions {
        MaskOptions {
            is_headers: true,
            ..MaskOptions::default()
        }
    }

    fn props(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_masks_listed_fields_at_any_depth() {
        let tree = Value::from(json!({
            "password": "hello",
            "some": {
                "deeply": {
                    "nested": { "password": "foobeep" },
                    "password": "beep"
                }
            },
            "arr": [{ "foo": { "beep": [{ "password": "baz" }] } }]
        }));
        let masked = mask_props(&tree, &props(&["password"]), &body_options());
        assert_eq!(masked.to_json(), json!({
            "password": "*****",
            "some": {
                "deeply": {
                    "nested": { "password": "*******" },
                    "password": "****"
                }
            },
            "arr": [{ "foo": { "beep": [{ "password": "***" }] } }]
        }));
    }

    #[test]
    fn test_unlisted_fields_pass_through() {
        let tree = Value::from(json!({ "name": "nifty", "surname": "lettuce" }));
        let masked = mask_props(&tree, &props(&["password"]), &body_options());
        assert_eq!(masked, tree);
    }

    #[test]
    fn test_card_digits_masked_separators_preserved() {
        let masked = mask_string(Some("myVisaCard"), "4242-4242x4242*4242", &[], &body_options());
        assert_eq!(masked, "****-****x*********");
        let masked = mask_string(Some("amex"), "3714 496 3539 8431", &[], &body_options());
        assert_eq!(masked, "**** *** **** ****");
    }

    #[test]
    fn test_card_masking_applies_even_to_unlisted_fields() {
        let tree = Value::from(json!({ "favorite_number": "4242424242424242" }));
        let masked = mask_props(&tree, &props(&["password"]), &body_options());
        assert_eq!(masked.to_json(), json!({ "favorite_number": "****************" }));
    }

    #[test]
    fn test_listed_card_shaped_field_is_fully_masked() {
        let masked = mask_string(
            Some("card_number"),
            "4242-4242-4242-4242",
            &props(&["card_number"]),
            &body_options(),
        );
        assert_eq!(masked, "*******************");
    }

    #[test]
    fn test_id_field_names_are_never_masked() {
        for key in ["_id", "id", "ID", "Id", "product_id", "product-id", "product[id]", "productId", "productID"] {
            let masked = mask_string(Some(key), "4242424242424242", &props(&[key]), &body_options());
            assert_eq!(masked, "4242424242424242", "key {key} must stay readable");
        }
    }

    #[test]
    fn test_object_id_value_is_exempt() {
        let masked = mask_string(Some("product"), "5abbbacf04e4872d3ae344c1", &[], &body_options());
        assert_eq!(masked, "5abbbacf04e4872d3ae344c1");
    }

    #[test]
    fn test_cuid_and_uuid_values_are_exempt() {
        let opts = body_options();
        // CUID-shaped, even though it also looks like a card number
        assert_eq!(
            mask_string(Some("cuid"), "c4242-4242x4242*4242", &[], &opts),
            "c4242-4242x4242*4242"
        );
        assert_eq!(
            mask_string(Some("foo"), "c51c80c2-66a1-442a-91e2-4f55b4256a72", &[], &opts),
            "c51c80c2-66a1-442a-91e2-4f55b4256a72"
        );
        // too short for the CUID heuristic
        assert_eq!(mask_string(Some("notCuid"), "c2345", &[], &opts), "c2345");
        // and therefore maskable when the field is listed
        assert_eq!(
            mask_string(Some("secret"), "c2345", &props(&["secret"]), &opts),
            "*****"
        );
    }

    #[test]
    fn test_exemptions_win_over_list_membership() {
        let listed = props(&["token"]);
        let masked = mask_string(
            Some("token"),
            "c51c80c2-66a1-442a-91e2-4f55b4256a72",
            &listed,
            &body_options(),
        );
        assert_eq!(masked, "c51c80c2-66a1-442a-91e2-4f55b4256a72");
    }

    #[test]
    fn test_nil_uuid_is_not_exempt() {
        let masked = mask_string(
            Some("token"),
            "00000000-0000-0000-0000-000000000000",
            &props(&["token"]),
            &body_options(),
        );
        assert_eq!(masked, "************************************");
    }

    #[test]
    fn test_disabled_heuristics() {
        let opts = MaskOptions {
            check_id: false,
            check_cuid: false,
            check_object_id: false,
            check_uuid: false,
            mask_credit_cards: false,
            is_headers: false,
        };
        assert_eq!(
            mask_string(Some("product_id"), "secret-value", &props(&["product_id"]), &opts),
            "************"
        );
        assert_eq!(
            mask_string(Some("card"), "4242424242424242", &props(&[]), &opts),
            "4242424242424242"
        );
    }

    #[test]
    fn test_header_mode_authorization() {
        let opts = header_options();
        let listed = props(&["authorization"]);
        assert_eq!(
            mask_string(Some("authorization"), "Bearer foobar", &listed, &opts),
            "Bearer ******"
        );
        assert_eq!(
            mask_string(Some("authorization"), "Bearer foobar foobar foobar", &listed, &opts),
            "Bearer ********************"
        );
        // no scheme separator: mask the whole value
        assert_eq!(
            mask_string(Some("authorization"), "foobar", &listed, &opts),
            "******"
        );
    }

    #[test]
    fn test_header_mode_is_case_insensitive_and_skips_heuristics() {
        let opts = header_options();
        let listed = props(&["X-Api-Key"]);
        assert_eq!(mask_string(Some("x-api-key"), "abc123", &listed, &opts), "******");
        // card-shaped header values are untouched unless listed
        assert_eq!(
            mask_string(Some("x-card"), "4242424242424242", &listed, &opts),
            "4242424242424242"
        );
    }

    #[test]
    fn test_referer_aliasing() {
        let opts = header_options();
        assert_eq!(mask_string(Some("referrer"), "foo", &props(&["referer"]), &opts), "***");
        assert_eq!(mask_string(Some("referer"), "foo", &props(&["referrer"]), &opts), "***");
        assert_eq!(mask_string(Some("referer"), "foo", &props(&["accept"]), &opts), "foo");
    }

    #[test]
    fn test_mask_header_map() {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), "Bearer foobar".to_string());
        headers.insert("accept".to_string(), "application/json".to_string());
        let masked = mask_header_map(&headers, &props(&["authorization"]));
        assert_eq!(masked["authorization"], "Bearer ******");
        assert_eq!(masked["accept"], "application/json");
    }

    #[test]
    fn test_masking_is_idempotent() {
        let tree = Value::from(json!({
            "password": "hunter2",
            "card": "4242-4242-4242-4242",
            "plain": "hello"
        }));
        let listed = props(&["password", "card"]);
        let once = mask_props(&tree, &listed, &body_options());
        let twice = mask_props(&once, &listed, &body_options());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_structure_is_preserved() {
        let tree = Value::from(json!({
            "a": [1, 2, {"password": "x"}],
            "b": {"c": null, "password": "y"}
        }));
        let masked = mask_props(&tree, &props(&["password"]), &body_options());
        assert_eq!(masked.to_json(), json!({
            "a": [1, 2, {"password": "*"}],
            "b": {"c": null, "password": "*"}
        }));
    }

    #[test]
    fn test_bare_string_value_gets_card_masking() {
        let masked = mask_props(&Value::from("4242-4242-4242-4242"), &[], &body_options());
        assert_eq!(masked, Value::from("****-****-****-****"));
    }
}
