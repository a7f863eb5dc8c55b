//! Subscription contract identifier translation.
//!
//! A contract is known to Shopify by a global ID
//! (`gid://shopify/SubscriptionContract/<n>`) and to Loop by either a bare
//! numeric ID (native Loop subscription) or `shopify-<n>` (a Loop record
//! keyed by the Shopify contract). Route handlers may also receive the GID in
//! percent-encoded form.

const GID_PREFIX: &str = "gid://shopify/SubscriptionContract/";

/// Translates any accepted contract identifier into Loop's format.
///
/// Total and idempotent: unrecognized inputs pass through unchanged so the
/// downstream API rejects them.
pub fn to_mirror_id(canonical_id: &str) -> String {
    if canonical_id.starts_with("shopify-") || canonical_id.starts_with("loop-") {
        return canonical_id.to_string();
    }

    if let Some(digits) = canonical_id.strip_prefix(GID_PREFIX) {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return format!("shopify-{digits}");
        }
        return canonical_id.to_string();
    }

    // URL-encoded GID: percent-decode, then apply the GID rule.
    if canonical_id.contains("%2F") || canonical_id.contains("%2f") {
        if let Ok(decoded) = urlencoding::decode(canonical_id) {
            if decoded != canonical_id {
                return to_mirror_id(&decoded);
            }
        }
        return canonical_id.to_string();
    }

    if !canonical_id.is_empty() && canonical_id.bytes().all(|b| b.is_ascii_digit()) {
        return format!("shopify-{canonical_id}");
    }

    canonical_id.to_string()
}

/// Translates any accepted contract identifier into the Shopify GID form
/// used by Customer Account API mutations.
///
/// Same total/idempotent contract as [`to_mirror_id`], in the other
/// direction.
pub fn to_commerce_gid(id: &str) -> String {
    if id.starts_with(GID_PREFIX) {
        return id.to_string();
    }

    if let Some(digits) = id.strip_prefix("shopify-") {
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return format!("{GID_PREFIX}{digits}");
        }
        return id.to_string();
    }

    if id.contains("%2F") || id.contains("%2f") {
        if let Ok(decoded) = urlencoding::decode(id) {
            if decoded != id {
                return to_commerce_gid(&decoded);
            }
        }
        return id.to_string();
    }

    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        return format!("{GID_PREFIX}{id}");
    }

    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gid_translates_to_mirror_id() {
        assert_eq!(
            to_mirror_id("gid://shopify/SubscriptionContract/126061281654"),
            "shopify-126061281654"
        );
    }

    #[test]
    fn bare_numeric_translates_to_mirror_id() {
        assert_eq!(to_mirror_id("126061281654"), "shopify-126061281654");
    }

    #[test]
    fn mirror_native_ids_pass_through() {
        assert_eq!(to_mirror_id("shopify-126061281654"), "shopify-126061281654");
        assert_eq!(to_mirror_id("loop-98765"), "loop-98765");
    }

    #[test]
    fn url_encoded_gid_is_decoded_first() {
        assert_eq!(
            to_mirror_id("gid%3A%2F%2Fshopify%2FSubscriptionContract%2F126061281654"),
            "shopify-126061281654"
        );
    }

    #[test]
    fn unrecognized_input_passes_through() {
        assert_eq!(to_mirror_id("not-a-contract-id"), "not-a-contract-id");
        assert_eq!(to_mirror_id(""), "");
        assert_eq!(
            to_mirror_id("gid://shopify/SubscriptionContract/abc"),
            "gid://shopify/SubscriptionContract/abc"
        );
    }

    #[test]
    fn to_mirror_id_is_idempotent() {
        for input in [
            "gid://shopify/SubscriptionContract/126061281654",
            "126061281654",
            "shopify-126061281654",
            "gid%3A%2F%2Fshopify%2FSubscriptionContract%2F126061281654",
            "not-a-contract-id",
        ] {
            let once = to_mirror_id(input);
            assert_eq!(to_mirror_id(&once), once, "not idempotent for {input}");
        }
    }

    #[test]
    fn commerce_gid_round_trips() {
        let gid = "gid://shopify/SubscriptionContract/126061281654";
        assert_eq!(to_commerce_gid("126061281654"), gid);
        assert_eq!(to_commerce_gid("shopify-126061281654"), gid);
        assert_eq!(to_commerce_gid(gid), gid);
        assert_eq!(
            to_commerce_gid("gid%3A%2F%2Fshopify%2FSubscriptionContract%2F126061281654"),
            gid
        );
        assert_eq!(to_commerce_gid(&to_mirror_id(gid)), gid);
    }
}
