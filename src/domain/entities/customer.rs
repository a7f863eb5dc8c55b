use serde::{Deserialize, Serialize};

/// Claims this service consumes from the identity token payload.
///
/// Only the fields the account UI needs; everything else in the token is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// The logged-in customer as exposed to the storefront UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
}

impl CustomerProfile {
    pub fn from_claims(claims: &IdTokenClaims) -> Self {
        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            first_name: claims.given_name.clone(),
            last_name: claims.family_name.clone(),
            name: claims.name.clone(),
        }
    }

    /// Numeric suffix of the customer GID (`gid://shopify/Customer/<n>`),
    /// used to key lookups in the mirror system.
    pub fn numeric_id(&self) -> Option<&str> {
        let digits = self.id.rsplit('/').next().unwrap_or(&self.id);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            Some(digits)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_id_extracts_gid_suffix() {
        let profile = CustomerProfile {
            id: "gid://shopify/Customer/7443621511414".into(),
            email: None,
            first_name: None,
            last_name: None,
            name: None,
        };
        assert_eq!(profile.numeric_id(), Some("7443621511414"));
    }

    #[test]
    fn numeric_id_accepts_bare_numbers_and_rejects_junk() {
        let mut profile = CustomerProfile {
            id: "7443621511414".into(),
            email: None,
            first_name: None,
            last_name: None,
            name: None,
        };
        assert_eq!(profile.numeric_id(), Some("7443621511414"));

        profile.id = "gid://shopify/Customer/".into();
        assert_eq!(profile.numeric_id(), None);
    }
}
