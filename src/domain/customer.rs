use serde::{Deserialize, Serialize};

/// Entry of the external customer directory. Orders only reference it by
/// `external_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

impl Customer {
    pub fn new(
        external_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: &str,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.trim().to_lowercase(),
            is_active: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_normalized() {
        let customer = Customer::new("c-1", "Ada", "Lovelace", "  Ada@Example.COM ");
        assert_eq!(customer.email, "ada@example.com");
        assert!(customer.is_active);
    }
}
