use serde::{Deserialize, Serialize};

/// A company that customers and transactions belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: u64,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub company_desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The body of `POST /companies`. A missing description is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyPayload {
    pub company_name: String,
    pub company_desc: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_sends_null_description() {
        let payload = CreateCompanyPayload {
            company_name: "Acme".into(),
            company_desc: None,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"companyName": "Acme", "companyDesc": null})
        );
    }

    #[test]
    fn test_nested_company_needs_only_id() {
        let company: Company = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(company.id, 3);
        assert!(company.company_name.is_empty());
    }
}
