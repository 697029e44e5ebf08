use border0_types::{
    NewPolicy, Policy, PolicyCondition, PolicyData, PolicyPermissions, PolicyWho,
    POLICY_VERSION_V2,
};
use reqwest::StatusCode;

use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create a policy. The API answers `201 Created`; any other success code is an error.
    pub async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy, ApiError> {
        self.post_json_expecting(&["policies"], policy, Some(StatusCode::CREATED)).await
    }
}

/// v2 policy data granting `email` every SSH capability and nothing else.
///
/// Other protocols are present as empty permission objects.
pub fn email_ssh_policy(email: &str) -> PolicyData {
    PolicyData {
        condition: PolicyCondition {
            who: PolicyWho {
                email: vec![email.to_string()],
                group: Vec::new(),
                service_account: Vec::new(),
            },
        },
        permissions: PolicyPermissions::default(),
    }
}

/// A policy not attached to any socket that expires at `expiry` (unix seconds).
pub fn expiring_policy(name: &str, policy_data: PolicyData, expiry: i64) -> NewPolicy {
    NewPolicy {
        name: name.to_string(),
        description: "Test policy for expiring-policies demo".to_string(),
        socket_ids: Vec::new(),
        org_wide: false,
        policy_data,
        version: POLICY_VERSION_V2.to_string(),
        expiry: Some(expiry),
    }
}
