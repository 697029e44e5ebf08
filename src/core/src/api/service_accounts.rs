use border0_types::{
    NewServiceAccount, NewServiceAccountToken, ServiceAccount, ServiceAccountToken,
};
use serde_json::Value;

use super::{ApiClient, ApiError};

const SERVICE_ACCOUNTS: [&str; 3] = ["organizations", "iam", "service_accounts"];

fn path<'a>(rest: &[&'a str]) -> Vec<&'a str> {
    SERVICE_ACCOUNTS.iter().copied().chain(rest.iter().copied()).collect()
}

impl ApiClient {
    pub async fn create_service_account(
        &self,
        account: &NewServiceAccount,
    ) -> Result<ServiceAccount, ApiError> {
        self.post_json(&path(&[]), account).await
    }

    /// Raw listing body, passed through untouched.
    pub async fn list_service_accounts(&self) -> Result<Value, ApiError> {
        self.get_json(&path(&[]), &[]).await
    }

    pub async fn delete_service_account(&self, name: &str) -> Result<(), ApiError> {
        self.delete(&path(&[name])).await
    }

    pub async fn create_service_account_token(
        &self,
        account_name: &str,
        token: &NewServiceAccountToken,
    ) -> Result<ServiceAccountToken, ApiError> {
        self.post_json(&path(&[account_name, "tokens"]), token).await
    }

    pub async fn list_service_account_tokens(
        &self,
        account_name: &str,
    ) -> Result<Value, ApiError> {
        self.get_json(&path(&[account_name, "tokens"]), &[]).await
    }

    pub async fn delete_service_account_token(
        &self,
        account_name: &str,
        token_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&path(&[account_name, "tokens", token_id])).await
    }
}
