use border0_types::{Connector, ConnectorToken, NewConnector, NewConnectorToken};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn create_connector(&self, connector: &NewConnector) -> Result<Connector, ApiError> {
        self.post_json(&["connector"], connector).await
    }

    pub async fn delete_connector(&self, connector_id: &str) -> Result<(), ApiError> {
        self.delete(&["connector", connector_id]).await
    }

    /// Create a token a connector process uses to join the control plane.
    pub async fn create_connector_token(
        &self,
        token: &NewConnectorToken,
    ) -> Result<ConnectorToken, ApiError> {
        self.post_json(&["connector", "token"], token).await
    }

    pub async fn delete_connector_token(
        &self,
        connector_id: &str,
        token_id: &str,
    ) -> Result<(), ApiError> {
        self.delete(&["connector", connector_id, "token", token_id]).await
    }
}
