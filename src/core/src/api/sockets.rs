use border0_types::{NewSocket, Socket};

use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn create_socket(&self, socket: &NewSocket) -> Result<Socket, ApiError> {
        self.post_json(&["socket"], socket).await
    }

    pub async fn delete_socket(&self, socket_id: &str) -> Result<(), ApiError> {
        self.delete(&["socket", socket_id]).await
    }
}
