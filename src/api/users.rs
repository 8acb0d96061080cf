use super::client::ApiClient;
use crate::error::Result;
use crate::model::User;

impl ApiClient {
    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.get("/users").await
    }

    pub async fn get_current_user(&self) -> Result<User> {
        self.get("/users/current").await
    }

    /// Free-text search against the API's own `search` parameter.
    pub async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.get_with_query("/users", &[("search", query.to_string())])
            .await
    }
}
