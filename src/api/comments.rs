use serde_json::json;

use super::client::ApiClient;
use crate::error::Result;
use crate::model::Comment;

impl ApiClient {
    pub async fn get_comments(&self, card_id: i64) -> Result<Vec<Comment>> {
        self.get(&format!("/cards/{card_id}/comments")).await
    }

    pub async fn create_comment(
        &self,
        card_id: i64,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        let body = json!({
            "card_id": card_id,
            "text": text,
            "parent_id": parent_id,
        });
        self.post("/comments", &body).await
    }

    pub async fn update_comment(&self, comment_id: i64, text: &str) -> Result<Comment> {
        self.patch(&format!("/comments/{comment_id}"), &json!({ "text": text }))
            .await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.delete(&format!("/comments/{comment_id}")).await
    }
}
