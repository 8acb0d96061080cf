use serde_json::Value;

use super::client::ApiClient;
use crate::error::Result;
use crate::model::Card;

impl ApiClient {
    /// List a space's cards, optionally filtered to one board.
    pub async fn get_cards(&self, space_id: i64, board_id: Option<i64>) -> Result<Vec<Card>> {
        let path = format!("/spaces/{space_id}/cards");
        match board_id {
            Some(board_id) => {
                self.get_with_query(&path, &[("board_id", board_id.to_string())])
                    .await
            }
            None => self.get(&path).await,
        }
    }

    pub async fn get_card(&self, card_id: i64) -> Result<Card> {
        self.get(&format!("/cards/{card_id}")).await
    }

    pub async fn create_card(&self, body: &Value) -> Result<Card> {
        self.post("/cards", body).await
    }

    /// Partial patch: only the fields present in `body` change.
    pub async fn update_card(&self, card_id: i64, body: &Value) -> Result<Card> {
        self.patch(&format!("/cards/{card_id}"), body).await
    }

    pub async fn delete_card(&self, card_id: i64) -> Result<()> {
        self.delete(&format!("/cards/{card_id}")).await
    }

    /// Subtasks are cards whose `parent_id` is set; creation and updates go
    /// through the card endpoints.
    pub async fn get_subtasks(&self, card_id: i64) -> Result<Vec<Card>> {
        self.get(&format!("/cards/{card_id}/subtasks")).await
    }
}
