use super::client::ApiClient;
use crate::error::Result;
use crate::model::{Board, Column, Space};

impl ApiClient {
    pub async fn get_spaces(&self) -> Result<Vec<Space>> {
        self.get("/spaces").await
    }

    pub async fn get_boards(&self, space_id: i64) -> Result<Vec<Board>> {
        self.get(&format!("/spaces/{space_id}/boards")).await
    }

    pub async fn get_columns(&self, board_id: i64) -> Result<Vec<Column>> {
        self.get(&format!("/boards/{board_id}/columns")).await
    }
}
