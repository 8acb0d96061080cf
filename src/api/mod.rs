pub mod boards;
pub mod cards;
pub mod client;
pub mod comments;
pub mod users;

use async_trait::async_trait;
use serde_json::Value;

pub use client::ApiClient;

use crate::error::Result;
use crate::model::{Board, Card, Column, Comment, Space, User};

/// The REST boundary as a trait so the facade can be exercised against a
/// mock in tests.
#[async_trait]
pub trait KaitenApi: Send + Sync {
    async fn get_spaces(&self) -> Result<Vec<Space>>;
    async fn get_cards(&self, space_id: i64, board_id: Option<i64>) -> Result<Vec<Card>>;
    async fn get_card(&self, card_id: i64) -> Result<Card>;
    async fn create_card(&self, body: Value) -> Result<Card>;
    async fn update_card(&self, card_id: i64, body: Value) -> Result<Card>;
    async fn delete_card(&self, card_id: i64) -> Result<()>;
    async fn get_subtasks(&self, card_id: i64) -> Result<Vec<Card>>;
    async fn get_boards(&self, space_id: i64) -> Result<Vec<Board>>;
    async fn get_columns(&self, board_id: i64) -> Result<Vec<Column>>;
    async fn get_comments(&self, card_id: i64) -> Result<Vec<Comment>>;
    async fn create_comment(
        &self,
        card_id: i64,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment>;
    async fn update_comment(&self, comment_id: i64, text: &str) -> Result<Comment>;
    async fn delete_comment(&self, comment_id: i64) -> Result<()>;
    async fn get_users(&self) -> Result<Vec<User>>;
    async fn get_current_user(&self) -> Result<User>;
    async fn search_users(&self, query: &str) -> Result<Vec<User>>;
}

#[async_trait]
impl KaitenApi for ApiClient {
    async fn get_spaces(&self) -> Result<Vec<Space>> {
        ApiClient::get_spaces(self).await
    }

    async fn get_cards(&self, space_id: i64, board_id: Option<i64>) -> Result<Vec<Card>> {
        ApiClient::get_cards(self, space_id, board_id).await
    }

    async fn get_card(&self, card_id: i64) -> Result<Card> {
        ApiClient::get_card(self, card_id).await
    }

    async fn create_card(&self, body: Value) -> Result<Card> {
        ApiClient::create_card(self, &body).await
    }

    async fn update_card(&self, card_id: i64, body: Value) -> Result<Card> {
        ApiClient::update_card(self, card_id, &body).await
    }

    async fn delete_card(&self, card_id: i64) -> Result<()> {
        ApiClient::delete_card(self, card_id).await
    }

    async fn get_subtasks(&self, card_id: i64) -> Result<Vec<Card>> {
        ApiClient::get_subtasks(self, card_id).await
    }

    async fn get_boards(&self, space_id: i64) -> Result<Vec<Board>> {
        ApiClient::get_boards(self, space_id).await
    }

    async fn get_columns(&self, board_id: i64) -> Result<Vec<Column>> {
        ApiClient::get_columns(self, board_id).await
    }

    async fn get_comments(&self, card_id: i64) -> Result<Vec<Comment>> {
        ApiClient::get_comments(self, card_id).await
    }

    async fn create_comment(
        &self,
        card_id: i64,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        ApiClient::create_comment(self, card_id, text, parent_id).await
    }

    async fn update_comment(&self, comment_id: i64, text: &str) -> Result<Comment> {
        ApiClient::update_comment(self, comment_id, text).await
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        ApiClient::delete_comment(self, comment_id).await
    }

    async fn get_users(&self) -> Result<Vec<User>> {
        ApiClient::get_users(self).await
    }

    async fn get_current_user(&self) -> Result<User> {
        ApiClient::get_current_user(self).await
    }

    async fn search_users(&self, query: &str) -> Result<Vec<User>> {
        ApiClient::search_users(self, query).await
    }
}
