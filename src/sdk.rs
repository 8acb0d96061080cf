use serde_json::{json, Value};
use tracing::warn;

use crate::api::KaitenApi;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::git;
use crate::guard::AccessGuard;
use crate::model::{Board, Card, CardDraft, Column, Comment, Space, TagInput, TaskSpec, User};

/// Verb-based facade over the REST endpoints: name resolution, the access
/// guard, and the small multi-step flows. Holds no entity state between
/// calls; every lookup re-fetches.
pub struct Kaiten {
    api: Box<dyn KaitenApi>,
    guard: AccessGuard,
    default_space_id: Option<i64>,
}

impl Kaiten {
    pub fn new(api: Box<dyn KaitenApi>, config: &AppConfig) -> Self {
        Self {
            api,
            guard: AccessGuard::from_config(config),
            default_space_id: config.default_space_id,
        }
    }

    pub fn default_space_id(&self) -> Option<i64> {
        self.default_space_id
    }

    fn space_or_default(&self, space_id: Option<i64>) -> Result<i64> {
        space_id.or(self.default_space_id).ok_or_else(|| {
            Error::Config(
                "Space ID is required. Set KAITEN_DEFAULT_SPACE_ID or pass a space id.".into(),
            )
        })
    }

    /// Card-scoped guard: resolve the card to its board, then apply the
    /// board allowlist. A failed lookup is allowed through (and logged)
    /// unless the failure is itself an allowlist violation.
    async fn check_card(&self, card_id: i64) -> Result<()> {
        if !self.guard.restricts_boards() {
            return Ok(());
        }
        match self.api.get_card(card_id).await {
            Ok(card) => {
                if let Some(board_id) = card.board_id {
                    if self.guard.check_board(board_id).is_err() {
                        return Err(Error::CardNotAllowed { card_id, board_id });
                    }
                }
                Ok(())
            }
            Err(err) if err.is_access_denied() => Err(err),
            Err(err) => {
                warn!(card_id, error = %err, "card lookup failed during allowlist check, allowing");
                Ok(())
            }
        }
    }

    // ---- spaces / boards / columns ----

    /// List spaces, narrowed to the allowlist when one is configured.
    pub async fn get_spaces(&self) -> Result<Vec<Space>> {
        let spaces = self.api.get_spaces().await?;
        Ok(spaces
            .into_iter()
            .filter(|s| self.guard.space_allowed(s.id))
            .collect())
    }

    pub async fn get_boards(&self, space_id: Option<i64>) -> Result<Vec<Board>> {
        let space_id = self.space_or_default(space_id)?;
        self.guard.check_space(space_id)?;
        self.api.get_boards(space_id).await
    }

    pub async fn get_columns(&self, board_id: i64) -> Result<Vec<Column>> {
        self.guard.check_board(board_id)?;
        self.api.get_columns(board_id).await
    }

    /// Resolve a space by title or literal id string.
    pub async fn space_id_by_title(&self, query: &str) -> Result<i64> {
        let spaces = self.api.get_spaces().await?;
        spaces
            .iter()
            .find(|s| s.title == query || s.id.to_string() == query)
            .map(|s| s.id)
            .ok_or_else(|| Error::NotFound {
                kind: "space",
                query: query.to_string(),
            })
    }

    /// Resolve a board by title or literal id string within a space.
    pub async fn board_id_by_title(&self, query: &str, space_id: Option<i64>) -> Result<i64> {
        let space_id = self.space_or_default(space_id)?;
        self.guard.check_space(space_id)?;
        let boards = self.api.get_boards(space_id).await?;
        boards
            .iter()
            .find(|b| b.title == query || b.id.to_string() == query)
            .map(|b| b.id)
            .ok_or_else(|| Error::NotFound {
                kind: "board",
                query: query.to_string(),
            })
    }

    pub async fn column_id_by_title(&self, board_id: i64, query: &str) -> Result<i64> {
        self.guard.check_board(board_id)?;
        let columns = self.api.get_columns(board_id).await?;
        columns
            .iter()
            .find(|c| c.title == query || c.id.to_string() == query)
            .map(|c| c.id)
            .ok_or_else(|| Error::NotFound {
                kind: "column",
                query: query.to_string(),
            })
    }

    // ---- cards ----

    pub async fn get_cards(
        &self,
        space_id: Option<i64>,
        board_id: Option<i64>,
    ) -> Result<Vec<Card>> {
        let space_id = self.space_or_default(space_id)?;
        self.guard.check_space(space_id)?;
        if let Some(board_id) = board_id {
            self.guard.check_board(board_id)?;
        }
        self.api.get_cards(space_id, board_id).await
    }

    pub async fn get_card(&self, card_id: i64) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api.get_card(card_id).await
    }

    pub async fn create_card(&self, draft: &CardDraft) -> Result<Card> {
        self.guard.check_board(draft.board_id)?;
        self.api.create_card(draft.to_body()).await
    }

    /// Partial patch with raw server-side field names.
    pub async fn update_card(&self, card_id: i64, data: Value) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api.update_card(card_id, data).await
    }

    pub async fn delete_card(&self, card_id: i64) -> Result<()> {
        self.check_card(card_id).await?;
        self.api.delete_card(card_id).await
    }

    pub async fn move_to_column(
        &self,
        card_id: i64,
        column_id: i64,
        lane_id: Option<i64>,
    ) -> Result<Card> {
        self.check_card(card_id).await?;
        let mut body = json!({ "column_id": column_id });
        if let Some(lane_id) = lane_id {
            body["lane_id"] = json!(lane_id);
        }
        self.api.update_card(card_id, body).await
    }

    pub async fn assign_to(&self, card_id: i64, user_id: i64) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api
            .update_card(card_id, json!({ "members": [{ "id": user_id }] }))
            .await
    }

    pub async fn unassign_from(&self, card_id: i64, user_id: i64) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api
            .update_card(card_id, json!({ "members_remove": [user_id] }))
            .await
    }

    pub async fn archive(&self, card_id: i64) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api.update_card(card_id, json!({ "condition": 2 })).await
    }

    pub async fn unarchive(&self, card_id: i64) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api.update_card(card_id, json!({ "condition": 1 })).await
    }

    // ---- tags ----

    /// Additive: the server merges the tag into the card's existing set.
    pub async fn add_tag(&self, card_id: i64, tag_name: &str) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api
            .update_card(card_id, json!({ "tags": [{ "name": tag_name }] }))
            .await
    }

    pub async fn remove_tag(&self, card_id: i64, tag_name: &str) -> Result<Card> {
        self.check_card(card_id).await?;
        self.api
            .update_card(card_id, json!({ "tags_remove": [tag_name] }))
            .await
    }

    pub async fn set_tags(&self, card_id: i64, tags: &[TagInput]) -> Result<Card> {
        self.check_card(card_id).await?;
        let tags: Vec<Value> = tags.iter().map(TagInput::to_value).collect();
        self.api.update_card(card_id, json!({ "tags": tags })).await
    }

    pub async fn cards_with_tag(&self, tag_name: &str, space_id: Option<i64>) -> Result<Vec<Card>> {
        let cards = self.get_cards(space_id, None).await?;
        Ok(cards.into_iter().filter(|c| c.has_tag(tag_name)).collect())
    }

    pub async fn cards_without_tag(
        &self,
        tag_name: &str,
        space_id: Option<i64>,
    ) -> Result<Vec<Card>> {
        let cards = self.get_cards(space_id, None).await?;
        Ok(cards.into_iter().filter(|c| !c.has_tag(tag_name)).collect())
    }

    // ---- subtasks ----

    pub async fn create_subtask(&self, parent_id: i64, title: &str, position: i64) -> Result<Card> {
        self.check_card(parent_id).await?;
        self.api
            .create_card(json!({
                "parent_id": parent_id,
                "title": title,
                "position": position,
            }))
            .await
    }

    pub async fn get_subtasks(&self, card_id: i64) -> Result<Vec<Card>> {
        self.check_card(card_id).await?;
        self.api.get_subtasks(card_id).await
    }

    pub async fn toggle_subtask(&self, subtask_id: i64, complete: bool) -> Result<Card> {
        self.check_card(subtask_id).await?;
        let condition = if complete { 3 } else { 1 };
        self.api
            .update_card(subtask_id, json!({ "condition": condition }))
            .await
    }

    pub async fn delete_subtask(&self, subtask_id: i64) -> Result<()> {
        self.check_card(subtask_id).await?;
        self.api.delete_card(subtask_id).await
    }

    /// Create subtasks sequentially, patching description and tags right
    /// after each creation. Not atomic: a failure partway through leaves
    /// the earlier subtasks created.
    pub async fn create_task_flow(&self, parent_id: i64, tasks: &[TaskSpec]) -> Result<Vec<Card>> {
        let mut created = Vec::with_capacity(tasks.len());
        for (position, task) in tasks.iter().enumerate() {
            let subtask = self
                .create_subtask(parent_id, &task.title, position as i64)
                .await?;
            if let Some(description) = &task.description {
                self.update_card(subtask.id, json!({ "description": description }))
                    .await?;
            }
            if let Some(tags) = &task.tags {
                let tags: Vec<Value> = tags.iter().map(TagInput::to_value).collect();
                self.update_card(subtask.id, json!({ "tags": tags })).await?;
            }
            created.push(subtask);
        }
        Ok(created)
    }

    // ---- comments ----

    pub async fn add_comment(
        &self,
        card_id: i64,
        text: &str,
        parent_id: Option<i64>,
    ) -> Result<Comment> {
        self.check_card(card_id).await?;
        self.api.create_comment(card_id, text, parent_id).await
    }

    pub async fn get_comments(&self, card_id: i64) -> Result<Vec<Comment>> {
        self.check_card(card_id).await?;
        self.api.get_comments(card_id).await
    }

    pub async fn update_comment(&self, comment_id: i64, text: &str) -> Result<Comment> {
        self.api.update_comment(comment_id, text).await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<()> {
        self.api.delete_comment(comment_id).await
    }

    // ---- users ----

    pub async fn get_users(&self) -> Result<Vec<User>> {
        self.api.get_users().await
    }

    pub async fn current_user(&self) -> Result<User> {
        self.api.get_current_user().await
    }

    /// First search hit, or not-found.
    pub async fn find_user(&self, query: &str) -> Result<User> {
        let users = self.api.search_users(query).await?;
        users.into_iter().next().ok_or_else(|| Error::NotFound {
            kind: "user",
            query: query.to_string(),
        })
    }

    // ---- local git ----

    pub async fn current_branch(&self) -> Result<String> {
        git::current_branch().await
    }

    pub async fn create_git_branch(&self, card_id: i64, title: &str) -> Result<String> {
        if !git::is_git_repo().await {
            return Err(Error::NotARepo);
        }
        git::create_branch(card_id, title).await
    }

    pub async fn checkout_git_branch(&self, card_id: i64, title: &str) -> Result<String> {
        if !git::is_git_repo().await {
            return Err(Error::NotARepo);
        }
        git::checkout_branch(card_id, title).await
    }

    pub async fn commit_git(&self, card_id: i64, message: &str) -> Result<()> {
        git::commit_changes(card_id, message).await
    }

    pub async fn git_status(&self) -> Result<String> {
        git::status_short().await
    }

    pub async fn git_changed_files(&self) -> Result<Vec<String>> {
        git::changed_files().await
    }

    pub async fn git_untracked_files(&self) -> Result<Vec<String>> {
        git::untracked_files().await
    }

    pub async fn git_add_all(&self) -> Result<()> {
        git::add_all().await
    }

    pub async fn git_remote_url(&self) -> Option<String> {
        git::remote_url().await
    }

    /// Push the card's feature branch with upstream tracking.
    pub async fn git_push(&self, card_id: i64, title: &str) -> Result<String> {
        if !git::is_git_repo().await {
            return Err(Error::NotARepo);
        }
        let branch = git::branch_name(card_id, title);
        git::push_branch(&branch).await?;
        Ok(branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::{
        board, card_on_board, card_with_tags, column, space, user, MockApi,
    };
    use std::sync::{Arc, Mutex};

    fn config(spaces: Option<Vec<i64>>, boards: Option<Vec<i64>>) -> AppConfig {
        AppConfig {
            default_space_id: Some(1),
            allowed_space_ids: spaces,
            allowed_board_ids: boards,
            ..Default::default()
        }
    }

    fn sdk(mock: MockApi, config: &AppConfig) -> (Kaiten, Arc<Mutex<Vec<String>>>) {
        let calls = mock.calls.clone();
        (Kaiten::new(Box::new(mock), config), calls)
    }

    fn draft(board_id: i64) -> CardDraft {
        CardDraft {
            title: "Task".into(),
            board_id,
            column_id: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn guard_blocks_create_before_any_request() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, Some(vec![1])));
        let err = kaiten.create_card(&draft(2)).await.unwrap_err();
        assert!(matches!(err, Error::BoardNotAllowed(2)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn guard_blocks_board_scoped_list() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, Some(vec![1])));
        let err = kaiten.get_cards(None, Some(5)).await.unwrap_err();
        assert!(matches!(err, Error::BoardNotAllowed(5)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn guard_blocks_space_scoped_list() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(Some(vec![7]), None));
        let err = kaiten.get_cards(Some(8), None).await.unwrap_err();
        assert!(matches!(err, Error::SpaceNotAllowed(8)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn card_guard_denies_card_on_foreign_board() {
        let mut mock = MockApi::new();
        mock.card = Some(card_on_board(5, "T", 2));
        let (kaiten, calls) = sdk(mock, &config(None, Some(vec![1])));

        let err = kaiten.update_card(5, json!({ "title": "x" })).await.unwrap_err();
        assert!(matches!(
            err,
            Error::CardNotAllowed { card_id: 5, board_id: 2 }
        ));
        // The lookup ran, the mutation never did.
        assert_eq!(calls.lock().unwrap().as_slice(), &["get_card 5"]);
    }

    #[tokio::test]
    async fn card_guard_allows_card_on_allowed_board() {
        let mut mock = MockApi::new();
        mock.card = Some(card_on_board(5, "T", 1));
        let (kaiten, calls) = sdk(mock, &config(None, Some(vec![1])));

        kaiten.update_card(5, json!({ "title": "x" })).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], "get_card 5");
        assert!(recorded[1].starts_with("update_card 5"));
    }

    #[tokio::test]
    async fn card_guard_fails_open_on_lookup_failure() {
        let mut mock = MockApi::new();
        mock.fail_card_lookup = true;
        let (kaiten, calls) = sdk(mock, &config(None, Some(vec![1])));

        kaiten.update_card(5, json!({ "title": "x" })).await.unwrap();
        assert!(calls.lock().unwrap().iter().any(|c| c.starts_with("update_card 5")));
    }

    #[tokio::test]
    async fn no_allowlist_skips_card_lookup_entirely() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.update_card(5, json!({ "title": "x" })).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].starts_with("update_card 5"));
    }

    #[tokio::test]
    async fn move_sends_column_and_optional_lane() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.move_to_column(5, 10, None).await.unwrap();
        kaiten.move_to_column(5, 10, Some(3)).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], r#"update_card 5 {"column_id":10}"#);
        assert_eq!(recorded[1], r#"update_card 5 {"column_id":10,"lane_id":3}"#);
    }

    #[tokio::test]
    async fn assign_and_unassign_bodies() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.assign_to(5, 77).await.unwrap();
        kaiten.unassign_from(5, 77).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], r#"update_card 5 {"members":[{"id":77}]}"#);
        assert_eq!(recorded[1], r#"update_card 5 {"members_remove":[77]}"#);
    }

    #[tokio::test]
    async fn archive_toggles_condition() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.archive(5).await.unwrap();
        kaiten.unarchive(5).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], r#"update_card 5 {"condition":2}"#);
        assert_eq!(recorded[1], r#"update_card 5 {"condition":1}"#);
    }

    #[tokio::test]
    async fn tag_mutations_are_additive_and_by_name() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.add_tag(5, "urgent").await.unwrap();
        kaiten.remove_tag(5, "urgent").await.unwrap();
        kaiten
            .set_tags(5, &[TagInput::Name("a".into()), TagInput::Name("b".into())])
            .await
            .unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], r#"update_card 5 {"tags":[{"name":"urgent"}]}"#);
        assert_eq!(recorded[1], r#"update_card 5 {"tags_remove":["urgent"]}"#);
        assert_eq!(
            recorded[2],
            r#"update_card 5 {"tags":[{"name":"a"},{"name":"b"}]}"#
        );
    }

    #[tokio::test]
    async fn subtask_toggle_uses_condition_codes() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.toggle_subtask(5, true).await.unwrap();
        kaiten.toggle_subtask(5, false).await.unwrap();
        let recorded = calls.lock().unwrap();
        assert_eq!(recorded[0], r#"update_card 5 {"condition":3}"#);
        assert_eq!(recorded[1], r#"update_card 5 {"condition":1}"#);
    }

    #[tokio::test]
    async fn task_flow_creates_in_order_with_patches() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        let tasks = vec![
            TaskSpec {
                title: "First".into(),
                description: Some("d1".into()),
                tags: Some(vec![TagInput::Name("x".into())]),
            },
            TaskSpec {
                title: "Second".into(),
                description: None,
                tags: None,
            },
            TaskSpec {
                title: "Third".into(),
                description: Some("d3".into()),
                tags: None,
            },
        ];
        let created = kaiten.create_task_flow(9, &tasks).await.unwrap();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0].title, "First");
        assert_eq!(created[2].title, "Third");

        let recorded = calls.lock().unwrap();
        assert_eq!(
            recorded.as_slice(),
            &[
                "create_card First".to_string(),
                r#"update_card 100 {"description":"d1"}"#.to_string(),
                r#"update_card 100 {"tags":[{"name":"x"}]}"#.to_string(),
                "create_card Second".to_string(),
                "create_card Third".to_string(),
                r#"update_card 102 {"description":"d3"}"#.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn task_flow_stops_without_rollback_on_failure() {
        let mut mock = MockApi::new();
        mock.fail_update_at = Some(0);
        let (kaiten, calls) = sdk(mock, &config(None, None));
        let tasks = vec![
            TaskSpec {
                title: "One".into(),
                description: None,
                tags: None,
            },
            TaskSpec {
                title: "Two".into(),
                description: Some("fails".into()),
                tags: None,
            },
            TaskSpec {
                title: "Three".into(),
                description: None,
                tags: None,
            },
        ];
        let err = kaiten.create_task_flow(9, &tasks).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));

        let recorded = calls.lock().unwrap();
        // Subtasks one and two were created, the failed patch stopped the
        // flow, and subtask three was never requested. No deletes issued.
        assert_eq!(recorded[0], "create_card One");
        assert_eq!(recorded[1], "create_card Two");
        assert!(recorded[2].starts_with("update_card 101"));
        assert_eq!(recorded.len(), 3);
        assert!(!recorded.iter().any(|c| c.contains("Three")));
        assert!(!recorded.iter().any(|c| c.starts_with("delete_card")));
    }

    #[tokio::test]
    async fn board_resolution_matches_title_or_literal_id() {
        let mut mock = MockApi::new();
        mock.boards = vec![board(11, "Backlog"), board(12, "Sprint")];
        let (kaiten, _) = sdk(mock, &config(None, None));
        assert_eq!(kaiten.board_id_by_title("Sprint", None).await.unwrap(), 12);
        assert_eq!(kaiten.board_id_by_title("11", None).await.unwrap(), 11);
        let err = kaiten.board_id_by_title("Nope", None).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "board", .. }));
    }

    #[tokio::test]
    async fn space_resolution_matches_title_or_literal_id() {
        let mut mock = MockApi::new();
        mock.spaces = vec![space(1, "Dev"), space(2, "Ops")];
        let (kaiten, _) = sdk(mock, &config(None, None));
        assert_eq!(kaiten.space_id_by_title("Ops").await.unwrap(), 2);
        assert_eq!(kaiten.space_id_by_title("1").await.unwrap(), 1);
        let err = kaiten.space_id_by_title("QA").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "space", .. }));
    }

    #[tokio::test]
    async fn column_resolution_not_found() {
        let mut mock = MockApi::new();
        mock.columns = vec![column(21, "To Do")];
        let (kaiten, _) = sdk(mock, &config(None, None));
        assert_eq!(kaiten.column_id_by_title(1, "To Do").await.unwrap(), 21);
        let err = kaiten.column_id_by_title(1, "Done").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "column", .. }));
    }

    #[tokio::test]
    async fn space_listing_filtered_by_allowlist() {
        let mut mock = MockApi::new();
        mock.spaces = vec![space(1, "Allowed"), space(2, "Hidden")];
        let (kaiten, _) = sdk(mock, &config(Some(vec![1]), None));
        let spaces = kaiten.get_spaces().await.unwrap();
        assert_eq!(spaces.len(), 1);
        assert_eq!(spaces[0].id, 1);
    }

    #[tokio::test]
    async fn tag_filters_split_cards() {
        let mut mock = MockApi::new();
        mock.cards = vec![
            card_with_tags(1, "A", &["bug"]),
            card_with_tags(2, "B", &["feature"]),
            card_with_tags(3, "C", &["bug", "feature"]),
        ];
        let (kaiten, _) = sdk(mock, &config(None, None));
        let with = kaiten.cards_with_tag("bug", None).await.unwrap();
        assert_eq!(with.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3]);
        let mock2 = {
            let mut m = MockApi::new();
            m.cards = vec![
                card_with_tags(1, "A", &["bug"]),
                card_with_tags(2, "B", &["feature"]),
            ];
            m
        };
        let (kaiten2, _) = sdk(mock2, &config(None, None));
        let without = kaiten2.cards_without_tag("bug", None).await.unwrap();
        assert_eq!(without.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn find_user_returns_first_hit_or_not_found() {
        let mut mock = MockApi::new();
        mock.users = vec![user(1, "Alice"), user(2, "Alina")];
        let (kaiten, _) = sdk(mock, &config(None, None));
        assert_eq!(kaiten.find_user("Ali").await.unwrap().id, 1);

        let (empty, _) = sdk(MockApi::new(), &config(None, None));
        let err = empty.find_user("nobody").await.unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: "user", .. }));
    }

    #[tokio::test]
    async fn missing_space_id_is_a_config_error() {
        let mut cfg = config(None, None);
        cfg.default_space_id = None;
        let (kaiten, calls) = sdk(MockApi::new(), &cfg);
        let err = kaiten.get_cards(None, None).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn comments_pass_thread_parent() {
        let (kaiten, calls) = sdk(MockApi::new(), &config(None, None));
        kaiten.add_comment(5, "hello", Some(3)).await.unwrap();
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &["create_comment 5 hello Some(3)"]
        );
    }
}
