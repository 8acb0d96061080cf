use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::CardDraft;
use crate::sdk::Kaiten;
use crate::views::{self, CardFormat};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "kaiten-mcp";

/// Line-delimited JSON-RPC loop over stdio. Messages are handled one at a
/// time, each to completion, before the next line is dispatched.
pub async fn serve(kaiten: &Kaiten) -> Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message: Value = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "failed to parse message");
                continue;
            }
        };
        let is_shutdown = message["method"] == "shutdown";
        if let Some(response) = handle_message(kaiten, &message).await {
            let mut out = serde_json::to_string(&response)?;
            out.push('\n');
            stdout.write_all(out.as_bytes()).await?;
            stdout.flush().await?;
        }
        if is_shutdown {
            break;
        }
    }
    Ok(())
}

/// Handle one JSON-RPC message; `None` means no response (unknown methods
/// are ignored).
pub async fn handle_message(kaiten: &Kaiten, message: &Value) -> Option<Value> {
    let id = message.get("id").cloned().unwrap_or(Value::Null);
    match message["method"].as_str() {
        Some("initialize") => Some(result_response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )),
        Some("tools/list") => Some(result_response(id, json!({ "tools": tool_definitions() }))),
        Some("tools/call") => {
            let name = message["params"]["name"].as_str().unwrap_or_default();
            let empty = json!({});
            let arguments = message["params"].get("arguments").unwrap_or(&empty);
            match handle_tool_call(kaiten, name, arguments).await {
                Ok(result) => {
                    let text = serde_json::to_string_pretty(&result).unwrap_or_default();
                    Some(result_response(
                        id,
                        json!({ "content": [{ "type": "text", "text": text }] }),
                    ))
                }
                Err(err) => Some(error_response(id, format!("Tool {name} failed: {err}"))),
            }
        }
        Some("shutdown") => Some(result_response(id, Value::Null)),
        _ => None,
    }
}

fn result_response(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": -32603, "message": message },
    })
}

async fn handle_tool_call(kaiten: &Kaiten, name: &str, args: &Value) -> Result<Value> {
    match name {
        "kaiten_spaces" => to_value(kaiten.get_spaces().await?),

        "kaiten_boards" => to_value(kaiten.get_boards(optional_i64(args, "spaceId")).await?),

        "kaiten_columns" => {
            to_value(kaiten.get_columns(require_i64(args, "boardId")?).await?)
        }

        "kaiten_cards" => {
            let cards = kaiten
                .get_cards(optional_i64(args, "spaceId"), optional_i64(args, "boardId"))
                .await?;
            Ok(views::project_cards(&cards, list_format(args)))
        }

        "kaiten_card" => {
            let card = kaiten.get_card(require_i64(args, "cardId")?).await?;
            if flag(args, "simple") {
                Ok(Value::String(views::render_card_detail(&card)))
            } else {
                Ok(views::project_card(&card, CardFormat::Detail))
            }
        }

        "kaiten_create_card" => {
            let draft = CardDraft {
                title: require_str(args, "title")?.to_string(),
                board_id: require_i64(args, "boardId")?,
                column_id: require_i64(args, "columnId")?,
                description: optional_str(args, "description").map(str::to_string),
                ..Default::default()
            };
            to_value(kaiten.create_card(&draft).await?)
        }

        "kaiten_update_card" => {
            let card_id = require_i64(args, "cardId")?;
            let data: Value = serde_json::from_str(require_str(args, "data")?)
                .map_err(|e| Error::InvalidArgument(format!("bad patch JSON: {e}")))?;
            to_value(kaiten.update_card(card_id, data).await?)
        }

        "kaiten_delete_card" => {
            let card_id = require_i64(args, "cardId")?;
            kaiten.delete_card(card_id).await?;
            Ok(json!({ "deleted": card_id }))
        }

        "kaiten_move_card" => {
            let card = kaiten
                .move_to_column(require_i64(args, "cardId")?, require_i64(args, "columnId")?, None)
                .await?;
            to_value(card)
        }

        "kaiten_assign_card" => {
            let card = kaiten
                .assign_to(require_i64(args, "cardId")?, require_i64(args, "userId")?)
                .await?;
            to_value(card)
        }

        "kaiten_find_cards" => {
            let tag_name = require_str(args, "tagName")?;
            let cards = kaiten
                .get_cards(None, optional_i64(args, "boardId"))
                .await?;
            let matched: Vec<_> = cards.into_iter().filter(|c| c.has_tag(tag_name)).collect();
            Ok(views::project_cards(&matched, list_format(args)))
        }

        "kaiten_add_comment" => {
            let comment = kaiten
                .add_comment(require_i64(args, "cardId")?, require_str(args, "text")?, None)
                .await?;
            to_value(comment)
        }

        "kaiten_get_comments" => {
            to_value(kaiten.get_comments(require_i64(args, "cardId")?).await?)
        }

        "kaiten_create_subtask" => {
            let subtask = kaiten
                .create_subtask(require_i64(args, "parentId")?, require_str(args, "title")?, 0)
                .await?;
            to_value(subtask)
        }

        "kaiten_get_subtasks" => {
            let subtasks = kaiten.get_subtasks(require_i64(args, "cardId")?).await?;
            Ok(views::project_cards(&subtasks, CardFormat::List))
        }

        "kaiten_add_tag" => {
            let card = kaiten
                .add_tag(require_i64(args, "cardId")?, require_str(args, "tagName")?)
                .await?;
            to_value(card)
        }

        "kaiten_remove_tag" => {
            let card = kaiten
                .remove_tag(require_i64(args, "cardId")?, require_str(args, "tagName")?)
                .await?;
            to_value(card)
        }

        "kaiten_git_branch" => {
            let card = kaiten.get_card(require_i64(args, "cardId")?).await?;
            let branch = kaiten.create_git_branch(card.id, &card.title).await?;
            Ok(json!({ "branch": branch }))
        }

        "kaiten_git_checkout" => {
            let card = kaiten.get_card(require_i64(args, "cardId")?).await?;
            let branch = kaiten.checkout_git_branch(card.id, &card.title).await?;
            Ok(json!({ "branch": branch }))
        }

        "kaiten_git_commit" => {
            let card_id = require_i64(args, "cardId")?;
            // No message: fall back to the card's title.
            let message = match optional_str(args, "message") {
                Some(message) => message.to_string(),
                None => kaiten.get_card(card_id).await?.title,
            };
            kaiten.commit_git(card_id, &message).await?;
            Ok(json!({ "committed": true, "message": message }))
        }

        "kaiten_git_status" => Ok(Value::String(kaiten.git_status().await?)),

        "kaiten_git_push" => {
            let card = kaiten.get_card(require_i64(args, "cardId")?).await?;
            let branch = kaiten.git_push(card.id, &card.title).await?;
            Ok(json!({ "pushed": true, "branch": branch }))
        }

        "kaiten_users" => to_value(kaiten.get_users().await?),

        "kaiten_search_users" => to_value(kaiten.find_user(require_str(args, "query")?).await?),

        other => Err(Error::InvalidArgument(format!("Unknown tool: {other}"))),
    }
}

fn to_value<T: serde::Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn list_format(args: &Value) -> CardFormat {
    if flag(args, "minimal") {
        CardFormat::Minimal
    } else {
        CardFormat::List
    }
}

fn require_i64(args: &Value, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::InvalidArgument(format!("missing or non-numeric \"{key}\"")))
}

fn optional_i64(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(Value::as_i64)
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidArgument(format!("missing \"{key}\"")))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn flag(args: &Value, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn tool(name: &str, description: &str, properties: Value, required: &[&str]) -> Value {
    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    json!({ "name": name, "description": description, "inputSchema": schema })
}

fn number(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub fn tool_definitions() -> Vec<Value> {
    vec![
        tool(
            "kaiten_spaces",
            "Get list of available Kaiten spaces",
            json!({}),
            &[],
        ),
        tool(
            "kaiten_boards",
            "Get list of boards in a space",
            json!({ "spaceId": number("Space ID (optional, uses default if not specified)") }),
            &[],
        ),
        tool(
            "kaiten_columns",
            "Get list of columns in a board",
            json!({ "boardId": number("Board ID") }),
            &["boardId"],
        ),
        tool(
            "kaiten_cards",
            "Get list of cards (optimized format)",
            json!({
                "spaceId": number("Space ID (optional, uses default if not specified)"),
                "boardId": number("Board ID (optional)"),
                "minimal": boolean("Return minimal JSON format (token optimized)"),
            }),
            &[],
        ),
        tool(
            "kaiten_card",
            "Get card details",
            json!({
                "cardId": number("Card ID"),
                "simple": boolean("Return human-readable format"),
            }),
            &["cardId"],
        ),
        tool(
            "kaiten_create_card",
            "Create a new card",
            json!({
                "title": string("Card title"),
                "boardId": number("Board ID"),
                "columnId": number("Column ID"),
                "description": string("Card description (optional)"),
            }),
            &["title", "boardId", "columnId"],
        ),
        tool(
            "kaiten_update_card",
            "Update a card",
            json!({
                "cardId": number("Card ID"),
                "data": string("JSON string with card data to update"),
            }),
            &["cardId", "data"],
        ),
        tool(
            "kaiten_delete_card",
            "Delete a card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_move_card",
            "Move a card to different column",
            json!({
                "cardId": number("Card ID"),
                "columnId": number("Target column ID"),
            }),
            &["cardId", "columnId"],
        ),
        tool(
            "kaiten_assign_card",
            "Assign user to card",
            json!({
                "cardId": number("Card ID"),
                "userId": number("User ID to assign"),
            }),
            &["cardId", "userId"],
        ),
        tool(
            "kaiten_find_cards",
            "Find cards by tag (token optimized)",
            json!({
                "tagName": string("Tag name to filter by"),
                "boardId": number("Board ID (optional)"),
                "minimal": boolean("Return minimal JSON format"),
            }),
            &["tagName"],
        ),
        tool(
            "kaiten_add_comment",
            "Add comment to card",
            json!({
                "cardId": number("Card ID"),
                "text": string("Comment text"),
            }),
            &["cardId", "text"],
        ),
        tool(
            "kaiten_get_comments",
            "Get comments for card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_create_subtask",
            "Create subtask",
            json!({
                "parentId": number("Parent card ID"),
                "title": string("Subtask title"),
            }),
            &["parentId", "title"],
        ),
        tool(
            "kaiten_get_subtasks",
            "Get subtasks for card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_add_tag",
            "Add tag to card",
            json!({
                "cardId": number("Card ID"),
                "tagName": string("Tag name"),
            }),
            &["cardId", "tagName"],
        ),
        tool(
            "kaiten_remove_tag",
            "Remove tag from card",
            json!({
                "cardId": number("Card ID"),
                "tagName": string("Tag name"),
            }),
            &["cardId", "tagName"],
        ),
        tool(
            "kaiten_git_branch",
            "Create git branch for card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_git_checkout",
            "Checkout git branch for card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_git_commit",
            "Commit changes with card reference",
            json!({
                "cardId": number("Card ID"),
                "message": string("Commit message (optional)"),
            }),
            &["cardId"],
        ),
        tool(
            "kaiten_git_status",
            "Get git status",
            json!({}),
            &[],
        ),
        tool(
            "kaiten_git_push",
            "Push git branch for card",
            json!({ "cardId": number("Card ID") }),
            &["cardId"],
        ),
        tool(
            "kaiten_users",
            "Get list of users",
            json!({}),
            &[],
        ),
        tool(
            "kaiten_search_users",
            "Search users by query",
            json!({ "query": string("Search query") }),
            &["query"],
        ),
    ]
}
