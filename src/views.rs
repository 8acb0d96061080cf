use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::model::Card;

/// How much of a card to keep in the projected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFormat {
    /// Compact per-card summary for listings.
    List,
    /// Full detail view with nested state/planning/time sections.
    Detail,
    /// Token-minimal single/double-letter keys.
    Minimal,
}

pub fn card_status(condition: Option<i64>) -> &'static str {
    if condition == Some(1) {
        "active"
    } else {
        "archived"
    }
}

fn predecessor_status(state: Option<i64>) -> &'static str {
    match state {
        Some(3) => "done",
        Some(2) => "in progress",
        _ => "waiting",
    }
}

/// `"2024-01-15T10:30:00Z"` -> `"2024-01-15"`.
fn date_only(timestamp: &str) -> &str {
    timestamp.split('T').next().unwrap_or(timestamp)
}

/// Minutes to hours with one decimal: 90 -> `"1.5h"`, 60 -> `"1h"`.
fn hours_spent(minutes: f64) -> String {
    let hours = (minutes / 60.0 * 10.0).round() / 10.0;
    format!("{hours}h")
}

/// Cap at 500 characters with an ellipsis marker; shorter text unchanged.
fn truncated_description(description: &str) -> String {
    if description.chars().count() > 500 {
        let mut head: String = description.chars().take(500).collect();
        head.push_str("...");
        head
    } else {
        description.to_string()
    }
}

fn owner_name(card: &Card) -> String {
    card.owner
        .as_ref()
        .and_then(|o| o.full_name.clone())
        .unwrap_or_else(|| "unassigned".to_string())
}

fn board_title(card: &Card) -> String {
    card.board
        .as_ref()
        .map(|b| b.title.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn column_title(card: &Card) -> String {
    card.column
        .as_ref()
        .map(|c| c.title.clone())
        .unwrap_or_else(|| "unknown".to_string())
}

fn lane_title(card: &Card) -> String {
    card.lane
        .as_ref()
        .and_then(|l| l.title.clone())
        .unwrap_or_default()
}

fn time_spent(card: &Card) -> Value {
    match card.time_spent_sum.filter(|m| *m != 0.0) {
        Some(minutes) => json!(hours_spent(minutes)),
        None => Value::Null,
    }
}

fn date_field(value: &Option<String>) -> Value {
    match value {
        Some(ts) => json!(date_only(ts)),
        None => Value::Null,
    }
}

/// Pure projection of a card into the requested format. Idempotent over
/// the source record; never mutates or caches.
pub fn project_card(card: &Card, format: CardFormat) -> Value {
    match format {
        CardFormat::List => json!({
            "id": card.id,
            "title": card.title,
            "status": card_status(card.condition),
            "board": board_title(card),
            "column": column_title(card),
            "owner": owner_name(card),
            "size": card.size.clone().unwrap_or(Value::Null),
            "tags": card.tag_names(),
            "planned_start": date_field(&card.planned_start),
            "planned_end": date_field(&card.planned_end),
            "time_spent": time_spent(card),
        }),
        CardFormat::Detail => json!({
            "id": card.id,
            "title": card.title,
            "status": card_status(card.condition),
            "state": {
                "board": board_title(card),
                "column": column_title(card),
                "lane": lane_title(card),
            },
            "owner": owner_name(card),
            "members": card.members.iter()
                .filter_map(|m| m.full_name.clone())
                .collect::<Vec<_>>(),
            "size": card.size.clone().unwrap_or(Value::Null),
            "tags": card.tags.iter()
                .map(|t| json!({ "name": t.name, "color": t.color }))
                .collect::<Vec<_>>(),
            "planning": {
                "start": date_field(&card.planned_start),
                "end": date_field(&card.planned_end),
            },
            "time": {
                "spent": time_spent(card),
                "blocked": card.time_blocked_sum.unwrap_or(0.0),
            },
            "dependencies": {
                "predecessors": card.planned_predecessors.iter()
                    .map(|p| json!({
                        "id": p.id,
                        "title": p.title,
                        "status": predecessor_status(p.state),
                    }))
                    .collect::<Vec<_>>(),
            },
            "comments": card.comments_total.unwrap_or(0),
            "description": card.description.as_deref()
                .map(truncated_description)
                .unwrap_or_default(),
        }),
        CardFormat::Minimal => json!({
            "i": card.id,
            "t": card.title,
            "s": card_status(card.condition),
            "b": board_title(card),
            "c": column_title(card),
            "o": owner_name(card),
            "tg": card.tag_names(),
        }),
    }
}

/// Order-preserving projection over a list.
pub fn project_cards(cards: &[Card], format: CardFormat) -> Value {
    Value::Array(cards.iter().map(|c| project_card(c, format)).collect())
}

/// Human-readable listing, one block per card.
pub fn render_card_list(cards: &[Card], space_label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cards in space \"{space_label}\":\n");
    for (index, card) in cards.iter().enumerate() {
        let marker = if card.condition == Some(1) { "*" } else { "~" };
        let _ = writeln!(out, "{}. {} [{}] {}", index + 1, marker, card.id, card.title);
        let _ = writeln!(
            out,
            "   {} -> {} | {}",
            board_title(card),
            column_title(card),
            owner_name(card)
        );
        if let Some(size) = &card.size {
            if !size.is_null() {
                let _ = writeln!(out, "   size: {size}");
            }
        }
        out.push('\n');
    }
    let _ = writeln!(out, "Total cards: {}", cards.len());
    out
}

/// Human-readable detail view for a single card.
pub fn render_card_detail(card: &Card) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", card.title);
    let _ = writeln!(out, "ID: {}", card.id);
    let _ = writeln!(out, "Status: {}", card_status(card.condition));
    let _ = writeln!(out, "{} -> {}", board_title(card), column_title(card));
    let _ = writeln!(out, "Owner: {}", owner_name(card));
    if let Some(size) = &card.size {
        if !size.is_null() {
            let _ = writeln!(out, "Size: {size}");
        }
    }
    if let Some(start) = &card.planned_start {
        let end = card.planned_end.as_deref().map(date_only).unwrap_or("?");
        let _ = writeln!(out, "Planned: {} - {}", date_only(start), end);
    }
    if let Some(minutes) = card.time_spent_sum.filter(|m| *m != 0.0) {
        let _ = writeln!(out, "Time spent: {}", hours_spent(minutes));
    }
    if !card.tags.is_empty() {
        let _ = writeln!(out, "Tags: {}", card.tag_names().join(", "));
    }
    if !card.planned_predecessors.is_empty() {
        let titles: Vec<&str> = card
            .planned_predecessors
            .iter()
            .map(|p| p.title.as_str())
            .collect();
        let _ = writeln!(out, "Depends on: {}", titles.join(", "));
    }
    if card.comments_total.unwrap_or(0) > 0 {
        let _ = writeln!(out, "Comments: {}", card.comments_total.unwrap_or(0));
    }
    if let Some(description) = card.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "\nDescription:\n{}", truncated_description(description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card_from(value: Value) -> Card {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn condition_one_is_active_anything_else_archived() {
        assert_eq!(card_status(Some(1)), "active");
        for condition in [Some(0), Some(2), Some(3), Some(-1), Some(100), None] {
            assert_eq!(card_status(condition), "archived");
        }
    }

    #[test]
    fn dates_truncate_to_day() {
        let card = card_from(json!({
            "id": 1,
            "title": "T",
            "planned_start": "2024-01-15T10:30:00Z",
        }));
        let projected = project_card(&card, CardFormat::List);
        assert_eq!(projected["planned_start"], "2024-01-15");
        assert_eq!(projected["planned_end"], Value::Null);
    }

    #[test]
    fn minutes_project_to_hours() {
        assert_eq!(hours_spent(90.0), "1.5h");
        assert_eq!(hours_spent(60.0), "1h");
        assert_eq!(hours_spent(100.0), "1.7h");
    }

    #[test]
    fn zero_time_spent_is_null() {
        let card = card_from(json!({ "id": 1, "title": "T", "time_spent_sum": 0 }));
        assert_eq!(project_card(&card, CardFormat::List)["time_spent"], Value::Null);
    }

    #[test]
    fn long_description_truncates_with_ellipsis() {
        let card = card_from(json!({
            "id": 1,
            "title": "T",
            "description": "x".repeat(600),
        }));
        let projected = project_card(&card, CardFormat::Detail);
        let description = projected["description"].as_str().unwrap();
        assert_eq!(description.len(), 503);
        assert!(description.ends_with("..."));
        assert!(description.starts_with("xxx"));
    }

    #[test]
    fn short_description_unchanged() {
        let text = "y".repeat(400);
        let card = card_from(json!({ "id": 1, "title": "T", "description": text }));
        let projected = project_card(&card, CardFormat::Detail);
        assert_eq!(projected["description"].as_str().unwrap(), text);
    }

    #[test]
    fn placeholders_for_missing_references() {
        let card = card_from(json!({ "id": 1, "title": "T" }));
        let projected = project_card(&card, CardFormat::List);
        assert_eq!(projected["board"], "unknown");
        assert_eq!(projected["column"], "unknown");
        assert_eq!(projected["owner"], "unassigned");
        let detail = project_card(&card, CardFormat::Detail);
        assert_eq!(detail["state"]["lane"], "");
    }

    #[test]
    fn detail_projects_predecessor_status() {
        let card = card_from(json!({
            "id": 1,
            "title": "T",
            "plannedPredecessors": [
                { "id": 2, "title": "A", "state": 3 },
                { "id": 3, "title": "B", "state": 2 },
                { "id": 4, "title": "C", "state": 1 },
            ],
        }));
        let projected = project_card(&card, CardFormat::Detail);
        let predecessors = projected["dependencies"]["predecessors"].as_array().unwrap();
        assert_eq!(predecessors[0]["status"], "done");
        assert_eq!(predecessors[1]["status"], "in progress");
        assert_eq!(predecessors[2]["status"], "waiting");
    }

    #[test]
    fn projection_is_deterministic() {
        let card = card_from(json!({
            "id": 7,
            "title": "Repeat",
            "condition": 1,
            "tags": [{ "name": "a" }],
            "time_spent_sum": 90,
        }));
        for format in [CardFormat::List, CardFormat::Detail, CardFormat::Minimal] {
            let first = project_card(&card, format);
            let second = project_card(&card, format);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn minimal_uses_short_keys() {
        let card = card_from(json!({
            "id": 5,
            "title": "Tiny",
            "condition": 1,
            "tags": [{ "name": "x" }],
        }));
        let projected = project_card(&card, CardFormat::Minimal);
        assert_eq!(projected["i"], 5);
        assert_eq!(projected["t"], "Tiny");
        assert_eq!(projected["s"], "active");
        assert_eq!(projected["tg"], json!(["x"]));
        assert!(projected.get("id").is_none());
    }

    #[test]
    fn list_projection_preserves_order() {
        let cards: Vec<Card> = (1..=3)
            .map(|id| card_from(json!({ "id": id, "title": format!("C{id}") })))
            .collect();
        let projected = project_cards(&cards, CardFormat::List);
        let ids: Vec<i64> = projected
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn render_list_counts_cards() {
        let cards: Vec<Card> = vec![
            card_from(json!({ "id": 1, "title": "First", "condition": 1 })),
            card_from(json!({ "id": 2, "title": "Second", "condition": 2 })),
        ];
        let text = render_card_list(&cards, "42");
        assert!(text.contains("1. * [1] First"));
        assert!(text.contains("2. ~ [2] Second"));
        assert!(text.contains("Total cards: 2"));
    }

    #[test]
    fn render_detail_includes_planning() {
        let card = card_from(json!({
            "id": 9,
            "title": "Plan",
            "condition": 1,
            "planned_start": "2024-01-15T10:30:00Z",
            "planned_end": "2024-02-01T00:00:00Z",
        }));
        let text = render_card_detail(&card);
        assert!(text.contains("Planned: 2024-01-15 - 2024-02-01"));
        assert!(text.contains("Status: active"));
    }
}
