use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::container::{Board, Column, Lane};
use super::user::User;

/// A Kaiten card as the API returns it. Unknown fields are ignored; the
/// fields here are the ones the projections and the guard consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    /// Server-side condition code: 1 = active, 2 = archived, 3 = done.
    #[serde(default)]
    pub condition: Option<i64>,
    #[serde(default)]
    pub board_id: Option<i64>,
    #[serde(default)]
    pub column_id: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub board: Option<Board>,
    #[serde(default)]
    pub column: Option<Column>,
    #[serde(default)]
    pub lane: Option<Lane>,
    #[serde(default)]
    pub owner: Option<User>,
    #[serde(default)]
    pub members: Vec<User>,
    /// Opaque size scalar; passed through untouched.
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub planned_start: Option<String>,
    #[serde(default)]
    pub planned_end: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub time_spent_sum: Option<f64>,
    #[serde(default)]
    pub time_blocked_sum: Option<f64>,
    #[serde(default, rename = "plannedPredecessors")]
    pub planned_predecessors: Vec<Predecessor>,
    #[serde(default)]
    pub comments_total: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Card {
    pub fn has_tag(&self, tag_name: &str) -> bool {
        self.tags.iter().any(|t| t.name == tag_name)
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.name.clone()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<i64>,
}

/// A predecessor dependency as embedded in a card's detail payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Predecessor {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub state: Option<i64>,
}

/// A tag given either as a bare name or as a full record with a color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagInput {
    Name(String),
    Record { name: String, color: Option<i64> },
}

impl TagInput {
    pub fn to_value(&self) -> Value {
        match self {
            TagInput::Name(name) => json!({ "name": name }),
            TagInput::Record { name, color: None } => json!({ "name": name }),
            TagInput::Record {
                name,
                color: Some(color),
            } => json!({ "name": name, "color": color }),
        }
    }
}

/// Fields for creating a card. Optional fields are only included in the
/// request body when set, so the server applies its own defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardDraft {
    pub title: String,
    pub board_id: i64,
    pub column_id: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub lane_id: Option<i64>,
    #[serde(default)]
    pub tags: Option<Vec<TagInput>>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub planned_start: Option<String>,
    #[serde(default)]
    pub planned_end: Option<String>,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

impl CardDraft {
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "title": self.title,
            "board_id": self.board_id,
            "column_id": self.column_id,
        });
        let obj = body.as_object_mut().unwrap();
        if let Some(description) = &self.description {
            obj.insert("description".into(), json!(description));
        }
        if let Some(lane_id) = self.lane_id {
            obj.insert("lane_id".into(), json!(lane_id));
        }
        if let Some(tags) = &self.tags {
            let tags: Vec<Value> = tags.iter().map(TagInput::to_value).collect();
            obj.insert("tags".into(), json!(tags));
        }
        if let Some(size) = &self.size {
            obj.insert("size".into(), size.clone());
        }
        if let Some(planned_start) = &self.planned_start {
            obj.insert("planned_start".into(), json!(planned_start));
        }
        if let Some(planned_end) = &self.planned_end {
            obj.insert("planned_end".into(), json!(planned_end));
        }
        if let Some(parent_id) = self.parent_id {
            obj.insert("parent_id".into(), json!(parent_id));
        }
        body
    }
}

/// One step of a `create_task_flow` batch.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<TagInput>>,
}
