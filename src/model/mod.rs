pub mod card;
pub mod comment;
pub mod container;
pub mod user;

pub use card::{Card, CardDraft, Predecessor, Tag, TagInput, TaskSpec};
pub use comment::Comment;
pub use container::{Board, Column, Lane, Space};
pub use user::User;
