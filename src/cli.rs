use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{Card, CardDraft, TagInput, TaskSpec};
use crate::sdk::Kaiten;
use crate::views::{self, CardFormat};

/// Dispatch one CLI invocation. Errors bubble to main, which prints them
/// to stderr and exits 1.
pub async fn run(kaiten: &Kaiten, args: &[String]) -> Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("help");

    match command {
        "cards" | "list-cards" => {
            let space_id = optional_id(args.get(1))?;
            let cards = kaiten.get_cards(space_id, None).await?;
            print_json(&views::project_cards(&cards, CardFormat::List))?;
        }

        "card" | "get-card" => {
            let card_id = require_id(args.get(1), "Card ID required")?;
            let card = kaiten.get_card(card_id).await?;
            print_json(&views::project_card(&card, CardFormat::Detail))?;
        }

        "simple" => {
            let space_id = optional_id(args.get(1))?;
            let cards = kaiten.get_cards(space_id, None).await?;
            let label = space_id
                .or(kaiten.default_space_id())
                .map(|id| id.to_string())
                .unwrap_or_else(|| "default".to_string());
            print!("{}", views::render_card_list(&cards, &label));
        }

        "card-simple" => {
            let card_id = require_id(args.get(1), "Card ID required")?;
            let card = kaiten.get_card(card_id).await?;
            print!("{}", views::render_card_detail(&card));
        }

        "create" => {
            let raw = require(args.get(1), "Usage: kaiten create <json>")?;
            let draft: CardDraft = serde_json::from_str(raw)
                .map_err(|e| Error::InvalidArgument(format!("bad card JSON: {e}")))?;
            let card = kaiten.create_card(&draft).await?;
            println!("Created card {}: {}", card.id, card.title);
        }

        "update" => {
            let card_id = require_id(args.get(1), "Usage: kaiten update <id> <json>")?;
            let raw = require(args.get(2), "Usage: kaiten update <id> <json>")?;
            let data: Value = serde_json::from_str(raw)
                .map_err(|e| Error::InvalidArgument(format!("bad patch JSON: {e}")))?;
            if !data.is_object() {
                return Err(Error::InvalidArgument("patch must be a JSON object".into()));
            }
            kaiten.update_card(card_id, data).await?;
            println!("Updated card {card_id}");
        }

        "delete" => {
            let card_id = require_id(args.get(1), "Usage: kaiten delete <id>")?;
            kaiten.delete_card(card_id).await?;
            println!("Deleted card {card_id}");
        }

        "move" => {
            let card_id = require_id(args.get(1), "Usage: kaiten move <id> <columnId> [laneId]")?;
            let column_id =
                require_id(args.get(2), "Usage: kaiten move <id> <columnId> [laneId]")?;
            let lane_id = optional_id(args.get(3))?;
            kaiten.move_to_column(card_id, column_id, lane_id).await?;
            println!("Moved card {card_id} to column {column_id}");
        }

        "assign" => {
            let card_id = require_id(args.get(1), "Usage: kaiten assign <id> <userId>")?;
            let user_id = require_id(args.get(2), "Usage: kaiten assign <id> <userId>")?;
            kaiten.assign_to(card_id, user_id).await?;
            println!("Assigned user {user_id} to card {card_id}");
        }

        "unassign" => {
            let card_id = require_id(args.get(1), "Usage: kaiten unassign <id> <userId>")?;
            let user_id = require_id(args.get(2), "Usage: kaiten unassign <id> <userId>")?;
            kaiten.unassign_from(card_id, user_id).await?;
            println!("Unassigned user {user_id} from card {card_id}");
        }

        "archive" => {
            let card_id = require_id(args.get(1), "Usage: kaiten archive <id>")?;
            kaiten.archive(card_id).await?;
            println!("Archived card {card_id}");
        }

        "unarchive" => {
            let card_id = require_id(args.get(1), "Usage: kaiten unarchive <id>")?;
            kaiten.unarchive(card_id).await?;
            println!("Unarchived card {card_id}");
        }

        "subtask" => match args.get(1).map(String::as_str) {
            Some("create") => {
                let parent_id =
                    require_id(args.get(2), "Usage: kaiten subtask create <parentId> <title>")?;
                let title = join_rest(args, 3, "Usage: kaiten subtask create <parentId> <title>")?;
                let subtask = kaiten.create_subtask(parent_id, &title, 0).await?;
                println!("Created subtask {}: {}", subtask.id, subtask.title);
            }
            Some("list") => {
                let card_id = require_id(args.get(2), "Usage: kaiten subtask list <cardId>")?;
                let subtasks = kaiten.get_subtasks(card_id).await?;
                print_json(&views::project_cards(&subtasks, CardFormat::List))?;
            }
            Some("done") => {
                let subtask_id = require_id(args.get(2), "Usage: kaiten subtask done <id>")?;
                kaiten.toggle_subtask(subtask_id, true).await?;
                println!("Subtask {subtask_id} marked done");
            }
            Some("undo") => {
                let subtask_id = require_id(args.get(2), "Usage: kaiten subtask undo <id>")?;
                kaiten.toggle_subtask(subtask_id, false).await?;
                println!("Subtask {subtask_id} reopened");
            }
            Some("delete") => {
                let subtask_id = require_id(args.get(2), "Usage: kaiten subtask delete <id>")?;
                kaiten.delete_subtask(subtask_id).await?;
                println!("Deleted subtask {subtask_id}");
            }
            _ => {
                return Err(Error::Usage(
                    "Usage: kaiten subtask create|list|done|undo|delete ...".into(),
                ))
            }
        },

        // A batch of subtasks in one go: title plus optional description and
        // tags per entry. Not atomic; earlier subtasks survive a failure.
        "taskflow" => {
            let parent_id = require_id(args.get(1), "Usage: kaiten taskflow <parentId> <json>")?;
            let raw = require(args.get(2), "Usage: kaiten taskflow <parentId> <json>")?;
            let tasks: Vec<TaskSpec> = serde_json::from_str(raw)
                .map_err(|e| Error::InvalidArgument(format!("bad task list JSON: {e}")))?;
            let created = kaiten.create_task_flow(parent_id, &tasks).await?;
            for subtask in &created {
                println!("Created subtask {}: {}", subtask.id, subtask.title);
            }
        }

        "comment" => match args.get(1).map(String::as_str) {
            Some("add") => {
                let card_id = require_id(args.get(2), "Usage: kaiten comment add <cardId> <text>")?;
                let text = join_rest(args, 3, "Usage: kaiten comment add <cardId> <text>")?;
                let comment = kaiten.add_comment(card_id, &text, None).await?;
                println!("Added comment {} to card {card_id}", comment.id);
            }
            Some("reply") => {
                let card_id =
                    require_id(args.get(2), "Usage: kaiten comment reply <cardId> <commentId> <text>")?;
                let parent_id =
                    require_id(args.get(3), "Usage: kaiten comment reply <cardId> <commentId> <text>")?;
                let text =
                    join_rest(args, 4, "Usage: kaiten comment reply <cardId> <commentId> <text>")?;
                let comment = kaiten.add_comment(card_id, &text, Some(parent_id)).await?;
                println!("Added reply {} to comment {parent_id}", comment.id);
            }
            Some("list") => {
                let card_id = require_id(args.get(2), "Usage: kaiten comment list <cardId>")?;
                let comments = kaiten.get_comments(card_id).await?;
                println!("{}", serde_json::to_string_pretty(&comments)?);
            }
            Some("edit") => {
                let comment_id =
                    require_id(args.get(2), "Usage: kaiten comment edit <commentId> <text>")?;
                let text = join_rest(args, 3, "Usage: kaiten comment edit <commentId> <text>")?;
                kaiten.update_comment(comment_id, &text).await?;
                println!("Updated comment {comment_id}");
            }
            Some("delete") => {
                let comment_id =
                    require_id(args.get(2), "Usage: kaiten comment delete <commentId>")?;
                kaiten.delete_comment(comment_id).await?;
                println!("Deleted comment {comment_id}");
            }
            _ => {
                return Err(Error::Usage(
                    "Usage: kaiten comment add|reply|list|edit|delete ...".into(),
                ))
            }
        },

        "space" => {
            let spaces = kaiten.get_spaces().await?;
            println!("{}", serde_json::to_string_pretty(&spaces)?);
        }

        "board" => {
            // The space can be given by id or by title.
            let space_id = match args.get(1) {
                Some(raw) => Some(match raw.parse::<i64>() {
                    Ok(id) => id,
                    Err(_) => kaiten.space_id_by_title(raw).await?,
                }),
                None => None,
            };
            let boards = kaiten.get_boards(space_id).await?;
            println!("{}", serde_json::to_string_pretty(&boards)?);
        }

        "column" => {
            let board_id = require_id(args.get(1), "Usage: kaiten column <boardId>")?;
            let columns = kaiten.get_columns(board_id).await?;
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }

        "user" => match args.get(1) {
            Some(query) => {
                let user = kaiten.find_user(query).await?;
                println!("{}", serde_json::to_string_pretty(&user)?);
            }
            None => {
                let users = kaiten.get_users().await?;
                println!("{}", serde_json::to_string_pretty(&users)?);
            }
        },

        "whoami" => {
            let user = kaiten.current_user().await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }

        "tag" => match args.get(1).map(String::as_str) {
            Some("add") => {
                let card_id = require_id(args.get(2), "Usage: kaiten tag add <cardId> <name>")?;
                let name = require(args.get(3), "Usage: kaiten tag add <cardId> <name>")?;
                kaiten.add_tag(card_id, name).await?;
                println!("Added tag \"{name}\" to card {card_id}");
            }
            Some("remove") => {
                let card_id = require_id(args.get(2), "Usage: kaiten tag remove <cardId> <name>")?;
                let name = require(args.get(3), "Usage: kaiten tag remove <cardId> <name>")?;
                kaiten.remove_tag(card_id, name).await?;
                println!("Removed tag \"{name}\" from card {card_id}");
            }
            Some("list") => {
                let card_id = require_id(args.get(2), "Usage: kaiten tag list <cardId>")?;
                let card = kaiten.get_card(card_id).await?;
                println!("{}", serde_json::to_string_pretty(&card.tag_names())?);
            }
            Some("set") => {
                let card_id =
                    require_id(args.get(2), "Usage: kaiten tag set <cardId> <name> [name...]")?;
                if args.len() <= 3 {
                    return Err(Error::Usage(
                        "Usage: kaiten tag set <cardId> <name> [name...]".into(),
                    ));
                }
                let tags: Vec<TagInput> = args[3..]
                    .iter()
                    .map(|name| TagInput::Name(name.clone()))
                    .collect();
                kaiten.set_tags(card_id, &tags).await?;
                println!("Set {} tags on card {card_id}", tags.len());
            }
            Some("filter") => {
                let name = require(args.get(2), "Usage: kaiten tag filter <name>")?;
                let cards = kaiten.cards_with_tag(name, None).await?;
                print_json(&views::project_cards(&cards, CardFormat::List))?;
            }
            Some("without") => {
                let name = require(args.get(2), "Usage: kaiten tag without <name>")?;
                let cards = kaiten.cards_without_tag(name, None).await?;
                print_json(&views::project_cards(&cards, CardFormat::List))?;
            }
            _ => {
                return Err(Error::Usage(
                    "Usage: kaiten tag add|remove|set|list|filter|without ...".into(),
                ))
            }
        },

        "find" => {
            let find = parse_find_args(&args[1..])?;
            let board_id = match &find.board {
                Some(board) => Some(match board.parse::<i64>() {
                    Ok(id) => id,
                    Err(_) => kaiten.board_id_by_title(board, None).await?,
                }),
                None => None,
            };
            let cards = kaiten.get_cards(None, board_id).await?;
            let matched: Vec<_> = cards.into_iter().filter(|c| c.has_tag(&find.tag)).collect();
            let format = if find.minimal {
                CardFormat::Minimal
            } else {
                CardFormat::List
            };
            print_json(&views::project_cards(&matched, format))?;
        }

        "git" => match args.get(1).map(String::as_str) {
            Some("branch") => {
                let card = fetch_card_for_git(kaiten, args.get(2), "kaiten git branch <cardId>").await?;
                let branch = kaiten.create_git_branch(card.id, &card.title).await?;
                println!("Created and switched to {branch}");
            }
            Some("checkout") => {
                let card =
                    fetch_card_for_git(kaiten, args.get(2), "kaiten git checkout <cardId>").await?;
                let branch = kaiten.checkout_git_branch(card.id, &card.title).await?;
                println!("Switched to {branch}");
            }
            Some("commit") => {
                let card = fetch_card_for_git(
                    kaiten,
                    args.get(2),
                    "kaiten git commit <cardId> [message]",
                )
                .await?;
                let message = if args.len() > 3 {
                    args[3..].join(" ")
                } else {
                    card.title.clone()
                };
                kaiten.git_add_all().await?;
                kaiten.commit_git(card.id, &message).await?;
                println!("Committed: [{}] {message}", card.id);
            }
            Some("status") => {
                println!("Branch: {}", kaiten.current_branch().await?);
                if let Some(remote) = kaiten.git_remote_url().await {
                    println!("Remote: {remote}");
                }
                let status = kaiten.git_status().await?;
                if status.is_empty() {
                    println!("Working tree clean");
                } else {
                    println!("{status}");
                }
                let changed = kaiten.git_changed_files().await?;
                if !changed.is_empty() {
                    println!("Changed: {}", changed.join(", "));
                }
                let untracked = kaiten.git_untracked_files().await?;
                if !untracked.is_empty() {
                    println!("Untracked: {}", untracked.join(", "));
                }
            }
            Some("push") => {
                let card = fetch_card_for_git(kaiten, args.get(2), "kaiten git push <cardId>").await?;
                let branch = kaiten.git_push(card.id, &card.title).await?;
                println!("Pushed {branch}");
            }
            _ => {
                return Err(Error::Usage(
                    "Usage: kaiten git branch|checkout|commit|status|push ...".into(),
                ))
            }
        },

        "mcp" => {
            crate::mcp::serve(kaiten).await?;
        }

        "help" | "--help" | "-h" => print_help(),

        other => {
            return Err(Error::Usage(format!(
                "Unknown command: {other}. Run \"kaiten help\" for usage."
            )))
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq)]
struct FindArgs {
    tag: String,
    minimal: bool,
    board: Option<String>,
}

/// `find <tag> [--minimal|-m] [--board=<id|name>]`
fn parse_find_args(args: &[String]) -> Result<FindArgs> {
    let mut tag = None;
    let mut minimal = false;
    let mut board = None;

    for arg in args {
        if arg == "--minimal" || arg == "-m" {
            minimal = true;
        } else if let Some(value) = arg.strip_prefix("--board=") {
            board = Some(value.to_string());
        } else if tag.is_none() {
            tag = Some(arg.clone());
        } else {
            return Err(Error::Usage(format!("Unexpected argument: {arg}")));
        }
    }

    let tag = tag.ok_or_else(|| {
        Error::Usage("Usage: kaiten find <tag> [--minimal|-m] [--board=<id|name>]".into())
    })?;
    Ok(FindArgs { tag, minimal, board })
}

fn require<'a>(arg: Option<&'a String>, usage: &str) -> Result<&'a str> {
    arg.map(String::as_str)
        .ok_or_else(|| Error::Usage(usage.to_string()))
}

fn require_id(arg: Option<&String>, usage: &str) -> Result<i64> {
    let raw = require(arg, usage)?;
    raw.parse()
        .map_err(|_| Error::InvalidArgument(format!("expected a numeric id, got \"{raw}\"")))
}

fn optional_id(arg: Option<&String>) -> Result<Option<i64>> {
    match arg {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidArgument(format!("expected a numeric id, got \"{raw}\""))),
        None => Ok(None),
    }
}

/// Branch and commit naming need the card's real title, so every git
/// subcommand resolves the card first.
async fn fetch_card_for_git(
    kaiten: &Kaiten,
    arg: Option<&String>,
    usage: &str,
) -> Result<Card> {
    let card_id = require_id(arg, &format!("Usage: {usage}"))?;
    kaiten.get_card(card_id).await
}

/// Remaining args joined with spaces, e.g. an unquoted title.
fn join_rest(args: &[String], from: usize, usage: &str) -> Result<String> {
    if args.len() <= from {
        return Err(Error::Usage(usage.to_string()));
    }
    Ok(args[from..].join(" "))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_help() {
    println!("kaiten — CLI and tool server for the Kaiten API\n");
    println!("USAGE:");
    println!("  kaiten cards|list-cards [spaceId]      List cards (optimized JSON)");
    println!("  kaiten card|get-card <id>              Card details (optimized JSON)");
    println!("  kaiten simple [spaceId]                List cards (human readable)");
    println!("  kaiten card-simple <id>                Card details (human readable)");
    println!("  kaiten create <json>                   Create a card");
    println!("  kaiten update <id> <json>              Patch a card");
    println!("  kaiten delete <id>                     Delete a card");
    println!("  kaiten move <id> <columnId> [laneId]   Move a card");
    println!("  kaiten assign <id> <userId>            Assign a user");
    println!("  kaiten unassign <id> <userId>          Unassign a user");
    println!("  kaiten archive <id>                    Archive a card");
    println!("  kaiten unarchive <id>                  Restore an archived card");
    println!("  kaiten subtask create <parentId> <title>");
    println!("  kaiten subtask list|done|undo|delete <id>");
    println!("  kaiten taskflow <parentId> <json>      Create a batch of subtasks");
    println!("  kaiten comment add <cardId> <text>");
    println!("  kaiten comment reply <cardId> <commentId> <text>");
    println!("  kaiten comment list <cardId>");
    println!("  kaiten comment edit|delete <commentId> ...");
    println!("  kaiten space                           List spaces");
    println!("  kaiten board [spaceId]                 List boards");
    println!("  kaiten column <boardId>                List columns");
    println!("  kaiten user [query]                    List or search users");
    println!("  kaiten whoami                          Current user");
    println!("  kaiten tag add|remove <cardId> <name>");
    println!("  kaiten tag set <cardId> <name> [name...]");
    println!("  kaiten tag list <cardId>");
    println!("  kaiten tag filter|without <name>");
    println!("  kaiten find <tag> [--minimal|-m] [--board=<id|name>]");
    println!("  kaiten git branch|checkout|push <cardId>");
    println!("  kaiten git commit <cardId> [message]");
    println!("  kaiten git status");
    println!("  kaiten mcp                             Run the JSON-RPC tool server");
    println!("  kaiten help                            This help");
    println!();
    println!("Config: ~/.kaiten/config, ./.kaiten.env (key=value, # comments).");
    println!("Keys: KAITEN_API_URL, KAITEN_API_TOKEN, KAITEN_DEFAULT_SPACE_ID,");
    println!("      KAITEN_ALLOWED_SPACE_IDS, KAITEN_ALLOWED_BOARD_IDS");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn find_parses_tag_only() {
        let parsed = parse_find_args(&args(&["bug"])).unwrap();
        assert_eq!(
            parsed,
            FindArgs {
                tag: "bug".into(),
                minimal: false,
                board: None
            }
        );
    }

    #[test]
    fn find_parses_minimal_flags() {
        assert!(parse_find_args(&args(&["bug", "--minimal"])).unwrap().minimal);
        assert!(parse_find_args(&args(&["-m", "bug"])).unwrap().minimal);
    }

    #[test]
    fn find_parses_board_value() {
        let parsed = parse_find_args(&args(&["bug", "--board=Sprint 1"])).unwrap();
        assert_eq!(parsed.board.as_deref(), Some("Sprint 1"));
    }

    #[test]
    fn find_requires_tag() {
        assert!(matches!(
            parse_find_args(&args(&["--minimal"])),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn find_rejects_extra_positional() {
        assert!(matches!(
            parse_find_args(&args(&["bug", "extra"])),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn ids_must_be_numeric() {
        assert!(matches!(
            require_id(Some(&"abc".to_string()), "usage"),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(require_id(Some(&"42".to_string()), "usage").unwrap(), 42);
        assert!(matches!(
            require_id(None, "usage text"),
            Err(Error::Usage(_))
        ));
    }

    #[test]
    fn optional_id_passes_none_through() {
        assert_eq!(optional_id(None).unwrap(), None);
        assert_eq!(optional_id(Some(&"7".to_string())).unwrap(), Some(7));
        assert!(optional_id(Some(&"x".to_string())).is_err());
    }

    #[test]
    fn join_rest_joins_title_words() {
        let a = args(&["subtask", "create", "9", "Fix", "the", "bug"]);
        assert_eq!(join_rest(&a, 3, "usage").unwrap(), "Fix the bug");
        assert!(matches!(join_rest(&a, 6, "usage"), Err(Error::Usage(_))));
    }
}
