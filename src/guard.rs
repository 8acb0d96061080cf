use crate::config::AppConfig;
use crate::error::{Error, Result};

/// Allowlist checks on space and board ids. Opt-in: with no allowlist
/// configured every check passes.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    allowed_space_ids: Option<Vec<i64>>,
    allowed_board_ids: Option<Vec<i64>>,
}

impl AccessGuard {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            allowed_space_ids: config.allowed_space_ids.clone(),
            allowed_board_ids: config.allowed_board_ids.clone(),
        }
    }

    pub fn check_space(&self, space_id: i64) -> Result<()> {
        match &self.allowed_space_ids {
            Some(allowed) if !allowed.contains(&space_id) => Err(Error::SpaceNotAllowed(space_id)),
            _ => Ok(()),
        }
    }

    pub fn check_board(&self, board_id: i64) -> Result<()> {
        match &self.allowed_board_ids {
            Some(allowed) if !allowed.contains(&board_id) => Err(Error::BoardNotAllowed(board_id)),
            _ => Ok(()),
        }
    }

    /// Card-scoped operations only need a lookup when a board allowlist is
    /// configured at all.
    pub fn restricts_boards(&self) -> bool {
        self.allowed_board_ids.is_some()
    }

    pub fn space_allowed(&self, space_id: i64) -> bool {
        self.check_space(space_id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(spaces: Option<Vec<i64>>, boards: Option<Vec<i64>>) -> AccessGuard {
        AccessGuard::from_config(&AppConfig {
            allowed_space_ids: spaces,
            allowed_board_ids: boards,
            ..Default::default()
        })
    }

    #[test]
    fn no_allowlist_passes_everything() {
        let g = guard(None, None);
        assert!(g.check_space(123).is_ok());
        assert!(g.check_board(456).is_ok());
        assert!(!g.restricts_boards());
    }

    #[test]
    fn space_allowlist_enforced() {
        let g = guard(Some(vec![1, 2]), None);
        assert!(g.check_space(1).is_ok());
        assert!(matches!(g.check_space(3), Err(Error::SpaceNotAllowed(3))));
    }

    #[test]
    fn board_allowlist_enforced() {
        let g = guard(None, Some(vec![10]));
        assert!(g.check_board(10).is_ok());
        assert!(matches!(g.check_board(11), Err(Error::BoardNotAllowed(11))));
        assert!(g.restricts_boards());
    }

    #[test]
    fn violations_are_access_denied() {
        let g = guard(Some(vec![1]), Some(vec![2]));
        assert!(g.check_space(9).unwrap_err().is_access_denied());
        assert!(g.check_board(9).unwrap_err().is_access_denied());
    }
}
