//! Fight layer configuration.

use arena_protocol::DEFAULT_PAGE_LIMIT;

/// Configuration for fight history reads.
#[derive(Debug, Clone)]
pub struct FightConfig {
    /// Fights per history page when the caller doesn't pick a limit.
    pub page_limit: u32,
}

impl Default for FightConfig {
    fn default() -> Self {
        Self {
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fight_config_default_page_limit() {
        assert_eq!(FightConfig::default().page_limit, 20);
    }
}
