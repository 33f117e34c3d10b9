//! Visual tiers.
//!
//! Every node is placed in one horizontal lane chosen from its identifier:
//! clients on top, then network edge, application and data stores. The table
//! is fixed; the first matching rule wins and anything unmatched shares the
//! application row as [`Tier::Default`].

use std::fmt::{self, Display};

/// A horizontal lane of the fallback layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Client,
    Network,
    Application,
    Database,
    Default,
}

/// Matching rule and placement constants for one tier.
#[derive(Debug)]
pub struct TierSpec {
    tier: Tier,
    prefix: &'static str,
    keywords: &'static [&'static str],
    base_x: f32,
    y: f32,
    spacing: f32,
}

impl TierSpec {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    /// Horizontal position of the first node in the lane.
    pub fn base_x(&self) -> f32 {
        self.base_x
    }

    /// Vertical position shared by every node in the lane.
    pub fn y(&self) -> f32 {
        self.y
    }

    /// Horizontal step between consecutive nodes in the lane.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    fn matches(&self, id: &str) -> bool {
        id.starts_with(self.prefix) || self.keywords.iter().any(|keyword| id.contains(keyword))
    }
}

/// Classification rules in priority order.
static TIERS: [TierSpec; 4] = [
    TierSpec {
        tier: Tier::Client,
        prefix: "client_",
        keywords: &["browser", "mobile"],
        base_x: 50.0,
        y: 150.0,
        spacing: 150.0,
    },
    TierSpec {
        tier: Tier::Network,
        prefix: "network_",
        keywords: &["cdn", "firewall", "load_balancer", "waf"],
        base_x: 300.0,
        y: 250.0,
        spacing: 120.0,
    },
    TierSpec {
        tier: Tier::Application,
        prefix: "application_",
        keywords: &["server", "api", "service", "auth"],
        base_x: 550.0,
        y: 350.0,
        spacing: 130.0,
    },
    TierSpec {
        tier: Tier::Database,
        prefix: "database_",
        keywords: &["db", "cache", "redis", "postgresql", "mysql", "mongo"],
        base_x: 950.0,
        y: 450.0,
        spacing: 140.0,
    },
];

static DEFAULT_TIER: TierSpec = TierSpec {
    tier: Tier::Default,
    prefix: "",
    keywords: &[],
    base_x: 550.0,
    y: 350.0,
    spacing: 130.0,
};

impl Tier {
    /// Classifies a node identifier. Matching is case-sensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use d2json::layout::Tier;
    ///
    /// assert_eq!(Tier::classify("client_app"), Tier::Client);
    /// assert_eq!(Tier::classify("edge_waf"), Tier::Network);
    /// assert_eq!(Tier::classify("widget"), Tier::Default);
    /// ```
    pub fn classify(id: &str) -> Tier {
        TIERS
            .iter()
            .find(|spec| spec.matches(id))
            .map_or(Tier::Default, TierSpec::tier)
    }

    /// Placement constants for this tier.
    pub fn spec(self) -> &'static TierSpec {
        TIERS
            .iter()
            .find(|spec| spec.tier == self)
            .unwrap_or(&DEFAULT_TIER)
    }
}

impl Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Client => "client",
            Tier::Network => "network",
            Tier::Application => "application",
            Tier::Database => "database",
            Tier::Default => "default",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_examples() {
        assert_eq!(Tier::classify("client_app"), Tier::Client);
        assert_eq!(Tier::classify("db_primary"), Tier::Database);
        assert_eq!(Tier::classify("my_service"), Tier::Application);
        assert_eq!(Tier::classify("edge_waf"), Tier::Network);
        assert_eq!(Tier::classify("widget"), Tier::Default);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Matches both the client and the application rule.
        assert_eq!(Tier::classify("browser_api"), Tier::Client);
        // Matches both the network and the database rule.
        assert_eq!(Tier::classify("cdn_cache"), Tier::Network);
        // "server" wins over the database prefix.
        assert_eq!(Tier::classify("database_server"), Tier::Application);
    }

    #[test]
    fn test_prefix_must_be_at_start() {
        assert_eq!(Tier::classify("my_client_"), Tier::Default);
        assert_eq!(Tier::classify("network_core"), Tier::Network);
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        assert_eq!(Tier::classify("Client_App"), Tier::Default);
        assert_eq!(Tier::classify("DB"), Tier::Default);
    }

    #[test]
    fn test_spec_constants() {
        let database = Tier::Database.spec();
        assert_eq!(database.base_x(), 950.0);
        assert_eq!(database.y(), 450.0);
        assert_eq!(database.spacing(), 140.0);

        let default = Tier::Default.spec();
        assert_eq!(default.tier(), Tier::Default);
        assert_eq!(default.base_x(), 550.0);
        assert_eq!(default.y(), 350.0);
        assert_eq!(default.spacing(), 130.0);
    }
}
