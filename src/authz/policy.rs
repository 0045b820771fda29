use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

/// Which response a denial produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    /// Server-rendered page: deny redirects to `/`.
    Page,
    /// JSON API: deny answers 401/403 with an error body.
    Api,
}

impl Surface {
    pub fn as_str(self) -> &'static str {
        match self {
            Surface::Page => "page",
            Surface::Api => "api",
        }
    }
}

/// Minimum-role requirement for a path prefix.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct PolicyRule {
    pub prefix: &'static str,
    /// Exact rules only match the prefix itself, never sub-paths.
    pub exact: bool,
    pub min_role: Role,
    pub surface: Surface,
}

const fn page(prefix: &'static str, min_role: Role) -> PolicyRule {
    PolicyRule { prefix, exact: false, min_role, surface: Surface::Page }
}

const fn api(prefix: &'static str, min_role: Role) -> PolicyRule {
    PolicyRule { prefix, exact: false, min_role, surface: Surface::Api }
}

/// The deployment policy. Defined once, never mutated at runtime.
const RULES: &[PolicyRule] = &[
    PolicyRule { prefix: "/", exact: true, min_role: Role::NonUser, surface: Surface::Page },
    page("/novels", Role::NonUser),
    page("/library", Role::Reader),
    page("/author", Role::Writer),
    page("/admin", Role::Admin),
    page("/developer", Role::Developer),
    api("/api/health", Role::NonUser),
    api("/api/auth", Role::NonUser),
    api("/api/novels", Role::NonUser),
    api("/api/reviews", Role::Reader),
    api("/api/wishlist", Role::Reader),
    api("/api/likes", Role::Reader),
    api("/api/author", Role::Writer),
    api("/api/admin", Role::Admin),
    api("/api/developer", Role::Developer),
];

/// Static table mapping path prefixes to minimum roles.
///
/// Exposed as data (not scattered conditionals) so it can be tested and
/// audited independently of handler code.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    rules: Vec<PolicyRule>,
}

impl PolicyTable {
    /// The table used by the running service.
    pub fn deployment() -> Self {
        Self { rules: RULES.to_vec() }
    }

    /// Custom table, used by tests.
    pub fn new(rules: Vec<PolicyRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    /// Resolves the rule governing `path`.
    ///
    /// Exact matches win over prefix matches; among prefix matches the longest
    /// prefix wins. Prefix matches are segment-aware: `/author` covers
    /// `/author` and `/author/drafts` but not `/authors`. `None` means the
    /// path is public.
    pub fn match_rule(&self, path: &str) -> Option<&PolicyRule> {
        if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.exact && rule.prefix == path)
        {
            return Some(rule);
        }

        self.rules
            .iter()
            .filter(|rule| !rule.exact && prefix_matches(rule.prefix, path))
            .max_by_key(|rule| rule.prefix.len())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::deployment()
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_rule_does_not_leak_to_subpaths() {
        let table = PolicyTable::deployment();
        assert_eq!(table.match_rule("/").unwrap().prefix, "/");
        // "/settings" has no rule of its own and the root rule is exact-only
        assert!(table.match_rule("/settings").is_none());
    }

    #[test]
    fn prefix_match_is_segment_aware() {
        let table = PolicyTable::deployment();
        assert_eq!(table.match_rule("/author").unwrap().min_role, Role::Writer);
        assert_eq!(table.match_rule("/author/drafts").unwrap().min_role, Role::Writer);
        assert!(table.match_rule("/authors").is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let table = PolicyTable::new(vec![
            api("/api", Role::Reader),
            api("/api/admin", Role::Admin),
        ]);
        assert_eq!(table.match_rule("/api/admin/users").unwrap().min_role, Role::Admin);
        assert_eq!(table.match_rule("/api/novels").unwrap().min_role, Role::Reader);
    }

    #[test]
    fn exact_wins_over_longer_prefix() {
        let table = PolicyTable::new(vec![
            PolicyRule { prefix: "/admin", exact: true, min_role: Role::NonUser, surface: Surface::Page },
            page("/admin", Role::Admin),
        ]);
        assert_eq!(table.match_rule("/admin").unwrap().min_role, Role::NonUser);
        assert_eq!(table.match_rule("/admin/users").unwrap().min_role, Role::Admin);
    }

    #[test]
    fn deployment_table_gates_expected_prefixes() {
        let table = PolicyTable::deployment();
        assert_eq!(table.match_rule("/admin/users").unwrap().min_role, Role::Admin);
        assert_eq!(table.match_rule("/developer").unwrap().min_role, Role::Developer);
        assert_eq!(table.match_rule("/api/reviews").unwrap().min_role, Role::Reader);
        assert_eq!(table.match_rule("/novels/123").unwrap().min_role, Role::NonUser);
    }

    #[test]
    fn unmatched_paths_are_public() {
        let table = PolicyTable::deployment();
        assert!(table.match_rule("/docs").is_none());
        assert!(table.match_rule("/api-docs/openapi.json").is_none());
    }
}
