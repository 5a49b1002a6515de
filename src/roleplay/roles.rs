// Role catalog for routed answering

/// One answering role: routing key, catalog description, and the system
/// prompt that sets its voice
#[derive(Debug, Clone, Copy)]
pub struct RoleProfile {
    pub key: &'static str,
    pub description: &'static str,
    pub voice: &'static str,
}

/// Routable roles, in retry order
pub const ROLES: &[RoleProfile] = &[
    RoleProfile {
        key: "technical",
        description: "technical questions",
        voice: "You are a technical expert. Explain in detail using precise \
                terminology.",
    },
    RoleProfile {
        key: "business",
        description: "business questions",
        voice: "You are a business consultant. Give practical and concrete \
                advice.",
    },
    RoleProfile {
        key: "creative",
        description: "creative questions",
        voice: "You are a creative professional. Offer imaginative and \
                original ideas.",
    },
    RoleProfile {
        key: "general",
        description: "general questions",
        voice: "You are an approachable assistant. Explain things clearly \
                and simply.",
    },
];

/// Look up a role by key, or fall back to `general` when the selector
/// produced something unrecognized
pub fn resolve_role(raw: &str) -> &'static RoleProfile {
    let needle = raw.trim().to_lowercase();
    ROLES
        .iter()
        .find(|r| needle == r.key || needle.contains(r.key))
        .unwrap_or_else(|| fallback_role())
}

/// The role used when nothing else matches
pub fn fallback_role() -> &'static RoleProfile {
    ROLES
        .iter()
        .find(|r| r.key == "general")
        .expect("catalog contains the general role")
}

/// First role not yet tried, in catalog order; when all are exhausted,
/// the first role different from `current`
pub fn next_untried_role(current: &str, tried: &[String]) -> &'static RoleProfile {
    ROLES
        .iter()
        .find(|r| !tried.iter().any(|t| t == r.key))
        .or_else(|| ROLES.iter().find(|r| r.key != current))
        .unwrap_or_else(|| fallback_role())
}

/// Bullet list of roles for the selection prompt
pub fn catalog_for_prompt() -> String {
    ROLES
        .iter()
        .map(|r| format!("- {}: {}", r.key, r.description))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exact_key() {
        assert_eq!(resolve_role("technical").key, "technical");
        assert_eq!(resolve_role("  Business \n").key, "business");
    }

    #[test]
    fn test_resolve_verbose_selector_output() {
        // Models often answer in a sentence instead of a bare key
        assert_eq!(resolve_role("The best role is: creative").key, "creative");
    }

    #[test]
    fn test_resolve_falls_back_to_general() {
        assert_eq!(resolve_role("philosopher").key, "general");
        assert_eq!(resolve_role("").key, "general");
    }

    #[test]
    fn test_next_untried_role_walks_catalog_order() {
        let tried = vec!["technical".to_string()];
        assert_eq!(next_untried_role("technical", &tried).key, "business");

        let tried: Vec<String> = ["technical", "business", "creative"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(next_untried_role("creative", &tried).key, "general");
    }

    #[test]
    fn test_next_untried_role_when_exhausted() {
        let tried: Vec<String> = ROLES.iter().map(|r| r.key.to_string()).collect();
        let next = next_untried_role("general", &tried);
        assert_ne!(next.key, "general");
    }

    #[test]
    fn test_catalog_lists_every_role() {
        let catalog = catalog_for_prompt();
        for role in ROLES {
            assert!(catalog.contains(role.key));
        }
    }
}
