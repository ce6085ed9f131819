//! Host-level network egress restriction
//!
//! Defense in depth against exfiltration from a compromised renderer: every
//! outbound connection resolves to loopback except a fixed allow-list of
//! operational domains.

/// Domains the shell is allowed to reach directly
pub const ALLOWED_EGRESS_DOMAINS: &[&str] = &[
    // Price feed
    "api.coingecko.com",
    // Swap service
    "swap.walletd.net",
    // Version check and download mirrors
    "version.walletd.net",
    "downloads.walletd.net",
    "dl.walletd.net",
    // API endpoints
    "api.walletd.net",
];

/// Host-rules switch value: map everything to loopback, excluding the
/// allow-list.
pub fn host_rules() -> String {
    let mut rules = String::from("MAP * 127.0.0.1");
    for domain in ALLOWED_EGRESS_DOMAINS {
        rules.push_str(", EXCLUDE ");
        rules.push_str(domain);
    }
    rules
}

/// Whether a host may be reached without being remapped to loopback.
pub fn is_egress_allowed(host: &str) -> bool {
    host == "127.0.0.1" || host == "localhost" || ALLOWED_EGRESS_DOMAINS.contains(&host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_rules_map_everything_to_loopback() {
        let rules = host_rules();
        assert!(rules.starts_with("MAP * 127.0.0.1"));
    }

    #[test]
    fn test_host_rules_exclude_all_allowed_domains() {
        let rules = host_rules();
        for domain in ALLOWED_EGRESS_DOMAINS {
            assert!(
                rules.contains(&format!("EXCLUDE {}", domain)),
                "missing exclusion for {}",
                domain
            );
        }
    }

    #[test]
    fn test_loopback_always_allowed() {
        assert!(is_egress_allowed("127.0.0.1"));
        assert!(is_egress_allowed("localhost"));
    }

    #[test]
    fn test_operational_domains_allowed() {
        assert!(is_egress_allowed("api.coingecko.com"));
        assert!(is_egress_allowed("version.walletd.net"));
    }

    #[test]
    fn test_arbitrary_hosts_denied() {
        assert!(!is_egress_allowed("example.com"));
        assert!(!is_egress_allowed("evil.walletd.net.attacker.io"));
    }
}
