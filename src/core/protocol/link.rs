//! `Link` header parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static MERCURE_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel\s*=\s*"?mercure"?"#).expect("static regex")
});

/// Extract the Mercure hub URL advertised in a `Link` header value.
///
/// ```
/// use hydra_provider::protocol::parse_mercure_hub;
///
/// let link = r#"<https://api.example.com/docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation",<https://api.example.com/.well-known/mercure>; rel="mercure""#;
/// assert_eq!(
///     parse_mercure_hub(link).as_deref(),
///     Some("https://api.example.com/.well-known/mercure")
/// );
/// ```
pub fn parse_mercure_hub(link: &str) -> Option<String> {
    MERCURE_LINK_REGEX
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_link() {
        assert_eq!(
            parse_mercure_hub(r#"<https://hub.example.com/.well-known/mercure>; rel="mercure""#),
            Some("https://hub.example.com/.well-known/mercure".to_string())
        );
    }

    #[test]
    fn test_unquoted_rel() {
        assert_eq!(
            parse_mercure_hub("<https://hub.example.com/hub>;rel=mercure"),
            Some("https://hub.example.com/hub".to_string())
        );
    }

    #[test]
    fn test_other_links_only() {
        assert_eq!(
            parse_mercure_hub(r#"<https://api.example.com/docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation""#),
            None
        );
    }

    #[test]
    fn test_hub_after_documentation_link() {
        let link = r#"<https://api.example.com/docs.jsonld>; rel="http://www.w3.org/ns/hydra/core#apiDocumentation", <https://api.example.com/.well-known/mercure>; rel="mercure""#;
        assert_eq!(
            parse_mercure_hub(link),
            Some("https://api.example.com/.well-known/mercure".to_string())
        );
    }
}
