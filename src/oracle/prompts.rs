//! Prompt rendering for chat-completion oracles

use super::{OracleError, OracleRecord};
use tera::{Context, Tera};

const ENRICH_SYSTEM: &str = "You help users find relevant domains based on their search queries. \
Analyze the user's search query and return search terms that would help find relevant domains: \
synonyms, related concepts and alternative phrasings. \
Format your response as a JSON array of strings with no explanation.";

const MATCH_SYSTEM: &str = "You help users find relevant domains based on their search queries. \
Analyze the user's search query and return the ids of the most relevant domains, \
judging semantic meaning rather than exact keyword matches. \
Format your response as a JSON array of domain ids with no explanation.";

const ENRICH_USER: &str = r#"User search query: "{{ query }}"

Available domain descriptions to search through:
{% for description in corpus %}{{ description }}
{% endfor %}
Based on this query, provide search terms that would help find the most relevant domains.
Include the original query terms, synonyms, related concepts and alternative phrasings.
Return ONLY a JSON array of strings."#;

const MATCH_USER: &str = r#"User search query: "{{ query }}"

Available domains:
{% for record in records %}ID: {{ record.id }}, Domain: {{ record.name }}, Description: {{ record.description }}
{% endfor %}
Analyze the meaning of the query and the intent behind it.
Return ONLY a JSON array of the most relevant domain ids, ordered by relevance, at most {{ limit }}."#;

/// Ids requested from the oracle per direct-match call
const MATCH_PROMPT_LIMIT: usize = 5;

/// Prompt renderer
pub struct Prompts {
    tera: Tera,
}

impl Prompts {
    /// Create a renderer with the embedded templates
    pub fn new() -> Result<Self, OracleError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![("enrich_user.txt", ENRICH_USER), ("match_user.txt", MATCH_USER)])
            .map_err(template_error)?;
        Ok(Self { tera })
    }

    pub fn enrich_system(&self) -> &'static str {
        ENRICH_SYSTEM
    }

    pub fn match_system(&self) -> &'static str {
        MATCH_SYSTEM
    }

    /// Render the enrichment request
    pub fn enrich_user(&self, query: &str, corpus: &[String]) -> Result<String, OracleError> {
        let mut ctx = Context::new();
        ctx.insert("query", query);
        ctx.insert("corpus", corpus);
        self.tera
            .render("enrich_user.txt", &ctx)
            .map_err(template_error)
    }

    /// Render the direct-match request
    pub fn match_user(&self, query: &str, records: &[OracleRecord]) -> Result<String, OracleError> {
        let mut ctx = Context::new();
        ctx.insert("query", query);
        ctx.insert("records", records);
        ctx.insert("limit", &MATCH_PROMPT_LIMIT);
        self.tera
            .render("match_user.txt", &ctx)
            .map_err(template_error)
    }
}

fn template_error(err: tera::Error) -> OracleError {
    OracleError::Template(err.to_string())
}

/// Locate the JSON array in a model reply
///
/// Accepts a bare array, an array inside a code fence, or an array
/// surrounded by prose. Returns the slice from the first `[` to the
/// last `]`.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_array() {
        assert_eq!(extract_json_array(r#"["a", "b"]"#), Some(r#"["a", "b"]"#));
    }

    #[test]
    fn test_extract_fenced_array() {
        let reply = "```json\n[\"photo\", \"image\"]\n```";
        assert_eq!(extract_json_array(reply), Some("[\"photo\", \"image\"]"));
    }

    #[test]
    fn test_extract_with_prose() {
        let reply = "Here are the terms: [\"editor\"] hope that helps";
        assert_eq!(extract_json_array(reply), Some("[\"editor\"]"));
        assert_eq!(extract_json_array("no array here"), None);
        assert_eq!(extract_json_array("] backwards ["), None);
    }

    #[test]
    fn test_render_enrich_prompt() {
        let prompts = Prompts::new().unwrap();
        let corpus = vec![
            "Online photo editing tool".to_string(),
            "Online banking".to_string(),
        ];
        let rendered = prompts.enrich_user("picture editor", &corpus).unwrap();
        assert!(rendered.contains("User search query: \"picture editor\""));
        assert!(rendered.contains("Online photo editing tool\n"));
        assert!(rendered.contains("Online banking\n"));
    }

    #[test]
    fn test_render_match_prompt() {
        let prompts = Prompts::new().unwrap();
        let records = vec![OracleRecord {
            id: "r1".to_string(),
            name: "photoedit.com".to_string(),
            description: "Online photo editing tool".to_string(),
        }];
        let rendered = prompts.match_user("retouch", &records).unwrap();
        assert!(rendered
            .contains("ID: r1, Domain: photoedit.com, Description: Online photo editing tool"));
        assert!(rendered.contains("at most 5"));
    }

    #[test]
    fn test_prompts_are_not_html_escaped() {
        let prompts = Prompts::new().unwrap();
        let rendered = prompts
            .enrich_user("b&b <rooms>", &["Tom & Jerry".to_string()])
            .unwrap();
        assert!(rendered.contains("b&b <rooms>"));
        assert!(rendered.contains("Tom & Jerry"));
    }
}
