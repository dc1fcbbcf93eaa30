//! Lexicon tables for query expansion and intent matching
//!
//! The lexicon is plain data: a keyword -> synonyms table and an
//! intent -> phrases table. It is built once and shared read-only.

use anyhow::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in lexicon, constructed on first use
static BUILTIN: Lazy<Lexicon> = Lazy::new(Lexicon::default_tables);

const KEYWORD_SYNONYMS: &[(&str, &[&str])] = &[
    ("image", &["photo", "picture", "img", "pic", "visual"]),
    (
        "generator",
        &["creator", "maker", "builder", "tool", "create", "make", "generate", "build"],
    ),
    ("editor", &["edit", "modify", "change", "adjust", "enhance"]),
    (
        "ai",
        &[
            "artificial intelligence",
            "machine learning",
            "ml",
            "automated",
            "automatic",
            "intelligent",
        ],
    ),
    ("website", &["site", "web", "webpage", "page", "online"]),
    ("video", &["clip", "film", "movie", "animation"]),
    ("design", &["designer", "designing", "style", "look", "aesthetic"]),
    ("search", &["find", "discover", "lookup", "browse", "explore"]),
    (
        "tool",
        &["utility", "app", "application", "service", "platform", "software"],
    ),
];

const INTENT_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "create_image",
        &[
            "image generator",
            "create image",
            "make picture",
            "generate photo",
            "ai art",
            "photo creator",
        ],
    ),
    (
        "edit_image",
        &[
            "image editor",
            "photo editing",
            "picture enhancement",
            "retouch photo",
            "edit pictures",
        ],
    ),
    (
        "build_website",
        &[
            "website builder",
            "create site",
            "web design",
            "make website",
            "site creator",
        ],
    ),
    (
        "video_editing",
        &[
            "video editor",
            "edit clips",
            "movie maker",
            "video creation",
            "film editing",
        ],
    ),
    (
        "search_tool",
        &[
            "search engine",
            "finder",
            "discovery tool",
            "explore content",
            "lookup service",
        ],
    ),
];

/// Keyword synonyms and intent phrases used by expansion and scoring
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Keyword -> synonym strings
    pub synonyms: BTreeMap<String, Vec<String>>,
    /// Intent name -> multi-word phrases
    pub intents: BTreeMap<String, Vec<String>>,
}

impl Lexicon {
    /// The built-in lexicon shared by the whole process
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    /// Load a lexicon from a YAML file
    ///
    /// Entries are lowercased on load so matching never has to.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a lexicon from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let lexicon: Lexicon = serde_yaml::from_str(content)?;
        Ok(lexicon.normalized())
    }

    fn default_tables() -> Self {
        let convert = |table: &[(&str, &[&str])]| -> BTreeMap<String, Vec<String>> {
            table
                .iter()
                .map(|(key, values)| {
                    (
                        key.to_string(),
                        values.iter().map(|v| v.to_string()).collect(),
                    )
                })
                .collect()
        };

        Self {
            synonyms: convert(KEYWORD_SYNONYMS),
            intents: convert(INTENT_KEYWORDS),
        }
    }

    fn normalized(self) -> Self {
        let lower = |table: BTreeMap<String, Vec<String>>| -> BTreeMap<String, Vec<String>> {
            table
                .into_iter()
                .map(|(key, values)| {
                    (
                        key.to_lowercase(),
                        values.into_iter().map(|v| v.to_lowercase()).collect(),
                    )
                })
                .collect()
        };

        Self {
            synonyms: lower(self.synonyms),
            intents: lower(self.intents),
        }
    }

    /// Iterate keyword/synonym entries
    pub fn synonym_entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.synonyms.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterate intent/phrase entries
    pub fn intent_entries(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.intents.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Phrases of a single intent
    pub fn intent(&self, name: &str) -> Option<&[String]> {
        self.intents.get(name).map(|v| v.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty() && self.intents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables() {
        let lexicon = Lexicon::builtin();
        assert_eq!(lexicon.synonyms.len(), 9);
        assert_eq!(lexicon.intents.len(), 5);
        assert!(lexicon.synonyms["image"].contains(&"picture".to_string()));
        assert_eq!(lexicon.intent("edit_image").unwrap().len(), 5);
    }

    #[test]
    fn test_builtin_is_shared() {
        assert!(std::ptr::eq(Lexicon::builtin(), Lexicon::builtin()));
    }

    #[test]
    fn test_yaml_lexicon_is_lowercased() {
        let yaml = r#"
synonyms:
  Music: [Song, Audio]
intents:
  listen_music:
    - Music Player
"#;
        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert_eq!(lexicon.synonyms["music"], vec!["song", "audio"]);
        assert_eq!(lexicon.intent("listen_music").unwrap(), ["music player"]);
    }

    #[test]
    fn test_empty_yaml() {
        let lexicon = Lexicon::from_yaml("{}").unwrap();
        assert!(lexicon.is_empty());
    }
}
