//! Bot name generation
//!
//! Half of all names come straight from the predefined table, the other half
//! are adjective + noun combinations, half of which get a two-digit suffix.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::store::{BotNameSource, NameTables};

/// Used when the lookup tables are empty or cannot be loaded
const FALLBACK_ADJECTIVES: &[&str] = &["Quick", "Silent", "Lucky", "Bright"];
const FALLBACK_NOUNS: &[&str] = &["Fox", "Tiger", "Pixel", "Rover"];

pub const MAX_BOT_NAMES_PER_REQUEST: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum BotName {
    Predefined(String),
    Generated {
        adjective: String,
        noun: String,
        number: Option<u8>,
    },
}

impl fmt::Display for BotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotName::Predefined(name) => write!(f, "{}", name),
            BotName::Generated {
                adjective,
                noun,
                number: Some(n),
            } => write!(f, "{}{}{}", adjective, noun, n),
            BotName::Generated {
                adjective,
                noun,
                number: None,
            } => write!(f, "{}{}", adjective, noun),
        }
    }
}

impl From<BotName> for String {
    fn from(name: BotName) -> Self {
        name.to_string()
    }
}

fn pick<R: Rng + ?Sized>(words: &[String], fallback: &[&str], rng: &mut R) -> String {
    match words.choose(rng) {
        Some(word) => word.clone(),
        None => fallback
            .choose(rng)
            .map(|w| w.to_string())
            .unwrap_or_default(),
    }
}

/// Generate a single name from already loaded tables
pub fn generate_with<R: Rng + ?Sized>(tables: &NameTables, rng: &mut R) -> BotName {
    if !tables.predefined.is_empty() && rng.random_bool(0.5) {
        if let Some(name) = tables.predefined.choose(rng) {
            return BotName::Predefined(name.clone());
        }
    }

    // An empty half of the pair means the table is unusable; use the fallback pair
    let (adjectives, nouns) = if tables.adjectives.is_empty() || tables.nouns.is_empty() {
        (&[] as &[String], &[] as &[String])
    } else {
        (&tables.adjectives[..], &tables.nouns[..])
    };

    let adjective = pick(adjectives, FALLBACK_ADJECTIVES, rng);
    let noun = pick(nouns, FALLBACK_NOUNS, rng);
    let number = if rng.random_bool(0.5) {
        Some(rng.random_range(10..=99))
    } else {
        None
    };

    BotName::Generated {
        adjective,
        noun,
        number,
    }
}

/// Load tables from `source`, falling back to the built-in lists when unreachable
pub async fn load_tables(source: &dyn BotNameSource) -> NameTables {
    match source.load_name_tables().await {
        Ok(tables) => {
            if tables.adjectives.is_empty() || tables.nouns.is_empty() {
                tracing::warn!("Bot name tables are empty, using fallback word list");
            }
            tables
        }
        Err(e) => {
            tracing::warn!("Failed to load bot name tables: {}. Using fallback list", e);
            NameTables::default()
        }
    }
}

/// Generate `count` names. Names are independent; duplicates are possible.
pub async fn generate_bot_names(source: &dyn BotNameSource, count: usize) -> Vec<BotName> {
    let tables = load_tables(source).await;
    let mut rng = rand::rng();
    (0..count).map(|_| generate_with(&tables, &mut rng)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, StoreResult};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct UnreachableSource;

    #[async_trait::async_trait]
    impl BotNameSource for UnreachableSource {
        async fn load_name_tables(&self) -> StoreResult<NameTables> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn tables() -> NameTables {
        NameTables {
            predefined: vec!["Alpha".to_string(), "Beta".to_string()],
            adjectives: vec!["Red".to_string(), "Blue".to_string()],
            nouns: vec!["Cat".to_string(), "Dog".to_string()],
        }
    }

    #[test]
    fn test_display() {
        let name = BotName::Generated {
            adjective: "Sneaky".to_string(),
            noun: "Panda".to_string(),
            number: Some(42),
        };
        assert_eq!(name.to_string(), "SneakyPanda42");
        assert_eq!(
            serde_json::to_value(&name).unwrap(),
            serde_json::json!("SneakyPanda42")
        );
        assert_eq!(BotName::Predefined("NightOwl".into()).to_string(), "NightOwl");
    }

    #[test]
    fn test_distribution() {
        let tables = tables();
        let mut rng = StdRng::seed_from_u64(7);
        let samples = 10_000;

        let mut predefined = 0;
        let mut generated = 0;
        let mut with_number = 0;

        for _ in 0..samples {
            match generate_with(&tables, &mut rng) {
                BotName::Predefined(name) => {
                    assert!(tables.predefined.contains(&name));
                    predefined += 1;
                }
                BotName::Generated {
                    adjective,
                    noun,
                    number,
                } => {
                    assert!(tables.adjectives.contains(&adjective));
                    assert!(tables.nouns.contains(&noun));
                    generated += 1;
                    if let Some(n) = number {
                        assert!((10..=99).contains(&n));
                        with_number += 1;
                    }
                }
            }
        }

        let ratio = predefined as f64 / samples as f64;
        assert!((0.45..0.55).contains(&ratio), "predefined ratio {}", ratio);
        let suffix_ratio = with_number as f64 / generated as f64;
        assert!(
            (0.45..0.55).contains(&suffix_ratio),
            "suffix ratio {}",
            suffix_ratio
        );
    }

    #[test]
    fn test_empty_predefined_always_combines() {
        let tables = NameTables {
            predefined: vec![],
            ..tables()
        };
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(matches!(
                generate_with(&tables, &mut rng),
                BotName::Generated { .. }
            ));
        }
    }

    #[test]
    fn test_empty_word_tables_use_fallback() {
        let tables = NameTables {
            predefined: vec![],
            adjectives: vec!["Lonely".to_string()],
            nouns: vec![],
        };
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            match generate_with(&tables, &mut rng) {
                BotName::Generated {
                    adjective, noun, ..
                } => {
                    assert!(FALLBACK_ADJECTIVES.contains(&adjective.as_str()));
                    assert!(FALLBACK_NOUNS.contains(&noun.as_str()));
                }
                other => panic!("Expected generated name, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_unreachable_source_falls_back() {
        let names = generate_bot_names(&UnreachableSource, 20).await;
        assert_eq!(names.len(), 20);
        for name in names {
            match name {
                BotName::Generated { adjective, .. } => {
                    assert!(FALLBACK_ADJECTIVES.contains(&adjective.as_str()))
                }
                BotName::Predefined(_) => panic!("No predefined names without tables"),
            }
        }
    }
}
