//! Scope context: which concepts a learner has covered so far.
//!
//! The rendered block is injected into the content prompt so the model stays
//! within what earlier curriculum items taught and leaves upcoming concepts
//! alone. Pure text construction; no I/O.

use crate::core::coerce::{as_non_empty_string, as_record, field, to_string_array, unique_strings};
use crate::core::config::ScopeConfig;
use crate::core::prompts::estimate_tokens;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CONCEPT_KEYS: &[&str] = &[
    "learning_objectives",
    "learningObjectives",
    "key_concepts",
    "keyConcepts",
    "concepts",
    "topics",
    "sections",
];

const METHOD_KEYWORDS: &[&str] = &["function", "method", "procedure", "parameter", "return value"];
const CLASS_KEYWORDS: &[&str] = &[
    "class",
    "object-oriented",
    "oop",
    "inheritance",
    "constructor",
    "encapsulation",
    "polymorphism",
];

/// One prior or upcoming curriculum item. `content_data` is loosely typed:
/// an object, or the same object encoded as a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurriculumItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopeContext {
    pub covered_concepts: Vec<String>,
    pub reserved_concepts: Vec<String>,
    pub methods_in_scope: bool,
    pub classes_in_scope: bool,
    pub text: String,
    pub tokens: usize,
}

/// Concepts named by one item, title first, in document order.
pub fn item_concepts(item: &CurriculumItem) -> Vec<String> {
    let decoded;
    let data = match &item.content_data {
        Value::String(encoded) => {
            decoded = serde_json::from_str::<Value>(encoded).unwrap_or(Value::Null);
            &decoded
        }
        other => other,
    };
    let record = as_record(data);

    let mut concepts: Vec<String> = as_non_empty_string(&Value::String(item.title.clone()))
        .into_iter()
        .collect();
    for key in CONCEPT_KEYS {
        concepts.extend(to_string_array(field(record, &[key])));
    }
    concepts
}

fn mentions_any(concepts: &[String], keywords: &[&str]) -> bool {
    concepts.iter().any(|c| {
        let lowered = c.to_lowercase();
        keywords.iter().any(|k| lowered.contains(k))
    })
}

pub fn build_scope_context(
    covered: &[CurriculumItem],
    upcoming: &[CurriculumItem],
    config: &ScopeConfig,
) -> ScopeContext {
    let mut covered_concepts = unique_strings(
        covered.iter().flat_map(item_concepts),
        config.max_concepts,
    );

    let seen: FxHashSet<String> = covered
        .iter()
        .flat_map(item_concepts)
        .map(|c| c.to_lowercase())
        .collect();
    let mut reserved_concepts = unique_strings(
        upcoming
            .iter()
            .flat_map(item_concepts)
            .filter(|c| !seen.contains(&c.to_lowercase())),
        config.max_reserved,
    );

    let methods_in_scope = mentions_any(&covered_concepts, METHOD_KEYWORDS);
    let classes_in_scope = mentions_any(&covered_concepts, CLASS_KEYWORDS);

    let mut text = render(
        &covered_concepts,
        &reserved_concepts,
        methods_in_scope,
        classes_in_scope,
    );
    let mut tokens = estimate_tokens(&text);
    while tokens > config.token_budget {
        if reserved_concepts.pop().is_none() && covered_concepts.pop().is_none() {
            break;
        }
        text = render(
            &covered_concepts,
            &reserved_concepts,
            methods_in_scope,
            classes_in_scope,
        );
        tokens = estimate_tokens(&text);
    }
    tracing::debug!(
        covered = covered_concepts.len(),
        reserved = reserved_concepts.len(),
        tokens,
        "built scope context"
    );

    ScopeContext {
        covered_concepts,
        reserved_concepts,
        methods_in_scope,
        classes_in_scope,
        text,
        tokens,
    }
}

fn render(covered: &[String], reserved: &[String], methods: bool, classes: bool) -> String {
    let mut out = String::from("SCOPE CONTEXT\n");
    if covered.is_empty() {
        out.push_str("This is the first lesson; assume no prior concepts.\n");
    } else {
        out.push_str("Concepts the learner has already covered (you may use these):\n");
        for concept in covered {
            out.push_str(&format!("- {}\n", concept));
        }
    }
    if !reserved.is_empty() {
        out.push_str("Concepts reserved for later lessons (do not introduce these):\n");
        for concept in reserved {
            out.push_str(&format!("- {}\n", concept));
        }
    }
    if !methods {
        out.push_str(
            "Do not define or call user-written functions or methods; they have not been covered yet.\n",
        );
    }
    if !classes {
        out.push_str("Do not use classes or object-oriented programming; they have not been covered yet.\n");
    }
    out
}
