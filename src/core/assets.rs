//! Embedded prompt assets.
//!
//! Prompt files under `prompts/` are baked into the binary at compile time,
//! so generation needs no files at runtime.

use crate::core::lab::TemplateType;

/// Embeds prompt files as constants and generates `get_embedded_prompt`
/// and `list_prompts` over them.
macro_rules! embedded_prompts {
    ($($path:expr => $const_name:ident),* $(,)?) => {
        $(
            pub const $const_name: &str = include_str!(concat!("../../prompts/", $path));
        )*

        pub fn get_embedded_prompt(path: &str) -> Option<&'static str> {
            match path {
                $( $path => Some($const_name), )*
                _ => None,
            }
        }

        pub fn list_prompts() -> Vec<&'static str> {
            vec![ $( $path, )* ]
        }
    };
}

embedded_prompts! {
    "selector.md" => PROMPT_SELECTOR,
    "analyze.md" => PROMPT_ANALYZE,
    "build.md" => PROMPT_BUILD,
    "derive.md" => PROMPT_DERIVE,
    "explain.md" => PROMPT_EXPLAIN,
    "explore.md" => PROMPT_EXPLORE,
    "revise.md" => PROMPT_REVISE,
}

/// The content-generation prompt template for a template type.
pub fn prompt_for(template_type: TemplateType) -> &'static str {
    match template_type {
        TemplateType::Analyze => PROMPT_ANALYZE,
        TemplateType::Build => PROMPT_BUILD,
        TemplateType::Derive => PROMPT_DERIVE,
        TemplateType::Explain => PROMPT_EXPLAIN,
        TemplateType::Explore => PROMPT_EXPLORE,
        TemplateType::Revise => PROMPT_REVISE,
    }
}

pub fn selector_prompt() -> &'static str {
    PROMPT_SELECTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_type_has_a_listed_prompt() {
        let listed = list_prompts();
        for template_type in TemplateType::ALL {
            let file = format!("{}.md", template_type.as_str());
            assert!(listed.contains(&file.as_str()));
            assert_eq!(get_embedded_prompt(&file), Some(prompt_for(template_type)));
        }
        assert!(get_embedded_prompt("missing.md").is_none());
    }

    #[test]
    fn selector_asks_for_the_discriminant() {
        assert!(selector_prompt().contains("template_type"));
    }
}
