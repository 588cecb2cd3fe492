//! Prompt templates and fixed choice lists
//!
//! Every task is a template filled with the request parameters. The choice
//! lists back the two selection fields: the copy type and the visual layout.

use crate::task::GenerationRequest;

/// A selectable option: display label and the value sent to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub label: &'static str,
    pub value: &'static str,
}

/// Copy types offered by the copy form
pub const COPY_TYPES: &[Choice] = &[
    Choice {
        label: "Tagline",
        value: "Generate a catchy tagline.",
    },
    Choice {
        label: "Social Media Ad",
        value: "Write a short ad copy for a social media post.",
    },
    Choice {
        label: "Call-to-Action",
        value: "Create a compelling call-to-action.",
    },
    Choice {
        label: "Email Pitch",
        value: "Draft a product pitch for an email campaign.",
    },
];

/// Layout styles offered by the visual form
pub const LAYOUT_STYLES: &[Choice] = &[
    Choice {
        label: "Minimalist",
        value: "minimalist design",
    },
    Choice {
        label: "E-commerce",
        value: "e-commerce style",
    },
    Choice {
        label: "Cinematic",
        value: "cinematic style",
    },
    Choice {
        label: "Corporate",
        value: "corporate and clean",
    },
];

/// Resolve a choice by value or (case-insensitively) by label
pub fn resolve_choice(choices: &[Choice], input: &str) -> Option<&'static str> {
    choices
        .iter()
        .find(|c| c.value == input || c.label.eq_ignore_ascii_case(input))
        .map(|c| c.value)
}

/// Fill the template for a request
pub fn build_prompt(request: &GenerationRequest) -> String {
    match request {
        GenerationRequest::Copy(p) => format!(
            "You are an expert marketing copywriter. Generate marketing copy based on the following information:\n\n\
             Prompt Template: {}\n\
             Audience: {}\n\
             Platform: {}\n\
             Product Name: {}\n\
             Product Description: {}",
            p.prompt_template, p.audience, p.platform, p.product_name, p.product_description
        ),
        GenerationRequest::BrandVoice(p) => format!(
            "You are an expert marketing copywriter specializing in adapting content to match specific brand guidelines.\n\n\
             Instructions: Adapt the provided content to match the tone, style, and voice described in the brand guidelines.\n\
             Ensure the adapted content aligns with the brand's identity and resonates with its target audience.\n\n\
             Brand Guidelines:\n{}\n\n\
             Content to Adapt:\n{}\n\n\
             Adapted Content:\n",
            p.brand_guidelines, p.content_to_adapt
        ),
        GenerationRequest::Visual(p) => format!(
            "Generate an image based on the following layout hints: {}, style preferences: {}, and image description: {}.",
            p.layout_hints, p.style_preferences, p.prompt
        ),
        GenerationRequest::Moderation(p) => format!(
            "You are a content moderation assistant for a marketing team. Review the text below for cultural, \
             gender, or racial sensitivity.\n\n\
             Respond with JSON of the form {{\"isSensitive\": boolean, \"reason\": string}} where reason briefly \
             explains the verdict.\n\n\
             Text:\n{}",
            p.text
        ),
    }
}
