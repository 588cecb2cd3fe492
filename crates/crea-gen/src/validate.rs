//! Client-side parameter validation
//!
//! Runs before any gateway call. A non-empty error list means the request
//! must not be sent.

use crate::prompt::{Choice, COPY_TYPES, LAYOUT_STYLES};
use crate::task::{BrandVoiceParams, CopyParams, ModerationParams, VisualParams};
use crea_core::FieldError;

/// Implemented by every parameter record a form can submit
pub trait Validate {
    /// All field-level violations, in field order. Empty when valid.
    fn validate(&self) -> Vec<FieldError>;

    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

/// Length bounds for a free-text field, counted in characters
#[derive(Debug, Clone, Copy)]
pub struct LengthRule {
    pub field: &'static str,
    pub min: usize,
    pub max: usize,
    pub message: &'static str,
}

impl LengthRule {
    pub fn check(&self, value: &str, errors: &mut Vec<FieldError>) {
        let len = value.chars().count();
        if len < self.min {
            errors.push(FieldError::new(self.field, self.message));
        } else if len > self.max {
            errors.push(FieldError::new(
                self.field,
                format!("Must contain at most {} character(s).", self.max),
            ));
        }
    }
}

fn check_choice(
    field: &'static str,
    value: &str,
    choices: &[Choice],
    message: &'static str,
    errors: &mut Vec<FieldError>,
) {
    if !choices.iter().any(|c| c.value == value) {
        errors.push(FieldError::new(field, message));
    }
}

pub const PRODUCT_NAME: LengthRule = LengthRule {
    field: "productName",
    min: 2,
    max: 50,
    message: "Product name is required.",
};
pub const PRODUCT_DESCRIPTION: LengthRule = LengthRule {
    field: "productDescription",
    min: 10,
    max: 300,
    message: "Description must be at least 10 characters.",
};
pub const PLATFORM: LengthRule = LengthRule {
    field: "platform",
    min: 1,
    max: 100,
    message: "Platform is required.",
};
pub const AUDIENCE: LengthRule = LengthRule {
    field: "audience",
    min: 1,
    max: 100,
    message: "Audience is required.",
};
pub const BRAND_GUIDELINES: LengthRule = LengthRule {
    field: "brandGuidelines",
    min: 10,
    max: 2000,
    message: "Brand guidelines are required.",
};
pub const CONTENT_TO_ADAPT: LengthRule = LengthRule {
    field: "contentToAdapt",
    min: 10,
    max: 2000,
    message: "Content to adapt is required.",
};
pub const VISUAL_PROMPT: LengthRule = LengthRule {
    field: "prompt",
    min: 10,
    max: 500,
    message: "A descriptive prompt is required.",
};
pub const STYLE_PREFERENCES: LengthRule = LengthRule {
    field: "stylePreferences",
    min: 2,
    max: 100,
    message: "Style preferences are required.",
};
pub const MODERATION_TEXT: LengthRule = LengthRule {
    field: "text",
    min: 10,
    max: 2000,
    message: "Content to moderate is required.",
};

impl Validate for CopyParams {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        PRODUCT_NAME.check(&self.product_name, &mut errors);
        PRODUCT_DESCRIPTION.check(&self.product_description, &mut errors);
        PLATFORM.check(&self.platform, &mut errors);
        AUDIENCE.check(&self.audience, &mut errors);
        check_choice(
            "promptTemplate",
            &self.prompt_template,
            COPY_TYPES,
            "Please select a template.",
            &mut errors,
        );
        errors
    }
}

impl Validate for BrandVoiceParams {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        BRAND_GUIDELINES.check(&self.brand_guidelines, &mut errors);
        CONTENT_TO_ADAPT.check(&self.content_to_adapt, &mut errors);
        errors
    }
}

impl Validate for VisualParams {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        VISUAL_PROMPT.check(&self.prompt, &mut errors);
        STYLE_PREFERENCES.check(&self.style_preferences, &mut errors);
        check_choice(
            "layoutHints",
            &self.layout_hints,
            LAYOUT_STYLES,
            "Please select a layout hint.",
            &mut errors,
        );
        errors
    }
}

impl Validate for ModerationParams {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        MODERATION_TEXT.check(&self.text, &mut errors);
        errors
    }
}
