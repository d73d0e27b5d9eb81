//! Prompt assembly for portraits and doodles.

use crate::choices::{Age, ArtStyle, DoodleStyle, Gender, Job, Layout};

/// Everything a user picks for a future-self portrait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortraitChoices {
    pub job: Job,
    pub age: Age,
    pub gender: Gender,
    pub style: ArtStyle,
    pub layout: Layout,
}

/// Prompt for turning a user photo into a future-self portrait.
pub fn portrait_prompt(choices: &PortraitChoices) -> String {
    format!(
        "Transform the person in this photo into a portrait of their future self: \
         a {age}-year-old {noun} working as {job}. \
         {layout}. Render it as a {style}. \
         Keep the person's facial features, face shape and skin tone recognizable, \
         and adjust them naturally for the age of {age}. \
         Friendly, confident expression, clean background that fits the job, \
         no text, no watermark.",
        age = choices.age,
        noun = choices.gender.noun(choices.age),
        job = choices.job.description(),
        layout = choices.layout.description(),
        style = choices.style.description(),
    )
}

/// Prompt for rendering a child's doodle.
pub fn doodle_prompt(style: DoodleStyle) -> String {
    format!(
        "Turn this child's drawing into {style}. \
         Keep the original composition, the number and placement of the drawn \
         subjects, their shapes and their colors so the child can recognize \
         their own drawing. Add natural detail, lighting and texture. \
         Keep it cheerful and safe for children, no text, no watermark.",
        style = style.description(),
    )
}
