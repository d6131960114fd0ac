//! Analysis Prompt
//!
//! Builds the system/user instruction pair sent for one chunk of text.
//! The full instructions are re-sent with every chunk; nothing carries over
//! between requests.

use undoctrinator_core::{remove_extra_whitespaces, IntensityLevel};
use undoctrinator_llm::Prompt;

use crate::utils::error::{AppError, AppResult};

fn intensity_keywords() -> String {
    IntensityLevel::ALL
        .iter()
        .map(|level| level.as_str())
        .collect::<Vec<_>>()
        .join(" | ")
}

fn system_instructions() -> String {
    let levels = intensity_keywords();
    format!(
        r#"
        You are a media analysis assistant that identifies manipulation tactics and bias in text.
        Analyze the provided text and produce a structured, evidence-based report as a JSON object.
        1. Requirements:
          - Consider both explicit and subtle manipulation tactics.
          - Ground every finding in evidence from the text.
          - Quote the text directly for every identified element.
          - Explain briefly why each quoted element qualifies as manipulation or bias.
          - Rate intensity levels as: {levels}.
          - Respond with a single well-formed JSON object and nothing else.
        2. Analysis Framework:
          A) Claims and Logic:
            - Unsupported or unverifiable claims.
            - Logical fallacies.
            - Coherence and consistency of the argument.
          B) Emotional Manipulations:
            - Sensationalist language, hyperbole, clickbait or misleading headlines.
            - Oversimplification of complex issues.
            - Loaded terms and charged language.
            - Out-of-context data, meaningless comparisons, correlation presented as causation.
            - Anonymous or vague sources, appeals to false authority.
            - Missing context or a lack of diverse perspectives.
            - Fear-mongering, manufactured urgency, bandwagon and social proof pressure.
            - False scarcity, gaslighting, guilt-tripping, in-group versus out-group framing.
          C) Political Ideology:
            - Ideological markers or affiliations.
            - Strength and influence of ideological bias.
          D) Promoted Values:
            - Values or agendas promoted explicitly or implicitly.
        3. Output Format:
          {{
            ideologicalStrength: {levels},
            emotionalManipulationStrength: {levels},
            ideologicalMarkers: {{ quote: string, explanation: string, associatedIdeology: string }}[],
            promotedValues: {{ quote: string, explanation: string, associatedIdeology: string }}[],
            emotionalManipulations: {{ quote: string, explanation: string, targetEmotion: string }}[],
            logicalFallacies: {{ quote: string, explanation: string, fallacyType: string }}[],
          }}
        "#
    )
}

/// Build the instruction pair for one chunk of `text`.
pub fn craft_instructions(text: &str) -> AppResult<Prompt> {
    if text.trim().is_empty() {
        return Err(AppError::validation(
            "Text parameter is required and cannot be empty",
        ));
    }

    let user = format!(
        r#"
        TEXT TO ANALYZE:
        """
        {}
        """
        "#,
        text
    );

    Ok(Prompt::new(
        remove_extra_whitespaces(&system_instructions()),
        remove_extra_whitespaces(&user),
    ))
}
