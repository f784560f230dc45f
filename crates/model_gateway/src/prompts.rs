//! Summarization prompts.

use pagebrief_core::SourceKind;

/// Instructions sent alongside a rendered web page.
pub const WEB_PAGE_PROMPT: &str = "\
Summarize this web page as key-points in valid Markdown format by following the instructions given below:
1. Identify the main theme/topic of the web page and use it as the main heading of the summary.
2. Ignore extraneous content like author bios, introductory fluff, or purely decorative images unless they convey key technical information. Focus solely on the core message and technical details.
3. Highlight important terms, concepts, or actions using bold.
4. Use italic to emphasize nuances, supporting details, or sub-points.
5. Include emojis sparingly in the summary where appropriate.
6. Ensure the summary is well formatted and free of markdown violations.
7. Skip any preamble or explanation. Provide only the Markdown summary itself.";

/// Instructions sent alongside a video reference.
pub const VIDEO_PROMPT: &str = "\
Summarize this video as key-points in valid Markdown format by following the instructions given below:
1. Identify the main theme/topic of the video and use it as the main heading of the summary.
2. Highlight important terms, concepts, or actions using bold.
3. Use italic to emphasize nuances, supporting details, or sub-points.
4. Include emojis sparingly in the summary where appropriate.
5. Ensure the summary is well formatted and free of markdown violations.
6. Skip any preamble or explanation. Provide only the Markdown summary itself.";

/// Description attached to the `summary` field of the response schema.
pub const SUMMARY_FIELD_DESCRIPTION: &str = "Summary in Markdown format";

/// Prompt for a source kind.
pub fn prompt_for(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Document => WEB_PAGE_PROMPT,
        SourceKind::Video => VIDEO_PROMPT,
    }
}
