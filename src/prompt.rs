//! Builds the text sent to Gemini for a log sample

/// Instructions used when the caller does not bring their own
pub const DEFAULT_INSTRUCTIONS: &str = r#"Analyze this CSV data for the following:

1. Does it appear that there are multi-line logs? These are logs that are abruptly truncated with a '\n'. That can lead to a duplication of the entire log including all attributes. Give a summary of the % of times this occurs in the sample. And a % of bytes (estimated) in the sample set are impacted.

2. Give a summary of whether any logs or metrics are being duplicated completely. In other words they are coming from different sources but are mostly the same. Provide some statistical summary of the impact in terms of numbers of records and potential byte size impact.

3. Give a summary attribute count breakdown. Average, Max, P75, P95. Include some breakdowns as well if any sources are particularly the cause of a very high number of attributes (P90 or above).

4. Give an analysis of whether some attributes seem to be duplicated. This could happen where some logs have two fields like "env" and "environ" that contain more or less the same thing. In addition you may have logs that have a "message" and "Message" field with more or less the same payload. Those are just examples.

5. Find any examples of garbled text or very difficult to understand text. These could be character codes, base 64, hex or just something that may not be a good fit for log data.

Format the whole answer as a single HTML fragment (no <html>, <head> or <body> tags, no markdown fences) that will be inserted into a dark-themed page. Use inline styles only, with this palette:
- background: #1e1e2e for panels, #181825 for tables
- text: #cdd6f4, muted text: #a6adc8
- headings: #89b4fa
- highlights and percentages: #f9e2af
- problems: #f38ba8, healthy findings: #a6e3a1
- table borders: #45475a
Use one <h3> per numbered section, tables for statistics and <code> for attribute names."#;

/// Separates the instructions from the log sample
pub const DATA_DELIMITER: &str = "\n\nHere is the data:\n---\n";

const DATA_TERMINATOR: &str = "\n---\n";

/// The caller's instructions, unless they are absent or blank
pub fn custom_instructions(prompt: Option<&str>) -> Option<&str> {
    prompt.filter(|instructions| !instructions.trim().is_empty())
}

/// Picks the caller's instructions when they gave any, else [`DEFAULT_INSTRUCTIONS`],
/// and appends the log sample verbatim.
pub fn build_prompt(custom: Option<&str>, log_sample: &str) -> String {
    let instructions = custom_instructions(custom).unwrap_or(DEFAULT_INSTRUCTIONS);

    let mut prompt = String::with_capacity(
        instructions.len() + DATA_DELIMITER.len() + log_sample.len() + DATA_TERMINATOR.len(),
    );
    prompt.push_str(instructions);
    prompt.push_str(DATA_DELIMITER);
    prompt.push_str(log_sample);
    prompt.push_str(DATA_TERMINATOR);
    prompt
}
