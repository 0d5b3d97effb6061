// Fix prompt construction

const MAX_PROMPT_ERRORS: usize = 20;
const MAX_PROMPT_WARNINGS: usize = 10;

/// Inputs to one fix prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptParts<'a> {
    pub code: &'a str,
    pub language: &'a str,
    pub errors: &'a [String],
    pub warnings: &'a [String],
    pub context: &'a str,
    pub attempt_num: u32,
}

impl PromptParts<'_> {
    fn error_list(&self) -> String {
        bullet_list(self.errors, MAX_PROMPT_ERRORS)
    }

    fn warning_list(&self) -> String {
        bullet_list(self.warnings, MAX_PROMPT_WARNINGS)
    }
}

fn bullet_list(items: &[String], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn system_prompt(language: &str) -> String {
    format!(
        "You are an expert {} developer specializing in code fixes. \
        Your task is to fix code errors while preserving functionality. \
        Return ONLY the complete fixed code, no explanations or markdown.",
        language
    )
}

/// Standard fix prompt
pub fn build_fix_prompt(parts: &PromptParts<'_>) -> String {
    let language = parts.language;
    let warnings = parts.warning_list();

    let mut lines = vec![
        format!("Fix the following {} code.", language),
        String::new(),
        "ERRORS TO FIX:".to_string(),
        parts.error_list(),
    ];

    if !warnings.is_empty() {
        lines.push(String::new());
        lines.push("WARNINGS (fix if possible):".to_string());
        lines.push(warnings);
    }

    lines.push(String::new());
    lines.push("ORIGINAL CODE:".to_string());
    lines.push(format!("```{}", language));
    lines.push(parts.code.to_string());
    lines.push("```".to_string());

    if !parts.context.is_empty() {
        lines.push(String::new());
        lines.push("CONTEXT:".to_string());
        lines.push(parts.context.to_string());
    }

    if parts.attempt_num > 1 {
        lines.push(String::new());
        lines.push(format!(
            "NOTE: This is attempt #{}. Previous fixes failed.",
            parts.attempt_num
        ));
        lines.push("Try a different approach or be more thorough with the fix.".to_string());
    }

    lines.push(String::new());
    lines.push(format!(
        "Return ONLY the fixed {} code, no explanations or markdown blocks.",
        language
    ));

    lines.join("\n")
}

/// Fill a caller template
///
/// Recognized placeholders: `{code}`, `{language}`, `{errors}`, `{warnings}`,
/// `{context}`, `{attempt_num}`. Anything else is left as written.
pub fn render_template(template: &str, parts: &PromptParts<'_>) -> String {
    let values = [
        ("{language}", parts.language.to_string()),
        ("{errors}", parts.error_list()),
        ("{warnings}", parts.warning_list()),
        ("{context}", parts.context.to_string()),
        ("{attempt_num}", parts.attempt_num.to_string()),
        ("{code}", parts.code.to_string()),
    ];

    // Single left-to-right pass so substituted text is never rescanned
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        for (placeholder, value) in &values {
            if tail.starts_with(placeholder) {
                out.push_str(value);
                rest = &tail[placeholder.len()..];
                continue 'scan;
            }
        }
        out.push('{');
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}
