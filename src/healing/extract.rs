// Code extraction from model responses

use once_cell::sync::Lazy;
use regex::Regex;

static PYTHON_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python\n(.*?)```").expect("valid regex"));
static BARE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```\n(.*?)```").expect("valid regex"));

const PYTHON_CODE_MARKERS: &[&str] = &[
    "import ", "from ", "def ", "class ", "if ", "for ", "while ", "return ", "    ", "self.",
    "=", "(", ")",
];

/// Pull the code body out of a model response
///
/// Tries, in order: a fence tagged with `language`, a `python` fence, an
/// untagged fence, a line filter that drops prose, then the whole response.
pub fn extract_code(response: &str, language: &str) -> String {
    if let Some(code) = tagged_fence(response, language) {
        return code;
    }
    for fence in [&*PYTHON_FENCE, &*BARE_FENCE] {
        if let Some(caps) = fence.captures(response) {
            return caps[1].trim().to_string();
        }
    }

    let code_lines = filter_code_lines(response, language);
    if !code_lines.is_empty() {
        return code_lines.join("\n");
    }

    response.trim().to_string()
}

fn tagged_fence(response: &str, language: &str) -> Option<String> {
    if language.is_empty() {
        return None;
    }
    let pattern = format!(r"(?s)```{}\n(.*?)```", regex::escape(language));
    let fence = Regex::new(&pattern).ok()?;
    fence
        .captures(response)
        .map(|caps| caps[1].trim().to_string())
}

fn filter_code_lines<'a>(response: &'a str, language: &str) -> Vec<&'a str> {
    let mut code_lines = Vec::new();
    let mut in_code = false;

    for line in response.trim().lines() {
        if line.starts_with('#') && !line.starts_with("# ") {
            continue;
        }
        let trimmed = line.trim_start();
        if line.to_lowercase().contains("fix")
            && !["def", "class", "import"]
                .iter()
                .any(|kw| trimmed.starts_with(kw))
        {
            continue;
        }
        if line.starts_with("```") {
            in_code = !in_code;
            continue;
        }
        if in_code || looks_like_code(line, language) {
            code_lines.push(line);
        }
    }
    code_lines
}

/// Rough "is this a code line" test; only Python has real markers
pub fn looks_like_code(line: &str, language: &str) -> bool {
    if language.eq_ignore_ascii_case("python") {
        PYTHON_CODE_MARKERS.iter().any(|m| line.contains(m))
    } else {
        true
    }
}
