// Syntax check
//
// Python goes through the interpreter's own `ast.parse`, which catches
// indentation and version errors the tree-sitter grammar tolerates.
// tree-sitter covers the other languages, and Python when no interpreter
// can be found.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser};

use super::process::{run_process, tool_available, ProcessSpec};
use super::types::{ValidationOutcome, ValidationStrategy};
use super::{Check, CheckInput, ValidatorSettings};

const AST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads source on stdin and prints `lineno<TAB>msg<TAB>text` on a SyntaxError
const AST_SCRIPT: &str = r#"import ast, sys
src = sys.stdin.read()
try:
    ast.parse(src)
except SyntaxError as e:
    text = (e.text or "").strip().replace("\t", " ")
    sys.stdout.write("%s\t%s\t%s\n" % (e.lineno or 0, e.msg, text))
    sys.exit(1)
"#;

pub struct SyntaxCheck {
    python: String,
}

impl SyntaxCheck {
    pub fn new(settings: &ValidatorSettings) -> Self {
        Self {
            python: settings.python.clone(),
        }
    }
}

impl Default for SyntaxCheck {
    fn default() -> Self {
        Self::new(&ValidatorSettings::default())
    }
}

/// Grammar for a language name, if one is wired in
fn grammar_for(language: &str) -> Option<Language> {
    match language.to_lowercase().as_str() {
        "python" => Some(tree_sitter_python::LANGUAGE.into()),
        "javascript" => Some(tree_sitter_javascript::LANGUAGE.into()),
        "typescript" => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "rust" => Some(tree_sitter_rust::LANGUAGE.into()),
        _ => None,
    }
}

pub fn is_supported(language: &str) -> bool {
    grammar_for(language).is_some()
}

/// Parse `code` and describe the first syntax error, if any
///
/// Returns `Err` only when the grammar can't be loaded or the parser gives up.
pub fn first_syntax_error(code: &str, language: Language) -> Result<Option<String>, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| format!("Failed to set language: {}", e))?;

    let tree = parser
        .parse(code, None)
        .ok_or_else(|| "Parser returned no tree".to_string())?;

    let root = tree.root_node();
    if !root.has_error() {
        return Ok(None);
    }

    Ok(find_error_node(root).map(|node| describe(node, code)))
}

/// Pre-order search, only descending into subtrees that contain an error
fn find_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_error_node(child) {
            return Some(found);
        }
    }
    None
}

/// Turn the `ast.parse` report into `Line N: msg - text`
///
/// `None` when stdout doesn't carry a report.
pub fn parse_ast_report(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?;
    let mut fields = line.splitn(3, '\t');
    let lineno: usize = fields.next()?.trim().parse().ok()?;
    let msg = fields.next()?.trim();
    let text = fields.next().unwrap_or("").trim();

    let mut error = format!("Line {}: {}", lineno, msg);
    if !text.is_empty() {
        error.push_str(" - ");
        error.push_str(text);
    }
    Some(error)
}

/// Ask the interpreter to parse `code`
///
/// `Err` when the interpreter ran but gave no usable answer.
async fn python_syntax_error(python: &str, code: &str) -> Result<Option<String>, String> {
    let spec = ProcessSpec::new(python, ["-c", AST_SCRIPT])
        .stdin(code)
        .timeout(AST_TIMEOUT);
    let output = run_process(&spec).await;

    if output.success() {
        return Ok(None);
    }
    if output.returncode == 1 {
        if let Some(error) = parse_ast_report(&output.stdout) {
            return Ok(Some(error));
        }
    }
    Err(format!(
        "{} exited with {}: {}",
        python,
        output.returncode,
        output.stderr.trim()
    ))
}

fn describe(node: Node<'_>, code: &str) -> String {
    let row = node.start_position().row;
    let message = if node.is_missing() {
        format!("missing '{}'", node.kind())
    } else {
        "invalid syntax".to_string()
    };

    let mut error = format!("Line {}: {}", row + 1, message);
    if let Some(text) = code.lines().nth(row).map(str::trim) {
        if !text.is_empty() {
            error.push_str(" - ");
            error.push_str(text);
        }
    }
    error
}

#[async_trait]
impl Check for SyntaxCheck {
    fn strategy(&self) -> ValidationStrategy {
        ValidationStrategy::Syntax
    }

    async fn run(&self, input: &CheckInput<'_>) -> ValidationOutcome {
        let start = Instant::now();

        let Some(language) = grammar_for(input.language) else {
            return ValidationOutcome::skipped(
                ValidationStrategy::Syntax,
                format!("Syntax validation not supported for {}", input.language),
                start.elapsed(),
            );
        };

        if input.code.trim().is_empty() {
            return ValidationOutcome::from_diagnostics(
                ValidationStrategy::Syntax,
                Vec::new(),
                Vec::new(),
                start.elapsed(),
            );
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if input.language.eq_ignore_ascii_case("python") {
            if tool_available(&self.python) {
                match python_syntax_error(&self.python, input.code).await {
                    Ok(found) => {
                        return ValidationOutcome::from_diagnostics(
                            ValidationStrategy::Syntax,
                            found.into_iter().collect(),
                            warnings,
                            start.elapsed(),
                        );
                    }
                    Err(e) => {
                        warn!("ast.parse gave no answer, using tree-sitter: {}", e);
                        warnings.push(format!("Python parser failed, used tree-sitter: {}", e));
                    }
                }
            } else {
                debug!("{} not found, falling back to tree-sitter", self.python);
            }
        }

        match first_syntax_error(input.code, language) {
            Ok(Some(error)) => errors.push(error),
            Ok(None) => {}
            Err(e) => warnings.push(format!("Syntax check failed: {}", e)),
        }

        ValidationOutcome::from_diagnostics(
            ValidationStrategy::Syntax,
            errors,
            warnings,
            start.elapsed(),
        )
    }
}
