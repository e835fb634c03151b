//! Parse reasoning-provider output into a verdict

use crate::error::HeuristicError;
use pharmatrace_domain::Verdict;

const FALLBACK_REASON: &str = "flagged by heuristic review";

/// Characters models like to wrap their answers in
const DECORATION: &[char] = &['*', '_', '`', '"', '\'', '>', '#', ' ', '\t'];

/// Strip markdown code fences, if any
///
/// Models often wrap even a one-line answer in ```.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        // Skip an optional language tag
        let after = after.find('\n').map_or(after, |nl| &after[nl + 1..]);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
        return after.trim();
    }
    trimmed
}

fn clean_line(line: &str) -> &str {
    let line = line.trim_matches(DECORATION);
    let line = line
        .trim_start_matches(|c: char| c == '-' || c == '•')
        .trim_matches(DECORATION);
    match line.get(..8) {
        Some(label) if label.eq_ignore_ascii_case("verdict:") => line[8..].trim_matches(DECORATION),
        _ => line,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Whether `line` starts with `keyword` as a whole word (case-insensitive)
fn starts_with_word<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() => None,
        _ => Some(rest),
    }
}

/// Parse a provider response into a verdict
///
/// Accepts the canonical `Legitimate` and `Flagged: <reason>` forms, tolerating
/// markdown decoration, a `Verdict:` label, a reason on the following line,
/// and any casing. Reasons longer than `max_chars` are truncated. Anything
/// else is [`HeuristicError::NonCanonical`].
///
/// # Examples
///
/// ```
/// use pharmatrace_domain::Verdict;
/// use pharmatrace_evaluator::parse_verdict;
///
/// assert_eq!(parse_verdict("**Legitimate**", 160).unwrap(), Verdict::Legitimate);
/// assert_eq!(
///     parse_verdict("Flagged: duplicate transfer", 160).unwrap(),
///     Verdict::Flagged("duplicate transfer".into())
/// );
/// assert!(parse_verdict("I am not sure", 160).is_err());
/// ```
pub fn parse_verdict(text: &str, max_chars: usize) -> Result<Verdict, HeuristicError> {
    let body = strip_fences(text);
    let mut lines = body.lines().map(clean_line).filter(|l| !l.is_empty());

    let Some(first) = lines.next() else {
        return Err(HeuristicError::NonCanonical("empty response".to_string()));
    };

    if starts_with_word(first, "legitimate").is_some() {
        return Ok(Verdict::Legitimate);
    }

    if let Some(rest) = starts_with_word(first, "flagged") {
        let inline = rest
            .trim_start_matches(|c: char| matches!(c, ':' | '-' | '–') || DECORATION.contains(&c))
            .trim_end_matches(DECORATION);
        let reason = if inline.is_empty() {
            lines.next().unwrap_or(FALLBACK_REASON)
        } else {
            inline
        };
        return Ok(Verdict::Flagged(truncate(reason.trim(), max_chars)));
    }

    Err(HeuristicError::NonCanonical(truncate(first, 80)))
}
