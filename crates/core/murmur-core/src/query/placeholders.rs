//! Positional placeholder scanning for `$n` style templates

use crate::{MurmurError, Result};
use std::collections::BTreeSet;

/// Distinct `$n` placeholder indices used by a template.
///
/// String literals, quoted identifiers and comments are skipped, as are `$`
/// signs that continue an identifier (`a$1`).
pub fn placeholder_indices(sql: &str) -> BTreeSet<usize> {
    let chars: Vec<char> = sql.chars().collect();
    let mut found = BTreeSet::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            quote @ ('\'' | '"') => {
                i += 1;
                while i < chars.len() {
                    if chars[i] == quote {
                        // doubled quote is an escape, not the end
                        if chars.get(i + 1) == Some(&quote) {
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    i += 1;
                }
                i += 1;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            '$' => {
                let continues_identifier = i > 0
                    && (chars[i - 1].is_ascii_alphanumeric() || chars[i - 1] == '_');
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].is_ascii_digit() {
                    end += 1;
                }
                if !continues_identifier && end > start {
                    let digits: String = chars[start..end].iter().collect();
                    if let Ok(index) = digits.parse::<usize>() {
                        found.insert(index);
                    }
                }
                i = end.max(i + 1);
            }
            _ => i += 1,
        }
    }

    found
}

/// Number of distinct placeholders in a template
pub fn count_placeholders(sql: &str) -> usize {
    placeholder_indices(sql).len()
}

/// Verify a template takes exactly `parameters` bound values.
///
/// Placeholders must be exactly `$1..=$n` with `n == parameters`; a gap such
/// as `$1, $3` is reported with the highest index as the placeholder count.
pub fn check_arity(sql: &str, parameters: usize) -> Result<()> {
    let indices = placeholder_indices(sql);
    let highest = indices.iter().next_back().copied().unwrap_or(0);
    let contiguous = highest == indices.len() && !indices.contains(&0);

    if !contiguous {
        return Err(MurmurError::binding_arity(highest.max(indices.len()), parameters));
    }
    if indices.len() != parameters {
        return Err(MurmurError::binding_arity(indices.len(), parameters));
    }
    Ok(())
}
