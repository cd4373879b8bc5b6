// ABOUTME: The character-level scanner that cuts source text into a flat token vector
//! The character-level scanner: cuts source text into a flat,
//! opaque token vector. No value typing happens here — that is entirely
//! the compiler's job. The only "interpretation" performed at
//! this stage is the handful of things that can only be decided with
//! character-level lookahead: comment spans, quoted-literal bodies, and the
//! unary `-`/`+` disambiguation.

use tracing::debug;

/// One lexed token. Kept as an owned `String` — tokens are opaque text;
/// there is no token-kind tag at this stage.
pub type Token = String;

const WORD_BREAKERS: &str = ",.()[]{}:;";
const OP_CHARS: &str = "+-*/%=!<>@";

fn is_oliver_whitespace(c: char) -> bool {
    (c as u32) < 0x20 || c.is_whitespace()
}

/// Tokenizes `source` into the flat vector the compiler consumes, including
/// a synthetic enclosing `(` `)` pair so that user code is always
/// interpreted inside one top-level expression.
pub fn lex(source: &str) -> Vec<Token> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    tokens.push("(".to_string());
    lex_into(&chars, &mut tokens);
    tokens.push(")".to_string());
    debug!(source_len = chars.len(), token_count = tokens.len(), "lexed source into tokens");
    tokens
}

fn lex_into(chars: &[char], tokens: &mut Vec<Token>) {
    let mut i = 0;
    let mut block_comment = false;

    while i < chars.len() {
        let c = chars[i];

        if block_comment {
            if c == '#' && matches!(chars.get(i + 1), Some('#')) {
                block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if c == '#' {
            if matches!(chars.get(i + 1), Some('#')) {
                block_comment = true;
                i += 2;
            } else {
                // Line comment to EOL. `#!` (shebang, reserved but not
                // implemented) falls out of this naturally: it's
                // just a `#` line comment whose second character happens
                // to be `!`.
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            continue;
        }

        if is_oliver_whitespace(c) {
            i += 1;
            continue;
        }

        if c == '\'' || c == '"' || c == '\\' || c == '`' {
            i = lex_quoted_literal(chars, i, tokens);
            continue;
        }

        if WORD_BREAKERS.contains(c) {
            // `::` gets an explicit two-character lookahead;
            // every other compound operator is recognized by the
            // compiler's fixed keyword table from tokens the lexer emits
            // here via maximal munch (see the operator-char branch below).
            if c == ':' && matches!(chars.get(i + 1), Some(':')) {
                tokens.push("::".to_string());
                i += 2;
            } else {
                tokens.push(c.to_string());
                i += 1;
            }
            continue;
        }

        if c == '-' || c == '+' {
            i = lex_sign(chars, i, tokens);
            continue;
        }

        if OP_CHARS.contains(c) {
            i = lex_operator_run(chars, i, tokens);
            continue;
        }

        i = lex_word(chars, i, tokens);
    }
}

/// `-`/`+` unary disambiguation, plus the `-->`/`-=`/`--` bracket
/// and degenerate-neg cases layered on top of it.
fn lex_sign(chars: &[char], i: usize, tokens: &mut Vec<Token>) -> usize {
    let c = chars[i];

    if c == '-' {
        if matches!(chars.get(i + 1), Some('-')) && matches!(chars.get(i + 2), Some('>')) {
            tokens.push("-->".to_string());
            return i + 3;
        }
        if matches!(chars.get(i + 1), Some('=')) {
            tokens.push("-=".to_string());
            return i + 2;
        }
        // Two `--` with no following `>` degrade to two `neg` tokens: we
        // only special-case the immediate "-->" run above; a bare "--"
        // just falls through to the generic not-followed-by-whitespace
        // check below, which fires on each dash independently.
    }

    let followed_by_whitespace = match chars.get(i + 1) {
        None => true,
        Some(&next) => is_oliver_whitespace(next),
    };

    if followed_by_whitespace {
        tokens.push(c.to_string());
    } else {
        tokens.push(if c == '-' { "neg".to_string() } else { "pos".to_string() });
    }
    i + 1
}

/// Maximal-munch reader for the remaining symbolic-operator characters.
/// Longest recognized spelling wins; anything left over still gets emitted
/// (and folds to a `Symbol` downstream if the compiler's keyword table
/// doesn't recognize it).
fn lex_operator_run(chars: &[char], i: usize, tokens: &mut Vec<Token>) -> usize {
    let rest: String = chars[i..chars.len().min(i + 3)].iter().collect();

    const THREE: &[&str] = &["<--", "<==", ">>>", "<<<"];
    for op in THREE {
        if rest.starts_with(op) {
            tokens.push((*op).to_string());
            return i + op.chars().count();
        }
    }

    let rest2: String = chars[i..chars.len().min(i + 2)].iter().collect();
    const TWO: &[&str] = &["==", "!=", "<=", ">=", "**", "//", "%%"];
    for op in TWO {
        if rest2.starts_with(op) {
            tokens.push((*op).to_string());
            return i + 2;
        }
    }

    tokens.push(chars[i].to_string());
    i + 1
}

/// Accumulates a run of "word" characters: anything that isn't whitespace,
/// word-breaker punctuation, `#`, a quote delimiter, or an operator-class
/// character (those interrupt a word and are handled by their own rule).
fn lex_word(chars: &[char], i: usize, tokens: &mut Vec<Token>) -> usize {
    let start = i;
    let mut j = i;
    while j < chars.len() {
        let c = chars[j];
        if is_oliver_whitespace(c)
            || WORD_BREAKERS.contains(c)
            || OP_CHARS.contains(c)
            || c == '#'
            || c == '\''
            || c == '"'
            || c == '\\'
            || c == '`'
        {
            break;
        }
        j += 1;
    }
    if j == start {
        // Shouldn't happen (caller only enters here on a non-breaker
        // character), but avoid an infinite loop defensively.
        j += 1;
    }
    tokens.push(chars[start..j].iter().collect());
    j
}

/// Reads one of the four quoted-literal forms: `'…'` numeric,
/// `"…"` string (with escape resolution), `\…\` regex (stored verbatim),
/// `` `…` `` format (stored verbatim). Emits the delimiter, body, and
/// closing delimiter as three tokens, matching what the compiler expects
/// to re-assemble into a single literal value. An unterminated literal
/// runs to end-of-input and the closing-delimiter token is simply omitted
/// (.1 "Failure mode").
fn lex_quoted_literal(chars: &[char], i: usize, tokens: &mut Vec<Token>) -> usize {
    let delim = chars[i];
    tokens.push(delim.to_string());

    let mut j = i + 1;
    let mut body = String::new();
    let resolve_escapes = delim == '"';

    while j < chars.len() && chars[j] != delim {
        if resolve_escapes && chars[j] == '\\' {
            match chars.get(j + 1) {
                Some('\\') => {
                    body.push('\\');
                    j += 2;
                }
                Some('a') => {
                    body.push('\u{07}');
                    j += 2;
                }
                Some('b') => {
                    body.push('\u{08}');
                    j += 2;
                }
                Some('f') => {
                    body.push('\u{0C}');
                    j += 2;
                }
                Some('n') => {
                    body.push('\n');
                    j += 2;
                }
                Some('r') => {
                    body.push('\r');
                    j += 2;
                }
                Some('t') => {
                    body.push('\t');
                    j += 2;
                }
                Some('v') => {
                    body.push('\u{0B}');
                    j += 2;
                }
                Some(&other) => {
                    // Any other `\x` passes `x` through unescaped.
                    body.push(other);
                    j += 2;
                }
                None => {
                    // Trailing lone backslash at end-of-literal: passed
                    // through literally (original_source/text_parser.h
                    // behavior, see DESIGN.md).
                    body.push('\\');
                    j += 1;
                }
            }
        } else {
            body.push(chars[j]);
            j += 1;
        }
    }

    tokens.push(body);
    if j < chars.len() {
        tokens.push(delim.to_string());
        j + 1
    } else {
        j
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_in_synthetic_parens() {
        let toks = lex("1");
        assert_eq!(toks.first().unwrap(), "(");
        assert_eq!(toks.last().unwrap(), ")");
    }

    #[test]
    fn tight_minus_is_neg() {
        let toks = lex("-5");
        assert!(toks.contains(&"neg".to_string()));
    }

    #[test]
    fn spaced_minus_is_binary() {
        let toks = lex("1 - 2");
        assert!(toks.contains(&"-".to_string()));
        assert!(!toks.contains(&"neg".to_string()));
    }

    #[test]
    fn place_lead_bracket_token() {
        let toks = lex("x --> y");
        assert!(toks.contains(&"-->".to_string()));
    }

    #[test]
    fn double_dash_degrades_to_two_negs() {
        let toks = lex("--5");
        let negs = toks.iter().filter(|t| *t == "neg").count();
        assert_eq!(negs, 2);
    }

    #[test]
    fn line_comment_swallowed() {
        let toks = lex("1 # this is a comment\n2");
        assert_eq!(toks, vec!["(", "1", "2", ")"]);
    }

    #[test]
    fn block_comment_swallowed_across_newlines() {
        let toks = lex("1 ## block\ncomment ## 2");
        assert_eq!(toks, vec!["(", "1", "2", ")"]);
    }

    #[test]
    fn string_literal_with_escapes() {
        let toks = lex(r#""a\nb""#);
        assert_eq!(toks, vec!["(", "\"", "a\nb", "\"", ")"]);
    }

    #[test]
    fn unterminated_string_runs_to_eof() {
        let toks = lex("\"abc");
        assert_eq!(toks, vec!["(", "\"", "abc", ")"]);
    }

    #[test]
    fn double_colon_is_one_token() {
        let toks = lex("a::b");
        assert!(toks.contains(&"::".to_string()));
    }

    #[test]
    fn compound_operators_tokenize_whole() {
        let toks = lex("x == y");
        assert!(toks.contains(&"==".to_string()));
        let toks = lex("x <== y");
        assert!(toks.contains(&"<==".to_string()));
    }
}
