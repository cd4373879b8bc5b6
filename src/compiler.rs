//! Token-stream-to-expression-tree transform: normalizes prefix/
//! infix operators to postfix, reifies `lambda`/list/map literals, and
//! classifies identifiers into symbols, booleans, `nothing`, or opcodes.

use std::rc::Rc;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::lexer::Token;
use crate::opcode::{resolve_keyword, KeywordHit, OpCode};
use crate::value::{Boolean, Expr, Lambda, Map, Number, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Plain,
    List,
    Map,
}

/// One in-progress bracket level. `groups` holds the elements accumulated
/// since the frame opened, split at `;` ( "semicolon is an alias for
/// `)` in expression position" — implemented here as a statement
/// separator *within* a frame rather than a bracket-closer in its own
/// right, which is what lets it appear meaningfully even at the top
/// level, where there is no enclosing `(` to actually close).
struct Frame {
    kind: FrameKind,
    groups: Vec<Vec<Value>>,
}

impl Frame {
    fn new(kind: FrameKind) -> Self {
        Frame { kind, groups: vec![Vec::new()] }
    }

    fn push(&mut self, v: Value) {
        self.groups.last_mut().expect("frame always has a group").push(v);
    }

    fn new_group(&mut self) {
        self.groups.push(Vec::new());
    }
}

/// Compiles a token stream (as produced by `lexer::lex`) into the single
/// `Expression` value the evaluator consumes.
pub fn compile(tokens: &[Token]) -> Expr {
    let mut stack = vec![Frame::new(FrameKind::Plain)];
    let mut i = 0;

    if tokens.first().map(String::as_str) == Some("(") {
        i = 1;
    }

    while i < tokens.len() {
        let tok = tokens[i].as_str();
        match tok {
            "(" | ":" => {
                // `:` is a documented alias for `(` in expression position.
                stack.push(Frame::new(FrameKind::Plain));
                i += 1;
            }
            "[" => {
                stack.push(Frame::new(FrameKind::List));
                i += 1;
            }
            "{" => {
                stack.push(Frame::new(FrameKind::Map));
                i += 1;
            }
            ")" | "]" | "}" => {
                if stack.len() > 1 {
                    close_frame(&mut stack);
                }
                // The terminal closer for the synthetic outermost frame:
                // nothing left to pop into, so it's simply the end marker.
                i += 1;
            }
            ";" => {
                stack.last_mut().expect("root frame always present").new_group();
                i += 1;
            }
            "," | "." => {
                // Reserved standalone tokens (indexing/separators); no
                // contract is defined for them yet, so they're dropped
                // like whitespace rather than guessed at — see DESIGN.md.
                i += 1;
            }
            "'" | "\"" | "\\" | "`" => {
                let (value, consumed) = read_literal(tok, &tokens[i + 1..]);
                stack.last_mut().expect("root frame always present").push(value);
                i += 1 + consumed;
            }
            _ => {
                if let Some(v) = classify_token(tok) {
                    stack.last_mut().expect("root frame always present").push(v);
                }
                i += 1;
            }
        }
    }

    while stack.len() > 1 {
        close_frame(&mut stack);
    }

    let root = stack.pop().expect("root frame always present");
    let tree = Expr::from_vec(rewrite_groups(&root));
    debug!(token_count = tokens.len(), element_count = tree.len(), "compiled tokens into an expression tree");
    tree
}

fn close_frame(stack: &mut Vec<Frame>) {
    let frame = stack.pop().expect("close_frame only called when non-empty");
    trace!(kind = ?frame.kind, group_count = frame.groups.len(), "closing bracket frame");
    let value = match frame.kind {
        FrameKind::Plain => Value::Expression(Expr::from_vec(rewrite_groups(&frame))),
        FrameKind::List => Value::List(Rc::new(rewrite_groups(&frame))),
        // Map bodies are already flat `key value =` triples written in
        // postfix order by construction, not infix expressions needing
        // normalization — running the general infix rewrite over them
        // would treat each trailing `=` as needing a right operand and
        // steal the next triple's key as it (see DESIGN.md). `Map::
        // from_triples` only needs the 3-wide grouping, not the rewrite.
        FrameKind::Map => Value::Map(Map::from_triples(&Expr::from_vec(flatten_groups(&frame)))),
    };
    stack.last_mut().expect("close_frame only called when a parent exists").push(value);
}

fn rewrite_groups(frame: &Frame) -> Vec<Value> {
    frame.groups.iter().flat_map(|g| rewrite(g)).collect()
}

fn flatten_groups(frame: &Frame) -> Vec<Value> {
    frame.groups.iter().flat_map(|g| g.iter().cloned()).collect()
}

/// Reads a quoted-literal value (the lexer already emitted it as
/// `[delim, body, delim?]`) and returns `(value, tokens_consumed_after_the_
/// opening_delim)`.
fn read_literal(delim: &str, rest: &[Token]) -> (Value, usize) {
    let body = rest.first().map(String::as_str).unwrap_or("");
    let closed = rest.get(1).map(String::as_str) == Some(delim);
    let consumed = if closed { 2 } else { 1 };

    let value = match delim {
        "'" => Value::Number(parse_number(body)),
        "\"" => Value::string(body),
        "\\" => Value::string(body), // regex: reserved, treated as a String subtype
        "`" => Value::string(body),  // I/O format literal: also a String subtype
        _ => unreachable!("read_literal only called for quote delimiters"),
    };
    (value, consumed)
}

/// Parses a numeric literal body: decimal, `0x`/`0o`/`0b` integer forms,
/// and decimals with a fractional part. Returns `None` when `text` isn't
/// actually a number, leaving the caller to decide what that means —
/// `parse_number` below and `classify_token`'s bare-token check each want
/// a different fallback for "not a number".
fn try_parse_number(text: &str) -> Option<Number> {
    let t = text.trim();
    if t.is_empty() {
        return None;
    }

    let (sign, unsigned) = match t.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, t.strip_prefix('+').unwrap_or(t)),
    };

    let radix_parse = |prefix_lower: &str, prefix_upper: &str, radix: u32| {
        unsigned
            .strip_prefix(prefix_lower)
            .or_else(|| unsigned.strip_prefix(prefix_upper))
            .and_then(|digits| BigInt::parse_bytes(digits.as_bytes(), radix))
    };

    if let Some(n) = radix_parse("0x", "0X", 16) {
        return Some(Number::Integer(n * sign));
    }
    if let Some(n) = radix_parse("0o", "0O", 8) {
        return Some(Number::Integer(n * sign));
    }
    if let Some(n) = radix_parse("0b", "0B", 2) {
        return Some(Number::Integer(n * sign));
    }

    if unsigned.contains('.') || unsigned.contains('e') || unsigned.contains('E') {
        return t.parse::<Decimal>().map(Number::Decimal).ok();
    }

    BigInt::parse_bytes(unsigned.as_bytes(), 10).map(|n| Number::Integer(n * sign))
}

/// Parses the body of a `'…'` numeric literal. A body that isn't actually a
/// number mirrors the original's `to<real_type>` behavior
/// (`string_support_functions.h`): a failed `stream >> n` leaves the
/// destination at its default-constructed `0` rather than signaling
/// failure, so every unparseable numeric literal becomes
/// `Number::Integer(0)` — not `NaN` — and is therefore self-equal to any
/// other unparseable literal (see `Map::has`, DESIGN.md).
pub fn parse_number(text: &str) -> Number {
    try_parse_number(text).unwrap_or_else(|| Number::Integer(BigInt::from(0)))
}

fn looks_numeric(tok: &str) -> bool {
    let t = tok.strip_prefix(['-', '+']).unwrap_or(tok);
    !t.is_empty() && t.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false)
}

/// Bare (unquoted) tokens fold against the keyword table, then the
/// boolean/nothing literal spellings, then are checked for being a plain
/// numeric literal (a necessary supplement — end-to-end example programs
/// use bare numbers like `1`, `4`, `16` without `'…'` quoting — see
/// DESIGN.md), and finally fall back to `Symbol`.
fn classify_token(tok: &str) -> Option<Value> {
    if looks_numeric(tok) {
        if let Some(n) = try_parse_number(tok) {
            return Some(Value::Number(n));
        }
    }
    match resolve_keyword(tok) {
        KeywordHit::Op(op) => Some(Value::OpCall(op)),
        KeywordHit::BooleanLiteral(b) => Some(Value::Boolean(Boolean::from_bool(b))),
        KeywordHit::UndefBoolean => Some(Value::Boolean(Boolean::undef())),
        KeywordHit::Dropped => None,
        KeywordHit::Symbol => Some(Value::symbol(tok)),
    }
}

fn as_symbol_name(v: &Value) -> Option<&str> {
    match v {
        Value::Symbol(s) => Some(s.as_ref()),
        _ => None,
    }
}

fn as_opcode(v: &Value) -> Option<OpCode> {
    match v {
        Value::OpCall(op) => Some(*op),
        _ => None,
    }
}

/// Is `elems[i..]` the start of a `let V <marker> ...` statement, where
/// `<marker>` is `=`/`==`/`<==`? Used to special-case `let` ahead of the
/// generic infix rewrite: `let` schedules the appropriate combination of
/// LET/def/apply on the code stack in one shot, rather than being folded
/// through the plain binary-operator path.
fn let_marker_at(elems: &[Value], i: usize) -> Option<OpCode> {
    if as_opcode(elems.get(i)?) != Some(OpCode::Let) {
        return None;
    }
    as_symbol_name(elems.get(i + 1)?)?;
    match as_opcode(elems.get(i + 2)?) {
        m @ (Some(OpCode::EqInfix) | Some(OpCode::Bind) | Some(OpCode::Apply)) => m,
        _ => None,
    }
}

/// The single rewrite pass over one statement group's flat element list:
/// collapses `lambda`/anonymous-`def` markers into `Lambda` values,
/// desugars `let`, and turns prefix-unary/infix-binary opcodes into their
/// postfix form. A forward single pass with one token of lookahead — see
/// DESIGN.md for why this produces the same `[left, right, op]` ordering
/// the evaluator's stack-machine semantics require.
fn rewrite(elems: &[Value]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    let mut i = 0;

    while i < elems.len() {
        if let Some(marker) = let_marker_at(elems, i) {
            let var = elems[i + 1].clone();
            let rhs = rewrite(&elems[i + 3..]);
            out.push(Value::OpCall(OpCode::Idnt));
            out.push(var.clone());
            match marker {
                OpCode::EqInfix => {
                    out.extend(rhs);
                    out.push(Value::OpCall(OpCode::LetAssign));
                }
                OpCode::Bind => {
                    // The lambda operand must reach `Bind` unresolved too —
                    // same reasoning as the bare `var == rhs` case below.
                    out.push(Value::OpCall(OpCode::Idnt));
                    out.push(var);
                    out.extend(rhs);
                    out.push(Value::OpCall(OpCode::Bind));
                    out.push(Value::OpCall(OpCode::LetAssign));
                }
                OpCode::Apply => {
                    out.extend(rhs);
                    out.push(Value::OpCall(OpCode::ApplyPost));
                    out.push(Value::OpCall(OpCode::LetAssign));
                }
                _ => unreachable!("let_marker_at only returns these three"),
            }
            return out; // `let` consumes the rest of its statement group.
        }

        match &elems[i] {
            Value::OpCall(OpCode::Function) => {
                if let (Some(Value::Expression(args)), Some(Value::Expression(body))) =
                    (elems.get(i + 1), elems.get(i + 2))
                {
                    out.push(Value::Lambda(Rc::new(Lambda::new(args.clone(), body.clone()))));
                    i += 3;
                    continue;
                }
                out.push(elems[i].clone());
                i += 1;
            }
            Value::OpCall(OpCode::Def)
                if matches!(elems.get(i + 1), Some(Value::Expression(_))) =>
            {
                // Anonymous `def`: `def (args) (body)` with no name is
                // equivalent to `lambda (args) (body)` — see DESIGN.md.
                if let (Some(Value::Expression(args)), Some(Value::Expression(body))) =
                    (elems.get(i + 1), elems.get(i + 2))
                {
                    out.push(Value::Lambda(Rc::new(Lambda::new(args.clone(), body.clone()))));
                    i += 3;
                    continue;
                }
                out.push(elems[i].clone());
                i += 1;
            }
            Value::OpCall(op) if op.is_prefix_unary() => {
                if let Some(operand) = elems.get(i + 1).cloned() {
                    match op.postfix_unary() {
                        Some(post) => {
                            out.push(Value::Expression(Expr::from_vec(vec![
                                operand,
                                Value::OpCall(post),
                            ])));
                        }
                        None => out.push(operand), // `pos` is the identity.
                    }
                    i += 2;
                } else {
                    i += 1;
                }
            }
            Value::OpCall(op) if op.is_infix_binary() => {
                if out.is_empty() {
                    // A leading operator with no left operand: treat it as
                    // unary, e.g. `(- 5)` — see DESIGN.md.
                    if let Some(operand) = elems.get(i + 1).cloned() {
                        match op {
                            OpCode::Sub => out.push(Value::Expression(Expr::from_vec(vec![
                                operand,
                                Value::OpCall(OpCode::Neg),
                            ]))),
                            OpCode::Add => out.push(operand),
                            other => out.push(Value::Expression(Expr::from_vec(vec![
                                operand,
                                Value::OpCall(other.postfix_infix()),
                            ]))),
                        }
                        i += 2;
                    } else {
                        i += 1;
                    }
                } else if let Some(right) = elems.get(i + 1).cloned() {
                    out.push(right);
                    out.push(Value::OpCall(op.postfix_infix()));
                    i += 2;
                } else {
                    i += 1;
                }
            }
            Value::Symbol(_)
                if matches!(
                    elems.get(i + 1).and_then(as_opcode),
                    Some(OpCode::Bind) | Some(OpCode::Apply)
                ) =>
            {
                // A bare symbol feeding `==`/`<==` must reach the value
                // stack unresolved, or the main loop's symbol-chases-to-
                // Lambda-auto-apply rule would invoke it before `BIND`/
                // `APPLY` ever see it. `IDNT` protects it the same way it
                // protects `let`'s target variable. See DESIGN.md.
                out.push(Value::OpCall(OpCode::Idnt));
                out.push(elems[i].clone());
                i += 1;
            }
            other => {
                out.push(other.clone());
                i += 1;
            }
        }
    }

    out
}
