// ABOUTME: The tagged, immutable Value union every pipeline stage passes around
//! The tagged, immutable value union every stage of the pipeline passes around.
//!
//! Every variant is cheap to clone: containers hold an `Rc` to their payload,
//! so passing a `Value` through the evaluator's stacks never deep-copies a
//! tree. Mutation is always expressed by constructing a new value.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::Euclid;
use rust_decimal::Decimal;

use crate::opcode::OpCode;

/// A fuzzy boolean: truth is `term >= weight`. Both components live in
/// `[0.0, 1.0]`, or are `NaN` together for the `undef` boolean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boolean {
    pub term: f64,
    pub weight: f64,
}

impl Boolean {
    pub const TRUE: Boolean = Boolean { term: 1.0, weight: 1.0 };
    pub const FALSE: Boolean = Boolean { term: 0.0, weight: 1.0 };

    pub fn new(term: f64, weight: f64) -> Self {
        Boolean { term, weight }
    }

    pub fn from_bool(b: bool) -> Self {
        if b { Boolean::TRUE } else { Boolean::FALSE }
    }

    pub fn undef() -> Self {
        Boolean { term: f64::NAN, weight: f64::NAN }
    }

    pub fn is_undef(&self) -> bool {
        self.term.is_nan() && self.weight.is_nan()
    }

    pub fn is_true(&self) -> bool {
        self.term >= self.weight
    }

    pub fn and(&self, other: &Boolean) -> Boolean {
        Boolean::new(self.term.min(other.term), (self.weight + other.weight) / 2.0)
    }

    pub fn or(&self, other: &Boolean) -> Boolean {
        Boolean::new(self.term.max(other.term), (self.weight + other.weight) / 2.0)
    }

    pub fn xor(&self, other: &Boolean) -> Boolean {
        let t = self.term.max(other.term);
        let w = (self.weight + other.weight) / 2.0;
        let res = Boolean::new(t, w);

        let x = self.term - self.weight;
        let y = other.term - other.weight;

        if (x < 0.0) != (y < 0.0) {
            return res;
        }
        if x + y != 0.0 { res } else { res.neg() }
    }

    pub fn neg(&self) -> Boolean {
        Boolean::new(1.0 - self.term, self.weight)
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undef() {
            write!(f, "undefined")
        } else {
            write!(f, "{}", self.is_true())
        }
    }
}

/// The arithmetic contract described in, scaled down to what the core
/// actually exercises: arbitrary-precision integers and scaled decimals.
/// Rationals and the complex-number path are intentionally not built out
/// further than `NaN` plumbing — see `DESIGN.md`.
#[derive(Debug, Clone)]
pub enum Number {
    Integer(BigInt),
    Decimal(Decimal),
    NaN,
}

impl Number {
    pub fn from_i64(n: i64) -> Self {
        Number::Integer(BigInt::from(n))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Number::NaN)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    pub fn is_odd(&self) -> bool {
        match self {
            Number::Integer(n) => (n % 2) != BigInt::from(0),
            Number::Decimal(d) => {
                d.is_integer()
                    && d.trunc().to_string().chars().last().map(|c| "13579".contains(c)).unwrap_or(false)
            }
            Number::NaN => false,
        }
    }

    pub fn is_positive(&self) -> bool {
        match self {
            Number::Integer(n) => *n > BigInt::from(0),
            Number::Decimal(d) => d.is_sign_positive() && !d.is_zero(),
            Number::NaN => false,
        }
    }

    pub fn is_negative(&self) -> bool {
        match self {
            Number::Integer(n) => *n < BigInt::from(0),
            Number::Decimal(d) => d.is_sign_negative() && !d.is_zero(),
            Number::NaN => false,
        }
    }

    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Number::Integer(n) => n.to_string().parse::<Decimal>().ok(),
            Number::Decimal(d) => Some(*d),
            Number::NaN => None,
        }
    }

    fn binary(
        a: &Number,
        b: &Number,
        int_op: impl Fn(&BigInt, &BigInt) -> Option<BigInt>,
        dec_op: impl Fn(Decimal, Decimal) -> Option<Decimal>,
    ) -> Number {
        if a.is_nan() || b.is_nan() {
            return Number::NaN;
        }
        if let (Number::Integer(x), Number::Integer(y)) = (a, b) {
            if let Some(r) = int_op(x, y) {
                return Number::Integer(r);
            }
        }
        match (a.to_decimal(), b.to_decimal()) {
            (Some(x), Some(y)) => dec_op(x, y).map(Number::Decimal).unwrap_or(Number::NaN),
            _ => Number::NaN,
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        Self::binary(self, other, |x, y| Some(x + y), |x, y| Some(x + y))
    }

    pub fn sub(&self, other: &Number) -> Number {
        Self::binary(self, other, |x, y| Some(x - y), |x, y| Some(x - y))
    }

    pub fn mul(&self, other: &Number) -> Number {
        Self::binary(self, other, |x, y| Some(x * y), |x, y| Some(x * y))
    }

    pub fn div(&self, other: &Number) -> Number {
        Self::binary(self, other, |_, _| None, |x, y| if y.is_zero() { None } else { Some(x / y) })
    }

    pub fn fdiv(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Integer(x), Number::Integer(y)) if *y != BigInt::from(0) => Number::Integer(x.div_euclid(y)),
            _ => Self::binary(self, other, |_, _| None, |x, y| if y.is_zero() { None } else { Some((x / y).floor()) }),
        }
    }

    pub fn modulo(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Integer(x), Number::Integer(y)) if *y != BigInt::from(0) => Number::Integer(x.rem_euclid(y)),
            _ => Self::binary(self, other, |_, _| None, |x, y| if y.is_zero() { None } else { Some(x % y) }),
        }
    }

    pub fn rem(&self, other: &Number) -> Number {
        Self::binary(
            self,
            other,
            |x, y| if *y != BigInt::from(0) { Some(x % y) } else { None },
            |x, y| if y.is_zero() { None } else { Some(x % y) },
        )
    }

    pub fn pow(&self, other: &Number) -> Number {
        if let (Number::Integer(x), Number::Integer(y)) = (self, other) {
            if let Ok(exp) = u32::try_from(y.clone()) {
                return Number::Integer(x.pow(exp));
            }
        }
        match (self.to_decimal(), other.to_decimal()) {
            (Some(x), Some(y)) => {
                let exp = y.to_string().parse::<i64>().ok().and_then(|e| u64::try_from(e).ok());
                match exp {
                    Some(exp) => x.checked_powu(exp).map(Number::Decimal).unwrap_or(Number::NaN),
                    None => Number::NaN,
                }
            }
            _ => Number::NaN,
        }
    }

    /// Rounds a `Decimal` result to `scale` fractional digits using
    /// `strategy` (§6's configurable decimal scale/rounding contract).
    /// `Integer`/`NaN` are exact already and pass through unchanged.
    pub fn rounded(&self, scale: u32, strategy: rust_decimal::RoundingStrategy) -> Number {
        match self {
            Number::Decimal(d) => Number::Decimal(d.round_dp_with_strategy(scale, strategy)),
            other => other.clone(),
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Integer(n) => Number::Integer(-n.clone()),
            Number::Decimal(d) => Number::Decimal(-*d),
            Number::NaN => Number::NaN,
        }
    }

    pub fn compare(&self, other: &Number) -> Option<Ordering> {
        if self.is_nan() || other.is_nan() {
            return None;
        }
        if let (Number::Integer(x), Number::Integer(y)) = (self, other) {
            return Some(x.cmp(y));
        }
        match (self.to_decimal(), other.to_decimal()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Decimal(d) => write!(f, "{d}"),
            Number::NaN => write!(f, "nan"),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        matches!(self.compare(other), Some(Ordering::Equal))
    }
}

/// A singly-linked, persistent cons list: the "linked-list-like" structure
/// that underlies `Expression`. Head operations are O(1); nothing
/// else is needed for the contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Nil,
    Cons(Value, Rc<ExprNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr(pub Rc<ExprNode>);

impl Expr {
    pub fn nil() -> Self {
        Expr(Rc::new(ExprNode::Nil))
    }

    pub fn is_empty(&self) -> bool {
        matches!(&*self.0, ExprNode::Nil)
    }

    pub fn place_lead(&self, v: Value) -> Expr {
        Expr(Rc::new(ExprNode::Cons(v, self.0.clone())))
    }

    /// Pops the lead element, returning `(element, rest)`. Popping an empty
    /// expression yields `Nothing` and leaves the expression empty.
    pub fn pop_lead(&self) -> (Value, Expr) {
        match &*self.0 {
            ExprNode::Nil => (Value::Nothing, Expr::nil()),
            ExprNode::Cons(v, rest) => (v.clone(), Expr(rest.clone())),
        }
    }

    pub fn lead(&self) -> Value {
        match &*self.0 {
            ExprNode::Nil => Value::Nothing,
            ExprNode::Cons(v, _) => v.clone(),
        }
    }

    pub fn drop_lead(&self) -> Expr {
        self.pop_lead().1
    }

    pub fn last(&self) -> Value {
        self.iter().last().unwrap_or(Value::Nothing)
    }

    pub fn place_last(&self, v: Value) -> Expr {
        let items: Vec<Value> = self.iter().collect();
        let mut out = Expr::nil().place_lead(v);
        for item in items.into_iter().rev() {
            out = out.place_lead(item);
        }
        out
    }

    pub fn drop_last(&self) -> Expr {
        let mut items: Vec<Value> = self.iter().collect();
        items.pop();
        Expr::from_vec(items)
    }

    pub fn reverse(&self) -> Expr {
        let mut out = Expr::nil();
        for item in self.iter() {
            out = out.place_lead(item);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn iter(&self) -> ExprIter {
        ExprIter(self.0.clone())
    }

    pub fn from_vec(items: Vec<Value>) -> Expr {
        let mut out = Expr::nil();
        for item in items.into_iter().rev() {
            out = out.place_lead(item);
        }
        out
    }
}

pub struct ExprIter(Rc<ExprNode>);

impl Iterator for ExprIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match &*self.0 {
            ExprNode::Nil => None,
            ExprNode::Cons(v, rest) => {
                let v = v.clone();
                self.0 = rest.clone();
                Some(v)
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, ")")
    }
}

/// A lambda closure: argument expression, body expression, and the scope
/// captured at definition time. Carries its own self-reference under the
/// `"self"` key so recursive calls resolve without an external fixpoint
/// combinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub args: Expr,
    pub body: Expr,
    pub scope: Rc<HashMap<String, Value>>,
}

impl Lambda {
    pub fn new(args: Expr, body: Expr) -> Self {
        Lambda { args, body, scope: Rc::new(HashMap::new()) }
    }

    /// Binds the enclosing scope to this lambda, excluding whatever name
    /// that scope records under `"self"` — otherwise the lambda would
    /// capture a reference to itself and never drop.
    pub fn bind_scope(&self, scope: &HashMap<String, Value>) -> Lambda {
        let skip = match scope.get("self") {
            Some(Value::Symbol(s)) => s.to_string(),
            _ => String::new(),
        };
        let mut next = (*self.scope).clone();
        for (k, v) in scope {
            if *k != skip {
                next.insert(k.clone(), v.clone());
            }
        }
        Lambda { args: self.args.clone(), body: self.body.clone(), scope: Rc::new(next) }
    }

    pub fn bind_variable(&self, name: &str, val: Value) -> Lambda {
        let mut next = (*self.scope).clone();
        next.insert(name.to_string(), val);
        Lambda { args: self.args.clone(), body: self.body.clone(), scope: Rc::new(next) }
    }
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lambda{}:", self.args)?;
        for v in self.body.iter() {
            write!(f, " {v}")?;
        }
        write!(f, ";")
    }
}

/// `has`/`get`/`set`/`del` over a key ordered by `Value`'s own three-valued
/// comparison. Kept sorted rather than hashed so that printing and
/// round-tripping are deterministic, matching the original's balanced-tree
/// contract without replicating its tree shape (see `DESIGN.md`).
#[derive(Debug, Clone, PartialEq)]
pub struct Map(pub Rc<Vec<(Value, Value)>>);

impl Default for Map {
    fn default() -> Self {
        Map::new()
    }
}

impl Map {
    pub fn new() -> Self {
        Map(Rc::new(Vec::new()))
    }

    /// Builds a map from a flat expression of `key value =` triples, as
    /// produced by the compiler's `{ ... }` reification.
    pub fn from_triples(body: &Expr) -> Map {
        let mut pairs = Vec::new();
        let mut rest = body.clone();
        while !rest.is_empty() {
            let (key, r1) = rest.pop_lead();
            let (val, r2) = r1.pop_lead();
            let (_eq, r3) = r2.pop_lead();
            pairs.push((key, val));
            rest = r3;
        }
        pairs.sort_by(|a, b| a.0.compare(&b.0).unwrap_or(Ordering::Equal));
        Map(Rc::new(pairs))
    }

    pub fn has(&self, key: &Value) -> bool {
        self.0.iter().any(|(k, _)| k.compare(key) == Some(Ordering::Equal))
    }

    pub fn get(&self, key: &Value) -> Value {
        self.0
            .iter()
            .find(|(k, _)| k.compare(key) == Some(Ordering::Equal))
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Nothing)
    }

    pub fn set(&self, key: Value, val: Value) -> Map {
        let mut pairs = (*self.0).clone();
        if let Some(slot) = pairs.iter_mut().find(|(k, _)| k.compare(&key) == Some(Ordering::Equal)) {
            slot.1 = val;
        } else {
            pairs.push((key, val));
            pairs.sort_by(|a, b| a.0.compare(&b.0).unwrap_or(Ordering::Equal));
        }
        Map(Rc::new(pairs))
    }

    pub fn del(&self, key: &Value) -> Map {
        let pairs: Vec<_> = self.0.iter().filter(|(k, _)| k.compare(key) != Some(Ordering::Equal)).cloned().collect();
        Map(Rc::new(pairs))
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k} = {v}")?;
        }
        write!(f, "}}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nothing,
    Boolean(Boolean),
    Number(Number),
    String(Rc<str>),
    Symbol(Rc<str>),
    OpCall(OpCode),
    Error(Rc<str>),
    Expression(Expr),
    List(Rc<Vec<Value>>),
    Lambda(Rc<Lambda>),
    Map(Map),
}

impl Value {
    pub fn error(msg: impl Into<String>) -> Value {
        Value::Error(Rc::from(msg.into()))
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(Rc::from(name.into()))
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::String(Rc::from(s.into()))
    }

    pub fn boolean(b: bool) -> Value {
        Value::Boolean(Boolean::from_bool(b))
    }

    pub fn from_i64(n: i64) -> Value {
        Value::Number(Number::from_i64(n))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::OpCall(_) => "op_call",
            Value::Error(_) => "error",
            Value::Expression(_) => "expression",
            Value::List(_) => "list",
            Value::Lambda(_) => "lambda",
            Value::Map(_) => "map",
        }
    }

    /// `is()`: everything is truthy except `Nothing`, a `false`-valued
    /// `Boolean`, an empty `Expression`/`List`/`Map`/`String`, and `Error`.
    pub fn is(&self) -> bool {
        match self {
            Value::Nothing => false,
            Value::Boolean(b) => b.is_true(),
            Value::Error(_) => false,
            Value::String(s) => !s.is_empty(),
            Value::Expression(e) => !e.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.0.is_empty(),
            Value::Lambda(l) => !l.args.is_empty() || !l.body.is_empty(),
            _ => true,
        }
    }

    /// Tri-valued structural comparison: `Some(Less/Equal/Greater)`, or
    /// `None` when the two values aren't comparable (different variants,
    /// NaN, etc).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Nothing, Nothing) => Some(Ordering::Equal),
            (Boolean(a), Boolean(b)) => a.is_true().partial_cmp(&b.is_true()),
            (Number(a), Number(b)) => a.compare(b),
            (String(a), String(b)) => Some(a.cmp(b)),
            (Symbol(a), Symbol(b)) => Some(a.cmp(b)),
            (Error(a), Error(b)) => Some(a.cmp(b)),
            (Expression(a), Expression(b)) => compare_seq(a.iter(), b.iter()),
            (List(a), List(b)) => compare_seq(a.iter().cloned(), b.iter().cloned()),
            (Lambda(a), Lambda(b)) => {
                if a.args == b.args && a.body == b.body {
                    Some(Ordering::Equal)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// `lead`/`last` over any sequence-ish variant; `Nothing` otherwise.
    pub fn lead(&self) -> Value {
        match self {
            Value::Expression(e) => e.lead(),
            Value::List(l) => l.first().cloned().unwrap_or(Value::Nothing),
            Value::String(s) => s.chars().next().map(|c| Value::string(c.to_string())).unwrap_or(Value::Nothing),
            _ => Value::Nothing,
        }
    }

    pub fn last(&self) -> Value {
        match self {
            Value::Expression(e) => e.last(),
            Value::List(l) => l.last().cloned().unwrap_or(Value::Nothing),
            Value::String(s) => s.chars().last().map(|c| Value::string(c.to_string())).unwrap_or(Value::Nothing),
            _ => Value::Nothing,
        }
    }

    pub fn place_lead(&self, v: Value) -> Value {
        match self {
            Value::Expression(e) => Value::Expression(e.place_lead(v)),
            Value::List(l) => {
                let mut items = (**l).clone();
                items.insert(0, v);
                Value::List(Rc::new(items))
            }
            _ => self.clone(),
        }
    }

    pub fn place_last(&self, v: Value) -> Value {
        match self {
            Value::Expression(e) => Value::Expression(e.place_last(v)),
            Value::List(l) => {
                let mut items = (**l).clone();
                items.push(v);
                Value::List(Rc::new(items))
            }
            _ => self.clone(),
        }
    }

    pub fn drop_lead(&self) -> Value {
        match self {
            Value::Expression(e) => Value::Expression(e.drop_lead()),
            Value::List(l) => {
                let mut items = (**l).clone();
                if !items.is_empty() {
                    items.remove(0);
                }
                Value::List(Rc::new(items))
            }
            _ => self.clone(),
        }
    }

    pub fn drop_last(&self) -> Value {
        match self {
            Value::Expression(e) => Value::Expression(e.drop_last()),
            Value::List(l) => {
                let mut items = (**l).clone();
                items.pop();
                Value::List(Rc::new(items))
            }
            _ => self.clone(),
        }
    }

    /// `CLEAR`'s fallback path: clears any sequence-ish value's own
    /// contents, leaving its variant intact. See SPEC_FULL.md.
    pub fn clear(&self) -> Value {
        match self {
            Value::Expression(_) => Value::Expression(Expr::nil()),
            Value::List(_) => Value::List(Rc::new(Vec::new())),
            Value::Map(_) => Value::Map(Map::new()),
            Value::String(_) => Value::string(""),
            other => other.clone(),
        }
    }

    pub fn has(&self, key: &Value) -> bool {
        match self {
            Value::Map(m) => m.has(key),
            Value::Expression(e) => e.iter().any(|v| v.compare(key) == Some(Ordering::Equal)),
            Value::List(l) => l.iter().any(|v| v.compare(key) == Some(Ordering::Equal)),
            _ => false,
        }
    }

    pub fn get(&self, key: &Value) -> Value {
        match self {
            Value::Map(m) => m.get(key),
            Value::List(l) => match key {
                Value::Number(Number::Integer(i)) => {
                    let idx: Option<usize> = i.to_string().parse().ok();
                    idx.and_then(|i| l.get(i).cloned()).unwrap_or(Value::Nothing)
                }
                _ => Value::Nothing,
            },
            _ => Value::Nothing,
        }
    }

    pub fn set(&self, key: Value, val: Value) -> Value {
        match self {
            Value::Map(m) => Value::Map(m.set(key, val)),
            Value::List(l) => {
                if let Value::Number(Number::Integer(i)) = &key {
                    if let Ok(idx) = i.to_string().parse::<usize>() {
                        let mut items = (**l).clone();
                        if idx < items.len() {
                            items[idx] = val;
                        }
                        return Value::List(Rc::new(items));
                    }
                }
                self.clone()
            }
            _ => self.clone(),
        }
    }

    pub fn del(&self, key: &Value) -> Value {
        match self {
            Value::Map(m) => Value::Map(m.del(key)),
            Value::List(l) => {
                if let Value::Number(Number::Integer(i)) = key {
                    if let Ok(idx) = i.to_string().parse::<usize>() {
                        let mut items = (**l).clone();
                        if idx < items.len() {
                            items.remove(idx);
                        }
                        return Value::List(Rc::new(items));
                    }
                }
                self.clone()
            }
            _ => self.clone(),
        }
    }
}

fn compare_seq(a: impl Iterator<Item = Value>, b: impl Iterator<Item = Value>) -> Option<Ordering> {
    let av: Vec<_> = a.collect();
    let bv: Vec<_> = b.collect();
    if av.len() != bv.len() {
        return None;
    }
    for (x, y) in av.iter().zip(bv.iter()) {
        if x.compare(y) != Some(Ordering::Equal) {
            return None;
        }
    }
    Some(Ordering::Equal)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => write!(f, "nothing"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "\"{s}\""),
            Value::Symbol(s) => write!(f, "{s}"),
            Value::OpCall(op) => write!(f, "{op:?}"),
            Value::Error(e) => write!(f, "error({e})"),
            Value::Expression(e) => write!(f, "{e}"),
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Lambda(l) => write!(f, "{l}"),
            Value::Map(m) => write!(f, "{m}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_truth_threshold() {
        let b = Boolean::new(0.7, 0.5);
        assert!(b.is_true());
        let b = Boolean::new(0.3, 0.5);
        assert!(!b.is_true());
    }

    #[test]
    fn boolean_undef_is_not_true() {
        let u = Boolean::undef();
        assert!(u.is_undef());
        assert!(!u.is_true());
    }

    #[test]
    fn expression_place_and_pop_lead_round_trips() {
        let e = Expr::nil().place_lead(Value::from_i64(2)).place_lead(Value::from_i64(1));
        let (h, rest) = e.pop_lead();
        assert_eq!(h, Value::from_i64(1));
        assert_eq!(rest.lead(), Value::from_i64(2));
    }

    #[test]
    fn map_set_get_del() {
        let m = Map::new();
        let m = m.set(Value::string("a"), Value::from_i64(1));
        assert!(m.has(&Value::string("a")));
        assert_eq!(m.get(&Value::string("a")), Value::from_i64(1));
        let m = m.del(&Value::string("a"));
        assert!(!m.has(&Value::string("a")));
    }

    #[test]
    fn number_add_prefers_integer_path() {
        let a = Number::from_i64(2);
        let b = Number::from_i64(3);
        assert_eq!(a.add(&b), Number::from_i64(5));
    }

    #[test]
    fn expression_display_matches_parenthesized_form() {
        let e = Expr::from_vec(vec![Value::from_i64(1), Value::from_i64(2)]);
        assert_eq!(format!("{e}"), "(1 2)");
    }
}
