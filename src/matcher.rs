use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use crate::{anyhow_loc, function_name};

// ----------------------------------------------------------------------------
// Declarations
// ----------------------------------------------------------------------------

/// Category a type-check matcher can name. `Int` covers JSON numbers with an
/// integer representation, `Float` the rest.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Array,
    Object,
}

/// Shared store of named-variable bindings for matchers derived from it.
///
/// Own one per test and pass it explicitly; two `var` matchers over the same
/// name must agree on the first value either of them ever saw. Bindings are
/// first-write-wins and immutable for the life of the environment.
#[derive(Debug, Default)]
pub struct MatchEnv {
    vars: Mutex<HashMap<String, Value>>,
}

/// Predicate usable inside equality assertions to express "any value of this
/// shape is acceptable".
///
/// Evaluation is side-effect free except for `Var`: the first comparison of a
/// variable fixes its expected value in the shared [`MatchEnv`], and every
/// later comparison (by any matcher over that name) is an equality check
/// against the fixed value. Mismatch and binding conflict both surface as a
/// plain `false`.
#[derive(Clone)]
pub enum Matcher<'e> {
    /// Matches every value.
    Any,
    /// Matches values of one [`ValueKind`]; never compares contents.
    Kind(ValueKind),
    /// Full-string regex match against the value's string form.
    Pattern(Regex),
    /// Named variable bound through `env` on first comparison.
    Var { name: String, env: &'e MatchEnv },
}

// ----------------------------------------------------------------------------
// Implementations
// ----------------------------------------------------------------------------

impl ValueKind {
    pub fn of(value: &Value) -> ValueKind {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    ValueKind::Int
                } else {
                    ValueKind::Float
                }
            }
            Value::String(_) => ValueKind::Str,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl MatchEnv {
    pub fn new() -> Self {
        Default::default()
    }

    /// Derive a matcher for the named variable, backed by this environment.
    ///
    /// This is the only way variable bindings enter the map, so a `Var`
    /// matcher always has an environment to bind through.
    pub fn var(&self, name: impl Into<String>) -> Matcher<'_> {
        Matcher::Var {
            name: name.into(),
            env: self,
        }
    }

    /// Current binding for `name`, if any comparison has fixed one.
    pub fn bound(&self, name: &str) -> Option<Value> {
        self.vars.lock().expect("match env mutex poisoned").get(name).cloned()
    }

    /// First use binds and succeeds; later uses must equal the bound value.
    fn check_binding(&self, name: &str, other: &Value) -> bool {
        let mut vars = self.vars.lock().expect("match env mutex poisoned");
        match vars.get(name) {
            Some(bound) => bound == other,
            None => {
                vars.insert(name.to_owned(), other.clone());
                true
            }
        }
    }
}

impl<'e> Matcher<'e> {
    pub fn any() -> Matcher<'static> {
        Matcher::Any
    }

    pub fn kind(kind: ValueKind) -> Matcher<'static> {
        Matcher::Kind(kind)
    }

    /// Build a full-string pattern matcher. The pattern is anchored at both
    /// ends, so `a.c` matches `"abc"` but not `"abcd"`.
    pub fn pattern(pattern: &str) -> Result<Matcher<'static>> {
        let re = Regex::new(&format!("^(?:{})$", pattern))
            .map_err(|e| anyhow_loc!("invalid match pattern '{}': {}", pattern, e))?;
        Ok(Matcher::Pattern(re))
    }

    pub fn matches(&self, other: &Value) -> bool {
        match self {
            Matcher::Var { name, env } => env.check_binding(name, other),
            Matcher::Kind(kind) => ValueKind::of(other) == *kind,
            Matcher::Pattern(re) => re.is_match(&string_form(other)),
            Matcher::Any => true,
        }
    }
}

/// String form a pattern matcher sees: raw contents for strings, compact JSON
/// text for everything else.
fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

impl fmt::Debug for Matcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Any => write!(f, "Matcher(any)"),
            Matcher::Kind(kind) => write!(f, "Matcher(kind={:?})", kind),
            Matcher::Pattern(re) => write!(f, "Matcher(pattern={})", re.as_str()),
            Matcher::Var { name, .. } => write!(f, "Matcher(var={})", name),
        }
    }
}

// Comparing a Var matcher binds on first use; see the type-level docs.
impl PartialEq<Value> for Matcher<'_> {
    fn eq(&self, other: &Value) -> bool {
        self.matches(other)
    }
}

impl PartialEq<Matcher<'_>> for Value {
    fn eq(&self, other: &Matcher<'_>) -> bool {
        other.matches(self)
    }
}
