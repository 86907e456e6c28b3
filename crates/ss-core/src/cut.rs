//! Cut expressions.
//!
//! A cut is a conjunction of simple comparisons on named branches, written
//! the way the selection tables key them:
//!
//! ```text
//! (EVT_MVA1 > 0.994) & (EVT_MVA2 > 0.95)
//! ```
//!
//! Parsing is lenient about spacing, parentheses and `&&`; rendering is
//! canonical, so a parsed-then-rendered expression can be used as a lookup
//! key.

use regex::Regex;
use serde::{Deserialize, Serialize};
use ss_common::{Error, Result};
use std::fmt;
use std::sync::OnceLock;

static CONDITION_RE: OnceLock<Regex> = OnceLock::new();

fn condition_re() -> &'static Regex {
    CONDITION_RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*(>=|<=|==|>|<)\s*(\S+)$")
            .expect("condition pattern is valid")
    })
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
}

impl Comparison {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Eq => "==",
        }
    }

    fn from_symbol(s: &str) -> Option<Self> {
        match s {
            ">" => Some(Comparison::Gt),
            ">=" => Some(Comparison::Ge),
            "<" => Some(Comparison::Lt),
            "<=" => Some(Comparison::Le),
            "==" => Some(Comparison::Eq),
            _ => None,
        }
    }

    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Eq => lhs == rhs,
        }
    }
}

/// `branch op value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub branch: String,
    pub op: Comparison,
    pub value: f64,
}

impl Condition {
    pub fn new(branch: impl Into<String>, op: Comparison, value: f64) -> Self {
        Condition {
            branch: branch.into(),
            op,
            value,
        }
    }

    pub fn holds(&self, x: f64) -> bool {
        self.op.holds(x, self.value)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.branch, self.op.symbol(), self.value)
    }
}

/// A conjunction of conditions. The empty cut selects everything.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cut {
    conditions: Vec<Condition>,
}

impl Cut {
    /// The empty cut.
    pub fn none() -> Self {
        Cut::default()
    }

    /// `(branch > value)`.
    pub fn threshold(branch: &str, value: f64) -> Self {
        Cut {
            conditions: vec![Condition::new(branch, Comparison::Gt, value)],
        }
    }

    /// `self & other`, keeping the order of both.
    pub fn and(mut self, other: &Cut) -> Self {
        self.conditions.extend(other.conditions.iter().cloned());
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Parse an expression such as `EVT_MVA1>0.5 && (EVT_MVA2 <= 0.3)`.
    pub fn parse(expr: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidCut {
            expr: expr.to_string(),
            reason,
        };

        if expr.trim().is_empty() {
            return Err(invalid("empty expression".to_string()));
        }

        let mut conditions = Vec::new();
        for part in expr.replace("&&", "&").split('&') {
            let term = part
                .trim()
                .trim_start_matches('(')
                .trim_end_matches(')')
                .trim();
            if term.is_empty() {
                return Err(invalid("empty condition".to_string()));
            }
            let caps = condition_re()
                .captures(term)
                .ok_or_else(|| invalid(format!("cannot parse condition '{}'", term)))?;
            let op = Comparison::from_symbol(&caps[2])
                .ok_or_else(|| invalid(format!("unknown operator '{}'", &caps[2])))?;
            let value: f64 = caps[3]
                .parse()
                .map_err(|_| invalid(format!("'{}' is not a number", &caps[3])))?;
            if !value.is_finite() {
                return Err(invalid(format!("threshold must be finite, got {}", value)));
            }
            conditions.push(Condition::new(&caps[1], op, value));
        }

        Ok(Cut { conditions })
    }

    /// Parse a list of conditions and combine them with `&`.
    pub fn parse_all<S: AsRef<str>>(parts: &[S]) -> Result<Self> {
        let mut cut = Cut::none();
        for part in parts {
            cut = cut.and(&Cut::parse(part.as_ref())?);
        }
        Ok(cut)
    }

    /// Whether an event passes, given a branch-value lookup.
    ///
    /// Returns `Err(branch)` for the first branch the lookup cannot resolve.
    pub fn passes<'a, F>(&'a self, mut value_of: F) -> std::result::Result<bool, &'a str>
    where
        F: FnMut(&str) -> Option<f64>,
    {
        for cond in &self.conditions {
            match value_of(&cond.branch) {
                Some(x) => {
                    if !cond.holds(x) {
                        return Ok(false);
                    }
                }
                None => return Err(&cond.branch),
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cond) in self.conditions.iter().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", cond)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Cut {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Cut::parse(s)
    }
}

/// One cut per threshold: `(branch > t)`, or `(branch > t) & extra`.
///
/// Order and multiplicity of `thresholds` are preserved.
pub fn threshold_family(branch: &str, thresholds: &[f64], extra: Option<&Cut>) -> Vec<Cut> {
    thresholds
        .iter()
        .map(|&t| {
            let cut = Cut::threshold(branch, t);
            match extra {
                Some(other) => cut.and(other),
                None => cut,
            }
        })
        .collect()
}
