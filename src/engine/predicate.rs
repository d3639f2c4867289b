//! Declarative relevance predicates.
//!
//! A predicate is data, not a closure, so the catalog self-check can walk
//! every identifier and value it mentions before any resolution happens.

use std::fmt;

use super::values::Values;

/// Condition over already-resolved option values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Always relevant
    Always,
    /// Choice option equals a value
    Is(&'static str, &'static str),
    /// Choice option differs from a value
    IsNot(&'static str, &'static str),
    /// Choice option is one of several values
    OneOf(&'static str, Vec<&'static str>),
    /// Boolean option is true
    Enabled(&'static str),
    /// Every inner predicate holds
    All(Vec<Predicate>),
}

impl Predicate {
    pub fn is(id: &'static str, value: impl Into<&'static str>) -> Self {
        Self::Is(id, value.into())
    }

    pub fn is_not(id: &'static str, value: impl Into<&'static str>) -> Self {
        Self::IsNot(id, value.into())
    }

    pub fn one_of<V, I>(id: &'static str, values: I) -> Self
    where
        V: Into<&'static str>,
        I: IntoIterator<Item = V>,
    {
        Self::OneOf(id, values.into_iter().map(Into::into).collect())
    }

    pub fn enabled(id: &'static str) -> Self {
        Self::Enabled(id)
    }

    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Self::All(predicates.into_iter().collect())
    }

    /// Evaluate against the values assembled so far
    pub fn evaluate(&self, values: &Values) -> bool {
        match self {
            Self::Always => true,
            Self::Is(id, v) => values.text(id) == *v,
            Self::IsNot(id, v) => values.text(id) != *v,
            Self::OneOf(id, vs) => {
                let current = values.text(id);
                vs.iter().any(|v| *v == current)
            }
            Self::Enabled(id) => values.flag(id),
            Self::All(inner) => inner.iter().all(|p| p.evaluate(values)),
        }
    }

    /// Every `(identifier, compared value)` pair this predicate reads.
    ///
    /// `Enabled` reports no compared value.
    pub fn references(&self) -> Vec<(&'static str, Option<&'static str>)> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<(&'static str, Option<&'static str>)>) {
        match self {
            Self::Always => {}
            Self::Is(id, v) | Self::IsNot(id, v) => refs.push((*id, Some(*v))),
            Self::OneOf(id, vs) => refs.extend(vs.iter().map(|v| (*id, Some(*v)))),
            Self::Enabled(id) => refs.push((*id, None)),
            Self::All(inner) => inner.iter().for_each(|p| p.collect_references(refs)),
        }
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Self::Always)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Is(id, v) => write!(f, "{} = {}", id, v),
            Self::IsNot(id, v) => write!(f, "{} != {}", id, v),
            Self::OneOf(id, vs) => write!(f, "{} in {{{}}}", id, vs.join(", ")),
            Self::Enabled(id) => write!(f, "{}", id),
            Self::All(inner) => {
                let parts: Vec<String> = inner.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" and "))
            }
        }
    }
}
