//! Closed operator vocabulary and its statement symbols.

use std::fmt;

/// Every operator the renderer can emit.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Operator {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `==`
    ExactEqual,
    /// `?=`: any element equals.
    AnyEqual,
    /// `*=`: all elements equal.
    AllEqual,
    /// `~`
    FuzzyMatch,
    /// `!~`
    FuzzyNotMatch,
    /// `?~`: any element fuzzy-matches.
    AnyFuzzyMatch,
    /// `*~`: all elements fuzzy-match.
    AllFuzzyMatch,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
    /// `IN`
    Inside,
    /// `NOT IN`
    NotInside,
    /// `CONTAINS`
    Contains,
    /// `CONTAINSNOT`
    ContainsNot,
    /// `CONTAINSALL`
    ContainsAll,
    /// `CONTAINSANY`
    ContainsAny,
    /// `CONTAINSNONE`
    ContainsNone,
    /// `OUTSIDE`
    Outside,
    /// `INTERSECTS`
    Intersects,
    /// `@@`: full-text match. A predicate ref goes between the two `@`.
    Matches,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `**`
    Raise,
    /// `AND`
    And,
    /// `OR`
    Or,
    /// `!` (prefix)
    Not,
    /// `-` (prefix)
    Negate,
}

impl Operator {
    /// Symbol or keyword emitted for the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::ExactEqual => "==",
            Operator::AnyEqual => "?=",
            Operator::AllEqual => "*=",
            Operator::FuzzyMatch => "~",
            Operator::FuzzyNotMatch => "!~",
            Operator::AnyFuzzyMatch => "?~",
            Operator::AllFuzzyMatch => "*~",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
            Operator::Inside => "IN",
            Operator::NotInside => "NOT IN",
            Operator::Contains => "CONTAINS",
            Operator::ContainsNot => "CONTAINSNOT",
            Operator::ContainsAll => "CONTAINSALL",
            Operator::ContainsAny => "CONTAINSANY",
            Operator::ContainsNone => "CONTAINSNONE",
            Operator::Outside => "OUTSIDE",
            Operator::Intersects => "INTERSECTS",
            Operator::Matches => "@@",
            Operator::Add => "+",
            Operator::Sub | Operator::Negate => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Raise => "**",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "!",
        }
    }

    /// Returns `true` for the operators usable as a binary arithmetic step.
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Operator::Add | Operator::Sub | Operator::Mul | Operator::Div | Operator::Raise
        )
    }

    /// Returns `true` for prefix operators.
    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Not | Operator::Negate)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean combination mode for predicate groups.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Logic {
    /// All members must hold.
    And,
    /// At least one member must hold.
    Or,
}

impl From<Logic> for Operator {
    fn from(logic: Logic) -> Self {
        match logic {
            Logic::And => Operator::And,
            Logic::Or => Operator::Or,
        }
    }
}
