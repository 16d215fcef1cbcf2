//! Query engine predicate trees built from resolved filters and havings

/// How a search filter matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    Prefix,
    Contains,
}

/// Pre-aggregation predicate over dimension fields
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterExpr {
    Selector {
        dimension: String,
        field: String,
        value: String,
    },
    Search {
        dimension: String,
        field: String,
        mode: SearchMode,
        value: String,
    },
    /// Range over field values; bounds are raw strings
    Bound {
        dimension: String,
        field: String,
        lower: Option<String>,
        upper: Option<String>,
        lower_strict: bool,
        upper_strict: bool,
    },
    Null {
        dimension: String,
        field: String,
    },
    And(Vec<FilterExpr>),
    Or(Vec<FilterExpr>),
    Not(Box<FilterExpr>),
}

/// Post-aggregation predicate over metric values
#[derive(Debug, Clone, PartialEq)]
pub enum HavingExpr {
    EqualTo { metric: String, value: f64 },
    GreaterThan { metric: String, value: f64 },
    LessThan { metric: String, value: f64 },
    And(Vec<HavingExpr>),
    Or(Vec<HavingExpr>),
    Not(Box<HavingExpr>),
}

impl FilterExpr {
    /// AND the expressions together, unwrapping a single operand
    pub fn all(mut exprs: Vec<FilterExpr>) -> Option<FilterExpr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(FilterExpr::And(exprs)),
        }
    }

    /// OR the expressions together, unwrapping a single operand
    pub fn any(mut exprs: Vec<FilterExpr>) -> FilterExpr {
        if exprs.len() == 1 {
            if let Some(only) = exprs.pop() {
                return only;
            }
        }
        FilterExpr::Or(exprs)
    }
}

impl HavingExpr {
    pub fn all(mut exprs: Vec<HavingExpr>) -> Option<HavingExpr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(HavingExpr::And(exprs)),
        }
    }

    pub fn any(mut exprs: Vec<HavingExpr>) -> HavingExpr {
        if exprs.len() == 1 {
            if let Some(only) = exprs.pop() {
                return only;
            }
        }
        HavingExpr::Or(exprs)
    }
}
