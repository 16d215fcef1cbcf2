//! Translation of resolved filters into query engine filters

use std::fmt;
use crate::request::{ApiFilter, ApiFilters, FilterExpr, FilterOperator, SearchMode};

/// Builds the query engine's filter from resolved request filters
pub trait FilterBuilder: Send + Sync + fmt::Debug {
    /// `None` when there is nothing to filter on
    fn build_filters(&self, filters: &ApiFilters<'_>) -> Option<FilterExpr>;
}

/// ANDs every filter; multi-valued filters OR their values
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFilterBuilder;

impl FilterBuilder for DefaultFilterBuilder {
    fn build_filters(&self, filters: &ApiFilters<'_>) -> Option<FilterExpr> {
        let exprs = filters.values().flatten().map(build_filter).collect();
        FilterExpr::all(exprs)
    }
}

fn build_filter(filter: &ApiFilter<'_>) -> FilterExpr {
    let dimension = &filter.dimension.name;
    let field = &filter.field.name;
    let each = |make: &dyn Fn(&str) -> FilterExpr| {
        FilterExpr::any(filter.values.iter().map(|v| make(v.as_str())).collect())
    };
    let selector = |value: &str| FilterExpr::Selector {
        dimension: dimension.clone(),
        field: field.clone(),
        value: value.to_string(),
    };
    let search = |mode: SearchMode| {
        move |value: &str| FilterExpr::Search {
            dimension: dimension.clone(),
            field: field.clone(),
            mode,
            value: value.to_string(),
        }
    };
    let bound = |lower: Option<&str>, upper: Option<&str>, strict: bool| FilterExpr::Bound {
        dimension: dimension.clone(),
        field: field.clone(),
        lower: lower.map(str::to_string),
        upper: upper.map(str::to_string),
        lower_strict: strict && lower.is_some(),
        upper_strict: strict && upper.is_some(),
    };
    let null = || FilterExpr::Null {
        dimension: dimension.clone(),
        field: field.clone(),
    };

    match filter.operator {
        FilterOperator::Eq | FilterOperator::In => each(&selector),
        FilterOperator::NotIn => FilterExpr::Not(Box::new(each(&selector))),
        FilterOperator::StartsWith => each(&search(SearchMode::Prefix)),
        FilterOperator::Contains => each(&search(SearchMode::Contains)),
        FilterOperator::Gt => each(&|v: &str| bound(Some(v), None, true)),
        FilterOperator::Gte => each(&|v: &str| bound(Some(v), None, false)),
        FilterOperator::Lt => each(&|v: &str| bound(None, Some(v), true)),
        FilterOperator::Lte => each(&|v: &str| bound(None, Some(v), false)),
        FilterOperator::Between => match filter.values.as_slice() {
            [lower, upper] => bound(Some(lower.as_str()), Some(upper.as_str()), false),
            _ => each(&selector),
        },
        FilterOperator::IsNull => null(),
        FilterOperator::NotNull => FilterExpr::Not(Box::new(null())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Dimension, DimensionField, DimensionFields};

    fn region() -> Dimension {
        Dimension {
            name: "region".into(),
            description: None,
            fields: DimensionFields::List(vec![DimensionField::new("id")]),
            default_fields: None,
            aggregatable: true,
        }
    }

    fn filter<'a>(dim: &'a Dimension, operator: FilterOperator, values: &[&str]) -> ApiFilter<'a> {
        ApiFilter {
            dimension: dim,
            field: &dim.fields()[0],
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    fn selector(value: &str) -> FilterExpr {
        FilterExpr::Selector {
            dimension: "region".into(),
            field: "id".into(),
            value: value.into(),
        }
    }

    #[test]
    fn test_in_becomes_or_of_selectors() {
        let dim = region();
        assert_eq!(
            build_filter(&filter(&dim, FilterOperator::In, &["US", "CA"])),
            FilterExpr::Or(vec![selector("US"), selector("CA")])
        );
        assert_eq!(build_filter(&filter(&dim, FilterOperator::Eq, &["US"])), selector("US"));
    }

    #[test]
    fn test_notin_is_negated() {
        let dim = region();
        assert_eq!(
            build_filter(&filter(&dim, FilterOperator::NotIn, &["US"])),
            FilterExpr::Not(Box::new(selector("US")))
        );
    }

    #[test]
    fn test_between_is_inclusive_bound() {
        let dim = region();
        assert_eq!(
            build_filter(&filter(&dim, FilterOperator::Between, &["1", "5"])),
            FilterExpr::Bound {
                dimension: "region".into(),
                field: "id".into(),
                lower: Some("1".into()),
                upper: Some("5".into()),
                lower_strict: false,
                upper_strict: false,
            }
        );
    }

    #[test]
    fn test_filters_are_anded() {
        let dim = region();
        let mut filters = ApiFilters::new();
        let set = filters.entry(&dim).or_default();
        set.insert(filter(&dim, FilterOperator::Eq, &["US"]));
        set.insert(filter(&dim, FilterOperator::NotNull, &[]));

        let built = DefaultFilterBuilder.build_filters(&filters).unwrap();
        assert!(matches!(built, FilterExpr::And(ref parts) if parts.len() == 2));
        assert_eq!(DefaultFilterBuilder.build_filters(&ApiFilters::new()), None);
    }
}
