//! Metric havings: `metric-operator[value1,value2,...]`

use std::fmt;
use indexmap::IndexSet;
use tracing::{debug, trace};
use crate::error::RequestError;
use crate::request::{ApiHaving, HavingExpr, HavingOperator, Havings, LogicalMetric};
use crate::tokens::split_optional;
use super::accumulate::resolve_each;
use super::filters::split_values;
use super::metrics::metric_output_name;

/// Resolves the having parameter against the request's metrics
pub trait HavingResolver: Send + Sync + fmt::Debug {
    fn resolve<'a>(
        &self,
        raw: Option<&str>,
        metrics: &IndexSet<LogicalMetric<'a>>,
    ) -> Result<Havings<'a>, RequestError>;
}

/// Havings may only reference metrics the request selects
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHavingResolver;

/// One having token split into its parts
#[derive(Debug, PartialEq)]
struct HavingClause<'t> {
    metric: &'t str,
    operator: HavingOperator,
    values: Vec<f64>,
}

fn parse_having(token: &str) -> Result<HavingClause<'_>, RequestError> {
    let invalid = || {
        debug!(having = token, "Having does not match the having grammar");
        RequestError::HavingSyntaxInvalid(token.to_string())
    };

    let (head, raw_values) = split_values(token).ok_or_else(invalid)?;
    let (metric, operator) = head.rsplit_once('-').ok_or_else(invalid)?;
    let metric = metric.trim();
    if metric.is_empty() {
        return Err(invalid());
    }
    let operator = HavingOperator::parse(operator.trim()).ok_or_else(invalid)?;
    if !operator.accepts_arity(raw_values.len()) {
        return Err(invalid());
    }

    let values = raw_values
        .iter()
        .map(|v| {
            v.parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(|| {
                debug!(having = token, value = *v, "Having value is not a number");
                RequestError::HavingNonNumeric(token.to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HavingClause { metric, operator, values })
}

impl HavingResolver for DefaultHavingResolver {
    fn resolve<'a>(
        &self,
        raw: Option<&str>,
        metrics: &IndexSet<LogicalMetric<'a>>,
    ) -> Result<Havings<'a>, RequestError> {
        let clauses = split_optional(raw)
            .into_iter()
            .map(parse_having)
            .collect::<Result<Vec<_>, _>>()?;

        let targets = resolve_each(clauses.iter().map(|c| metric_output_name(c.metric)), |name| {
            metrics.iter().find(|m| m.name() == name)
        })
        .into_result(|unknown| {
            debug!(metrics = ?unknown, "Havings on metrics that are not requested");
            RequestError::HavingMetricUndefined(unknown)
        })?;

        let mut havings = Havings::new();
        for (clause, metric) in clauses.into_iter().zip(targets) {
            let having = ApiHaving {
                metric: metric.clone(),
                operator: clause.operator,
                values: clause.values,
            };
            let entry = havings.entry(metric.clone()).or_default();
            if !entry.contains(&having) {
                entry.push(having);
            }
        }

        trace!(havings = havings.values().map(Vec::len).sum::<usize>(), "Generated havings");
        Ok(havings)
    }
}

/// Build the query engine's having from resolved havings
///
/// Every having is ANDed; multi-valued comparisons OR their values.
pub fn build_having(havings: &Havings<'_>) -> Option<HavingExpr> {
    let exprs = havings.values().flatten().map(build_one).collect();
    HavingExpr::all(exprs)
}

fn build_one(having: &ApiHaving<'_>) -> HavingExpr {
    let metric = having.metric.name();
    let equal = |value: f64| HavingExpr::EqualTo { metric: metric.to_string(), value };
    let greater = |value: f64| HavingExpr::GreaterThan { metric: metric.to_string(), value };
    let less = |value: f64| HavingExpr::LessThan { metric: metric.to_string(), value };
    let not = |expr: HavingExpr| HavingExpr::Not(Box::new(expr));
    let each = |make: &dyn Fn(f64) -> HavingExpr| {
        HavingExpr::any(having.values.iter().map(|v| make(*v)).collect())
    };
    let between = || match having.values.as_slice() {
        [lower, upper] => HavingExpr::And(vec![not(less(*lower)), not(greater(*upper))]),
        _ => each(&equal),
    };

    match having.operator {
        HavingOperator::Eq => each(&equal),
        HavingOperator::NotEq => not(each(&equal)),
        HavingOperator::Gt => each(&greater),
        HavingOperator::Lt => each(&less),
        HavingOperator::Gte => each(&|v: f64| not(less(v))),
        HavingOperator::Lte => each(&|v: f64| not(greater(v))),
        HavingOperator::Between => between(),
        HavingOperator::NotBetween => not(between()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Metric;

    #[test]
    fn test_parse_having() {
        assert_eq!(
            parse_having("revenue-gt[100, 2.5]").unwrap(),
            HavingClause {
                metric: "revenue",
                operator: HavingOperator::Gt,
                values: vec![100.0, 2.5],
            }
        );
    }

    #[test]
    fn test_parse_having_on_filtered_metric() {
        let clause = parse_having("revenue(region|id-in[US])-lte[5]").unwrap();
        assert_eq!(clause.metric, "revenue(region|id-in[US])");
        assert_eq!(clause.operator, HavingOperator::Lte);
    }

    #[test]
    fn test_parse_having_errors() {
        for token in ["revenue-gt", "revenue[1]", "-gt[1]", "revenue-like[1]", "revenue-between[1]"] {
            assert_eq!(
                parse_having(token),
                Err(RequestError::HavingSyntaxInvalid(token.to_string())),
                "{token}"
            );
        }
        assert_eq!(
            parse_having("revenue-gt[lots]"),
            Err(RequestError::HavingNonNumeric("revenue-gt[lots]".to_string()))
        );
    }

    #[test]
    fn test_having_must_reference_requested_metric() {
        let revenue = Metric::new("revenue");
        let metrics: IndexSet<_> = [LogicalMetric::new(&revenue)].into_iter().collect();

        let err = DefaultHavingResolver
            .resolve(Some("revenue-gt[1],clicks-gt[2],views-lt[3]"), &metrics)
            .unwrap_err();
        assert_eq!(err, RequestError::HavingMetricUndefined(vec!["clicks".into(), "views".into()]));

        let havings = DefaultHavingResolver
            .resolve(Some("revenue-gt[1],revenue-gt[1],revenue-lt[9]"), &metrics)
            .unwrap();
        assert_eq!(havings[&LogicalMetric::new(&revenue)].len(), 2);
    }

    #[test]
    fn test_build_having() {
        let revenue = Metric::new("revenue");
        let metrics: IndexSet<_> = [LogicalMetric::new(&revenue)].into_iter().collect();
        let havings = DefaultHavingResolver
            .resolve(Some("revenue-between[1,5]"), &metrics)
            .unwrap();

        let less = HavingExpr::LessThan { metric: "revenue".into(), value: 1.0 };
        let greater = HavingExpr::GreaterThan { metric: "revenue".into(), value: 5.0 };
        assert_eq!(
            build_having(&havings),
            Some(HavingExpr::And(vec![
                HavingExpr::Not(Box::new(less)),
                HavingExpr::Not(Box::new(greater)),
            ]))
        );
        assert_eq!(build_having(&Havings::new()), None);
    }
}
