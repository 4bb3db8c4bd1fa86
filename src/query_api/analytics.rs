use std::fmt;

use serde::{Deserialize, Serialize};

/// An analytics dimension such as `dx`, `pe` or `ou` with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    dimension: String,
    items: Vec<String>,
}

impl Dimension {
    pub fn new<I, S>(dimension: &str, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            dimension: dimension.to_string(),
            items: items.into_iter().map(|i| i.to_string()).collect(),
        }
    }

    /// The parameter value, `dimension:item1;item2`.
    pub fn dimension_value(&self) -> String {
        if self.items.is_empty() {
            self.dimension.clone()
        } else {
            format!("{}:{}", self.dimension, self.items.join(";"))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationType {
    Sum,
    Average,
    AverageSumOrgUnit,
    Last,
    LastAverageOrgUnit,
    Count,
    Stddev,
    Variance,
    Min,
    Max,
    None,
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AggregationType::Sum => "SUM",
            AggregationType::Average => "AVERAGE",
            AggregationType::AverageSumOrgUnit => "AVERAGE_SUM_ORG_UNIT",
            AggregationType::Last => "LAST",
            AggregationType::LastAverageOrgUnit => "LAST_AVERAGE_ORG_UNIT",
            AggregationType::Count => "COUNT",
            AggregationType::Stddev => "STDDEV",
            AggregationType::Variance => "VARIANCE",
            AggregationType::Min => "MIN",
            AggregationType::Max => "MAX",
            AggregationType::None => "NONE",
        };
        write!(f, "{name}")
    }
}

/// Identifier scheme for input or output of object references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdScheme {
    Uid,
    Code,
    Name,
    Id,
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            IdScheme::Uid => "UID",
            IdScheme::Code => "CODE",
            IdScheme::Name => "NAME",
            IdScheme::Id => "ID",
        };
        write!(f, "{name}")
    }
}

/// Query against the analytics engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsQuery {
    dimensions: Vec<Dimension>,
    filters: Vec<Dimension>,
    aggregation_type: Option<AggregationType>,
    start_date: Option<String>,
    end_date: Option<String>,
    skip_meta: Option<bool>,
    skip_data: Option<bool>,
    skip_rounding: Option<bool>,
    ignore_limit: Option<bool>,
    output_id_scheme: Option<IdScheme>,
    input_id_scheme: Option<IdScheme>,
}

/// Pushes `key=value` when the field is set.
macro_rules! push_if_some {
    ($params:expr, $key:literal, $value:expr) => {
        if let Some(value) = &$value {
            $params.push(($key.to_string(), value.to_string()));
        }
    };
}

impl AnalyticsQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn filter(mut self, filter: Dimension) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn aggregation_type(mut self, aggregation_type: AggregationType) -> Self {
        self.aggregation_type = Some(aggregation_type);
        self
    }

    pub fn start_date(mut self, date: &str) -> Self {
        self.start_date = Some(date.to_string());
        self
    }

    pub fn end_date(mut self, date: &str) -> Self {
        self.end_date = Some(date.to_string());
        self
    }

    pub fn skip_meta(mut self, skip: bool) -> Self {
        self.skip_meta = Some(skip);
        self
    }

    pub fn skip_data(mut self, skip: bool) -> Self {
        self.skip_data = Some(skip);
        self
    }

    pub fn skip_rounding(mut self, skip: bool) -> Self {
        self.skip_rounding = Some(skip);
        self
    }

    pub fn ignore_limit(mut self, ignore: bool) -> Self {
        self.ignore_limit = Some(ignore);
        self
    }

    pub fn output_id_scheme(mut self, scheme: IdScheme) -> Self {
        self.output_id_scheme = Some(scheme);
        self
    }

    pub fn input_id_scheme(mut self, scheme: IdScheme) -> Self {
        self.input_id_scheme = Some(scheme);
        self
    }

    /// Renders dimensions, then filters, then the optional settings.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        for dimension in &self.dimensions {
            params.push(("dimension".to_string(), dimension.dimension_value()));
        }

        for filter in &self.filters {
            params.push(("filter".to_string(), filter.dimension_value()));
        }

        push_if_some!(params, "aggregationType", self.aggregation_type);
        push_if_some!(params, "startDate", self.start_date);
        push_if_some!(params, "endDate", self.end_date);
        push_if_some!(params, "skipMeta", self.skip_meta);
        push_if_some!(params, "skipData", self.skip_data);
        push_if_some!(params, "skipRounding", self.skip_rounding);
        push_if_some!(params, "ignoreLimit", self.ignore_limit);
        push_if_some!(params, "outputIdScheme", self.output_id_scheme);
        push_if_some!(params, "inputIdScheme", self.input_id_scheme);

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_value() {
        let dx = Dimension::new("dx", ["fbfJHSPpUQD", "cYeuwXTCPkU"]);
        assert_eq!(dx.dimension_value(), "dx:fbfJHSPpUQD;cYeuwXTCPkU");

        let co = Dimension::new::<[&str; 0], &str>("co", []);
        assert_eq!(co.dimension_value(), "co");
    }

    #[test]
    fn test_analytics_params() {
        let query = AnalyticsQuery::new()
            .dimension(Dimension::new("dx", ["fbfJHSPpUQD"]))
            .dimension(Dimension::new("pe", ["202101", "202102"]))
            .filter(Dimension::new("ou", ["ImspTQPwCqd"]))
            .aggregation_type(AggregationType::AverageSumOrgUnit)
            .skip_meta(true)
            .output_id_scheme(IdScheme::Code);

        let params = query.to_params();
        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        assert_eq!(
            params,
            vec![
                ("dimension", "dx:fbfJHSPpUQD"),
                ("dimension", "pe:202101;202102"),
                ("filter", "ou:ImspTQPwCqd"),
                ("aggregationType", "AVERAGE_SUM_ORG_UNIT"),
                ("skipMeta", "true"),
                ("outputIdScheme", "CODE"),
            ]
        );
    }
}
