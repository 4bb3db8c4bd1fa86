use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when reconstructing a [`Query`] from query parameters.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid direction: {0}")]
    InvalidDirection(String),

    #[error("Malformed filter: {0}")]
    MalformedFilter(String),

    #[error("Malformed order: {0}")]
    MalformedOrder(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidNumber { key: String, value: String },
}

/// Filter operators understood by the metadata API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    NotEq,
    IEq,
    Ne,
    Like,
    NotLike,
    StartsWith,
    EndsWith,
    ILike,
    NotILike,
    IStartsWith,
    IEndsWith,
    Gt,
    Ge,
    Lt,
    Le,
    Null,
    NotNull,
    Empty,
    Token,
    NotToken,
    In,
    NotIn,
}

const OPERATORS: [Operator; 23] = [
    Operator::Eq,
    Operator::NotEq,
    Operator::IEq,
    Operator::Ne,
    Operator::Like,
    Operator::NotLike,
    Operator::StartsWith,
    Operator::EndsWith,
    Operator::ILike,
    Operator::NotILike,
    Operator::IStartsWith,
    Operator::IEndsWith,
    Operator::Gt,
    Operator::Ge,
    Operator::Lt,
    Operator::Le,
    Operator::Null,
    Operator::NotNull,
    Operator::Empty,
    Operator::Token,
    Operator::NotToken,
    Operator::In,
    Operator::NotIn,
];

impl Operator {
    /// The token used in the `filter` parameter, e.g. `!eq` or `$ilike`.
    pub fn token(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::NotEq => "!eq",
            Operator::IEq => "ieq",
            Operator::Ne => "ne",
            Operator::Like => "like",
            Operator::NotLike => "!like",
            Operator::StartsWith => "$like",
            Operator::EndsWith => "like$",
            Operator::ILike => "ilike",
            Operator::NotILike => "!ilike",
            Operator::IStartsWith => "$ilike",
            Operator::IEndsWith => "ilike$",
            Operator::Gt => "gt",
            Operator::Ge => "ge",
            Operator::Lt => "lt",
            Operator::Le => "le",
            Operator::Null => "null",
            Operator::NotNull => "!null",
            Operator::Empty => "empty",
            Operator::Token => "token",
            Operator::NotToken => "!token",
            Operator::In => "in",
            Operator::NotIn => "!in",
        }
    }

    /// Set-membership operators take a bracketed list of values.
    pub fn is_collection(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// Operators that take no value at all.
    pub fn is_unary(&self) -> bool {
        matches!(self, Operator::Null | Operator::NotNull | Operator::Empty)
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    /// Parses an operator token. Tokens are case-insensitive.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let token = input.to_lowercase();
        OPERATORS
            .iter()
            .find(|op| op.token() == token)
            .copied()
            .ok_or_else(|| QueryError::InvalidOperator(input.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// The value side of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterValue {
    None,
    Scalar(String),
    List(Vec<String>),
}

/// A single `property:operator:value` restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    property: String,
    operator: Operator,
    value: FilterValue,
}

impl Filter {
    /// Creates a filter with a scalar value. For `in`/`!in` the value is
    /// taken as an already comma-joined list.
    pub fn new(property: &str, operator: Operator, value: impl ToString) -> Self {
        let value = value.to_string();
        let value = if operator.is_unary() {
            FilterValue::None
        } else if operator.is_collection() {
            FilterValue::List(split_list(&value))
        } else {
            FilterValue::Scalar(value)
        };

        Self {
            property: property.to_string(),
            operator,
            value,
        }
    }

    pub fn eq(property: &str, value: impl ToString) -> Self {
        Self::new(property, Operator::Eq, value)
    }

    pub fn like(property: &str, value: impl ToString) -> Self {
        Self::new(property, Operator::Like, value)
    }

    pub fn ilike(property: &str, value: impl ToString) -> Self {
        Self::new(property, Operator::ILike, value)
    }

    pub fn in_values<I, S>(property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            property: property.to_string(),
            operator: Operator::In,
            value: FilterValue::List(values.into_iter().map(|v| v.to_string()).collect()),
        }
    }

    pub fn not_in_values<I, S>(property: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            operator: Operator::NotIn,
            ..Self::in_values(property, values)
        }
    }

    pub fn null(property: &str) -> Self {
        Self::new(property, Operator::Null, "")
    }

    pub fn not_null(property: &str) -> Self {
        Self::new(property, Operator::NotNull, "")
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &FilterValue {
        &self.value
    }

    /// Renders the value segment. Collections are bracketed, `[a,b]`.
    fn rendered_value(&self) -> Option<String> {
        match &self.value {
            FilterValue::None => None,
            FilterValue::Scalar(value) => Some(value.clone()),
            FilterValue::List(values) => Some(format!("[{}]", values.join(","))),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.rendered_value() {
            Some(value) => write!(f, "{}:{}:{}", self.property, self.operator, value),
            None => write!(f, "{}:{}", self.property, self.operator),
        }
    }
}

impl FromStr for Filter {
    type Err = QueryError;

    /// Parses `property:operator[:value]`. The value may itself contain `:`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.splitn(3, ':');
        let property = parts.next().filter(|p| !p.is_empty());
        let operator = parts.next();

        let (property, operator) = match (property, operator) {
            (Some(property), Some(operator)) => (property, operator.parse::<Operator>()?),
            _ => return Err(QueryError::MalformedFilter(input.to_string())),
        };

        let value = parts.next();
        let value = match (operator.is_unary(), operator.is_collection(), value) {
            (true, _, _) => FilterValue::None,
            (false, true, Some(value)) => {
                let inner = value
                    .strip_prefix('[')
                    .and_then(|v| v.strip_suffix(']'))
                    .unwrap_or(value);
                FilterValue::List(split_list(inner))
            }
            (false, false, Some(value)) => FilterValue::Scalar(value.to_string()),
            (false, _, None) => return Err(QueryError::MalformedFilter(input.to_string())),
        };

        Ok(Filter {
            property: property.to_string(),
            operator,
            value,
        })
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Paging of a list request.
///
/// With paging enabled and neither page nor page size set, the server
/// defaults apply and nothing is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    enabled: bool,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            enabled: true,
            page: None,
            page_size: None,
        }
    }
}

impl Paging {
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            enabled: true,
            page,
            page_size,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            page: None,
            page_size: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl FromStr for Direction {
    type Err = QueryError;

    /// Converts a string to a `Direction`, ignoring case.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(QueryError::InvalidDirection(input.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    property: String,
    direction: Direction,
}

impl Order {
    pub fn new(property: &str, direction: Direction) -> Self {
        Self {
            property: property.to_string(),
            direction,
        }
    }

    pub fn asc(property: &str) -> Self {
        Self::new(property, Direction::Asc)
    }

    pub fn desc(property: &str) -> Self {
        Self::new(property, Direction::Desc)
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.direction)
    }
}

impl FromStr for Order {
    type Err = QueryError;

    /// Parses `property:direction`; a missing direction means ascending.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.rsplit_once(':') {
            Some((property, direction)) if !property.is_empty() => {
                Ok(Order::new(property, direction.parse()?))
            }
            None if !input.is_empty() => Ok(Order::asc(input)),
            _ => Err(QueryError::MalformedOrder(input.to_string())),
        }
    }
}

/// Filtering, paging and ordering of a list request.
///
/// Built by chaining the consuming builder methods:
///
/// ```
/// use dhis2::query_api::query::{Filter, Order, Paging, Query};
///
/// let query = Query::new()
///     .filter(Filter::in_values("id", ["a", "b"]))
///     .paging(Paging::new(Some(2), Some(50)))
///     .order(Order::desc("name"));
///
/// assert_eq!(query.to_params()[0], ("filter".to_string(), "id:in:[a,b]".to_string()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    filters: Vec<Filter>,
    paging: Paging,
    order: Option<Order>,
    expand_associations: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn paging(mut self, paging: Paging) -> Self {
        self.paging = paging;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.paging = Paging::new(Some(page), self.paging.page_size);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.paging = Paging::new(self.paging.page, Some(page_size));
        self
    }

    pub fn without_paging(mut self) -> Self {
        self.paging = Paging::disabled();
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    /// Asks the accessor layer to expand nested associations in the response.
    pub fn expand_associations(mut self, expand: bool) -> Self {
        self.expand_associations = expand;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn get_paging(&self) -> &Paging {
        &self.paging
    }

    pub fn get_order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn is_expand_associations(&self) -> bool {
        self.expand_associations
    }

    /// Renders the query as URL parameters: filters, then paging, then order.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        for filter in &self.filters {
            params.push(("filter".to_string(), filter.to_string()));
        }

        if self.paging.enabled {
            if let Some(page) = self.paging.page {
                params.push(("page".to_string(), page.to_string()));
            }
            if let Some(page_size) = self.paging.page_size {
                params.push(("pageSize".to_string(), page_size.to_string()));
            }
        } else {
            params.push(("paging".to_string(), "false".to_string()));
        }

        if let Some(order) = &self.order {
            params.push(("order".to_string(), order.to_string()));
        }

        params
    }

    /// Rebuilds a query from rendered parameters. Keys the query does not
    /// own (e.g. `fields`) are ignored.
    pub fn from_params<K, V>(params: &[(K, V)]) -> Result<Self, QueryError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Query::new();
        let mut page = None;
        let mut page_size = None;
        let mut paging_enabled = true;

        for (key, value) in params {
            let value = value.as_ref();
            match key.as_ref() {
                "filter" => query.filters.push(value.parse()?),
                "page" => page = Some(parse_number("page", value)?),
                "pageSize" => page_size = Some(parse_number("pageSize", value)?),
                "paging" => paging_enabled = !value.eq_ignore_ascii_case("false"),
                "order" => query.order = Some(value.parse()?),
                _ => {}
            }
        }

        query.paging = if paging_enabled {
            Paging::new(page, page_size)
        } else {
            Paging::disabled()
        };

        Ok(query)
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32, QueryError> {
    value.parse().map_err(|_| QueryError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl From<&Query> for Vec<(String, String)> {
    fn from(query: &Query) -> Self {
        query.to_params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn test_in_filter_renders_bracketed_list() {
        let query = Query::new().filter(Filter::in_values("p", ["a", "b"]));

        let params = query.to_params();
        let filters: Vec<_> = params.iter().filter(|(k, _)| k == "filter").collect();

        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].1, "p:in:[a,b]");
    }

    #[test]
    fn test_in_filter_from_joined_value() {
        let filter = Filter::new("id", Operator::In, "x,y,z");
        assert_eq!(filter.to_string(), "id:in:[x,y,z]");

        let filter = Filter::new("id", Operator::NotIn, "x");
        assert_eq!(filter.to_string(), "id:!in:[x]");
    }

    #[test]
    fn test_scalar_filters() {
        assert_eq!(Filter::eq("code", "ANC").to_string(), "code:eq:ANC");
        assert_eq!(Filter::ilike("name", "malaria").to_string(), "name:ilike:malaria");
        assert_eq!(
            Filter::new("lastUpdated", Operator::Gt, "2021-01-01").to_string(),
            "lastUpdated:gt:2021-01-01"
        );
        assert_eq!(Filter::null("parent").to_string(), "parent:null");
    }

    #[test]
    fn test_disabled_paging_only_emits_paging_false() {
        let query = Query::new().page(3).page_size(10).without_paging();

        assert_eq!(pairs(&query.to_params()), vec![("paging", "false")]);
    }

    #[test]
    fn test_default_paging_emits_nothing() {
        assert!(Query::new().to_params().is_empty());
    }

    #[test]
    fn test_paging_only_emits_set_values() {
        let query = Query::new().page_size(25);
        assert_eq!(pairs(&query.to_params()), vec![("pageSize", "25")]);

        let query = Query::new().page(2).page_size(25);
        assert_eq!(
            pairs(&query.to_params()),
            vec![("page", "2"), ("pageSize", "25")]
        );
    }

    #[test]
    fn test_order_is_lowercase() {
        let query = Query::new().order(Order::new("name", "DESC".parse().unwrap()));
        assert_eq!(pairs(&query.to_params()), vec![("order", "name:desc")]);
    }

    #[test]
    fn test_parameter_order_and_idempotence() {
        let query = Query::new()
            .order(Order::asc("created"))
            .paging(Paging::new(Some(1), Some(5)))
            .filter(Filter::eq("domainType", "AGGREGATE"))
            .filter(Filter::in_values("id", ["a", "b"]));

        let first = query.to_params();
        let second = query.to_params();

        assert_eq!(first, second);
        assert_eq!(
            pairs(&first),
            vec![
                ("filter", "domainType:eq:AGGREGATE"),
                ("filter", "id:in:[a,b]"),
                ("page", "1"),
                ("pageSize", "5"),
                ("order", "created:asc"),
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let queries = vec![
            Query::new(),
            Query::new().without_paging(),
            Query::new()
                .filter(Filter::in_values("id", ["a", "b"]))
                .filter(Filter::like("name", "ANC: 1st visit"))
                .filter(Filter::not_null("code"))
                .page(4)
                .order(Order::desc("name")),
            Query::new()
                .filter(Filter::not_in_values("id", ["x"]))
                .page_size(100),
        ];

        for query in queries {
            let rebuilt = Query::from_params(&query.to_params()).unwrap();
            assert_eq!(rebuilt, query);
        }
    }

    #[test]
    fn test_from_params_ignores_foreign_keys() {
        let params = [
            ("fields", "id,name"),
            ("filter", "name:eq:Bo"),
            ("paging", "false"),
        ];
        let query = Query::from_params(&params).unwrap();

        assert_eq!(query.filters(), &[Filter::eq("name", "Bo")]);
        assert!(!query.get_paging().is_enabled());
    }

    #[test]
    fn test_malformed_params() {
        assert_eq!(
            Query::from_params(&[("filter", "name")]),
            Err(QueryError::MalformedFilter("name".into()))
        );
        assert_eq!(
            Query::from_params(&[("filter", "name:between:1")]),
            Err(QueryError::InvalidOperator("between".into()))
        );
        assert_eq!(
            Query::from_params(&[("order", "name:sideways")]),
            Err(QueryError::InvalidDirection("sideways".into()))
        );
        assert!(matches!(
            Query::from_params(&[("page", "two")]),
            Err(QueryError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_operator_from_str() {
        assert_eq!("IN".parse::<Operator>().unwrap(), Operator::In);
        assert_eq!("!ilike".parse::<Operator>().unwrap(), Operator::NotILike);
        assert_eq!("like$".parse::<Operator>().unwrap(), Operator::EndsWith);
        assert!("nope".parse::<Operator>().is_err());
    }
}
