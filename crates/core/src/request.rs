//! Tool arguments for `series/observations` and their resolution into a
//! validated, fully-defaulted upstream query.

use crate::error::{GatewayError, GatewayResult};
use crate::types::{AggregationMethod, Frequency, OutputType, SortOrder, Units};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_OFFSET: u64 = 0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// An integer argument that callers may send either as a JSON number or as
/// numeric text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegerArg {
    Int(i64),
    Text(String),
}

impl IntegerArg {
    fn to_i64(&self, field: &str) -> GatewayResult<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            Self::Text(s) => s.trim().parse().map_err(|_| {
                GatewayError::invalid_argument(format!("{field} must be an integer, got '{s}'"))
            }),
        }
    }

    fn to_non_negative(&self, field: &str) -> GatewayResult<u64> {
        let n = self.to_i64(field)?;
        u64::try_from(n).map_err(|_| {
            GatewayError::invalid_argument(format!("{field} must be non-negative, got {n}"))
        })
    }
}

/// Raw arguments of `get_fred_series_observations`.
///
/// Everything is optional here so that a missing `series_id` is reported as
/// an invalid argument rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationRequest {
    pub series_id: Option<String>,
    pub realtime_start: Option<String>,
    pub realtime_end: Option<String>,
    pub limit: Option<IntegerArg>,
    pub offset: Option<IntegerArg>,
    pub sort_order: Option<String>,
    pub observation_start: Option<String>,
    pub observation_end: Option<String>,
    pub units: Option<String>,
    pub frequency: Option<String>,
    pub aggregation_method: Option<String>,
    pub output_type: Option<IntegerArg>,
    pub vintage_dates: Option<String>,
}

impl ObservationRequest {
    pub fn for_series(series_id: impl Into<String>) -> Self {
        Self {
            series_id: Some(series_id.into()),
            ..Default::default()
        }
    }

    /// Validate every supplied field and fill in defaults.
    pub fn resolve(&self) -> GatewayResult<ObservationQuery> {
        let series_id = self
            .series_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GatewayError::invalid_argument("series_id is required"))?
            .to_string();

        let limit = match &self.limit {
            Some(arg) => arg.to_non_negative("limit")?,
            None => DEFAULT_LIMIT,
        };
        let offset = match &self.offset {
            Some(arg) => arg.to_non_negative("offset")?,
            None => DEFAULT_OFFSET,
        };

        let output_type = match &self.output_type {
            Some(arg) => OutputType::from_code(arg.to_i64(OutputType::FIELD)?)?,
            None => OutputType::default(),
        };

        Ok(ObservationQuery {
            series_id,
            limit,
            offset,
            sort_order: parse_or_default(self.sort_order.as_deref())?,
            units: parse_or_default(self.units.as_deref())?,
            aggregation_method: parse_or_default(self.aggregation_method.as_deref())?,
            output_type,
            frequency: self
                .frequency
                .as_deref()
                .map(str::parse::<Frequency>)
                .transpose()?,
            realtime_start: parse_date_opt("realtime_start", self.realtime_start.as_deref())?,
            realtime_end: parse_date_opt("realtime_end", self.realtime_end.as_deref())?,
            observation_start: parse_date_opt(
                "observation_start",
                self.observation_start.as_deref(),
            )?,
            observation_end: parse_date_opt("observation_end", self.observation_end.as_deref())?,
            vintage_dates: self
                .vintage_dates
                .as_deref()
                .map(parse_vintage_dates)
                .transpose()?,
        })
    }
}

fn parse_or_default<T>(value: Option<&str>) -> GatewayResult<T>
where
    T: std::str::FromStr<Err = GatewayError> + Default,
{
    value.map(str::parse).transpose().map(Option::unwrap_or_default)
}

fn parse_date_opt(field: &str, value: Option<&str>) -> GatewayResult<Option<NaiveDate>> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Strict `YYYY-MM-DD`: chrono alone would also accept unpadded or signed years.
fn parse_date(field: &str, value: &str) -> GatewayResult<NaiveDate> {
    let invalid = || {
        GatewayError::invalid_argument(format!(
            "{field} must be a YYYY-MM-DD calendar date, got '{value}'"
        ))
    };

    let text = value.trim();
    let well_formed = text.len() == 10
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(invalid());
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid())
}

fn parse_vintage_dates(value: &str) -> GatewayResult<Vec<NaiveDate>> {
    value
        .split(',')
        .map(|part| parse_date("vintage_dates", part))
        .collect()
}

/// A validated request, ready to be sent upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub series_id: String,
    pub limit: u64,
    pub offset: u64,
    pub sort_order: SortOrder,
    pub units: Units,
    pub aggregation_method: AggregationMethod,
    pub output_type: OutputType,
    pub frequency: Option<Frequency>,
    pub realtime_start: Option<NaiveDate>,
    pub realtime_end: Option<NaiveDate>,
    pub observation_start: Option<NaiveDate>,
    pub observation_end: Option<NaiveDate>,
    pub vintage_dates: Option<Vec<NaiveDate>>,
}

impl ObservationQuery {
    /// Query with only a series id and all defaults applied.
    pub fn new(series_id: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            sort_order: SortOrder::default(),
            units: Units::default(),
            aggregation_method: AggregationMethod::default(),
            output_type: OutputType::default(),
            frequency: None,
            realtime_start: None,
            realtime_end: None,
            observation_start: None,
            observation_end: None,
            vintage_dates: None,
        }
    }

    /// Query-string fields in a fixed order. Unset optional fields are left
    /// out entirely. Credentials and `file_type` are the client's business.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("series_id", self.series_id.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            (SortOrder::FIELD, self.sort_order.to_string()),
            (Units::FIELD, self.units.to_string()),
            (AggregationMethod::FIELD, self.aggregation_method.to_string()),
            (OutputType::FIELD, self.output_type.to_string()),
        ];

        let dates = [
            ("realtime_start", self.realtime_start),
            ("realtime_end", self.realtime_end),
            ("observation_start", self.observation_start),
            ("observation_end", self.observation_end),
        ];
        for (field, date) in dates {
            if let Some(date) = date {
                pairs.push((field, date.format(DATE_FORMAT).to_string()));
            }
        }

        if let Some(frequency) = self.frequency {
            pairs.push((Frequency::FIELD, frequency.to_string()));
        }

        if let Some(vintage_dates) = &self.vintage_dates {
            let joined = vintage_dates
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect::<Vec<_>>()
                .join(",");
            pairs.push(("vintage_dates", joined));
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> ObservationRequest {
        serde_json::from_value(value).unwrap()
    }

    fn assert_invalid(value: serde_json::Value, needle: &str) {
        let err = request(value).resolve().unwrap_err();
        assert!(
            matches!(err, GatewayError::InvalidArgument(ref msg) if msg.contains(needle)),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_series_id_only_gets_documented_defaults() {
        let query = ObservationRequest::for_series("GDP").resolve().unwrap();

        assert_eq!(
            query.query_pairs(),
            vec![
                ("series_id", "GDP".to_string()),
                ("limit", "10".to_string()),
                ("offset", "0".to_string()),
                ("sort_order", "asc".to_string()),
                ("units", "lin".to_string()),
                ("aggregation_method", "avg".to_string()),
                ("output_type", "1".to_string()),
            ]
        );
        assert_eq!(query, ObservationQuery::new("GDP"));
    }

    #[test]
    fn test_missing_or_blank_series_id() {
        assert_invalid(json!({}), "series_id is required");
        assert_invalid(json!({"series_id": ""}), "series_id is required");
        assert_invalid(json!({"series_id": "   "}), "series_id is required");
    }

    #[test]
    fn test_series_id_is_trimmed() {
        let query = request(json!({"series_id": " UNRATE "})).resolve().unwrap();
        assert_eq!(query.series_id, "UNRATE");
    }

    #[test]
    fn test_limit_and_offset_accept_numeric_text() {
        let query = request(json!({"series_id": "GDP", "limit": "25", "offset": 5}))
            .resolve()
            .unwrap();

        assert_eq!(query.limit, 25);
        assert_eq!(query.offset, 5);
    }

    #[test]
    fn test_negative_or_non_numeric_counts_rejected() {
        assert_invalid(json!({"series_id": "GDP", "limit": -1}), "limit must be non-negative");
        assert_invalid(json!({"series_id": "GDP", "offset": "-3"}), "offset must be non-negative");
        assert_invalid(json!({"series_id": "GDP", "limit": "ten"}), "limit must be an integer");
    }

    #[test]
    fn test_enumerated_fields_rejected_outside_allowed_set() {
        assert_invalid(json!({"series_id": "GDP", "sort_order": "up"}), "sort_order");
        assert_invalid(json!({"series_id": "GDP", "units": "pct"}), "units");
        assert_invalid(json!({"series_id": "GDP", "frequency": "hourly"}), "frequency");
        assert_invalid(
            json!({"series_id": "GDP", "aggregation_method": "median"}),
            "aggregation_method",
        );
        assert_invalid(json!({"series_id": "GDP", "output_type": 5}), "output_type");
        assert_invalid(json!({"series_id": "GDP", "sort_order": ""}), "sort_order");
    }

    #[test]
    fn test_output_type_accepts_text() {
        let query = request(json!({"series_id": "GDP", "output_type": "3"}))
            .resolve()
            .unwrap();
        assert_eq!(query.output_type, OutputType::VintageNewAndRevised);
    }

    #[test]
    fn test_dates_must_be_iso_calendar_dates() {
        assert_invalid(
            json!({"series_id": "GDP", "observation_start": "2020/01/01"}),
            "observation_start must be a YYYY-MM-DD",
        );
        assert_invalid(
            json!({"series_id": "GDP", "realtime_end": "2023-02-30"}),
            "realtime_end",
        );
        assert_invalid(
            json!({"series_id": "GDP", "realtime_start": "2020-1-1"}),
            "realtime_start",
        );
        assert_invalid(
            json!({"series_id": "GDP", "vintage_dates": "2020-01-01,yesterday"}),
            "vintage_dates",
        );
    }

    #[test]
    fn test_optional_fields_appended_when_set() {
        let query = request(json!({
            "series_id": "GDP",
            "observation_start": "2000-01-01",
            "observation_end": "2010-12-31",
            "frequency": "a",
            "aggregation_method": "eop",
            "vintage_dates": "2020-01-01, 2021-01-01"
        }))
        .resolve()
        .unwrap();

        let pairs = query.query_pairs();
        assert!(pairs.contains(&("observation_start", "2000-01-01".to_string())));
        assert!(pairs.contains(&("observation_end", "2010-12-31".to_string())));
        assert!(pairs.contains(&("frequency", "a".to_string())));
        assert!(pairs.contains(&("aggregation_method", "eop".to_string())));
        assert!(pairs.contains(&("vintage_dates", "2020-01-01,2021-01-01".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "realtime_start"));
    }

    #[test]
    fn test_gdp_desc_scenario() {
        let query = request(json!({"series_id": "GDP", "limit": 5, "sort_order": "desc"}))
            .resolve()
            .unwrap();

        let pairs = query.query_pairs();
        assert_eq!(pairs.len(), 7);
        assert!(pairs.contains(&("limit", "5".to_string())));
        assert!(pairs.contains(&("sort_order", "desc".to_string())));
        assert!(pairs.contains(&("offset", "0".to_string())));
    }
}
