use crate::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a parameter enum whose variants map one-to-one onto FRED wire codes.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($variant:ident => $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every accepted wire code, in documentation order.
            pub const CODES: &'static [&'static str] = &[$($code),+];

            /// Query-string field this value is sent as.
            pub const FIELD: &'static str = $field;

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl FromStr for $name {
            type Err = GatewayError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok(Self::$variant),)+
                    other => Err(unknown_code($field, other, Self::CODES)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

fn unknown_code(field: &str, value: &str, allowed: &[&str]) -> GatewayError {
    GatewayError::invalid_argument(format!(
        "{field} must be one of [{}], got '{value}'",
        allowed.join(", ")
    ))
}

wire_enum! {
    /// Ordering of the returned observations by date.
    SortOrder, "sort_order" {
        Asc => "asc",
        Desc => "desc",
    }
}

wire_enum! {
    /// Data value transformation applied by FRED.
    Units, "units" {
        Levels => "lin",
        Change => "chg",
        ChangeFromYearAgo => "ch1",
        PercentChange => "pch",
        PercentChangeFromYearAgo => "pc1",
        CompoundedAnnualRateOfChange => "pca",
        ContinuouslyCompoundedRateOfChange => "cch",
        ContinuouslyCompoundedAnnualRateOfChange => "cca",
        NaturalLog => "log",
    }
}

wire_enum! {
    /// Frequency to aggregate observations into.
    Frequency, "frequency" {
        Daily => "d",
        Weekly => "w",
        Biweekly => "bw",
        Monthly => "m",
        Quarterly => "q",
        Semiannual => "sa",
        Annual => "a",
        WeeklyEndingFriday => "wef",
        WeeklyEndingThursday => "weth",
        WeeklyEndingWednesday => "wew",
        WeeklyEndingTuesday => "wetu",
        WeeklyEndingMonday => "wem",
        WeeklyEndingSunday => "wesu",
        WeeklyEndingSaturday => "wesa",
        BiweeklyEndingWednesday => "bwew",
        BiweeklyEndingMonday => "bwem",
    }
}

wire_enum! {
    /// How observations are combined when a frequency is requested.
    AggregationMethod, "aggregation_method" {
        Average => "avg",
        Sum => "sum",
        EndOfPeriod => "eop",
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Asc
    }
}

impl Default for Units {
    fn default() -> Self {
        Self::Levels
    }
}

impl Default for AggregationMethod {
    fn default() -> Self {
        Self::Average
    }
}

/// Shape of the returned observations with respect to real-time periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputType {
    /// Observations by real-time period.
    #[default]
    RealtimePeriod,
    /// Observations by vintage date, all observations.
    VintageAll,
    /// Observations by vintage date, new and revised only.
    VintageNewAndRevised,
    /// Observations, initial release only.
    InitialRelease,
}

impl OutputType {
    pub const FIELD: &'static str = "output_type";

    pub fn code(&self) -> u8 {
        match self {
            Self::RealtimePeriod => 1,
            Self::VintageAll => 2,
            Self::VintageNewAndRevised => 3,
            Self::InitialRelease => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, GatewayError> {
        match code {
            1 => Ok(Self::RealtimePeriod),
            2 => Ok(Self::VintageAll),
            3 => Ok(Self::VintageNewAndRevised),
            4 => Ok(Self::InitialRelease),
            other => Err(GatewayError::invalid_argument(format!(
                "output_type must be one of [1, 2, 3, 4], got {other}"
            ))),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Value FRED uses in place of a number when an observation is missing.
pub const MISSING_VALUE: &str = ".";

/// One data point of a series, as FRED returns it.
///
/// Only `date` is always present. Vintage output types (2 and 3) drop the
/// real-time window and `value` in favour of one `<SERIES>_<YYYYMMDD>` field
/// per vintage, which lands in `extra` along with anything else FRED adds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_end: Option<String>,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Observation {
    pub fn is_missing(&self) -> bool {
        self.value.as_deref() == Some(MISSING_VALUE)
    }

    /// Numeric value, or `None` for the missing sentinel, unparseable text,
    /// or a vintage-shaped record with no `value` field.
    pub fn numeric_value(&self) -> Option<f64> {
        self.value
            .as_deref()
            .filter(|v| *v != MISSING_VALUE)?
            .parse()
            .ok()
    }
}
