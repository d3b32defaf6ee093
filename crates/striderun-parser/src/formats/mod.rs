mod common;
mod floors;
mod heart_rate;
mod pedometer;

pub use floors::FloorsParser;
pub use heart_rate::HeartRateParser;
pub use pedometer::PedometerParser;

pub(crate) use common::{
    datetime_series, parse_optional_f64, parse_optional_i64, parse_required_i64, parse_timestamp,
    read_preamble, trimmed_optional,
};
