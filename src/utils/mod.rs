//! Utility functions

mod common;

pub use common::{
    format_datetime, mask_string, now, parse_datetime, random_bytes, DATE_FORMAT, DATE_TIME_FORMAT,
};
