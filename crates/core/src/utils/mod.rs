pub mod raw_value;
pub mod time_utils;
