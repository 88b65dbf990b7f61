//! Calendar helpers shared by the rate-plan tool and the date tool.

use chrono::{Local, NaiveDate};

use crate::error::ToolError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated check-in / check-out pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayDates {
    /// Parse both dates, rejecting anything that is not a real `YYYY-MM-DD` date.
    ///
    /// Ordering between the two dates is left to the remote API.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self, ToolError> {
        Ok(Self {
            check_in: parse_date("checkIn", check_in)?,
            check_out: parse_date("checkOut", check_out)?,
        })
    }

    pub fn check_in_str(&self) -> String {
        self.check_in.format(DATE_FORMAT).to_string()
    }

    pub fn check_out_str(&self) -> String {
        self.check_out.format(DATE_FORMAT).to_string()
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ToolError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ToolError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Today's local date as `YYYY-MM-DD`.
pub fn current_date() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}
