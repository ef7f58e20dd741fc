use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate};
use monitor_core::{DayRange, UsageDate};

use crate::config::RangeParams;
use crate::error::{AppError, Result};

/// Named reporting windows, all ending today.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Period {
    Today,
    Yesterday,
    /// The last seven days plus today.
    Week,
    /// The last thirty days plus today.
    Month,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Week => "This Week",
            Self::Month => "This Month",
        }
    }

    pub fn range(self, today: NaiveDate) -> Result<DayRange> {
        let (start, end) = match self {
            Self::Today => (today, today),
            Self::Yesterday => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            Self::Week => (today - Duration::days(7), today),
            Self::Month => (today - Duration::days(30), today),
        };
        day_range(start, end)
    }

    /// Window a budget is checked against. `Month` is the calendar month
    /// to date rather than the trailing thirty days.
    pub fn budget_range(self, today: NaiveDate) -> Result<DayRange> {
        match self {
            Self::Month => month_to_date(today),
            other => other.range(today),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "yesterday" => Ok(Self::Yesterday),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(AppError::InvalidInput(format!(
                "unsupported period {}, expected today, yesterday, week or month",
                other
            ))),
        }
    }
}

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub fn month_to_date(today: NaiveDate) -> Result<DayRange> {
    let first = today
        .with_day(1)
        .ok_or_else(|| AppError::InvalidInput("invalid local date".to_string()))?;
    day_range(first, today)
}

/// The `count` days before today, most recent first.
pub fn last_days(today: NaiveDate, count: u32) -> Result<Vec<UsageDate>> {
    (1..=i64::from(count))
        .map(|offset| Ok(UsageDate::from_naive(today - Duration::days(offset))?))
        .collect()
}

fn day_range(start: NaiveDate, end: NaiveDate) -> Result<DayRange> {
    Ok(DayRange::new(
        UsageDate::from_naive(start)?,
        UsageDate::from_naive(end)?,
    )?)
}

/// A resolved selection: what to call it and which days it covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRange {
    pub label: String,
    pub range: DayRange,
}

/// Explicit dates win over a named period; with nothing set the window is today.
pub fn resolve_range(params: &RangeParams, today: NaiveDate) -> Result<ResolvedRange> {
    if let Some(date) = params.date.as_deref() {
        let day = UsageDate::parse(date)?;
        return Ok(ResolvedRange {
            label: day.to_string(),
            range: DayRange::single(day),
        });
    }
    match (params.start.as_deref(), params.end.as_deref()) {
        (Some(start), Some(end)) => {
            let range = DayRange::parse(start, end)?;
            return Ok(ResolvedRange {
                label: range.to_string(),
                range,
            });
        }
        (Some(start), None) => {
            let range = DayRange::new(UsageDate::parse(start)?, UsageDate::from_naive(today)?)?;
            return Ok(ResolvedRange {
                label: range.to_string(),
                range,
            });
        }
        (None, Some(_)) => {
            return Err(AppError::InvalidInput(
                "an end date needs a start date".to_string(),
            ));
        }
        (None, None) => {}
    }
    let period = match params.period.as_deref() {
        Some(value) => value.parse()?,
        None => Period::Today,
    };
    Ok(ResolvedRange {
        label: period.label().to_string(),
        range: period.range(today)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).expect("date")
    }

    fn bounds(range: &DayRange) -> (String, String) {
        (range.start().to_string(), range.end().to_string())
    }

    #[test]
    fn periods_end_today() {
        let cases = [
            (Period::Today, ("2024-06-15", "2024-06-15")),
            (Period::Yesterday, ("2024-06-14", "2024-06-14")),
            (Period::Week, ("2024-06-08", "2024-06-15")),
            (Period::Month, ("2024-05-16", "2024-06-15")),
        ];
        for (period, (start, end)) in cases {
            let range = period.range(today()).expect("range");
            assert_eq!(bounds(&range), (start.to_string(), end.to_string()), "{period}");
        }
    }

    #[test]
    fn budget_month_is_calendar_month_to_date() {
        let range = Period::Month.budget_range(today()).expect("range");
        assert_eq!(
            bounds(&range),
            ("2024-06-01".to_string(), "2024-06-15".to_string())
        );
        let week = Period::Week.budget_range(today()).expect("range");
        assert_eq!(week, Period::Week.range(today()).expect("range"));
    }

    #[test]
    fn last_days_start_yesterday() {
        let days = last_days(today(), 3).expect("days");
        let days: Vec<_> = days.iter().map(|day| day.as_str()).collect();
        assert_eq!(days, vec!["2024-06-14", "2024-06-13", "2024-06-12"]);
        assert!(last_days(today(), 0).expect("days").is_empty());
    }

    #[test]
    fn parses_period_names() {
        assert_eq!("Week".parse::<Period>().expect("period"), Period::Week);
        assert!("fortnight".parse::<Period>().is_err());
    }

    #[test]
    fn explicit_dates_take_precedence() {
        let params = RangeParams {
            period: Some("month".to_string()),
            start: Some("2024-06-01".to_string()),
            end: Some("2024-06-03".to_string()),
            ..RangeParams::default()
        };
        let resolved = resolve_range(&params, today()).expect("range");
        assert_eq!(resolved.label, "2024-06-01 to 2024-06-03");
        assert_eq!(resolved.range.days(), 3);
    }

    #[test]
    fn single_date_selection() {
        let params = RangeParams {
            date: Some("2024-06-02".to_string()),
            ..RangeParams::default()
        };
        let resolved = resolve_range(&params, today()).expect("range");
        assert_eq!(
            bounds(&resolved.range),
            ("2024-06-02".to_string(), "2024-06-02".to_string())
        );
    }

    #[test]
    fn defaults_to_today() {
        let resolved = resolve_range(&RangeParams::default(), today()).expect("range");
        assert_eq!(resolved.label, "Today");
        assert_eq!(resolved.range.days(), 1);
    }

    #[test]
    fn rejects_bad_input() {
        let inverted = RangeParams {
            start: Some("2024-06-03".to_string()),
            end: Some("2024-06-01".to_string()),
            ..RangeParams::default()
        };
        assert!(matches!(
            resolve_range(&inverted, today()),
            Err(AppError::InvalidRange(_))
        ));

        let end_only = RangeParams {
            end: Some("2024-06-01".to_string()),
            ..RangeParams::default()
        };
        assert!(matches!(
            resolve_range(&end_only, today()),
            Err(AppError::InvalidInput(_))
        ));

        let malformed = RangeParams {
            date: Some("2024-6-1".to_string()),
            ..RangeParams::default()
        };
        assert!(resolve_range(&malformed, today()).is_err());
    }
}
