use chrono::NaiveDate;
use serde::Serialize;

/// One entity's arrivals for one month. Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalRecord {
    #[serde(serialize_with = "serialize_date")]
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub entity: String,
    pub arrivals: f64,
}

impl ArrivalRecord {
    /// `None` when `year`/`month` do not form a calendar month.
    pub fn new(year: i32, month: u32, entity: impl Into<String>, arrivals: f64) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year, month, 1)?;
        Some(Self {
            date,
            year,
            month,
            entity: entity.into(),
            arrivals,
        })
    }

    pub fn key(&self) -> (&str, i32, u32) {
        (self.entity.as_str(), self.year, self.month)
    }
}

fn serialize_date<S: serde::Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&date.format("%Y-%m-%d"))
}
