//! Duty record model and related types.
//!
//! This module defines [`DutyRecord`], the typed form of one roster entry,
//! together with the duty type sum type, route sectors, and the payroll
//! bucket a duty is assigned to.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of duty a roster entry represents.
///
/// Pay rules are selected by exhaustive matching on this type in the
/// calculator.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::DutyType;
///
/// let duty_type: DutyType = serde_json::from_str("\"business_promotion\"").unwrap();
/// assert_eq!(duty_type, DutyType::BusinessPromotion);
/// assert!(duty_type.is_paid());
/// assert!(!DutyType::Sby.is_paid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyType {
    /// Same-day round trip from the home base.
    Turnaround,
    /// A flight leg that ends away from the home base, or the leg back.
    Layover,
    /// Airport standby.
    Asby,
    /// Home standby.
    Sby,
    /// Recurrent training.
    Recurrent,
    /// Business promotion duty.
    BusinessPromotion,
    /// Day off.
    Off,
    /// Rest day.
    Rest,
    /// Annual leave.
    AnnualLeave,
}

impl DutyType {
    /// Every duty type, in display order.
    pub const ALL: [DutyType; 9] = [
        DutyType::Turnaround,
        DutyType::Layover,
        DutyType::Asby,
        DutyType::Sby,
        DutyType::Recurrent,
        DutyType::BusinessPromotion,
        DutyType::Off,
        DutyType::Rest,
        DutyType::AnnualLeave,
    ];

    /// Duty types that earn variable pay and take part in the analytics
    /// allocation.
    pub const PAID: [DutyType; 5] = [
        DutyType::Turnaround,
        DutyType::Layover,
        DutyType::Asby,
        DutyType::Recurrent,
        DutyType::BusinessPromotion,
    ];

    /// Returns true if this type earns variable pay.
    pub fn is_paid(&self) -> bool {
        Self::PAID.contains(self)
    }

    /// Returns true if report and debrief times are mandatory for this type.
    pub fn requires_times(&self) -> bool {
        matches!(
            self,
            DutyType::Turnaround
                | DutyType::Layover
                | DutyType::Recurrent
                | DutyType::BusinessPromotion
        )
    }

    /// Returns true for flight duties (turnaround and layover).
    pub fn is_flight(&self) -> bool {
        matches!(self, DutyType::Turnaround | DutyType::Layover)
    }
}

impl std::fmt::Display for DutyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DutyType::Turnaround => "Turnaround",
            DutyType::Layover => "Layover",
            DutyType::Asby => "ASBY",
            DutyType::Sby => "SBY",
            DutyType::Recurrent => "Recurrent",
            DutyType::BusinessPromotion => "Business Promotion",
            DutyType::Off => "Off",
            DutyType::Rest => "Rest",
            DutyType::AnnualLeave => "Annual Leave",
        };
        write!(f, "{}", label)
    }
}

/// How a matched duty code is paid.
///
/// Comes from the duty-code table, so sub-type policy (e.g. a training
/// airport standby that earns nothing) is data rather than code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayPolicy {
    /// Paid according to the duty type's rule.
    #[default]
    Standard,
    /// Always pays exactly zero.
    Unpaid,
}

/// Where a duty record came from. Has no effect on calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Parsed from an uploaded roster.
    Imported,
    /// Entered by hand.
    Manual,
    /// Imported or manual, then edited.
    Edited,
}

/// Whether the payroll bucket was derived from the duty date or chosen at
/// import time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketSource {
    /// Month and year of the duty date.
    Derived,
    /// Explicitly selected by the importer.
    Overridden,
}

#[derive(Deserialize)]
struct BucketMonthRepr {
    month: u32,
    year: i32,
}

/// A payroll period: one calendar month of one year.
///
/// The month is always in `1..=12`; construction goes through
/// [`BucketMonth::new`] or [`BucketMonth::from_date`].
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::BucketMonth;
/// use chrono::NaiveDate;
///
/// let bucket = BucketMonth::new(2, 2024).unwrap();
/// assert_eq!(bucket.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
/// assert_eq!(bucket.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
/// assert!(BucketMonth::new(13, 2024).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "BucketMonthRepr")]
pub struct BucketMonth {
    year: i32,
    month: u32,
}

impl TryFrom<BucketMonthRepr> for BucketMonth {
    type Error = String;

    fn try_from(repr: BucketMonthRepr) -> Result<Self, Self::Error> {
        BucketMonth::new(repr.month, repr.year)
            .ok_or_else(|| format!("invalid payroll month {}/{}", repr.month, repr.year))
    }
}

impl BucketMonth {
    /// Creates a bucket, or `None` if the month/year is not a real month.
    pub fn new(month: u32, year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The bucket a date falls in.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month number, 1 through 12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> NaiveDate {
        // Validated at construction.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month.
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().unwrap_or(NaiveDate::MIN)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The preceding month.
    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Returns true if the date is inside this calendar month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl std::fmt::Display for BucketMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// One normalized route segment, displayed and serialized as `ORIGIN-DEST`.
///
/// # Example
///
/// ```
/// use crew_pay_engine::models::Sector;
///
/// let sector = Sector::new("DXB", "ZAG").unwrap();
/// assert_eq!(sector.to_string(), "DXB-ZAG");
/// assert_eq!(serde_json::to_string(&sector).unwrap(), "\"DXB-ZAG\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Sector {
    /// Departure airport IATA code.
    pub origin: String,
    /// Arrival airport IATA code.
    pub destination: String,
}

impl Sector {
    /// Creates a sector from two IATA codes, upper-casing them.
    ///
    /// Returns `None` unless both are three ASCII letters.
    pub fn new(origin: &str, destination: &str) -> Option<Self> {
        let origin = origin.trim().to_ascii_uppercase();
        let destination = destination.trim().to_ascii_uppercase();
        if is_airport_code(&origin) && is_airport_code(&destination) {
            Some(Self {
                origin,
                destination,
            })
        } else {
            None
        }
    }
}

/// Returns true for a three-letter IATA airport code.
pub fn is_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.origin, self.destination)
    }
}

impl From<Sector> for String {
    fn from(sector: Sector) -> Self {
        sector.to_string()
    }
}

impl TryFrom<String> for Sector {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .split_once('-')
            .and_then(|(origin, destination)| Sector::new(origin, destination))
            .ok_or_else(|| format!("invalid sector '{}', expected ORIGIN-DEST", value))
    }
}

/// One classified and calculated roster entry.
///
/// `duty_hours` and `flight_pay` are derived by the calculator; every
/// other field comes from the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyRecord {
    /// Identity, referenced by layover pairs.
    pub id: Uuid,
    /// Owning crew member.
    pub user_id: String,
    /// Calendar date of report.
    pub date: NaiveDate,
    /// Payroll period this duty counts toward.
    pub bucket: BucketMonth,
    /// Whether `bucket` was derived from `date` or overridden at import.
    pub bucket_source: BucketSource,
    /// The resolved duty type.
    pub duty_type: DutyType,
    /// The duty code that matched, for non-flight duties.
    #[serde(default)]
    pub duty_code: Option<String>,
    /// Pay policy attached to the matched code.
    #[serde(default)]
    pub pay_policy: PayPolicy,
    /// Flight numbers in roster order.
    #[serde(default)]
    pub flight_numbers: Vec<String>,
    /// Route segments in flying order.
    #[serde(default)]
    pub sectors: Vec<Sector>,
    /// Local report time.
    pub report_time: Option<NaiveTime>,
    /// Local debrief time.
    pub debrief_time: Option<NaiveTime>,
    /// True when debrief falls on the day after report.
    pub is_cross_day: bool,
    /// Duty length in decimal hours.
    pub duty_hours: Decimal,
    /// Pay earned by this duty alone.
    pub flight_pay: Decimal,
    /// Provenance.
    pub data_source: DataSource,
}

impl DutyRecord {
    /// First departure airport, if the duty has a route.
    pub fn origin(&self) -> Option<&str> {
        self.sectors.first().map(|s| s.origin.as_str())
    }

    /// Final arrival airport, if the duty has a route.
    pub fn destination(&self) -> Option<&str> {
        self.sectors.last().map(|s| s.destination.as_str())
    }

    /// Route as a single string, e.g. `DXB-ZAG-DXB`.
    pub fn route(&self) -> String {
        let mut airports: Vec<&str> = Vec::with_capacity(self.sectors.len() + 1);
        if let Some(origin) = self.origin() {
            airports.push(origin);
        }
        airports.extend(self.sectors.iter().map(|s| s.destination.as_str()));
        airports.join("-")
    }

    /// Returns true for a turnaround.
    pub fn is_turnaround(&self) -> bool {
        self.duty_type == DutyType::Turnaround
    }

    /// Returns true for a layover leg.
    pub fn is_layover(&self) -> bool {
        self.duty_type == DutyType::Layover
    }

    /// Returns true for airport standby.
    pub fn is_asby(&self) -> bool {
        self.duty_type == DutyType::Asby
    }

    /// Returns true for a layover leg that departs the home base.
    pub fn is_outbound(&self, home_base: &str) -> bool {
        self.is_layover() && self.origin() == Some(home_base)
    }

    /// Report as a full timestamp.
    pub fn report_datetime(&self) -> Option<NaiveDateTime> {
        self.report_time.map(|t| self.date.and_time(t))
    }

    /// Debrief as a full timestamp, on the next day for cross-day duties.
    pub fn debrief_datetime(&self) -> Option<NaiveDateTime> {
        self.debrief_time.map(|t| {
            let debrief = self.date.and_time(t);
            if self.is_cross_day {
                debrief + Duration::days(1)
            } else {
                debrief
            }
        })
    }
}
