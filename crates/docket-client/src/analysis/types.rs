use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct AnalysisFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// One historical upload of a document, as normalized from the tracker.
#[derive(Debug, Clone)]
pub struct UploadEvent {
    pub upload_id: String,
    pub document_type: String,
    pub source: String,
    pub uploaded_at: NaiveDate,
}

impl UploadEvent {
    pub fn pattern_key(&self) -> String {
        pattern_key(&self.document_type, &self.source)
    }
}

pub fn pattern_key(document_type: &str, source: &str) -> String {
    format!("{document_type}|{source}")
}

/// Inferred upload cadence for one `(document_type, source)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Frequency {
    Monthly,
    Quarterly,
    HalfYearly,
    Yearly,
    Irregular,
    Unknown,
}

impl Frequency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::HalfYearly => "half_yearly",
            Self::Yearly => "yearly",
            Self::Irregular => "irregular",
            Self::Unknown => "unknown",
        }
    }

    /// Canonical period length in days for periodic frequencies.
    pub const fn canonical_period_days(self) -> Option<f64> {
        match self {
            Self::Monthly => Some(30.0),
            Self::Quarterly => Some(90.0),
            Self::HalfYearly => Some(182.0),
            Self::Yearly => Some(365.0),
            Self::Irregular | Self::Unknown => None,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "monthly" => Self::Monthly,
            "quarterly" => Self::Quarterly,
            "half_yearly" => Self::HalfYearly,
            "yearly" => Self::Yearly,
            "irregular" => Self::Irregular,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stability {
    Stable,
    Changing,
    Volatile,
}

impl Stability {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Changing => "changing",
            Self::Volatile => "volatile",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "stable" => Self::Stable,
            "changing" => Self::Changing,
            _ => Self::Volatile,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Confidence {
    High,
    Medium,
    Low,
    Uncertain,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Uncertain => "uncertain",
        }
    }

    /// Only high/medium confidence records may reach the tax calendar.
    pub const fn is_calendar_worthy(self) -> bool {
        matches!(self, Self::High | Self::Medium)
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "high" => Self::High,
            "medium" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Uncertain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MissingStatus {
    Pending,
    Reminded,
    Uploaded,
    Dismissed,
}

impl MissingStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reminded => "reminded",
            Self::Uploaded => "uploaded",
            Self::Dismissed => "dismissed",
        }
    }

    /// Uploaded and dismissed records never re-enter reminder generation.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Uploaded | Self::Dismissed)
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "reminded" => Some(Self::Reminded),
            "uploaded" => Some(Self::Uploaded),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReminderType {
    Upcoming,
    Overdue,
    FollowUp,
    FinalNotice,
}

impl ReminderType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Overdue => "overdue",
            Self::FollowUp => "follow_up",
            Self::FinalNotice => "final_notice",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Human label for a document type key, for reminder and calendar text.
pub fn document_type_label(document_type: &str) -> String {
    match document_type {
        "bank_statement" => "bank statement".to_string(),
        "credit_card_statement" => "credit card statement".to_string(),
        "dividend_statement" => "dividend statement".to_string(),
        "payg_summary" => "PAYG payment summary".to_string(),
        "interest_statement" => "interest statement".to_string(),
        "rental_statement" => "rental statement".to_string(),
        other => other.replace('_', " "),
    }
}
