use chrono::{DateTime, FixedOffset};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advertisement")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub position: String,
    pub size: String,
    #[sea_orm(column_type = "Text")]
    pub code: String,
    pub is_active: bool,
    pub impressions: i64,
    pub clicks: i64,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `now` falls inside the optional `[start_date, end_date]` window.
    #[must_use]
    pub fn is_scheduled_at(&self, now: DateTime<FixedOffset>) -> bool {
        self.start_date.is_none_or(|start| start <= now)
            && self.end_date.is_none_or(|end| end >= now)
    }

    /// Click-through rate in percent, rounded to two decimals.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn click_through_rate(&self) -> f64 {
        if self.impressions <= 0 {
            return 0.0;
        }
        let ctr = self.clicks as f64 / self.impressions as f64 * 100.0;
        (ctr * 100.0).round() / 100.0
    }
}

/// Fixed set of placement slots an ad can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdPosition {
    Header,
    Sidebar,
    Content,
    Footer,
    Popup,
    Banner,
    Skyscraper,
}

impl AdPosition {
    /// Parse a position name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "HEADER" => Some(Self::Header),
            "SIDEBAR" => Some(Self::Sidebar),
            "CONTENT" => Some(Self::Content),
            "FOOTER" => Some(Self::Footer),
            "POPUP" => Some(Self::Popup),
            "BANNER" => Some(Self::Banner),
            "SKYSCRAPER" => Some(Self::Skyscraper),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Header => "HEADER",
            Self::Sidebar => "SIDEBAR",
            Self::Content => "CONTENT",
            Self::Footer => "FOOTER",
            Self::Popup => "POPUP",
            Self::Banner => "BANNER",
            Self::Skyscraper => "SKYSCRAPER",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn ad(start: Option<i64>, end: Option<i64>, impressions: i64, clicks: i64) -> Model {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Model {
            id: 1,
            name: "Leaderboard".to_string(),
            position: "HEADER".to_string(),
            size: "728x90".to_string(),
            code: "<div></div>".to_string(),
            is_active: true,
            impressions,
            clicks,
            start_date: start.map(|h| now + Duration::hours(h)),
            end_date: end.map(|h| now + Duration::hours(h)),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_schedule_window() {
        let now: DateTime<FixedOffset> = Utc::now().into();
        assert!(ad(None, None, 0, 0).is_scheduled_at(now));
        assert!(ad(Some(-1), Some(1), 0, 0).is_scheduled_at(now));
        assert!(!ad(Some(1), None, 0, 0).is_scheduled_at(now));
        assert!(!ad(None, Some(-1), 0, 0).is_scheduled_at(now));
    }

    #[test]
    fn test_click_through_rate() {
        assert!((ad(None, None, 0, 5).click_through_rate() - 0.0).abs() < f64::EPSILON);
        assert!((ad(None, None, 3, 1).click_through_rate() - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_position_parse() {
        assert_eq!(AdPosition::from_str("sidebar"), Some(AdPosition::Sidebar));
        assert_eq!(AdPosition::from_str("SKYSCRAPER"), Some(AdPosition::Skyscraper));
        assert_eq!(AdPosition::from_str("nowhere"), None);
        assert_eq!(AdPosition::Banner.as_str(), "BANNER");
    }
}
