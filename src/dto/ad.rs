use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::bounded_text;
use crate::entities::{AdPosition, advertisement};
use crate::error::AppError;

// ============ Request DTOs ============

/// POST /ads and PUT /ads/{id}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdRequest {
    pub name: String,
    pub position: String,
    pub size: String,
    pub code: String,
    pub is_active: Option<bool>,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
}

/// An ad request that passed field validation.
#[derive(Debug, Clone)]
pub struct ValidAd {
    pub name: String,
    pub position: AdPosition,
    pub size: String,
    pub code: String,
    pub is_active: bool,
    pub start_date: Option<DateTime<FixedOffset>>,
    pub end_date: Option<DateTime<FixedOffset>>,
}

impl AdRequest {
    /// # Errors
    ///
    /// Returns `VALIDATION_ERROR` on the first invalid field.
    pub fn validate(self) -> Result<ValidAd, AppError> {
        let position = AdPosition::from_str(&self.position)
            .ok_or_else(|| AppError::validation("Invalid ad position"))?;
        if !is_dimensions(&self.size) {
            return Err(AppError::validation(
                "Size must be in format WIDTHxHEIGHT (e.g., 300x250)",
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(AppError::validation("End date must not precede start date"));
            }
        }
        Ok(ValidAd {
            name: bounded_text("Name", &self.name, 1, 100)?,
            position,
            size: self.size,
            code: bounded_text("Ad code", &self.code, 1, usize::MAX)
                .map_err(|_| AppError::validation("Ad code is required"))?,
            is_active: self.is_active.unwrap_or(true),
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// `WIDTHxHEIGHT` with both sides made of ASCII digits.
fn is_dimensions(size: &str) -> bool {
    size.split_once('x').is_some_and(|(w, h)| {
        !w.is_empty()
            && !h.is_empty()
            && w.bytes().all(|b| b.is_ascii_digit())
            && h.bytes().all(|b| b.is_ascii_digit())
    })
}

// ============ Response DTOs ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub size: String,
    pub code: String,
    pub is_active: bool,
    pub impressions: i64,
    pub clicks: i64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<advertisement::Model> for AdResponse {
    fn from(ad: advertisement::Model) -> Self {
        Self {
            id: ad.id,
            name: ad.name,
            position: ad.position,
            size: ad.size,
            code: ad.code,
            is_active: ad.is_active,
            impressions: ad.impressions,
            clicks: ad.clicks,
            start_date: ad.start_date.map(|d| d.to_rfc3339()),
            end_date: ad.end_date.map(|d| d.to_rfc3339()),
            created_at: ad.created_at.to_rfc3339(),
            updated_at: ad.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdMutationResponse {
    pub message: String,
    pub ad: AdResponse,
}

/// GET /ads/{id}/stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdStatsResponse {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub impressions: i64,
    pub clicks: i64,
    /// Click-through rate in percent
    pub ctr: f64,
    pub is_active: bool,
}

impl From<advertisement::Model> for AdStatsResponse {
    fn from(ad: advertisement::Model) -> Self {
        let ctr = ad.click_through_rate();
        Self {
            id: ad.id,
            name: ad.name,
            position: ad.position,
            impressions: ad.impressions,
            clicks: ad.clicks,
            ctr,
            is_active: ad.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(size: &str, position: &str) -> AdRequest {
        AdRequest {
            name: "Leaderboard".to_string(),
            position: position.to_string(),
            size: size.to_string(),
            code: "<div>ad</div>".to_string(),
            is_active: None,
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_dimensions() {
        assert!(is_dimensions("300x250"));
        assert!(!is_dimensions("300x"));
        assert!(!is_dimensions("x250"));
        assert!(!is_dimensions("300X250"));
        assert!(!is_dimensions("big"));
    }

    #[test]
    fn test_validate() {
        let ad = request("728x90", "header").validate().ok();
        assert_eq!(ad.as_ref().map(|a| a.position), Some(AdPosition::Header));
        assert_eq!(ad.map(|a| a.is_active), Some(true));
        assert!(request("728x90", "nowhere").validate().is_err());
        assert!(request("wide", "HEADER").validate().is_err());

        let mut blank = request("728x90", "HEADER");
        blank.code = "   ".to_string();
        assert!(blank.validate().is_err());
    }
}
