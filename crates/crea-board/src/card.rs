//! Board rendering
//!
//! Turns store contents into display cards. The exporter only ever sees
//! cards, never the store itself.

use crate::types::{Asset, AssetKind, AssetType};
use chrono::{DateTime, Utc};
use crea_core::AssetId;
use serde::Serialize;

/// What a card shows below its header
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CardBody {
    Text { text: String },
    Image { source: String },
    Verdict {
        sensitive: bool,
        reason: String,
        text: String,
    },
}

/// One rendered board card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub asset_id: AssetId,
    pub asset_type: AssetType,
    pub title: String,
    pub age: String,
    pub body: CardBody,
}

impl Card {
    pub fn from_asset(asset: &Asset, now: DateTime<Utc>) -> Self {
        let body = match asset.kind() {
            AssetKind::Visual => CardBody::Image {
                source: asset.content().to_string(),
            },
            AssetKind::Moderation { meta } => CardBody::Verdict {
                sensitive: meta.is_sensitive,
                reason: meta.reason.clone(),
                text: asset.content().to_string(),
            },
            AssetKind::Copy | AssetKind::BrandVoice => CardBody::Text {
                text: asset.content().to_string(),
            },
        };

        Self {
            asset_id: asset.id(),
            asset_type: asset.asset_type(),
            title: asset.asset_type().label().to_string(),
            age: format_age(asset.created_at(), now),
            body,
        }
    }

    /// Text offered by the card's copy action; visuals have none
    pub fn copyable_text(&self) -> Option<&str> {
        match &self.body {
            CardBody::Text { text } => Some(text),
            CardBody::Verdict { text, .. } => Some(text),
            CardBody::Image { .. } => None,
        }
    }

    /// Badge label for moderation cards
    pub fn badge(&self) -> Option<&'static str> {
        match &self.body {
            CardBody::Verdict { sensitive: true, .. } => Some("Sensitive"),
            CardBody::Verdict { sensitive: false, .. } => Some("Okay"),
            _ => None,
        }
    }
}

/// Render assets in the order given (the store yields most recent first)
pub fn render_board<'a, I>(assets: I, now: DateTime<Utc>) -> Vec<Card>
where
    I: IntoIterator<Item = &'a Asset>,
{
    assets
        .into_iter()
        .map(|asset| Card::from_asset(asset, now))
        .collect()
}

const MINUTES_IN_DAY: i64 = 1440;
const MINUTES_IN_MONTH: i64 = 43200;
const MINUTES_IN_TWO_MONTHS: i64 = 86400;

/// Human relative age, e.g. "5 minutes ago" or "about 2 hours ago"
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    let distance = describe_distance(seconds.abs());
    if seconds < 0 {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

fn describe_distance(seconds: i64) -> String {
    let minutes = (seconds as f64 / 60.0).round() as i64;

    if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 2 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        format!("about {} hours", hours)
    } else if minutes < 2520 {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        format!("{} days", days)
    } else if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        if months <= 1 {
            "about 1 month".to_string()
        } else {
            format!("about {} months", months)
        }
    } else {
        let months = minutes / MINUTES_IN_MONTH;
        if months < 12 {
            return format!("{} months", months);
        }
        let years = months / 12;
        let remainder = months % 12;
        let plural = |n: i64| if n == 1 { "year" } else { "years" };
        if remainder < 3 {
            format!("about {} {}", years, plural(years))
        } else if remainder < 9 {
            format!("over {} {}", years, plural(years))
        } else {
            format!("almost {} {}", years + 1, plural(years + 1))
        }
    }
}
