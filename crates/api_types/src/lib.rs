//! JSON request and response bodies of the Bazaar HTTP API.
//!
//! Request bodies reject unknown fields. Money goes out as a decimal string
//! with two fractional digits and comes in as [`Amount`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A monetary amount as sent by clients: a JSON number (`40`, `12.5`) or a
/// decimal string (`"12.50"`, `"12,50"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// The amount as decimal text, ready to be parsed into cents.
    pub fn as_decimal(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text.clone(),
        }
    }
}

pub mod person {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct PersonNew {
        pub name: String,
        pub phone: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Person {
        pub id: i32,
        pub name: String,
        pub phone: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod forum {
    use super::*;

    use crate::fundraiser::{DonationView, FundraiserStatus};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct TopicNew {
        pub topic_name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Topic {
        pub topic_id: i32,
        pub topic_name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct QuestionNew {
        pub author_id: i32,
        pub topic_id: Option<i32>,
        pub title: String,
        #[serde(default)]
        pub body: String,
    }

    /// A question with author and topic names resolved.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Question {
        pub question_id: i32,
        pub author_id: i32,
        pub topic_id: Option<i32>,
        pub title: String,
        pub body: String,
        pub created_at: DateTime<Utc>,
        pub author_name: String,
        pub topic_name: Option<String>,
    }

    /// Fundraiser block of a question page.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuestionFundraiser {
        pub fundraiser_id: i32,
        pub goal_amount: String,
        pub status: FundraiserStatus,
        pub total_donated: String,
        pub donations: Vec<DonationView>,
    }

    /// Question page: the question fields plus its fundraiser, `null` when
    /// none was opened.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct QuestionDetails {
        #[serde(flatten)]
        pub question: Question,
        pub fundraiser: Option<QuestionFundraiser>,
    }
}

pub mod fundraiser {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum FundraiserStatus {
        Open,
        Reached,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct FundraiserNew {
        pub question_id: i32,
        pub goal_amount: Amount,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Fundraiser {
        pub fundraiser_id: i32,
        pub question_id: i32,
        pub goal_amount: String,
        pub status: FundraiserStatus,
        pub created_at: DateTime<Utc>,
    }

    /// Entry of `GET /fundraiser`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundraiserListItem {
        pub fundraiser_id: i32,
        pub goal_amount: String,
        pub status: FundraiserStatus,
        pub created_at: DateTime<Utc>,
        pub question_title: String,
        pub question_author: String,
        pub total_donated: String,
    }

    /// Fundraiser fields joined with its question.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundraiserInfo {
        pub fundraiser_id: i32,
        pub question_id: i32,
        pub goal_amount: String,
        pub status: FundraiserStatus,
        pub created_at: DateTime<Utc>,
        pub title: String,
        pub body: String,
        pub author_name: String,
    }

    /// Body of `GET /fundraiser/{id}`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundraiserDetail {
        pub fundraiser: FundraiserInfo,
        pub total_donated: String,
        pub donations: Vec<DonationView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FundraiserSummary {
        pub fundraiser_id: i32,
        pub goal_amount: String,
        pub status: FundraiserStatus,
        pub total_donated: String,
    }

    /// Ledger entry as listed; `donor_name` is `null` for anonymous donations.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct DonationView {
        pub donation_id: i32,
        pub amount: String,
        pub donated_at: DateTime<Utc>,
        pub donor_name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct DonationNew {
        pub fundraiser_id: i32,
        /// Omit (or send `null`) for an anonymous donation.
        pub donor_id: Option<i32>,
        pub amount: Amount,
    }

    /// The created ledger entry, as returned by `POST /donation`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Donation {
        pub donation_id: i32,
        pub fundraiser_id: i32,
        pub donor_id: Option<i32>,
        pub amount: String,
        pub donated_at: DateTime<Utc>,
    }
}

#[cfg(test)]
mod tests {
    use super::fundraiser::{DonationNew, FundraiserNew};
    use super::*;

    #[test]
    fn amount_accepts_number_or_text() {
        let body: DonationNew =
            serde_json::from_str(r#"{"fundraiser_id": 1, "amount": 12.5}"#).unwrap();
        assert_eq!(body.amount.as_decimal(), "12.5");
        assert_eq!(body.donor_id, None);

        let body: DonationNew =
            serde_json::from_str(r#"{"fundraiser_id": 1, "donor_id": 3, "amount": "40,00"}"#)
                .unwrap();
        assert_eq!(body.amount.as_decimal(), "40,00");
        assert_eq!(body.donor_id, Some(3));
    }

    #[test]
    fn request_bodies_reject_unknown_fields() {
        let err = serde_json::from_str::<FundraiserNew>(
            r#"{"question_id": 1, "goal_amount": 100, "status": "reached"}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn request_bodies_require_fields() {
        assert!(serde_json::from_str::<DonationNew>(r#"{"fundraiser_id": 1}"#).is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&fundraiser::FundraiserStatus::Reached).unwrap();
        assert_eq!(json, r#""reached""#);
    }
}
