//! Fundraisers and their status state machine.
//!
//! A fundraiser is a goal-amount campaign attached to a forum question. It
//! starts `open` and moves to `reached` once the donations recorded against it
//! sum to at least the goal. `reached` is terminal: later donations (and
//! overfunding) never move it back.

use chrono::{DateTime, Utc};
use sea_orm::{FromQueryResult, entity::prelude::*};

use crate::{EngineError, MoneyCents, ResultEngine, donations::DonationEntry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FundraiserStatus {
    Open,
    Reached,
}

impl FundraiserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Reached => "reached",
        }
    }

    /// Status after observing `total` donated against `goal`.
    ///
    /// Equality counts as reached.
    #[must_use]
    pub fn evaluate(self, goal: MoneyCents, total: MoneyCents) -> Self {
        match self {
            Self::Open if total >= goal => Self::Reached,
            status => status,
        }
    }
}

impl TryFrom<&str> for FundraiserStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "open" => Ok(Self::Open),
            "reached" => Ok(Self::Reached),
            other => Err(EngineError::InvalidInput(format!(
                "invalid fundraiser status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fundraiser {
    pub id: i32,
    pub question_id: i32,
    pub goal: MoneyCents,
    pub status: FundraiserStatus,
    pub created_at: DateTime<Utc>,
}

impl Fundraiser {
    /// Returns the status to move to if `total` triggers a transition.
    pub fn transition(&self, total: MoneyCents) -> Option<FundraiserStatus> {
        let next = self.status.evaluate(self.goal, total);
        (next != self.status).then_some(next)
    }
}

/// Goal, status and total donated, computed fresh from the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundraiserSummary {
    pub fundraiser_id: i32,
    pub goal: MoneyCents,
    pub status: FundraiserStatus,
    pub total_donated: MoneyCents,
}

impl FundraiserSummary {
    pub fn new(fundraiser: &Fundraiser, total_donated: MoneyCents) -> Self {
        Self {
            fundraiser_id: fundraiser.id,
            goal: fundraiser.goal,
            status: fundraiser.status,
            total_donated,
        }
    }
}

/// A fundraiser as listed: question title, author and aggregated total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundraiserOverview {
    pub fundraiser: Fundraiser,
    pub question_title: String,
    pub question_author: String,
    pub total_donated: MoneyCents,
}

/// A fundraiser with its question and the full donation list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundraiserDetail {
    pub fundraiser: Fundraiser,
    pub question_title: String,
    pub question_body: String,
    pub author_name: String,
    pub total_donated: MoneyCents,
    pub donations: Vec<DonationEntry>,
}

/// The fundraiser attached to a question, as shown on the question page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundraiserLedger {
    pub summary: FundraiserSummary,
    pub donations: Vec<DonationEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "fundraisers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub question_id: i32,
    pub goal_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Fundraiser {
    type Error = EngineError;

    fn try_from(value: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: value.id,
            question_id: value.question_id,
            goal: MoneyCents::new(value.goal_minor),
            status: FundraiserStatus::try_from(value.status.as_str())?,
            created_at: value.created_at,
        })
    }
}

/// Row shape of [`FUNDRAISER_SELECT`].
#[derive(Debug, FromQueryResult)]
pub(crate) struct FundraiserRow {
    pub id: i32,
    pub question_id: i32,
    pub goal_minor: i64,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub question_title: String,
    pub question_body: String,
    pub question_author: String,
    pub total_minor: i64,
}

/// Fundraiser joined with its question, the question author and the summed
/// ledger. Callers append an optional `WHERE` and then [`FUNDRAISER_GROUP_BY`].
pub(crate) const FUNDRAISER_SELECT: &str = "SELECT f.id, f.question_id, f.goal_minor, \
     f.status, f.created_at, q.title AS question_title, q.body AS question_body, \
     p.name AS question_author, COALESCE(SUM(d.amount_minor), 0) AS total_minor \
     FROM fundraisers f \
     JOIN forum_questions q ON q.id = f.question_id \
     JOIN people p ON p.id = q.author_id \
     LEFT JOIN donations d ON d.fundraiser_id = f.id";

pub(crate) const FUNDRAISER_GROUP_BY: &str =
    "GROUP BY f.id, f.question_id, f.goal_minor, f.status, f.created_at, q.title, q.body, p.name";

impl FundraiserRow {
    pub(crate) fn fundraiser(&self) -> ResultEngine<Fundraiser> {
        Ok(Fundraiser {
            id: self.id,
            question_id: self.question_id,
            goal: MoneyCents::new(self.goal_minor),
            status: FundraiserStatus::try_from(self.status.as_str())?,
            created_at: self.created_at,
        })
    }
}
