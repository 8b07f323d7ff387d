//! Donation ledger entries.
//!
//! Donations are append-only: once written they are never updated or
//! deleted, and every total is summed from them on demand.

use chrono::{DateTime, Utc};
use sea_orm::{FromQueryResult, entity::prelude::*};

use crate::{EngineError, FundraiserStatus, MoneyCents, ResultEngine};

/// Input for [`Engine::record_donation`](crate::Engine::record_donation).
#[derive(Clone, Debug)]
pub struct DonationCmd {
    pub fundraiser_id: i32,
    /// `None` records an anonymous donation.
    pub donor_id: Option<i32>,
    pub amount: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Donation {
    pub id: i32,
    pub fundraiser_id: i32,
    pub donor_id: Option<i32>,
    pub amount: MoneyCents,
    pub donated_at: DateTime<Utc>,
}

impl Donation {
    pub(crate) fn validate_amount(amount: MoneyCents) -> ResultEngine<()> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "donation amount must be > 0".to_string(),
            ));
        }
        if amount > MoneyCents::MAX {
            return Err(EngineError::InvalidAmount(format!(
                "donation amount must be at most {}",
                MoneyCents::MAX
            )));
        }
        Ok(())
    }
}

/// A ledger entry with the donor name resolved (`None` for anonymous).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationEntry {
    pub donation: Donation,
    pub donor_name: Option<String>,
}

/// Outcome of recording a donation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationRecorded {
    pub donation: Donation,
    pub total_donated: MoneyCents,
    /// Fundraiser status after the transition rule ran.
    pub status: FundraiserStatus,
    /// `true` when this donation moved the fundraiser to `reached`.
    pub transitioned: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "donations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub fundraiser_id: i32,
    pub donor_id: Option<i32>,
    pub amount_minor: i64,
    pub donated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Donation {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            fundraiser_id: value.fundraiser_id,
            donor_id: value.donor_id,
            amount: MoneyCents::new(value.amount_minor),
            donated_at: value.donated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
pub(crate) struct DonationRow {
    pub id: i32,
    pub fundraiser_id: i32,
    pub donor_id: Option<i32>,
    pub amount_minor: i64,
    pub donated_at: DateTimeUtc,
    pub donor_name: Option<String>,
}

/// Most recent first; id breaks ties between identical timestamps.
pub(crate) const DONATION_ENTRIES_SELECT: &str = "SELECT d.id, d.fundraiser_id, d.donor_id, \
     d.amount_minor, d.donated_at, p.name AS donor_name \
     FROM donations d \
     LEFT JOIN people p ON p.id = d.donor_id \
     WHERE d.fundraiser_id = ? \
     ORDER BY d.donated_at DESC, d.id DESC";

impl From<DonationRow> for DonationEntry {
    fn from(row: DonationRow) -> Self {
        Self {
            donation: Donation {
                id: row.id,
                fundraiser_id: row.fundraiser_id,
                donor_id: row.donor_id,
                amount: MoneyCents::new(row.amount_minor),
                donated_at: row.donated_at,
            },
            donor_name: row.donor_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(Donation::validate_amount(MoneyCents::new(1)).is_ok());
        assert_eq!(
            Donation::validate_amount(MoneyCents::ZERO),
            Err(EngineError::InvalidAmount(
                "donation amount must be > 0".to_string()
            ))
        );
        assert!(Donation::validate_amount(MoneyCents::new(-500)).is_err());
        assert!(Donation::validate_amount(MoneyCents::MAX).is_ok());
        assert_eq!(
            Donation::validate_amount(MoneyCents::new(MoneyCents::MAX.cents() + 1)),
            Err(EngineError::InvalidAmount(
                "donation amount must be at most 1000000000.00".to_string()
            ))
        );
    }
}
