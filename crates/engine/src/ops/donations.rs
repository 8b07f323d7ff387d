use chrono::Utc;
use sea_orm::{ActiveValue, ConnectionTrait, FromQueryResult, Statement, prelude::*};

use crate::{
    Donation, DonationCmd, DonationEntry, DonationRecorded, EngineError, MoneyCents, ResultEngine,
    donations::{self, DONATION_ENTRIES_SELECT, DonationRow},
};

use super::{
    Engine,
    fundraisers::{apply_transition, require_fundraiser, total_donated_in},
    people::require_person,
    with_tx,
};

impl Engine {
    /// Appends a donation to a fundraiser's ledger and runs the status
    /// transition rule.
    ///
    /// Existence checks, the ledger write, the fresh total and the status
    /// update commit together in one transaction, under the fundraiser's
    /// ledger lock. A rejected donation leaves no ledger entry.
    pub async fn record_donation(&self, cmd: DonationCmd) -> ResultEngine<DonationRecorded> {
        Donation::validate_amount(cmd.amount)?;
        require_fundraiser(&self.database, cmd.fundraiser_id).await?;

        let _guard = self.ledger_locks.acquire(cmd.fundraiser_id).await;
        with_tx!(self, |db_tx| {
            let fundraiser = require_fundraiser(&db_tx, cmd.fundraiser_id).await?;
            if let Some(donor_id) = cmd.donor_id {
                require_person(&db_tx, donor_id).await?;
            }

            let total = total_donated_in(&db_tx, fundraiser.id)
                .await?
                .checked_add(cmd.amount)
                .ok_or_else(|| {
                    EngineError::InvalidAmount(format!(
                        "total donated to fundraiser {} would overflow",
                        fundraiser.id
                    ))
                })?;

            let model = donations::ActiveModel {
                fundraiser_id: ActiveValue::Set(fundraiser.id),
                donor_id: ActiveValue::Set(cmd.donor_id),
                amount_minor: ActiveValue::Set(cmd.amount.cents()),
                donated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            let (status, transitioned) = match fundraiser.transition(total) {
                Some(next) => {
                    apply_transition(&db_tx, &fundraiser, next).await?;
                    (next, true)
                }
                None => (fundraiser.status, false),
            };

            Ok(DonationRecorded {
                donation: Donation::from(model),
                total_donated: total,
                status,
                transitioned,
            })
        })
    }

    /// Sum of all donations to a fundraiser; `0` when there are none.
    pub async fn total_donated(&self, fundraiser_id: i32) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            require_fundraiser(&db_tx, fundraiser_id).await?;
            total_donated_in(&db_tx, fundraiser_id).await
        })
    }

    /// The fundraiser's ledger, most recent donation first.
    pub async fn donations(&self, fundraiser_id: i32) -> ResultEngine<Vec<DonationEntry>> {
        with_tx!(self, |db_tx| {
            require_fundraiser(&db_tx, fundraiser_id).await?;
            donation_entries(&db_tx, fundraiser_id).await
        })
    }
}

pub(super) async fn donation_entries<C: ConnectionTrait>(
    db: &C,
    fundraiser_id: i32,
) -> ResultEngine<Vec<DonationEntry>> {
    let rows = DonationRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        DONATION_ENTRIES_SELECT,
        vec![fundraiser_id.into()],
    ))
    .all(db)
    .await?;
    Ok(rows.into_iter().map(DonationEntry::from).collect())
}
