use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, FromQueryResult, QueryFilter, Statement, prelude::*,
    sea_query::Expr,
};

use crate::{
    EngineError, Fundraiser, FundraiserDetail, FundraiserOverview, FundraiserStatus,
    FundraiserSummary, MoneyCents, ResultEngine, forum_questions,
    fundraisers::{self, FUNDRAISER_GROUP_BY, FUNDRAISER_SELECT, FundraiserRow},
};

use super::{Engine, donations::donation_entries, with_tx};

impl Engine {
    /// Opens a fundraiser on a forum question.
    ///
    /// The fundraiser starts `open`. A question carries at most one
    /// fundraiser.
    pub async fn new_fundraiser(
        &self,
        question_id: i32,
        goal: MoneyCents,
    ) -> ResultEngine<Fundraiser> {
        if !goal.is_positive() {
            return Err(EngineError::InvalidAmount(
                "goal amount must be > 0".to_string(),
            ));
        }
        if goal > MoneyCents::MAX {
            return Err(EngineError::InvalidAmount(format!(
                "goal amount must be at most {}",
                MoneyCents::MAX
            )));
        }

        with_tx!(self, |db_tx| {
            forum_questions::Entity::find_by_id(question_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound(format!("question {question_id}")))?;

            let exists = fundraisers::Entity::find()
                .filter(fundraisers::Column::QuestionId.eq(question_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(format!(
                    "fundraiser for question {question_id}"
                )));
            }

            let model = fundraisers::ActiveModel {
                question_id: ActiveValue::Set(question_id),
                goal_minor: ActiveValue::Set(goal.cents()),
                status: ActiveValue::Set(FundraiserStatus::Open.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            Fundraiser::try_from(model)
        })
    }

    /// Returns every fundraiser with its question and aggregated total,
    /// newest first.
    pub async fn fundraisers(&self) -> ResultEngine<Vec<FundraiserOverview>> {
        let sql = format!(
            "{FUNDRAISER_SELECT} {FUNDRAISER_GROUP_BY} ORDER BY f.created_at DESC, f.id DESC"
        );
        let rows = FundraiserRow::find_by_statement(Statement::from_string(
            self.database.get_database_backend(),
            sql,
        ))
        .all(&self.database)
        .await?;

        rows.into_iter()
            .map(|row| -> ResultEngine<FundraiserOverview> {
                Ok(FundraiserOverview {
                    fundraiser: row.fundraiser()?,
                    total_donated: MoneyCents::new(row.total_minor),
                    question_title: row.question_title,
                    question_author: row.question_author,
                })
            })
            .collect()
    }

    /// Returns a fundraiser with its question, total and full donation list.
    ///
    /// Total and donations are read in the same transaction, so they always
    /// agree.
    pub async fn fundraiser_detail(&self, fundraiser_id: i32) -> ResultEngine<FundraiserDetail> {
        with_tx!(self, |db_tx| {
            let sql = format!("{FUNDRAISER_SELECT} WHERE f.id = ? {FUNDRAISER_GROUP_BY}");
            let row = FundraiserRow::find_by_statement(Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                &sql,
                vec![fundraiser_id.into()],
            ))
            .one(&db_tx)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("fundraiser {fundraiser_id}")))?;

            let donations = donation_entries(&db_tx, fundraiser_id).await?;

            Ok(FundraiserDetail {
                fundraiser: row.fundraiser()?,
                total_donated: MoneyCents::new(row.total_minor),
                question_title: row.question_title,
                question_body: row.question_body,
                author_name: row.question_author,
                donations,
            })
        })
    }

    /// Returns goal, status and a freshly summed total.
    ///
    /// If the stored status lags behind the ledger (`open` while the total
    /// already meets the goal) the transition is applied here.
    pub async fn fundraiser_summary(&self, fundraiser_id: i32) -> ResultEngine<FundraiserSummary> {
        require_fundraiser(&self.database, fundraiser_id).await?;

        let _guard = self.ledger_locks.acquire(fundraiser_id).await;
        with_tx!(self, |db_tx| {
            let mut fundraiser = require_fundraiser(&db_tx, fundraiser_id).await?;
            let total = total_donated_in(&db_tx, fundraiser_id).await?;
            if let Some(next) = fundraiser.transition(total) {
                apply_transition(&db_tx, &fundraiser, next).await?;
                fundraiser.status = next;
            }
            Ok(FundraiserSummary::new(&fundraiser, total))
        })
    }
}

pub(super) async fn require_fundraiser<C: ConnectionTrait>(
    db: &C,
    fundraiser_id: i32,
) -> ResultEngine<Fundraiser> {
    let model = fundraisers::Entity::find_by_id(fundraiser_id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("fundraiser {fundraiser_id}")))?;
    Fundraiser::try_from(model)
}

/// Sum of the ledger for one fundraiser; `0` when it has no donations.
pub(super) async fn total_donated_in<C: ConnectionTrait>(
    db: &C,
    fundraiser_id: i32,
) -> ResultEngine<MoneyCents> {
    let stmt = Statement::from_sql_and_values(
        db.get_database_backend(),
        "SELECT COALESCE(SUM(amount_minor), 0) AS total \
         FROM donations \
         WHERE fundraiser_id = ?",
        vec![fundraiser_id.into()],
    );
    let total = match db.query_one(stmt).await? {
        Some(row) => row.try_get::<i64>("", "total")?,
        None => 0,
    };
    Ok(MoneyCents::new(total))
}

/// Persists a status transition.
///
/// The update only matches while the row still holds the status the
/// transition started from, so it never reverts `reached` and running it twice
/// is a no-op.
pub(super) async fn apply_transition<C: ConnectionTrait>(
    db: &C,
    fundraiser: &Fundraiser,
    next: FundraiserStatus,
) -> ResultEngine<()> {
    fundraisers::Entity::update_many()
        .col_expr(fundraisers::Column::Status, Expr::value(next.as_str()))
        .filter(fundraisers::Column::Id.eq(fundraiser.id))
        .filter(fundraisers::Column::Status.eq(fundraiser.status.as_str()))
        .exec(db)
        .await?;
    Ok(())
}
