use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, FromQueryResult, QueryFilter, QueryOrder, Statement, prelude::*,
    sea_query::{Expr, Func},
};

use crate::{
    EngineError, Fundraiser, FundraiserLedger, FundraiserSummary, QuestionDetails, QuestionView,
    ResultEngine, Topic,
    forum_questions::{self, QUESTION_VIEW_SELECT, QuestionRow},
    forum_topics, fundraisers,
};

use super::{
    Engine, donations::donation_entries, fundraisers::total_donated_in, normalize_optional_text,
    normalize_required_text, people::require_person, with_tx,
};

impl Engine {
    /// Adds a forum topic. Topic names are unique, ignoring case.
    pub async fn new_topic(&self, name: &str, description: Option<&str>) -> ResultEngine<Topic> {
        let name = normalize_required_text(name, "topic name")?;
        let description = normalize_optional_text(description);
        with_tx!(self, |db_tx| {
            let exists = forum_topics::Entity::find()
                .filter(
                    Expr::expr(Func::lower(Expr::col(forum_topics::Column::Name)))
                        .eq(name.to_lowercase()),
                )
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(name));
            }

            let model = forum_topics::ActiveModel {
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(description),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            Ok(Topic::from(model))
        })
    }

    /// Returns every topic, ordered by name.
    pub async fn topics(&self) -> ResultEngine<Vec<Topic>> {
        let models = forum_topics::Entity::find()
            .order_by_asc(forum_topics::Column::Name)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Topic::from).collect())
    }

    /// Posts a question on behalf of `author_id`.
    pub async fn new_question(
        &self,
        author_id: i32,
        topic_id: Option<i32>,
        title: &str,
        body: &str,
    ) -> ResultEngine<QuestionView> {
        let title = normalize_required_text(title, "title")?;
        let body = body.trim().to_string();
        with_tx!(self, |db_tx| {
            require_person(&db_tx, author_id).await?;
            if let Some(topic_id) = topic_id {
                forum_topics::Entity::find_by_id(topic_id)
                    .one(&db_tx)
                    .await?
                    .ok_or_else(|| EngineError::KeyNotFound(format!("topic {topic_id}")))?;
            }

            let model = forum_questions::ActiveModel {
                author_id: ActiveValue::Set(author_id),
                topic_id: ActiveValue::Set(topic_id),
                title: ActiveValue::Set(title),
                body: ActiveValue::Set(body),
                created_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;

            question_view(&db_tx, model.id).await
        })
    }

    /// Returns every question, newest first.
    pub async fn questions(&self) -> ResultEngine<Vec<QuestionView>> {
        let sql = format!("{QUESTION_VIEW_SELECT} ORDER BY q.created_at DESC, q.id DESC");
        let rows = QuestionRow::find_by_statement(Statement::from_string(
            self.database.get_database_backend(),
            sql,
        ))
        .all(&self.database)
        .await?;
        Ok(rows.into_iter().map(QuestionView::from).collect())
    }

    /// Returns a question together with its fundraiser (if any), the
    /// fundraiser's total and its donations.
    pub async fn question_details(&self, question_id: i32) -> ResultEngine<QuestionDetails> {
        with_tx!(self, |db_tx| {
            let question = question_view(&db_tx, question_id).await?;

            let fundraiser = match fundraisers::Entity::find()
                .filter(fundraisers::Column::QuestionId.eq(question_id))
                .one(&db_tx)
                .await?
            {
                Some(model) => {
                    let fundraiser = Fundraiser::try_from(model)?;
                    let total = total_donated_in(&db_tx, fundraiser.id).await?;
                    let donations = donation_entries(&db_tx, fundraiser.id).await?;
                    Some(FundraiserLedger {
                        summary: FundraiserSummary::new(&fundraiser, total),
                        donations,
                    })
                }
                None => None,
            };

            Ok(QuestionDetails {
                question,
                fundraiser,
            })
        })
    }
}

async fn question_view<C: ConnectionTrait>(db: &C, question_id: i32) -> ResultEngine<QuestionView> {
    let sql = format!("{QUESTION_VIEW_SELECT} WHERE q.id = ?");
    QuestionRow::find_by_statement(Statement::from_sql_and_values(
        db.get_database_backend(),
        &sql,
        vec![question_id.into()],
    ))
    .one(db)
    .await?
    .map(QuestionView::from)
    .ok_or_else(|| EngineError::KeyNotFound(format!("question {question_id}")))
}
