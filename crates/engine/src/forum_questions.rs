//! Forum questions. A question is what a fundraiser hangs off.

use chrono::{DateTime, Utc};
use sea_orm::{FromQueryResult, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: i32,
    pub author_id: i32,
    pub topic_id: Option<i32>,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// A question with its author and topic names resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionView {
    pub question: Question,
    pub author_name: String,
    pub topic_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "forum_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub author_id: i32,
    pub topic_id: Option<i32>,
    pub title: String,
    pub body: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Question {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            author_id: value.author_id,
            topic_id: value.topic_id,
            title: value.title,
            body: value.body,
            created_at: value.created_at,
        }
    }
}

/// Row shape of the question + author + topic join.
#[derive(Debug, FromQueryResult)]
pub(crate) struct QuestionRow {
    pub id: i32,
    pub author_id: i32,
    pub topic_id: Option<i32>,
    pub title: String,
    pub body: String,
    pub created_at: DateTimeUtc,
    pub author_name: String,
    pub topic_name: Option<String>,
}

pub(crate) const QUESTION_VIEW_SELECT: &str = "SELECT q.id, q.author_id, q.topic_id, q.title, \
     q.body, q.created_at, p.name AS author_name, t.name AS topic_name \
     FROM forum_questions q \
     JOIN people p ON p.id = q.author_id \
     LEFT JOIN forum_topics t ON t.id = q.topic_id";

impl From<QuestionRow> for QuestionView {
    fn from(row: QuestionRow) -> Self {
        Self {
            question: Question {
                id: row.id,
                author_id: row.author_id,
                topic_id: row.topic_id,
                title: row.title,
                body: row.body,
                created_at: row.created_at,
            },
            author_name: row.author_name,
            topic_name: row.topic_name,
        }
    }
}

/// A question page: the question plus its fundraiser, if one was opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionDetails {
    pub question: QuestionView,
    pub fundraiser: Option<crate::FundraiserLedger>,
}
