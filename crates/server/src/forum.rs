//! Forum topics and questions API endpoints

use api_types::forum::{
    Question, QuestionDetails, QuestionFundraiser, QuestionNew, Topic, TopicNew,
};
use axum::{Json, extract::State, http::StatusCode};
use engine::QuestionView;

use crate::{
    JsonBody, PathParam, ServerError, donations::donation_view, fundraisers::status_view,
    server::ServerState,
};

fn topic_view(topic: engine::Topic) -> Topic {
    Topic {
        topic_id: topic.id,
        topic_name: topic.name,
        description: topic.description,
    }
}

fn question_view(view: QuestionView) -> Question {
    Question {
        question_id: view.question.id,
        author_id: view.question.author_id,
        topic_id: view.question.topic_id,
        title: view.question.title,
        body: view.question.body,
        created_at: view.question.created_at,
        author_name: view.author_name,
        topic_name: view.topic_name,
    }
}

pub async fn topic_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<TopicNew>,
) -> Result<(StatusCode, Json<Topic>), ServerError> {
    let topic = state
        .engine
        .new_topic(&payload.topic_name, payload.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(topic_view(topic))))
}

pub async fn topics(State(state): State<ServerState>) -> Result<Json<Vec<Topic>>, ServerError> {
    let topics = state.engine.topics().await?;
    Ok(Json(topics.into_iter().map(topic_view).collect()))
}

pub async fn question_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<QuestionNew>,
) -> Result<(StatusCode, Json<Question>), ServerError> {
    let question = state
        .engine
        .new_question(
            payload.author_id,
            payload.topic_id,
            &payload.title,
            &payload.body,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(question_view(question))))
}

pub async fn questions(
    State(state): State<ServerState>,
) -> Result<Json<Vec<Question>>, ServerError> {
    let questions = state.engine.questions().await?;
    Ok(Json(questions.into_iter().map(question_view).collect()))
}

/// Handle requests for a question page: the question plus its fundraiser
/// ledger, `null` when no fundraiser was opened.
pub async fn question_details(
    State(state): State<ServerState>,
    PathParam(question_id): PathParam<i32>,
) -> Result<Json<QuestionDetails>, ServerError> {
    let details = state.engine.question_details(question_id).await?;

    let fundraiser = details.fundraiser.map(|ledger| QuestionFundraiser {
        fundraiser_id: ledger.summary.fundraiser_id,
        goal_amount: ledger.summary.goal.to_string(),
        status: status_view(ledger.summary.status),
        total_donated: ledger.summary.total_donated.to_string(),
        donations: ledger.donations.into_iter().map(donation_view).collect(),
    });

    Ok(Json(QuestionDetails {
        question: question_view(details.question),
        fundraiser,
    }))
}
