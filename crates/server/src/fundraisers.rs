//! Fundraiser API endpoints

use api_types::fundraiser::{
    Fundraiser, FundraiserDetail, FundraiserInfo, FundraiserListItem, FundraiserNew,
    FundraiserStatus, FundraiserSummary,
};
use axum::{Json, extract::State, http::StatusCode};
use engine::MoneyCents;

use crate::{JsonBody, PathParam, ServerError, donations::donation_view, server::ServerState};

pub(crate) fn status_view(status: engine::FundraiserStatus) -> FundraiserStatus {
    match status {
        engine::FundraiserStatus::Open => FundraiserStatus::Open,
        engine::FundraiserStatus::Reached => FundraiserStatus::Reached,
    }
}

fn fundraiser_view(fundraiser: &engine::Fundraiser) -> Fundraiser {
    Fundraiser {
        fundraiser_id: fundraiser.id,
        question_id: fundraiser.question_id,
        goal_amount: fundraiser.goal.to_string(),
        status: status_view(fundraiser.status),
        created_at: fundraiser.created_at,
    }
}

/// Handle requests for opening a fundraiser on a question
pub async fn fundraiser_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<FundraiserNew>,
) -> Result<(StatusCode, Json<Fundraiser>), ServerError> {
    let goal: MoneyCents = payload.goal_amount.as_decimal().parse()?;
    let fundraiser = state
        .engine
        .new_fundraiser(payload.question_id, goal)
        .await?;

    tracing::info!(
        "fundraiser {} opened on question {} with goal {}",
        fundraiser.id,
        fundraiser.question_id,
        fundraiser.goal
    );

    Ok((StatusCode::CREATED, Json(fundraiser_view(&fundraiser))))
}

/// Handle requests for listing fundraisers
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<FundraiserListItem>>, ServerError> {
    let fundraisers = state.engine.fundraisers().await?;

    Ok(Json(
        fundraisers
            .into_iter()
            .map(|overview| FundraiserListItem {
                fundraiser_id: overview.fundraiser.id,
                goal_amount: overview.fundraiser.goal.to_string(),
                status: status_view(overview.fundraiser.status),
                created_at: overview.fundraiser.created_at,
                question_title: overview.question_title,
                question_author: overview.question_author,
                total_donated: overview.total_donated.to_string(),
            })
            .collect(),
    ))
}

pub async fn detail(
    State(state): State<ServerState>,
    PathParam(fundraiser_id): PathParam<i32>,
) -> Result<Json<FundraiserDetail>, ServerError> {
    let detail = state.engine.fundraiser_detail(fundraiser_id).await?;
    let fundraiser = &detail.fundraiser;

    Ok(Json(FundraiserDetail {
        fundraiser: FundraiserInfo {
            fundraiser_id: fundraiser.id,
            question_id: fundraiser.question_id,
            goal_amount: fundraiser.goal.to_string(),
            status: status_view(fundraiser.status),
            created_at: fundraiser.created_at,
            title: detail.question_title,
            body: detail.question_body,
            author_name: detail.author_name,
        },
        total_donated: detail.total_donated.to_string(),
        donations: detail.donations.into_iter().map(donation_view).collect(),
    }))
}

pub async fn summary(
    State(state): State<ServerState>,
    PathParam(fundraiser_id): PathParam<i32>,
) -> Result<Json<FundraiserSummary>, ServerError> {
    let summary = state.engine.fundraiser_summary(fundraiser_id).await?;

    Ok(Json(FundraiserSummary {
        fundraiser_id: summary.fundraiser_id,
        goal_amount: summary.goal.to_string(),
        status: status_view(summary.status),
        total_donated: summary.total_donated.to_string(),
    }))
}
