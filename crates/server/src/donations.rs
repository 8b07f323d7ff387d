//! Donation API endpoints

use api_types::fundraiser::{Donation, DonationNew, DonationView};
use axum::{Json, extract::State, http::StatusCode};
use engine::{DonationCmd, DonationEntry, MoneyCents};

use crate::{JsonBody, ServerError, server::ServerState};

pub(crate) fn donation_view(entry: DonationEntry) -> DonationView {
    DonationView {
        donation_id: entry.donation.id,
        amount: entry.donation.amount.to_string(),
        donated_at: entry.donation.donated_at,
        donor_name: entry.donor_name,
    }
}

/// Handle requests for recording a donation
///
/// Answers with the created ledger entry, not the fundraiser.
pub async fn donation_new(
    State(state): State<ServerState>,
    JsonBody(payload): JsonBody<DonationNew>,
) -> Result<(StatusCode, Json<Donation>), ServerError> {
    let amount: MoneyCents = payload.amount.as_decimal().parse()?;
    let recorded = state
        .engine
        .record_donation(DonationCmd {
            fundraiser_id: payload.fundraiser_id,
            donor_id: payload.donor_id,
            amount,
        })
        .await?;

    if recorded.transitioned {
        tracing::info!(
            "fundraiser {} reached its goal with {} donated",
            recorded.donation.fundraiser_id,
            recorded.total_donated
        );
    }

    let donation = recorded.donation;
    Ok((
        StatusCode::CREATED,
        Json(Donation {
            donation_id: donation.id,
            fundraiser_id: donation.fundraiser_id,
            donor_id: donation.donor_id,
            amount: donation.amount.to_string(),
            donated_at: donation.donated_at,
        }),
    ))
}
