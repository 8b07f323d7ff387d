//! Fundraiser and donation ledger for the Bazaar community API.
//!
//! [`Engine`] owns the database connection and exposes every operation the
//! HTTP layer needs: people, forum topics and questions, fundraisers and the
//! donation ledger with its `open → reached` status rule.

pub use donations::{Donation, DonationCmd, DonationEntry, DonationRecorded};
pub use error::EngineError;
pub use forum_questions::{Question, QuestionDetails, QuestionView};
pub use forum_topics::Topic;
pub use fundraisers::{
    Fundraiser, FundraiserDetail, FundraiserLedger, FundraiserOverview, FundraiserStatus,
    FundraiserSummary,
};
pub use money::MoneyCents;
pub use ops::{Engine, EngineBuilder};
pub use people::Person;

mod donations;
mod error;
mod forum_questions;
mod forum_topics;
mod fundraisers;
mod money;
mod ops;
mod people;

type ResultEngine<T> = Result<T, EngineError>;
