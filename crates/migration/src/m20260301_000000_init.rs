//! Initial schema migration.
//!
//! Creates the tables behind fundraisers and their donation ledger:
//!
//! - `people`: donors and forum authors
//! - `forum_topics`: question categories
//! - `forum_questions`: questions a fundraiser can be opened on
//! - `fundraisers`: one goal-amount campaign per question
//! - `donations`: append-only ledger, one row per pledge

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Upper bound for goals and single donations, in cents (`1000000000.00`).
const MAX_AMOUNT_MINOR: i64 = 100_000_000_000;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum People {
    Table,
    Id,
    Name,
    Phone,
    CreatedAt,
}

#[derive(Iden)]
enum ForumTopics {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
enum ForumQuestions {
    Table,
    Id,
    AuthorId,
    TopicId,
    Title,
    Body,
    CreatedAt,
}

#[derive(Iden)]
enum Fundraisers {
    Table,
    Id,
    QuestionId,
    GoalMinor,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Donations {
    Table,
    Id,
    FundraiserId,
    DonorId,
    AmountMinor,
    DonatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. People
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(People::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(People::Name).string().not_null())
                    .col(ColumnDef::new(People::Phone).string())
                    .col(ColumnDef::new(People::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Forum topics
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ForumTopics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumTopics::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ForumTopics::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ForumTopics::Description).string())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Forum questions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ForumQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ForumQuestions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ForumQuestions::AuthorId).integer().not_null())
                    .col(ColumnDef::new(ForumQuestions::TopicId).integer())
                    .col(ColumnDef::new(ForumQuestions::Title).string().not_null())
                    .col(ColumnDef::new(ForumQuestions::Body).text().not_null())
                    .col(
                        ColumnDef::new(ForumQuestions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-forum_questions-author_id")
                            .from(ForumQuestions::Table, ForumQuestions::AuthorId)
                            .to(People::Table, People::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-forum_questions-topic_id")
                            .from(ForumQuestions::Table, ForumQuestions::TopicId)
                            .to(ForumTopics::Table, ForumTopics::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Fundraisers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Fundraisers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fundraisers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Fundraisers::QuestionId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Fundraisers::GoalMinor)
                            .big_integer()
                            .not_null()
                            .check(
                                Expr::col(Fundraisers::GoalMinor).between(1, MAX_AMOUNT_MINOR),
                            ),
                    )
                    .col(
                        ColumnDef::new(Fundraisers::Status)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(ColumnDef::new(Fundraisers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fundraisers-question_id")
                            .from(Fundraisers::Table, Fundraisers::QuestionId)
                            .to(ForumQuestions::Table, ForumQuestions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Donations
        // ───────────────────────────────────────────────────────────────────
        // A fundraiser with donations cannot be deleted (RESTRICT).
        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donations::FundraiserId).integer().not_null())
                    .col(ColumnDef::new(Donations::DonorId).integer())
                    .col(
                        ColumnDef::new(Donations::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(
                                Expr::col(Donations::AmountMinor).between(1, MAX_AMOUNT_MINOR),
                            ),
                    )
                    .col(ColumnDef::new(Donations::DonatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-fundraiser_id")
                            .from(Donations::Table, Donations::FundraiserId)
                            .to(Fundraisers::Table, Fundraisers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-donations-donor_id")
                            .from(Donations::Table, Donations::DonorId)
                            .to(People::Table, People::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-donations-fundraiser_id-donated_at")
                    .table(Donations::Table)
                    .col(Donations::FundraiserId)
                    .col(Donations::DonatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Donations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Fundraisers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ForumQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ForumTopics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;
        Ok(())
    }
}
