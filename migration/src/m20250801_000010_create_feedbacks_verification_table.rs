use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedbacksVerification::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedbacksVerification::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FeedbacksVerification::EntiteId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FeedbacksVerification::AgentId).uuid().null())
                    .col(
                        ColumnDef::new(FeedbacksVerification::DateFeedback)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(FeedbacksVerification::Commentaires)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FeedbacksVerification::ElementsManquants)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(FeedbacksVerification::DelaiFourniture)
                            .date()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedbacks_verification_entite_id")
                            .from(FeedbacksVerification::Table, FeedbacksVerification::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feedbacks_verification_agent_id")
                            .from(FeedbacksVerification::Table, FeedbacksVerification::AgentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(FeedbacksVerification::Table)
                    .name("idx_feedbacks_verification_entite_id")
                    .col(FeedbacksVerification::EntiteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FeedbacksVerification::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FeedbacksVerification {
    Table,
    Id,
    EntiteId,
    AgentId,
    DateFeedback,
    Commentaires,
    ElementsManquants,
    DelaiFourniture,
}

#[derive(DeriveIden)]
enum Entites {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
