use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assignations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignations::EntiteId).uuid().not_null())
                    .col(ColumnDef::new(Assignations::AgentId).uuid().not_null())
                    .col(ColumnDef::new(Assignations::AssignePar).uuid().not_null())
                    .col(ColumnDef::new(Assignations::Echeance).date().not_null())
                    .col(
                        ColumnDef::new(Assignations::Statut)
                            .string_len(30)
                            .not_null()
                            .default("en_cours"),
                    )
                    .col(
                        ColumnDef::new(Assignations::TraiteLe)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Assignations::ValidePar).uuid().null())
                    .col(
                        ColumnDef::new(Assignations::ValideLe)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Assignations::CommentaireValidation).text().null())
                    .col(
                        ColumnDef::new(Assignations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Assignations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignations_entite_id")
                            .from(Assignations::Table, Assignations::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignations_agent_id")
                            .from(Assignations::Table, Assignations::AgentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignations_assigne_par")
                            .from(Assignations::Table, Assignations::AssignePar)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assignations_valide_par")
                            .from(Assignations::Table, Assignations::ValidePar)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // エージェントのバスケット取得用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Assignations::Table)
                    .name("idx_assignations_agent_echeance")
                    .col(Assignations::AgentId)
                    .col(Assignations::Echeance)
                    .to_owned(),
            )
            .await?;

        // 期限切れ判定用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Assignations::Table)
                    .name("idx_assignations_statut")
                    .col(Assignations::Statut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Assignations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Assignations {
    Table,
    Id,
    EntiteId,
    AgentId,
    AssignePar,
    Echeance,
    Statut,
    TraiteLe,
    ValidePar,
    ValideLe,
    CommentaireValidation,
    CreatedAt,
    UpdatedAt,
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
