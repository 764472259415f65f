use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntitesWorkflow::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntitesWorkflow::EntiteId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::Statut)
                            .string_len(30)
                            .not_null()
                            .default("brouillon"),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::NumeroAutorisation)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::DateSoumission)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::DateValidation)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::DatePublication)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::DateRejet)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(EntitesWorkflow::MotifRejet).text().null())
                    .col(ColumnDef::new(EntitesWorkflow::CreatedBy).uuid().null())
                    .col(ColumnDef::new(EntitesWorkflow::AssignedTo).uuid().null())
                    .col(
                        ColumnDef::new(EntitesWorkflow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EntitesWorkflow::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entites_workflow_entite_id")
                            .from(EntitesWorkflow::Table, EntitesWorkflow::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entites_workflow_created_by")
                            .from(EntitesWorkflow::Table, EntitesWorkflow::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entites_workflow_assigned_to")
                            .from(EntitesWorkflow::Table, EntitesWorkflow::AssignedTo)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // ステータス別集計用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(EntitesWorkflow::Table)
                    .name("idx_entites_workflow_statut")
                    .col(EntitesWorkflow::Statut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntitesWorkflow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EntitesWorkflow {
    Table,
    EntiteId,
    Statut,
    NumeroAutorisation,
    DateSoumission,
    DateValidation,
    DatePublication,
    DateRejet,
    MotifRejet,
    CreatedBy,
    AssignedTo,
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
