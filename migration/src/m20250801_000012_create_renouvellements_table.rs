use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Renouvellements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Renouvellements::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Renouvellements::EntiteId).uuid().not_null())
                    .col(ColumnDef::new(Renouvellements::DateExpiration).date().null())
                    .col(ColumnDef::new(Renouvellements::Motif).text().null())
                    .col(
                        ColumnDef::new(Renouvellements::Statut)
                            .string_len(20)
                            .not_null()
                            .default("en_attente"),
                    )
                    .col(ColumnDef::new(Renouvellements::Commentaire).text().null())
                    .col(ColumnDef::new(Renouvellements::TraitePar).uuid().null())
                    .col(
                        ColumnDef::new(Renouvellements::TraiteLe)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Renouvellements::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_renouvellements_entite_id")
                            .from(Renouvellements::Table, Renouvellements::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_renouvellements_traite_par")
                            .from(Renouvellements::Table, Renouvellements::TraitePar)
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
                    .table(Renouvellements::Table)
                    .name("idx_renouvellements_statut")
                    .col(Renouvellements::Statut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Renouvellements::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Renouvellements {
    Table,
    Id,
    EntiteId,
    DateExpiration,
    Motif,
    Statut,
    Commentaire,
    TraitePar,
    TraiteLe,
    CreatedAt,
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
