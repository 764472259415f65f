use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DemandesRapprochement::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DemandesRapprochement::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::CompteEntrepriseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::EntiteId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::NumeroCc)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::Raison)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::DocumentPreuveId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::Statut)
                            .string_len(20)
                            .not_null()
                            .default("en_attente"),
                    )
                    .col(ColumnDef::new(DemandesRapprochement::MotifRejet).text().null())
                    .col(ColumnDef::new(DemandesRapprochement::TraitePar).uuid().null())
                    .col(
                        ColumnDef::new(DemandesRapprochement::TraiteLe)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DemandesRapprochement::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_demandes_rapprochement_compte_id")
                            .from(
                                DemandesRapprochement::Table,
                                DemandesRapprochement::CompteEntrepriseId,
                            )
                            .to(ComptesEntreprises::Table, ComptesEntreprises::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_demandes_rapprochement_entite_id")
                            .from(DemandesRapprochement::Table, DemandesRapprochement::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_demandes_rapprochement_traite_par")
                            .from(DemandesRapprochement::Table, DemandesRapprochement::TraitePar)
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
                    .table(DemandesRapprochement::Table)
                    .name("idx_demandes_rapprochement_statut")
                    .col(DemandesRapprochement::Statut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DemandesRapprochement::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DemandesRapprochement {
    Table,
    Id,
    CompteEntrepriseId,
    EntiteId,
    NumeroCc,
    Raison,
    DocumentPreuveId,
    Statut,
    MotifRejet,
    TraitePar,
    TraiteLe,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ComptesEntreprises {
    Table,
    Id,
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
