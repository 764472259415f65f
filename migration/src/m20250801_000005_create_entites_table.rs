use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Entites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Entites::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Entites::CompteEntrepriseId).uuid().null())
                    .col(
                        ColumnDef::new(Entites::NumeroCc)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Entites::Denomination)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entites::FormeJuridique).string_len(100).null())
                    .col(ColumnDef::new(Entites::SecteurActivite).string_len(255).null())
                    .col(ColumnDef::new(Entites::Adresse).string_len(500).null())
                    .col(ColumnDef::new(Entites::Ville).string_len(100).null())
                    .col(ColumnDef::new(Entites::Region).string_len(100).null())
                    .col(ColumnDef::new(Entites::Telephone).string_len(20).null())
                    .col(ColumnDef::new(Entites::Email).string_len(255).null())
                    .col(
                        ColumnDef::new(Entites::OrigineSaisie)
                            .string_len(30)
                            .not_null()
                            .default("auto_recensement"),
                    )
                    .col(
                        ColumnDef::new(Entites::PublieSurCarte)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Entites::Dossier)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Entites::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Entites::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entites_compte_entreprise_id")
                            .from(Entites::Table, Entites::CompteEntrepriseId)
                            .to(ComptesEntreprises::Table, ComptesEntreprises::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 所有アカウントからの検索用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Entites::Table)
                    .name("idx_entites_compte_entreprise_id")
                    .col(Entites::CompteEntrepriseId)
                    .to_owned(),
            )
            .await?;

        // 公開マップ用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Entites::Table)
                    .name("idx_entites_publie_sur_carte")
                    .col(Entites::PublieSurCarte)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(Entites::Table)
                    .name("idx_entites_created_at")
                    .col(Entites::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Entites::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Entites {
    Table,
    Id,
    CompteEntrepriseId,
    NumeroCc,
    Denomination,
    FormeJuridique,
    SecteurActivite,
    Adresse,
    Ville,
    Region,
    Telephone,
    Email,
    OrigineSaisie,
    PublieSurCarte,
    Dossier,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ComptesEntreprises {
    Table,
    Id,
}
