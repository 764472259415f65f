use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EntitesConformite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntitesConformite::EntiteId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::StatutConformite)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::ADpo)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(EntitesConformite::TypeDpo).string_len(20).null())
                    .col(
                        ColumnDef::new(EntitesConformite::EffectifEntreprise)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::VolumeDonneesTraitees)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::DelaiMiseEnConformite)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EntitesConformite::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_entites_conformite_entite_id")
                            .from(EntitesConformite::Table, EntitesConformite::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 公開レジストリのフィルタ用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(EntitesConformite::Table)
                    .name("idx_entites_conformite_statut")
                    .col(EntitesConformite::StatutConformite)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntitesConformite::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EntitesConformite {
    Table,
    EntiteId,
    Score,
    StatutConformite,
    #[sea_orm(iden = "a_dpo")]
    ADpo,
    TypeDpo,
    EffectifEntreprise,
    VolumeDonneesTraitees,
    DelaiMiseEnConformite,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Entites {
    Table,
    Id,
}
