use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HistoriqueStatuts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HistoriqueStatuts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HistoriqueStatuts::EntiteId).uuid().not_null())
                    .col(
                        ColumnDef::new(HistoriqueStatuts::AncienStatut)
                            .string_len(30)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(HistoriqueStatuts::NouveauStatut)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HistoriqueStatuts::DateChangement)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(HistoriqueStatuts::ModifiePar).uuid().null())
                    .col(ColumnDef::new(HistoriqueStatuts::Commentaire).text().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_historique_statuts_entite_id")
                            .from(HistoriqueStatuts::Table, HistoriqueStatuts::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_historique_statuts_modifie_par")
                            .from(HistoriqueStatuts::Table, HistoriqueStatuts::ModifiePar)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // エンティティ別の履歴取得用
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(HistoriqueStatuts::Table)
                    .name("idx_historique_statuts_entite_date")
                    .col(HistoriqueStatuts::EntiteId)
                    .col(HistoriqueStatuts::DateChangement)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HistoriqueStatuts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HistoriqueStatuts {
    Table,
    Id,
    EntiteId,
    AncienStatut,
    NouveauStatut,
    DateChangement,
    ModifiePar,
    Commentaire,
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
