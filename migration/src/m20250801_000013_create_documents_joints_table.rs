use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DocumentsJoints::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentsJoints::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentsJoints::EntiteId).uuid().null())
                    .col(
                        ColumnDef::new(DocumentsJoints::CompteEntrepriseId)
                            .uuid()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(DocumentsJoints::TypeDocument)
                            .string_len(30)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentsJoints::NomFichier)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentsJoints::CheminFichier)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(ColumnDef::new(DocumentsJoints::Taille).big_integer().not_null())
                    .col(
                        ColumnDef::new(DocumentsJoints::MimeType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DocumentsJoints::Statut)
                            .string_len(20)
                            .not_null()
                            .default("en_attente"),
                    )
                    .col(ColumnDef::new(DocumentsJoints::Commentaire).text().null())
                    .col(
                        ColumnDef::new(DocumentsJoints::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_joints_entite_id")
                            .from(DocumentsJoints::Table, DocumentsJoints::EntiteId)
                            .to(Entites::Table, Entites::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_joints_compte_id")
                            .from(DocumentsJoints::Table, DocumentsJoints::CompteEntrepriseId)
                            .to(ComptesEntreprises::Table, ComptesEntreprises::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 種別ごとの一覧（活動報告など）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(DocumentsJoints::Table)
                    .name("idx_documents_joints_type_statut")
                    .col(DocumentsJoints::TypeDocument)
                    .col(DocumentsJoints::Statut)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DocumentsJoints::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum DocumentsJoints {
    Table,
    Id,
    EntiteId,
    CompteEntrepriseId,
    TypeDocument,
    NomFichier,
    CheminFichier,
    Taille,
    MimeType,
    Statut,
    Commentaire,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Entites {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum ComptesEntreprises {
    Table,
    Id,
}
