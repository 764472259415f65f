use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(OtpCodes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(OtpCodes::CompteEntrepriseId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpCodes::Code).string_len(10).not_null())
                    .col(ColumnDef::new(OtpCodes::OtpType).string_len(20).not_null())
                    .col(
                        ColumnDef::new(OtpCodes::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::Used)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OtpCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_otp_codes_compte_entreprise_id")
                            .from(OtpCodes::Table, OtpCodes::CompteEntrepriseId)
                            .to(ComptesEntreprises::Table, ComptesEntreprises::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 検証時の検索用（アカウント＋種別）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .table(OtpCodes::Table)
                    .name("idx_otp_codes_compte_type")
                    .col(OtpCodes::CompteEntrepriseId)
                    .col(OtpCodes::OtpType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpCodes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum OtpCodes {
    Table,
    Id,
    CompteEntrepriseId,
    Code,
    OtpType,
    ExpiresAt,
    Used,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ComptesEntreprises {
    Table,
    Id,
}
