use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ComptesEntreprises::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComptesEntreprises::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::Denomination)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::NumeroCc)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ComptesEntreprises::Telephone).string_len(20).null())
                    .col(ColumnDef::new(ComptesEntreprises::Adresse).string_len(500).null())
                    .col(ColumnDef::new(ComptesEntreprises::Ville).string_len(100).null())
                    .col(ColumnDef::new(ComptesEntreprises::Region).string_len(100).null())
                    .col(
                        ColumnDef::new(ComptesEntreprises::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::PasswordLastChanged)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::PasswordExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ComptesEntreprises::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComptesEntreprises::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ComptesEntreprises {
    Table,
    Id,
    Email,
    PasswordHash,
    Denomination,
    NumeroCc,
    Telephone,
    Adresse,
    Ville,
    Region,
    EmailVerified,
    IsActive,
    PasswordLastChanged,
    PasswordExpiresAt,
    CreatedAt,
    UpdatedAt,
}
