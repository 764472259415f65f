use sea_orm_migration::prelude::*;

const ADMIN_EMAIL: &str = "admin@artci.ci";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 初期スーパー管理者を作成
        // パスワード: "Adm1n$ecurE2024!" をArgon2でハッシュ化した値
        let admin_password_hash = "$argon2id$v=19$m=65536,t=3,p=4$rwjnw7itO1QP7YiQLYYPuw$bwYljZ/eNoieCwcPydAbagPt05UT9wcs+n0zH58ZxS4";

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Users::Table)
                    .columns([
                        Users::Id,
                        Users::Nom,
                        Users::Prenom,
                        Users::Email,
                        Users::PasswordHash,
                        Users::Role,
                        Users::IsActive,
                    ])
                    .values_panic([
                        Expr::cust("gen_random_uuid()"),
                        "Administrateur".into(),
                        "Super".into(),
                        ADMIN_EMAIL.into(),
                        admin_password_hash.into(),
                        "super_admin".into(),
                        true.into(),
                    ])
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Users::Table)
                    .and_where(Expr::col(Users::Email).eq(ADMIN_EMAIL))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Nom,
    Prenom,
    Email,
    PasswordHash,
    Role,
    IsActive,
}
