// migration/src/lib.rs
pub use sea_orm_migration::prelude::*;

// アカウント関連マイグレーション
mod m20250801_000001_create_users_table;
mod m20250801_000002_create_comptes_entreprises_table;
mod m20250801_000003_create_otp_codes_table;
mod m20250801_000004_create_revoked_tokens_table;

// エンティティと審査ワークフロー
mod m20250801_000005_create_entites_table;
mod m20250801_000006_create_entites_workflow_table;
mod m20250801_000007_create_entites_conformite_table;
mod m20250801_000008_create_historique_statuts_table;
mod m20250801_000009_create_assignations_table;
mod m20250801_000010_create_feedbacks_verification_table;

// 申請・書類・通知
mod m20250801_000011_create_demandes_rapprochement_table;
mod m20250801_000012_create_renouvellements_table;
mod m20250801_000013_create_documents_joints_table;
mod m20250801_000014_create_notifications_table;

// 初期データ
mod m20250801_000015_create_initial_super_admin;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            // 1. 依存関係のない基本テーブル
            Box::new(m20250801_000001_create_users_table::Migration),
            Box::new(m20250801_000002_create_comptes_entreprises_table::Migration),
            // 2. アカウントに依存するテーブル
            Box::new(m20250801_000003_create_otp_codes_table::Migration),
            Box::new(m20250801_000004_create_revoked_tokens_table::Migration),
            Box::new(m20250801_000005_create_entites_table::Migration),
            // 3. entitesに依存するテーブル
            Box::new(m20250801_000006_create_entites_workflow_table::Migration),
            Box::new(m20250801_000007_create_entites_conformite_table::Migration),
            Box::new(m20250801_000008_create_historique_statuts_table::Migration),
            Box::new(m20250801_000009_create_assignations_table::Migration),
            Box::new(m20250801_000010_create_feedbacks_verification_table::Migration),
            Box::new(m20250801_000011_create_demandes_rapprochement_table::Migration),
            Box::new(m20250801_000012_create_renouvellements_table::Migration),
            Box::new(m20250801_000013_create_documents_joints_table::Migration),
            Box::new(m20250801_000014_create_notifications_table::Migration),
            // 4. 初期スーパー管理者
            Box::new(m20250801_000015_create_initial_super_admin::Migration),
        ]
    }
}
