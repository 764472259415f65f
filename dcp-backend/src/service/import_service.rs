// src/service/import_service.rs

use crate::api::dto::entite_dto::CreateEntiteRequest;
use crate::api::dto::public_dto::{ImportResult, ImportRowError};
use crate::domain::dossier::DossierPatch;
use crate::domain::origine_saisie::OrigineSaisie;
use crate::error::{AppError, AppResult};
use crate::service::document_service::UploadedFile;
use crate::service::entite_service::{EntiteOrigin, EntiteService};
use crate::utils::csv::{self, CsvTable};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// CSV による一括登録
pub struct ImportService {
    entite_service: Arc<EntiteService>,
}

impl ImportService {
    pub fn new(entite_service: Arc<EntiteService>) -> Self {
        Self { entite_service }
    }

    /// 行単位で登録し、失敗行は errors に積む（行番号はファイル上の行、ヘッダーが 1 行目）
    pub async fn import_csv(&self, file: UploadedFile, imported_by: Uuid) -> AppResult<ImportResult> {
        if file.data.is_empty() {
            return Err(AppError::BadRequest("Aucun fichier fourni.".to_string()));
        }
        let is_csv = file
            .filename
            .rsplit_once('.')
            .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("csv"));
        if !is_csv {
            return Err(AppError::BadRequest(
                "Seuls les fichiers CSV sont acceptés.".to_string(),
            ));
        }

        let content = String::from_utf8(file.data).map_err(|_| {
            AppError::BadRequest("Le fichier doit être encodé en UTF-8.".to_string())
        })?;
        let table = csv::parse(&content).map_err(AppError::BadRequest)?;

        let mut imported = 0;
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for row in &table.rows {
            let line = row.line;
            let input = match row_to_request(&table, &row.fields) {
                Ok(input) => input,
                Err(error) => {
                    errors.push(ImportRowError { row: line, error });
                    continue;
                }
            };

            if !seen.insert(input.numero_cc.clone())
                || self.entite_service.numero_cc_exists(&input.numero_cc).await?
            {
                errors.push(ImportRowError {
                    row: line,
                    error: format!("N° CC {} déjà existant.", input.numero_cc),
                });
                continue;
            }

            let origin = EntiteOrigin {
                origine: OrigineSaisie::SaisieArtci,
                created_by: Some(imported_by),
                compte_entreprise_id: None,
            };
            match self.entite_service.create(input, origin).await {
                Ok(_) => imported += 1,
                Err(AppError::DbErr(e)) => return Err(AppError::DbErr(e)),
                Err(e) => {
                    warn!(row = line, error = %e, "Import row rejected");
                    errors.push(ImportRowError {
                        row: line,
                        error: e.user_message(),
                    });
                }
            }
        }

        info!(
            imported,
            errors = errors.len(),
            imported_by = %imported_by,
            "CSV import completed"
        );
        Ok(ImportResult { imported, errors })
    }
}

fn row_to_request(table: &CsvTable, row: &[String]) -> Result<CreateEntiteRequest, String> {
    let get = |column: &str| table.get(row, column).map(str::to_string);

    let (Some(denomination), Some(numero_cc)) = (get("denomination"), get("numero_cc")) else {
        return Err("Dénomination et N° CC requis.".to_string());
    };

    Ok(CreateEntiteRequest {
        denomination,
        numero_cc,
        forme_juridique: get("forme_juridique"),
        secteur_activite: get("secteur_activite"),
        adresse: get("adresse"),
        ville: get("ville"),
        region: get("region"),
        telephone: get("telephone"),
        email: get("email"),
        effectif_entreprise: None,
        volume_donnees_traitees: None,
        delai_mise_en_conformite: None,
        dossier: DossierPatch::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_request() {
        let table = csv::parse(
            "Denomination;NUMERO_CC;Ville\nOrange CI;CI-123;Abidjan\n;CI-999;Bouaké\n",
        )
        .unwrap();

        let ok = row_to_request(&table, &table.rows[0].fields).unwrap();
        assert_eq!(ok.denomination, "Orange CI");
        assert_eq!(ok.numero_cc, "CI-123");
        assert_eq!(ok.ville.as_deref(), Some("Abidjan"));
        assert_eq!(ok.region, None);

        assert!(row_to_request(&table, &table.rows[1].fields).is_err());
    }
}
