// src/domain/document_type.rs

string_enum! {
    pub enum TypeDocument {
        Cni => "cni",
        RegistreCommerce => "registre_commerce",
        Statuts => "statuts",
        AttestationFiscale => "attestation_fiscale",
        RapportActivite => "rapport_activite",
        Autre => "autre",
    }
}

/// アップロードを許可する拡張子
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "doc", "docx", "xls", "xlsx"];

pub fn is_allowed_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions() {
        assert!(is_allowed_extension("rapport.pdf"));
        assert!(is_allowed_extension("SCAN.JPEG"));
        assert!(is_allowed_extension("tableau.v2.xlsx"));
        assert!(!is_allowed_extension("script.sh"));
        assert!(!is_allowed_extension("sans_extension"));
    }

    #[test]
    fn test_type_document() {
        assert_eq!(TypeDocument::RapportActivite.as_str(), "rapport_activite");
        assert_eq!(TypeDocument::from_str("cni"), Some(TypeDocument::Cni));
        assert_eq!(TypeDocument::all().len(), 6);
    }
}
