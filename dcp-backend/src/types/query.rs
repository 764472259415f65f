use serde::{Deserialize, Deserializer, Serialize};

pub use crate::shared::types::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// 文字列または数値からu32をデシリアライズ
fn deserialize_u32_from_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u32),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.trim().parse::<u32>().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// クエリ文字列の "true" / "false" を Option<bool> として読む（flatten 経由でも動作する）
pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrBool {
        String(String),
        Bool(bool),
    }

    match Option::<StringOrBool>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrBool::Bool(b)) => Ok(Some(b)),
        Some(StringOrBool::String(s)) => match s.trim().to_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" | "oui" => Ok(Some(true)),
            "false" | "0" | "non" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "valeur booléenne invalide : {}",
                other
            ))),
        },
    }
}

/// 統一ページネーションクエリパラメータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationQuery {
    #[serde(
        default = "default_page",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub page: u32,
    #[serde(
        default = "default_per_page",
        deserialize_with = "deserialize_u32_from_string"
    )]
    pub per_page: u32,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationQuery {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// ページは1以上、per_pageは [1, MAX_PAGE_SIZE] に丸める
    pub fn get_pagination(&self) -> (u64, u64) {
        let page = self.page.max(1) as u64;
        let per_page = self.per_page.clamp(1, MAX_PAGE_SIZE) as u64;
        (page, per_page)
    }

    pub fn get_offset(&self) -> u64 {
        let (page, per_page) = self.get_pagination();
        (page - 1) * per_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query: PaginationQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, 50);
    }

    #[test]
    fn test_string_values_and_clamping() {
        let query: PaginationQuery =
            serde_json::from_str(r#"{"page": "0", "per_page": "1000"}"#).unwrap();
        assert_eq!(query.get_pagination(), (1, 200));

        let query: PaginationQuery = serde_json::from_str(r#"{"page": 3, "per_page": 0}"#).unwrap();
        assert_eq!(query.get_pagination(), (3, 1));
        assert_eq!(query.get_offset(), 2);
    }

    #[test]
    fn test_optional_bool() {
        #[derive(Deserialize)]
        struct Filter {
            #[serde(default, deserialize_with = "deserialize_optional_bool")]
            lue: Option<bool>,
        }

        let f: Filter = serde_json::from_str(r#"{"lue": "true"}"#).unwrap();
        assert_eq!(f.lue, Some(true));
        let f: Filter = serde_json::from_str(r#"{"lue": false}"#).unwrap();
        assert_eq!(f.lue, Some(false));
        let f: Filter = serde_json::from_str("{}").unwrap();
        assert_eq!(f.lue, None);
        assert!(serde_json::from_str::<Filter>(r#"{"lue": "peut-etre"}"#).is_err());
    }

    #[test]
    fn test_offset() {
        let query = PaginationQuery::new(2, 20);
        assert_eq!(query.get_offset(), 20);
    }
}
