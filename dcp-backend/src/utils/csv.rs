// src/utils/csv.rs

/// Excel が UTF-8 と認識するための BOM
pub const UTF8_BOM: &str = "\u{feff}";

/// 区切り文字付き CSV の書き出し
pub struct CsvWriter {
    delimiter: char,
    buffer: String,
}

impl CsvWriter {
    /// BOM 付きで開始する
    pub fn with_bom(delimiter: char) -> Self {
        Self {
            delimiter,
            buffer: UTF8_BOM.to_string(),
        }
    }

    pub fn write_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let line = fields
            .into_iter()
            .map(|field| self.escape(field.as_ref()))
            .collect::<Vec<_>>()
            .join(&self.delimiter.to_string());
        self.buffer.push_str(&line);
        self.buffer.push_str("\r\n");
    }

    pub fn into_string(self) -> String {
        self.buffer
    }

    fn escape(&self, field: &str) -> String {
        let needs_quotes = field.contains(self.delimiter)
            || field.contains('"')
            || field.contains('\n')
            || field.contains('\r');
        if needs_quotes {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}

/// 1 レコード（line はファイル上の開始行、1 始まり）
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    fn is_blank(&self) -> bool {
        self.fields.iter().all(|field| field.trim().is_empty())
    }
}

/// ヘッダー行付き CSV の読み込み結果
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// 小文字・前後空白除去済みのヘッダー
    pub headers: Vec<String>,
    pub rows: Vec<CsvRecord>,
}

impl CsvTable {
    /// ヘッダー名（大文字小文字を区別しない）で列の値を取得
    pub fn get<'a>(&self, row: &'a [String], column: &str) -> Option<&'a str> {
        let column = column.to_lowercase();
        self.headers
            .iter()
            .position(|h| *h == column)
            .and_then(|idx| row.get(idx))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// ヘッダー行から区切り文字を推定（';' 優先、なければ ','）
pub fn detect_delimiter(header_line: &str) -> char {
    if header_line.contains(';') {
        ';'
    } else {
        ','
    }
}

/// CSV テキストを解析する。空行は読み飛ばすが行番号は保持する
pub fn parse(content: &str) -> Result<CsvTable, String> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let first_line = content.lines().next().unwrap_or_default();
    if first_line.trim().is_empty() {
        return Err("Le fichier est vide.".to_string());
    }
    let delimiter = detect_delimiter(first_line);

    let mut records = parse_records(content, delimiter)?.into_iter();
    let headers = records
        .next()
        .ok_or_else(|| "Le fichier est vide.".to_string())?
        .fields
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let rows = records.filter(|record| !record.is_blank()).collect();

    Ok(CsvTable { headers, rows })
}

fn parse_records(content: &str, delimiter: char) -> Result<Vec<CsvRecord>, String> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(CsvRecord {
                    line: record_line,
                    fields: std::mem::take(&mut record),
                });
                line += 1;
                record_line = line;
            }
            c if c == delimiter => record.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err("Guillemet non fermé dans le fichier CSV.".to_string());
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(CsvRecord {
            line: record_line,
            fields: record,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_escapes_and_prefixes_bom() {
        let mut writer = CsvWriter::with_bom(';');
        writer.write_row(["Entité", "N° CC"]);
        writer.write_row(["Société; \"Alpha\"", "CC-1"]);
        let output = writer.into_string();

        assert!(output.starts_with(UTF8_BOM));
        assert!(output.contains("Entité;N° CC\r\n"));
        assert!(output.contains("\"Société; \"\"Alpha\"\"\";CC-1\r\n"));
    }

    #[test]
    fn test_parse_semicolon_with_bom() {
        let content = "\u{feff}Denomination;NUMERO_CC;Ville\nAlpha;CC-1;Abidjan\n\n;;\nBeta;CC-2;\n";
        let table = parse(content).unwrap();

        assert_eq!(table.headers, vec!["denomination", "numero_cc", "ville"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.get(&table.rows[0].fields, "Numero_CC"), Some("CC-1"));
        assert_eq!(table.get(&table.rows[1].fields, "ville"), None);
        assert_eq!(table.get(&table.rows[1].fields, "absent"), None);
    }

    #[test]
    fn test_parse_comma_and_quotes() {
        let content = "denomination,adresse\r\n\"Gamma, SA\",\"Rue 12\nPlateau\"\r\n";
        let table = parse(content).unwrap();

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].fields[0], "Gamma, SA");
        assert_eq!(table.rows[0].fields[1], "Rue 12\nPlateau");
    }

    #[test]
    fn test_rows_keep_file_line_numbers() {
        let table = parse("denomination;numero_cc\nAlpha;CC-1\n\n;\nBeta;\n").unwrap();
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 5]);

        let table = parse("denomination;adresse\n\"Gamma\";\"Rue 12\nPlateau\"\nDelta;Cocody\n").unwrap();
        let lines: Vec<usize> = table.rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("a;b\n\"non ferme;x\n").is_err());
    }

    #[test]
    fn test_written_output_parses_back() {
        let mut writer = CsvWriter::with_bom(';');
        writer.write_row(["denomination", "numero_cc"]);
        writer.write_row(["Delta; SARL", "CC-9"]);
        let table = parse(&writer.into_string()).unwrap();
        assert_eq!(table.get(&table.rows[0].fields, "denomination"), Some("Delta; SARL"));
    }
}
