//! In-memory workbook
//!
//! ファイルを介さずに`Converter`へ行データを渡すための`WorkbookSource`実装。

use super::{SheetRows, WorkbookSource};
use crate::error::XlsxToCsvError;
use crate::types::Row;

/// メモリ上のシートから構成されるワークブック
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{CellValue, MemoryWorkbook, WorkbookSource};
///
/// let mut workbook = MemoryWorkbook::new()
///     .with_sheet("Jan", vec![vec![CellValue::Text("A".to_string())]]);
/// assert_eq!(workbook.sheet_names(), vec!["Jan".to_string()]);
/// assert_eq!(workbook.rows("Jan").unwrap().count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: Vec<(String, Vec<Row>)>,
}

impl MemoryWorkbook {
    /// 空のワークブックを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// シートを末尾に追加する
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Row>) -> Self {
        self.sheets.push((name.into(), rows));
        self
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.clone()).collect()
    }

    fn rows(&mut self, sheet: &str) -> Result<SheetRows<'_>, XlsxToCsvError> {
        let (_, rows) = self
            .sheets
            .iter()
            .find(|(name, _)| name == sheet)
            .ok_or_else(|| XlsxToCsvError::SheetProcessing {
                sheet: sheet.to_string(),
                message: "sheet not found".to_string(),
            })?;

        Ok(Box::new(rows.iter().cloned()))
    }
}
