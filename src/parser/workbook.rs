//! Workbook Reader
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。
//! XLSX / XLSM / XLSB / XLS / ODS を自動判別して開きます。

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader, Sheets};
use chrono::NaiveTime;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{SheetRows, WorkbookSource};
use crate::error::XlsxToCsvError;
use crate::security::SecurityConfig;
use crate::types::{CellValue, Row, Temporal};

/// calamineで開いたワークブック
pub struct CalamineWorkbook {
    /// calamineのワークブック
    workbook: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `path` - ワークブックのパス
    ///
    /// # 戻り値
    ///
    /// * `Ok(CalamineWorkbook)` - 読み込みに成功した場合
    /// * `Err(XlsxToCsvError::SecurityViolation)` - ファイルサイズが上限を超える場合
    /// * `Err(XlsxToCsvError::WorkbookOpen)` - 読み込めない、または形式が不正な場合
    pub fn open(path: &Path) -> Result<Self, XlsxToCsvError> {
        Self::open_with_limits(path, &SecurityConfig::default())
    }

    pub(crate) fn open_with_limits(
        path: &Path,
        security_config: &SecurityConfig,
    ) -> Result<Self, XlsxToCsvError> {
        // セキュリティチェック: 入力ファイルサイズの上限
        let size = std::fs::metadata(path)
            .map_err(|e| XlsxToCsvError::WorkbookOpen {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .len();
        security_config.check_input_size(size)?;

        let workbook = open_workbook_auto(path).map_err(|e| XlsxToCsvError::WorkbookOpen {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(Self { workbook })
    }
}

impl WorkbookSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn rows(&mut self, sheet: &str) -> Result<SheetRows<'_>, XlsxToCsvError> {
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| XlsxToCsvError::SheetProcessing {
                sheet: sheet.to_string(),
                message: e.to_string(),
            })?;

        Ok(Box::new(RangeRows::new(range)))
    }
}

/// calamineの`Range`を、A1を起点とする行として1行ずつ返すイテレータ
///
/// `Range`は最初の使用セルから始まるため、それより前の行・列は空セルで補います。
pub(crate) struct RangeRows {
    range: Range<Data>,
    leading_rows: usize,
    leading_cols: usize,
    total_rows: usize,
    next_row: usize,
}

impl RangeRows {
    pub(crate) fn new(range: Range<Data>) -> Self {
        let (leading_rows, leading_cols, total_rows) = match range.start() {
            Some((row, col)) if !range.is_empty() => {
                (row as usize, col as usize, row as usize + range.height())
            }
            _ => (0, 0, 0),
        };

        Self {
            range,
            leading_rows,
            leading_cols,
            total_rows,
            next_row: 0,
        }
    }

    fn width(&self) -> usize {
        self.leading_cols + self.range.width()
    }
}

impl Iterator for RangeRows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        if self.next_row >= self.total_rows {
            return None;
        }
        let row_idx = self.next_row;
        self.next_row += 1;

        if row_idx < self.leading_rows {
            return Some(vec![CellValue::Empty; self.width()]);
        }

        let relative_row = row_idx - self.leading_rows;
        let mut row = Vec::with_capacity(self.width());
        row.resize(self.leading_cols, CellValue::Empty);
        row.extend((0..self.range.width()).map(|col| {
            self.range
                .get((relative_row, col))
                .map(convert_cell)
                .unwrap_or(CellValue::Empty)
        }));
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_rows - self.next_row;
        (remaining, Some(remaining))
    }
}

/// calamineのセル値を`CellValue`に変換
pub(crate) fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => convert_datetime(dt),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(Temporal::Iso(s.clone())),
        Data::Error(e) => CellValue::Error(e.to_string()),
        Data::Empty => CellValue::Empty,
    }
}

/// 日付書式のセルを、宣言された精度の`Temporal`に変換
///
/// - 経過時間書式: `Duration`
/// - シリアル値が1未満: 時刻のみ
/// - 時刻部分が0:00:00: 日付のみ
/// - それ以外: 日時
///
/// 日付に変換できないシリアル値は数値として扱います。
fn convert_datetime(dt: &ExcelDateTime) -> CellValue {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            return CellValue::Date(Temporal::Duration(duration));
        }
    }

    let Some(datetime) = dt.as_datetime() else {
        return CellValue::Number(dt.as_f64());
    };

    let serial = dt.as_f64();
    let temporal = if (0.0..1.0).contains(&serial) {
        Temporal::Time(datetime.time())
    } else if datetime.time() == NaiveTime::MIN {
        Temporal::Date(datetime.date())
    } else {
        Temporal::DateTime(datetime)
    };
    CellValue::Date(temporal)
}
