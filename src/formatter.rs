//! Formatter Module
//!
//! セル値を出力用の文字列に正規化するモジュール。
//! 正規化は純粋かつ全域的な関数で、行位置や設定に依存せず、失敗しません。

use chrono::Timelike;

use crate::types::{CellValue, Temporal};

/// セルフォーマッター
///
/// セル値のフォーマット処理のファサードとして機能します。
#[derive(Debug, Default, Clone, Copy)]
pub struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,

    /// 数値フォーマッター
    number_formatter: NumberFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self::default()
    }

    /// セル値を出力用の文字列に正規化する
    ///
    /// # 規則
    ///
    /// 1. 論理値: `TRUE` / `FALSE`
    /// 2. 空セル: 空文字列
    /// 3. 数値: 10進表記（整数値は小数部なし、極端な桁のみ指数表記）
    /// 4. 日付・時刻: ロケール非依存のISO 8601風表記
    /// 5. 文字列: そのまま
    ///
    /// エラー値は`#DIV/0!`などのリテラルをそのまま出力します。
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxcsv::{CellFormatter, CellValue};
    ///
    /// let formatter = CellFormatter::new();
    /// assert_eq!(formatter.normalize(&CellValue::Bool(true)), "TRUE");
    /// assert_eq!(formatter.normalize(&CellValue::Number(3.0)), "3");
    /// assert_eq!(formatter.normalize(&CellValue::Empty), "");
    /// ```
    pub fn normalize(&self, cell: &CellValue) -> String {
        match cell {
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Empty => String::new(),
            CellValue::Number(n) => self.number_formatter.format(*n),
            CellValue::Date(temporal) => self.date_formatter.format(temporal),
            CellValue::Text(s) => s.clone(),
            CellValue::Error(e) => e.clone(),
        }
    }

    /// 1行分のセル値をまとめて正規化する
    pub fn normalize_row(&self, row: &[CellValue]) -> Vec<String> {
        row.iter().map(|cell| self.normalize(cell)).collect()
    }
}

/// 日付フォーマッター
///
/// セルが宣言している精度に合わせて、日付・日時・時刻・経過時間を出力します。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// 日付・時刻値をフォーマット
    ///
    /// - 日付: `2025-01-02`
    /// - 日時: `2025-01-02 13:45:00`（端数秒がある場合は`13:45:00.250`）
    /// - 時刻: `13:45:00`
    /// - 経過時間: `36:15:00`（時は24を超えて累積）
    pub fn format(&self, temporal: &Temporal) -> String {
        match temporal {
            Temporal::Date(date) => date.format("%Y-%m-%d").to_string(),
            Temporal::DateTime(datetime) => {
                if datetime.nanosecond() == 0 {
                    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
                } else {
                    datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string()
                }
            }
            Temporal::Time(time) => {
                if time.nanosecond() == 0 {
                    time.format("%H:%M:%S").to_string()
                } else {
                    time.format("%H:%M:%S%.f").to_string()
                }
            }
            Temporal::Duration(duration) => {
                let total = duration.num_seconds();
                let sign = if total < 0 { "-" } else { "" };
                let total = total.unsigned_abs();
                format!(
                    "{}{}:{:02}:{:02}",
                    sign,
                    total / 3600,
                    (total / 60) % 60,
                    total % 60
                )
            }
            Temporal::Iso(text) => text.clone(),
        }
    }
}

/// 数値フォーマッター
///
/// 最短で往復可能な10進表記を出力します。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NumberFormatter;

impl NumberFormatter {
    /// 指数表記に切り替える上限（この絶対値以上は指数表記）
    const EXPONENT_UPPER: f64 = 1e16;

    /// 指数表記に切り替える下限（この絶対値未満は指数表記）
    const EXPONENT_LOWER: f64 = 1e-4;

    /// 数値をフォーマット
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }
        // -0.0も"0"に揃える
        if value == 0.0 {
            return "0".to_string();
        }

        let magnitude = value.abs();
        if !(Self::EXPONENT_LOWER..Self::EXPONENT_UPPER).contains(&magnitude) {
            format!("{:e}", value)
        } else {
            value.to_string()
        }
    }
}
