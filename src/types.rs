//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};

/// セルの値を表す列挙型
///
/// ワークブックリーダーが返す型付きのセル値です。
/// 文字列への変換は[`CellFormatter::normalize`](crate::CellFormatter::normalize)
/// が一箇所で網羅的に行います。
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 空セル
    Empty,

    /// 文字列
    Text(String),

    /// 数値（f64）
    Number(f64),

    /// 論理値
    Bool(bool),

    /// 日付・時刻
    Date(Temporal),

    /// エラー値（例: #DIV/0!）
    Error(String),
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// 日付・時刻セルの値
///
/// セルが宣言している精度（日付のみ、日時、時刻のみ、経過時間）を保持します。
#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    /// 日付のみ
    Date(NaiveDate),

    /// 日付と時刻
    DateTime(NaiveDateTime),

    /// 時刻のみ
    Time(NaiveTime),

    /// 経過時間（`[h]:mm:ss`書式のセルなど）
    Duration(chrono::Duration),

    /// リーダーがISO 8601文字列として返した値（ODSなど）
    Iso(String),
}

/// 1行分のセル値（列は位置で識別する）
pub type Row = Vec<CellValue>;

/// シートの識別情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDescriptor {
    /// シート名
    pub name: String,

    /// シートインデックス（0始まり、ワークブック内の順序）
    pub index: usize,
}

/// 変換対象として選択されたシート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSheet {
    /// 選択されたシート
    pub sheet: SheetDescriptor,

    /// 出力ファイル名に付与するサフィックス（単一シートモードでは空文字列）
    pub suffix: String,
}

/// 変換対象の入力ファイルと出力先ディレクトリの組
///
/// 入力解決（[`resolve_targets`](crate::resolve_targets)）が生成し、
/// ディレクトリ入力の場合は出力ディレクトリに相対パス構造が反映済みです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTarget {
    /// 入力ワークブックのパス
    pub input: PathBuf,

    /// 出力先ディレクトリ
    pub output_dir: PathBuf,
}

impl ConversionTarget {
    /// 新しい変換対象を生成
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }

    /// 出力ファイル名の基になる入力ファイル名（拡張子なし）
    pub fn base_name(&self) -> String {
        base_name_of(&self.input)
    }
}

pub(crate) fn base_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
