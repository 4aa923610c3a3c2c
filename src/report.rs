//! Conversion Reports
//!
//! シート単位・ファイル単位の変換結果と、それを受け取るシンクを定義するモジュール。
//!
//! ライブラリはグローバルなロガーを持ちません。`Converter::run`に渡された
//! `ConversionSink`へ、ファイルごとにまとめた結果を通知します。

use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::api::Disposition;
use crate::error::XlsxToCsvError;

/// 1シートの変換結果
#[derive(Debug)]
pub struct SheetReport {
    /// シート名
    pub sheet: String,

    /// 出力先のCSVパス
    pub destination: PathBuf,

    /// 結果
    pub outcome: SheetOutcome,
}

/// シートの終端状態
#[derive(Debug)]
pub enum SheetOutcome {
    /// 書き込み完了
    Written {
        /// 書き込んだ行数
        rows: u64,
        /// `New`または`Overwrite`
        disposition: Disposition,
    },

    /// 上書き方針により書き込まなかった
    Skipped,

    /// 読み込み・書き込みに失敗した
    Failed(XlsxToCsvError),
}

/// 1ファイルの変換結果
#[derive(Debug)]
pub struct FileReport {
    /// 入力ファイル
    pub input: PathBuf,

    /// 出力ディレクトリ
    pub output_dir: PathBuf,

    /// 結果
    pub outcome: FileOutcome,
}

/// ファイルの終端状態
#[derive(Debug)]
pub enum FileOutcome {
    /// ワークブックを開き、選択したシートをすべて処理した
    ///
    /// 個々のシートが失敗していても`Completed`になります。
    Completed(Vec<SheetReport>),

    /// ワークブックを開けなかった、またはシートを選択できなかった
    Failed(XlsxToCsvError),
}

impl FileReport {
    /// シートの結果（ファイル単位で失敗した場合は空）
    pub fn sheets(&self) -> &[SheetReport] {
        match &self.outcome {
            FileOutcome::Completed(sheets) => sheets,
            FileOutcome::Failed(_) => &[],
        }
    }
}

/// 変換イベントの通知先
///
/// 並列処理時にも1ファイル分の結果はまとめて1回で通知されるため、
/// 実装側で出力した行がファイルをまたいで混ざることはありません。
pub trait ConversionSink: Send + Sync {
    /// 実行開始時に、処理対象のファイル数とともに呼ばれる
    fn run_started(&self, _files: usize) {}

    /// 1ファイルの処理が終わるたびに呼ばれる
    fn file_finished(&self, report: &FileReport);

    /// すべてのファイルの処理後に呼ばれる
    fn run_finished(&self, _summary: &RunSummary) {}
}

/// 何もしないシンク
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ConversionSink for NullSink {
    fn file_finished(&self, _report: &FileReport) {}
}

/// 通知された内容を記録するシンク
///
/// ファイルは通知された順に記録されます。
#[derive(Debug, Default)]
pub struct CollectingSink {
    started: Mutex<Option<usize>>,
    files: Mutex<Vec<PathBuf>>,
    summary: Mutex<Option<RunSummary>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// `run_started`で通知されたファイル数
    pub fn started(&self) -> Option<usize> {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `file_finished`で通知された入力ファイル
    pub fn files(&self) -> Vec<PathBuf> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `run_finished`で通知されたサマリー
    pub fn summary(&self) -> Option<RunSummary> {
        self.summary
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConversionSink for CollectingSink {
    fn run_started(&self, files: usize) {
        *self.started.lock().unwrap_or_else(PoisonError::into_inner) = Some(files);
    }

    fn file_finished(&self, report: &FileReport) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(report.input.clone());
    }

    fn run_finished(&self, summary: &RunSummary) {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner) = Some(summary.clone());
    }
}

/// 実行全体の集計
///
/// `--report`指定時にJSONとして書き出されます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 処理対象のファイル数
    pub files_total: usize,
    /// シート処理まで到達したファイル数
    pub files_converted: usize,
    /// ファイル単位で失敗したファイル数
    pub files_failed: usize,
    /// 新規作成したCSVの数
    pub sheets_new: usize,
    /// 上書きしたCSVの数
    pub sheets_overwritten: usize,
    /// 既存ファイルのため書き込まなかったCSVの数
    pub sheets_skipped: usize,
    /// 失敗したシートの数
    pub sheets_failed: usize,
    /// 書き込んだ行数の合計
    pub rows_written: u64,
    /// ファイルごとの結果（入力順）
    pub files: Vec<FileSummary>,
}

/// ファイルごとの集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub sheets: Vec<SheetSummary>,
}

/// シートごとの集計
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    pub destination: PathBuf,
    pub status: SheetStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    New,
    Overwritten,
    Skipped,
    Failed,
}

impl RunSummary {
    /// ファイルの結果から集計を作成する
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = RunSummary {
            files_total: reports.len(),
            ..Default::default()
        };

        for report in reports {
            let file = match &report.outcome {
                FileOutcome::Completed(sheets) => {
                    summary.files_converted += 1;
                    FileSummary {
                        input: report.input.clone(),
                        output_dir: report.output_dir.clone(),
                        status: FileStatus::Completed,
                        error: None,
                        sheets: sheets.iter().map(|s| summary.record_sheet(s)).collect(),
                    }
                }
                FileOutcome::Failed(error) => {
                    summary.files_failed += 1;
                    FileSummary {
                        input: report.input.clone(),
                        output_dir: report.output_dir.clone(),
                        status: FileStatus::Failed,
                        error: Some(error.to_string()),
                        sheets: Vec::new(),
                    }
                }
            };
            summary.files.push(file);
        }

        summary
    }

    fn record_sheet(&mut self, report: &SheetReport) -> SheetSummary {
        let (status, rows, error) = match &report.outcome {
            SheetOutcome::Written { rows, disposition } => {
                self.rows_written += rows;
                let status = match disposition {
                    Disposition::Overwrite => {
                        self.sheets_overwritten += 1;
                        SheetStatus::Overwritten
                    }
                    _ => {
                        self.sheets_new += 1;
                        SheetStatus::New
                    }
                };
                (status, Some(*rows), None)
            }
            SheetOutcome::Skipped => {
                self.sheets_skipped += 1;
                (SheetStatus::Skipped, None, None)
            }
            SheetOutcome::Failed(error) => {
                self.sheets_failed += 1;
                (SheetStatus::Failed, None, Some(error.to_string()))
            }
        };

        SheetSummary {
            sheet: report.sheet.clone(),
            destination: report.destination.clone(),
            status,
            rows,
            error,
        }
    }

    /// ファイル単位・シート単位の失敗が1件でもあるか
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0 || self.sheets_failed > 0
    }

    /// 書き込んだCSVの数
    pub fn sheets_written(&self) -> usize {
        self.sheets_new + self.sheets_overwritten
    }
}
