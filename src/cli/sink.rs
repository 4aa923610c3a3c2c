//! Conversion events forwarded to the `log` facade

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::{ConversionSink, Disposition, FileOutcome, FileReport, RunSummary, SheetOutcome};

/// メッセージの言語
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    Chinese,
}

impl Language {
    pub fn from_flag(chinese: bool) -> Self {
        if chinese {
            Language::Chinese
        } else {
            Language::English
        }
    }

    pub fn run_started(self) -> String {
        match self {
            Language::English => "xlsxcsv start...".to_string(),
            Language::Chinese => "xlsxcsv 开始...".to_string(),
        }
    }

    pub fn files_found(self, count: usize) -> String {
        match self {
            Language::English => format!("Found {} workbook(s)", count),
            Language::Chinese => format!("找到 {} 个工作簿文件", count),
        }
    }

    pub fn file_started(self, input: &Path) -> String {
        match self {
            Language::English => format!("Processing file: {}", input.display()),
            Language::Chinese => format!("开始处理文件: {}", input.display()),
        }
    }

    pub fn reading_workbook(self, input: &Path) -> String {
        match self {
            Language::English => format!("Reading workbook: {}", input.display()),
            Language::Chinese => format!("正在读取Excel文件: {}", input.display()),
        }
    }

    pub fn overwriting(self, destination: &Path) -> String {
        match self {
            Language::English => format!("File exists, overwriting: {}", destination.display()),
            Language::Chinese => format!("文件已存在，正在覆盖: {}", destination.display()),
        }
    }

    pub fn skipped(self, destination: &Path) -> String {
        match self {
            Language::English => format!("File exists, skipped: {}", destination.display()),
            Language::Chinese => format!("文件已存在: {}, 文件跳过", destination.display()),
        }
    }

    pub fn generated(self, destination: &Path, rows: u64) -> String {
        match self {
            Language::English => format!("Generated file: {} ({} rows)", destination.display(), rows),
            Language::Chinese => format!("成功创建文件: {} ({} 行)", destination.display(), rows),
        }
    }

    pub fn sheet_failed(
        self,
        input: &Path,
        sheet: &str,
        error: &dyn std::fmt::Display,
    ) -> String {
        match self {
            Language::English => format!(
                "Error while processing sheet {} of {}: {}",
                sheet,
                input.display(),
                error
            ),
            Language::Chinese => format!(
                "处理文件 {} 的工作表 {} 时出错: {}",
                input.display(),
                sheet,
                error
            ),
        }
    }

    pub fn file_failed(self, input: &Path, error: &dyn std::fmt::Display) -> String {
        match self {
            Language::English => format!("Failed to convert {}: {}", input.display(), error),
            Language::Chinese => format!("转换文件 {} 时出错: {}", input.display(), error),
        }
    }

    pub fn run_finished(self, summary: &RunSummary) -> String {
        match self {
            Language::English => format!(
                "xlsxcsv end. {} file(s): {} CSV written, {} skipped, {} sheet(s) failed, {} file(s) failed",
                summary.files_total,
                summary.sheets_written(),
                summary.sheets_skipped,
                summary.sheets_failed,
                summary.files_failed
            ),
            Language::Chinese => format!(
                "xlsxcsv 结束. 转换完成: {} 个文件, 生成 {} 个CSV, 跳过 {} 个, 工作表失败 {} 个, 文件失败 {} 个",
                summary.files_total,
                summary.sheets_written(),
                summary.sheets_skipped,
                summary.sheets_failed,
                summary.files_failed
            ),
        }
    }

    pub fn resolve_failed(self) -> String {
        match self {
            Language::English => "No input to convert".to_string(),
            Language::Chinese => "未找到任何可转换的文件".to_string(),
        }
    }

    pub fn invalid_options(self) -> String {
        match self {
            Language::English => "Invalid options".to_string(),
            Language::Chinese => "参数无效".to_string(),
        }
    }

    pub fn report_failed(self, path: &Path, error: &dyn std::fmt::Display) -> String {
        match self {
            Language::English => format!("Failed to write report {}: {}", path.display(), error),
            Language::Chinese => format!("写入报告 {} 时出错: {}", path.display(), error),
        }
    }
}

/// 変換イベントをログ行に変換するシンク
#[derive(Debug)]
pub struct LogSink {
    language: Language,
    verbose: bool,
    emit: Mutex<()>,
}

impl LogSink {
    pub fn new(language: Language, verbose: bool) -> Self {
        Self {
            language,
            verbose,
            emit: Mutex::new(()),
        }
    }

    /// 1ファイル分のログ行を（レベル, メッセージ）として組み立てる
    pub fn file_lines(&self, report: &FileReport) -> Vec<(log::Level, String)> {
        let lang = self.language;
        let mut lines = Vec::new();

        if self.verbose {
            lines.push((log::Level::Info, lang.file_started(&report.input)));
            lines.push((log::Level::Info, lang.reading_workbook(&report.input)));
        }

        match &report.outcome {
            FileOutcome::Failed(error) => {
                lines.push((log::Level::Error, lang.file_failed(&report.input, error)));
            }
            FileOutcome::Completed(sheets) => {
                for sheet in sheets {
                    match &sheet.outcome {
                        SheetOutcome::Written { rows, disposition } => {
                            if self.verbose && *disposition == Disposition::Overwrite {
                                lines.push((log::Level::Warn, lang.overwriting(&sheet.destination)));
                            }
                            lines.push((log::Level::Info, lang.generated(&sheet.destination, *rows)));
                        }
                        SheetOutcome::Skipped => {
                            lines.push((log::Level::Warn, lang.skipped(&sheet.destination)));
                        }
                        SheetOutcome::Failed(error) => {
                            lines.push((
                                log::Level::Error,
                                lang.sheet_failed(&report.input, &sheet.sheet, error),
                            ));
                        }
                    }
                }
            }
        }

        lines
    }
}

impl ConversionSink for LogSink {
    fn run_started(&self, files: usize) {
        if self.verbose {
            log::info!("{}", self.language.files_found(files));
        }
    }

    fn file_finished(&self, report: &FileReport) {
        // 1ファイル分の行が他のファイルの行と混ざらないようにまとめて出力する
        let _guard = self.emit.lock().unwrap_or_else(PoisonError::into_inner);
        let logger = log::logger();
        for (level, message) in self.file_lines(report) {
            logger.log(
                &log::Record::builder()
                    .args(format_args!("{}", message))
                    .level(level)
                    .target(module_path!())
                    .build(),
            );
        }
    }

    fn run_finished(&self, summary: &RunSummary) {
        log::info!("{}", self.language.run_finished(summary));
    }
}
