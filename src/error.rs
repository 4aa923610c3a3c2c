//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use std::path::PathBuf;
use thiserror::Error;

/// xlsxcsvクレート全体で使用するエラー型
///
/// 入力ファイルの解決、ワークブックの読み込み、シートの変換、CSVの書き込み中に
/// 発生するすべてのエラーを統一的に扱います。
///
/// # エラーの分類
///
/// - 致命的（実行全体を中断）: `InputResolution`
/// - ファイル単位（ログ出力後、次のファイルへ）: `WorkbookOpen`, `SheetSelection`,
///   `SecurityViolation`
/// - シート単位（ログ出力後、次のシートへ）: `SheetProcessing`, `OutputWrite`,
///   `Encoding`, `Csv`
///
/// # 使用例
///
/// ```rust,no_run
/// use xlsxcsv::XlsxToCsvError;
/// use std::fs::File;
///
/// fn open_input(path: &str) -> Result<(), XlsxToCsvError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum XlsxToCsvError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー（calamine由来）
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// CSVシリアライズ中に発生したエラー
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ConverterBuilder::build()`時に、区切り文字やエンコーディング名などの
    /// 無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// 入力パスを解決できなかったエラー
    ///
    /// 入力パスが存在しない、またはワイルドカード・ディレクトリ走査の結果が
    /// 0件だった場合に発生します。このエラーのみ実行全体を中断します。
    #[error("Input resolution error: {0}")]
    InputResolution(String),

    /// ワークブックを開けなかったエラー
    ///
    /// 破損したファイル、非対応の形式、読み取り権限がない場合などに発生します。
    #[error("Failed to open workbook '{}': {message}", path.display())]
    WorkbookOpen {
        /// 対象のワークブック
        path: PathBuf,
        /// 詳細メッセージ
        message: String,
    },

    /// 変換対象のシートを選択できなかったエラー
    ///
    /// シートが1枚もない、インデックスが範囲外、シート名が見つからない場合に発生します。
    #[error("Sheet selection error: {0}")]
    SheetSelection(String),

    /// シートの読み込み・変換中に発生したエラー
    #[error("Failed to process sheet '{sheet}': {message}")]
    SheetProcessing {
        /// エラーが発生したシート名
        sheet: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// 出力ファイルの作成・書き込みに失敗したエラー
    ///
    /// 書き込み途中で失敗した場合、部分的に書き込まれたファイルはそのまま残ります。
    #[error("Failed to write '{}': {source}", path.display())]
    OutputWrite {
        /// 出力先のパス
        path: PathBuf,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// 出力エンコーディングで表現できない文字が含まれていたエラー
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルのサイズ上限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

impl XlsxToCsvError {
    /// 実行全体を中断すべきエラーかどうか
    ///
    /// 入力解決エラーのみが致命的です。それ以外はファイル単位・シート単位で
    /// ログに記録され、処理は継続されます。
    pub fn is_fatal(&self) -> bool {
        matches!(self, XlsxToCsvError::InputResolution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: XlsxToCsvError = io_err.into();

        match error {
            XlsxToCsvError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: XlsxToCsvError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_workbook_open_display() {
        let error = XlsxToCsvError::WorkbookOpen {
            path: PathBuf::from("/data/broken.xlsx"),
            message: "invalid zip header".to_string(),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("/data/broken.xlsx"));
        assert!(error_msg.contains("invalid zip header"));
    }

    #[test]
    fn test_sheet_processing_display() {
        let error = XlsxToCsvError::SheetProcessing {
            sheet: "Jan".to_string(),
            message: "disk full".to_string(),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("'Jan'"));
        assert!(error_msg.contains("disk full"));
    }

    #[test]
    fn test_output_write_keeps_source() {
        use std::error::Error as _;

        let error = XlsxToCsvError::OutputWrite {
            path: PathBuf::from("out/a.csv"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "Permission denied"),
        };

        assert!(error.to_string().contains("out/a.csv"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_only_input_resolution_is_fatal() {
        assert!(XlsxToCsvError::InputResolution("no files".to_string()).is_fatal());
        assert!(!XlsxToCsvError::Config("bad".to_string()).is_fatal());
        assert!(!XlsxToCsvError::SheetSelection("none".to_string()).is_fatal());
        assert!(!XlsxToCsvError::Encoding("x".to_string()).is_fatal());
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), XlsxToCsvError> {
            let _file = std::fs::File::open("nonexistent_file.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(XlsxToCsvError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: XlsxToCsvError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = XlsxToCsvError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let input_err = XlsxToCsvError::InputResolution("missing".to_string());
        assert!(input_err.to_string().starts_with("Input resolution error"));

        let security_err = XlsxToCsvError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
    }
}
