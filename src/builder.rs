//! Builder Module
//!
//! Fluent Builder APIを提供し、`Converter`インスタンスを段階的に構築する。
//! `Converter`は1ファイルごとにワークブックを開き、シートを選択し、
//! 出力先の判定とCSVの書き込みを行う。

use rayon::prelude::*;
use std::path::Path;
use std::sync::PoisonError;

use crate::api::{Action, OverwritePolicy, SheetSelector, TextEncoding};
use crate::error::XlsxToCsvError;
use crate::formatter::CellFormatter;
use crate::output::{arbitrate, resolve_output_path, write_csv, CsvOptions, DestinationLocks};
use crate::parser::{select_sheets, CalamineWorkbook, SheetRows, WorkbookSource};
use crate::report::{
    ConversionSink, FileOutcome, FileReport, RunSummary, SheetOutcome, SheetReport,
};
use crate::types::{ConversionTarget, SelectedSheet};

/// 変換処理の設定を保持する内部構造体
///
/// 実行中は変更されません。
#[derive(Debug, Clone)]
pub(crate) struct ConversionConfig {
    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 区切り文字・エンコーディング
    pub csv: CsvOptions,

    /// シートの先頭行（ヘッダー）を出力するか
    pub include_header: bool,

    /// 先頭に行番号の列を追加するか
    pub include_index: bool,

    /// 既存ファイルに対する上書き方針
    pub overwrite_policy: OverwritePolicy,

    /// 並列に処理するファイル数
    pub workers: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            sheet_selector: SheetSelector::First,
            csv: CsvOptions::default(),
            include_header: true,
            include_index: false,
            overwrite_policy: OverwritePolicy::Force,
            workers: 1,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Converter`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{ConverterBuilder, OverwritePolicy, SheetSelector};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let converter = ConverterBuilder::new()
///     .with_sheet_selector(SheetSelector::All)
///     .with_delimiter(';')
///     .with_encoding_label("gbk")
///     .with_overwrite_policy(OverwritePolicy::NoForce)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConverterBuilder {
    /// 内部設定（構築中）
    config: ConversionConfig,

    /// 区切り文字（`build()`時に検証）
    delimiter: char,

    /// エンコーディング名（`build()`時に解決）
    encoding_label: Option<String>,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - シート選択: 先頭のシート
    /// - 区切り文字: `,`
    /// - エンコーディング: BOM付きUTF-8
    /// - ヘッダー: 出力する
    /// - 行番号の列: 出力しない
    /// - 上書き方針: 上書きする
    /// - 並列数: 1（逐次処理）
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
            delimiter: ',',
            encoding_label: None,
        }
    }

    /// 変換対象のシートを選択する
    ///
    /// ```rust
    /// use xlsxcsv::{ConverterBuilder, SheetSelector};
    ///
    /// // すべてのシートを`{ファイル名}_{シート名}.csv`に出力
    /// let builder = ConverterBuilder::new().with_sheet_selector(SheetSelector::All);
    ///
    /// // シート名で1枚だけ選択
    /// let builder = ConverterBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Name("Summary".to_string()));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 区切り文字を指定する
    ///
    /// ASCIIの1文字で、`"`・CR・LF以外である必要があります。
    /// 違反している場合は`build()`時に`XlsxToCsvError::Config`を返します。
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// 出力エンコーディングを指定する
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.config.csv.encoding = encoding;
        self.encoding_label = None;
        self
    }

    /// 出力エンコーディングを名前で指定する
    ///
    /// 名前は`build()`時に[`TextEncoding::from_label`]で解決されます。
    pub fn with_encoding_label(mut self, label: impl Into<String>) -> Self {
        self.encoding_label = Some(label.into());
        self
    }

    /// シートの先頭行（ヘッダー）を出力するかを指定する
    ///
    /// * `true`: 先頭行をそのまま出力（デフォルト）
    /// * `false`: 先頭行を出力しない
    pub fn include_header(mut self, include: bool) -> Self {
        self.config.include_header = include;
        self
    }

    /// 先頭に行番号の列を追加するかを指定する
    ///
    /// データ行には0から順に番号が付きます。ヘッダー行の番号欄は空になります。
    pub fn include_index(mut self, include: bool) -> Self {
        self.config.include_index = include;
        self
    }

    /// 既存ファイルに対する上書き方針を指定する
    pub fn with_overwrite_policy(mut self, policy: OverwritePolicy) -> Self {
        self.config.overwrite_policy = policy;
        self
    }

    /// 並列に処理するファイル数を指定する
    ///
    /// 2以上の場合は専用のrayonスレッドプールで複数ファイルを同時に処理します。
    /// 同じファイル内のシートは常に順番に処理されます。
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// 設定を検証し、`Converter`インスタンスを生成する
    ///
    /// # 戻り値
    ///
    /// * `Ok(Converter)`: 設定が有効な場合
    /// * `Err(XlsxToCsvError::Config)`: 設定が無効な場合
    ///
    /// # 発生し得るエラー
    ///
    /// * 区切り文字がASCIIの1文字でない、または`"`・CR・LF
    /// * エンコーディング名が不明
    /// * 並列数が0
    /// * スレッドプールを生成できない
    pub fn build(mut self) -> Result<Converter, XlsxToCsvError> {
        // 1. 区切り文字の検証
        self.config.csv.delimiter = validate_delimiter(self.delimiter)?;

        // 2. エンコーディングの解決
        if let Some(label) = &self.encoding_label {
            self.config.csv.encoding = TextEncoding::from_label(label)?;
        }

        // 3. 並列数の検証
        if self.config.workers == 0 {
            return Err(XlsxToCsvError::Config(
                "Worker count must be at least 1".to_string(),
            ));
        }

        let pool = if self.config.workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.workers)
                .build()
                .map_err(|e| {
                    XlsxToCsvError::Config(format!("Failed to create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Converter::new(self.config, pool))
    }
}

fn validate_delimiter(delimiter: char) -> Result<u8, XlsxToCsvError> {
    if !delimiter.is_ascii() {
        return Err(XlsxToCsvError::Config(format!(
            "Delimiter must be a single ASCII character: {:?}",
            delimiter
        )));
    }
    if matches!(delimiter, '"' | '\r' | '\n') {
        return Err(XlsxToCsvError::Config(format!(
            "Delimiter cannot be a quote or line break: {:?}",
            delimiter
        )));
    }
    Ok(delimiter as u8)
}

/// 変換処理のファサード
///
/// 入力ファイルごとに以下の順で処理します。
///
/// 1. 出力ディレクトリの作成
/// 2. ワークブックを開く
/// 3. シートの選択
/// 4. シートごとに: 出力先の決定 → 上書き判定 → 書き込み、またはスキップ
///
/// ワークブックを開けない場合はそのファイルのみ失敗とし、シートの失敗は
/// 同じファイルの他のシートに影響しません。
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxcsv::{resolve_targets, ConverterBuilder, NullSink};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let converter = ConverterBuilder::new().build()?;
/// let targets = resolve_targets(Path::new("data"), Path::new("out"), &["xlsx".to_string()])?;
/// let summary = converter.run(&targets, &NullSink);
/// println!("{} files converted", summary.files_converted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Converter {
    /// 変換設定
    config: ConversionConfig,

    /// セルフォーマッター
    formatter: CellFormatter,

    /// 並列処理用のスレッドプール（並列数1の場合はNone）
    pool: Option<rayon::ThreadPool>,

    /// 出力先ごとのロック
    locks: DestinationLocks,
}

impl Converter {
    pub(crate) fn new(config: ConversionConfig, pool: Option<rayon::ThreadPool>) -> Self {
        Self {
            formatter: CellFormatter::new(),
            config,
            pool,
            locks: DestinationLocks::new(),
        }
    }

    /// すべての変換対象を処理する
    ///
    /// ファイルごとの結果は処理が終わるたびに`sink`へ通知されます。
    /// 個々のファイル・シートの失敗で処理は中断されません。
    ///
    /// # 戻り値
    ///
    /// 入力順に並んだ集計
    pub fn run(&self, targets: &[ConversionTarget], sink: &dyn ConversionSink) -> RunSummary {
        sink.run_started(targets.len());

        let convert = |target: &ConversionTarget| {
            let report = self.convert_target(target);
            sink.file_finished(&report);
            report
        };

        // collect()は並列処理時も入力順を保持する
        let reports: Vec<FileReport> = match &self.pool {
            Some(pool) => pool.install(|| targets.par_iter().map(convert).collect()),
            None => targets.iter().map(convert).collect(),
        };

        let summary = RunSummary::from_reports(&reports);
        sink.run_finished(&summary);
        summary
    }

    /// 1つの入力ファイルを変換する
    pub fn convert_target(&self, target: &ConversionTarget) -> FileReport {
        let outcome = match self.open_target(target) {
            Ok(mut workbook) => {
                match self.convert_workbook(&mut workbook, &target.base_name(), &target.output_dir)
                {
                    Ok(sheets) => FileOutcome::Completed(sheets),
                    Err(error) => FileOutcome::Failed(error),
                }
            }
            Err(error) => FileOutcome::Failed(error),
        };

        FileReport {
            input: target.input.clone(),
            output_dir: target.output_dir.clone(),
            outcome,
        }
    }

    fn open_target(&self, target: &ConversionTarget) -> Result<CalamineWorkbook, XlsxToCsvError> {
        // 既に存在する場合もエラーにならない
        std::fs::create_dir_all(&target.output_dir).map_err(|source| {
            XlsxToCsvError::OutputWrite {
                path: target.output_dir.clone(),
                source,
            }
        })?;
        CalamineWorkbook::open(&target.input)
    }

    /// 開かれたワークブックを変換する
    ///
    /// # 引数
    ///
    /// * `workbook` - ワークブック
    /// * `base_name` - 出力ファイル名の基になる名前
    /// * `output_dir` - 出力先ディレクトリ（作成済みであること）
    ///
    /// # 戻り値
    ///
    /// * `Ok(Vec<SheetReport>)` - 選択したシートごとの結果（シートの失敗を含む）
    /// * `Err(XlsxToCsvError::SheetSelection)` - シートを選択できなかった場合
    pub fn convert_workbook(
        &self,
        workbook: &mut dyn WorkbookSource,
        base_name: &str,
        output_dir: &Path,
    ) -> Result<Vec<SheetReport>, XlsxToCsvError> {
        let selected = select_sheets(&workbook.sheet_names(), &self.config.sheet_selector)?;

        Ok(selected
            .iter()
            .map(|sheet| self.convert_sheet(workbook, sheet, base_name, output_dir))
            .collect())
    }

    fn convert_sheet(
        &self,
        workbook: &mut dyn WorkbookSource,
        selected: &SelectedSheet,
        base_name: &str,
        output_dir: &Path,
    ) -> SheetReport {
        let destination = resolve_output_path(base_name, &selected.suffix, output_dir);

        // 同じ出力先に対する判定と書き込みは直列化する
        let lock = self.locks.lock_for(&destination);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let disposition = arbitrate(&destination, self.config.overwrite_policy);
        let outcome = match disposition.action() {
            Action::Skip => SheetOutcome::Skipped,
            Action::Proceed => {
                let result = workbook.rows(&selected.sheet.name).and_then(|rows| {
                    write_csv(
                        self.shape_rows(rows),
                        &destination,
                        disposition,
                        &self.config.csv,
                    )
                });
                match result {
                    Ok(rows) => SheetOutcome::Written { rows, disposition },
                    Err(error) => SheetOutcome::Failed(error),
                }
            }
        };

        SheetReport {
            sheet: selected.sheet.name.clone(),
            destination,
            outcome,
        }
    }

    /// ヘッダー・行番号の設定に従って行を正規化する
    fn shape_rows<'r>(&self, rows: SheetRows<'r>) -> impl Iterator<Item = Vec<String>> + 'r {
        let formatter = self.formatter;
        let include_header = self.config.include_header;
        let include_index = self.config.include_index;

        rows.skip(usize::from(!include_header))
            .enumerate()
            .map(move |(position, row)| {
                let mut fields = formatter.normalize_row(&row);
                if include_index {
                    let index = match (include_header, position) {
                        (true, 0) => String::new(),
                        (true, n) => (n - 1).to_string(),
                        (false, n) => n.to_string(),
                    };
                    fields.insert(0, index);
                }
                fields
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Disposition;
    use crate::parser::MemoryWorkbook;
    use crate::report::CollectingSink;
    use crate::types::CellValue;
    use tempfile::TempDir;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn plain_builder() -> ConverterBuilder {
        ConverterBuilder::new().with_encoding(TextEncoding::Utf8 { bom: false })
    }

    fn sample_workbook() -> MemoryWorkbook {
        MemoryWorkbook::new()
            .with_sheet(
                "Jan",
                vec![
                    vec![text("A"), text("B")],
                    vec![CellValue::Number(1.0), CellValue::Bool(true)],
                    vec![text("x,y"), CellValue::Empty],
                ],
            )
            .with_sheet("Feb", vec![vec![text("only")]])
    }

    #[test]
    fn test_converter_builder_new() {
        let builder = ConverterBuilder::new();
        assert_eq!(builder.config.sheet_selector, SheetSelector::First);
        assert_eq!(builder.delimiter, ',');
        assert_eq!(builder.config.csv.encoding, TextEncoding::Utf8 { bom: true });
        assert!(builder.config.include_header);
        assert!(!builder.config.include_index);
        assert_eq!(builder.config.overwrite_policy, OverwritePolicy::Force);
        assert_eq!(builder.config.workers, 1);
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ConverterBuilder::new()
            .with_sheet_selector(SheetSelector::All)
            .with_delimiter('\t')
            .include_header(false)
            .include_index(true)
            .with_overwrite_policy(OverwritePolicy::NoForce)
            .with_workers(4);

        assert!(builder.config.sheet_selector.is_all());
        assert_eq!(builder.delimiter, '\t');
        assert!(!builder.config.include_header);
        assert!(builder.config.include_index);
        assert_eq!(builder.config.overwrite_policy, OverwritePolicy::NoForce);

        let converter = builder.build().unwrap();
        assert_eq!(converter.config.csv.delimiter, b'\t');
        assert!(converter.pool.is_some());
    }

    #[test]
    fn test_build_rejects_invalid_delimiters() {
        for delimiter in ['"', '\n', '\r', '；'] {
            match ConverterBuilder::new().with_delimiter(delimiter).build() {
                Err(XlsxToCsvError::Config(msg)) => assert!(msg.contains("Delimiter")),
                other => panic!("Expected Config error for {:?}, got {:?}", delimiter, other),
            }
        }
    }

    #[test]
    fn test_build_rejects_unknown_encoding() {
        let result = ConverterBuilder::new()
            .with_encoding_label("no-such-encoding")
            .build();
        assert!(matches!(result, Err(XlsxToCsvError::Config(_))));
    }

    #[test]
    fn test_build_resolves_encoding_label() {
        let converter = ConverterBuilder::new()
            .with_encoding_label("utf-8")
            .build()
            .unwrap();
        assert_eq!(
            converter.config.csv.encoding,
            TextEncoding::Utf8 { bom: false }
        );
    }

    #[test]
    fn test_build_rejects_zero_workers() {
        let result = ConverterBuilder::new().with_workers(0).build();
        assert!(matches!(result, Err(XlsxToCsvError::Config(_))));
    }

    #[test]
    fn test_sequential_by_default() {
        let converter = ConverterBuilder::new().build().unwrap();
        assert!(converter.pool.is_none());
    }

    #[test]
    fn test_convert_first_sheet() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().build().unwrap();
        let mut workbook = sample_workbook();

        let sheets = converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();

        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].sheet, "Jan");
        assert_eq!(sheets[0].destination, dir.path().join("book.csv"));
        assert!(matches!(
            sheets[0].outcome,
            SheetOutcome::Written {
                rows: 3,
                disposition: Disposition::New
            }
        ));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("book.csv")).unwrap(),
            "A,B\n1,TRUE\n\"x,y\",\n"
        );
    }

    #[test]
    fn test_convert_all_sheets_uses_suffixes() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder()
            .with_sheet_selector(SheetSelector::All)
            .build()
            .unwrap();
        let mut workbook = sample_workbook();

        converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();

        assert!(dir.path().join("book_Jan.csv").exists());
        assert!(dir.path().join("book_Feb.csv").exists());
        assert!(!dir.path().join("book.csv").exists());
    }

    #[test]
    fn test_no_header_drops_first_row() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().include_header(false).build().unwrap();
        let mut workbook = sample_workbook();

        converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("book.csv")).unwrap(),
            "1,TRUE\n\"x,y\",\n"
        );
    }

    #[test]
    fn test_index_column_with_header() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().include_index(true).build().unwrap();
        let mut workbook = sample_workbook();

        converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("book.csv")).unwrap(),
            ",A,B\n0,1,TRUE\n1,\"x,y\",\n"
        );
    }

    #[test]
    fn test_index_column_without_header() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder()
            .include_header(false)
            .include_index(true)
            .build()
            .unwrap();
        let mut workbook = sample_workbook();

        converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.path().join("book.csv")).unwrap(),
            "0,1,TRUE\n1,\"x,y\",\n"
        );
    }

    #[test]
    fn test_no_force_skips_existing_destination() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("book.csv");
        std::fs::write(&destination, "original").unwrap();

        let converter = plain_builder()
            .with_overwrite_policy(OverwritePolicy::NoForce)
            .build()
            .unwrap();
        let sheets = converter
            .convert_workbook(&mut sample_workbook(), "book", dir.path())
            .unwrap();

        assert!(matches!(sheets[0].outcome, SheetOutcome::Skipped));
        assert_eq!(std::fs::read_to_string(&destination).unwrap(), "original");
    }

    #[test]
    fn test_force_overwrites_existing_destination() {
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("book.csv");
        std::fs::write(&destination, "original").unwrap();

        let converter = plain_builder().build().unwrap();
        let sheets = converter
            .convert_workbook(&mut sample_workbook(), "book", dir.path())
            .unwrap();

        assert!(matches!(
            sheets[0].outcome,
            SheetOutcome::Written {
                disposition: Disposition::Overwrite,
                ..
            }
        ));
        assert!(std::fs::read_to_string(&destination)
            .unwrap()
            .starts_with("A,B\n"));
    }

    #[test]
    fn test_empty_workbook_is_a_selection_error() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().build().unwrap();
        let result = converter.convert_workbook(&mut MemoryWorkbook::new(), "book", dir.path());
        assert!(matches!(result, Err(XlsxToCsvError::SheetSelection(_))));
    }

    #[test]
    fn test_sheet_failure_does_not_stop_siblings() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder()
            .with_sheet_selector(SheetSelector::All)
            .with_encoding_label("windows-1252")
            .build()
            .unwrap();
        let mut workbook = MemoryWorkbook::new()
            .with_sheet("Bad", vec![vec![text("漢字")]])
            .with_sheet("Good", vec![vec![text("plain")]]);

        let sheets = converter
            .convert_workbook(&mut workbook, "book", dir.path())
            .unwrap();

        assert!(matches!(
            sheets[0].outcome,
            SheetOutcome::Failed(XlsxToCsvError::Encoding(_))
        ));
        assert!(matches!(sheets[1].outcome, SheetOutcome::Written { rows: 1, .. }));
    }

    #[test]
    fn test_run_reports_missing_workbook_and_continues() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().build().unwrap();
        let targets = vec![
            ConversionTarget::new(dir.path().join("missing.xlsx"), dir.path().join("out")),
            ConversionTarget::new(dir.path().join("also_missing.xlsx"), dir.path().join("out")),
        ];
        let sink = CollectingSink::new();

        let summary = converter.run(&targets, &sink);

        assert_eq!(summary.files_total, 2);
        assert_eq!(summary.files_failed, 2);
        assert_eq!(sink.started(), Some(2));
        assert_eq!(sink.files().len(), 2);
        assert!(sink.summary().is_some());
        // 出力ディレクトリは作成される
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn test_parallel_run_keeps_input_order() {
        let dir = TempDir::new().unwrap();
        let converter = plain_builder().with_workers(3).build().unwrap();
        let targets: Vec<ConversionTarget> = (0..6)
            .map(|i| {
                ConversionTarget::new(dir.path().join(format!("{}.xlsx", i)), dir.path())
            })
            .collect();

        let summary = converter.run(&targets, &crate::report::NullSink);
        let inputs: Vec<_> = summary.files.iter().map(|f| f.input.clone()).collect();
        let expected: Vec<_> = targets.iter().map(|t| t.input.clone()).collect();
        assert_eq!(inputs, expected);
    }
}
