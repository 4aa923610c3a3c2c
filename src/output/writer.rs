//! CSV Writer
//!
//! 正規化済みの行を、区切り文字とエンコーディングを指定してCSVとして書き込む。

use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::encoding::{EncodedWriter, UnmappableCharacter};
use crate::api::{Disposition, TextEncoding};
use crate::error::XlsxToCsvError;

/// CSVの出力設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    /// 区切り文字（ASCII 1文字）
    pub delimiter: u8,

    /// 出力エンコーディング
    pub encoding: TextEncoding,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: TextEncoding::default(),
        }
    }
}

/// 1シート分のCSVライター
///
/// 区切り文字・引用符・改行を含むフィールドはダブルクォートで囲み、
/// 内部のダブルクォートは2つにエスケープします。各行は`\n`で終わります。
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{CsvOptions, CsvSheetWriter, TextEncoding};
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let options = CsvOptions { delimiter: b',', encoding: TextEncoding::Utf8 { bom: false } };
/// let mut writer = CsvSheetWriter::new(Vec::new(), &options)?;
/// writer.write_row(&["x,y".to_string(), "1".to_string()])?;
/// let (rows, bytes) = writer.finish()?;
/// assert_eq!(rows, 1);
/// assert_eq!(bytes, b"\"x,y\",1\n");
/// # Ok(())
/// # }
/// ```
pub struct CsvSheetWriter<W: Write> {
    writer: csv::Writer<EncodedWriter<W>>,
    rows: u64,
}

impl<W: Write> CsvSheetWriter<W> {
    /// ライターを生成し、エンコーディングがBOMを要求する場合はBOMを書き込む
    pub fn new(inner: W, options: &CsvOptions) -> Result<Self, XlsxToCsvError> {
        let encoded = EncodedWriter::new(inner, options.encoding).map_err(map_io_error)?;
        let writer = WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote_style(QuoteStyle::Necessary)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(encoded);

        Ok(Self { writer, rows: 0 })
    }

    /// 1行を書き込む
    pub fn write_row(&mut self, fields: &[String]) -> Result<(), XlsxToCsvError> {
        self.writer.write_record(fields).map_err(map_csv_error)?;
        self.rows += 1;
        Ok(())
    }

    /// 書き込み済みの行数
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// バッファを書き出し、行数と内側のライターを返す
    pub fn finish(self) -> Result<(u64, W), XlsxToCsvError> {
        let encoded = self
            .writer
            .into_inner()
            .map_err(|e| map_io_error(e.into_error()))?;
        let inner = encoded.finish().map_err(map_io_error)?;
        Ok((self.rows, inner))
    }
}

/// 行を出力先ファイルに書き込む
///
/// 出力先は判定結果に従って開きます。
///
/// - `New`: 新規作成（既に存在する場合は失敗し、既存ファイルには触れない）
/// - `Overwrite`: 切り詰めて上書き
/// - `SkippedExisting`: 書き込まずにエラー
///
/// # 戻り値
///
/// * `Ok(u64)` - 書き込んだ行数
/// * `Err(XlsxToCsvError::OutputWrite)` - 作成・書き込みに失敗した場合
///   （部分的に書き込まれたファイルは残ります）
/// * `Err(XlsxToCsvError::Encoding)` - 出力エンコーディングで表現できない文字があった場合
pub fn write_csv<I>(
    rows: I,
    destination: &Path,
    disposition: Disposition,
    options: &CsvOptions,
) -> Result<u64, XlsxToCsvError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let file = open_destination(destination, disposition).map_err(|source| {
        XlsxToCsvError::OutputWrite {
            path: destination.to_path_buf(),
            source,
        }
    })?;

    write_rows_to(BufWriter::new(file), rows, options).map_err(|e| match e {
        XlsxToCsvError::Io(source) => XlsxToCsvError::OutputWrite {
            path: destination.to_path_buf(),
            source,
        },
        other => other,
    })
}

fn write_rows_to<W, I>(inner: W, rows: I, options: &CsvOptions) -> Result<u64, XlsxToCsvError>
where
    W: Write,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = CsvSheetWriter::new(inner, options)?;
    for row in rows {
        writer.write_row(&row)?;
    }
    let (count, _) = writer.finish()?;
    Ok(count)
}

fn open_destination(destination: &Path, disposition: Disposition) -> io::Result<File> {
    match disposition {
        Disposition::New => OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination),
        Disposition::Overwrite => OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(destination),
        Disposition::SkippedExisting => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination exists and overwriting is disabled",
        )),
    }
}

fn map_io_error(err: io::Error) -> XlsxToCsvError {
    match err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<UnmappableCharacter>())
    {
        Some(unmappable) => XlsxToCsvError::Encoding(unmappable.to_string()),
        None => XlsxToCsvError::Io(err),
    }
}

fn map_csv_error(err: csv::Error) -> XlsxToCsvError {
    if !err.is_io_error() {
        return XlsxToCsvError::Csv(err);
    }
    match err.into_kind() {
        csv::ErrorKind::Io(io_err) => map_io_error(io_err),
        kind => XlsxToCsvError::Config(format!("Unexpected CSV error: {:?}", kind)),
    }
}
