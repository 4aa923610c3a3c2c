//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use encoding_rs::Encoding;
use serde::Serialize;

use crate::error::XlsxToCsvError;

/// シート選択方式
///
/// 1つのワークブックから、どのシートをCSVに変換するかを指定します。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum SheetSelector {
    /// 先頭のシートのみを変換（デフォルト）
    ///
    /// 出力ファイル名にシート名は付きません（例: `book.csv`）。
    #[default]
    First,

    /// インデックス指定（0始まり）
    ///
    /// 出力ファイル名にシート名は付きません。
    Index(usize),

    /// シート名指定
    ///
    /// 出力ファイル名にシート名は付きません。
    Name(String),

    /// すべてのシートを変換
    ///
    /// シートごとに`{ファイル名}_{シート名}.csv`を出力します。
    All,
}

impl SheetSelector {
    /// CLIの`--sheet`引数を解釈する
    ///
    /// 数値として解釈できる場合はインデックス、それ以外はシート名として扱います。
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(value.to_string()),
        }
    }

    /// 全シートモードかどうか
    pub fn is_all(&self) -> bool {
        matches!(self, SheetSelector::All)
    }
}

/// 既存ファイルに対する上書き方針
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// 既存ファイルを上書きする（デフォルト）
    #[default]
    Force,

    /// 既存ファイルがあれば書き込みをスキップする
    NoForce,
}

/// 出力先パスごとの判定結果（ログ用の分類）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// 出力先が存在しない（新規作成）
    New,

    /// 出力先が存在し、上書きする
    Overwrite,

    /// 出力先が存在し、上書きしない
    SkippedExisting,
}

/// 判定結果に対応する動作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// 書き込みを行う
    Proceed,

    /// 書き込みを行わない
    Skip,
}

impl Disposition {
    /// この分類に対応する動作を返す
    pub fn action(self) -> Action {
        match self {
            Disposition::New | Disposition::Overwrite => Action::Proceed,
            Disposition::SkippedExisting => Action::Skip,
        }
    }
}

/// 出力テキストのエンコーディング
///
/// UTF-8とUTF-16はBOMの有無を含めて扱い、それ以外は`encoding_rs`が
/// 認識するラベル（例: `gbk`, `shift_jis`, `windows-1252`）で指定します。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TextEncoding {
    /// UTF-8
    Utf8 {
        /// 先頭にBOM（EF BB BF）を出力するか
        bom: bool,
    },

    /// UTF-16
    Utf16 {
        /// ビッグエンディアンで出力するか
        big_endian: bool,
        /// 先頭にBOMを出力するか
        bom: bool,
    },

    /// `encoding_rs`でエンコードする従来型エンコーディング（BOMなし）
    Legacy(&'static Encoding),
}

impl Default for TextEncoding {
    /// BOM付きUTF-8（`utf-8-sig`）
    fn default() -> Self {
        TextEncoding::Utf8 { bom: true }
    }
}

impl TextEncoding {
    /// エンコーディング名からエンコーディングを決定する
    ///
    /// 大文字小文字と`_`/`-`の違いは無視します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(TextEncoding)` - 認識できた場合
    /// * `Err(XlsxToCsvError::Config)` - 不明なラベル、または出力に使えないエンコーディングの場合
    ///
    /// # 使用例
    ///
    /// ```rust
    /// use xlsxcsv::TextEncoding;
    ///
    /// assert_eq!(
    ///     TextEncoding::from_label("UTF_8_SIG").unwrap(),
    ///     TextEncoding::Utf8 { bom: true }
    /// );
    /// assert!(TextEncoding::from_label("gbk").is_ok());
    /// ```
    pub fn from_label(label: &str) -> Result<Self, XlsxToCsvError> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");

        match normalized.as_str() {
            "utf-8-sig" | "utf8-sig" => return Ok(TextEncoding::Utf8 { bom: true }),
            "utf-16" | "utf16" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: false,
                    bom: true,
                })
            }
            "utf-16-le" | "utf16le" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: false,
                    bom: false,
                })
            }
            "utf-16-be" | "utf16be" => {
                return Ok(TextEncoding::Utf16 {
                    big_endian: true,
                    bom: false,
                })
            }
            _ => {}
        }

        let encoding = Encoding::for_label(normalized.as_bytes()).ok_or_else(|| {
            XlsxToCsvError::Config(format!("Unknown encoding: '{}'", label))
        })?;

        // 出力に使えないエンコーディング（replacement等）はUTF-8で書かれてしまうため拒否する
        if encoding.output_encoding() != encoding
            && encoding != encoding_rs::UTF_16LE
            && encoding != encoding_rs::UTF_16BE
        {
            return Err(XlsxToCsvError::Config(format!(
                "Encoding cannot be used for output: '{}'",
                label
            )));
        }

        Ok(if encoding == encoding_rs::UTF_8 {
            TextEncoding::Utf8 { bom: false }
        } else if encoding == encoding_rs::UTF_16LE {
            TextEncoding::Utf16 {
                big_endian: false,
                bom: false,
            }
        } else if encoding == encoding_rs::UTF_16BE {
            TextEncoding::Utf16 {
                big_endian: true,
                bom: false,
            }
        } else {
            TextEncoding::Legacy(encoding)
        })
    }

    /// ファイル先頭に出力するバイトオーダーマーク
    pub fn bom(&self) -> &'static [u8] {
        match self {
            TextEncoding::Utf8 { bom: true } => b"\xEF\xBB\xBF",
            TextEncoding::Utf16 {
                bom: true,
                big_endian: false,
            } => b"\xFF\xFE",
            TextEncoding::Utf16 {
                bom: true,
                big_endian: true,
            } => b"\xFE\xFF",
            _ => b"",
        }
    }

    /// 表示用のエンコーディング名
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 { bom: true } => "UTF-8 (BOM)",
            TextEncoding::Utf8 { bom: false } => "UTF-8",
            TextEncoding::Utf16 {
                big_endian: false,
                bom: true,
            } => "UTF-16 (BOM)",
            TextEncoding::Utf16 {
                big_endian: false,
                bom: false,
            } => "UTF-16LE",
            TextEncoding::Utf16 {
                big_endian: true, ..
            } => "UTF-16BE",
            TextEncoding::Legacy(encoding) => encoding.name(),
        }
    }
}
