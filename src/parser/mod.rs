//! Parser Module
//!
//! ワークブックの読み込みとシート選択を提供するモジュール。
//! 読み込みは`WorkbookSource`トレイトで抽象化し、calamineによる実装を標準とします。

mod memory;
mod selector;
mod workbook;

pub use memory::MemoryWorkbook;
pub use selector::select_sheets;
pub use workbook::CalamineWorkbook;

use crate::error::XlsxToCsvError;
use crate::types::Row;

/// シートの行を先頭から順に1度だけ返すイテレータ
pub type SheetRows<'a> = Box<dyn Iterator<Item = Row> + 'a>;

/// ワークブックリーダー
///
/// 開かれたワークブックについて、シート名の一覧と、シートごとの行の列挙を提供します。
/// 行は位置ベース（列はインデックスで識別）で、すべての行が同じ列数を持ちます。
pub trait WorkbookSource {
    /// ワークブック内の順序でシート名を返す
    fn sheet_names(&self) -> Vec<String>;

    /// 指定シートの行を列挙する
    ///
    /// # 戻り値
    ///
    /// * `Ok(SheetRows)` - 行のイテレータ（再開不可）
    /// * `Err(XlsxToCsvError::SheetProcessing)` - シートを読み込めなかった場合
    fn rows(&mut self, sheet: &str) -> Result<SheetRows<'_>, XlsxToCsvError>;
}
