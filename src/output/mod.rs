//! Output Module
//!
//! 出力先パスの決定、既存ファイルに対する上書き判定、CSVの書き込みを提供するモジュール。

mod encoding;
mod writer;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::api::{Disposition, OverwritePolicy};

pub use writer::{write_csv, CsvOptions, CsvSheetWriter};

/// 出力先のCSVパスを決定する
///
/// `output_dir / (base_name + suffix + ".csv")` を返します。
/// ディレクトリ構造のミラーリングは呼び出し側で`output_dir`に反映済みであることを前提とします。
///
/// # 使用例
///
/// ```rust
/// use std::path::Path;
/// use xlsxcsv::resolve_output_path;
///
/// let path = resolve_output_path("report", "_Jan", Path::new("out"));
/// assert_eq!(path, Path::new("out").join("report_Jan.csv"));
/// ```
pub fn resolve_output_path(base_name: &str, suffix: &str, output_dir: &Path) -> PathBuf {
    output_dir.join(format!("{}{}.csv", base_name, suffix))
}

/// 出力先パスに対する上書き判定
///
/// 書き込みを開始する前に呼び出します。判定の結果`Skip`となった場合、
/// 出力先ファイルは一切変更されません。
///
/// | 出力先 | 方針 | 結果 |
/// | --- | --- | --- |
/// | 存在しない | 任意 | `New` |
/// | 存在する | `NoForce` | `SkippedExisting` |
/// | 存在する | `Force` | `Overwrite` |
pub fn arbitrate(path: &Path, policy: OverwritePolicy) -> Disposition {
    if !path.exists() {
        return Disposition::New;
    }
    match policy {
        OverwritePolicy::NoForce => Disposition::SkippedExisting,
        OverwritePolicy::Force => Disposition::Overwrite,
    }
}

/// 実行中の出力先パスごとのロック
///
/// 複数ファイルを並列に変換する場合でも、同じ出力先に対する判定と書き込みが
/// 同時に行われないようにします。
#[derive(Debug, Default)]
pub(crate) struct DestinationLocks {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl DestinationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力先パスに対応するロックを取得（なければ登録）
    pub fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }
}
