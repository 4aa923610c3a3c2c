//! Security Module
//!
//! 入力ファイルに対するセキュリティ制限を実装するモジュール。

use crate::error::XlsxToCsvError;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 2GB (2_147_483_648 bytes)
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: 2_147_483_648, // 2GB
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルサイズを検証する
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 上限以下の場合
    /// * `Err(XlsxToCsvError::SecurityViolation)` - 上限を超える場合
    pub fn check_input_size(&self, size: u64) -> Result<(), XlsxToCsvError> {
        if size > self.max_input_file_size {
            return Err(XlsxToCsvError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }
}
