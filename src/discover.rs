//! Input Resolution
//!
//! 入力パス（単一ファイル・ディレクトリ・ワイルドカード）から変換対象の一覧を作成する。

use glob::{glob, Pattern};
use std::path::{Path, PathBuf};

use crate::error::XlsxToCsvError;
use crate::types::ConversionTarget;

/// Excelが編集中に作成するロックファイルの接頭辞
const LOCK_FILE_PREFIX: &str = "~$";

/// 入力パスを変換対象の一覧に解決する
///
/// - ワイルドカード（`*`, `?`, `[`）を含む場合: 一致したファイルを`output_root`に出力
/// - ディレクトリの場合: 配下を再帰的に走査し、`extensions`に一致するファイルを
///   入力ディレクトリからの相対パスを反映したディレクトリに出力
/// - ファイルの場合: そのファイルを`output_root`に出力
///
/// ロックファイル（`~$`で始まるファイル）は除外され、結果はパス順に並びます。
/// `output_root`はこの時点で作成されます。
///
/// # 戻り値
///
/// * `Ok(Vec<ConversionTarget>)` - 1件以上の変換対象
/// * `Err(XlsxToCsvError::InputResolution)` - 入力パスが存在しない、または一致するファイルがない場合
/// * `Err(XlsxToCsvError::OutputWrite)` - 出力ディレクトリを作成できない場合
///
/// # 使用例
///
/// ```rust,no_run
/// use std::path::Path;
/// use xlsxcsv::resolve_targets;
///
/// # fn main() -> Result<(), xlsxcsv::XlsxToCsvError> {
/// let targets = resolve_targets(Path::new("reports"), Path::new("out"), &["xlsx".to_string()])?;
/// for target in &targets {
///     println!("{} -> {}", target.input.display(), target.output_dir.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn resolve_targets(
    input: &Path,
    output_root: &Path,
    extensions: &[String],
) -> Result<Vec<ConversionTarget>, XlsxToCsvError> {
    let input_str = input.to_string_lossy();

    // 実在するパスは、ワイルドカード文字を含んでいても文字どおりに扱う
    let mut targets = if input.is_dir() {
        walk_directory(input, output_root, extensions)?
    } else if input.exists() {
        vec![ConversionTarget::new(input, output_root)]
    } else if is_wildcard(&input_str) {
        expand_pattern(&input_str)?
            .into_iter()
            .filter(|path| path.is_file())
            .map(|path| ConversionTarget::new(path, output_root))
            .collect()
    } else {
        return Err(XlsxToCsvError::InputResolution(format!(
            "Input path does not exist: {}",
            input.display()
        )));
    };

    targets.retain(|target| !is_lock_file(&target.input));
    targets.sort_by(|a, b| a.input.cmp(&b.input));
    targets.dedup_by(|a, b| a.input == b.input);

    if targets.is_empty() {
        return Err(XlsxToCsvError::InputResolution(format!(
            "No matching files found: {}",
            input.display()
        )));
    }

    std::fs::create_dir_all(output_root).map_err(|source| XlsxToCsvError::OutputWrite {
        path: output_root.to_path_buf(),
        source,
    })?;

    Ok(targets)
}

fn is_wildcard(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(LOCK_FILE_PREFIX))
        .unwrap_or(false)
}

fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>, XlsxToCsvError> {
    let paths = glob(pattern).map_err(|e| {
        XlsxToCsvError::InputResolution(format!("Invalid wildcard pattern '{}': {}", pattern, e))
    })?;
    // 読み取れないエントリは無視する
    Ok(paths.filter_map(Result::ok).collect())
}

/// ディレクトリ配下を再帰的に走査し、出力先に相対パスを反映する
fn walk_directory(
    root: &Path,
    output_root: &Path,
    extensions: &[String],
) -> Result<Vec<ConversionTarget>, XlsxToCsvError> {
    let escaped_root = Pattern::escape(&root.to_string_lossy());
    let mut targets = Vec::new();

    for extension in extensions {
        let extension = extension.trim_start_matches('.');
        let pattern = format!("{}/**/*.{}", escaped_root, extension);

        for path in expand_pattern(&pattern)? {
            if !path.is_file() {
                continue;
            }
            let relative_dir = path
                .parent()
                .and_then(|parent| parent.strip_prefix(root).ok())
                .unwrap_or_else(|| Path::new(""));
            targets.push(ConversionTarget::new(
                path.clone(),
                output_root.join(relative_dir),
            ));
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn xlsx() -> Vec<String> {
        vec!["xlsx".to_string()]
    }

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_single_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("book.xlsx");
        touch(&input);
        let out = dir.path().join("out");

        let targets = resolve_targets(&input, &out, &xlsx()).unwrap();
        assert_eq!(targets, vec![ConversionTarget::new(&input, &out)]);
        assert!(out.is_dir());
    }

    #[test]
    fn test_existing_file_with_glob_characters_is_literal() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("report[1].xlsx");
        touch(&input);
        touch(&dir.path().join("report1.xlsx"));
        let out = dir.path().join("out");

        let targets = resolve_targets(&input, &out, &xlsx()).unwrap();
        assert_eq!(targets, vec![ConversionTarget::new(&input, &out)]);
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = resolve_targets(&dir.path().join("nope.xlsx"), dir.path(), &xlsx()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_directory_is_mirrored() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("top.xlsx"));
        touch(&root.join("sub").join("file.xlsx"));
        touch(&root.join("sub").join("notes.txt"));
        let out = dir.path().join("out");

        let targets = resolve_targets(&root, &out, &xlsx()).unwrap();

        assert_eq!(targets.len(), 2);
        let nested = targets
            .iter()
            .find(|t| t.input.ends_with("sub/file.xlsx"))
            .unwrap();
        assert_eq!(nested.output_dir, out.join("sub"));
        let top = targets.iter().find(|t| t.input.ends_with("top.xlsx")).unwrap();
        assert_eq!(top.output_dir, out);
    }

    #[test]
    fn test_lock_files_are_excluded() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("file.xlsx"));
        touch(&root.join("~$file.xlsx"));

        let targets = resolve_targets(&root, &dir.path().join("out"), &xlsx()).unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets[0].input.ends_with("file.xlsx"));
        assert!(!is_lock_file(&targets[0].input));
    }

    #[test]
    fn test_only_lock_files_is_fatal() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("~$file.xlsx"));

        let err = resolve_targets(&root, &dir.path().join("out"), &xlsx()).unwrap_err();
        assert!(matches!(err, XlsxToCsvError::InputResolution(_)));
    }

    #[test]
    fn test_wildcard_is_flat_and_sorted() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("b.xlsx"));
        touch(&dir.path().join("a.xlsx"));
        touch(&dir.path().join("~$a.xlsx"));
        let out = dir.path().join("out");

        let pattern = format!("{}/*.xlsx", Pattern::escape(&dir.path().to_string_lossy()));
        let targets = resolve_targets(Path::new(&pattern), &out, &xlsx()).unwrap();

        assert_eq!(targets.len(), 2);
        assert!(targets[0].input.ends_with("a.xlsx"));
        assert!(targets[1].input.ends_with("b.xlsx"));
        assert!(targets.iter().all(|t| t.output_dir == out));
    }

    #[test]
    fn test_wildcard_without_matches_is_fatal() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.xlsx", Pattern::escape(&dir.path().to_string_lossy()));
        let err = resolve_targets(Path::new(&pattern), dir.path(), &xlsx()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_multiple_extensions_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("root");
        touch(&root.join("a.xlsx"));
        touch(&root.join("b.xls"));

        let extensions = vec!["xlsx".to_string(), ".xls".to_string(), "xlsx".to_string()];
        let targets = resolve_targets(&root, &dir.path().join("out"), &extensions).unwrap();
        assert_eq!(targets.len(), 2);
    }
}
