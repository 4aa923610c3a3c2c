//! Sheet Selector
//!
//! シート名の一覧と選択方式から、変換対象のシートと出力ファイル名のサフィックスを決定する。

use crate::api::SheetSelector;
use crate::error::XlsxToCsvError;
use crate::types::{SelectedSheet, SheetDescriptor};

/// シート選択方式に基づいてシートを選択
///
/// # 引数
///
/// * `sheet_names` - ワークブック内の順序でのシート名
/// * `selector` - シート選択方式
///
/// # 戻り値
///
/// * `Ok(Vec<SelectedSheet>)` - 選択されたシートとサフィックス
///   * `All`: すべてのシート、サフィックスは`_{シート名}`
///   * それ以外: 1枚のみ、サフィックスは空文字列
/// * `Err(XlsxToCsvError::SheetSelection)` - シートが1枚もない、インデックスが範囲外、
///   またはシート名が見つからない場合
///
/// # 使用例
///
/// ```rust
/// use xlsxcsv::{select_sheets, SheetSelector};
///
/// let names = vec!["Jan".to_string(), "Feb".to_string()];
/// let selected = select_sheets(&names, &SheetSelector::All).unwrap();
/// assert_eq!(selected[1].suffix, "_Feb");
/// ```
pub fn select_sheets(
    sheet_names: &[String],
    selector: &SheetSelector,
) -> Result<Vec<SelectedSheet>, XlsxToCsvError> {
    if sheet_names.is_empty() {
        return Err(XlsxToCsvError::SheetSelection(
            "Workbook contains no sheets".to_string(),
        ));
    }

    let single = |index: usize| {
        vec![SelectedSheet {
            sheet: SheetDescriptor {
                name: sheet_names[index].clone(),
                index,
            },
            suffix: String::new(),
        }]
    };

    match selector {
        SheetSelector::First => Ok(single(0)),

        SheetSelector::Index(index) => {
            if *index >= sheet_names.len() {
                return Err(XlsxToCsvError::SheetSelection(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    sheet_names.len()
                )));
            }
            Ok(single(*index))
        }

        SheetSelector::Name(name) => sheet_names
            .iter()
            .position(|candidate| candidate == name)
            .map(single)
            .ok_or_else(|| XlsxToCsvError::SheetSelection(format!("Sheet '{}' not found", name))),

        SheetSelector::All => Ok(sheet_names
            .iter()
            .enumerate()
            .map(|(index, name)| SelectedSheet {
                sheet: SheetDescriptor {
                    name: name.clone(),
                    index,
                },
                suffix: format!("_{}", name),
            })
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_first_sheet_has_empty_suffix() {
        let selected = select_sheets(&names(&["Jan", "Feb"]), &SheetSelector::First).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].sheet.name, "Jan");
        assert_eq!(selected[0].sheet.index, 0);
        assert_eq!(selected[0].suffix, "");
    }

    #[test]
    fn test_all_sheets_in_order_with_suffix() {
        let selected = select_sheets(&names(&["Jan", "Feb", "Mar"]), &SheetSelector::All).unwrap();
        let pairs: Vec<(&str, &str)> = selected
            .iter()
            .map(|s| (s.sheet.name.as_str(), s.suffix.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("Jan", "_Jan"), ("Feb", "_Feb"), ("Mar", "_Mar")]
        );
        assert_eq!(selected[2].sheet.index, 2);
    }

    #[test]
    fn test_empty_workbook_is_an_error() {
        for selector in [SheetSelector::First, SheetSelector::All] {
            match select_sheets(&[], &selector) {
                Err(XlsxToCsvError::SheetSelection(msg)) => assert!(msg.contains("no sheets")),
                other => panic!("Expected SheetSelection error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_select_by_index() {
        let selected = select_sheets(&names(&["A", "B"]), &SheetSelector::Index(1)).unwrap();
        assert_eq!(selected[0].sheet.name, "B");
        assert_eq!(selected[0].suffix, "");

        match select_sheets(&names(&["A", "B"]), &SheetSelector::Index(2)) {
            Err(XlsxToCsvError::SheetSelection(msg)) => assert!(msg.contains("out of range")),
            other => panic!("Expected SheetSelection error, got {:?}", other),
        }
    }

    #[test]
    fn test_select_by_name() {
        let selector = SheetSelector::Name("B".to_string());
        let selected = select_sheets(&names(&["A", "B"]), &selector).unwrap();
        assert_eq!(selected[0].sheet.index, 1);

        let selector = SheetSelector::Name("Z".to_string());
        match select_sheets(&names(&["A", "B"]), &selector) {
            Err(XlsxToCsvError::SheetSelection(msg)) => assert!(msg.contains("'Z'")),
            other => panic!("Expected SheetSelection error, got {:?}", other),
        }
    }
}
