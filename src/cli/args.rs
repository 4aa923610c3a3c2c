//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::{ConverterBuilder, OverwritePolicy, SheetSelector};

/// xlsxcsv - Convert XLSX workbooks to CSV files
#[derive(Parser, Debug)]
#[command(name = "xlsxcsv")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input workbook, directory, or wildcard pattern (quote it to keep the shell from expanding it)
    pub input: PathBuf,

    /// Output directory. Directory inputs are mirrored below it.
    #[arg(short, long, default_value = "./")]
    pub output: PathBuf,

    /// Sheet name or zero-based index to convert (default: first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Field delimiter: a single ASCII character, or "\t" / "tab"
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: char,

    /// Output encoding, e.g. utf-8-sig, utf-8, utf-16, gbk, shift_jis
    #[arg(short, long, default_value = "utf-8-sig")]
    pub encoding: String,

    /// Omit the first row of each sheet
    #[arg(long)]
    pub no_header: bool,

    /// Prepend a zero-based row index column
    #[arg(long)]
    pub index: bool,

    /// Keep existing output files instead of overwriting them
    #[arg(short = 'n', long, visible_alias = "nf")]
    pub no_force: bool,

    /// Show detailed progress
    #[arg(short, long)]
    pub verbose: bool,

    /// Print messages in Chinese
    #[arg(short, long)]
    pub chinese: bool,

    /// Convert every sheet to {name}_{sheet}.csv
    #[arg(short, long)]
    pub all_sheets: bool,

    /// Log line template. Placeholders: {time}, {level}, {target}, {message}
    #[arg(short = 'f', long, default_value = "{message}")]
    pub logformat: String,

    /// Workbook extension to look for in directories (repeatable)
    #[arg(short = 'x', long = "extension", default_value = "xlsx")]
    pub extensions: Vec<String>,

    /// Number of files converted in parallel
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: u32,

    /// Write a JSON run summary to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    /// `--all-sheets`と`--sheet`からシート選択方式を決定する
    ///
    /// `--all-sheets`が優先されます。
    pub fn sheet_selector(&self) -> SheetSelector {
        if self.all_sheets {
            return SheetSelector::All;
        }
        self.sheet
            .as_deref()
            .map(SheetSelector::parse)
            .unwrap_or_default()
    }

    pub fn overwrite_policy(&self) -> OverwritePolicy {
        if self.no_force {
            OverwritePolicy::NoForce
        } else {
            OverwritePolicy::Force
        }
    }

    /// 引数を反映したビルダーを生成する
    pub fn converter_builder(&self) -> ConverterBuilder {
        ConverterBuilder::new()
            .with_sheet_selector(self.sheet_selector())
            .with_delimiter(self.delimiter)
            .with_encoding_label(self.encoding.as_str())
            .include_header(!self.no_header)
            .include_index(self.index)
            .with_overwrite_policy(self.overwrite_policy())
            .with_workers(self.jobs as usize)
    }
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "\\t" | "tab" => return Ok('\t'),
        _ => {}
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!(
            "delimiter must be a single ASCII character, got {:?}",
            value
        )),
    }
}
