//! xlsxcsv: batch converter from Excel workbooks to CSV files

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use xlsxcsv::cli::{logging, Cli, Language, LogSink};
use xlsxcsv::{resolve_targets, RunSummary};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.logformat, LevelFilter::Info)?;

    let language = Language::from_flag(cli.chinese);
    log::info!("{}", language.run_started());

    let result = run(&cli, language);
    log::logger().flush();
    result
}

fn run(cli: &Cli, language: Language) -> Result<()> {
    let converter = cli
        .converter_builder()
        .build()
        .with_context(|| language.invalid_options())?;

    // 入力を解決できない場合のみ失敗として終了する
    let targets = resolve_targets(&cli.input, &cli.output, &cli.extensions)
        .with_context(|| language.resolve_failed())?;

    let sink = LogSink::new(language, cli.verbose);
    let summary = converter.run(&targets, &sink);

    if let Some(path) = &cli.report {
        if let Err(e) = write_report(path, &summary) {
            log::error!("{}", language.report_failed(path, &e));
        }
    }

    Ok(())
}

fn write_report(path: &Path, summary: &RunSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
