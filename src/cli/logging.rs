//! Log backend for the command-line tool
//!
//! `log`ファサードの出力先。行はテンプレートに従って整形し、
//! 警告・エラーは標準エラー出力、それ以外は標準出力に書き出す。

use chrono::Local;
use console::style;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::{self, Write};

/// テンプレートに従って1行ずつ出力するロガー
#[derive(Debug)]
pub struct TemplateLogger {
    template: String,
    level: LevelFilter,
}

impl TemplateLogger {
    pub fn new(template: impl Into<String>, level: LevelFilter) -> Self {
        Self {
            template: template.into(),
            level,
        }
    }
}

impl Log for TemplateLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let time = Local::now().format("%Y-%m-%d %H:%M:%S,%3f").to_string();
        let line = render(
            &self.template,
            &time,
            record.level(),
            record.target(),
            &record.args().to_string(),
        );

        // 出力できない場合でもパニックしない
        match record.level() {
            Level::Error => {
                let _ = writeln!(io::stderr().lock(), "{}", style(line).red().for_stderr());
            }
            Level::Warn => {
                let _ = writeln!(io::stderr().lock(), "{}", style(line).yellow().for_stderr());
            }
            _ => {
                let _ = writeln!(io::stdout().lock(), "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

/// ロガーをプロセスに登録する
///
/// 2回目以降の呼び出しはエラーになります。
pub fn init(template: &str, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(TemplateLogger::new(template, level)))?;
    log::set_max_level(level);
    Ok(())
}

/// テンプレートのプレースホルダーを置換する
///
/// `{time}`, `{level}`, `{target}`, `{message}`に加えて、Pythonの`logging`形式
/// （`%(asctime)s`, `%(levelname)s`, `%(name)s`, `%(message)s`）も受け付けます。
pub fn render(template: &str, time: &str, level: Level, target: &str, message: &str) -> String {
    let level = level_name(level);
    [
        ("{time}", time),
        ("%(asctime)s", time),
        ("{level}", level),
        ("%(levelname)s", level),
        ("{target}", target),
        ("%(name)s", target),
    ]
    .iter()
    .fold(template.to_string(), |line, (placeholder, value)| {
        line.replace(placeholder, value)
    })
    // メッセージ内の波括弧を再置換しないよう最後に埋め込む
    .replace("{message}", message)
    .replace("%(message)s", message)
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}
