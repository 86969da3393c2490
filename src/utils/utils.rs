use std::io;
use std::path::{Path, PathBuf};

pub const FILE_IN_TOKEN: &str = "{fileIn}";
pub const FILE_OUT_TOKEN: &str = "{fileOut}";

pub fn setup_logging(log_level: &str) -> io::Result<()> {
    let log_level_filter = match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("日誌初始化失敗: {}", e)))
}

/// 將副檔名整理為前置點號加小寫，例如 `PDF` -> `.pdf`
pub fn normalize_extension(extension: &str) -> String {
    let ext = if extension.starts_with('.') {
        extension.to_string()
    } else {
        format!(".{}", extension)
    };
    ext.to_lowercase()
}

/// 以實際路徑取代命令列模板中的 `{fileIn}` 與 `{fileOut}`，其餘字元原樣保留
pub fn substitute_tokens(template: &str, file_in: &Path, file_out: &Path) -> String {
    template
        .replace(FILE_IN_TOKEN, &file_in.to_string_lossy())
        .replace(FILE_OUT_TOKEN, &file_out.to_string_lossy())
}

/// 相對路徑以目前程序的工作目錄為基準轉為絕對路徑
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

pub fn default_output_path(input: &Path, extension: &str) -> PathBuf {
    let ext = normalize_extension(extension);
    input.with_extension(ext.trim_start_matches('.'))
}
