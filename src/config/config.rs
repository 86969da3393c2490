use clap::Parser;
use std::io;
use std::path::Path;

#[derive(Parser, Clone, Debug)]
#[command(
    name = "pandoc_config",
    about = "以具名的 Pandoc 轉換設定將 Markdown 轉換為其他格式",
    long_about = "從配置檔讀取具名的 Pandoc 轉換設定，將 Markdown 內容寫入暫存檔後呼叫 pandoc 產生輸出檔，並顯示轉換器的主控台輸出。\n不帶任何參數執行時進入互動模式。使用 `--list` 列出可用設定。",
    arg_required_else_help = false
)]
pub struct Cli {
    /// 要轉換的 Markdown 檔案
    pub input: Option<String>,
    #[arg(short, long)]
    pub output: Option<String>,
    /// 轉換設定名稱（不分大小寫），預設為第一筆
    #[arg(short, long)]
    pub name: Option<String>,
    /// 配置檔路徑，預設位於使用者設定目錄
    #[arg(long)]
    pub config: Option<String>,
    /// 轉換器的工作目錄，預設為輸入檔所在目錄
    #[arg(long)]
    pub working_dir: Option<String>,
    #[arg(long, default_value_t = false)]
    pub list: bool,
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
    #[arg(long, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    pub log_level: String,
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.is_file() {
        log::error!("輸入檔案不存在：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入檔案 '{}' 不存在", input)
        ));
    }
    Ok(path)
}

pub fn validate_working_dir(dir: &str) -> io::Result<&Path> {
    let path = Path::new(dir);
    if !path.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("工作目錄 '{}' 不存在", dir)
        ));
    }
    Ok(path)
}
