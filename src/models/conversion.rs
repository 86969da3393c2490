use std::path::PathBuf;

// 單次轉換的輸入，直接交給設定項目執行
#[derive(Clone, Debug)]
pub struct ConversionInput {
    pub source_text: String,
    pub output_path: PathBuf,
    pub working_dir: PathBuf,
}

#[derive(Debug)]
pub struct ConversionOutput {
    pub output_exists: bool,
    pub console: String,
}

// 前端發出的轉換請求，以 Markdown 檔案為來源
#[derive(Clone, Debug)]
pub struct ConversionRequest {
    pub configuration: Option<String>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub working_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationSummary {
    pub name: String,
    pub command_line_arguments: String,
    pub output_extension: String,
    pub prompt_for_filename: bool,
}
