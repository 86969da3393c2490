use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use crate::config::ports::CommandLinePort;
use crate::error::ConvertError;
use crate::models::conversion::{ConversionInput, ConversionOutput};
use crate::utils::process::{run_converter, CONVERTER_TIMEOUT};
use crate::utils::utils::{normalize_extension, substitute_tokens};

pub const DEFAULT_NAME: &str = "New Pandoc Configuration";
pub const DEFAULT_COMMAND_LINE: &str = "-f markdown -s \"{fileIn}\" -o \"{fileOut}\"";
pub const DEFAULT_OUTPUT_EXTENSION: &str = ".html";

/// 可被觀察的設定欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    Name,
    CommandLineArguments,
    OutputExtension,
    PromptForFilename,
}

impl ConfigField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigField::Name => "Name",
            ConfigField::CommandLineArguments => "CommandLineArguments",
            ConfigField::OutputExtension => "OutputExtension",
            ConfigField::PromptForFilename => "PromptForFilename",
        }
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(ConfigField) + Send>;

/// 一組 Pandoc 轉換設定，可直接執行以產生輸出檔
///
/// 每個欄位的實際變更都會通知已訂閱的觀察者；設為相同的值則不通知。
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationRecord {
    name: String,
    command_line_arguments: String,
    output_extension: String,
    prompt_for_filename: bool,
    #[serde(skip)]
    observers: Vec<(SubscriptionId, Observer)>,
    #[serde(skip)]
    next_subscription: u64,
}

impl Default for ConfigurationRecord {
    fn default() -> Self {
        ConfigurationRecord {
            name: DEFAULT_NAME.to_string(),
            command_line_arguments: DEFAULT_COMMAND_LINE.to_string(),
            output_extension: DEFAULT_OUTPUT_EXTENSION.to_string(),
            prompt_for_filename: false,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl fmt::Debug for ConfigurationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRecord")
            .field("name", &self.name)
            .field("command_line_arguments", &self.command_line_arguments)
            .field("output_extension", &self.output_extension)
            .field("prompt_for_filename", &self.prompt_for_filename)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ConfigurationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.name {
            return;
        }
        self.name = value;
        self.notify(ConfigField::Name);
    }

    pub fn command_line_arguments(&self) -> &str {
        &self.command_line_arguments
    }

    pub fn set_command_line_arguments(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.command_line_arguments {
            return;
        }
        self.command_line_arguments = value;
        self.notify(ConfigField::CommandLineArguments);
    }

    pub fn output_extension(&self) -> &str {
        &self.output_extension
    }

    pub fn set_output_extension(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.output_extension {
            return;
        }
        self.output_extension = value;
        self.notify(ConfigField::OutputExtension);
    }

    pub fn prompt_for_filename(&self) -> bool {
        self.prompt_for_filename
    }

    pub fn set_prompt_for_filename(&mut self, value: bool) {
        if value == self.prompt_for_filename {
            return;
        }
        self.prompt_for_filename = value;
        self.notify(ConfigField::PromptForFilename);
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: Fn(ConfigField) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// 取消訂閱；回傳該訂閱是否存在
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    fn notify(&self, field: ConfigField) {
        debug!("設定「{}」的欄位 {} 已變更", self.name, field);
        for (_, observer) in &self.observers {
            observer(field);
        }
    }

    /// 將儲存的副檔名整理為前置點號加小寫，會寫回欄位本身
    pub fn normalize_output_extension(&mut self) {
        let normalized = normalize_extension(&self.output_extension);
        self.set_output_extension(normalized);
    }

    /// 將 Markdown 內容寫入暫存檔並呼叫轉換器產生 `output_path`
    ///
    /// 命令列模板優先取自 `port`，未提供時使用本設定的 `command_line_arguments`。
    /// 相對的輸出路徑在刪除舊檔與檢查結果時都以 `working_dir` 為基準，與轉換器解析
    /// `{fileOut}` 的方式一致，而非以目前程序的工作目錄為準。暫存檔無論成功或失敗都會刪除。
    pub fn execute(
        &mut self,
        port: &dyn CommandLinePort,
        input: &ConversionInput,
    ) -> Result<ConversionOutput, ConvertError> {
        self.execute_with_timeout(port, input, CONVERTER_TIMEOUT)
    }

    pub(crate) fn execute_with_timeout(
        &mut self,
        port: &dyn CommandLinePort,
        input: &ConversionInput,
        timeout: Duration,
    ) -> Result<ConversionOutput, ConvertError> {
        self.normalize_output_extension();

        let resolved_output = resolve_output_path(&input.working_dir, &input.output_path);
        remove_existing(&resolved_output)?;

        let mut temp = tempfile::Builder::new()
            .prefix("pandoc-")
            .suffix(".md")
            .tempfile()?;
        temp.write_all(input.source_text.as_bytes())?;
        temp.flush()?;
        let temp_path = temp.into_temp_path();
        debug!("已寫入暫存輸入檔：{}", temp_path.display());

        let template = port
            .command_line()
            .unwrap_or_else(|| self.command_line_arguments.clone());
        let command_line = substitute_tokens(&template, &temp_path, &input.output_path);
        let args = shell_words::split(&command_line)
            .map_err(|e| ConvertError::InvalidCommandLine(format!("{}（{}）", command_line, e)))?;

        let converter = port.converter();
        info!("執行轉換器：{} {}，工作目錄：{}", converter, command_line, input.working_dir.display());
        let output = run_converter(&converter, &args, &input.working_dir, timeout)?;
        let console = output.console();

        if output.timed_out() {
            return Err(ConvertError::TimedOut {
                seconds: timeout.as_secs(),
                console,
            });
        }
        if !output.success() {
            warn!("轉換器結束代碼非零：{:?}", output.status.and_then(|s| s.code()));
            return Err(ConvertError::ConversionFailed(console));
        }

        if let Err(e) = temp_path.close() {
            warn!("刪除暫存輸入檔失敗：{}", e);
        }

        let output_exists = resolved_output.exists();
        info!("轉換完成，輸出檔 {} {}", resolved_output.display(), if output_exists { "已產生" } else { "不存在" });
        Ok(ConversionOutput { output_exists, console })
    }
}

fn resolve_output_path(working_dir: &Path, output_path: &Path) -> PathBuf {
    if output_path.is_absolute() {
        output_path.to_path_buf()
    } else {
        working_dir.join(output_path)
    }
}

fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("已刪除既有輸出檔：{}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
