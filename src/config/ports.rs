use std::io;
use serde::{Deserialize, Serialize};
use crate::models::configuration::ConfigurationRecord;

pub const DEFAULT_CONVERTER: &str = "pandoc";

// 目前生效的增益集配置，保存轉換器與具名的設定項目清單
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AddinConfiguration {
    pub converter: String,
    pub pandoc_command_line: Option<String>,
    pub configurations: Vec<ConfigurationRecord>,
}

impl Default for AddinConfiguration {
    fn default() -> Self {
        AddinConfiguration {
            converter: DEFAULT_CONVERTER.to_string(),
            pandoc_command_line: None,
            configurations: vec![ConfigurationRecord::default()],
        }
    }
}

impl AddinConfiguration {
    pub fn find(&self, name: &str) -> Option<usize> {
        self.configurations
            .iter()
            .position(|c| c.name().eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<String> {
        self.configurations.iter().map(|c| c.name().to_string()).collect()
    }

    /// 取出目前的轉換器與命令列模板，供執行設定項目時使用
    pub fn current(&self) -> CurrentCommandLine {
        CurrentCommandLine {
            converter: self.converter.clone(),
            command_line: self.pandoc_command_line.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrentCommandLine {
    pub converter: String,
    pub command_line: Option<String>,
}

impl CommandLinePort for CurrentCommandLine {
    fn command_line(&self) -> Option<String> {
        self.command_line.clone()
    }

    fn converter(&self) -> String {
        self.converter.clone()
    }
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<AddinConfiguration>;

    /// 寫回配置；不支援儲存的來源直接忽略
    fn save_config(&self, _config: &AddinConfiguration) -> io::Result<()> {
        Ok(())
    }
}

// 命令列模板來源的 Port
pub trait CommandLinePort {
    /// 取得權威的命令列模板；回傳 None 時沿用設定項目自身的模板
    fn command_line(&self) -> Option<String>;

    /// 轉換器執行檔名稱，經由 PATH 搜尋
    fn converter(&self) -> String {
        DEFAULT_CONVERTER.to_string()
    }
}
