use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::{info, warn};
use crate::config::ports::{AddinConfiguration, ConfigPort};

pub const CONFIG_DIR_NAME: &str = "pandoc_config";
pub const CONFIG_FILE_NAME: &str = "configurations.json";

// 配置服務，負責透過配置適配器取得目前的增益集配置
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<AddinConfiguration> {
        let config = self.config_port.get_config()?;
        if config.configurations.is_empty() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "配置檔中沒有任何轉換設定"));
        }
        Ok(config)
    }

    pub fn save_config(&self, config: &AddinConfiguration) -> io::Result<()> {
        self.config_port.save_config(config)
    }

    /// 依名稱（不分大小寫）找出設定的索引；未指定名稱時使用第一筆
    pub fn resolve_index(config: &AddinConfiguration, name: Option<&str>) -> io::Result<usize> {
        match name {
            None => Ok(0),
            Some(name) => config.find(name).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("找不到名為 '{}' 的轉換設定，可用設定：{}", name, config.names().join(", ")),
                )
            }),
        }
    }
}

// 預設配置適配器
pub struct DefaultConfigAdapter;

impl ConfigPort for DefaultConfigAdapter {
    fn get_config(&self) -> io::Result<AddinConfiguration> {
        Ok(AddinConfiguration::default())
    }
}

// JSON 配置檔適配器，檔案不存在時回退為預設配置
pub struct JsonFileConfigAdapter {
    path: PathBuf,
}

impl JsonFileConfigAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileConfigAdapter { path: path.into() }
    }
}

impl ConfigPort for JsonFileConfigAdapter {
    fn get_config(&self) -> io::Result<AddinConfiguration> {
        if !self.path.exists() {
            warn!("配置檔 {} 不存在，使用預設配置", self.path.display());
            return DefaultConfigAdapter.get_config();
        }
        let content = fs::read_to_string(&self.path)?;
        let config: AddinConfiguration = serde_json::from_str(&content).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("配置檔 {} 格式錯誤: {}", self.path.display(), e),
            )
        })?;
        info!("載入配置檔：{}，共 {} 筆轉換設定", self.path.display(), config.configurations.len());
        Ok(config)
    }

    fn save_config(&self, config: &AddinConfiguration) -> io::Result<()> {
        save_config(config, &self.path)
    }
}

/// 以易讀的 JSON 格式儲存配置，必要時建立上層目錄
pub fn save_config(config: &AddinConfiguration, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, content)?;
    info!("配置已儲存至：{}", path.display());
    Ok(())
}

pub fn default_config_path() -> io::Result<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "無法取得使用者設定目錄"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ports::DEFAULT_CONVERTER;
    use crate::models::configuration::ConfigurationRecord;
    use tempfile::tempdir;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let adapter = JsonFileConfigAdapter::new(dir.path().join("none.json"));
        let config = adapter.get_config().unwrap();

        assert_eq!(config.converter, DEFAULT_CONVERTER);
        assert!(config.pandoc_command_line.is_none());
        assert_eq!(config.names(), vec!["New Pandoc Configuration".to_string()]);
    }

    #[test]
    fn partial_records_take_default_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        fs::write(
            &path,
            r#"{ "configurations": [ { "name": "PDF", "output_extension": "pdf" } ] }"#,
        )
        .unwrap();

        let config = JsonFileConfigAdapter::new(&path).get_config().unwrap();
        let record = &config.configurations[0];

        assert_eq!(config.converter, "pandoc");
        assert_eq!(record.name(), "PDF");
        assert_eq!(record.output_extension(), "pdf");
        assert_eq!(record.command_line_arguments(), "-f markdown -s \"{fileIn}\" -o \"{fileOut}\"");
    }

    #[test]
    fn malformed_file_is_invalid_data() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileConfigAdapter::new(&path).get_config().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn saved_config_loads_back_with_nested_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("configurations.json");
        let mut record = ConfigurationRecord::new();
        record.set_name("EPUB");
        record.set_output_extension(".epub");
        record.set_prompt_for_filename(true);
        let config = AddinConfiguration {
            converter: "pandoc".to_string(),
            pandoc_command_line: Some("-s \"{fileIn}\" -o \"{fileOut}\"".to_string()),
            configurations: vec![record],
        };

        save_config(&config, &path).unwrap();
        let loaded = JsonFileConfigAdapter::new(&path).get_config().unwrap();

        assert_eq!(loaded.pandoc_command_line, config.pandoc_command_line);
        assert_eq!(loaded.names(), vec!["EPUB".to_string()]);
        assert!(loaded.configurations[0].prompt_for_filename());
    }

    #[test]
    fn resolve_index_is_case_insensitive() {
        let mut html = ConfigurationRecord::new();
        html.set_name("HTML");
        let mut pdf = ConfigurationRecord::new();
        pdf.set_name("Pdf Export");
        let config = AddinConfiguration {
            configurations: vec![html, pdf],
            ..AddinConfiguration::default()
        };

        assert_eq!(ConfigService::resolve_index(&config, None).unwrap(), 0);
        assert_eq!(ConfigService::resolve_index(&config, Some("pdf export")).unwrap(), 1);
        let err = ConfigService::resolve_index(&config, Some("docx")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn empty_configuration_list_is_rejected() {
        struct EmptyAdapter;
        impl ConfigPort for EmptyAdapter {
            fn get_config(&self) -> io::Result<AddinConfiguration> {
                Ok(AddinConfiguration {
                    configurations: Vec::new(),
                    ..AddinConfiguration::default()
                })
            }
        }

        let err = ConfigService::new(Box::new(EmptyAdapter)).get_config().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
