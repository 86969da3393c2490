use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use log::{error, info, warn};
use crate::config::ports::ConfigPort;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::configuration::ConfigurationRecord;
use crate::models::conversion::{ConfigurationSummary, ConversionInput, ConversionOutput, ConversionRequest};
use crate::service::config_service::ConfigService;
use crate::utils::utils::normalize_extension;

pub struct ConversionFacade {
    config_service: ConfigService,
}

impl ConversionFacade {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConversionFacade {
            config_service: ConfigService::new(config_port),
        }
    }
}

impl ConversionFacadeTrait for ConversionFacade {
    fn list_configurations(&self) -> io::Result<Vec<ConfigurationSummary>> {
        let config = self.config_service.get_config()?;
        Ok(config.configurations.iter().map(summarize).collect())
    }

    fn find_configuration(&self, name: Option<&str>) -> io::Result<ConfigurationSummary> {
        let config = self.config_service.get_config()?;
        let index = ConfigService::resolve_index(&config, name)?;
        Ok(summarize(&config.configurations[index]))
    }

    fn execute_conversion(&self, request: ConversionRequest) -> io::Result<ConversionOutput> {
        let mut config = self.config_service.get_config()?;
        let index = ConfigService::resolve_index(&config, request.configuration.as_deref())?;
        let current = config.current();
        let record = &mut config.configurations[index];

        // 執行時正規化副檔名會改寫設定，有變更才寫回配置
        let changed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&changed);
        record.subscribe(move |_| flag.store(true, Ordering::Relaxed));

        let source_text = fs::read_to_string(&request.input_path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("無法讀取輸入檔 '{}': {}", request.input_path.display(), e),
            )
        })?;
        let working_dir = request
            .working_dir
            .clone()
            .unwrap_or_else(|| document_dir(&request.input_path));

        info!(
            "使用設定「{}」轉換 {} -> {}",
            record.name(),
            request.input_path.display(),
            request.output_path.display()
        );

        let input = ConversionInput {
            source_text,
            output_path: request.output_path.clone(),
            working_dir,
        };
        let result = record.execute(&current, &input);

        if changed.load(Ordering::Relaxed) {
            if let Err(e) = self.config_service.save_config(&config) {
                warn!("無法寫回更新後的設定：{}", e);
            }
        }

        result.map_err(|e| {
            error!("轉換失敗：{}", e);
            io::Error::from(e)
        })
    }
}

fn summarize(record: &ConfigurationRecord) -> ConfigurationSummary {
    ConfigurationSummary {
        name: record.name().to_string(),
        command_line_arguments: record.command_line_arguments().to_string(),
        output_extension: normalize_extension(record.output_extension()),
        prompt_for_filename: record.prompt_for_filename(),
    }
}

/// 文件所在目錄，作為轉換器的工作目錄
pub fn document_dir(input_path: &Path) -> PathBuf {
    match input_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ports::AddinConfiguration;
    use crate::service::config_service::{save_config, DefaultConfigAdapter, JsonFileConfigAdapter};
    use tempfile::tempdir;

    #[test]
    fn document_dir_falls_back_to_current_dir() {
        assert_eq!(document_dir(Path::new("readme.md")), PathBuf::from("."));
        assert_eq!(document_dir(Path::new("docs/readme.md")), PathBuf::from("docs"));
    }

    #[test]
    fn default_configuration_is_listed() {
        let facade = ConversionFacade::new(Box::new(DefaultConfigAdapter));
        let list = facade.list_configurations().unwrap();

        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "New Pandoc Configuration");
        assert_eq!(list[0].output_extension, ".html");
    }

    #[test]
    fn summary_normalizes_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        let mut record = ConfigurationRecord::new();
        record.set_name("Word");
        record.set_output_extension("DOCX");
        let config = AddinConfiguration {
            configurations: vec![ConfigurationRecord::new(), record],
            ..AddinConfiguration::default()
        };
        save_config(&config, &path).unwrap();

        let facade = ConversionFacade::new(Box::new(JsonFileConfigAdapter::new(&path)));
        let summary = facade.find_configuration(Some("word")).unwrap();

        assert_eq!(summary.name, "Word");
        assert_eq!(summary.output_extension, ".docx");
    }

    #[test]
    fn missing_input_file_is_reported() {
        let dir = tempdir().unwrap();
        let facade = ConversionFacade::new(Box::new(DefaultConfigAdapter));
        let err = facade
            .execute_conversion(ConversionRequest {
                configuration: None,
                input_path: dir.path().join("absent.md"),
                output_path: dir.path().join("absent.html"),
                working_dir: None,
            })
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn store_command_line_overrides_record_template() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        let mut record = ConfigurationRecord::new();
        record.set_command_line_arguments("-c \"exit 3\"");
        let config = AddinConfiguration {
            converter: "sh".to_string(),
            pandoc_command_line: Some("-c \"cp '{fileIn}' '{fileOut}'\"".to_string()),
            configurations: vec![record],
        };
        save_config(&config, &path).unwrap();
        let input_path = dir.path().join("notes.md");
        fs::write(&input_path, "# Notes\n").unwrap();

        let facade = ConversionFacade::new(Box::new(JsonFileConfigAdapter::new(&path)));
        let output = facade
            .execute_conversion(ConversionRequest {
                configuration: None,
                input_path: input_path.clone(),
                output_path: PathBuf::from("notes.html"),
                working_dir: None,
            })
            .unwrap();

        assert!(output.output_exists);
        assert_eq!(fs::read_to_string(dir.path().join("notes.html")).unwrap(), "# Notes\n");
    }

    #[cfg(unix)]
    #[test]
    fn normalized_extension_is_written_back_to_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        let mut record = ConfigurationRecord::new();
        record.set_name("Text");
        record.set_output_extension("TXT");
        let config = AddinConfiguration {
            converter: "sh".to_string(),
            pandoc_command_line: Some("-c \"exit 0\"".to_string()),
            configurations: vec![record],
        };
        save_config(&config, &path).unwrap();
        let input_path = dir.path().join("notes.md");
        fs::write(&input_path, "text").unwrap();

        let facade = ConversionFacade::new(Box::new(JsonFileConfigAdapter::new(&path)));
        facade
            .execute_conversion(ConversionRequest {
                configuration: Some("text".to_string()),
                input_path,
                output_path: dir.path().join("notes.txt"),
                working_dir: None,
            })
            .unwrap();

        let reloaded = JsonFileConfigAdapter::new(&path).get_config().unwrap();
        assert_eq!(reloaded.configurations[0].output_extension(), ".txt");
    }

    #[cfg(unix)]
    #[test]
    fn unchanged_configuration_is_not_rewritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        let config = AddinConfiguration {
            converter: "sh".to_string(),
            pandoc_command_line: Some("-c \"exit 0\"".to_string()),
            ..AddinConfiguration::default()
        };
        save_config(&config, &path).unwrap();
        fs::write(&path, fs::read_to_string(&path).unwrap().replace('\n', " ")).unwrap();
        let before = fs::read_to_string(&path).unwrap();
        let input_path = dir.path().join("notes.md");
        fs::write(&input_path, "text").unwrap();

        let facade = ConversionFacade::new(Box::new(JsonFileConfigAdapter::new(&path)));
        facade
            .execute_conversion(ConversionRequest {
                configuration: None,
                input_path,
                output_path: dir.path().join("notes.html"),
                working_dir: None,
            })
            .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn converter_failure_becomes_io_error_with_transcript() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("configurations.json");
        let config = AddinConfiguration {
            converter: "sh".to_string(),
            pandoc_command_line: Some("-c \"printf out1; printf err1 >&2; exit 2\"".to_string()),
            ..AddinConfiguration::default()
        };
        save_config(&config, &path).unwrap();
        let input_path = dir.path().join("notes.md");
        fs::write(&input_path, "text").unwrap();

        let facade = ConversionFacade::new(Box::new(JsonFileConfigAdapter::new(&path)));
        let err = facade
            .execute_conversion(ConversionRequest {
                configuration: None,
                input_path,
                output_path: dir.path().join("notes.html"),
                working_dir: None,
            })
            .unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(err.to_string(), "out1Error: err1");
    }
}
