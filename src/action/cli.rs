use std::io;
use std::path::{Path, PathBuf};
use clap::Parser;
use crate::action::interactive::{process_interactive_mode, prompt_output_path};
use crate::config::config::{validate_input_path, validate_working_dir, Cli};
use crate::config::ports::ConfigPort;
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::{ConversionOutput, ConversionRequest};
use crate::service::config_service::{default_config_path, JsonFileConfigAdapter};
use crate::utils::utils::{absolutize, default_output_path, setup_logging};

/// 沒有參數時進入互動模式；回傳產生的輸出檔路徑，僅列出設定時回傳 None
pub fn process_args(args: Vec<String>) -> io::Result<Option<PathBuf>> {
    if args.len() == 1 {
        process_interactive_mode().map(Some)
    } else {
        process_cli_mode(Cli::parse())
    }
}

pub fn process_cli_mode(cli: Cli) -> io::Result<Option<PathBuf>> {
    setup_logging(&cli.log_level)?;
    let facade = ConversionFacade::new(config_port_for(cli.config.as_deref())?);

    if cli.list {
        for summary in facade.list_configurations()? {
            println!(
                "{}\t{}\t{}{}",
                summary.name,
                summary.output_extension,
                summary.command_line_arguments,
                if summary.prompt_for_filename { "\t（執行前詢問檔名）" } else { "" }
            );
        }
        return Ok(None);
    }

    let input = cli.input.as_deref().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "請指定要轉換的 Markdown 檔案，或使用 --list 列出設定")
    })?;
    let input_path = validate_input_path(input)?;
    let working_dir = match cli.working_dir.as_deref() {
        Some(dir) => Some(validate_working_dir(dir)?.to_path_buf()),
        None => None,
    };

    let summary = facade.find_configuration(cli.name.as_deref())?;
    if cli.show_config {
        println!("實際使用的設定：{:#?}", summary);
    }

    let suggested = default_output_path(input_path, &summary.output_extension);
    let output_path = match cli.output {
        Some(output) => PathBuf::from(output),
        None if summary.prompt_for_filename => prompt_output_path(&suggested)?,
        None => suggested,
    };
    let output_path = absolutize(&output_path)?;

    let result = facade.execute_conversion(ConversionRequest {
        configuration: Some(summary.name.clone()),
        input_path: input_path.to_path_buf(),
        output_path: output_path.clone(),
        working_dir,
    })?;
    report_result(&result, &output_path)?;

    Ok(Some(output_path))
}

pub fn config_port_for(path: Option<&str>) -> io::Result<Box<dyn ConfigPort>> {
    let path = match path {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };
    log::debug!("使用配置檔：{}", path.display());
    Ok(Box::new(JsonFileConfigAdapter::new(path)))
}

/// 顯示轉換器主控台輸出；轉換器成功但沒有產生檔案時視為錯誤
pub fn report_result(result: &ConversionOutput, output_path: &Path) -> io::Result<()> {
    println!("{}", result.console);
    if !result.output_exists {
        log::warn!("轉換器已結束，但找不到輸出檔：{}", output_path.display());
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("轉換器未產生輸出檔 '{}'", output_path.display()),
        ));
    }
    Ok(())
}
