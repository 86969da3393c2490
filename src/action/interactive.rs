use dialoguer::{Confirm, Input, Select};
use std::io;
use std::path::{Path, PathBuf};

use crate::action::cli::{config_port_for, report_result};
use crate::facade::conversion_facade::ConversionFacade;
use crate::facade::traits::i_conversion::ConversionFacadeTrait;
use crate::models::conversion::ConversionRequest;
use crate::utils::utils::{absolutize, default_output_path, setup_logging};

pub fn process_interactive_mode() -> io::Result<PathBuf> {
    setup_logging("info")?;
    println!("=== 歡迎使用互動模式 ===");

    let facade = ConversionFacade::new(config_port_for(None)?);
    let configurations = facade.list_configurations()?;
    let names: Vec<&str> = configurations.iter().map(|c| c.name.as_str()).collect();
    let selected = select_configuration(&names)?;
    let summary = &configurations[selected];

    let input = get_input_path()?;
    let suggested = default_output_path(Path::new(&input), &summary.output_extension);
    let output_path = absolutize(&prompt_output_path(&suggested)?)?;

    if !confirm_run(&summary.name)? {
        return Err(io::Error::new(io::ErrorKind::Interrupted, "已取消轉換"));
    }

    let result = facade.execute_conversion(ConversionRequest {
        configuration: Some(summary.name.clone()),
        input_path: PathBuf::from(&input),
        output_path: output_path.clone(),
        working_dir: None,
    })?;
    report_result(&result, &output_path)?;
    Ok(output_path)
}

pub fn select_configuration(names: &[&str]) -> io::Result<usize> {
    Select::new()
        .with_prompt("請選擇轉換設定")
        .items(names)
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("設定選擇失敗: {}", e)))
}

pub fn get_input_path() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入 Markdown 檔案路徑（例如：./README.md）")
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).is_file() { Ok(()) } else { Err(format!("檔案 '{}' 不存在", input)) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

/// 詢問輸出檔名，預設為建議的路徑
pub fn prompt_output_path(suggested: &Path) -> io::Result<PathBuf> {
    let output: String = Input::new()
        .with_prompt("請輸入輸出檔案路徑")
        .default(suggested.to_string_lossy().to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(PathBuf::from(output))
}

pub fn confirm_run(name: &str) -> io::Result<bool> {
    Confirm::new()
        .with_prompt(format!("使用設定「{}」開始轉換？", name))
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("確認失敗: {}", e)))
}
