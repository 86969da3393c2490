use std::io;

use pandoc_config::action::cli::process_args;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let Some(output) = process_args(args)? {
        log::info!("程式執行完成，輸出檔案：{}", output.display());
        println!("轉換完成！輸出檔案位於：{}", output.display());
    }
    Ok(())
}
