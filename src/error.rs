use std::io;
use thiserror::Error;

/// 執行 Pandoc 轉換時可能發生的錯誤
#[derive(Debug, Error)]
pub enum ConvertError {
    /// 轉換器以非零代碼結束，內容為合併後的主控台輸出
    #[error("{0}")]
    ConversionFailed(String),

    #[error("轉換器超過 {seconds} 秒仍未結束，已強制終止：{console}")]
    TimedOut { seconds: u64, console: String },

    #[error("無法解析命令列：{0}")]
    InvalidCommandLine(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<ConvertError> for io::Error {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Io(e) => e,
            ConvertError::TimedOut { .. } => io::Error::new(io::ErrorKind::TimedOut, err.to_string()),
            ConvertError::InvalidCommandLine(_) => io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
            ConvertError::ConversionFailed(console) => io::Error::new(io::ErrorKind::Other, console),
        }
    }
}
