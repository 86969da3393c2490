use std::io;
use crate::models::conversion::{ConfigurationSummary, ConversionOutput, ConversionRequest};

// Facade 接口，負責協調設定載入與轉換流程
pub trait ConversionFacadeTrait {
    /// 列出配置中的所有轉換設定
    fn list_configurations(&self) -> io::Result<Vec<ConfigurationSummary>>;

    /// 依名稱取得轉換設定；未指定名稱時回傳第一筆
    /// # 回傳
    /// - 成功時返回設定摘要（副檔名已正規化），找不到時返回 NotFound
    fn find_configuration(&self, name: Option<&str>) -> io::Result<ConfigurationSummary>;

    /// 讀取 Markdown 檔案並以指定設定執行轉換
    /// # 參數
    /// - request: 轉換請求，包含設定名稱、輸入與輸出路徑
    /// # 回傳
    /// - 成功時返回輸出檔是否存在與主控台輸出，轉換器失敗時錯誤訊息即為主控台輸出
    fn execute_conversion(&self, request: ConversionRequest) -> io::Result<ConversionOutput>;
}
