use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard-coded file layout and GUI throttle parameters. The reference system takes no flags;
/// everything lives under `./DataGenerator/` relative to the working directory. Tests construct
/// a [`Config`] pointed at a temp directory instead of relying on `Default`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data_dir: String,
    pub gui_throttle_interval: Duration,
    pub gui_throttle_cap: usize,
}

impl Config {
    pub fn trades_csv(&self) -> String {
        format!("{}/trades.csv", self.data_dir)
    }

    pub fn prices_csv(&self) -> String {
        format!("{}/prices.csv", self.data_dir)
    }

    pub fn marketdata_csv(&self) -> String {
        format!("{}/marketdata.csv", self.data_dir)
    }

    pub fn inquiries_csv(&self) -> String {
        format!("{}/inquiries.csv", self.data_dir)
    }

    pub fn position_txt(&self) -> String {
        format!("{}/position.txt", self.data_dir)
    }

    pub fn risk_txt(&self) -> String {
        format!("{}/risk.txt", self.data_dir)
    }

    pub fn execution_txt(&self) -> String {
        format!("{}/execution.txt", self.data_dir)
    }

    pub fn streaming_txt(&self) -> String {
        format!("{}/streaming.txt", self.data_dir)
    }

    pub fn gui_txt(&self) -> String {
        format!("{}/gui.txt", self.data_dir)
    }

    pub fn all_inquiries_txt(&self) -> String {
        format!("{}/allinquiries.txt", self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "./DataGenerator".to_string(),
            gui_throttle_interval: Duration::from_millis(300),
            gui_throttle_cap: 100,
        }
    }
}
