use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// 字幕时间戳匹配：`HH:MM:SS.mmm`、`MM:SS,mmm` 等常见变体
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(\d{1,2}):)?(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").unwrap());

/// 一天内的时间点（毫秒精度），字幕时间轴的基本单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            millis: (hours * 3600 + minutes * 60 + seconds) * 1000,
        }
    }

    /// 解析字幕时间戳，格式错误返回 None（不报错）
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = TIME_RE.captures(raw.trim())?;

        let hours: u64 = caps
            .get(1)
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);
        let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
        let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;

        // 小数部分按毫秒处理，不足三位右补零
        let millis: u64 = caps
            .get(4)
            .map(|m| {
                let padded = format!("{:0<3}", m.as_str());
                padded[..3].parse().unwrap_or(0)
            })
            .unwrap_or(0);

        Some(Self {
            millis: (hours * 3600 + minutes * 60 + seconds) * 1000 + millis,
        })
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    /// 从零点起的整秒数
    pub fn total_seconds(&self) -> u64 {
        self.millis / 1000
    }

    /// 相对 `earlier` 经过的整秒数（更早则为 0）
    pub fn seconds_since(&self, earlier: &Timestamp) -> u64 {
        self.millis.saturating_sub(earlier.millis) / 1000
    }

    /// 规范化 `HH:MM:SS` 键（整秒精度），用于帧请求和状态记录
    pub fn bucket_key(&self) -> String {
        let total = self.total_seconds();
        format!(
            "{:02}:{:02}:{:02}",
            total / 3600,
            (total % 3600) / 60,
            total % 60
        )
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bucket_key())
    }
}
