//! 页面上的 `answered/total` 计数器

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid question counter format: '{0}', expected 'answered/total'")]
pub struct ProgressParseError(pub String);

static COUNTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*/\s*(\d+)\s*$").expect("counter pattern is valid")
});

/// 答题进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: u32,
    pub total: u32,
}

impl Progress {
    /// 最后一道题已经答完
    pub fn is_complete(&self) -> bool {
        self.answered == self.total
    }
}

impl FromStr for Progress {
    type Err = ProgressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ProgressParseError(s.to_string());
        let caps = COUNTER_RE.captures(s).ok_or_else(err)?;
        let answered: u32 = caps[1].parse().map_err(|_| err())?;
        let total: u32 = caps[2].parse().map_err(|_| err())?;

        if total == 0 || answered > total {
            return Err(err());
        }
        Ok(Progress { answered, total })
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.answered, self.total)
    }
}
