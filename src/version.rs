//! 从更新名称中提取点分版本号，例如 `iTunesX-12.7.3` → `12.7.3`

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("字符串中没有版本号: '{0}'")]
    Missing(String),
    #[error("版本号分量无效: '{0}'")]
    InvalidComponent(String),
}

/// 点分版本号，保留原始分量个数（`2.0` 与 `2.0.0` 不同）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// 在任意文本中定位第一段"数字(.数字)*"并解析
    pub fn find_in(text: &str) -> Result<Self, VersionError> {
        let run = first_version_run(text).ok_or_else(|| VersionError::Missing(text.to_string()))?;
        run.parse()
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    pub fn major(&self) -> u64 {
        self.components[0]
    }

    pub fn minor(&self) -> Option<u64> {
        self.components.get(1).copied()
    }

    pub fn patch(&self) -> Option<u64> {
        self.components.get(2).copied()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(VersionError::Missing(s.to_string()));
        }
        let components = s
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| VersionError::InvalidComponent(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Version { components })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 返回第一段以数字开头、由数字和单个点组成的子串（去掉末尾多余的点）
fn first_version_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];

    let mut end = 0;
    let mut prev_dot = false;
    for (i, c) in rest.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
            prev_dot = false;
        } else if c == '.' && !prev_dot {
            prev_dot = true;
        } else {
            break;
        }
    }

    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_version_after_name() {
        let v = Version::find_in("iTunesX-12.7.3").unwrap();
        assert_eq!(v.components(), &[12, 7, 3]);
        assert_eq!(v.to_string(), "12.7.3");
        assert_eq!(v.major(), 12);
        assert_eq!(v.minor(), Some(7));
        assert_eq!(v.patch(), Some(3));
    }

    #[test]
    fn keeps_component_count() {
        let v = Version::find_in("App-2.0").unwrap();
        assert_eq!(v, "2.0".parse().unwrap());
        assert_ne!(v, "2.0.0".parse().unwrap());
    }

    #[test]
    fn trailing_dot_and_suffix_ignored() {
        assert_eq!(Version::find_in("Foo 10.13. Bar").unwrap().to_string(), "10.13");
        assert_eq!(Version::find_in("Safari13.1.2Mojave ").unwrap().to_string(), "13.1.2");
        assert_eq!(Version::find_in("Tool-1..2").unwrap().to_string(), "1");
    }

    #[test]
    fn missing_version_is_an_error() {
        assert!(matches!(
            Version::find_in("Command Line Tools"),
            Err(VersionError::Missing(_))
        ));
        assert!("1.x".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let v = Version::find_in("App-2.0").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"2.0\"");
    }
}
