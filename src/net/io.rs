//! I/O 支持：以 JSON 或 RON 读写 `PetriNet`。
//!
//! XML 文档的反序列化由外部加载器负责，这里只处理 serde 能直接表达的格式。
use std::fs;
use std::path::Path;

use ron::ser::PrettyConfig;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::structure::PetriNet;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron error: {0}")]
    RonSpanned(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported net format `{0}` (expected .json or .ron)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetFormat {
    Json,
    Ron,
}

impl NetFormat {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "json" => Ok(Self::Json),
            "ron" => Ok(Self::Ron),
            _ => Err(IoError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn to_json_string<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T: DeserializeOwned>(s: &str) -> Result<T, IoError> {
    Ok(serde_json::from_str(s)?)
}

pub fn to_ron_string<T: Serialize>(value: &T) -> Result<String, IoError> {
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T: DeserializeOwned>(s: &str) -> Result<T, IoError> {
    Ok(ron::from_str(s)?)
}

/// 按扩展名读取网络文件。
pub fn read_net<P: AsRef<Path>>(path: P) -> Result<PetriNet, IoError> {
    let path = path.as_ref();
    let format = NetFormat::from_path(path)?;
    let content = fs::read_to_string(path)?;
    match format {
        NetFormat::Json => from_json_str(&content),
        NetFormat::Ron => from_ron_str(&content),
    }
}

pub fn write_net<P: AsRef<Path>>(path: P, net: &PetriNet) -> Result<(), IoError> {
    let path = path.as_ref();
    let content = match NetFormat::from_path(path)? {
        NetFormat::Json => to_json_string(net)?,
        NetFormat::Ron => to_ron_string(net)?,
    };
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PetriNet {
        PetriNet::new()
            .with_place("P1", 1)
            .with_transition("T1")
            .with_arc("P1", "T1", 1)
            .with_arc("T1", "P1", 1)
    }

    #[test]
    fn ron_text_preserves_arcs() {
        let text = to_ron_string(&sample()).unwrap();
        assert!(text.contains("sourceId"));
        let back: PetriNet = from_ron_str(&text).unwrap();
        assert_eq!(back.arcs, sample().arcs);
    }

    #[test]
    fn format_is_chosen_by_extension() {
        assert_eq!(
            NetFormat::from_path(Path::new("a/parent.JSON")).unwrap(),
            NetFormat::Json
        );
        assert!(matches!(
            NetFormat::from_path(Path::new("parent.xml")),
            Err(IoError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn read_net_reports_missing_file() {
        let err = read_net("does/not/exist.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
