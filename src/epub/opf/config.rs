//! 解析配置模块
//!
//! 提供包文档解析的配置管理功能，支持从YAML文件加载配置。
//! 加载配置不会产生任何副作用(不会写入文件)。

use crate::epub::error::{EpubError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

static DEFAULT_CONFIG: Lazy<ParseConfig> = Lazy::new(ParseConfig::default);

/// 单个元数据类型的标签配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataTagConfig {
    /// 标签列表，按优先级排列
    pub tags: Vec<String>,
    /// 可选的描述
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MetadataTagConfig {
    /// 创建新的标签配置
    pub fn new(tags: Vec<String>) -> Self {
        Self {
            tags,
            description: None,
        }
    }

    /// 创建带描述的标签配置
    pub fn with_description(tags: &[&str], description: &str) -> Self {
        Self {
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            description: Some(description.to_string()),
        }
    }
}

/// 元数据标签配置，定义每种元数据类型对应的可能标签
///
/// 标签与元数据元素的本地名称比较(`dc:title` 对应 `title`)；
/// `<meta>` 元素则使用其 `property` 或 `name` 属性作为标签。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataTagConfigs {
    pub title: MetadataTagConfig,
    pub creator: MetadataTagConfig,
    pub contributor: MetadataTagConfig,
    pub language: MetadataTagConfig,
    pub identifier: MetadataTagConfig,
    pub publisher: MetadataTagConfig,
    pub date: MetadataTagConfig,
    pub description: MetadataTagConfig,
    pub subject: MetadataTagConfig,
    pub rights: MetadataTagConfig,
    pub cover: MetadataTagConfig,
    pub modified: MetadataTagConfig,
}

impl Default for MetadataTagConfigs {
    fn default() -> Self {
        Self {
            title: MetadataTagConfig::with_description(&["title"], "书籍标题"),
            creator: MetadataTagConfig::with_description(&["creator", "author"], "作者/创建者信息"),
            contributor: MetadataTagConfig::with_description(&["contributor"], "贡献者信息（编辑、插图等）"),
            language: MetadataTagConfig::with_description(&["language"], "书籍语言"),
            identifier: MetadataTagConfig::with_description(&["identifier"], "书籍标识符（ISBN、UUID等）"),
            publisher: MetadataTagConfig::with_description(&["publisher"], "出版社信息"),
            date: MetadataTagConfig::with_description(&["date"], "出版日期"),
            description: MetadataTagConfig::with_description(&["description"], "书籍描述/简介"),
            subject: MetadataTagConfig::with_description(&["subject"], "书籍主题/分类"),
            rights: MetadataTagConfig::with_description(&["rights"], "版权信息"),
            cover: MetadataTagConfig::with_description(&["cover"], "封面图片信息"),
            modified: MetadataTagConfig::with_description(&["dcterms:modified"], "最后修改时间"),
        }
    }
}

/// 包文档解析配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// 在不带前缀的元素名之后依次尝试的命名空间前缀
    pub element_prefixes: Vec<String>,
    /// 类型化元数据访问器使用的标签
    pub metadata_tags: MetadataTagConfigs,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            element_prefixes: vec!["opf".to_string()],
            metadata_tags: MetadataTagConfigs::default(),
        }
    }
}

impl ParseConfig {
    /// 全局共享的默认配置
    pub fn shared() -> &'static ParseConfig {
        &DEFAULT_CONFIG
    }

    /// 从YAML配置文件加载
    ///
    /// 文件中未出现的字段使用默认值。
    ///
    /// # 参数
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    /// * `Result<Self>` - 加载成功返回配置实例，失败返回 `ConfigError`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| EpubError::ConfigError(format!("无法读取配置文件 {}: {}", path.as_ref().display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// 从YAML字符串加载
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yml::from_str(content)
            .map_err(|e| EpubError::ConfigError(format!("配置文件格式错误: {}", e)))
    }

    /// 序列化为YAML字符串
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yml::to_string(self)
            .map_err(|e| EpubError::ConfigError(format!("序列化配置失败: {}", e)))
    }

    /// 生成某个本地名称的候选元素名：先是不带前缀的名称，再依次加上各个前缀
    ///
    /// # 示例
    ///
    /// ```rust
    /// use epub_loader::ParseConfig;
    ///
    /// let config = ParseConfig::default();
    /// assert_eq!(config.candidates("item"), vec!["item", "opf:item"]);
    /// ```
    pub fn candidates(&self, local_name: &str) -> Vec<String> {
        std::iter::once(local_name.to_string())
            .chain(
                self.element_prefixes
                    .iter()
                    .map(|prefix| format!("{}:{}", prefix, local_name)),
            )
            .collect()
    }
}
