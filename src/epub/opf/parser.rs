//! OPF解析器模块
//!
//! 将包文档(OPF)的XML树整理为元数据、清单与脊柱。

use crate::epub::error::Result;
use crate::epub::opf::{
    config::ParseConfig,
    manifest::ManifestItem,
    metadata::Metadata,
    spine::SpineItem,
};
use crate::epub::xml::{self, XmlNode};
use log::{debug, warn};
use std::collections::HashSet;

/// OPF文件解析结果
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// EPUB版本(package元素的version属性)
    pub version: String,
    /// package元素的unique-identifier属性
    pub unique_identifier: Option<String>,
    /// 元数据
    pub metadata: Metadata,
    /// 清单项，按文档顺序
    pub manifest: Vec<ManifestItem>,
    /// 脊柱(阅读顺序)
    pub spine: Vec<SpineItem>,
    /// 脊柱的目录引用
    pub spine_toc: Option<String>,
}

impl Package {
    /// 解析OPF文件内容
    ///
    /// # 参数
    /// * `xml_content` - OPF文件的XML内容
    /// * `path` - OPF文件在归档中的路径，用于错误消息
    /// * `config` - 元素前缀与元数据标签配置
    ///
    /// # 返回值
    /// * `Result<Package, EpubError>` - 解析后的包信息
    pub fn parse_xml(xml_content: &[u8], path: &str, config: &ParseConfig) -> Result<Package> {
        let document = xml::parse_document(xml_content, path)?;
        Ok(Self::from_document(&document, config))
    }

    /// 从已解析的XML树中提取包信息
    ///
    /// 每一级元素都先按不带前缀的名称查找，再依次尝试配置中的前缀。
    /// 缺少 `package`、`metadata`、`manifest` 或 `spine` 元素时得到空结果而不是错误。
    pub fn from_document(document: &XmlNode, config: &ParseConfig) -> Package {
        let Some(package) = xml::resolve(document, &config.candidates("package")) else {
            warn!("包文档中没有package元素");
            return Package {
                metadata: Metadata::new(None, config.metadata_tags.clone()),
                ..Package::default()
            };
        };

        let metadata = Metadata::new(
            xml::resolve(package, &config.candidates("metadata")).cloned(),
            config.metadata_tags.clone(),
        );

        let manifest: Vec<ManifestItem> = xml::resolve(package, &config.candidates("manifest"))
            .map(|manifest| {
                xml::resolve_all(manifest, &config.candidates("item"))
                    .into_iter()
                    .map(ManifestItem::from_node)
                    .collect()
            })
            .unwrap_or_default();

        let spine_node = xml::resolve(package, &config.candidates("spine"));
        let spine: Vec<SpineItem> = spine_node
            .map(|spine| {
                xml::resolve_all(spine, &config.candidates("itemref"))
                    .into_iter()
                    .map(SpineItem::from_node)
                    .collect()
            })
            .unwrap_or_default();

        Self::warn_duplicate_ids(&manifest);
        debug!("解析包文档: {} 个清单项, {} 个脊柱项", manifest.len(), spine.len());

        Package {
            version: package.attribute("version").unwrap_or_default().to_string(),
            unique_identifier: package.attribute("unique-identifier").map(str::to_string),
            metadata,
            manifest,
            spine,
            spine_toc: spine_node.and_then(|spine| spine.attribute("toc")).map(str::to_string),
        }
    }

    fn warn_duplicate_ids(manifest: &[ManifestItem]) {
        let mut seen = HashSet::new();
        for id in manifest.iter().filter_map(ManifestItem::id) {
            if !seen.insert(id) {
                warn!("清单中存在重复的ID: {}，按ID查找时使用第一个", id);
            }
        }
    }

    /// 根据ID获取清单项，ID重复时返回第一个
    ///
    /// # 参数
    /// * `id` - 清单项ID
    ///
    /// # 返回值
    /// * `Option<&ManifestItem>` - 清单项引用
    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.id() == Some(id))
    }

    /// 获取导航文档对应的清单项
    pub fn nav_item(&self) -> Option<&ManifestItem> {
        self.manifest.iter().find(|item| item.is_nav())
    }

    /// 获取封面图片对应的清单项
    ///
    /// 先检查具有cover-image属性的清单项，再检查元数据中的cover信息
    pub fn cover_item(&self) -> Option<&ManifestItem> {
        self.manifest
            .iter()
            .find(|item| item.is_cover_image())
            .or_else(|| {
                let cover_id = self.metadata.cover()?;
                self.manifest_item(&cover_id)
            })
    }

    /// 按阅读顺序列出脊柱引用的ID
    pub fn spine_idrefs(&self) -> impl Iterator<Item = &str> {
        self.spine.iter().map(|item| item.idref.as_str())
    }
}
