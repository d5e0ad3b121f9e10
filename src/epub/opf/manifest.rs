//! 清单模块
//!
//! 提供EPUB包中文件清单的结构定义。

use crate::epub::xml::XmlNode;
use serde::Serialize;

/// 清单项信息
///
/// 保存 `item` 元素的全部属性，顺序与文档一致。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestItem {
    attributes: Vec<(String, String)>,
}

impl ManifestItem {
    /// 创建新的清单项
    pub fn new(id: &str, href: &str, media_type: &str) -> Self {
        Self {
            attributes: vec![
                ("id".to_string(), id.to_string()),
                ("href".to_string(), href.to_string()),
                ("media-type".to_string(), media_type.to_string()),
            ],
        }
    }

    /// 从 `item` 元素构造，属性原样保留
    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            attributes: node.attributes.clone(),
        }
    }

    /// 项目ID
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// 文件路径(相对于OPF文件)
    pub fn href(&self) -> Option<&str> {
        self.attribute("href")
    }

    /// 媒体类型
    pub fn media_type(&self) -> Option<&str> {
        self.attribute("media-type")
    }

    /// 属性(如nav、cover-image等)
    pub fn properties(&self) -> Option<&str> {
        self.attribute("properties")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 全部属性
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// 检查是否包含指定属性
    pub fn has_property(&self, property: &str) -> bool {
        self.properties()
            .is_some_and(|properties| properties.split_whitespace().any(|p| p == property))
    }

    /// 检查是否为导航文档
    pub fn is_nav(&self) -> bool {
        self.has_property("nav")
    }

    /// 检查是否为封面图片
    pub fn is_cover_image(&self) -> bool {
        self.has_property("cover-image")
    }

    /// 检查是否为图片文件
    pub fn is_image(&self) -> bool {
        self.media_type().is_some_and(|media_type| media_type.starts_with("image/"))
    }

    /// 检查是否为CSS文件
    pub fn is_css(&self) -> bool {
        self.media_type() == Some("text/css")
    }

    /// 检查是否为XHTML文件
    pub fn is_xhtml(&self) -> bool {
        self.media_type() == Some("application/xhtml+xml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_are_kept_verbatim() {
        let mut node = XmlNode::new("item");
        node.attributes = vec![
            ("id".to_string(), "cover".to_string()),
            ("href".to_string(), "images/cover.jpg".to_string()),
            ("media-type".to_string(), "image/jpeg".to_string()),
            ("properties".to_string(), "cover-image svg".to_string()),
            ("fallback".to_string(), "cover-png".to_string()),
        ];

        let item = ManifestItem::from_node(&node);
        assert_eq!(item.id(), Some("cover"));
        assert_eq!(item.href(), Some("images/cover.jpg"));
        assert_eq!(item.attribute("fallback"), Some("cover-png"));
        assert_eq!(item.attributes().len(), 5);
        assert!(item.is_cover_image());
        assert!(item.has_property("svg"));
        assert!(!item.is_nav());
        assert!(item.is_image());
    }

    #[test]
    fn test_missing_attributes() {
        let item = ManifestItem::from_node(&XmlNode::new("item"));
        assert_eq!(item.id(), None);
        assert!(!item.is_image());
        assert!(!item.has_property("nav"));
    }

    #[test]
    fn test_media_type_helpers() {
        assert!(ManifestItem::new("css", "style.css", "text/css").is_css());
        assert!(ManifestItem::new("c1", "c1.xhtml", "application/xhtml+xml").is_xhtml());
    }
}
