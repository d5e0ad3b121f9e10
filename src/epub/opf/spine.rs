//! 脊柱模块
//!
//! 提供EPUB包中阅读顺序（脊柱）的结构定义。

use crate::epub::xml::XmlNode;
use serde::Serialize;

/// 脊柱项信息(阅读顺序)
///
/// `idref` 在解析时不做校验，引用不存在的清单项只会在读取内容时报错。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpineItem {
    /// 引用的清单项ID，缺少该属性时为空字符串
    pub idref: String,
    /// 是否线性阅读
    pub linear: bool,
    /// `itemref` 元素的全部属性，顺序与文档一致
    pub attributes: Vec<(String, String)>,
}

impl SpineItem {
    /// 创建新的脊柱项
    pub fn new(idref: impl Into<String>) -> Self {
        let idref = idref.into();
        Self {
            attributes: vec![("idref".to_string(), idref.clone())],
            idref,
            linear: true,
        }
    }

    /// 从 `itemref` 元素构造
    pub fn from_node(node: &XmlNode) -> Self {
        Self {
            idref: node.attribute("idref").unwrap_or_default().to_string(),
            linear: node.attribute("linear") != Some("no"),
            attributes: node.attributes.clone(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 属性(如page-spread-left等)
    pub fn properties(&self) -> Option<&str> {
        self.attribute("properties")
    }

    /// 检查是否为线性阅读
    pub fn is_linear(&self) -> bool {
        self.linear
    }
}
