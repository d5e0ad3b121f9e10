//! 通用XML树模块
//!
//! 将XML字节解析为无类型的节点树。元素名与属性名都按原样保留(包括命名空间前缀)，
//! 例如 `<opf:item>` 的名称就是 `opf:item`。

use crate::epub::error::{EpubError, Result};
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

/// XML元素节点
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    /// 限定名(含前缀)
    pub name: String,
    /// 按文档顺序排列的属性
    pub attributes: Vec<(String, String)>,
    /// 子元素
    pub children: Vec<XmlNode>,
    /// 直接包含的文本内容(已反转义并去除首尾空白)
    pub text: String,
}

impl XmlNode {
    /// 创建一个没有属性与子节点的元素
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// 去掉前缀后的本地名称
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// 按限定名精确查找属性
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 按本地名称查找属性，忽略前缀(如 `opf:role` 与 `role`)
    pub fn attribute_local(&self, name: &str) -> Option<&str> {
        self.attribute(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(key, _)| local_part(key) == name)
                .map(|(_, value)| value.as_str())
        })
    }

    /// 第一个名称完全匹配的子元素
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// 所有名称完全匹配的子元素
    pub fn children_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a XmlNode> + use<'a, 'n> {
        self.children.iter().filter(move |child| child.name == name)
    }
}

/// 按顺序尝试候选名称，返回第一个存在的子元素
///
/// # 参数
/// * `node` - 父节点
/// * `candidates` - 候选名称，越靠前优先级越高
///
/// # 返回值
/// * `Option<&XmlNode>` - 找到的子元素
pub fn resolve<'a, S: AsRef<str>>(node: &'a XmlNode, candidates: &[S]) -> Option<&'a XmlNode> {
    candidates
        .iter()
        .find_map(|name| node.child(name.as_ref()))
}

/// 按顺序尝试候选名称，返回第一个至少有一个匹配的名称下的全部子元素
///
/// 不同候选名称的子元素不会混在一起。
pub fn resolve_all<'a, S: AsRef<str>>(node: &'a XmlNode, candidates: &[S]) -> Vec<&'a XmlNode> {
    for name in candidates {
        let name = name.as_ref();
        let matched: Vec<&'a XmlNode> = node.children.iter().filter(|child| child.name == name).collect();
        if !matched.is_empty() {
            return matched;
        }
    }
    Vec::new()
}

/// 解析XML文档
///
/// 返回一个名称为空的文档节点，文档的根元素是它的子节点。
///
/// # 参数
/// * `xml` - XML字节内容(UTF-8)
/// * `path` - 文档在归档中的路径，仅用于错误消息
pub fn parse_document(xml: &[u8], path: &str) -> Result<XmlNode> {
    parse_tree(xml).map_err(|source| EpubError::Xml {
        path: path.to_string(),
        source,
    })
}

fn parse_tree(xml: &[u8]) -> std::result::Result<XmlNode, quick_xml::Error> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().expand_empty_elements = true;

    let mut stack = vec![XmlNode::default()];
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                stack.push(start_node(e)?);
            }
            Event::End(_) => {
                if stack.len() > 1 {
                    if let Some(node) = stack.pop() {
                        append_child(&mut stack, node);
                    }
                }
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    // 文档结束时仍有未闭合的元素
    if stack.len() > 1 {
        let name = stack.last().map(|node| node.name.clone()).unwrap_or_default();
        return Err(quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)));
    }

    Ok(stack.pop().unwrap_or_default())
}

fn start_node(e: &BytesStart) -> std::result::Result<XmlNode, quick_xml::Error> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(quick_xml::Error::InvalidAttr)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        node.attributes.push((key, value));
    }
    Ok(node)
}

fn append_child(stack: &mut [XmlNode], node: XmlNode) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}
