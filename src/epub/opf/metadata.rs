//! 元数据处理模块
//!
//! 元数据以通用XML树的形式原样保留，类型化的访问器建立在这棵树之上。
//! 访问器查找哪些标签由 [`MetadataTagConfigs`] 决定。

use crate::epub::opf::config::MetadataTagConfigs;
use crate::epub::xml::XmlNode;
use serde::Serialize;

/// 元数据树中的一条记录
#[derive(Debug, Clone)]
pub struct MetadataEntry<'a> {
    /// 标签：普通元素为本地名称，`meta` 元素为 `property` 或 `name` 属性
    pub tag: String,
    /// 文本内容或 `content` 属性
    pub value: String,
    /// 记录对应的原始元素
    pub node: &'a XmlNode,
}

/// 通过 `refines` 附加到某个元素上的精化信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refinement {
    /// 被精化的元素ID（不包含#前缀）
    pub refines_id: String,
    /// property属性值（如role、file-as、display-seq等）
    pub property: String,
    pub content: String,
    /// scheme属性（可选，如marc:relators）
    pub scheme: Option<String>,
}

/// 创建者信息(作者、编辑者等)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    /// 创建者姓名
    pub name: String,
    /// 角色(如author、editor等)
    pub role: Option<String>,
    /// 排序用名称
    pub file_as: Option<String>,
    /// 显示顺序
    pub display_seq: Option<u32>,
    /// 元素ID（用于关联refines元数据）
    pub id: Option<String>,
}

/// 标识符信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// 标识符值
    pub value: String,
    /// 标识符类型(如ISBN、UUID等)
    pub scheme: Option<String>,
    pub id: Option<String>,
}

/// OPF文件中的元数据信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct Metadata {
    node: Option<XmlNode>,
    #[serde(skip)]
    tag_configs: MetadataTagConfigs,
}

impl Metadata {
    /// 使用给定的元数据元素和标签配置创建实例
    pub fn new(node: Option<XmlNode>, tag_configs: MetadataTagConfigs) -> Self {
        Self { node, tag_configs }
    }

    /// 原始的metadata元素，包文档中没有该元素时为 `None`
    pub fn node(&self) -> Option<&XmlNode> {
        self.node.as_ref()
    }

    /// 是否没有任何元数据
    pub fn is_empty(&self) -> bool {
        self.node.as_ref().is_none_or(|node| node.children.is_empty())
    }

    /// 按文档顺序列出全部记录，`refines` 类型的meta不包含在内
    pub fn entries(&self) -> Vec<MetadataEntry<'_>> {
        let Some(node) = &self.node else {
            return Vec::new();
        };

        node.children
            .iter()
            .filter_map(|child| {
                if child.local_name() != "meta" {
                    return Some(MetadataEntry {
                        tag: child.local_name().to_string(),
                        value: child.text.clone(),
                        node: child,
                    });
                }
                if child.attribute("refines").is_some() {
                    return None;
                }

                // EPUB3: <meta property="dcterms:modified">2025-06-05T11:24:01Z</meta>
                // EPUB2: <meta name="cover" content="cover-image"/>
                let tag = child.attribute("property").or_else(|| child.attribute("name"))?;
                let value = if child.text.is_empty() {
                    child.attribute("content").unwrap_or_default().to_string()
                } else {
                    child.text.clone()
                };
                Some(MetadataEntry {
                    tag: tag.to_string(),
                    value,
                    node: child,
                })
            })
            .collect()
    }

    /// 指定标签的全部非空值
    pub fn values(&self, tag: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.tag == tag && !entry.value.is_empty())
            .map(|entry| entry.value)
            .collect()
    }

    /// 指向指定元素ID的全部精化信息
    pub fn refinements(&self, id: &str) -> Vec<Refinement> {
        let Some(node) = &self.node else {
            return Vec::new();
        };

        node.children
            .iter()
            .filter(|child| child.local_name() == "meta")
            .filter_map(|child| {
                let refines_id = child.attribute("refines")?.trim_start_matches('#');
                if refines_id != id {
                    return None;
                }
                let content = if child.text.is_empty() {
                    child.attribute("content").unwrap_or_default()
                } else {
                    child.text.as_str()
                };
                Some(Refinement {
                    refines_id: refines_id.to_string(),
                    property: child.attribute("property")?.to_string(),
                    content: content.to_string(),
                    scheme: child.attribute("scheme").map(str::to_string),
                })
            })
            .collect()
    }

    /// 根据标签列表查找第一个非空值，标签越靠前优先级越高
    fn find_by_tags(&self, tags: &[String]) -> Option<String> {
        let entries = self.entries();
        tags.iter().find_map(|tag| {
            entries
                .iter()
                .find(|entry| &entry.tag == tag && !entry.value.is_empty())
                .map(|entry| entry.value.clone())
        })
    }

    /// 根据标签列表按文档顺序查找所有非空记录
    fn find_all_by_tags(&self, tags: &[String]) -> Vec<MetadataEntry<'_>> {
        self.entries()
            .into_iter()
            .filter(|entry| tags.contains(&entry.tag) && !entry.value.is_empty())
            .collect()
    }

    /// 获取标题
    pub fn title(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.title.tags)
    }

    /// 获取所有创建者
    pub fn creators(&self) -> Vec<Creator> {
        self.find_all_by_tags(&self.tag_configs.creator.tags)
            .iter()
            .map(|entry| self.extract_creator(entry))
            .collect()
    }

    /// 获取所有贡献者
    pub fn contributors(&self) -> Vec<Creator> {
        self.find_all_by_tags(&self.tag_configs.contributor.tags)
            .iter()
            .map(|entry| self.extract_creator(entry))
            .collect()
    }

    /// 获取语言
    pub fn language(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.language.tags)
    }

    /// 获取所有标识符
    pub fn identifiers(&self) -> Vec<Identifier> {
        self.find_all_by_tags(&self.tag_configs.identifier.tags)
            .iter()
            .map(|entry| Identifier {
                value: entry.value.clone(),
                scheme: entry.node.attribute_local("scheme").map(str::to_string),
                id: entry.node.attribute("id").map(str::to_string),
            })
            .collect()
    }

    /// 获取出版社
    pub fn publisher(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.publisher.tags)
    }

    /// 获取出版日期
    pub fn date(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.date.tags)
    }

    /// 获取描述
    pub fn description(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.description.tags)
    }

    /// 获取所有主题
    pub fn subjects(&self) -> Vec<String> {
        self.find_all_by_tags(&self.tag_configs.subject.tags)
            .into_iter()
            .map(|entry| entry.value)
            .collect()
    }

    /// 获取版权信息
    pub fn rights(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.rights.tags)
    }

    /// 获取封面信息(通常是清单项ID)
    pub fn cover(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.cover.tags)
    }

    /// 获取修改时间
    pub fn modified(&self) -> Option<String> {
        self.find_by_tags(&self.tag_configs.modified.tags)
    }

    /// 从记录中提取创建者信息（支持EPUB2的opf:role属性与EPUB3的refines关联）
    fn extract_creator(&self, entry: &MetadataEntry<'_>) -> Creator {
        let mut creator = Creator {
            name: entry.value.clone(),
            role: entry.node.attribute_local("role").map(expand_role),
            file_as: entry.node.attribute_local("file-as").map(str::to_string),
            display_seq: None,
            id: entry.node.attribute("id").map(str::to_string),
        };

        if let Some(id) = &creator.id {
            for refinement in self.refinements(id) {
                match refinement.property.as_str() {
                    "role" => creator.role = Some(expand_role(&refinement.content)),
                    "file-as" => creator.file_as = Some(refinement.content),
                    "display-seq" => creator.display_seq = refinement.content.parse::<u32>().ok(),
                    _ => {}
                }
            }
        }

        creator
    }
}

/// 将MARC relator代码转换为可读的角色名称
fn expand_role(code: &str) -> String {
    match code {
        "aut" => "author".to_string(),
        "edt" => "editor".to_string(),
        "trl" => "translator".to_string(),
        "ill" => "illustrator".to_string(),
        other => other.to_string(),
    }
}
