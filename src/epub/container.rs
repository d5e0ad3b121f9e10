use crate::epub::archive::Archive;
use crate::epub::error::{EpubError, Result};
use crate::epub::xml::{self, XmlNode};
use log::{debug, warn};

/// mimetype文件的路径
pub const MIMETYPE_PATH: &str = "mimetype";

/// EPUB要求的mimetype内容
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// 容器描述文件的固定路径
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// OPF包文档的媒体类型
pub const PACKAGE_MEDIA_TYPE: &str = "application/oebps-package+xml";

/// Container.xml中的rootfile信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootFile {
    pub full_path: Option<String>,
    pub media_type: Option<String>,
}

impl RootFile {
    /// 是否可以作为包文档：媒体类型正确且 `full-path` 非空
    pub fn is_package(&self) -> bool {
        self.media_type.as_deref() == Some(PACKAGE_MEDIA_TYPE)
            && self.full_path.as_deref().is_some_and(|path| !path.is_empty())
    }
}

/// Container.xml的解析结果
#[derive(Debug, Clone)]
pub struct Container {
    /// 第一个rootfiles元素下的全部rootfile，按文档顺序
    pub rootfiles: Vec<RootFile>,
    /// 选中的包文档路径
    pub package_path: String,
}

impl Container {
    /// 解析container.xml内容
    ///
    /// 只检查描述文件本身，不检查包文档是否存在于归档中。
    ///
    /// # 参数
    /// * `xml_content` - container.xml的文件内容
    ///
    /// # 返回值
    /// * `Result<Container, EpubError>` - 解析后的Container信息
    pub fn parse_xml(xml_content: &[u8]) -> Result<Container> {
        let document = xml::parse_document(xml_content, CONTAINER_PATH)?;
        Self::from_document(&document)
    }

    /// 从已解析的XML树中提取rootfile并选出包文档路径
    pub fn from_document(document: &XmlNode) -> Result<Container> {
        let rootfiles: Vec<RootFile> = document
            .child("container")
            .and_then(|container| container.child("rootfiles"))
            .map(|rootfiles| {
                rootfiles
                    .children_named("rootfile")
                    .map(|rootfile| RootFile {
                        full_path: rootfile.attribute("full-path").map(str::to_string),
                        media_type: rootfile.attribute("media-type").map(str::to_string),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if rootfiles.is_empty() {
            return Err(EpubError::RootfileNotFound);
        }

        let package_path = rootfiles
            .iter()
            .find(|rootfile| rootfile.is_package())
            .and_then(|rootfile| rootfile.full_path.clone())
            .ok_or(EpubError::PackagePathNotFound)?;

        let container = Container {
            rootfiles,
            package_path,
        };
        for rootfile in container.unselected_rootfiles() {
            warn!(
                "忽略container.xml中的rootfile: {} ({})",
                rootfile.full_path.as_deref().unwrap_or_default(),
                rootfile.media_type.as_deref().unwrap_or_default()
            );
        }

        Ok(container)
    }

    /// 未被选为包文档的rootfile
    pub fn unselected_rootfiles(&self) -> impl Iterator<Item = &RootFile> {
        self.rootfiles
            .iter()
            .filter(|rootfile| rootfile.full_path.as_deref() != Some(self.package_path.as_str()))
    }
}

/// 容器解析器
///
/// 按固定顺序验证归档并定位包文档，任何一步失败都会立即返回。
pub struct ContainerResolver;

impl ContainerResolver {
    /// 验证EPUB容器并返回包文档信息
    ///
    /// 检查步骤：
    /// 1. 归档中至少有一个条目
    /// 2. 存在mimetype文件
    /// 3. mimetype内容恰好为"application/epub+zip"
    /// 4. 存在META-INF/container.xml
    /// 5. container.xml中有rootfile条目
    /// 6. 有媒体类型为OPF且full-path非空的rootfile
    /// 7. 该full-path在归档中存在
    pub fn resolve<A: Archive + ?Sized>(archive: &A) -> Result<Container> {
        if archive.entry_names().is_empty() {
            return Err(EpubError::EmptyArchive);
        }

        Self::check_mimetype(archive)?;

        if !archive.contains(CONTAINER_PATH) {
            return Err(EpubError::ContainerMissing);
        }
        let container = Container::parse_xml(&archive.read_entry(CONTAINER_PATH)?)?;

        if !archive.contains(&container.package_path) {
            warn!("container.xml指向的包文档不存在: {}", container.package_path);
            return Err(EpubError::PackageFileMissing(container.package_path));
        }

        debug!("包文档路径: {}", container.package_path);
        Ok(container)
    }

    fn check_mimetype<A: Archive + ?Sized>(archive: &A) -> Result<()> {
        if !archive.contains(MIMETYPE_PATH) {
            return Err(EpubError::MimetypeMissing);
        }

        let content = archive.read_entry(MIMETYPE_PATH)?;
        let mimetype = String::from_utf8_lossy(&content);
        if mimetype != EPUB_MIMETYPE {
            return Err(EpubError::UnexpectedMimetype(mimetype.into_owned()));
        }

        Ok(())
    }
}
