use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use log::debug;

use crate::epub::archive::{Archive, ZipEntryArchive};
use crate::epub::container::{Container, ContainerResolver};
use crate::epub::error::{EpubError, Result};
use crate::epub::opf::{ManifestItem, Metadata, Package, ParseConfig, SpineItem};
use crate::epub::path;
use crate::epub::xml;

/// 按清单ID读取的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    /// 解析后的归档路径
    pub path: String,
    /// 文件内容
    pub content: Vec<u8>,
}

/// 表示一个已加载的EPUB文件
///
/// 加载完成后不可变。两个读取方法都只需要共享引用，
/// 归档实现 `Sync` 时可以在多个线程中同时调用。
pub struct Epub<A: Archive = ZipEntryArchive<File>> {
    archive: A,
    container: Container,
    package: Package,
    base_dir: String,
}

impl Epub {
    /// 从文件路径加载EPUB
    ///
    /// # 参数
    /// * `path` - epub文件的路径
    ///
    /// # 返回值
    /// * `Result<Epub, EpubError>` - 成功返回Epub实例，失败返回错误
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Epub> {
        Self::open_with_config(path, ParseConfig::shared())
    }

    /// 使用指定的解析配置从文件路径加载EPUB
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: &ParseConfig) -> Result<Epub> {
        let archive = ZipEntryArchive::open(path)?;
        Epub::from_archive(archive, config)
    }
}

impl Epub<ZipEntryArchive<Cursor<Vec<u8>>>> {
    /// 从内存中的EPUB字节加载
    ///
    /// # 参数
    /// * `source_name` - 用于错误消息的来源名称
    /// * `bytes` - EPUB文件内容
    pub fn from_bytes(source_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let archive = ZipEntryArchive::from_bytes(source_name, bytes)?;
        Self::from_archive(archive, ParseConfig::shared())
    }
}

impl<A: Archive> Epub<A> {
    /// 从任意归档加载EPUB
    ///
    /// 加载步骤依次为：验证容器并定位包文档、解析包文档、计算包文档所在目录。
    /// 任何一步失败都会直接返回错误，不会得到部分结果。
    pub fn from_archive(archive: A, config: &ParseConfig) -> Result<Self> {
        let container = ContainerResolver::resolve(&archive)?;

        let package_xml = archive.read_entry(&container.package_path)?;
        let document = xml::parse_document(&package_xml, &container.package_path)?;
        let package = Package::from_document(&document, config);
        let base_dir = path::parent_dir(&container.package_path).to_string();

        debug!(
            "加载EPUB完成: {} 个文件, 包文档 {}, {} 个清单项, {} 个脊柱项",
            archive.entry_names().len(),
            container.package_path,
            package.manifest.len(),
            package.spine.len()
        );

        Ok(Self {
            archive,
            container,
            package,
            base_dir,
        })
    }

    /// 归档中的全部文件路径，按归档顺序
    pub fn files(&self) -> &[String] {
        self.archive.entry_names()
    }

    /// 清单
    pub fn manifest(&self) -> &[ManifestItem] {
        &self.package.manifest
    }

    /// 元数据
    pub fn metadata(&self) -> &Metadata {
        &self.package.metadata
    }

    /// 脊柱
    pub fn spine(&self) -> &[SpineItem] {
        &self.package.spine
    }

    /// 完整的包信息
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// 容器描述信息
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// 包文档在归档中的路径
    pub fn package_path(&self) -> &str {
        &self.container.package_path
    }

    /// 包文档所在目录，清单中的href都相对于该目录
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// EPUB版本
    pub fn version(&self) -> &str {
        &self.package.version
    }

    /// 底层归档
    pub fn archive(&self) -> &A {
        &self.archive
    }

    /// 按归档路径读取文件内容
    ///
    /// 路径按原样使用，不会相对于包文档目录解析。
    ///
    /// # 参数
    /// * `path` - 文件在归档中的完整路径
    ///
    /// # 返回值
    /// * `Result<Vec<u8>>` - 文件内容，路径不存在时返回 `EntryNotFound`
    pub fn get_file_content(&self, path: &str) -> Result<Vec<u8>> {
        self.archive.read_entry(path)
    }

    /// 按清单ID读取文件内容
    ///
    /// # 参数
    /// * `id` - 清单项ID，ID重复时使用第一个匹配的清单项
    ///
    /// # 返回值
    /// * `Result<ResolvedContent>` - 解析后的路径与文件内容。
    ///   ID不存在时返回 `ManifestIdNotFound`，解析后的路径不存在时返回 `EntryNotFound`
    pub fn get_file_content_by_id(&self, id: &str) -> Result<ResolvedContent> {
        let item = self
            .package
            .manifest_item(id)
            .ok_or_else(|| EpubError::ManifestIdNotFound(id.to_string()))?;

        let path = self.resolve_href(item.href().unwrap_or_default());
        if !self.archive.contains(&path) {
            return Err(EpubError::EntryNotFound(path));
        }

        let content = self.archive.read_entry(&path)?;
        Ok(ResolvedContent { path, content })
    }

    /// 根据ID获取清单项
    pub fn manifest_item(&self, id: &str) -> Option<&ManifestItem> {
        self.package.manifest_item(id)
    }

    /// 将清单中的href解析为归档路径
    pub fn resolve_href(&self, href: &str) -> String {
        path::resolve_href(&self.base_dir, href)
    }

    /// 按阅读顺序返回脊柱引用的清单项
    ///
    /// 引用不存在的ID时返回 `ManifestIdNotFound`。
    pub fn spine_items(&self) -> Result<Vec<&ManifestItem>> {
        self.package
            .spine
            .iter()
            .map(|spine_item| {
                self.package
                    .manifest_item(&spine_item.idref)
                    .ok_or_else(|| EpubError::ManifestIdNotFound(spine_item.idref.clone()))
            })
            .collect()
    }

    /// 导航文档的清单项
    pub fn nav_item(&self) -> Option<&ManifestItem> {
        self.package.nav_item()
    }

    /// 封面图片的清单项
    pub fn cover_item(&self) -> Option<&ManifestItem> {
        self.package.cover_item()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::archive::MemoryArchive;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::FileOptions;

    const CONTAINER_XML: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
    <rootfiles>
        <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
    </rootfiles>
</container>"#;

    const OPF_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package version="3.0" xmlns="http://www.idpf.org/2007/opf" unique-identifier="BookId">
    <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
        <dc:title>测试书籍</dc:title>
        <dc:creator>测试作者</dc:creator>
        <dc:language>zh-CN</dc:language>
        <dc:identifier id="BookId">978-1234567890</dc:identifier>
    </metadata>
    <manifest>
        <item id="chapter1" href="text/chapter1.xhtml" media-type="application/xhtml+xml"/>
        <item id="chapter2" href="text/chapter2.xhtml" media-type="application/xhtml+xml"/>
        <item id="style" href="../styles/main.css" media-type="text/css"/>
        <item id="missing" href="text/missing.xhtml" media-type="application/xhtml+xml"/>
    </manifest>
    <spine>
        <itemref idref="chapter1"/>
        <itemref idref="chapter2"/>
    </spine>
</package>"#;

    const CHAPTER1: &str = "<html><body><h1>第一章</h1></body></html>";
    const CHAPTER2: &str = "<html><body><h1>第二章</h1></body></html>";

    /// 创建一个测试用的EPUB文件内容
    fn build_epub(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            zip.start_file(*name, FileOptions::<()>::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn standard_entries<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("mimetype", "application/epub+zip"),
            ("META-INF/container.xml", CONTAINER_XML),
            ("OEBPS/content.opf", OPF_XML),
            ("OEBPS/text/chapter1.xhtml", CHAPTER1),
            ("OEBPS/text/chapter2.xhtml", CHAPTER2),
            ("styles/main.css", "body { margin: 0; }"),
        ]
    }

    fn standard_epub() -> Epub<ZipEntryArchive<Cursor<Vec<u8>>>> {
        Epub::from_bytes("test.epub", build_epub(&standard_entries())).unwrap()
    }

    #[test]
    fn test_load_valid_epub() {
        let epub = standard_epub();

        assert_eq!(epub.files().len(), 6);
        assert_eq!(epub.files()[0], "mimetype");
        assert_eq!(epub.package_path(), "OEBPS/content.opf");
        assert_eq!(epub.base_dir(), "OEBPS");
        assert_eq!(epub.version(), "3.0");
        assert_eq!(epub.manifest().len(), 4);
        assert_eq!(epub.spine().len(), 2);
        assert_eq!(epub.metadata().title(), Some("测试书籍".to_string()));
        assert_eq!(epub.metadata().language(), Some("zh-CN".to_string()));
        assert_eq!(epub.container().rootfiles.len(), 1);
    }

    #[test]
    fn test_open_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&build_epub(&standard_entries())).unwrap();

        let epub = Epub::open(file.path()).unwrap();
        assert_eq!(epub.spine().len(), 2);

        let epub = crate::open(file.path()).unwrap();
        assert_eq!(epub.manifest().len(), 4);
    }

    #[test]
    fn test_get_file_content() {
        let epub = standard_epub();

        let content = epub.get_file_content("OEBPS/text/chapter1.xhtml").unwrap();
        assert_eq!(content, CHAPTER1.as_bytes());

        // 路径不会相对于包文档目录解析
        assert!(matches!(
            epub.get_file_content("text/chapter1.xhtml"),
            Err(EpubError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_get_file_content_is_idempotent() {
        let epub = standard_epub();
        let first = epub.get_file_content("OEBPS/text/chapter2.xhtml").unwrap();
        let second = epub.get_file_content("OEBPS/text/chapter2.xhtml").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_get_file_content_by_id() {
        let epub = standard_epub();

        let resolved = epub.get_file_content_by_id("chapter1").unwrap();
        assert_eq!(resolved.path, "OEBPS/text/chapter1.xhtml");
        assert_eq!(resolved.content, CHAPTER1.as_bytes());
        assert_eq!(resolved.content, epub.get_file_content(&resolved.path).unwrap());

        let style = epub.get_file_content_by_id("style").unwrap();
        assert_eq!(style.path, "styles/main.css");
    }

    #[test]
    fn test_get_file_content_by_unknown_id() {
        let epub = standard_epub();
        match epub.get_file_content_by_id("nonexistent-id") {
            Err(EpubError::ManifestIdNotFound(id)) => assert_eq!(id, "nonexistent-id"),
            other => panic!("期望ManifestIdNotFound错误, 实际: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_get_file_content_by_id_missing_file() {
        let epub = standard_epub();
        match epub.get_file_content_by_id("missing") {
            Err(EpubError::EntryNotFound(path)) => assert_eq!(path, "OEBPS/text/missing.xhtml"),
            other => panic!("期望EntryNotFound错误, 实际: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_spine_items() {
        let epub = standard_epub();
        let ids: Vec<_> = epub
            .spine_items()
            .unwrap()
            .into_iter()
            .filter_map(|item| item.id())
            .collect();
        assert_eq!(ids, vec!["chapter1", "chapter2"]);
    }

    #[test]
    fn test_dangling_spine_reference_is_lazy() {
        let opf = OPF_XML.replace(r#"<itemref idref="chapter2"/>"#, r#"<itemref idref="ghost"/>"#);
        let mut entries = standard_entries();
        entries[2] = ("OEBPS/content.opf", opf.as_str());

        let epub = Epub::from_bytes("test.epub", build_epub(&entries)).unwrap();
        assert_eq!(epub.spine()[1].idref, "ghost");
        assert!(matches!(epub.spine_items(), Err(EpubError::ManifestIdNotFound(ref id)) if id == "ghost"));
        assert!(matches!(
            epub.get_file_content_by_id("ghost"),
            Err(EpubError::ManifestIdNotFound(_))
        ));
    }

    #[test]
    fn test_missing_mimetype() {
        let mut entries = standard_entries();
        entries.remove(0);
        let result = Epub::from_bytes("test.epub", build_epub(&entries));
        assert!(matches!(result, Err(EpubError::MimetypeMissing)));
    }

    #[test]
    fn test_invalid_mimetype() {
        let mut entries = standard_entries();
        entries[0] = ("mimetype", "text/plain");
        match Epub::from_bytes("test.epub", build_epub(&entries)) {
            Err(err @ EpubError::UnexpectedMimetype(_)) => assert!(err.to_string().contains("text/plain")),
            Err(other) => panic!("期望UnexpectedMimetype错误, 实际: {}", other),
            Ok(_) => panic!("无效的mimetype不应加载成功"),
        }
    }

    #[test]
    fn test_malformed_package_document() {
        let mut entries = standard_entries();
        entries[2] = ("OEBPS/content.opf", "<package><manifest></package>");
        match Epub::from_bytes("test.epub", build_epub(&entries)) {
            Err(EpubError::Xml { path, .. }) => assert_eq!(path, "OEBPS/content.opf"),
            Err(other) => panic!("期望Xml错误, 实际: {}", other),
            Ok(_) => panic!("格式错误的包文档不应加载成功"),
        }
    }

    #[test]
    fn test_truncated_package_document_fails() {
        let archive = MemoryArchive::new()
            .with_entry("mimetype", "application/epub+zip")
            .with_entry("META-INF/container.xml", CONTAINER_XML)
            .with_entry(
                "OEBPS/content.opf",
                r#"<package><manifest><item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>"#,
            );

        match Epub::from_archive(archive, &ParseConfig::default()) {
            Err(EpubError::Xml { path, .. }) => assert_eq!(path, "OEBPS/content.opf"),
            Err(other) => panic!("期望Xml错误, 实际: {}", other),
            Ok(epub) => panic!("截断的包文档不应加载成功, 清单项数: {}", epub.manifest().len()),
        }
    }

    #[test]
    fn test_prefixed_package_loads_identically() {
        let prefixed = OPF_XML
            .replace("<package", "<opf:package xmlns:opf=\"http://www.idpf.org/2007/opf\"")
            .replace("</package>", "</opf:package>")
            .replace("<metadata", "<opf:metadata")
            .replace("</metadata>", "</opf:metadata>")
            .replace("<manifest>", "<opf:manifest>")
            .replace("</manifest>", "</opf:manifest>")
            .replace("<item ", "<opf:item ")
            .replace("<spine>", "<opf:spine>")
            .replace("</spine>", "</opf:spine>")
            .replace("<itemref ", "<opf:itemref ");
        let mut entries = standard_entries();
        entries[2] = ("OEBPS/content.opf", prefixed.as_str());

        let plain = standard_epub();
        let epub = Epub::from_bytes("prefixed.epub", build_epub(&entries)).unwrap();
        assert_eq!(epub.manifest(), plain.manifest());
        assert_eq!(epub.spine(), plain.spine());
        assert_eq!(epub.metadata().title(), plain.metadata().title());
    }

    #[test]
    fn test_package_at_archive_root() {
        let archive = MemoryArchive::new()
            .with_entry("mimetype", "application/epub+zip")
            .with_entry(
                "META-INF/container.xml",
                r#"<container><rootfiles><rootfile full-path="content.opf" media-type="application/oebps-package+xml"/></rootfiles></container>"#,
            )
            .with_entry(
                "content.opf",
                r#"<package><manifest><item id="c1" href="./c1.xhtml" media-type="application/xhtml+xml"/></manifest></package>"#,
            )
            .with_entry("c1.xhtml", "<html/>");

        let epub = Epub::from_archive(archive, &ParseConfig::default()).unwrap();
        assert_eq!(epub.base_dir(), "");
        assert!(epub.spine().is_empty());
        assert!(epub.metadata().is_empty());

        let resolved = epub.get_file_content_by_id("c1").unwrap();
        assert_eq!(resolved.path, "c1.xhtml");
        assert_eq!(resolved.content, b"<html/>");
    }

    #[test]
    fn test_concurrent_reads() {
        let epub = standard_epub();

        std::thread::scope(|scope| {
            let handles: Vec<_> = ["chapter1", "chapter2", "chapter1", "chapter2"]
                .into_iter()
                .map(|id| {
                    let epub = &epub;
                    scope.spawn(move || epub.get_file_content_by_id(id).unwrap())
                })
                .collect();

            for handle in handles {
                let resolved = handle.join().unwrap();
                let expected = if resolved.path.ends_with("chapter1.xhtml") { CHAPTER1 } else { CHAPTER2 };
                assert_eq!(resolved.content, expected.as_bytes());
            }
        });
    }
}
