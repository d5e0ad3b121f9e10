pub mod epub;

// === 核心API重新导出 ===

/// 已加载的EPUB（主要接口）
pub use epub::{Epub, ResolvedContent};

/// 错误处理
pub use epub::{EpubError, Result};

// === 底层组件（高级用法） ===

/// 归档访问
pub use epub::{Archive, MemoryArchive, ZipEntryArchive};

/// 通用XML树
pub use epub::XmlNode;

/// 容器组件
pub use epub::{Container, ContainerResolver, RootFile};

/// OPF组件
pub use epub::{
    Package,
    Metadata,
    MetadataEntry,
    Refinement,
    Creator,
    Identifier,
    ManifestItem,
    SpineItem,
    MetadataTagConfig,
    MetadataTagConfigs,
    ParseConfig,
};

// === 库信息 ===

/// 库的版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库的描述
pub const DESCRIPTION: &str = "加载EPUB文件并解析其容器、清单、脊柱与元数据";

// === 便捷函数 ===

/// 快速打开EPUB文件
///
/// 这是 `Epub::open` 的便捷包装函数，使用默认解析配置。
///
/// # 参数
/// * `path` - EPUB文件路径
///
/// # 返回值
/// * `Result<Epub>` - EPUB实例
///
/// # 示例
///
/// ```rust,no_run
/// let epub = epub_loader::open("book.epub")?;
/// println!("书名: {:?}", epub.metadata().title());
/// for item in epub.spine_items()? {
///     println!("{:?}", item.href());
/// }
/// let chapter = epub.get_file_content_by_id("chapter1")?;
/// println!("{}: {} bytes", chapter.path, chapter.content.len());
/// # Ok::<(), epub_loader::EpubError>(())
/// ```
pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Epub> {
    Epub::open(path)
}
