pub mod error;
pub mod archive;
pub mod xml;
pub mod path;
pub mod container;
pub mod reader;
pub mod opf;

// 重新导出错误处理
pub use error::{EpubError, Result};

// 重新导出归档访问
pub use archive::{Archive, MemoryArchive, ZipEntryArchive};

// 重新导出通用XML树
pub use xml::XmlNode;

// 重新导出容器相关
pub use container::{Container, ContainerResolver, RootFile};

// 重新导出EPUB读取器
pub use reader::{Epub, ResolvedContent};

// 重新导出OPF相关
pub use opf::{
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
