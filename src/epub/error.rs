use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EpubError>;

/// Epub相关的错误类型
///
/// 所有错误都是终止性的：加载流程或单次读取遇到错误即中止，不做重试。
#[derive(Error, Debug)]
pub enum EpubError {
    /// 归档无法打开或无法识别为ZIP，消息中保留底层原因
    #[error("无法加载 {source_name} ({cause})")]
    ArchiveOpen {
        source_name: String,
        #[source]
        cause: zip::result::ZipError,
    },

    #[error("EPUB中没有任何文件")]
    EmptyArchive,

    #[error("缺少mimetype文件")]
    MimetypeMissing,

    #[error("意外的mimetype ({0})")]
    UnexpectedMimetype(String),

    #[error("缺少META-INF/container.xml文件")]
    ContainerMissing,

    #[error("container.xml中没有找到rootfile条目")]
    RootfileNotFound,

    #[error("无法获取包文档的完整路径")]
    PackagePathNotFound,

    #[error("包文档不存在: {0}")]
    PackageFileMissing(String),

    #[error("文件不存在: {0}")]
    EntryNotFound(String),

    #[error("清单中没有ID为 {0} 的项")]
    ManifestIdNotFound(String),

    #[error("XML解析错误 ({path}): {source}")]
    Xml {
        path: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("IO错误: {0}")]
    Io(#[from] io::Error),

    #[error("Zip文件错误: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("配置文件错误: {0}")]
    ConfigError(String),
}
