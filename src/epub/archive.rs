//! 归档访问模块
//!
//! 提供对EPUB底层ZIP容器的只读访问：列出条目路径、按精确路径读取条目内容。

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use log::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::epub::error::{EpubError, Result};

/// 可随机访问的条目容器
///
/// 路径区分大小写，按原样比较，不做任何规范化。
pub trait Archive {
    /// 按归档中的顺序返回所有条目路径
    fn entry_names(&self) -> &[String];

    /// 读取指定路径条目的完整内容
    ///
    /// # 参数
    /// * `path` - 条目的精确路径
    ///
    /// # 返回值
    /// * `Result<Vec<u8>>` - 条目内容，路径不存在时返回 `EntryNotFound`
    fn read_entry(&self, path: &str) -> Result<Vec<u8>>;

    /// 检查是否存在指定路径的条目
    fn contains(&self, path: &str) -> bool {
        self.entry_names().iter().any(|name| name == path)
    }
}

/// 基于ZIP文件的归档
///
/// 条目列表在打开时一次性读取。内部的 `ZipArchive` 由互斥锁保护，
/// 因此多个线程可以通过共享引用并发读取不同条目。
pub struct ZipEntryArchive<R> {
    source_name: String,
    names: Vec<String>,
    zip: Mutex<ZipArchive<R>>,
}

impl ZipEntryArchive<File> {
    /// 从文件路径打开ZIP归档
    ///
    /// # 参数
    /// * `path` - ZIP文件路径
    ///
    /// # 返回值
    /// * `Result<ZipEntryArchive<File>>` - 打开失败时返回 `ArchiveOpen`，消息中包含原因
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source_name = path.as_ref().display().to_string();
        let file = File::open(path.as_ref()).map_err(|e| EpubError::ArchiveOpen {
            source_name: source_name.clone(),
            cause: ZipError::Io(e),
        })?;
        Self::from_reader(source_name, file)
    }
}

impl ZipEntryArchive<Cursor<Vec<u8>>> {
    /// 从内存中的字节打开ZIP归档
    pub fn from_bytes(source_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        Self::from_reader(source_name, Cursor::new(bytes))
    }
}

impl<R: Read + Seek> ZipEntryArchive<R> {
    /// 从任意可随机访问的读取器打开ZIP归档
    ///
    /// # 参数
    /// * `source_name` - 用于错误消息的来源名称
    /// * `reader` - ZIP数据源
    pub fn from_reader(source_name: impl Into<String>, reader: R) -> Result<Self> {
        let source_name = source_name.into();
        let open_error = |cause| EpubError::ArchiveOpen {
            source_name: source_name.clone(),
            cause,
        };

        let mut zip = ZipArchive::new(reader).map_err(open_error)?;
        let mut names = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index(i).map_err(open_error)?;
            names.push(file.name().to_string());
        }
        debug!("打开归档 {}: {} 个条目", source_name, names.len());

        Ok(Self {
            source_name,
            names,
            zip: Mutex::new(zip),
        })
    }

    /// 归档来源名称(通常是文件路径)
    pub fn source_name(&self) -> &str {
        &self.source_name
    }
}

impl<R: Read + Seek> Archive for ZipEntryArchive<R> {
    fn entry_names(&self) -> &[String] {
        &self.names
    }

    fn read_entry(&self, path: &str) -> Result<Vec<u8>> {
        // 锁中毒时继续使用内部的归档
        let mut zip = self.zip.lock().unwrap_or_else(PoisonError::into_inner);
        let mut file = match zip.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Err(EpubError::EntryNotFound(path.to_string())),
            Err(e) => return Err(e.into()),
        };

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Ok(buffer)
    }
}

/// 内存中的归档
///
/// 条目按插入顺序保存，重复路径不去重，读取时第一个匹配的条目生效。
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    names: Vec<String>,
    payloads: Vec<Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个条目
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.names.push(path.into());
        self.payloads.push(content.into());
    }

    /// 链式追加一个条目
    pub fn with_entry(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Archive for MemoryArchive {
    fn entry_names(&self) -> &[String] {
        &self.names
    }

    fn read_entry(&self, path: &str) -> Result<Vec<u8>> {
        self.names
            .iter()
            .position(|name| name == path)
            .map(|index| self.payloads[index].clone())
            .ok_or_else(|| EpubError::EntryNotFound(path.to_string()))
    }
}
