//! 归档内路径处理
//!
//! 归档路径一律使用 `/` 分隔，与宿主操作系统无关，因此这里不使用 `std::path`。

/// 返回路径所在的目录，位于归档根目录时返回空字符串
///
/// # 示例
///
/// ```rust
/// use epub_loader::epub::path::parent_dir;
///
/// assert_eq!(parent_dir("OEBPS/content.opf"), "OEBPS");
/// assert_eq!(parent_dir("content.opf"), "");
/// ```
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// 将相对于 `base_dir` 的 `href` 解析为规范化的归档路径
///
/// `.` 与空段会被忽略，`..` 回退一级；超出根目录的 `..` 原样保留，
/// 这样的路径不会匹配任何条目。
pub fn resolve_href(base_dir: &str, href: &str) -> String {
    normalize(&format!("{}/{}", base_dir, href))
}

/// 规范化 `/` 分隔的路径
pub fn normalize(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), Some(last) if *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }

    parts.join("/")
}
