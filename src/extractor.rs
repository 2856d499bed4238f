use std::fs;
use std::io;
use std::path::Path;

use lopdf::Document;

/// 一次文本提取的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    /// 所有页面都没有可提取的文本，比如扫描件
    Empty,
    /// 文件无法被解析为pdf
    UnsupportedFormat(String),
}

/// 按页序提取pdf文本，累计超过`max_chars`个字符后停止
///
/// 文件读取失败返回`Err`，其余情况都由[`Extraction`]表示
pub fn extract_text(path: &Path, max_chars: usize) -> io::Result<Extraction> {
    let bytes = fs::read(path)?;
    let document = match Document::load_mem(&bytes) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("无法解析pdf文件{}: {e}", path.display());
            return Ok(Extraction::UnsupportedFormat(e.to_string()));
        }
    };

    // get_pages 返回按页码排序的BTreeMap
    let pages = document.get_pages().into_keys().map(|page_number| {
        match document.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("第{page_number}页没有可提取的文本: {e}");
                String::new()
            }
        }
    });
    let text = accumulate_pages(pages, max_chars);

    if text.trim().is_empty() {
        return Ok(Extraction::Empty);
    }
    Ok(Extraction::Text(text))
}

/// 拼接页面文本直到达到字符上限
///
/// 第一个有文本的页面本身超过上限时整页保留，之后的页面会在上限处截断
pub fn accumulate_pages<I>(pages: I, max_chars: usize) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut text = String::new();
    let mut len = 0;
    for page in pages {
        let page_len = page.chars().count();
        if len + page_len <= max_chars {
            text.push_str(&page);
            len += page_len;
            if len == max_chars {
                break;
            }
            continue;
        }
        if len == 0 {
            text.push_str(&page);
        } else {
            text.extend(page.chars().take(max_chars - len));
        }
        break;
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(lens: &[usize]) -> Vec<String> {
        lens.iter()
            .enumerate()
            .map(|(i, len)| char::from(b'a' + i as u8).to_string().repeat(*len))
            .collect()
    }

    #[test]
    fn short_documents_are_kept_whole() {
        let text = accumulate_pages(pages(&[100, 200]), 2000);
        assert_eq!(text.chars().count(), 300);
    }

    #[test]
    fn later_pages_are_truncated_at_the_cap() {
        let text = accumulate_pages(pages(&[900, 900, 900, 900]), 2000);
        assert_eq!(text.chars().count(), 2000);
        assert!(text.ends_with('c'));
        assert!(!text.contains('d'));
    }

    #[test]
    fn oversized_first_page_is_kept_whole() {
        let text = accumulate_pages(pages(&[2500, 100]), 2000);
        assert_eq!(text.chars().count(), 2500);
        assert!(!text.contains('b'));
    }

    #[test]
    fn blank_cover_page_does_not_count_as_first() {
        let text = accumulate_pages(vec![String::new(), "x".repeat(2500)], 2000);
        assert_eq!(text.chars().count(), 2500);
    }

    #[test]
    fn stops_pulling_pages_once_full() {
        let mut pulled = 0;
        let iter = pages(&[1000, 1000, 1000]).into_iter().inspect(|_| pulled += 1);
        let text = accumulate_pages(iter, 2000);
        assert_eq!(text.chars().count(), 2000);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = accumulate_pages(vec!["é".repeat(10), "ü".repeat(10)], 15);
        assert_eq!(text.chars().count(), 15);
        assert_eq!(text.matches('ü').count(), 5);
    }

    #[test]
    fn garbage_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        fs::write(&path, b"this is not a pdf").unwrap();

        let extraction = extract_text(&path, 2000).unwrap();
        assert!(matches!(extraction, Extraction::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_text(&dir.path().join("missing.pdf"), 2000).is_err());
    }
}
