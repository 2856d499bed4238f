use std::path::Path;

use uuid::Uuid;

// 检测文件后缀是否在允许列表中，忽略大小写
pub fn allowed_file(filename: &str, allowed_extensions: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_lowercase();
            allowed_extensions.iter().any(|allowed| allowed.to_lowercase() == ext)
        }
        None => false,
    }
}

// 只保留客户端文件名的最后一段，防止写到上传目录之外
pub fn sanitize_filename(filename: &str) -> String {
    let last = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    match Path::new(last).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::new(),
    }
}

// 加上随机前缀避免重名
pub fn stored_name(filename: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), filename)
}
