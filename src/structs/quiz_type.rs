// 上传后分配给每场测验的会话token
pub type SessionToken = String;
// 答题表单中第i题的字段名前缀
pub const ANSWER_FIELD_PREFIX: &str = "q";
// 答题表单中会话token的字段名
pub const SESSION_FIELD: &str = "session";
