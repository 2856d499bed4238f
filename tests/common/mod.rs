#![allow(dead_code)]

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdfquiz::config::Config;
use pdfquiz::inference_server::{InferenceServer, InferenceServerHandle};
use pdfquiz::model::{Embedder, QuestionGenerator};
use pdfquiz::session_server::{SessionServer, SessionServerHandle};
use tokio::time::Duration;

/// 生成每页一行文本的pdf，空字符串表示没有文本的页面
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![20.into(), 800.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn prose(min_chars: usize) -> String {
    let sentence = "The committee reviewed the annual report and approved the new budget for research. ";
    sentence.repeat(min_chars / sentence.len() + 1)
}

pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> (String, Vec<u8>) {
    let boundary = "----pdfquiz-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// 用文本开头的单词拼出题目，便于区分不同文档
pub struct TemplateGenerator;

impl QuestionGenerator for TemplateGenerator {
    fn generate(&mut self, text: &str, count: usize) -> anyhow::Result<Vec<String>> {
        let topic = text.split_whitespace().next().unwrap_or("this");
        Ok((1..=count)
            .map(|i| format!("Question {i}: what does the text say about {topic}?"))
            .collect())
    }
}

/// 词袋哈希向量，相同文本相似度为1，不相交的词汇相似度接近0
pub struct BagOfWords;

impl Embedder for BagOfWords {
    fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0; 512];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            v[(hasher.finish() % 512) as usize] += 1.0;
        }
        Ok(v)
    }
}

pub fn test_config(upload_dir: &Path) -> Config {
    let mut config = Config::default();
    config.upload.dir = upload_dir.to_path_buf();
    config
}

pub fn start_servers() -> (InferenceServerHandle, SessionServerHandle) {
    let (inference_server, inference) =
        InferenceServer::new(Box::new(TemplateGenerator), Box::new(BagOfWords));
    inference_server.spawn().unwrap();

    let (session_server, sessions) = SessionServer::new(Duration::from_secs(60));
    actix_web::rt::spawn(session_server.run());
    (inference, sessions)
}

pub fn session_token(html: &str) -> Option<String> {
    let marker = "name=\"session\" value=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}
