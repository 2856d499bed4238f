use std::io;
use std::thread;

use tokio::sync::{mpsc, oneshot};

use crate::error::InferenceError;
use crate::model::{normalize_questions, Embedder, QuestionGenerator};

#[derive(Debug)]
enum Command {
    Generate {
        text: String,
        count: usize,
        res_tx: oneshot::Sender<Result<Vec<String>, InferenceError>>,
    },

    Similarity {
        answer: String,
        reference: String,
        res_tx: oneshot::Sender<Result<f32, InferenceError>>,
    },
}

/// 持有两个模型的推理服务，运行在独立线程上，一次只处理一个请求
pub struct InferenceServer {
    generator: Box<dyn QuestionGenerator>,

    embedder: Box<dyn Embedder>,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl InferenceServer {
    pub fn new(
        generator: Box<dyn QuestionGenerator>,
        embedder: Box<dyn Embedder>,
    ) -> (InferenceServer, InferenceServerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            InferenceServer {
                generator,
                embedder,
                cmd_rx,
            },
            InferenceServerHandle { cmd_tx },
        )
    }

    fn generate(&mut self, text: &str, count: usize) -> Result<Vec<String>, InferenceError> {
        let questions = self.generator.generate(text, count)?;
        if questions.len() != count {
            log::warn!("模型生成了{}道题，期望{}道", questions.len(), count);
        }
        Ok(normalize_questions(questions, count))
    }

    /// 阻塞运行直到所有handle被释放
    pub fn run(mut self) {
        while let Some(cmd) = self.cmd_rx.blocking_recv() {
            match cmd {
                Command::Generate { text, count, res_tx } => {
                    let result = self.generate(&text, count);
                    let _ = res_tx.send(result);
                }

                Command::Similarity {
                    answer,
                    reference,
                    res_tx,
                } => {
                    let result = self
                        .embedder
                        .similarity(&answer, &reference)
                        .map_err(InferenceError::from);
                    let _ = res_tx.send(result);
                }
            }
        }
        log::info!("推理服务已退出");
    }

    pub fn spawn(self) -> io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("inference".to_string())
            .spawn(move || self.run())
    }
}

#[derive(Debug, Clone)]
pub struct InferenceServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl InferenceServerHandle {
    /// 根据文本生成正好`count`道题目
    pub async fn generate(&self, text: String, count: usize) -> Result<Vec<String>, InferenceError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Generate { text, count, res_tx })
            .map_err(|_| InferenceError::Closed)?;
        res_rx.await.map_err(|_| InferenceError::Closed)?
    }

    /// 计算用户答案和参考答案的余弦相似度
    pub async fn similarity(&self, answer: String, reference: String) -> Result<f32, InferenceError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Similarity {
                answer,
                reference,
                res_tx,
            })
            .map_err(|_| InferenceError::Closed)?;
        res_rx.await.map_err(|_| InferenceError::Closed)?
    }
}
