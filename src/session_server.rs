use std::collections::HashMap;
use std::io;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, Duration, Instant};
use uuid::Uuid;

use crate::error::SessionClosedError;
use crate::structs::quiz::QuestionAnswer;
use crate::structs::quiz_type::SessionToken;

// 清理过期会话的间隔
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug)]
enum Command {
    Create {
        questions: Vec<QuestionAnswer>,
        res_tx: oneshot::Sender<SessionToken>,
    },

    Get {
        token: SessionToken,
        res_tx: oneshot::Sender<Option<Vec<QuestionAnswer>>>,
    },

    Remove {
        token: SessionToken,
    },
}

#[derive(Debug)]
struct Session {
    questions: Vec<QuestionAnswer>,
    created_at: Instant,
}

/// 按token区分的测验会话表，每次上传都会得到独立的会话
#[derive(Debug)]
pub struct SessionServer {
    /// token和会话的键值对
    sessions: HashMap<SessionToken, Session>,

    /// 会话有效期
    ttl: Duration,

    /// 接收命令的管道
    cmd_rx: mpsc::UnboundedReceiver<Command>,
}

impl SessionServer {
    pub fn new(ttl: Duration) -> (SessionServer, SessionServerHandle) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (
            SessionServer {
                sessions: HashMap::new(),
                ttl,
                cmd_rx,
            },
            SessionServerHandle { cmd_tx },
        )
    }

    fn create(&mut self, questions: Vec<QuestionAnswer>) -> SessionToken {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                questions,
                created_at: Instant::now(),
            },
        );
        token
    }

    fn get(&self, token: &str) -> Option<Vec<QuestionAnswer>> {
        self.sessions
            .get(token)
            .filter(|session| session.created_at.elapsed() <= self.ttl)
            .map(|session| session.questions.clone())
    }

    // 移除在now之前已经过期的会话
    fn expire(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions
            .retain(|_, session| now.saturating_duration_since(session.created_at) <= ttl);
        before - self.sessions.len()
    }

    pub async fn run(mut self) -> io::Result<()> {
        let mut interval = time::interval(SWEEP_INTERVAL);

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else { break };
                    match cmd {
                        Command::Create { questions, res_tx } => {
                            let token = self.create(questions);
                            log::info!("创建测验会话{token}");
                            let _ = res_tx.send(token);
                        }

                        Command::Get { token, res_tx } => {
                            let _ = res_tx.send(self.get(&token));
                        }

                        Command::Remove { token } => {
                            self.sessions.remove(&token);
                        }
                    }
                }
                // 定时清除过期会话
                _ = interval.tick() => {
                    let removed = self.expire(Instant::now());
                    if removed > 0 {
                        log::info!("清除了{removed}个过期会话");
                    }
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SessionServerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl SessionServerHandle {
    /// 保存一组题目并返回新会话的token
    pub async fn create(&self, questions: Vec<QuestionAnswer>) -> Result<SessionToken, SessionClosedError> {
        let (res_tx, res_rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Create { questions, res_tx })
            .map_err(|_| SessionClosedError)?;
        res_rx.await.map_err(|_| SessionClosedError)
    }

    /// 查询会话，不存在或已过期时返回None
    pub async fn get(&self, token: impl Into<SessionToken>) -> Option<Vec<QuestionAnswer>> {
        let (res_tx, res_rx) = oneshot::channel();
        if self
            .cmd_tx
            .send(Command::Get {
                token: token.into(),
                res_tx,
            })
            .is_err()
        {
            log::error!("{SessionClosedError}");
            return None;
        }
        res_rx.await.ok().flatten()
    }

    pub fn remove(&self, token: impl Into<SessionToken>) {
        if self.cmd_tx.send(Command::Remove { token: token.into() }).is_err() {
            log::error!("{SessionClosedError}");
        }
    }
}
