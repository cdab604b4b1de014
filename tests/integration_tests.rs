//! Integration tests for ragchat.
//! These tests run the real HTTP client against a stub backend bound to an
//! ephemeral local port.

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use ragchat::chat::{ConversationController, FALLBACK_MESSAGE, SubmitOutcome, WELCOME_MESSAGE};
    use ragchat::{
        ChatRequest, ChatResponse, ClientLogger, Error, HistoryRecord, Locale, RagClient, Turn,
    };

    /// A canned reply; `None` status means never answer.
    #[derive(Clone)]
    struct Reply {
        status: Option<u16>,
        body: String,
    }

    impl Reply {
        fn json(status: u16, body: serde_json::Value) -> Self {
            Self {
                status: Some(status),
                body: body.to_string(),
            }
        }

        fn raw(status: u16, body: &str) -> Self {
            Self {
                status: Some(status),
                body: body.to_string(),
            }
        }

        fn hang() -> Self {
            Self {
                status: None,
                body: String::new(),
            }
        }
    }

    #[derive(Debug, Clone)]
    struct Recorded {
        method: String,
        target: String,
        body: String,
    }

    #[derive(Clone, Default)]
    struct Stub {
        routes: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
        requests: Arc<Mutex<Vec<Recorded>>>,
    }

    impl Stub {
        fn reply(self, route: &str, reply: Reply) -> Self {
            self.routes
                .lock()
                .entry(route.to_string())
                .or_default()
                .push_back(reply);
            self
        }

        fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().clone()
        }

        async fn start(self) -> (Self, String) {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr: SocketAddr = listener.local_addr().unwrap();
            let stub = self.clone();
            tokio::spawn(async move {
                loop {
                    let Ok((socket, _)) = listener.accept().await else {
                        break;
                    };
                    let stub = stub.clone();
                    tokio::spawn(async move { stub.handle(socket).await });
                }
            });
            (self, format!("http://{addr}"))
        }

        async fn handle(&self, mut socket: TcpStream) {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let header_end = loop {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    return;
                }
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let mut request_line = head.lines().next().unwrap_or_default().split(' ');
            let method = request_line.next().unwrap_or_default().to_string();
            let target = request_line.next().unwrap_or_default().to_string();
            let body = String::from_utf8_lossy(&buf[header_end..]).to_string();
            let path = target.split('?').next().unwrap_or_default().to_string();
            self.requests.lock().push(Recorded {
                method: method.clone(),
                target,
                body,
            });

            let reply = self
                .routes
                .lock()
                .get_mut(&format!("{method} {path}"))
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| Reply::raw(404, r#"{"detail":"Not Found"}"#));
            let Some(status) = reply.status else {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return;
            };
            let response = format!(
                "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                reply.body.len(),
                reply.body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    }

    fn history_json() -> serde_json::Value {
        serde_json::json!([
            {"id": 12, "user_query": "Where did you study?", "bot_response": "METU.", "timestamp": "2024-05-02T08:00:00"},
            {"id": 11, "user_query": "What is your experience?", "bot_response": "5 years.", "timestamp": "2024-05-01T10:00:00"}
        ])
    }

    #[tokio::test]
    async fn fetch_history_preserves_server_order() {
        let (stub, url) = Stub::default()
            .reply("GET /history", Reply::json(200, history_json()))
            .start()
            .await;
        let client = RagClient::new(Some(url)).unwrap();

        let records = client.fetch_history().await.unwrap();
        assert_eq!(
            records,
            vec![
                HistoryRecord::new(12, "Where did you study?", "METU.", "2024-05-02T08:00:00"),
                HistoryRecord::new(11, "What is your experience?", "5 years.", "2024-05-01T10:00:00"),
            ]
        );
        let requests = stub.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].target, "/history");
    }

    #[tokio::test]
    async fn history_limit_is_sent_as_query() {
        let (stub, url) = Stub::default()
            .reply("GET /history", Reply::json(200, serde_json::json!([])))
            .start()
            .await;
        let client = RagClient::new(Some(url))
            .unwrap()
            .with_history_limit(Some(5));

        assert!(client.fetch_history().await.unwrap().is_empty());
        assert_eq!(stub.requests()[0].target, "/history?limit=5");
    }

    #[tokio::test]
    async fn send_chat_posts_message_and_language() {
        let (stub, url) = Stub::default()
            .reply(
                "POST /chat",
                Reply::json(200, serde_json::json!({"answer": "Beş yıl."})),
            )
            .start()
            .await;
        let client = RagClient::new(Some(url)).unwrap();

        let response = client
            .send_chat("Deneyimin nedir?", Locale::Tr)
            .await
            .unwrap();
        assert_eq!(response, ChatResponse::new("Beş yıl."));

        let requests = stub.requests();
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].target, "/chat");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"message": "Deneyimin nedir?", "language": "tr"})
        );
    }

    #[tokio::test]
    async fn server_error_carries_detail() {
        let (_stub, url) = Stub::default()
            .reply(
                "POST /chat",
                Reply::json(500, serde_json::json!({"detail": "GROQ_API_KEY missing"})),
            )
            .start()
            .await;
        let client = RagClient::new(Some(url)).unwrap();

        let err = client.send_chat("hi", Locale::En).await.unwrap_err();
        match err {
            Error::Api {
                status_code,
                detail,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(detail, "GROQ_API_KEY missing");
            }
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_transport_error() {
        let (_stub, url) = Stub::default()
            .reply("POST /chat", Reply::raw(200, r#"{"reply": "wrong field"}"#))
            .reply("GET /history", Reply::raw(200, "<html>not json</html>"))
            .start()
            .await;
        let client = RagClient::new(Some(url)).unwrap();

        let err = client.send_chat("hi", Locale::En).await.unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
        let err = client.fetch_history().await.unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = RagClient::new(Some(format!("http://{addr}"))).unwrap();

        let err = client.fetch_history().await.unwrap_err();
        assert!(
            matches!(err, Error::Connection { .. }),
            "unexpected error: {err:?}"
        );
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let (_stub, url) = Stub::default()
            .reply("POST /chat", Reply::hang())
            .start()
            .await;
        let client = RagClient::with_options(Some(url), Some(Duration::from_millis(200))).unwrap();

        let err = client.send_chat("hi", Locale::En).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }), "unexpected error: {err:?}");
    }

    #[derive(Default)]
    struct RecordingLogger {
        chats: Mutex<Vec<(String, String)>>,
        histories: Mutex<Vec<usize>>,
    }

    impl ClientLogger for RecordingLogger {
        fn log_history(&self, records: &[HistoryRecord]) {
            self.histories.lock().push(records.len());
        }

        fn log_chat(&self, request: &ChatRequest, response: &ChatResponse) {
            self.chats
                .lock()
                .push((request.message.clone(), response.answer.clone()));
        }
    }

    #[tokio::test]
    async fn logger_sees_successful_exchanges() {
        let (_stub, url) = Stub::default()
            .reply("GET /history", Reply::json(200, history_json()))
            .reply("POST /chat", Reply::json(200, serde_json::json!({"answer": "a"})))
            .reply("POST /chat", Reply::json(500, serde_json::json!({"detail": "x"})))
            .start()
            .await;
        let logger = Arc::new(RecordingLogger::default());
        let client = RagClient::new(Some(url))
            .unwrap()
            .with_logger(logger.clone());

        client.fetch_history().await.unwrap();
        client.send_chat("q", Locale::En).await.unwrap();
        assert!(client.send_chat("q2", Locale::En).await.is_err());

        assert_eq!(logger.histories.lock().clone(), vec![2]);
        assert_eq!(
            logger.chats.lock().clone(),
            vec![("q".to_string(), "a".to_string())]
        );
    }

    #[tokio::test]
    async fn conversation_against_stub_backend() {
        let (stub, url) = Stub::default()
            .reply("GET /history", Reply::json(200, serde_json::json!([])))
            .reply(
                "POST /chat",
                Reply::json(200, serde_json::json!({"answer": "5 years."})),
            )
            .reply("GET /history", Reply::json(200, history_json()))
            .reply("POST /chat", Reply::json(500, serde_json::json!({"detail": "boom"})))
            .start()
            .await;
        let client = RagClient::new(Some(url)).unwrap();
        let controller = ConversationController::new(client, Locale::En);

        controller.mount().await;
        assert!(controller.session().history().is_empty());

        let outcome = controller.submit("What is your experience?").await;
        assert_eq!(outcome, SubmitOutcome::Answered);
        assert_eq!(
            controller.session().transcript(),
            vec![
                Turn::assistant(WELCOME_MESSAGE),
                Turn::user("What is your experience?"),
                Turn::assistant("5 years."),
            ]
        );
        controller.wait_for_refreshes().await;
        assert_eq!(controller.session().history().len(), 2);

        let outcome = controller.submit("And before that?").await;
        assert_eq!(outcome, SubmitOutcome::Fallback);
        assert_eq!(
            controller.session().transcript().last(),
            Some(&Turn::assistant(FALLBACK_MESSAGE))
        );
        assert!(!controller.session().pending());
        controller.wait_for_refreshes().await;
        assert_eq!(controller.session().history().len(), 2);

        let loaded = controller.load_history_item_at(1).unwrap();
        assert_eq!(loaded.id, 11);
        assert_eq!(
            controller.session().transcript(),
            vec![
                Turn::user("What is your experience?"),
                Turn::assistant("5 years."),
            ]
        );

        let targets: Vec<String> = stub
            .requests()
            .into_iter()
            .map(|r| format!("{} {}", r.method, r.target))
            .collect();
        assert_eq!(
            targets,
            vec![
                "GET /history",
                "POST /chat",
                "GET /history",
                "POST /chat",
            ]
        );
    }
}
