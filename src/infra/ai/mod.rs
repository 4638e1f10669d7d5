pub mod http_ai_backend;
