pub mod config;
pub mod http_app;
pub mod logging;
pub mod http {
    pub mod codec;
    pub mod headers;
    pub mod json;
    pub mod ndjson;
    pub mod sse;
}
pub mod boot;
pub mod runtime {
    pub mod limits;
    pub mod session;
    pub mod stdio;
}
