// Adapters layer: concrete implementations of the domain ports (http, mail, storage, clock).

pub mod clock;
pub mod http;
pub mod mail;
pub mod storage;

pub use clock::TokioSleeper;
pub use http::HttpFetcher;
pub use mail::CommandMailer;
pub use storage::PayloadStore;
