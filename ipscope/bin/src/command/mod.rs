mod server;

pub use self::server::run_server;
