use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Marks session cookies `Secure` so browsers only send them over HTTPS.
    /// Leave off for local plain-HTTP deployments.
    pub secure_cookies: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("sprout.db")
    }

    /// Path of the session signing secret created by `sprout admin init`.
    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(".session_secret")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            secure_cookies: false,
        }
    }
}
