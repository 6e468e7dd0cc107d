use crate::types::ConfigError;
use thiserror::Error;

/// インフラストラクチャ層のエラー型
/// ファイルシステム、シリアライゼーション、HTTP通信など基盤的なエラーを定義
#[derive(Error, Debug)]
pub enum InfraError {
    /// ファイルシステムエラー
    #[error("ファイルシステムエラー: {path} - {source}")]
    FileSystem {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// シリアライゼーションエラー（JSON）
    #[error("シリアライゼーションエラー: {context} - {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAMLの解析エラー
    #[error("YAML解析エラー: {path} - {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// HTTP通信そのものの失敗（接続失敗、タイムアウトなど）
    #[error("HTTP通信エラー: {url} - {source}")]
    HttpTransport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 2xx以外のHTTPステータス
    #[error("HTTPステータスエラー: {url} - {status} {body}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl InfraError {
    /// ファイルシステムエラーを作成
    pub fn file_system<P: Into<String>>(path: P, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// シリアライゼーションエラーを作成
    pub fn serialization<C: Into<String>>(context: C, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }

    /// YAML解析エラーを作成
    pub fn yaml<P: Into<String>>(path: P, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.into(),
            source,
        }
    }

    /// HTTP通信エラーを作成
    pub fn http_transport<U: Into<String>>(url: U, source: reqwest::Error) -> Self {
        Self::HttpTransport {
            url: url.into(),
            source,
        }
    }

    /// HTTPステータスエラーを作成
    pub fn http_status<U: Into<String>, B: Into<String>>(url: U, status: u16, body: B) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

}

/// インフラエラーのResult型エイリアス
pub type InfraResult<T> = std::result::Result<T, InfraError>;
