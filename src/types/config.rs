use thiserror::Error;

/// 設定関連のエラー型
/// 環境変数、設定ファイル、設定値の検証に関するエラーを定義
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 環境変数が見つからない
    #[error("環境変数が見つかりません: {name}")]
    MissingEnvironmentVariable { name: String },

    /// 設定値が不正
    #[error("設定値が不正です: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    /// 設定ファイルが見つからない
    #[error("設定ファイルが見つかりません: {path}")]
    MissingConfigFile { path: String },
}

impl ConfigError {
    /// 環境変数不足エラーを作成
    pub fn missing_env_var<N: Into<String>>(name: N) -> Self {
        Self::MissingEnvironmentVariable { name: name.into() }
    }

    /// 不正な設定値エラーを作成
    pub fn invalid_value<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 設定ファイル不足エラーを作成
    pub fn missing_config_file<P: Into<String>>(path: P) -> Self {
        Self::MissingConfigFile { path: path.into() }
    }
}

/// 設定エラーのResult型エイリアス
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// 必須の環境変数を読み込む。空文字列は未設定として扱う
pub fn required_env(name: &str) -> ConfigResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::missing_env_var(name)),
    }
}

/// 任意の環境変数を読み込む
pub fn optional_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_env_missing() {
        let result = required_env("NEWS_DASHBOARD_TEST_SURELY_UNSET_VAR");

        assert!(result.is_err(), "未設定の環境変数でエラーにならなかった");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::MissingEnvironmentVariable { .. }
        ));
    }

    #[test]
    fn test_required_env_blank_is_missing() {
        std::env::set_var("NEWS_DASHBOARD_TEST_BLANK_VAR", "   ");

        assert!(required_env("NEWS_DASHBOARD_TEST_BLANK_VAR").is_err());
        assert_eq!(optional_env("NEWS_DASHBOARD_TEST_BLANK_VAR"), None);

        std::env::remove_var("NEWS_DASHBOARD_TEST_BLANK_VAR");
    }

    #[test]
    fn test_invalid_value_message() {
        let err = ConfigError::invalid_value("retry.max_retries", "10以下である必要があります");

        assert_eq!(
            err.to_string(),
            "設定値が不正です: retry.max_retries - 10以下である必要があります"
        );
    }
}
