use crate::types::{InfraError, InfraResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// JSON出力のインデント幅
const JSON_INDENT: &[u8] = b"    ";

/// ファイルパスからBufReaderを作成する
/// パースやデータ変換は呼び出し側で行う
pub fn load_file(file_path: &str) -> InfraResult<BufReader<File>> {
    let file = File::open(file_path).map_err(|e| InfraError::file_system(file_path, e))?;
    Ok(BufReader::new(file))
}

/// JSONファイルからSerdeでDeserializeできる型を読み込む
pub fn load_json_from_file<T: DeserializeOwned>(file_path: &str) -> InfraResult<T> {
    let buf_reader = load_file(file_path)?;
    serde_json::from_reader(buf_reader)
        .map_err(|e| InfraError::serialization(format!("JSONファイルの解析: {}", file_path), e))
}

/// YAMLファイルからSerdeでDeserializeできる型を読み込む
pub fn load_yaml_from_file<T: DeserializeOwned>(file_path: &str) -> InfraResult<T> {
    let buf_reader = load_file(file_path)?;
    serde_yaml::from_reader(buf_reader).map_err(|e| InfraError::yaml(file_path, e))
}

/// 出力先の親ディレクトリがなければ作成してファイルを開く
fn create_file(file_path: &str) -> InfraResult<File> {
    if let Some(parent) = Path::new(file_path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| InfraError::file_system(file_path, e))?;
        }
    }
    File::create(file_path).map_err(|e| InfraError::file_system(file_path, e))
}

/// 値を4スペースインデントのJSONとして書き出す
///
/// 非ASCII文字はエスケープせずそのままUTF-8で出力する。
pub fn save_json_to_file<T: Serialize>(value: &T, file_path: &str) -> InfraResult<()> {
    let mut writer = BufWriter::new(create_file(file_path)?);
    write_pretty_json(&mut writer, value)
        .map_err(|e| InfraError::serialization(format!("JSONファイルの書き込み: {}", file_path), e))?;
    writer
        .flush()
        .map_err(|e| InfraError::file_system(file_path, e))
}

/// 値を4スペースインデントのJSON文字列に変換する
pub fn to_pretty_json<T: Serialize>(value: &T) -> InfraResult<String> {
    let mut buffer = Vec::new();
    write_pretty_json(&mut buffer, value)
        .map_err(|e| InfraError::serialization("JSON文字列への変換", e))?;
    // serde_jsonは常に有効なUTF-8を出力する
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_pretty_json<W: Write, T: Serialize>(writer: W, value: &T) -> serde_json::Result<()> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)
}

/// テキストをUTF-8でファイルに書き出す
pub fn save_text_to_file(content: &str, file_path: &str) -> InfraResult<()> {
    let mut writer = BufWriter::new(create_file(file_path)?);
    writer
        .write_all(content.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| InfraError::file_system(file_path, e))
}
