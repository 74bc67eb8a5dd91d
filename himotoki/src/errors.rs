//! エラー型の定義
//!
//! このモジュールは、himotokiライブラリで使用されるすべてのエラー型を定義します。

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

/// himotoki専用のResult型
///
/// エラー型としてデフォルトで[`HimotokiError`]を使用します。
pub type Result<T, E = HimotokiError> = std::result::Result<T, E>;

/// himotokiのエラー型
///
/// このライブラリで発生する可能性のあるすべてのエラーを表現します。
/// 辞書関連のエラーは`from_path`/`warm_up`の時点でのみ発生し、
/// トークン化そのものは有効な入力に対して失敗しません。
#[derive(Debug, thiserror::Error)]
pub enum HimotokiError {
    /// 辞書ファイルが存在しないエラー
    #[error("dictionary not found: {0}")]
    NotFound(PathBuf),

    /// 辞書ファイルが壊れているエラー
    ///
    /// マジックバイト、ヘッダのオフセット、内部レイアウトのいずれかが
    /// 不正な場合に発生します。
    #[error(transparent)]
    Corrupt(CorruptError),

    /// 辞書フォーマットのバージョン不一致エラー
    ///
    /// マジックバイトは正しいが、フォーマットバージョンが
    /// サポート外の場合に発生します。
    #[error("unsupported dictionary format version: expected {expected}, found {found}")]
    VersionMismatch {
        /// サポートされているバージョン
        expected: u32,
        /// ファイルに記録されていたバージョン
        found: u32,
    },

    /// 無効な引数エラー
    ///
    /// [`InvalidArgumentError`]のエラーバリアント。
    #[error(transparent)]
    InvalidArgument(InvalidArgumentError),

    /// 整数変換エラー
    ///
    /// [`TryFromIntError`](std::num::TryFromIntError)のエラーバリアント。
    #[error(transparent)]
    TryFromInt(#[from] std::num::TryFromIntError),

    /// 標準I/Oエラー
    ///
    /// [`std::io::Error`]のエラーバリアント。
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HimotokiError {
    /// 辞書破損エラーを生成します
    ///
    /// # 引数
    ///
    /// * `msg` - エラーメッセージ
    pub(crate) fn corrupt<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::Corrupt(CorruptError { msg: msg.into() })
    }

    /// 無効な引数エラーを生成します
    ///
    /// # 引数
    ///
    /// * `arg` - 引数の名前
    /// * `msg` - エラーメッセージ
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

/// 辞書ファイルが壊れている場合に使用されるエラー
#[derive(Debug)]
pub struct CorruptError {
    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for CorruptError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "corrupt dictionary: {}", self.msg)
    }
}

impl Error for CorruptError {}

/// 引数が無効な場合に使用されるエラー
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// 引数の名前
    pub(crate) arg: &'static str,

    /// エラーメッセージ
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}
